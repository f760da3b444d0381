//! In-memory providers shared by the integration tests.

#![allow(dead_code, clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use market_gateway::{
    Account, Activity, AssetClass, Bar, BarsQuery, CacheStore, ChainQuery, ChainSnapshot,
    Credentials, FallbackQuoteProvider, OptionsOrderRequest, Order, OrderRequest, Position,
    PrimaryProvider, ProviderError, Quote, RateThrottle, RequestRouter, RouterConfig,
    StaticCredentialResolver,
};
use parking_lot::Mutex;
use tokio::time::Instant;

/// Router wired to the fakes.
pub type TestRouter = RequestRouter<FakePrimary, FakeFallback, StaticCredentialResolver>;

/// Scriptable primary provider.
#[derive(Default)]
pub struct FakePrimary {
    pub quotes: Mutex<Vec<Quote>>,
    pub account: Mutex<Account>,
    pub orders: Mutex<Vec<Order>>,
    pub chain: Mutex<ChainSnapshot>,
    pub failure: Mutex<Option<ProviderError>>,
    pub operation_failures: Mutex<HashMap<&'static str, ProviderError>>,
    pub delay: Mutex<Duration>,
    pub calls: Mutex<Vec<(&'static str, Instant)>>,
}

impl FakePrimary {
    pub fn with_quotes(quotes: Vec<Quote>) -> Self {
        let fake = Self::default();
        *fake.quotes.lock() = quotes;
        fake
    }

    pub fn fail_with(&self, error: ProviderError) {
        *self.failure.lock() = Some(error);
    }

    /// Fail only `operation`; other calls keep succeeding.
    pub fn fail_operation(&self, operation: &'static str, error: ProviderError) {
        self.operation_failures.lock().insert(operation, error);
    }

    pub fn recover(&self) {
        *self.failure.lock() = None;
        self.operation_failures.lock().clear();
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }

    /// Number of calls to `operation`.
    pub fn call_count(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|(op, _)| *op == operation)
            .count()
    }

    /// Call instants for `operation`, in call order.
    pub fn call_times(&self, operation: &str) -> Vec<Instant> {
        self.calls
            .lock()
            .iter()
            .filter(|(op, _)| *op == operation)
            .map(|(_, at)| *at)
            .collect()
    }

    async fn enter(&self, operation: &'static str) -> Result<(), ProviderError> {
        self.calls.lock().push((operation, Instant::now()));
        let delay = *self.delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let failure = self
            .failure
            .lock()
            .clone()
            .or_else(|| self.operation_failures.lock().get(operation).cloned());
        failure.map_or(Ok(()), Err)
    }

    fn quotes_for(&self, symbols: &[String]) -> Vec<Quote> {
        self.quotes
            .lock()
            .iter()
            .filter(|q| symbols.contains(&q.symbol))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl PrimaryProvider for FakePrimary {
    async fn stock_quotes(
        &self,
        _credentials: &Credentials,
        symbols: &[String],
    ) -> Result<Vec<Quote>, ProviderError> {
        self.enter("stock_quotes").await?;
        Ok(self.quotes_for(symbols))
    }

    async fn crypto_quotes(
        &self,
        _credentials: &Credentials,
        symbols: &[String],
    ) -> Result<Vec<Quote>, ProviderError> {
        self.enter("crypto_quotes").await?;
        Ok(self.quotes_for(symbols))
    }

    async fn bars(
        &self,
        _credentials: &Credentials,
        _query: &BarsQuery,
    ) -> Result<Vec<Bar>, ProviderError> {
        self.enter("bars").await?;
        Ok(vec![bar(1.0)])
    }

    async fn account(&self, _credentials: &Credentials) -> Result<Account, ProviderError> {
        self.enter("account").await?;
        Ok(self.account.lock().clone())
    }

    async fn positions(&self, _credentials: &Credentials) -> Result<Vec<Position>, ProviderError> {
        self.enter("positions").await?;
        Ok(Vec::new())
    }

    async fn activities(
        &self,
        _credentials: &Credentials,
    ) -> Result<Vec<Activity>, ProviderError> {
        self.enter("activities").await?;
        Ok(Vec::new())
    }

    async fn orders(&self, _credentials: &Credentials) -> Result<Vec<Order>, ProviderError> {
        self.enter("orders").await?;
        Ok(self.orders.lock().clone())
    }

    async fn submit_order(
        &self,
        _credentials: &Credentials,
        request: &OrderRequest,
    ) -> Result<Order, ProviderError> {
        self.enter("submit_order").await?;
        let order = Order {
            id: format!("order-{}", self.orders.lock().len() + 1),
            symbol: request.shape().symbol,
            status: "accepted".to_string(),
            ..Order::default()
        };
        self.orders.lock().push(order.clone());
        Ok(order)
    }

    async fn cancel_order(
        &self,
        _credentials: &Credentials,
        order_id: &str,
    ) -> Result<(), ProviderError> {
        self.enter("cancel_order").await?;
        self.orders.lock().retain(|o| o.id != order_id);
        Ok(())
    }

    async fn options_chain(
        &self,
        _credentials: &Credentials,
        _query: &ChainQuery,
    ) -> Result<ChainSnapshot, ProviderError> {
        self.enter("options_chain").await?;
        Ok(self.chain.lock().clone())
    }

    async fn submit_options_order(
        &self,
        _credentials: &Credentials,
        request: &OptionsOrderRequest,
    ) -> Result<Order, ProviderError> {
        self.enter("submit_options_order").await?;
        Ok(Order {
            id: "options-order-1".to_string(),
            symbol: request.occ_symbol.clone(),
            status: "accepted".to_string(),
            ..Order::default()
        })
    }
}

/// Scriptable delayed-quote provider.
#[derive(Default)]
pub struct FakeFallback {
    pub quotes: Mutex<Vec<Quote>>,
    pub failure: Mutex<Option<ProviderError>>,
    pub calls: Mutex<usize>,
}

impl FakeFallback {
    pub fn with_quotes(quotes: Vec<Quote>) -> Self {
        let fake = Self::default();
        *fake.quotes.lock() = quotes;
        fake
    }

    pub fn fail_with(&self, error: ProviderError) {
        *self.failure.lock() = Some(error);
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock()
    }

    fn enter(&self) -> Result<(), ProviderError> {
        *self.calls.lock() += 1;
        let failure = self.failure.lock().clone();
        failure.map_or(Ok(()), Err)
    }
}

#[async_trait]
impl FallbackQuoteProvider for FakeFallback {
    async fn delayed_quotes(&self, symbols: &[String]) -> Result<Vec<Quote>, ProviderError> {
        self.enter()?;
        Ok(self
            .quotes
            .lock()
            .iter()
            .filter(|q| symbols.contains(&q.symbol))
            .cloned()
            .map(Quote::delayed)
            .collect())
    }

    async fn delayed_bars(&self, _query: &BarsQuery) -> Result<Vec<Bar>, ProviderError> {
        self.enter()?;
        Ok(vec![bar(2.0)])
    }
}

pub fn bar(close: f64) -> Bar {
    Bar {
        close,
        open: close,
        high: close,
        low: close,
        ..Bar::default()
    }
}

pub fn stock_quote(symbol: &str, last: f64, previous_close: f64) -> Quote {
    Quote::new(symbol, AssetClass::Stock, last, previous_close)
}

pub fn crypto_quote(symbol: &str, last: f64, previous_close: f64) -> Quote {
    Quote::new(symbol, AssetClass::Crypto, last, previous_close)
}

pub fn creds() -> Credentials {
    Credentials::new("PKTEST", "secret")
}

pub fn build_router(
    primary: Arc<FakePrimary>,
    fallback: Arc<FakeFallback>,
    default_credentials: Option<Credentials>,
    config: RouterConfig,
) -> TestRouter {
    RequestRouter::new(
        primary,
        fallback,
        Arc::new(StaticCredentialResolver::new(default_credentials)),
        Arc::new(CacheStore::default()),
        Arc::new(RateThrottle::default()),
        config,
    )
}

