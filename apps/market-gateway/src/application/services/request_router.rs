//! Request Router
//!
//! Per operation: cache lookup, credential check, throttle, provider call,
//! cache write. Transient provider failures (rate limiting, transport errors,
//! timeouts) on read operations are answered from the stale tier, then the
//! delayed fallback for quotes, then an empty payload with a note. Trading
//! operations never degrade.

use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::cache_key;
use super::cache_store::CacheStore;
use super::rate_throttle::RateThrottle;
use super::request::{
    CancelledOrder, GatewayRequest, GatewayResponse, Provenance, ResolveContractQuery,
    ResponseData,
};
use crate::application::ports::{
    Caller, CredentialResolver, Credentials, FallbackQuoteProvider, PrimaryProvider, ProviderError,
};
use crate::domain::instrument::{classify, normalize};
use crate::domain::market::{
    Account, Activity, Bar, BarsQuery, OptionsOrderRequest, Order, OrderRequest, Position, Quote,
};
use crate::domain::options::{ChainQuery, ChainSnapshot, ContractResolver, OccSymbol, Resolution};
use crate::error::GatewayError;
use crate::observability::{record_cache_lookup, record_gateway_request, record_provider_request};

/// Quotes keyed by symbol.
pub type QuoteMap = BTreeMap<String, Quote>;

/// Router tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterConfig {
    /// Upper bound on a single read call to a provider. Expiry is treated
    /// as a connection error.
    pub request_timeout: Duration,
    /// Whether the delayed fallback provider may be used.
    pub fallback_enabled: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(15),
            fallback_enabled: true,
        }
    }
}

/// How a read is dispatched and labelled.
#[derive(Debug, Clone, Copy)]
struct Source {
    provider: &'static str,
    provenance: Provenance,
    throttled: bool,
    degrade_on_any_error: bool,
}

/// Primary market data: throttled.
const PRIMARY_DATA: Source = Source {
    provider: "primary",
    provenance: Provenance::Live,
    throttled: true,
    degrade_on_any_error: false,
};

/// Primary account and chain reads: not throttled.
const PRIMARY_ACCOUNT: Source = Source {
    provider: "primary",
    provenance: Provenance::Live,
    throttled: false,
    degrade_on_any_error: false,
};

/// Delayed fallback: nothing else to try, so every failure degrades.
const FALLBACK: Source = Source {
    provider: "fallback",
    provenance: Provenance::Delayed,
    throttled: false,
    degrade_on_any_error: true,
};

fn degradation_note(error: &GatewayError, serving: Provenance) -> String {
    let reason = match error {
        GatewayError::RateLimited => "Market data provider is rate limiting requests",
        GatewayError::CredentialsRequired { .. } => "Brokerage credentials were rejected",
        GatewayError::UpstreamError { .. } => "Market data provider is returning errors",
        _ => "Market data provider is unreachable",
    };
    match serving {
        Provenance::Stale => format!("{reason}; showing cached data that may be out of date"),
        Provenance::Delayed => format!("{reason}; showing delayed quotes"),
        _ => format!("{reason}; data temporarily unavailable"),
    }
}

fn prepare_symbols(symbols: &[String]) -> Result<Vec<String>, GatewayError> {
    let prepared: BTreeSet<String> = symbols
        .iter()
        .map(|s| normalize(s))
        .filter(|s| !s.is_empty())
        .collect();
    if prepared.is_empty() {
        return Err(GatewayError::InvalidRequest(
            "at least one symbol is required".to_string(),
        ));
    }
    Ok(prepared.into_iter().collect())
}

fn into_quote_map(quotes: impl IntoIterator<Item = Quote>) -> QuoteMap {
    quotes
        .into_iter()
        .map(|quote| (quote.symbol.clone(), quote))
        .collect()
}

/// Combine the equity and crypto legs of a quote batch.
///
/// One failed leg is tolerated when the other produced quotes; its error is
/// returned alongside the partial map.
fn merge_quote_legs(
    stocks: Result<Vec<Quote>, ProviderError>,
    crypto: Result<Vec<Quote>, ProviderError>,
) -> Result<(QuoteMap, Option<ProviderError>), ProviderError> {
    match (stocks, crypto) {
        (Ok(stocks), Ok(crypto)) => Ok((into_quote_map(stocks.into_iter().chain(crypto)), None)),
        (Ok(quotes), Err(error)) if !quotes.is_empty() => {
            tracing::warn!(leg = "crypto", error = %error, "Quote batch partially failed");
            Ok((into_quote_map(quotes), Some(error)))
        }
        (Err(error), Ok(quotes)) if !quotes.is_empty() => {
            tracing::warn!(leg = "stocks", error = %error, "Quote batch partially failed");
            Ok((into_quote_map(quotes), Some(error)))
        }
        (Err(error), _) | (_, Err(error)) => Err(error),
    }
}

/// Dispatches gateway operations to providers under cache and throttle policy.
pub struct RequestRouter<P, F, C>
where
    P: PrimaryProvider,
    F: FallbackQuoteProvider,
    C: CredentialResolver,
{
    primary: Arc<P>,
    fallback: Arc<F>,
    credentials: Arc<C>,
    cache: Arc<CacheStore>,
    throttle: Arc<RateThrottle>,
    config: RouterConfig,
}

impl<P, F, C> RequestRouter<P, F, C>
where
    P: PrimaryProvider,
    F: FallbackQuoteProvider,
    C: CredentialResolver,
{
    /// Create a router over shared cache and throttle instances.
    pub fn new(
        primary: Arc<P>,
        fallback: Arc<F>,
        credentials: Arc<C>,
        cache: Arc<CacheStore>,
        throttle: Arc<RateThrottle>,
        config: RouterConfig,
    ) -> Self {
        Self {
            primary,
            fallback,
            credentials,
            cache,
            throttle,
            config,
        }
    }

    /// Shared cache.
    pub const fn cache(&self) -> &Arc<CacheStore> {
        &self.cache
    }

    /// Handle one operation.
    pub async fn handle(
        &self,
        caller: &Caller,
        request: GatewayRequest,
    ) -> Result<GatewayResponse<ResponseData>, GatewayError> {
        let operation = request.operation();
        tracing::debug!(operation, caller = %caller, "Handling gateway request");

        let result = match request {
            GatewayRequest::Quotes { symbols } => self
                .quotes(caller, &symbols)
                .await
                .map(|r| r.map(ResponseData::Quotes)),
            GatewayRequest::Bars(query) => self
                .bars(caller, &query)
                .await
                .map(|r| r.map(ResponseData::Bars)),
            GatewayRequest::Account => self
                .account(caller)
                .await
                .map(|r| r.map(ResponseData::Account)),
            GatewayRequest::Positions => self
                .positions(caller)
                .await
                .map(|r| r.map(ResponseData::Positions)),
            GatewayRequest::Activities => self
                .activities(caller)
                .await
                .map(|r| r.map(ResponseData::Activities)),
            GatewayRequest::Orders => self
                .orders(caller)
                .await
                .map(|r| r.map(ResponseData::Orders)),
            GatewayRequest::SubmitOrder(order) => self
                .submit_order(caller, &order)
                .await
                .map(|r| r.map(ResponseData::Order)),
            GatewayRequest::CancelOrder { order_id } => self
                .cancel_order(caller, &order_id)
                .await
                .map(|r| r.map(ResponseData::Cancelled)),
            GatewayRequest::OptionsChain(query) => self
                .options_chain(caller, &query)
                .await
                .map(|r| r.map(ResponseData::OptionsChain)),
            GatewayRequest::SubmitOptionsOrder(order) => self
                .submit_options_order(caller, &order)
                .await
                .map(|r| r.map(ResponseData::Order)),
            GatewayRequest::ResolveContract(query) => self
                .resolve_contract(caller, &query)
                .await
                .map(|r| r.map(ResponseData::Contract)),
        };

        match &result {
            Ok(response) => {
                record_gateway_request(operation, response.provenance.as_str());
                if let Some(note) = &response.note {
                    tracing::info!(
                        operation,
                        provenance = response.provenance.as_str(),
                        note = %note,
                        "Degraded response"
                    );
                }
            }
            Err(e) => {
                record_gateway_request(operation, "error");
                tracing::warn!(operation, caller = %caller, error = %e, "Gateway request failed");
            }
        }

        result
    }

    // ------------------------------------------------------------------
    // Read operations
    // ------------------------------------------------------------------

    /// Latest quotes. Callers without credentials get delayed quotes.
    pub async fn quotes(
        &self,
        caller: &Caller,
        symbols: &[String],
    ) -> Result<GatewayResponse<QuoteMap>, GatewayError> {
        let symbols = prepare_symbols(symbols)?;

        match self.credentials(caller).await? {
            Some(credentials) => self.live_quotes(&credentials, &symbols).await,
            None => {
                if !self.config.fallback_enabled {
                    return Err(GatewayError::credentials_required("quotes"));
                }
                let key = cache_key::quotes(&symbols, true);
                self.read_through("quotes", &key, FALLBACK, self.fetch_delayed_quotes(&symbols))
                    .await
            }
        }
    }

    async fn live_quotes(
        &self,
        credentials: &Credentials,
        symbols: &[String],
    ) -> Result<GatewayResponse<QuoteMap>, GatewayError> {
        let key = cache_key::quotes(symbols, false);
        if let Some(data) = self.cached::<QuoteMap>(&key) {
            return Ok(GatewayResponse::new(data, Provenance::Cached));
        }

        self.throttle.await_slot().await;

        let (crypto, stocks): (Vec<String>, Vec<String>) = symbols
            .iter()
            .cloned()
            .partition(|s| classify(s).is_crypto());

        let fetch = async {
            let (stock_quotes, crypto_quotes) = tokio::join!(
                async {
                    if stocks.is_empty() {
                        Ok(Vec::new())
                    } else {
                        self.primary.stock_quotes(credentials, &stocks).await
                    }
                },
                async {
                    if crypto.is_empty() {
                        Ok(Vec::new())
                    } else {
                        self.primary.crypto_quotes(credentials, &crypto).await
                    }
                },
            );
            merge_quote_legs(stock_quotes, crypto_quotes)
        };

        let error = match self.call(PRIMARY_DATA.provider, fetch).await {
            Ok((data, None)) => {
                self.store(&key, &data);
                return Ok(GatewayResponse::new(data, Provenance::Live));
            }
            // Partial batches are not cached so the missing leg is retried
            Ok((data, Some(e))) => {
                return Ok(GatewayResponse::new(data, Provenance::Live)
                    .with_note(format!("Some symbols could not be quoted: {e}")));
            }
            Err(e) => GatewayError::from_provider("quotes", e),
        };

        let transient = error.is_degradable();
        let rejected = matches!(error, GatewayError::CredentialsRequired { .. });

        if transient && let Some(data) = self.stale::<QuoteMap>(&key) {
            tracing::warn!(key = %key, error = %error, "Serving stale quotes");
            return Ok(GatewayResponse::new(data, Provenance::Stale)
                .with_note(degradation_note(&error, Provenance::Stale)));
        }

        if (transient || rejected) && self.config.fallback_enabled {
            match self
                .call(FALLBACK.provider, self.fetch_delayed_quotes(symbols))
                .await
            {
                Ok(data) if !data.is_empty() => {
                    tracing::warn!(error = %error, "Falling back to delayed quotes");
                    self.store(&cache_key::quotes(symbols, true), &data);
                    return Ok(GatewayResponse::new(data, Provenance::Delayed)
                        .with_note(degradation_note(&error, Provenance::Delayed)));
                }
                Ok(_) => tracing::debug!("Fallback provider returned no quotes"),
                Err(e) => tracing::warn!(error = %e, "Fallback provider failed"),
            }
        }

        if transient {
            return Ok(GatewayResponse::new(QuoteMap::new(), Provenance::Unavailable)
                .with_note(degradation_note(&error, Provenance::Unavailable)));
        }
        Err(error)
    }

    async fn fetch_delayed_quotes(&self, symbols: &[String]) -> Result<QuoteMap, ProviderError> {
        let quotes = self.fallback.delayed_quotes(symbols).await?;
        Ok(into_quote_map(quotes.into_iter().map(Quote::delayed)))
    }

    /// Historical bars. Callers without credentials get delayed bars.
    pub async fn bars(
        &self,
        caller: &Caller,
        query: &BarsQuery,
    ) -> Result<GatewayResponse<Vec<Bar>>, GatewayError> {
        if query.symbol.trim().is_empty() {
            return Err(GatewayError::InvalidRequest("symbol is required".to_string()));
        }

        match self.credentials(caller).await? {
            Some(credentials) => {
                let key = cache_key::bars(query, false);
                self.read_through(
                    "bars",
                    &key,
                    PRIMARY_DATA,
                    self.primary.bars(&credentials, query),
                )
                .await
            }
            None => {
                if !self.config.fallback_enabled {
                    return Err(GatewayError::credentials_required("bars"));
                }
                let key = cache_key::bars(query, true);
                self.read_through("bars", &key, FALLBACK, self.fallback.delayed_bars(query))
                    .await
            }
        }
    }

    /// Account summary.
    pub async fn account(&self, caller: &Caller) -> Result<GatewayResponse<Account>, GatewayError> {
        let credentials = self.require_credentials(caller, "account").await?;
        let key = cache_key::scoped("account", caller);
        self.read_through(
            "account",
            &key,
            PRIMARY_ACCOUNT,
            self.primary.account(&credentials),
        )
        .await
    }

    /// Open positions.
    pub async fn positions(
        &self,
        caller: &Caller,
    ) -> Result<GatewayResponse<Vec<Position>>, GatewayError> {
        let credentials = self.require_credentials(caller, "positions").await?;
        let key = cache_key::scoped("positions", caller);
        self.read_through(
            "positions",
            &key,
            PRIMARY_ACCOUNT,
            self.primary.positions(&credentials),
        )
        .await
    }

    /// Account activity.
    pub async fn activities(
        &self,
        caller: &Caller,
    ) -> Result<GatewayResponse<Vec<Activity>>, GatewayError> {
        let credentials = self.require_credentials(caller, "activities").await?;
        let key = cache_key::scoped("activities", caller);
        self.read_through(
            "activities",
            &key,
            PRIMARY_ACCOUNT,
            self.primary.activities(&credentials),
        )
        .await
    }

    /// Recent orders.
    pub async fn orders(
        &self,
        caller: &Caller,
    ) -> Result<GatewayResponse<Vec<Order>>, GatewayError> {
        let credentials = self.require_credentials(caller, "orders").await?;
        let key = cache_key::scoped("orders", caller);
        self.read_through(
            "orders",
            &key,
            PRIMARY_ACCOUNT,
            self.primary.orders(&credentials),
        )
        .await
    }

    /// Options chain snapshot.
    pub async fn options_chain(
        &self,
        caller: &Caller,
        query: &ChainQuery,
    ) -> Result<GatewayResponse<ChainSnapshot>, GatewayError> {
        let underlying = query.underlying.trim().to_ascii_uppercase();
        if underlying.is_empty() {
            return Err(GatewayError::InvalidRequest(
                "underlying symbol is required".to_string(),
            ));
        }
        let query = ChainQuery {
            underlying,
            ..query.clone()
        };

        let credentials = self.require_credentials(caller, "options_chain").await?;
        let key = cache_key::options_chain(&query);
        self.read_through(
            "options_chain",
            &key,
            PRIMARY_ACCOUNT,
            self.primary.options_chain(&credentials, &query),
        )
        .await
    }

    /// Map an approximate contract onto the nearest live contract.
    pub async fn resolve_contract(
        &self,
        caller: &Caller,
        query: &ResolveContractQuery,
    ) -> Result<GatewayResponse<Resolution>, GatewayError> {
        let underlying = query.underlying.trim().to_ascii_uppercase();
        let chain_query = ChainQuery {
            underlying: underlying.clone(),
            expiration_date: None,
            option_type: Some(query.option_type),
        };
        let chain = self.options_chain(caller, &chain_query).await?;

        let underlying_price = match self.quotes(caller, &[underlying.clone()]).await {
            Ok(response) => response
                .data
                .get(&underlying)
                .map_or(0.0, |quote| quote.last_price),
            Err(e) => {
                tracing::debug!(underlying = %underlying, error = %e, "No underlying quote for resolution");
                0.0
            }
        };

        let resolver = ContractResolver::new(Utc::now().date_naive(), underlying_price);
        let resolution = resolver.resolve(&query.approx(), &chain.data);

        Ok(GatewayResponse {
            data: resolution,
            provenance: chain.provenance,
            note: chain.note,
        })
    }

    // ------------------------------------------------------------------
    // Trading operations
    // ------------------------------------------------------------------

    /// Submit an equity or crypto order.
    pub async fn submit_order(
        &self,
        caller: &Caller,
        request: &OrderRequest,
    ) -> Result<GatewayResponse<Order>, GatewayError> {
        request.validate()?;
        let credentials = self.require_credentials(caller, "submit_order").await?;

        let result = self.primary.submit_order(&credentials, request).await;
        record_provider_request(PRIMARY_ACCOUNT.provider, outcome(&result));
        let order = result.map_err(|e| GatewayError::from_provider("submit_order", e))?;

        tracing::info!(
            order_id = %order.id,
            symbol = %order.symbol,
            status = %order.status,
            "Order submitted"
        );
        self.invalidate_account_views(caller);
        Ok(GatewayResponse::new(order, Provenance::Live))
    }

    /// Cancel an order.
    pub async fn cancel_order(
        &self,
        caller: &Caller,
        order_id: &str,
    ) -> Result<GatewayResponse<CancelledOrder>, GatewayError> {
        let order_id = order_id.trim();
        if order_id.is_empty() {
            return Err(GatewayError::InvalidRequest("order id is required".to_string()));
        }
        let credentials = self.require_credentials(caller, "cancel_order").await?;

        let result = self.primary.cancel_order(&credentials, order_id).await;
        record_provider_request(PRIMARY_ACCOUNT.provider, outcome(&result));
        result.map_err(|e| GatewayError::from_provider("cancel_order", e))?;

        tracing::info!(order_id, "Order cancelled");
        self.invalidate_account_views(caller);
        Ok(GatewayResponse::new(
            CancelledOrder {
                order_id: order_id.to_string(),
                cancelled: true,
            },
            Provenance::Live,
        ))
    }

    /// Submit a single-leg options order.
    pub async fn submit_options_order(
        &self,
        caller: &Caller,
        request: &OptionsOrderRequest,
    ) -> Result<GatewayResponse<Order>, GatewayError> {
        request.validate()?;
        OccSymbol::parse(&request.occ_symbol)
            .map_err(|e| GatewayError::InvalidRequest(e.to_string()))?;
        let credentials = self.require_credentials(caller, "submit_options_order").await?;

        let result = self
            .primary
            .submit_options_order(&credentials, request)
            .await;
        record_provider_request(PRIMARY_ACCOUNT.provider, outcome(&result));
        let order = result.map_err(|e| GatewayError::from_provider("submit_options_order", e))?;

        tracing::info!(order_id = %order.id, contract = %order.symbol, "Options order submitted");
        self.invalidate_account_views(caller);
        Ok(GatewayResponse::new(order, Provenance::Live))
    }

    // ------------------------------------------------------------------
    // Pipeline helpers
    // ------------------------------------------------------------------

    /// Usable credentials for `caller`. Blank credentials count as none;
    /// malformed ones are an error.
    async fn credentials(&self, caller: &Caller) -> Result<Option<Credentials>, GatewayError> {
        let Some(credentials) = self.credentials.resolve(caller).await else {
            return Ok(None);
        };
        if credentials.is_blank() {
            return Ok(None);
        }
        credentials.validate()?;
        Ok(Some(credentials))
    }

    async fn require_credentials(
        &self,
        caller: &Caller,
        operation: &str,
    ) -> Result<Credentials, GatewayError> {
        self.credentials(caller)
            .await?
            .ok_or_else(|| GatewayError::credentials_required(operation))
    }

    fn invalidate_account_views(&self, caller: &Caller) {
        for operation in ["orders", "positions", "account"] {
            self.cache.invalidate(&cache_key::scoped(operation, caller));
        }
    }

    /// Fresh cache lookup.
    fn cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let Some(payload) = self.cache.get(key) else {
            record_cache_lookup("miss");
            tracing::debug!(key = %key, "Cache miss");
            return None;
        };
        match serde_json::from_value(payload) {
            Ok(data) => {
                record_cache_lookup("hit");
                tracing::debug!(key = %key, "Cache hit");
                Some(data)
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Discarding undecodable cache entry");
                self.cache.invalidate(key);
                None
            }
        }
    }

    /// Stale-tier lookup.
    fn stale<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let data = self
            .cache
            .get_stale(key)
            .and_then(|payload| serde_json::from_value(payload).ok());
        if data.is_some() {
            record_cache_lookup("stale");
        }
        data
    }

    fn store<T: Serialize>(&self, key: &str, data: &T) {
        match serde_json::to_value(data) {
            Ok(payload) => self.cache.put(key, payload),
            Err(e) => tracing::warn!(key = %key, error = %e, "Failed to cache response"),
        }
    }

    /// Bounded provider call. A timeout becomes a connection error.
    async fn call<T, Fut>(&self, provider: &'static str, fetch: Fut) -> Result<T, ProviderError>
    where
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let result = match tokio::time::timeout(self.config.request_timeout, fetch).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Connection(format!(
                "request timed out after {}ms",
                self.config.request_timeout.as_millis()
            ))),
        };
        record_provider_request(provider, outcome(&result));
        result
    }

    /// Cache-aside read with degradation.
    async fn read_through<T, Fut>(
        &self,
        operation: &'static str,
        key: &str,
        source: Source,
        fetch: Fut,
    ) -> Result<GatewayResponse<T>, GatewayError>
    where
        T: Serialize + DeserializeOwned + Default,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        if let Some(data) = self.cached::<T>(key) {
            return Ok(GatewayResponse::new(data, Provenance::Cached));
        }

        if source.throttled {
            self.throttle.await_slot().await;
        }

        let error = match self.call(source.provider, fetch).await {
            Ok(data) => {
                self.store(key, &data);
                return Ok(GatewayResponse::new(data, source.provenance));
            }
            Err(e) => GatewayError::from_provider(operation, e),
        };

        if !(error.is_degradable() || source.degrade_on_any_error) {
            return Err(error);
        }

        if let Some(data) = self.stale::<T>(key) {
            tracing::warn!(operation, key = %key, error = %error, "Serving stale cache entry");
            return Ok(GatewayResponse::new(data, Provenance::Stale)
                .with_note(degradation_note(&error, Provenance::Stale)));
        }

        tracing::warn!(operation, key = %key, error = %error, "No cached data, returning empty payload");
        Ok(GatewayResponse::new(T::default(), Provenance::Unavailable)
            .with_note(degradation_note(&error, Provenance::Unavailable)))
    }
}

fn outcome<T>(result: &Result<T, ProviderError>) -> &'static str {
    result.as_ref().map_or_else(ProviderError::kind, |_| "ok")
}
