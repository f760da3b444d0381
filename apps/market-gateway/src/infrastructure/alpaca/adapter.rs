//! Alpaca adapter implementing `PrimaryProvider`.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};

use crate::application::ports::{Credentials, PrimaryProvider, ProviderError};
use crate::domain::market::{
    Account, Activity, Bar, BarsQuery, OptionsOrderRequest, Order, OrderRequest, Position, Quote,
    TimeInForce, Timeframe,
};
use crate::domain::options::{ChainQuery, ChainSnapshot};

use super::api_types::{
    AccountWire, ActivityWire, AlpacaOrderRequest, BarWire, BarsResponse, CryptoQuotesResponse,
    CryptoTradesResponse, MultiBarsResponse, OptionSnapshotsResponse, OrderWire, PositionWire,
    StockSnapshotsResponse, StopLossLeg, TakeProfitLeg,
};
use super::config::{AlpacaConfig, AlpacaEnvironment};
use super::error::AlpacaError;
use super::http_client::AlpacaHttpClient;
use super::normalizer;

/// Upper bound on pages followed for paginated endpoints.
const MAX_PAGES: usize = 5;

/// Page size for bar requests.
const BAR_PAGE_LIMIT: &str = "1000";

/// Page size for option snapshot requests.
const OPTION_PAGE_LIMIT: &str = "250";

fn rfc3339(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Default lookback when a bars request has no start.
fn default_lookback(timeframe: Timeframe) -> chrono::Duration {
    match timeframe {
        Timeframe::OneMinute | Timeframe::FiveMinutes | Timeframe::FifteenMinutes => {
            chrono::Duration::days(5)
        }
        Timeframe::OneHour => chrono::Duration::days(30),
        Timeframe::OneDay => chrono::Duration::days(365),
        Timeframe::OneWeek => chrono::Duration::days(365 * 5),
    }
}

/// Alpaca Markets adapter.
///
/// Implements `PrimaryProvider` for the Alpaca trading and market data APIs.
#[derive(Debug, Clone)]
pub struct AlpacaProvider {
    client: AlpacaHttpClient,
    config: AlpacaConfig,
}

impl AlpacaProvider {
    /// Create a new Alpaca adapter.
    pub fn new(config: AlpacaConfig) -> Result<Self, AlpacaError> {
        let client = AlpacaHttpClient::new(&config)?;
        Ok(Self { client, config })
    }

    /// Trading environment.
    #[must_use]
    pub const fn environment(&self) -> AlpacaEnvironment {
        self.config.environment
    }

    fn crypto_path(&self, suffix: &str) -> String {
        format!("/v1beta3/crypto/{}/{suffix}", self.config.crypto_location)
    }

    /// Convert an equity or crypto order to Alpaca API format.
    ///
    /// Crypto: normalized pair, GTC, no legs. Equities: DAY, with an order
    /// class when stop-loss or take-profit legs are present.
    fn to_alpaca_order_request(request: &OrderRequest) -> AlpacaOrderRequest {
        let shape = request.shape();
        let legs = shape.legs;

        AlpacaOrderRequest {
            symbol: shape.symbol,
            qty: request.qty.normalize().to_string(),
            side: request.side.as_str().to_string(),
            order_type: request.order_type.as_str().to_string(),
            time_in_force: shape.time_in_force.as_str().to_string(),
            limit_price: request.limit_price.map(|p| p.to_string()),
            stop_price: request.stop_price.map(|p| p.to_string()),
            order_class: legs.map(|l| l.order_class().to_string()),
            stop_loss: legs.and_then(|l| l.stop_loss).map(|p| StopLossLeg {
                stop_price: p.to_string(),
            }),
            take_profit: legs.and_then(|l| l.take_profit).map(|p| TakeProfitLeg {
                limit_price: p.to_string(),
            }),
            client_order_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Convert an options order to Alpaca API format. Options are DAY only
    /// and never carry legs.
    fn to_alpaca_options_request(request: &OptionsOrderRequest) -> AlpacaOrderRequest {
        AlpacaOrderRequest {
            symbol: request.occ_symbol.trim().to_ascii_uppercase(),
            qty: request.qty.normalize().to_string(),
            side: request.side.as_str().to_string(),
            order_type: request.order_type.as_str().to_string(),
            time_in_force: TimeInForce::Day.as_str().to_string(),
            limit_price: request.limit_price.map(|p| p.to_string()),
            stop_price: None,
            order_class: None,
            stop_loss: None,
            take_profit: None,
            client_order_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    async fn submit(
        &self,
        credentials: &Credentials,
        request: &AlpacaOrderRequest,
    ) -> Result<Order, ProviderError> {
        if self.config.environment.is_live() {
            tracing::warn!(
                client_order_id = %request.client_order_id,
                symbol = %request.symbol,
                "Submitting LIVE order - this will execute real trades"
            );
        }

        tracing::info!(
            client_order_id = %request.client_order_id,
            symbol = %request.symbol,
            side = %request.side,
            order_type = %request.order_type,
            time_in_force = %request.time_in_force,
            order_class = ?request.order_class,
            qty = %request.qty,
            "Submitting order to Alpaca"
        );

        let response: OrderWire = self
            .client
            .post(credentials, "/v2/orders", request)
            .await
            .map_err(ProviderError::from)?;

        tracing::info!(
            client_order_id = %request.client_order_id,
            broker_order_id = %response.id,
            status = %response.status,
            "Order accepted by Alpaca"
        );

        Ok(normalizer::order(response))
    }

    fn bar_params(query: &BarsQuery) -> Vec<(&'static str, String)> {
        let start = query
            .start
            .unwrap_or_else(|| Utc::now() - default_lookback(query.timeframe));
        let mut params = vec![
            ("timeframe", query.timeframe.as_str().to_string()),
            ("start", rfc3339(&start)),
            ("limit", BAR_PAGE_LIMIT.to_string()),
        ];
        if let Some(end) = &query.end {
            params.push(("end", rfc3339(end)));
        }
        params
    }

    async fn stock_bars(
        &self,
        credentials: &Credentials,
        symbol: &str,
        query: &BarsQuery,
    ) -> Result<Vec<BarWire>, AlpacaError> {
        let path = format!("/v2/stocks/{symbol}/bars");
        let mut params = Self::bar_params(query);
        params.push(("feed", self.config.stock_feed.clone()));
        params.push(("adjustment", "raw".to_string()));

        let mut bars = Vec::new();
        let mut page_token: Option<String> = None;
        for _ in 0..MAX_PAGES {
            let mut page_params = params.clone();
            if let Some(token) = page_token.take() {
                page_params.push(("page_token", token));
            }
            let page: BarsResponse = self
                .client
                .data_get(credentials, &path, &page_params)
                .await?;
            bars.extend(page.bars.unwrap_or_default());
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }
        Ok(bars)
    }

    async fn crypto_bars(
        &self,
        credentials: &Credentials,
        symbol: &str,
        query: &BarsQuery,
    ) -> Result<Vec<BarWire>, AlpacaError> {
        let path = self.crypto_path("bars");
        let mut params = Self::bar_params(query);
        params.push(("symbols", symbol.to_string()));

        let mut bars = Vec::new();
        let mut page_token: Option<String> = None;
        for _ in 0..MAX_PAGES {
            let mut page_params = params.clone();
            if let Some(token) = page_token.take() {
                page_params.push(("page_token", token));
            }
            let mut page: MultiBarsResponse = self
                .client
                .data_get(credentials, &path, &page_params)
                .await?;
            bars.extend(page.bars.remove(symbol).unwrap_or_default());
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }
        Ok(bars)
    }
}

#[async_trait]
impl PrimaryProvider for AlpacaProvider {
    async fn stock_quotes(
        &self,
        credentials: &Credentials,
        symbols: &[String],
    ) -> Result<Vec<Quote>, ProviderError> {
        let params = [
            ("symbols", symbols.join(",")),
            ("feed", self.config.stock_feed.clone()),
        ];
        let snapshots: StockSnapshotsResponse = self
            .client
            .data_get(credentials, "/v2/stocks/snapshots", &params)
            .await?;

        let quotes = symbols
            .iter()
            .filter_map(|symbol| match snapshots.get(symbol) {
                Some(Some(snapshot)) => Some(normalizer::stock_quote(symbol, snapshot)),
                _ => {
                    tracing::debug!(symbol = %symbol, "No snapshot returned");
                    None
                }
            })
            .collect();
        Ok(quotes)
    }

    async fn crypto_quotes(
        &self,
        credentials: &Credentials,
        symbols: &[String],
    ) -> Result<Vec<Quote>, ProviderError> {
        let joined = symbols.join(",");
        let trades_path = self.crypto_path("latest/trades");
        let quotes_path = self.crypto_path("latest/quotes");
        let bars_path = self.crypto_path("bars");
        let symbol_params = [("symbols", joined.clone())];
        let bar_params = [
            ("symbols", joined),
            ("timeframe", Timeframe::OneDay.as_str().to_string()),
            ("start", rfc3339(&(Utc::now() - chrono::Duration::days(3)))),
        ];

        let (trades, books, mut bars) = tokio::try_join!(
            self.client
                .data_get::<CryptoTradesResponse>(credentials, &trades_path, &symbol_params),
            self.client
                .data_get::<CryptoQuotesResponse>(credentials, &quotes_path, &symbol_params),
            self.client
                .data_get::<MultiBarsResponse>(credentials, &bars_path, &bar_params),
        )?;

        let quotes = symbols
            .iter()
            .filter_map(|symbol| {
                let trade = trades.trades.get(symbol);
                let book = books.quotes.get(symbol);
                if trade.is_none() && book.is_none() {
                    tracing::debug!(symbol = %symbol, "No crypto trade or quote returned");
                    return None;
                }
                let daily = bars.bars.remove(symbol).unwrap_or_default();
                Some(normalizer::crypto_quote(symbol, trade, book, &daily))
            })
            .collect();
        Ok(quotes)
    }

    async fn bars(
        &self,
        credentials: &Credentials,
        query: &BarsQuery,
    ) -> Result<Vec<Bar>, ProviderError> {
        let symbol = query.provider_symbol();
        let wire = if query.asset_class().is_crypto() {
            self.crypto_bars(credentials, &symbol, query).await?
        } else {
            self.stock_bars(credentials, &symbol, query).await?
        };
        Ok(wire.iter().map(normalizer::bar).collect())
    }

    async fn account(&self, credentials: &Credentials) -> Result<Account, ProviderError> {
        let wire: AccountWire = self.client.get(credentials, "/v2/account", &[]).await?;
        Ok(normalizer::account(wire))
    }

    async fn positions(&self, credentials: &Credentials) -> Result<Vec<Position>, ProviderError> {
        let wire: Vec<PositionWire> = self.client.get(credentials, "/v2/positions", &[]).await?;
        Ok(wire.into_iter().map(normalizer::position).collect())
    }

    async fn activities(
        &self,
        credentials: &Credentials,
    ) -> Result<Vec<Activity>, ProviderError> {
        let params = [("page_size", "50".to_string()), ("direction", "desc".to_string())];
        let wire: Vec<ActivityWire> = self
            .client
            .get(credentials, "/v2/account/activities", &params)
            .await?;
        Ok(wire.into_iter().map(normalizer::activity).collect())
    }

    async fn orders(&self, credentials: &Credentials) -> Result<Vec<Order>, ProviderError> {
        let params = [
            ("status", "all".to_string()),
            ("limit", "50".to_string()),
            ("nested", "true".to_string()),
        ];
        let wire: Vec<OrderWire> = self.client.get(credentials, "/v2/orders", &params).await?;
        Ok(wire.into_iter().map(normalizer::order).collect())
    }

    async fn submit_order(
        &self,
        credentials: &Credentials,
        request: &OrderRequest,
    ) -> Result<Order, ProviderError> {
        let alpaca_request = Self::to_alpaca_order_request(request);
        self.submit(credentials, &alpaca_request).await
    }

    async fn cancel_order(
        &self,
        credentials: &Credentials,
        order_id: &str,
    ) -> Result<(), ProviderError> {
        tracing::info!(broker_order_id = %order_id, "Canceling order");
        self.client
            .delete(credentials, &format!("/v2/orders/{order_id}"))
            .await
            .map_err(ProviderError::from)
    }

    async fn options_chain(
        &self,
        credentials: &Credentials,
        query: &ChainQuery,
    ) -> Result<ChainSnapshot, ProviderError> {
        let path = format!("/v1beta1/options/snapshots/{}", query.underlying);
        let mut params = vec![
            ("feed", "indicative".to_string()),
            ("limit", OPTION_PAGE_LIMIT.to_string()),
        ];
        if let Some(option_type) = query.option_type {
            params.push(("type", option_type.as_str().to_string()));
        }
        if let Some(expiration) = query.expiration_date {
            params.push(("expiration_date", expiration.to_string()));
        }

        let mut chain = ChainSnapshot::new();
        let mut page_token: Option<String> = None;
        for _ in 0..MAX_PAGES {
            let mut page_params = params.clone();
            if let Some(token) = page_token.take() {
                page_params.push(("page_token", token));
            }
            let page: OptionSnapshotsResponse = self
                .client
                .data_get(credentials, &path, &page_params)
                .await?;
            chain.extend(
                page.snapshots
                    .iter()
                    .map(|(id, snapshot)| (id.clone(), normalizer::contract_snapshot(snapshot))),
            );
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        tracing::debug!(underlying = %query.underlying, contracts = chain.len(), "Fetched options chain");
        Ok(chain)
    }

    async fn submit_options_order(
        &self,
        credentials: &Credentials,
        request: &OptionsOrderRequest,
    ) -> Result<Order, ProviderError> {
        let alpaca_request = Self::to_alpaca_options_request(request);
        self.submit(credentials, &alpaca_request).await
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::domain::market::{OrderSide, OrderType};

    #[test]
    fn crypto_order_is_gtc_without_legs() {
        let request = OrderRequest::market("btc/usd", dec!(0.01), OrderSide::Buy)
            .with_bracket(Some(dec!(30000)), Some(dec!(90000)));

        let alpaca = AlpacaProvider::to_alpaca_order_request(&request);

        assert_eq!(alpaca.symbol, "BTC/USD");
        assert_eq!(alpaca.time_in_force, "gtc");
        assert_eq!(alpaca.qty, "0.01");
        assert!(alpaca.order_class.is_none());
        assert!(alpaca.stop_loss.is_none());
        assert!(alpaca.take_profit.is_none());
    }

    #[test]
    fn equity_bracket_order() {
        let request = OrderRequest::limit("AAPL", dec!(10), OrderSide::Buy, dec!(190))
            .with_bracket(Some(dec!(180)), Some(dec!(210)));

        let alpaca = AlpacaProvider::to_alpaca_order_request(&request);

        assert_eq!(alpaca.time_in_force, "day");
        assert_eq!(alpaca.order_class.as_deref(), Some("bracket"));
        assert_eq!(alpaca.stop_loss.unwrap().stop_price, "180");
        assert_eq!(alpaca.take_profit.unwrap().limit_price, "210");
        assert_eq!(alpaca.limit_price.as_deref(), Some("190"));
    }

    #[test]
    fn equity_single_leg_is_oto() {
        let request =
            OrderRequest::market("MSFT", dec!(5), OrderSide::Buy).with_bracket(Some(dec!(400)), None);

        let alpaca = AlpacaProvider::to_alpaca_order_request(&request);

        assert_eq!(alpaca.order_class.as_deref(), Some("oto"));
        assert!(alpaca.take_profit.is_none());
    }

    #[test]
    fn plain_equity_order_has_no_class() {
        let request = OrderRequest::market("SPY", dec!(1), OrderSide::Sell);

        let alpaca = AlpacaProvider::to_alpaca_order_request(&request);

        assert!(alpaca.order_class.is_none());
        assert_eq!(alpaca.side, "sell");
    }

    #[test]
    fn options_order_is_day_only() {
        let request = OptionsOrderRequest {
            occ_symbol: "spy250117c00450000".into(),
            qty: dec!(2),
            side: OrderSide::Buy,
            order_type: OrderType::Limit,
            limit_price: Some(dec!(3.25)),
        };

        let alpaca = AlpacaProvider::to_alpaca_options_request(&request);

        assert_eq!(alpaca.symbol, "SPY250117C00450000");
        assert_eq!(alpaca.time_in_force, "day");
        assert_eq!(alpaca.limit_price.as_deref(), Some("3.25"));
        assert!(alpaca.order_class.is_none());
    }

    #[test]
    fn lookback_scales_with_timeframe() {
        assert!(default_lookback(Timeframe::OneMinute) < default_lookback(Timeframe::OneDay));
        assert!(default_lookback(Timeframe::OneDay) < default_lookback(Timeframe::OneWeek));
    }
}
