//! Alpaca payloads to canonical records.
//!
//! One function per record type. String-typed numbers are parsed here and
//! nowhere else; a bad field becomes `0` instead of failing the batch.

use crate::domain::instrument::{AssetClass, classify};
use crate::domain::market::{
    Account, Activity, Bar, Order, Position, Quote, parse_number, parse_optional_number,
};
use crate::domain::options::{ContractSnapshot, Greeks};

use super::api_types::{
    AccountWire, ActivityWire, BarWire, OptionSnapshotWire, OrderWire, PositionWire, QuoteWire,
    StockSnapshotWire, TradeWire,
};

fn number(value: Option<&String>) -> f64 {
    value.map_or(0.0, |v| parse_number(v))
}

fn optional_number(value: Option<&String>) -> Option<f64> {
    parse_optional_number(value.map(String::as_str))
}

/// Last trade price, falling back to the ask.
fn last_price(trade: Option<&TradeWire>, quote: Option<&QuoteWire>) -> f64 {
    trade
        .map(|t| t.p)
        .filter(|p| *p > 0.0)
        .or_else(|| quote.map(|q| q.ap))
        .unwrap_or(0.0)
}

fn asset_class_of(symbol: &str, provider_class: Option<&str>) -> AssetClass {
    match provider_class {
        Some("crypto") => AssetClass::Crypto,
        Some(_) => AssetClass::Stock,
        None => classify(symbol),
    }
}

/// Equity quote from a snapshot. Change is measured against the previous
/// daily bar's close.
pub fn stock_quote(symbol: &str, snapshot: &StockSnapshotWire) -> Quote {
    let trade = snapshot.latest_trade.as_ref();
    let book = snapshot.latest_quote.as_ref();
    let previous_close = snapshot.prev_daily_bar.as_ref().map_or(0.0, |bar| bar.c);

    let quote = Quote::new(
        symbol,
        AssetClass::Stock,
        last_price(trade, book),
        previous_close,
    )
    .with_timestamp(trade.and_then(|t| t.t).or_else(|| book.and_then(|q| q.t)));

    match book {
        Some(q) => quote.with_book(q.bp, q.ap, q.bs, q.ask_size),
        None => quote,
    }
}

/// Previous session close from ascending daily bars.
///
/// The newest bar is the session in progress, so the one before it holds
/// the prior close. With a single bar its open is the best estimate.
pub fn previous_close(bars: &[BarWire]) -> f64 {
    match bars {
        [.., prior, _] => prior.c,
        [only] => only.o,
        [] => 0.0,
    }
}

/// Crypto quote from the latest trade, latest quote and recent daily bars.
pub fn crypto_quote(
    symbol: &str,
    trade: Option<&TradeWire>,
    book: Option<&QuoteWire>,
    daily_bars: &[BarWire],
) -> Quote {
    let quote = Quote::new(
        symbol,
        AssetClass::Crypto,
        last_price(trade, book),
        previous_close(daily_bars),
    )
    .with_timestamp(trade.and_then(|t| t.t).or_else(|| book.and_then(|q| q.t)));

    match book {
        Some(q) => quote.with_book(q.bp, q.ap, q.bs, q.ask_size),
        None => quote,
    }
}

/// Bar.
pub fn bar(wire: &BarWire) -> Bar {
    Bar {
        time: wire.t,
        open: wire.o,
        high: wire.h,
        low: wire.l,
        close: wire.c,
        volume: wire.v,
    }
}

/// Account.
pub fn account(wire: AccountWire) -> Account {
    Account {
        cash: number(wire.cash.as_ref()),
        equity: number(wire.equity.as_ref()),
        last_equity: number(wire.last_equity.as_ref()),
        buying_power: number(wire.buying_power.as_ref()),
        portfolio_value: number(wire.portfolio_value.as_ref()),
        long_market_value: number(wire.long_market_value.as_ref()),
        short_market_value: number(wire.short_market_value.as_ref()),
        daytrade_count: wire.daytrade_count.unwrap_or(0),
        pattern_day_trader: wire.pattern_day_trader.unwrap_or(false),
        trading_blocked: wire.trading_blocked.unwrap_or(false),
        id: wire.id,
        account_number: wire.account_number,
        status: wire.status,
        currency: wire.currency,
    }
}

/// Position.
pub fn position(wire: PositionWire) -> Position {
    Position {
        asset_type: asset_class_of(&wire.symbol, wire.asset_class.as_deref()),
        qty: number(wire.qty.as_ref()),
        avg_entry_price: number(wire.avg_entry_price.as_ref()),
        current_price: number(wire.current_price.as_ref()),
        market_value: number(wire.market_value.as_ref()),
        cost_basis: number(wire.cost_basis.as_ref()),
        unrealized_pl: number(wire.unrealized_pl.as_ref()),
        unrealized_plpc: number(wire.unrealized_plpc.as_ref()),
        change_today: number(wire.change_today.as_ref()),
        symbol: wire.symbol,
        side: wire.side,
    }
}

/// Order, legs included.
pub fn order(wire: OrderWire) -> Order {
    Order {
        asset_type: asset_class_of(&wire.symbol, wire.asset_class.as_deref()),
        qty: number(wire.qty.as_ref()),
        filled_qty: number(wire.filled_qty.as_ref()),
        filled_avg_price: optional_number(wire.filled_avg_price.as_ref()),
        limit_price: optional_number(wire.limit_price.as_ref()),
        stop_price: optional_number(wire.stop_price.as_ref()),
        legs: wire.legs.unwrap_or_default().into_iter().map(order).collect(),
        id: wire.id,
        client_order_id: wire.client_order_id,
        symbol: wire.symbol,
        side: wire.side,
        order_type: wire.order_type,
        time_in_force: wire.time_in_force,
        status: wire.status,
        order_class: wire.order_class.filter(|c| !c.is_empty()),
        submitted_at: wire.submitted_at,
    }
}

/// Account activity.
pub fn activity(wire: ActivityWire) -> Activity {
    Activity {
        qty: optional_number(wire.qty.as_ref()),
        price: optional_number(wire.price.as_ref()),
        net_amount: optional_number(wire.net_amount.as_ref()),
        date: wire.transaction_time.or(wire.date),
        id: wire.id,
        activity_type: wire.activity_type,
        symbol: wire.symbol,
        side: wire.side,
    }
}

/// Option contract snapshot.
pub fn contract_snapshot(wire: &OptionSnapshotWire) -> ContractSnapshot {
    let book = wire.latest_quote.as_ref();
    ContractSnapshot {
        bid: book.map_or(0.0, |q| q.bp),
        ask: book.map_or(0.0, |q| q.ap),
        last: wire.latest_trade.as_ref().map(|t| t.p).filter(|p| *p > 0.0),
        open_interest: None,
        volume: wire.daily_bar.as_ref().map(|b| b.v),
        greeks: wire.greeks.as_ref().map(|g| Greeks {
            delta: g.delta,
            gamma: g.gamma,
            theta: g.theta,
            vega: g.vega,
            rho: g.rho,
        }),
        implied_volatility: wire.implied_volatility,
    }
}
