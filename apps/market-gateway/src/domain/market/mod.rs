//! Canonical market and brokerage records.
//!
//! Every provider payload is normalized into these types at the adapter
//! boundary. Numeric fields are `f64` internally; provider strings never
//! travel past the normalizer.

mod account;
mod bar;
mod numbers;
mod order;
mod quote;

pub use account::{Account, Activity, Position};
pub use bar::{Bar, BarsQuery, Timeframe};
pub use numbers::{change_percent, parse_number, parse_optional_number};
pub use order::{
    BracketLegs, OptionsOrderRequest, Order, OrderError, OrderRequest, OrderShape, OrderSide,
    OrderType, TimeInForce,
};
pub use quote::Quote;
