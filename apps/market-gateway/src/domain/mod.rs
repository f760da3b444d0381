//! Domain Layer
//!
//! Pure gateway logic: no network, no clocks beyond what callers pass in.
//!
//! - `instrument`: Symbol classification (stock vs. crypto)
//! - `market`: Canonical quote, bar, account and order records
//! - `options`: OCC identifiers and nearest-contract resolution

pub mod instrument;
pub mod market;
pub mod options;
