//! Instrument classification.
//!
//! Decides whether a user-supplied symbol is an equity or a crypto pair and
//! normalizes crypto symbols to the canonical `BASE/USD` form the brokerage
//! data API expects.

mod classifier;

pub use classifier::{AssetClass, CRYPTO_ROOTS, classify, normalize, root};
