//! Symbol classifier.

use serde::{Deserialize, Serialize};

/// Quote currency appended to bare crypto roots.
const QUOTE_CURRENCY: &str = "USD";

/// Known crypto roots. Anything not listed (and without a `/`) is a stock.
pub const CRYPTO_ROOTS: &[&str] = &[
    "BTC", "ETH", "SOL", "DOGE", "AVAX", "LINK", "UNI", "AAVE", "LTC", "BCH", "XRP", "ADA", "DOT",
    "SHIB", "MATIC", "USDT", "USDC", "PEPE", "TRX", "XTZ", "YFI", "SUSHI", "GRT", "CRV", "MKR",
    "BAT",
];

/// Asset class of an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    /// Listed equity or ETF.
    #[default]
    Stock,
    /// Crypto pair.
    Crypto,
}

impl AssetClass {
    /// Check if this is a crypto pair.
    #[must_use]
    pub const fn is_crypto(&self) -> bool {
        matches!(self, Self::Crypto)
    }
}

impl std::fmt::Display for AssetClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stock => write!(f, "stock"),
            Self::Crypto => write!(f, "crypto"),
        }
    }
}

fn canonical(symbol: &str) -> String {
    symbol.trim().to_ascii_uppercase()
}

fn is_known_root(root: &str) -> bool {
    CRYPTO_ROOTS.contains(&root)
}

/// Extract the root of a symbol: the base asset of a pair, or the symbol itself.
///
/// `btc/usd`, `BTC-USD` and `BTCUSD` all yield `BTC`; `AAPL` yields `AAPL`.
#[must_use]
pub fn root(symbol: &str) -> String {
    let upper = canonical(symbol);

    if let Some((base, _)) = upper.split_once(['/', '-']) {
        return base.to_string();
    }

    // Brokerage position feeds report pairs without a separator (BTCUSD)
    if let Some(base) = upper.strip_suffix(QUOTE_CURRENCY)
        && is_known_root(base)
    {
        return base.to_string();
    }

    upper
}

/// Classify a symbol as stock or crypto.
///
/// Total: unrecognized tickers default to [`AssetClass::Stock`].
#[must_use]
pub fn classify(symbol: &str) -> AssetClass {
    if symbol.contains('/') || is_known_root(&root(symbol)) {
        AssetClass::Crypto
    } else {
        AssetClass::Stock
    }
}

/// Normalize a symbol to its canonical form.
///
/// Pairs already containing `/` are uppercased and dash pairs are rewritten
/// (`ETH-BTC` becomes `ETH/BTC`). Only a bare crypto root gets the default
/// quote currency (`ROOT/USD`). Stocks are uppercased and otherwise left alone, so
/// `classify(normalize(s)) == classify(s)` for every input.
#[must_use]
pub fn normalize(symbol: &str) -> String {
    let upper = canonical(symbol);

    if upper.contains('/') {
        return upper;
    }

    match classify(&upper) {
        AssetClass::Crypto => match upper.split_once('-') {
            Some((base, quote)) if !quote.is_empty() => format!("{base}/{quote}"),
            _ => format!("{}/{QUOTE_CURRENCY}", root(&upper)),
        },
        AssetClass::Stock => upper,
    }
}
