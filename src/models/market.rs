//! # models::market
//!
//! Market-facing domain types shared between the session engine and the
//! [`QuoteSource`](crate::source::QuoteSource) boundary: contract
//! specifications, qualified contracts, option chain metadata and the
//! latest-value quote record pushed by the provider.

use serde::{Deserialize, Serialize};

// ─── OptionRight ──────────────────────────────────────────────────────────────

/// Side of an option contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionRight {
    Call,
    Put,
}

impl OptionRight {
    /// Single-letter code used in contract specifications (`"C"` / `"P"`).
    pub fn code(self) -> &'static str {
        match self {
            OptionRight::Call => "C",
            OptionRight::Put => "P",
        }
    }
}

// ─── DataMode ─────────────────────────────────────────────────────────────────

/// Market-data mode requested from the provider after connecting.
///
/// Maps onto the provider's market-data type codes (live = 1, delayed = 3).
/// Operator-selected at startup, never changed mid-session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataMode {
    Live,
    Delayed,
}

impl DataMode {
    pub fn provider_code(self) -> u8 {
        match self {
            DataMode::Live => 1,
            DataMode::Delayed => 3,
        }
    }
}

// ─── Expiry ───────────────────────────────────────────────────────────────────

/// One tracked expiration, resolved once at startup by expiry discovery and
/// immutable for the rest of the session.
///
/// `dte_label` is a display index (`"0DTE"`, `"1DTE"`, …) assigned in
/// ascending date order — it is *not* a computed day count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expiry {
    /// Expiration date in `YYYYMMDD` form (provider wire format).
    pub date: String,
    /// Venue-specific product tag (e.g. the PM-settled weekly class).
    pub trading_class: String,
    /// Display label, fixed at discovery time.
    pub dte_label: String,
}

// ─── ContractSpec ─────────────────────────────────────────────────────────────

/// What the core asks the provider to qualify.
///
/// The core builds these from configuration + discovery output; the provider
/// resolves each into a [`QualifiedContract`] carrying its opaque id.
#[derive(Debug, Clone, PartialEq)]
pub enum ContractSpec {
    Index {
        symbol: String,
        venue: String,
    },
    Option {
        symbol: String,
        expiry: String,
        strike: f64,
        right: OptionRight,
        venue: String,
        trading_class: String,
    },
}

impl ContractSpec {
    pub fn index(symbol: &str, venue: &str) -> Self {
        ContractSpec::Index {
            symbol: symbol.to_string(),
            venue: venue.to_string(),
        }
    }

    pub fn option(
        symbol: &str,
        expiry: &str,
        strike: f64,
        right: OptionRight,
        venue: &str,
        trading_class: &str,
    ) -> Self {
        ContractSpec::Option {
            symbol: symbol.to_string(),
            expiry: expiry.to_string(),
            strike,
            right,
            venue: venue.to_string(),
            trading_class: trading_class.to_string(),
        }
    }

    /// Expiry date of an option spec, `None` for index specs.
    pub fn expiry(&self) -> Option<&str> {
        match self {
            ContractSpec::Option { expiry, .. } => Some(expiry.as_str()),
            ContractSpec::Index { .. } => None,
        }
    }
}

// ─── QualifiedContract ────────────────────────────────────────────────────────

/// A contract the provider has resolved to a concrete listing.
///
/// `id` is provider-assigned and opaque — the core never interprets it, it
/// only hands the contract back for subscription and cancellation.
#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedContract {
    pub id: u64,
    pub spec: ContractSpec,
}

// ─── ChainParams ──────────────────────────────────────────────────────────────

/// One option chain entry returned by `discover_chain` — the provider's
/// security-definition parameters for an underlying on one venue.
#[derive(Debug, Clone)]
pub struct ChainParams {
    pub trading_class: String,
    pub venue: String,
    pub expirations: Vec<String>,
}

// ─── TickerQuote ──────────────────────────────────────────────────────────────

/// Latest observed quote + model greeks for one subscribed contract.
///
/// Every field is `None` until the provider has pushed a value for it.
/// Last-write-wins, no ordering guarantee between fields of one update,
/// no history — the provider replaces the whole record on each push.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickerQuote {
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    pub last: Option<f64>,
    pub close: Option<f64>,
    pub implied_vol: Option<f64>,
    pub gamma: Option<f64>,
    pub theta: Option<f64>,
}

/// A price is usable only if it is a finite positive number. Zero, negative
/// and NaN all mean "no market" and render as 0.0 downstream.
pub fn is_valid_price(value: Option<f64>) -> bool {
    matches!(value, Some(v) if v.is_finite() && v > 0.0)
}

impl TickerQuote {
    /// Best available underlying price: last trade if valid, else prior
    /// close, else `None`.
    pub fn spot(&self) -> Option<f64> {
        if is_valid_price(self.last) {
            self.last
        } else if is_valid_price(self.close) {
            self.close
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_price_rejects_junk() {
        assert!(is_valid_price(Some(12.5)));
        assert!(!is_valid_price(Some(0.0)));
        assert!(!is_valid_price(Some(-3.0)));
        assert!(!is_valid_price(Some(f64::NAN)));
        assert!(!is_valid_price(Some(f64::INFINITY)));
        assert!(!is_valid_price(None));
    }

    #[test]
    fn test_spot_prefers_last_then_close() {
        let mut q = TickerQuote {
            last: Some(5001.0),
            close: Some(4990.0),
            ..Default::default()
        };
        assert_eq!(q.spot(), Some(5001.0));

        q.last = Some(f64::NAN);
        assert_eq!(q.spot(), Some(4990.0));

        q.close = None;
        assert_eq!(q.spot(), None);
    }
}
