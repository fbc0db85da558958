//! # engine::expiries
//!
//! One-shot startup discovery of the expirations to monitor.
//!
//! The result is immutable for the whole session: the N-th tracked expiry
//! never changes afterwards, even though the option contracts at it are
//! re-qualified on every strike move.

use chrono::Local;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::SessionError;
use crate::models::{ChainParams, Expiry, QualifiedContract};
use crate::source::QuoteSource;

/// Resolve the next `config.expiry_count` expirations for the underlying.
///
/// Chains are filtered to the preferred trading class on the smart-routed
/// venue; when none match (unusual, but seen with thin entitlements), all
/// chains on that venue are used instead. Expiration dates are unioned
/// across matching chains, restricted to today-or-later, sorted ascending
/// and truncated to N. The trading class attached to every returned expiry
/// comes from the first matching chain — chains of one underlying share
/// their class within a venue.
///
/// Fatal with [`SessionError::NoExpiriesFound`] when the set comes out
/// empty: no retry, the operator needs to look at their entitlements.
pub async fn discover<S: QuoteSource>(
    source: &mut S,
    underlying: &QualifiedContract,
    config: &Config,
) -> Result<Vec<Expiry>, SessionError> {
    let chains = source.discover_chain(underlying).await?;
    let selected = select_expiries(
        &chains,
        &config.trading_class,
        &config.smart_venue,
        config.expiry_count,
        &Local::now().format("%Y%m%d").to_string(),
    )?;

    info!(
        count = selected.len(),
        first = %selected[0].date,
        trading_class = %selected[0].trading_class,
        "expiries resolved"
    );
    Ok(selected)
}

/// Pure selection core, split out so the filter/fallback/ordering rules are
/// testable without a source.
fn select_expiries(
    chains: &[ChainParams],
    preferred_class: &str,
    smart_venue: &str,
    n: usize,
    today: &str,
) -> Result<Vec<Expiry>, SessionError> {
    let mut matching: Vec<&ChainParams> = chains
        .iter()
        .filter(|c| c.trading_class == preferred_class && c.venue == smart_venue)
        .collect();

    if matching.is_empty() {
        warn!(
            preferred_class,
            "no chains for preferred trading class — falling back to all chains on {smart_venue}"
        );
        matching = chains.iter().filter(|c| c.venue == smart_venue).collect();
    }

    let trading_class = match matching.first() {
        Some(chain) => chain.trading_class.clone(),
        None => return Err(SessionError::NoExpiriesFound),
    };

    let mut dates: Vec<String> = matching
        .iter()
        .flat_map(|c| c.expirations.iter())
        .filter(|d| d.as_str() >= today)
        .cloned()
        .collect();
    dates.sort();
    dates.dedup();
    dates.truncate(n);

    if dates.is_empty() {
        return Err(SessionError::NoExpiriesFound);
    }

    Ok(dates
        .into_iter()
        .enumerate()
        .map(|(i, date)| Expiry {
            date,
            trading_class: trading_class.clone(),
            dte_label: format!("{i}DTE"),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(class: &str, venue: &str, dates: &[&str]) -> ChainParams {
        ChainParams {
            trading_class: class.to_string(),
            venue: venue.to_string(),
            expirations: dates.iter().map(|d| d.to_string()).collect(),
        }
    }

    #[test]
    fn test_prefers_matching_class_and_orders_ascending() {
        let chains = vec![
            chain("SPX", "SMART", &["20260901", "20260915"]),
            chain("SPXW", "SMART", &["20260903", "20260902", "20260904"]),
        ];
        let out = select_expiries(&chains, "SPXW", "SMART", 6, "20260830").unwrap();
        let dates: Vec<&str> = out.iter().map(|e| e.date.as_str()).collect();
        assert_eq!(dates, vec!["20260902", "20260903", "20260904"]);
        assert!(out.iter().all(|e| e.trading_class == "SPXW"));
        assert_eq!(out[0].dte_label, "0DTE");
        assert_eq!(out[2].dte_label, "2DTE");
    }

    #[test]
    fn test_falls_back_to_venue_when_class_missing() {
        let chains = vec![
            chain("SPX", "SMART", &["20260901"]),
            chain("SPX", "CBOE", &["20260830"]),
        ];
        let out = select_expiries(&chains, "SPXW", "SMART", 6, "20260830").unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].trading_class, "SPX");
    }

    #[test]
    fn test_drops_past_dates_and_truncates_to_n() {
        let chains = vec![chain(
            "SPXW",
            "SMART",
            &["20260820", "20260830", "20260831", "20260901", "20260902"],
        )];
        let out = select_expiries(&chains, "SPXW", "SMART", 2, "20260830").unwrap();
        let dates: Vec<&str> = out.iter().map(|e| e.date.as_str()).collect();
        // today itself is kept
        assert_eq!(dates, vec!["20260830", "20260831"]);
    }

    #[test]
    fn test_unions_and_dedups_across_chains() {
        let chains = vec![
            chain("SPXW", "SMART", &["20260901", "20260902"]),
            chain("SPXW", "SMART", &["20260902", "20260903"]),
        ];
        let out = select_expiries(&chains, "SPXW", "SMART", 6, "20260830").unwrap();
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_empty_result_is_no_expiries_found() {
        let err = select_expiries(&[], "SPXW", "SMART", 6, "20260830").unwrap_err();
        assert!(matches!(err, SessionError::NoExpiriesFound));

        // all dates in the past
        let chains = vec![chain("SPXW", "SMART", &["20250101"])];
        let err = select_expiries(&chains, "SPXW", "SMART", 6, "20260830").unwrap_err();
        assert!(matches!(err, SessionError::NoExpiriesFound));
    }
}
