//! # engine::straddle
//!
//! Folds the latest call/put quote state into per-expiry straddle metrics.
//!
//! The combination rules are deliberately asymmetric and must stay that way:
//! implied vol is a normalized per-contract quantity, so it *averages*
//! across legs; gamma and theta are additive exposures of the combined
//! position, so they *sum* (missing values contribute 0.0).

use crate::engine::subscriptions::SubscriptionManager;
use crate::models::{is_valid_price, Expiry, StraddleRecord, TickerQuote};

/// Bid/ask of one leg, invalid sides coerced to 0.0 for display.
fn leg_prices(quote: &TickerQuote) -> (f64, f64) {
    let bid = if is_valid_price(quote.bid) { quote.bid.unwrap_or(0.0) } else { 0.0 };
    let ask = if is_valid_price(quote.ask) { quote.ask.unwrap_or(0.0) } else { 0.0 };
    (bid, ask)
}

/// Leg mid price — only meaningful with a two-sided market.
fn mid(bid: f64, ask: f64) -> f64 {
    if bid > 0.0 && ask > 0.0 {
        (bid + ask) / 2.0
    } else {
        0.0
    }
}

/// Model greeks with unavailable values coerced to 0.0.
fn greeks(quote: &TickerQuote) -> (f64, f64, f64) {
    (
        quote.implied_vol.unwrap_or(0.0),
        quote.gamma.unwrap_or(0.0),
        quote.theta.unwrap_or(0.0),
    )
}

/// One record per tracked expiry that currently has live handles, in expiry
/// order. Expiries not yet subscribed are skipped entirely — they are never
/// emitted as zero rows.
pub fn aggregate(expiries: &[Expiry], subs: &SubscriptionManager) -> Vec<StraddleRecord> {
    let mut records = Vec::with_capacity(expiries.len());

    for expiry in expiries {
        let Some(pair) = subs.pair(&expiry.date) else {
            continue;
        };

        let call = pair.call.quote();
        let put = pair.put.quote();
        records.push(combine(expiry, &call, &put));
    }

    records
}

/// Pure combination core for one expiry.
fn combine(expiry: &Expiry, call: &TickerQuote, put: &TickerQuote) -> StraddleRecord {
    let (call_bid, call_ask) = leg_prices(call);
    let (put_bid, put_ask) = leg_prices(put);
    let straddle_cost = mid(call_bid, call_ask) + mid(put_bid, put_ask);

    let (call_iv, call_gamma, call_theta) = greeks(call);
    let (put_iv, put_gamma, put_theta) = greeks(put);

    let iv = if call_iv > 0.0 && put_iv > 0.0 {
        (call_iv + put_iv) / 2.0
    } else if call_iv > 0.0 {
        call_iv
    } else {
        put_iv
    };

    StraddleRecord {
        dte: expiry.dte_label.clone(),
        expiry: expiry.date.clone(),
        call_bid,
        call_ask,
        put_bid,
        put_ask,
        straddle_cost,
        iv,
        gamma: call_gamma + put_gamma,
        theta: call_theta + put_theta,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expiry() -> Expiry {
        Expiry {
            date: "20260904".to_string(),
            trading_class: "SPXW".to_string(),
            dte_label: "0DTE".to_string(),
        }
    }

    fn quote(bid: f64, ask: f64) -> TickerQuote {
        TickerQuote {
            bid: Some(bid),
            ask: Some(ask),
            ..Default::default()
        }
    }

    #[test]
    fn test_straddle_cost_sums_leg_mids() {
        let record = combine(&expiry(), &quote(10.0, 12.0), &quote(9.0, 11.0));
        assert_eq!(record.straddle_cost, 11.0 + 10.0);
        assert_eq!(record.call_bid, 10.0);
        assert_eq!(record.put_ask, 11.0);
    }

    #[test]
    fn test_one_sided_leg_contributes_zero_mid() {
        // call has no bid → call mid 0, only the put leg counts
        let call = TickerQuote { ask: Some(12.0), ..Default::default() };
        let record = combine(&expiry(), &call, &quote(9.0, 11.0));
        assert_eq!(record.straddle_cost, 10.0);
        assert_eq!(record.call_bid, 0.0);
        assert_eq!(record.call_ask, 12.0);
    }

    #[test]
    fn test_junk_prices_render_as_zero_not_nan() {
        let call = TickerQuote {
            bid: Some(f64::NAN),
            ask: Some(-1.0),
            ..Default::default()
        };
        let record = combine(&expiry(), &call, &TickerQuote::default());
        assert_eq!(record.straddle_cost, 0.0);
        assert_eq!(record.call_bid, 0.0);
        assert_eq!(record.call_ask, 0.0);
        assert!(!record.straddle_cost.is_nan());
    }

    #[test]
    fn test_iv_averages_when_both_legs_report() {
        let mut call = quote(1.0, 2.0);
        call.implied_vol = Some(0.20);
        let mut put = quote(1.0, 2.0);
        put.implied_vol = Some(0.18);
        let record = combine(&expiry(), &call, &put);
        assert!((record.iv - 0.19).abs() < 1e-12);
    }

    #[test]
    fn test_iv_takes_single_reporting_leg() {
        let call = quote(1.0, 2.0); // no IV
        let mut put = quote(1.0, 2.0);
        put.implied_vol = Some(0.25);
        let record = combine(&expiry(), &call, &put);
        assert_eq!(record.iv, 0.25);

        let mut call = quote(1.0, 2.0);
        call.implied_vol = Some(0.22);
        let record = combine(&expiry(), &call, &quote(1.0, 2.0));
        assert_eq!(record.iv, 0.22);

        let record = combine(&expiry(), &quote(1.0, 2.0), &quote(1.0, 2.0));
        assert_eq!(record.iv, 0.0);
    }

    #[test]
    fn test_gamma_theta_sum_never_average() {
        let mut call = quote(1.0, 2.0);
        call.gamma = Some(0.001);
        call.theta = Some(-0.5);
        let mut put = quote(1.0, 2.0);
        put.gamma = Some(0.0012);
        put.theta = Some(-0.4);
        let record = combine(&expiry(), &call, &put);
        assert!((record.gamma - 0.0022).abs() < 1e-12);
        assert!((record.theta - -0.9).abs() < 1e-12);
    }

    #[test]
    fn test_unsubscribed_expiry_emits_no_record() {
        let subs = SubscriptionManager::new();
        let records = aggregate(&[expiry()], &subs);
        assert!(records.is_empty());
    }
}
