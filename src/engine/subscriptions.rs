//! # engine::subscriptions
//!
//! Owns the live option subscriptions for the active strike.
//!
//! Invariants the rest of the engine relies on:
//! - after a successful reconcile there are exactly `2 × |expiries|`
//!   handles (one call + one put per tracked expiry), all at the new
//!   strike;
//! - the set never mixes strikes — old handles are cancelled and dropped
//!   *before* the first new subscription is opened;
//! - a failed reconcile leaves the set empty, never half-populated.

use std::collections::HashMap;

use tracing::{info, warn};

use crate::config::Config;
use crate::error::SessionError;
use crate::models::{ContractSpec, Expiry, OptionRight};
use crate::source::{QuoteSource, TickerHandle};

// ─── StraddlePair ─────────────────────────────────────────────────────────────

/// The two legs subscribed at the active strike for one expiry.
#[derive(Debug, Clone)]
pub struct StraddlePair {
    pub call: TickerHandle,
    pub put: TickerHandle,
}

// ─── SubscriptionManager ──────────────────────────────────────────────────────

#[derive(Default)]
pub struct SubscriptionManager {
    /// Live pairs keyed by expiry date (`YYYYMMDD`).
    pairs: HashMap<String, StraddlePair>,
}

impl SubscriptionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tear down the current strike's subscriptions and establish the new
    /// strike's, strictly in that order.
    ///
    /// On a qualification failure the handle set is left **empty** and the
    /// error is returned — the session loop backs off and re-evaluates the
    /// strike rather than dying. Cancellation of old subscriptions is
    /// fire-and-forget: a failure is logged and never aborts the reconcile.
    pub async fn reconcile<S: QuoteSource>(
        &mut self,
        source: &mut S,
        expiries: &[Expiry],
        strike: f64,
        config: &Config,
    ) -> Result<(), SessionError> {
        // ── 1. Cancel everything at the old strike ───────────────────────────
        for pair in self.pairs.values() {
            for handle in [&pair.call, &pair.put] {
                if let Err(e) = source.unsubscribe(handle) {
                    warn!(contract_id = handle.contract.id, error = %e, "cancel failed");
                }
            }
        }

        // ── 2. Drop the whole set before anything new exists ─────────────────
        self.pairs.clear();

        // ── 3. Build call + put specs at the new strike ──────────────────────
        let mut specs = Vec::with_capacity(expiries.len() * 2);
        for expiry in expiries {
            for right in [OptionRight::Call, OptionRight::Put] {
                specs.push(ContractSpec::option(
                    &config.underlying,
                    &expiry.date,
                    strike,
                    right,
                    &config.smart_venue,
                    &expiry.trading_class,
                ));
            }
        }

        // ── 4. Batch-qualify in one round trip ───────────────────────────────
        let qualified = source.qualify(specs).await?;
        if qualified.len() != expiries.len() * 2 {
            return Err(SessionError::Qualification(format!(
                "expected {} contracts, provider returned {}",
                expiries.len() * 2,
                qualified.len()
            )));
        }

        // ── 5. Subscribe each pair, keyed by expiry ──────────────────────────
        for (expiry, legs) in expiries.iter().zip(qualified.chunks_exact(2)) {
            let call = source.subscribe_quote(&legs[0], true);
            let put = source.subscribe_quote(&legs[1], true);
            self.pairs.insert(expiry.date.clone(), StraddlePair { call, put });
        }

        info!(strike, pairs = self.pairs.len(), "subscriptions reconciled");
        Ok(())
    }

    pub fn pair(&self, expiry_date: &str) -> Option<&StraddlePair> {
        self.pairs.get(expiry_date)
    }

    /// Number of live handles (both legs counted).
    pub fn handle_count(&self) -> usize {
        self.pairs.len() * 2
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
