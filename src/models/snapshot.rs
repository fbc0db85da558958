//! # models::snapshot
//!
//! Dashboard-facing output types: per-expiry straddle metrics and the
//! process-wide [`DashboardSnapshot`] that the session loop republishes
//! wholesale on every tick.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── SessionStatus ────────────────────────────────────────────────────────────

/// Lifecycle state of the provider session.
///
/// Forward-progressing; `Error` is reachable from any state and terminal —
/// there is no automatic reconnect, restart is an operational concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

// ─── StraddleRecord ───────────────────────────────────────────────────────────

/// Derived metrics for the call + put pair at the active strike for one
/// expiry. Recomputed in full every tick, never partially updated.
///
/// Unavailable prices are coerced to `0.0` for display. Note the greek
/// asymmetry: `iv` averages across legs (a normalized per-contract
/// quantity), while `gamma`/`theta` sum (additive exposures of the combined
/// position).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StraddleRecord {
    pub dte: String,
    pub expiry: String,
    pub call_bid: f64,
    pub call_ask: f64,
    pub put_bid: f64,
    pub put_ask: f64,
    pub straddle_cost: f64,
    pub iv: f64,
    pub gamma: f64,
    pub theta: f64,
}

// ─── DashboardSnapshot ────────────────────────────────────────────────────────

/// The single value shared between the session loop and the transport layer.
///
/// Single-writer discipline: only the session loop replaces it (whole-object
/// swap behind the state cell), websocket handlers and REST endpoints only
/// read the most recent value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub spot_price: f64,
    /// `0.0` until the first strike has been established.
    pub active_strike: f64,
    /// Ordered by tracked-expiry date, ascending.
    pub straddles: Vec<StraddleRecord>,
    pub status: SessionStatus,
    pub last_update: Option<DateTime<Utc>>,
}

impl Default for DashboardSnapshot {
    fn default() -> Self {
        Self {
            spot_price: 0.0,
            active_strike: 0.0,
            straddles: Vec::new(),
            status: SessionStatus::Disconnected,
            last_update: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&SessionStatus::Connecting).unwrap(),
            r#""connecting""#
        );
        assert_eq!(
            serde_json::to_string(&SessionStatus::Error).unwrap(),
            r#""error""#
        );
    }

    #[test]
    fn test_default_snapshot_is_blank_and_disconnected() {
        let snap = DashboardSnapshot::default();
        assert_eq!(snap.status, SessionStatus::Disconnected);
        assert_eq!(snap.active_strike, 0.0);
        assert!(snap.straddles.is_empty());
        assert!(snap.last_update.is_none());
    }
}
