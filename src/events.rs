//! # events
//!
//! Defines [`WsEvent`] — every event the monitor broadcasts to dashboard
//! clients over WebSocket.
//!
//! Events travel through a `tokio::sync::broadcast::Sender<String>` as
//! pre-serialized JSON, so each event is encoded exactly once no matter how
//! many clients are attached. Two kinds exist on the wire:
//!
//! - `status_update` — session lifecycle changes (connecting / connected /
//!   error), with an optional human-readable message on errors;
//! - `data_update`   — the full [`DashboardSnapshot`], re-sent whole every
//!   tick and replayed to any newly connected client.

use serde::Serialize;

use crate::models::{DashboardSnapshot, SessionStatus};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WsEvent {
    /// Session lifecycle transition.
    StatusUpdate {
        status: SessionStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// Full dashboard refresh — always the whole snapshot, never a delta.
    DataUpdate {
        #[serde(flatten)]
        snapshot: DashboardSnapshot,
    },
}

impl WsEvent {
    pub fn status(status: SessionStatus, message: Option<String>) -> Self {
        WsEvent::StatusUpdate { status, message }
    }

    pub fn data(snapshot: DashboardSnapshot) -> Self {
        WsEvent::DataUpdate { snapshot }
    }

    /// Serialize for the String broadcast channel.
    #[inline]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"event":"serialization_error"}"#.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_update_wire_shape() {
        let json = WsEvent::status(SessionStatus::Error, Some("boom".into())).to_json();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v["event"], "status_update");
        assert_eq!(v["status"], "error");
        assert_eq!(v["message"], "boom");
    }

    #[test]
    fn test_status_update_omits_empty_message() {
        let json = WsEvent::status(SessionStatus::Connected, None).to_json();
        assert!(!json.contains("message"));
    }

    #[test]
    fn test_data_update_flattens_snapshot() {
        let json = WsEvent::data(DashboardSnapshot::default()).to_json();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v["event"], "data_update");
        assert_eq!(v["spot_price"], 0.0);
        assert_eq!(v["status"], "disconnected");
        assert!(v["straddles"].as_array().unwrap().is_empty());
    }
}
