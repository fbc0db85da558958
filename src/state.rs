//! # state
//!
//! Shared application state: the dashboard snapshot cell and the WebSocket
//! broadcast channel.
//!
//! Concurrency contract: the session loop is the *sole writer* of the
//! snapshot and always replaces it wholesale — handlers never observe a
//! half-updated value. The transport layer only reads. Cross-task
//! communication is one-directional: loop → snapshot → broadcast.

use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};

use crate::events::WsEvent;
use crate::models::{DashboardSnapshot, SessionStatus};

/// Buffered broadcast events per client before a slow reader starts lagging.
const BROADCAST_CAPACITY: usize = 64;

// ─── AppState ─────────────────────────────────────────────────────────────────

/// Top-level shared state injected into every Axum handler and held by the
/// session loop.
#[derive(Clone)]
pub struct AppState {
    /// Most recent dashboard snapshot, replaced whole on every tick.
    pub snapshot: Arc<RwLock<DashboardSnapshot>>,

    /// Broadcast channel feeding all WebSocket clients.
    /// Carries pre-serialized JSON (`String`) to avoid per-client encoding.
    pub broadcast_tx: broadcast::Sender<String>,
}

impl AppState {
    pub fn new() -> Self {
        let (broadcast_tx, _) = broadcast::channel(BROADCAST_CAPACITY);

        Self {
            snapshot: Arc::new(RwLock::new(DashboardSnapshot::default())),
            broadcast_tx,
        }
    }

    // ── Helper Methods ────────────────────────────────────────────────────────

    /// Broadcast an event to all connected WebSocket clients.
    /// Does not panic when no client is listening (headless operation).
    pub fn broadcast(&self, event: &WsEvent) {
        // Err means no receiver — not a real failure.
        let _ = self.broadcast_tx.send(event.to_json());
    }

    /// Replace the snapshot wholesale and push a `data_update` to clients.
    pub async fn publish_snapshot(&self, snapshot: DashboardSnapshot) {
        {
            let mut guard = self.snapshot.write().await;
            *guard = snapshot.clone();
        }
        self.broadcast(&WsEvent::data(snapshot));
    }

    /// Record a session status transition and push a `status_update`.
    pub async fn set_status(&self, status: SessionStatus, message: Option<String>) {
        {
            let mut guard = self.snapshot.write().await;
            guard.status = status;
        }
        self.broadcast(&WsEvent::status(status, message));
    }

    /// Read a copy of the current snapshot (releases the lock immediately).
    pub async fn current_snapshot(&self) -> DashboardSnapshot {
        self.snapshot.read().await.clone()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience type alias
pub type SharedState = Arc<AppState>;

pub fn build_state() -> SharedState {
    Arc::new(AppState::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_replaces_snapshot_and_broadcasts() {
        let state = build_state();
        let mut rx = state.broadcast_tx.subscribe();

        let snap = DashboardSnapshot {
            spot_price: 5007.0,
            active_strike: 5005.0,
            status: SessionStatus::Connected,
            ..Default::default()
        };
        state.publish_snapshot(snap.clone()).await;

        assert_eq!(state.current_snapshot().await, snap);

        let frame = rx.recv().await.unwrap();
        let v: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(v["event"], "data_update");
        assert_eq!(v["active_strike"], 5005.0);
    }

    #[tokio::test]
    async fn test_set_status_updates_cell_and_emits_event() {
        let state = build_state();
        let mut rx = state.broadcast_tx.subscribe();

        state
            .set_status(SessionStatus::Error, Some("gateway down".into()))
            .await;

        assert_eq!(state.current_snapshot().await.status, SessionStatus::Error);

        let frame = rx.recv().await.unwrap();
        let v: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(v["event"], "status_update");
        assert_eq!(v["message"], "gateway down");
    }

    #[tokio::test]
    async fn test_broadcast_without_listeners_does_not_panic() {
        let state = build_state();
        state.broadcast(&WsEvent::status(SessionStatus::Connecting, None));
    }
}
