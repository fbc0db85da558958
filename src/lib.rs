//! # straddle-monitor
//!
//! Tracks an index's at-the-money straddle across the nearest expirations:
//! recomputes the ATM strike as the underlying moves, keeps quote
//! subscriptions alive for exactly the contracts currently needed, and
//! publishes an aggregated snapshot to dashboard clients on a fixed cadence.

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod models;
pub mod routes;
pub mod source;
pub mod state;
