//! # error
//!
//! Centralised session error taxonomy.
//!
//! Every failure here is terminal for the session — surfaced to subscribers
//! as an `error` status, then the loop exits and the provider connection is
//! released — with one exception: [`SessionError::Qualification`] raised
//! during a strike-change reconcile is recovered locally (the reconcile is
//! aborted and strike tracking retries after a backoff).
//!
//! Transport-level failures (a dashboard client disconnecting) are *not*
//! session errors and never reach this type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    /// The data endpoint did not accept a TCP connection within the probe
    /// timeout. Checked before the provider handshake is even attempted.
    #[error("endpoint {host}:{port} is not accepting connections")]
    UnreachableEndpoint { host: String, port: u16 },

    /// The provider handshake failed.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The provider could not resolve one or more contract specifications.
    #[error("contract qualification failed: {0}")]
    Qualification(String),

    /// Chain discovery produced no usable expirations, even after the
    /// venue fallback. Usually a subscription-entitlement problem.
    #[error("no option expirations found for the underlying")]
    NoExpiriesFound,

    /// The underlying never produced a valid price within the wait window.
    #[error("timed out waiting for {symbol} market data")]
    DataTimeout { symbol: String },

    /// Catch-all for unexpected failures inside the polling cycle.
    #[error("session loop error: {0}")]
    Unexpected(#[from] anyhow::Error),
}
