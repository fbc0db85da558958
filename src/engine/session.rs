//! # engine::session
//!
//! The session state machine:
//!
//! ```text
//! disconnected → connecting → connected → { polling ⇄ resubscribing }
//!                     │            │                  │
//!                     └────────────┴──────────────────┴──▶ error (terminal)
//! ```
//!
//! One task, strictly sequential ticks — a reconcile and an aggregation
//! never overlap. The loop is the sole writer of the dashboard snapshot;
//! everything it shares with the transport layer flows one way through
//! [`SharedState`]. Every failure is fail-fast and terminal except a
//! qualification error during a strike change, which backs off and retries.
//! There is no automatic reconnect: after `error`, restarting the process
//! is an operator concern.

use std::time::Duration;

use chrono::Utc;
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::engine::{expiries, straddle, strike, subscriptions::SubscriptionManager};
use crate::error::SessionError;
use crate::models::{ContractSpec, DashboardSnapshot, SessionStatus};
use crate::source::QuoteSource;
use crate::state::SharedState;

// Design constants, deliberately not configurable.
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);
const SPOT_WAIT_INTERVAL: Duration = Duration::from_millis(200);
const SPOT_WAIT_ATTEMPTS: u32 = 50;
const RECONCILE_BACKOFF: Duration = Duration::from_secs(5);

/// Run the session to completion: connect, discover, poll until the
/// connection drops or a terminal error occurs, then release the provider.
///
/// The provider connection is released on *every* exit path.
pub async fn run<S: QuoteSource>(mut source: S, config: Config, state: SharedState) {
    state.set_status(SessionStatus::Connecting, None).await;

    if let Err(e) = drive(&mut source, &config, &state).await {
        error!(error = %e, "❌ session terminated");
        state.set_status(SessionStatus::Error, Some(e.to_string())).await;
    }

    if source.is_connected() {
        source.disconnect().await;
        info!("provider connection released");
    }
}

async fn drive<S: QuoteSource>(
    source: &mut S,
    config: &Config,
    state: &SharedState,
) -> Result<(), SessionError> {
    // ── 1. Reachability probe (skipped for in-process sources) ───────────────
    if let Some((host, port)) = source.endpoint() {
        probe(host, port).await?;
    }

    // ── 2. Connect + data mode ───────────────────────────────────────────────
    source.connect().await?;
    info!("✓ connected to quote source");
    state.set_status(SessionStatus::Connected, None).await;
    source.set_data_mode(config.data_mode);

    // ── 3. Underlying composite quote ────────────────────────────────────────
    let underlying = source
        .qualify(vec![ContractSpec::index(&config.underlying, &config.exchange)])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| {
            SessionError::Qualification(format!("underlying {} not resolved", config.underlying))
        })?;
    let spot_handle = source.subscribe_quote(&underlying, false);

    // Poll for a first valid price; dead feed here means the operator's
    // market-data subscription needs attention, so give up loudly.
    let mut attempts = 0;
    while spot_handle.quote().spot().is_none() {
        attempts += 1;
        if attempts > SPOT_WAIT_ATTEMPTS {
            return Err(SessionError::DataTimeout { symbol: config.underlying.clone() });
        }
        sleep(SPOT_WAIT_INTERVAL).await;
    }

    // ── 4. Expiry discovery (once, immutable afterwards) ─────────────────────
    let expiries = expiries::discover(source, &underlying, config).await?;

    // ── 5. Polling cycle ─────────────────────────────────────────────────────
    let mut active_strike: Option<f64> = None;
    let mut subs = SubscriptionManager::new();

    while source.is_connected() {
        let spot = spot_handle.quote().spot().unwrap_or(0.0);
        let candidate = strike::select(spot, config.strike_step);

        // Strike moved → tear down and re-subscribe, then skip this tick's
        // aggregation so no snapshot is built from pre-settle quote state.
        if candidate.is_some() && candidate != active_strike {
            let target = candidate.unwrap_or_default();
            info!(
                from = active_strike.unwrap_or(0.0),
                to = target,
                spot,
                "strike update — reconciling subscriptions"
            );

            match subs.reconcile(source, &expiries, target, config).await {
                Ok(()) => {
                    active_strike = Some(target);
                    sleep(config.settle_delay).await;
                }
                Err(SessionError::Qualification(msg)) => {
                    // Recoverable: leave the (empty) handle set alone and
                    // re-evaluate the strike after a breather.
                    warn!(strike = target, error = %msg, "qualification failed — backing off");
                    sleep(RECONCILE_BACKOFF).await;
                }
                Err(e) => return Err(e),
            }
            continue;
        }

        let straddles = straddle::aggregate(&expiries, &subs);
        state
            .publish_snapshot(DashboardSnapshot {
                spot_price: spot,
                active_strike: active_strike.unwrap_or(0.0),
                straddles,
                status: SessionStatus::Connected,
                last_update: Some(Utc::now()),
            })
            .await;

        sleep(config.poll_interval).await;
    }

    info!("quote source disconnected — ending session");
    Ok(())
}

/// Cheap TCP reachability check before the real handshake, so a dead
/// gateway produces an immediate, descriptive error instead of a slow
/// connect failure.
async fn probe(host: &str, port: u16) -> Result<(), SessionError> {
    match timeout(PROBE_TIMEOUT, TcpStream::connect((host, port))).await {
        Ok(Ok(_)) => Ok(()),
        _ => Err(SessionError::UnreachableEndpoint { host: host.to_string(), port }),
    }
}
