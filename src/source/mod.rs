//! # source
//!
//! The quote-provider boundary.
//!
//! The session engine never talks to a brokerage API directly — it drives
//! anything implementing [`QuoteSource`]. The trait mirrors the small slice
//! of a market-data gateway this system needs: connect, qualify contracts,
//! discover the option chain, stream quotes + model greeks, tear down.
//!
//! Streamed data arrives through [`TickerHandle`]: the provider owns a
//! `watch::Sender<TickerQuote>` per subscription and replaces the whole
//! record on every push (last-write-wins); the engine reads the latest value
//! synchronously each tick. The engine holds handles only to read them and
//! to hand them back for cancellation — it never interprets contract ids.

pub mod sim;

use tokio::sync::watch;

use crate::error::SessionError;
use crate::models::{ChainParams, ContractSpec, DataMode, QualifiedContract, TickerQuote};

// ─── TickerHandle ─────────────────────────────────────────────────────────────

/// A live quote subscription returned by [`QuoteSource::subscribe_quote`].
#[derive(Debug, Clone)]
pub struct TickerHandle {
    pub contract: QualifiedContract,
    rx: watch::Receiver<TickerQuote>,
}

impl TickerHandle {
    pub fn new(contract: QualifiedContract, rx: watch::Receiver<TickerQuote>) -> Self {
        Self { contract, rx }
    }

    /// Latest observed quote. Cheap copy, never blocks.
    pub fn quote(&self) -> TickerQuote {
        *self.rx.borrow()
    }

    /// Expiry date of the subscribed contract (option subscriptions only).
    pub fn expiry(&self) -> Option<&str> {
        self.contract.spec.expiry()
    }

    /// Strike of the subscribed contract (option subscriptions only).
    pub fn strike(&self) -> Option<f64> {
        match self.contract.spec {
            ContractSpec::Option { strike, .. } => Some(strike),
            ContractSpec::Index { .. } => None,
        }
    }
}

// ─── QuoteSource ──────────────────────────────────────────────────────────────

/// Contract every market-data provider adapter fulfils.
///
/// The session loop is generic over this trait, which is what lets the
/// integration tests drive the full state machine with scripted sources.
///
/// `qualify` is all-or-nothing and must return one [`QualifiedContract`] per
/// requested spec, in request order — the subscription manager pairs calls
/// and puts positionally.
pub trait QuoteSource: Send {
    /// TCP endpoint to reachability-probe before connecting, or `None` for
    /// in-process sources (the probe is skipped).
    fn endpoint(&self) -> Option<(&str, u16)>;

    fn connect(&mut self) -> impl std::future::Future<Output = Result<(), SessionError>> + Send;

    fn is_connected(&self) -> bool;

    /// Release the provider connection. Best-effort, never fails.
    fn disconnect(&mut self) -> impl std::future::Future<Output = ()> + Send;

    /// Select live or delayed market data. Called once, right after connect.
    fn set_data_mode(&mut self, mode: DataMode);

    /// Resolve contract specifications to concrete listings.
    fn qualify(
        &mut self,
        specs: Vec<ContractSpec>,
    ) -> impl std::future::Future<Output = Result<Vec<QualifiedContract>, SessionError>> + Send;

    /// Security-definition parameters (trading classes, venues, expirations)
    /// for the given underlying.
    fn discover_chain(
        &mut self,
        underlying: &QualifiedContract,
    ) -> impl std::future::Future<Output = Result<Vec<ChainParams>, SessionError>> + Send;

    /// Open a streaming quote subscription. `with_greeks` additionally
    /// requests model greeks (option contracts).
    fn subscribe_quote(&mut self, contract: &QualifiedContract, with_greeks: bool) -> TickerHandle;

    /// Cancel a subscription. Best-effort: callers log failures and move on,
    /// a leaked provider-side subscription is not safety-critical.
    fn unsubscribe(&mut self, handle: &TickerHandle) -> Result<(), SessionError>;
}
