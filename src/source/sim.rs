//! # source::sim
//!
//! In-process synthetic quote provider.
//!
//! Lets the monitor run end-to-end with no gateway attached: the spot is a
//! slow random walk around a configurable start price, the chain is a strip
//! of daily expirations, and option quotes are a crude ATM premium model
//! (intrinsic + `0.4·S·σ·√T` time value) with plausible greeks. Each
//! subscription is backed by its own pusher task, aborted on unsubscribe —
//! the same lifecycle a real gateway adapter would have.

use std::collections::HashMap;

use chrono::{Duration as ChronoDuration, Local, NaiveDate};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};
use tracing::debug;

use crate::config::Config;
use crate::error::SessionError;
use crate::models::{
    ChainParams, ContractSpec, DataMode, OptionRight, QualifiedContract, TickerQuote,
};
use crate::source::{QuoteSource, TickerHandle};

const SPOT_PUSH_INTERVAL: Duration = Duration::from_millis(250);
const OPTION_PUSH_INTERVAL: Duration = Duration::from_millis(500);

pub struct SimSource {
    symbol: String,
    smart_venue: String,
    trading_class: String,
    expiry_count: usize,
    start_price: f64,
    connected: bool,
    next_id: u64,
    /// Latest simulated spot, shared with every option pusher task.
    spot_rx: Option<watch::Receiver<TickerQuote>>,
    /// Pusher task per live subscription, keyed by contract id.
    tasks: HashMap<u64, JoinHandle<()>>,
}

impl SimSource {
    pub fn new(config: &Config) -> Self {
        Self {
            symbol: config.underlying.clone(),
            smart_venue: config.smart_venue.clone(),
            trading_class: config.trading_class.clone(),
            expiry_count: config.expiry_count,
            start_price: config.sim_start_price,
            connected: false,
            next_id: 1,
            spot_rx: None,
            tasks: HashMap::new(),
        }
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn days_to_expiry(expiry: &str) -> f64 {
        NaiveDate::parse_from_str(expiry, "%Y%m%d")
            .map(|d| (d - Local::now().date_naive()).num_days().max(0) as f64)
            .unwrap_or(0.0)
    }

    fn spawn_spot_task(&mut self, id: u64, tx: watch::Sender<TickerQuote>) {
        let close = self.start_price;
        self.tasks.insert(id, tokio::spawn(async move {
            let mut rng = StdRng::from_entropy();
            let mut last = close;
            loop {
                last += rng.gen_range(-1.0..1.0);
                let _ = tx.send(TickerQuote {
                    last: Some(last),
                    close: Some(close),
                    ..Default::default()
                });
                sleep(SPOT_PUSH_INTERVAL).await;
            }
        }));
    }

    fn spawn_option_task(
        &mut self,
        id: u64,
        expiry: String,
        strike: f64,
        right: OptionRight,
        tx: watch::Sender<TickerQuote>,
    ) {
        let spot_rx = self.spot_rx.clone();
        let fallback = self.start_price;
        self.tasks.insert(id, tokio::spawn(async move {
            let mut rng = StdRng::from_entropy();
            let iv = rng.gen_range(0.10..0.18);
            let years = (Self::days_to_expiry(&expiry) + 0.5) / 365.0;
            loop {
                let spot = spot_rx
                    .as_ref()
                    .and_then(|rx| rx.borrow().spot())
                    .unwrap_or(fallback);

                let intrinsic = match right {
                    OptionRight::Call => (spot - strike).max(0.0),
                    OptionRight::Put => (strike - spot).max(0.0),
                };
                let time_value = 0.4 * spot * iv * years.sqrt();
                let mid = intrinsic + time_value;
                let half_spread = (0.002 * mid).max(0.05);

                let _ = tx.send(TickerQuote {
                    bid: Some((mid - half_spread).max(0.05)),
                    ask: Some(mid + half_spread),
                    implied_vol: Some(iv),
                    gamma: Some(0.0015 / years.sqrt().max(0.05)),
                    theta: Some(-time_value / (years * 365.0).max(1.0)),
                    ..Default::default()
                });
                sleep(OPTION_PUSH_INTERVAL).await;
            }
        }));
    }
}

impl QuoteSource for SimSource {
    fn endpoint(&self) -> Option<(&str, u16)> {
        None // in-process, nothing to probe
    }

    async fn connect(&mut self) -> Result<(), SessionError> {
        debug!(symbol = %self.symbol, "sim source connected");
        self.connected = true;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn disconnect(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
        self.spot_rx = None;
        self.connected = false;
    }

    fn set_data_mode(&mut self, mode: DataMode) {
        debug!(code = mode.provider_code(), "sim: data mode set");
    }

    async fn qualify(
        &mut self,
        specs: Vec<ContractSpec>,
    ) -> Result<Vec<QualifiedContract>, SessionError> {
        Ok(specs
            .into_iter()
            .map(|spec| QualifiedContract { id: self.next_id(), spec })
            .collect())
    }

    async fn discover_chain(
        &mut self,
        _underlying: &QualifiedContract,
    ) -> Result<Vec<ChainParams>, SessionError> {
        // A strip of daily expirations starting today — enough for every
        // dte bucket the dashboard tracks, plus a couple spare.
        let today = Local::now().date_naive();
        let expirations = (0..self.expiry_count as i64 + 2)
            .map(|i| (today + ChronoDuration::days(i)).format("%Y%m%d").to_string())
            .collect();

        Ok(vec![ChainParams {
            trading_class: self.trading_class.clone(),
            venue: self.smart_venue.clone(),
            expirations,
        }])
    }

    fn subscribe_quote(&mut self, contract: &QualifiedContract, _with_greeks: bool) -> TickerHandle {
        let (tx, rx) = watch::channel(TickerQuote::default());

        match &contract.spec {
            ContractSpec::Index { .. } => {
                self.spot_rx = Some(rx.clone());
                self.spawn_spot_task(contract.id, tx);
            }
            ContractSpec::Option { expiry, strike, right, .. } => {
                self.spawn_option_task(contract.id, expiry.clone(), *strike, *right, tx);
            }
        }

        TickerHandle::new(contract.clone(), rx)
    }

    fn unsubscribe(&mut self, handle: &TickerHandle) -> Result<(), SessionError> {
        if let Some(task) = self.tasks.remove(&handle.contract.id) {
            task.abort();
        }
        Ok(())
    }
}

impl Drop for SimSource {
    fn drop(&mut self) {
        for task in self.tasks.values() {
            task.abort();
        }
    }
}
