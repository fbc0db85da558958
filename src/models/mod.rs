//! Domain models shared across the straddle monitor.

pub mod market;
pub mod snapshot;

pub use market::{
    is_valid_price, ChainParams, ContractSpec, DataMode, Expiry, OptionRight, QualifiedContract,
    TickerQuote,
};
pub use snapshot::{DashboardSnapshot, SessionStatus, StraddleRecord};
