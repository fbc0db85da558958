//! The strike-tracking engine: strike selection, expiry discovery,
//! subscription lifecycle, straddle aggregation and the session loop that
//! ties them together.

pub mod expiries;
pub mod session;
pub mod straddle;
pub mod strike;
pub mod subscriptions;
