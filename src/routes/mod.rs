//! Axum route handlers.

pub mod dashboard;
