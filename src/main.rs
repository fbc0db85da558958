//! # straddle-monitor — ATM Straddle Dashboard
//!
//! ```text
//!  ┌──────────────┐  quotes / greeks  ┌──────────────────────────────┐
//!  │  QuoteSource │ ────────────────▶ │  SessionLoop (single task)   │
//!  │  (gateway or │ ◀──────────────── │  strike tracking · reconcile │
//!  │   simulator) │  subscribe/cancel │  aggregate · publish         │
//!  └──────────────┘                   └──────────────┬───────────────┘
//!                                                    │ snapshot + broadcast
//!  ┌──────────────┐  ws://host/ws/dashboard          ▼
//!  │   Browser    │ ◀──────────────────────── AppState ── axum router
//!  │   Dashboard  │  GET /api/snapshot · /api/status · static frontend
//!  └──────────────┘
//! ```
//!
//! ## Environment Variables
//!
//! | Variable       | Default          | Description                     |
//! |----------------|------------------|---------------------------------|
//! | `BIND_ADDR`    | `0.0.0.0:5000`   | Address Axum listens on         |
//! | `FRONTEND_DIR` | `frontend/build` | Prebuilt dashboard bundle       |
//! | `RUST_LOG`     | —                | Tracing filter                  |
//!
//! Session configuration lives in `straddle_monitor::config` (strike step,
//! expiry count, poll cadence, data mode, …).

use std::net::SocketAddr;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use straddle_monitor::config::Config;
use straddle_monitor::engine;
use straddle_monitor::routes::dashboard::{get_snapshot, get_status, ws_dashboard};
use straddle_monitor::source::sim::SimSource;
use straddle_monitor::state::build_state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Load .env ──────────────────────────────────────────────────────────
    dotenvy::dotenv().ok();

    // ── 2. Structured logging ─────────────────────────────────────────────────
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive("straddle_monitor=debug".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    info!(r#"

  ╔═══════════════════════════════════════════════════════╗
  ║        ATM STRADDLE MONITOR — Web Dashboard           ║
  ║   strike tracking · live straddle metrics · ws push   ║
  ╚═══════════════════════════════════════════════════════╝"#);

    // ── 3. Config + shared state ──────────────────────────────────────────────
    let config = Config::from_env();
    let state = build_state();

    // ── 4. Session loop (background task) ─────────────────────────────────────
    // The simulator ships by default; a real gateway adapter implements the
    // same QuoteSource trait and slots in here.
    let session_source = SimSource::new(&config);
    tokio::spawn(engine::session::run(
        session_source,
        config.clone(),
        state.clone(),
    ));

    // ── 5. CORS ───────────────────────────────────────────────────────────────
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // ── 6. Router ─────────────────────────────────────────────────────────────
    let frontend_dir =
        std::env::var("FRONTEND_DIR").unwrap_or_else(|_| "frontend/build".to_string());
    let index = format!("{frontend_dir}/index.html");

    let app = Router::new()
        .route("/ws/dashboard", get(ws_dashboard))
        .route("/api/snapshot", get(get_snapshot))
        .route("/api/status", get(get_status))
        .fallback_service(ServeDir::new(&frontend_dir).fallback(ServeFile::new(index)))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    // ── 7. Bind & Serve ───────────────────────────────────────────────────────
    let addr: SocketAddr = std::env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:5000".to_string())
        .parse()?;

    info!(?addr, underlying = %config.underlying, "🚀 straddle monitor starting");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
