//! Lectern · Guided Lecture Progress Backend
//!
//! - Axum HTTP + WebSocket API over a per-learner key/value store
//! - Readiness check, watch confirmation, initial and mastery reflections
//! - Lecture authoring with TOML export
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT                 : u16 (default 3000)
//!   LECTERN_CONFIG_PATH  : path to TOML config (evaluation prompt + optional lecture bank)
//!   STATIC_DIR           : frontend directory (default "./static")
//!   LOG_LEVEL            : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT           : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod error;
mod store;
mod readiness;
mod reflection;
mod history;
mod progress;
mod content;
mod config;
mod seeds;
mod authoring;
mod evaluation;
mod state;
mod protocol;
mod logic;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Catalog, in-memory learner store, evaluation prompt.
  let state = Arc::new(AppState::new());

  let static_dir = std::env::var("STATIC_DIR").unwrap_or_else(|_| "./static".into());
  let app = build_router(state.clone(), &static_dir);

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "lectern", %addr, %static_dir, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(async {
      let _ = tokio::signal::ctrl_c().await;
      info!(target: "lectern", "Shutdown signal received");
    })
    .await?;
  Ok(())
}
