//! HTTP facade over the Open-Meteo geocoding and forecast APIs.
//!
//! Exposed as a library so integration tests can build the router
//! in-process; the binary in `main.rs` is a thin wrapper around [`run`].

pub mod error;
pub mod routes;

use std::sync::Arc;

use anyhow::Context;
use clima_core::Config;
use tokio::net::TcpListener;

/// Bind and serve until the process is stopped.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let state = Arc::new(routes::AppState::new(&config)?);
    let app = routes::routes(state);

    let addr = config.bind_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!(%addr, "clima server listening");
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
