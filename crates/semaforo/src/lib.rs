// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Semaforo: adaptive urban-intersection controller.
//!
//! Four camera workers classify vehicles per frame, a shared store carries
//! per-approach load, and a deadline-scheduled state machine adapts the
//! two-group traffic lights to demand with ambulance pre-emption. Annotated
//! frames and realtime JSON are exposed over HTTP.

pub mod broadcast;
pub mod camera;
pub mod config;
pub mod detect;
pub mod error;
pub mod mailbox;
pub mod signal;
pub mod source;
pub mod state;
pub mod store;
pub mod supervisor;
pub mod transport;
pub mod vehicle;

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::state::AppState;
use crate::transport::build_router;

/// Initialize tracing/logging from config.
///
/// Uses `try_init` so it's safe to call multiple times (e.g. from tests).
pub fn init_tracing(config: &Config) {
    use tracing_subscriber::fmt;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let result = match config.log_format.as_str() {
        "json" => fmt::fmt().with_env_filter(filter).json().try_init(),
        _ => fmt::fmt().with_env_filter(filter).try_init(),
    };
    drop(result);
}

/// Run the controller until shutdown.
pub async fn run(config: Config) -> anyhow::Result<()> {
    config.validate()?;
    init_tracing(&config);

    let addr = format!("{}:{}", config.host, config.port);
    let shutdown = CancellationToken::new();
    let autostart = config.autostart;

    let state = AppState::new(config, shutdown.clone())?;

    // Ctrl-C cancels everything.
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("shutdown signal received");
                shutdown.cancel();
            }
        });
    }

    if autostart {
        state.supervisor.start(&state).await;
    }

    let router = build_router(Arc::clone(&state));
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("semaforo listening on {addr}");
    axum::serve(listener, router).with_graceful_shutdown(shutdown.cancelled_owned()).await?;

    // Release video sources and reset the lights before exiting.
    state.supervisor.stop(&state).await;
    Ok(())
}
