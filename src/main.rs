// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Scholar Seal

use std::{env, net::SocketAddr, sync::Arc};

use scholar_seal::{
    api::router,
    config::{AppConfig, DEFAULT_LOG_FILTER, LOG_FORMAT_ENV},
    encryption::EncryptionContext,
    session_sweeper::SessionSweeper,
    state::AppState,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match env::var(LOG_FORMAT_ENV).as_deref() {
        Ok("json") => builder.json().init(),
        _ => builder.pretty().init(),
    }
}

/// Warm the FHE context so the first submission does not wait on key fetches.
async fn warm_encryption(encryption: Arc<EncryptionContext>, shutdown: CancellationToken) {
    tokio::select! {
        result = encryption.initialize() => match result {
            Ok(()) => tracing::info!(status = ?encryption.status(), "Encryption context ready"),
            Err(e) => tracing::warn!(
                error = %e,
                "Encryption initialization failed; retry via POST /v1/encryption/initialize"
            ),
        },
        _ = shutdown.cancelled() => {
            tracing::debug!("Shutdown before encryption initialization finished");
        }
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let config = AppConfig::from_env();
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Failed to parse bind address");

    tracing::info!(
        network = config.network.name,
        chain_id = config.network.chain_id,
        contract = config.contract_address.as_deref().unwrap_or("<unset>"),
        pinata = config.pinata.is_some(),
        "Starting Scholar Seal"
    );

    let state = AppState::from_config(config).expect("Failed to initialize application state");
    let shutdown = CancellationToken::new();

    tokio::spawn(warm_encryption(
        Arc::clone(&state.encryption),
        shutdown.clone(),
    ));
    tokio::spawn(SessionSweeper::new(state.clone()).run(shutdown.clone()));

    let app = router(state);
    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");

    tracing::info!(%addr, "Scholar Seal listening (docs at /docs)");

    let signal = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
            tracing::info!("Shutdown signal received");
            signal.cancel();
        })
        .await
        .expect("HTTP server failed");
}
