// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Scholar Seal

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::config::resolve_contract_address;
use crate::encryption::ContextStatus;
use crate::state::AppState;

/// Health check response with individual component status.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Overall health status ("ok" or "degraded").
    pub status: String,
    /// Individual health checks and their results.
    pub checks: HealthChecks,
}

/// Individual health check results.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthChecks {
    /// Whether the service process is running.
    pub service: String,
    /// Encryption context lifecycle ("ready", "initializing", "uninitialized" or "failed").
    pub encryption: String,
    /// Wallet connection ("connected" or "disconnected").
    pub wallet: String,
    /// Contract address configuration ("configured" or "missing").
    pub contract: String,
    /// RPC reachability ("ok" or "unavailable").
    pub chain: String,
    /// Pinata key pair ("configured" or "not_configured").
    /// Only attachments depend on it, so it never degrades the status.
    pub storage: String,
}

/// Simple health check response for liveness probes.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

fn check_encryption(state: &AppState) -> String {
    match state.encryption.status() {
        ContextStatus::Ready { .. } => "ready",
        ContextStatus::Initializing => "initializing",
        ContextStatus::Uninitialized => "uninitialized",
        ContextStatus::Failed { .. } => "failed",
    }
    .to_string()
}

/// Check if the RPC endpoint answers.
async fn check_chain(state: &AppState) -> String {
    match state.reader.chain_head().await {
        Ok(_) => "ok".to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "Chain health check failed");
            "unavailable".to_string()
        }
    }
}

/// Health check endpoint handler.
///
/// Returns 200 if all checks pass, 503 if any check fails.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = ReadyResponse),
        (status = 503, description = "Service is unhealthy", body = ReadyResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let encryption = check_encryption(&state);
    let wallet = if state.wallet.is_connected() {
        "connected"
    } else {
        "disconnected"
    };
    let contract = match resolve_contract_address(state.config.contract_address.as_deref()) {
        Ok(_) => "configured",
        Err(_) => "missing",
    };
    let chain = check_chain(&state).await;
    let storage = if state.store.is_some() {
        "configured"
    } else {
        "not_configured"
    };

    let all_ok = encryption == "ready"
        && wallet == "connected"
        && contract == "configured"
        && chain == "ok";

    let response = ReadyResponse {
        status: if all_ok { "ok" } else { "degraded" }.to_string(),
        checks: HealthChecks {
            service: "ok".to_string(),
            encryption,
            wallet: wallet.to_string(),
            contract: contract.to_string(),
            chain,
            storage: storage.to_string(),
        },
    };

    let status = if all_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

/// Liveness probe handler.
///
/// Always returns 200 if the process is running.
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Readiness probe handler.
///
/// Returns 200 only once submissions can go through.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = ReadyResponse),
        (status = 503, description = "Service is not ready", body = ReadyResponse)
    )
)]
pub async fn readiness(state: State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    health(state).await
}
