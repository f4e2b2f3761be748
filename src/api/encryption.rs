// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Scholar Seal

use axum::{extract::State, Json};

use crate::{error::ApiError, models::EncryptionStatusResponse, state::AppState};

fn status_response(state: &AppState) -> EncryptionStatusResponse {
    let network = state.encryption.network();
    EncryptionStatusResponse {
        status: state.encryption.status(),
        network: network.name.to_string(),
        chain_id: network.chain_id,
    }
}

#[utoipa::path(
    post,
    path = "/v1/encryption/initialize",
    tag = "Encryption",
    responses(
        (status = 200, body = EncryptionStatusResponse),
        (status = 503, description = "No wallet, or key material could not be fetched")
    )
)]
pub async fn initialize(
    State(state): State<AppState>,
) -> Result<Json<EncryptionStatusResponse>, ApiError> {
    state.encryption.initialize().await?;
    Ok(Json(status_response(&state)))
}

#[utoipa::path(
    get,
    path = "/v1/encryption/status",
    tag = "Encryption",
    responses((status = 200, body = EncryptionStatusResponse))
)]
pub async fn status(State(state): State<AppState>) -> Json<EncryptionStatusResponse> {
    Json(status_response(&state))
}
