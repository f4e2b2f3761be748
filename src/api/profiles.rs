// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Scholar Seal

use std::str::FromStr;

use alloy::primitives::Address;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use super::sessions::find_session;
use crate::{
    blockchain::ProfileField,
    error::ApiError,
    models::{
        DecryptedFieldView, DecryptedFieldsResponse, ProfileCountResponse, ProfileListResponse,
    },
    state::AppState,
    workflow::DecryptState,
};

#[derive(Deserialize, IntoParams)]
pub struct OwnerQuery {
    /// Owner address; defaults to the connected wallet.
    pub owner: Option<String>,
}

#[utoipa::path(
    get,
    path = "/v1/profiles",
    params(OwnerQuery),
    tag = "Profiles",
    responses(
        (status = 200, body = ProfileListResponse),
        (status = 400, description = "Invalid owner, or no owner and no connected wallet"),
        (status = 502, description = "Profile identifiers could not be read")
    )
)]
pub async fn list_profiles(
    State(state): State<AppState>,
    Query(params): Query<OwnerQuery>,
) -> Result<Json<ProfileListResponse>, ApiError> {
    let owner = match params.owner.as_deref().map(str::trim).filter(|o| !o.is_empty()) {
        Some(raw) => Address::from_str(raw)
            .map_err(|e| ApiError::bad_request(format!("Invalid owner address `{raw}`: {e}")))?,
        None => state.wallet.account().ok_or_else(|| {
            ApiError::bad_request("No owner given and no wallet connected")
        })?,
    };

    let listing = state.profile_query().load_owned(owner).await?;
    Ok(Json(ProfileListResponse::new(owner.to_string(), &listing)))
}

#[utoipa::path(
    get,
    path = "/v1/profiles/count",
    tag = "Profiles",
    responses(
        (status = 200, body = ProfileCountResponse),
        (status = 503, description = "Contract address not configured")
    )
)]
pub async fn profile_count(
    State(state): State<AppState>,
) -> Result<Json<ProfileCountResponse>, ApiError> {
    let count = state.profile_query().count().await?;
    Ok(Json(ProfileCountResponse { count }))
}

/// Decrypt one encrypted field of a profile for the session viewer.
///
/// Every call is signed by the wallet; fields are never decrypted in bulk.
#[utoipa::path(
    post,
    path = "/v1/sessions/{session_id}/profiles/{profile_id}/decrypt/{field}",
    params(
        ("session_id" = Uuid, Path, description = "Session identifier"),
        ("profile_id" = u64, Path, description = "Profile identifier"),
        ("field" = ProfileField, Path, description = "Encrypted field to decrypt")
    ),
    tag = "Decryption",
    responses(
        (status = 200, body = DecryptedFieldView),
        (status = 400, description = "Unknown field or no connected wallet"),
        (status = 404, description = "Unknown session"),
        (status = 409, description = "This field is already being decrypted"),
        (status = 502, description = "Decryption failed")
    )
)]
pub async fn decrypt_field(
    Path((session_id, profile_id, field)): Path<(Uuid, u64, String)>,
    State(state): State<AppState>,
) -> Result<Json<DecryptedFieldView>, ApiError> {
    let session = find_session(&state, session_id).await?;
    let field = ProfileField::from_str(&field).map_err(ApiError::bad_request)?;
    let viewer = state
        .wallet
        .account()
        .ok_or_else(|| ApiError::bad_request("Please connect your wallet first"))?;

    let query = state.profile_query();
    let contract = query.contract()?;
    let profile = query.profile(profile_id).await?;

    let outcome = session
        .decrypted
        .decrypt(&state.encryption, contract, viewer, &profile, field)
        .await;

    match outcome {
        DecryptState::Failed { error } => Err(ApiError::new(StatusCode::BAD_GATEWAY, error)),
        DecryptState::InFlight => Err(ApiError::conflict(format!(
            "{field} of profile {profile_id} is already being decrypted"
        ))),
        resolved => Ok(Json(DecryptedFieldView::new(field, resolved))),
    }
}

#[utoipa::path(
    get,
    path = "/v1/sessions/{session_id}/profiles/{profile_id}/decrypted",
    params(
        ("session_id" = Uuid, Path, description = "Session identifier"),
        ("profile_id" = u64, Path, description = "Profile identifier")
    ),
    tag = "Decryption",
    responses(
        (status = 200, body = DecryptedFieldsResponse),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn decrypted_fields(
    Path((session_id, profile_id)): Path<(Uuid, u64)>,
    State(state): State<AppState>,
) -> Result<Json<DecryptedFieldsResponse>, ApiError> {
    let session = find_session(&state, session_id).await?;
    let fields = session
        .decrypted
        .fields(profile_id)
        .into_iter()
        .map(|(field, entry)| DecryptedFieldView::new(field, entry))
        .collect();
    Ok(Json(DecryptedFieldsResponse { profile_id, fields }))
}
