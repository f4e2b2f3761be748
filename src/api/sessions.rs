// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Scholar Seal

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    application::ApplicationDraft,
    error::ApiError,
    models::{ApplicationRequest, SessionResponse},
    state::AppState,
    workflow::ViewerSession,
};

fn session_response(session: &ViewerSession) -> SessionResponse {
    SessionResponse {
        session_id: session.id,
        created_at: session.created_at,
        submission: session.submission.snapshot(),
    }
}

pub(crate) async fn find_session(
    state: &AppState,
    session_id: Uuid,
) -> Result<Arc<ViewerSession>, ApiError> {
    let session = state
        .session(session_id)
        .await
        .ok_or_else(|| ApiError::not_found(format!("Session {session_id} not found")))?;
    session.touch();
    Ok(session)
}

#[utoipa::path(
    post,
    path = "/v1/sessions",
    tag = "Sessions",
    responses((status = 201, body = SessionResponse))
)]
pub async fn create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionResponse>) {
    let session = Arc::new(ViewerSession::new(state.submission_services()));
    let response = session_response(&session);
    state
        .sessions
        .write()
        .await
        .insert(session.id, Arc::clone(&session));
    tracing::info!(session_id = %session.id, "Session created");
    (StatusCode::CREATED, Json(response))
}

#[utoipa::path(
    get,
    path = "/v1/sessions/{session_id}",
    params(
        ("session_id" = Uuid, Path, description = "Session identifier")
    ),
    tag = "Sessions",
    responses(
        (status = 200, body = SessionResponse),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn get_session(
    Path(session_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = find_session(&state, session_id).await?;
    Ok(Json(session_response(&session)))
}

#[utoipa::path(
    delete,
    path = "/v1/sessions/{session_id}",
    params(
        ("session_id" = Uuid, Path, description = "Session identifier")
    ),
    tag = "Sessions",
    responses(
        (status = 204),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn delete_session(
    Path(session_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let session = state
        .sessions
        .write()
        .await
        .remove(&session_id)
        .ok_or_else(|| ApiError::not_found(format!("Session {session_id} not found")))?;
    session.end();
    Ok(StatusCode::NO_CONTENT)
}

/// Start a submission in the background.
///
/// Progress is read back through `GET /v1/sessions/{session_id}`.
#[utoipa::path(
    post,
    path = "/v1/sessions/{session_id}/submit",
    params(
        ("session_id" = Uuid, Path, description = "Session identifier")
    ),
    request_body = ApplicationRequest,
    tag = "Sessions",
    responses(
        (status = 202, body = SessionResponse),
        (status = 400, description = "Malformed attachment"),
        (status = 404, description = "Unknown session"),
        (status = 409, description = "A submission is already in progress")
    )
)]
pub async fn submit_application(
    Path(session_id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<ApplicationRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let session = find_session(&state, session_id).await?;
    let draft = ApplicationDraft::try_from(request).map_err(ApiError::bad_request)?;

    let ticket = session
        .submission
        .begin()
        .ok_or_else(|| ApiError::conflict("A submission is already in progress"))?;

    let response = session_response(&session);
    tokio::spawn(async move {
        let outcome = session.submission.run(ticket, draft).await;
        tracing::debug!(session_id = %session.id, ?outcome, "Submission finished");
    });

    Ok((StatusCode::ACCEPTED, Json(response)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::GpaTier;
    use crate::models::AttachmentUpload;
    use crate::workflow::testing::{test_app, FakeReader};
    use crate::workflow::SubmissionState;

    fn request() -> ApplicationRequest {
        ApplicationRequest {
            full_name: "Ada Lovelace".into(),
            email: "ada@example.edu".into(),
            university: "University of London".into(),
            gpa: GpaTier::From35To37,
            essay: "Engines".into(),
            contact_info: None,
            attachments: Vec::new(),
        }
    }

    async fn wait_until_settled(state: &AppState, session_id: Uuid) -> SubmissionState {
        for _ in 0..1_000 {
            let session = state.session(session_id).await.unwrap();
            let current = session.submission.state();
            if current.accepts_submit() {
                return current;
            }
            tokio::task::yield_now().await;
        }
        panic!("submission never settled");
    }

    #[tokio::test]
    async fn create_then_get_session() {
        let app = test_app(FakeReader::default(), true).await;

        let (status, Json(created)) = create_session(State(app.state.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.submission.state, SubmissionState::Idle);

        let Json(fetched) = get_session(Path(created.session_id), State(app.state.clone()))
            .await
            .expect("session exists");
        assert_eq!(fetched.session_id, created.session_id);
    }

    #[tokio::test]
    async fn submission_runs_in_background() {
        let app = test_app(FakeReader::default(), true).await;
        let (_, Json(created)) = create_session(State(app.state.clone())).await;

        let (status, Json(accepted)) = submit_application(
            Path(created.session_id),
            State(app.state.clone()),
            Json(request()),
        )
        .await
        .expect("submission accepted");
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(accepted.submission.state, SubmissionState::Validating);

        let settled = wait_until_settled(&app.state, created.session_id).await;
        assert!(matches!(settled, SubmissionState::Confirmed { .. }));
        assert_eq!(app.chain.submits(), 1);
        assert_eq!(app.encryption.encrypted_values()[0][0], 3);
    }

    #[tokio::test]
    async fn second_submit_while_busy_conflicts() {
        let app = test_app(FakeReader::default(), true).await;
        let gate = app.chain.hold_confirmation();
        let (_, Json(created)) = create_session(State(app.state.clone())).await;

        submit_application(
            Path(created.session_id),
            State(app.state.clone()),
            Json(request()),
        )
        .await
        .unwrap();

        let err = submit_application(
            Path(created.session_id),
            State(app.state.clone()),
            Json(request()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);

        gate.notify_one();
        wait_until_settled(&app.state, created.session_id).await;
        assert_eq!(app.chain.submits(), 1);
    }

    #[tokio::test]
    async fn invalid_attachment_is_bad_request() {
        let app = test_app(FakeReader::default(), true).await;
        let (_, Json(created)) = create_session(State(app.state.clone())).await;
        let mut body = request();
        body.attachments.push(AttachmentUpload {
            file_name: "cv.pdf".into(),
            mime_type: "application/pdf".into(),
            data_base64: "not base64!".into(),
        });

        let err = submit_application(Path(created.session_id), State(app.state.clone()), Json(body))
            .await
            .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(app.store.file_uploads().is_empty());
    }

    #[tokio::test]
    async fn deleted_session_is_gone() {
        let app = test_app(FakeReader::default(), true).await;
        let (_, Json(created)) = create_session(State(app.state.clone())).await;

        let status = delete_session(Path(created.session_id), State(app.state.clone()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let err = get_session(Path(created.session_id), State(app.state.clone()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
