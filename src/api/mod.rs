// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Scholar Seal

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    application::GpaTier,
    blockchain::ProfileField,
    encryption::ContextStatus,
    models::{
        ApplicationRequest, AttachmentUpload, DecryptedFieldView, DecryptedFieldsResponse,
        EncryptionStatusResponse, ProfileCountResponse, ProfileListResponse, ProfileView,
        SessionResponse,
    },
    state::AppState,
    workflow::{
        DecryptState, Notification, NotificationLevel, ProfileLoadFailure, SubmissionSnapshot,
        SubmissionState,
    },
};

pub mod encryption;
pub mod health;
pub mod profiles;
pub mod sessions;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/encryption/initialize", post(encryption::initialize))
        .route("/encryption/status", get(encryption::status))
        .route("/sessions", post(sessions::create_session))
        .route(
            "/sessions/{session_id}",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        .route(
            "/sessions/{session_id}/submit",
            post(sessions::submit_application),
        )
        .route(
            "/sessions/{session_id}/profiles/{profile_id}/decrypt/{field}",
            post(profiles::decrypt_field),
        )
        .route(
            "/sessions/{session_id}/profiles/{profile_id}/decrypted",
            get(profiles::decrypted_fields),
        )
        .route("/profiles", get(profiles::list_profiles))
        .route("/profiles/count", get(profiles::profile_count))
        .with_state(state.clone());

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .nest("/v1", v1_routes)
        .merge(health_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        health::readiness,
        encryption::initialize,
        encryption::status,
        sessions::create_session,
        sessions::get_session,
        sessions::delete_session,
        sessions::submit_application,
        profiles::list_profiles,
        profiles::profile_count,
        profiles::decrypt_field,
        profiles::decrypted_fields
    ),
    components(
        schemas(
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse,
            ApplicationRequest,
            AttachmentUpload,
            GpaTier,
            SessionResponse,
            SubmissionSnapshot,
            SubmissionState,
            Notification,
            NotificationLevel,
            EncryptionStatusResponse,
            ContextStatus,
            ProfileView,
            ProfileListResponse,
            ProfileLoadFailure,
            ProfileCountResponse,
            ProfileField,
            DecryptState,
            DecryptedFieldView,
            DecryptedFieldsResponse
        )
    ),
    tags(
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Encryption", description = "FHE context lifecycle"),
        (name = "Sessions", description = "Form sessions and application submission"),
        (name = "Profiles", description = "On-chain scholar profiles"),
        (name = "Decryption", description = "Per-field, per-viewer decryption")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::workflow::testing::{test_app, FakeReader};

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let app = test_app(FakeReader::default(), true).await;
        let _ = router(app.state).into_make_service();
    }

    #[tokio::test]
    async fn liveness_is_always_ok() {
        let app = test_app(FakeReader::offline(), false).await;
        let (status, body) = send(
            router(app.state),
            Request::get("/health/live").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn session_lifecycle_over_http() {
        let app = test_app(FakeReader::default(), true).await;
        let routes = router(app.state.clone());

        let (status, created) = send(routes.clone(), post_json("/v1/sessions", json!({}))).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["session_id"].as_str().unwrap().to_string();
        assert_eq!(created["submission"]["state"]["state"], "idle");

        let (status, _) = send(
            routes.clone(),
            Request::delete(format!("/v1/sessions/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(
            routes,
            Request::get(format!("/v1/sessions/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains(&id));
    }

    #[tokio::test]
    async fn unknown_gpa_label_is_unprocessable() {
        let app = test_app(FakeReader::default(), true).await;
        let routes = router(app.state.clone());
        let (_, created) = send(routes.clone(), post_json("/v1/sessions", json!({}))).await;
        let id = created["session_id"].as_str().unwrap();

        let (status, _) = send(
            routes,
            post_json(
                &format!("/v1/sessions/{id}/submit"),
                json!({
                    "full_name": "Ada Lovelace",
                    "email": "ada@example.edu",
                    "university": "University of London",
                    "gpa": "4.0+",
                    "essay": "Engines"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(app.chain.submits(), 0);
    }

    #[tokio::test]
    async fn profiles_report_partial_failure() {
        let app = test_app(FakeReader::with_profiles(&[1, 2, 3]).failing_on(2), true).await;
        let (status, body) = send(
            router(app.state),
            Request::get("/v1/profiles").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["partial_failure"], true);
        assert_eq!(body["profiles"].as_array().unwrap().len(), 2);
        assert_eq!(body["failures"][0]["profile_id"], 2);
    }

    #[tokio::test]
    async fn openapi_lists_submission_route() {
        let doc = ApiDoc::openapi();
        assert!(doc
            .paths
            .paths
            .contains_key("/v1/sessions/{session_id}/submit"));
    }
}
