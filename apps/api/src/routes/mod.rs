pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::ingest::handlers::handle_upload;
use crate::render::handlers::{handle_document, handle_preview};
use crate::session::handlers;
use crate::state::AppState;

/// Room for multipart framing around the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes as usize + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health::health_handler))
        // Sessions
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/upload",
            post(handle_upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/api/v1/sessions/:id",
            get(handlers::handle_get_session)
                .patch(handlers::handle_edit_session)
                .delete(handlers::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/missing-points",
            get(handlers::handle_missing_points),
        )
        // Rendering
        .route("/api/v1/sessions/:id/preview", get(handle_preview))
        .route("/api/v1/sessions/:id/document", get(handle_document))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::ingest::client::ExtractionService;
    use crate::ingest::normalize::IngestPayload;
    use crate::ingest::stream::IngestOutcome;
    use crate::ingest::upload::ResumeUpload;
    use crate::ingest::IngestError;
    use crate::session::SessionStore;

    struct FakeExtraction {
        data: Value,
    }

    #[async_trait]
    impl ExtractionService for FakeExtraction {
        async fn extract(&self, upload: ResumeUpload) -> Result<IngestOutcome, IngestError> {
            assert_eq!(upload.file_name, "cv.txt");
            Ok(IngestOutcome {
                payload: IngestPayload {
                    data: self.data.clone(),
                    missing_points: Some(json!({"experience": ["Side project"]})),
                },
                detected_sections: vec!["experience".into(), "certifications".into()],
                completed_sections: vec!["experience".into()],
            })
        }
    }

    fn app() -> Router {
        let state = AppState {
            config: Config {
                extraction_service_url: "http://extraction.test".into(),
                port: 0,
                rust_log: "debug".into(),
                max_upload_bytes: 1024,
                session_idle_minutes: 120,
            },
            sessions: SessionStore::new(),
            extraction: Arc::new(FakeExtraction {
                data: json!({"name": "Ada Lovelace", "employmentHistory": [{"companyName": "Acme"}]}),
            }),
        };
        build_router(state)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn upload_request(file_name: &str, contents: &str) -> Request<Body> {
        let body = format!(
            "--BOUNDARY\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
             Content-Type: text/plain\r\n\r\n\
             {contents}\r\n\
             --BOUNDARY--\r\n"
        );
        Request::builder()
            .method("POST")
            .uri("/api/v1/sessions/upload")
            .header(header::CONTENT_TYPE, "multipart/form-data; boundary=BOUNDARY")
            .body(Body::from(body))
            .unwrap()
    }

    async fn open_session(app: &Router, data: Value) -> String {
        let (status, body) = send(
            app,
            json_request("POST", "/api/v1/sessions", json!({"data": data})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&app(), get_request("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "resume-api");
        assert_eq!(body["sessions"], 0);
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let app = app();
        let id = open_session(&app, json!({"name": "Ada", "employmentHistory": [{"responsibilities": "Did X"}]})).await;
        let uri = format!("/api/v1/sessions/{id}");

        let (status, body) = send(&app, get_request(&uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["record"]["employmentHistory"][0]["responsibilities"], json!(["Did X"]));

        let edits = json!({"edits": [
            {"op": "set", "path": "/title", "value": "Engineer"},
            {"op": "insert", "path": "/education", "value": {}}
        ]});
        let (status, body) = send(&app, json_request("PATCH", &uri, edits)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["revision"], 1);
        assert_eq!(body["record"]["education"][0]["wasAwarded"], true);

        let (status, _) = send(
            &app,
            Request::builder().method("DELETE").uri(&uri).body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(&app, get_request(&uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_rejected_edit_reports_edit_error() {
        let app = app();
        let id = open_session(&app, json!({"name": "Ada"})).await;
        let uri = format!("/api/v1/sessions/{id}");

        let edits = json!({"edits": [{"op": "set", "path": "/education", "value": "none"}]});
        let (status, body) = send(&app, json_request("PATCH", &uri, edits)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "EDIT_REJECTED");

        let (status, body) = send(&app, json_request("PATCH", &uri, json!({"edits": []}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_document_download() {
        let app = app();
        let id = open_session(&app, json!({"name": "Ada Lovelace"})).await;

        let response = app
            .clone()
            .oneshot(get_request(&format!("/api/v1/sessions/{id}/document")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        );
        let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap();
        assert!(disposition.contains("filename=\"Ada Lovelace.docx\""));

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[tokio::test]
    async fn test_preview_and_missing_points() {
        let app = app();
        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/v1/sessions",
                json!({
                    "data": {"skillCategories": [{"categoryName": "Languages", "skills": ["Go", "Rust"]}]},
                    "missingPoints": {"summary": ["a", "b"], "clientProjects": ["c"]}
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["id"].as_str().unwrap().to_string();

        let (status, body) = send(&app, get_request(&format!("/api/v1/sessions/{id}/preview"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["header"]["name"], "Full Name");
        assert_eq!(body["sections"][0]["kind"], "technical_skills");
        assert_eq!(body["sections"][0]["nodes"][0]["skills"], "Go, Rust");

        let (status, body) =
            send(&app, get_request(&format!("/api/v1/sessions/{id}/missing-points"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["missingPoints"]["summary"], json!(["a", "b"]));
        assert_eq!(body["counts"]["total"], 3);
        assert_eq!(body["counts"]["clientProjects"], 1);
    }

    #[tokio::test]
    async fn test_upload_opens_session() {
        let app = app();
        let (status, body) = send(&app, upload_request("cv.txt", "Ada Lovelace\nEngineer")).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["session"]["record"]["name"], "Ada Lovelace");
        assert_eq!(body["detectedSections"], json!(["experience", "certifications"]));
        assert_eq!(
            body["session"]["record"]["missingPoints"]["experience"],
            json!(["Side project"])
        );
    }

    #[tokio::test]
    async fn test_upload_rejects_unsupported_file() {
        let (status, body) = send(&app(), upload_request("photo.png", "binary")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"]["message"],
            "Invalid file type. Please upload PDF, DOCX, DOC, or TXT files."
        );
    }

    #[tokio::test]
    async fn test_upload_over_body_limit_reports_file_too_large() {
        let app = app();
        let contents = "x".repeat(MULTIPART_OVERHEAD_BYTES + 4096);
        let (status, body) = send(&app, upload_request("cv.txt", &contents)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["message"], "File size exceeds 0MB limit.");

        let (_, body) = send(&app, get_request("/health")).await;
        assert_eq!(body["sessions"], 0);
    }

    #[tokio::test]
    async fn test_unknown_session_routes_are_not_found() {
        let app = app();
        let id = uuid::Uuid::new_v4();
        for path in ["preview", "document", "missing-points"] {
            let (status, _) = send(&app, get_request(&format!("/api/v1/sessions/{id}/{path}"))).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{path}");
        }
    }
}
