use std::sync::Arc;

use axum::{
    routing::{get, patch},
    Router,
};

use crate::features::issues::handlers::{self, IssueState};
use crate::features::issues::services::{IssueService, UploadService};
use crate::modules::storage::LocalImageStore;

/// Create routes for the issues feature
pub fn routes(
    issue_service: Arc<IssueService>,
    upload_service: Arc<UploadService>,
    store: Arc<LocalImageStore>,
) -> Router {
    let state = IssueState {
        issue_service,
        upload_service,
        store,
    };

    Router::new()
        .route(
            "/api/issues",
            get(handlers::list_issues).post(handlers::upload_issue),
        )
        .route("/api/issues/{id}", get(handlers::get_issue))
        .route("/api/issues/{id}/location", patch(handlers::update_location))
        .route(
            "/api/issues/{id}/status",
            get(handlers::get_issue_status).patch(handlers::update_issue_status),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use serde_json::json;

    use crate::core::error::AppError;
    use crate::features::analysis::{ImageAnalyzer, IssueClassification};
    use crate::shared::test_helpers::{minimal_png, test_app, test_app_with_analyzer};

    fn png_form() -> MultipartForm {
        MultipartForm::new().add_part(
            "image",
            Part::bytes(minimal_png())
                .file_name("test.png")
                .mime_type("image/png"),
        )
    }

    async fn upload_issue(server: &TestServer) -> serde_json::Value {
        let response = server.post("/api/issues").multipart(png_form()).await;
        response.assert_status(StatusCode::CREATED);
        response.json::<serde_json::Value>()["data"].clone()
    }

    #[tokio::test]
    async fn test_upload_returns_201_and_creates_issue() {
        let (app, _pool, _dir) = test_app().await;
        let server = TestServer::new(app).unwrap();

        let data = upload_issue(&server).await;

        assert_eq!(data["status"], "new");
        assert!(data["id"].is_string());
        assert!(data["image_url"]
            .as_str()
            .unwrap()
            .starts_with("/media/issues/"));
        // the fixture has no EXIF
        assert!(data["latitude"].is_null());
        assert!(data["longitude"].is_null());
    }

    #[tokio::test]
    async fn test_upload_fills_classification_from_analyzer() {
        let (app, _pool, _dir) = test_app().await;
        let server = TestServer::new(app).unwrap();

        let id = upload_issue(&server).await["id"].as_str().unwrap().to_string();

        let detail = server.get(&format!("/api/issues/{}", id)).await;
        detail.assert_status_ok();
        let data = detail.json::<serde_json::Value>()["data"].clone();

        assert_eq!(data["status"], "new");
        assert_eq!(data["main_category"], "Roads & Transport");
        assert_eq!(data["sub_category"], "Pothole");
        assert_eq!(data["severity"], "high");
        assert_eq!(data["risks"], json!(["safety"]));
        assert_eq!(
            data["description"],
            "Visible pothole causing unsafe driving conditions."
        );
    }

    #[tokio::test]
    async fn test_upload_without_image_is_400() {
        let (app, _pool, _dir) = test_app().await;
        let server = TestServer::new(app).unwrap();

        let form = MultipartForm::new().add_text("note", "no image attached");
        let response = server.post("/api/issues").multipart(form).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], false);
        assert!(body["errors"][0].as_str().unwrap().contains("image"));
    }

    #[tokio::test]
    async fn test_classifier_failure_propagates_and_keeps_record() {
        struct FailingAnalyzer;

        #[async_trait]
        impl ImageAnalyzer for FailingAnalyzer {
            async fn analyze(
                &self,
                _image: &[u8],
                _content_type: &str,
            ) -> crate::core::error::Result<IssueClassification> {
                Err(AppError::ExternalServiceError(
                    "vision provider unavailable".to_string(),
                ))
            }
        }

        let (app, _pool, _dir) = test_app_with_analyzer(Arc::new(FailingAnalyzer)).await;
        let server = TestServer::new(app).unwrap();

        let response = server.post("/api/issues").multipart(png_form()).await;
        response.assert_status(StatusCode::BAD_GATEWAY);

        // the record survives with placeholder fields
        let list = server.get("/api/issues").await;
        let body: serde_json::Value = list.json();
        assert_eq!(body["meta"]["total"], 1);
        assert_eq!(body["data"][0]["status"], "new");
    }

    #[tokio::test]
    async fn test_upload_rejects_non_image_type() {
        let (app, _pool, _dir) = test_app().await;
        let server = TestServer::new(app).unwrap();

        let form = MultipartForm::new().add_part(
            "image",
            Part::bytes(b"%PDF-1.4".to_vec())
                .file_name("doc.pdf")
                .mime_type("application/pdf"),
        );
        let response = server.post("/api/issues").multipart(form).await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_contains_uploaded_issue() {
        let (app, _pool, _dir) = test_app().await;
        let server = TestServer::new(app).unwrap();

        let id = upload_issue(&server).await["id"].clone();

        let response = server.get("/api/issues").await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();

        assert_eq!(body["meta"]["total"], 1);
        assert_eq!(body["data"][0]["id"], id);
    }

    #[tokio::test]
    async fn test_location_update_round_trip() {
        let (app, _pool, _dir) = test_app().await;
        let server = TestServer::new(app).unwrap();
        let id = upload_issue(&server).await["id"].as_str().unwrap().to_string();

        let response = server
            .patch(&format!("/api/issues/{}/location", id))
            .json(&json!({"latitude": 40.7128, "longitude": -74.006}))
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["data"]["latitude"], 40.7128);
        assert_eq!(body["data"]["longitude"], -74.006);

        let detail = server.get(&format!("/api/issues/{}", id)).await;
        assert_eq!(detail.json::<serde_json::Value>()["data"]["latitude"], 40.7128);
    }

    #[tokio::test]
    async fn test_location_update_out_of_range_is_400_and_unapplied() {
        let (app, _pool, _dir) = test_app().await;
        let server = TestServer::new(app).unwrap();
        let id = upload_issue(&server).await["id"].as_str().unwrap().to_string();

        let response = server
            .patch(&format!("/api/issues/{}/location", id))
            .json(&json!({"latitude": 1000.0, "longitude": 0.0}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let detail = server.get(&format!("/api/issues/{}", id)).await;
        assert!(detail.json::<serde_json::Value>()["data"]["latitude"].is_null());
    }

    #[tokio::test]
    async fn test_location_update_with_single_field_is_400() {
        let (app, _pool, _dir) = test_app().await;
        let server = TestServer::new(app).unwrap();
        let id = upload_issue(&server).await["id"].as_str().unwrap().to_string();

        let response = server
            .patch(&format!("/api/issues/{}/location", id))
            .json(&json!({"latitude": 10.0}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_location_update_unknown_id_is_404() {
        let (app, _pool, _dir) = test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server
            .patch(&format!("/api/issues/{}/location", uuid::Uuid::new_v4()))
            .json(&json!({"latitude": 1.0, "longitude": 2.0}))
            .await;
        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn test_status_read_is_idempotent() {
        let (app, _pool, _dir) = test_app().await;
        let server = TestServer::new(app).unwrap();
        let id = upload_issue(&server).await["id"].as_str().unwrap().to_string();

        let first = server.get(&format!("/api/issues/{}/status", id)).await;
        first.assert_status_ok();
        let second = server.get(&format!("/api/issues/{}/status", id)).await;

        let a: serde_json::Value = first.json();
        let b: serde_json::Value = second.json();
        assert_eq!(a["data"]["status"], "new");
        assert_eq!(a["data"], b["data"]);
    }

    #[tokio::test]
    async fn test_status_workflow_happy_path() {
        let (app, _pool, _dir) = test_app().await;
        let server = TestServer::new(app).unwrap();
        let id = upload_issue(&server).await["id"].as_str().unwrap().to_string();
        let path = format!("/api/issues/{}/status", id);

        let review = server.patch(&path).json(&json!({"status": "review"})).await;
        review.assert_status_ok();
        assert_eq!(review.json::<serde_json::Value>()["data"]["status"], "review");

        let fixed = server.patch(&path).json(&json!({"status": "fixed"})).await;
        fixed.assert_status_ok();
        assert_eq!(fixed.json::<serde_json::Value>()["data"]["status"], "fixed");
    }

    #[tokio::test]
    async fn test_status_skip_is_rejected_with_descriptive_message() {
        let (app, _pool, _dir) = test_app().await;
        let server = TestServer::new(app).unwrap();
        let id = upload_issue(&server).await["id"].as_str().unwrap().to_string();
        let path = format!("/api/issues/{}/status", id);

        let response = server.patch(&path).json(&json!({"status": "fixed"})).await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let message = response.json::<serde_json::Value>()["message"]
            .as_str()
            .unwrap()
            .to_string();
        assert!(message.contains("'new'"));
        assert!(message.contains("'fixed'"));
        assert!(message.contains("[review]"));

        // the record did not move
        let status = server.get(&path).await;
        assert_eq!(status.json::<serde_json::Value>()["data"]["status"], "new");
    }

    #[tokio::test]
    async fn test_status_malformed_target_is_400() {
        let (app, _pool, _dir) = test_app().await;
        let server = TestServer::new(app).unwrap();
        let id = upload_issue(&server).await["id"].as_str().unwrap().to_string();

        let response = server
            .patch(&format!("/api/issues/{}/status", id))
            .json(&json!({"status": "done"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_status_unknown_id_is_404() {
        let (app, _pool, _dir) = test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server
            .get(&format!("/api/issues/{}/status", uuid::Uuid::new_v4()))
            .await;
        response.assert_status_not_found();
    }
}
