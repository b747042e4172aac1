#[cfg(test)]
use std::sync::Arc;

#[cfg(test)]
use axum::Router;
#[cfg(test)]
use sqlx::SqlitePool;

#[cfg(test)]
use crate::core::config::StorageConfig;
#[cfg(test)]
use crate::features::analysis::{ImageAnalyzer, MockAnalyzer};
#[cfg(test)]
use crate::features::categories::routes as categories_routes;
#[cfg(test)]
use crate::features::issues::routes as issues_routes;
#[cfg(test)]
use crate::features::issues::services::{IssueService, UploadService, PLACEHOLDER_PNG};
#[cfg(test)]
use crate::modules::storage::LocalImageStore;

/// Bytes of a minimal valid PNG (1x1 pixel, no EXIF)
#[cfg(test)]
pub fn minimal_png() -> Vec<u8> {
    PLACEHOLDER_PNG.to_vec()
}

/// Fresh in-memory database with migrations applied
#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("failed to open in-memory database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("failed to run migrations");

    pool
}

/// Image store rooted in a temporary directory. Keep the `TempDir` alive for
/// the duration of the test.
#[cfg(test)]
pub fn test_image_store() -> (LocalImageStore, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let config = StorageConfig {
        media_root: dir.path().to_string_lossy().to_string(),
        public_base_path: "/media".to_string(),
    };
    let store = LocalImageStore::new(&config).expect("failed to create image store");
    (store, dir)
}

/// Full application router wired against an in-memory database, a temporary
/// image store, and the given analyzer.
#[cfg(test)]
pub async fn test_app_with_analyzer(
    analyzer: Arc<dyn ImageAnalyzer>,
) -> (Router, SqlitePool, tempfile::TempDir) {
    let pool = test_pool().await;
    let (store, dir) = test_image_store();
    let store = Arc::new(store);

    let issue_service = Arc::new(IssueService::new(pool.clone()));
    let upload_service = Arc::new(UploadService::new(
        Arc::clone(&issue_service),
        Arc::clone(&store),
        analyzer,
    ));

    let router = Router::new()
        .merge(issues_routes::routes(issue_service, upload_service, store))
        .merge(categories_routes::routes());

    (router, pool, dir)
}

/// `test_app_with_analyzer` with the deterministic mock
#[cfg(test)]
pub async fn test_app() -> (Router, SqlitePool, tempfile::TempDir) {
    test_app_with_analyzer(Arc::new(MockAnalyzer)).await
}
