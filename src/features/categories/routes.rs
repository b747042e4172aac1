use axum::{routing::get, Router};

use crate::features::categories::handlers;

/// Create routes for the categories feature
///
/// The registry is static, so these routes carry no state.
pub fn routes() -> Router {
    Router::new()
        .route("/api/categories", get(handlers::list_categories))
        .route("/api/categories/{key}", get(handlers::get_category))
}
