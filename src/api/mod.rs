pub mod auth;
mod donate;
pub mod error;
mod extract;
mod reports;
mod upload;
mod validation;


use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::AppState;

use self::error::ApiError;

/// Routes mounted under `/api`. Unknown paths and methods below the prefix
/// get a JSON 404.
pub fn create_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let auth_routes = Router::new()
        .route("/register", post(auth::register).fallback(api_not_found))
        .route("/login", post(auth::login).fallback(api_not_found));

    let upload_routes = Router::new()
        .route("/person", post(upload::upload_person).fallback(api_not_found))
        .layer(DefaultBodyLimit::max(state.config.uploads.max_body_bytes));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .route("/donate", post(donate::donate).fallback(api_not_found))
        .nest("/upload", upload_routes)
        .route("/reports", get(reports::list_reports).fallback(api_not_found))
        .fallback(api_not_found);

    Router::new().nest("/api", api_routes)
}

async fn api_not_found() -> ApiError {
    ApiError::not_found("API endpoint not found")
}
