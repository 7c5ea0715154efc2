//! Full application router: API, static assets and the frontend fallback.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, MethodRouter},
    Json, Router,
};
use std::any::Any;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{
    catch_panic::CatchPanicLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer,
};

use crate::api::error::{ErrorCode, ErrorResponse};
use crate::storage::UPLOADS_URL_PREFIX;
use crate::AppState;

/// Build the complete router served by the binary
pub fn create_app(state: Arc<AppState>) -> Router {
    let paths = &state.config.paths;

    // Anything no route or static file claims gets the frontend entry page
    let spa = spa_fallback(paths.frontend_dir.join("index.html"));

    let router = Router::new()
        .route("/health", get(health_check))
        .merge(crate::api::create_router(state.clone()))
        .nest_service("/css", ServeDir::new(&paths.css_dir).fallback(spa.clone()))
        .nest_service(
            "/assets",
            ServeDir::new(&paths.assets_dir).fallback(spa.clone()),
        )
        .nest_service(
            UPLOADS_URL_PREFIX,
            ServeDir::new(state.uploads.dir()).fallback(spa.clone()),
        )
        .fallback_service(ServeDir::new(&paths.frontend_dir).fallback(spa))
        .with_state(state);

    with_middleware(router)
}

/// Panic recovery, CORS and request tracing, outermost last
pub fn with_middleware(router: Router) -> Router {
    router
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn spa_fallback(index: PathBuf) -> MethodRouter {
    get(move || serve_index(index.clone()))
}

async fn serve_index(index: PathBuf) -> Response {
    match tokio::fs::read(&index).await {
        Ok(html) => Html(html).into_response(),
        Err(_) => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

async fn health_check() -> &'static str {
    "OK"
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    tracing::error!(panic = %detail, "Unhandled error");

    let body = ErrorResponse {
        message: "Internal server error".to_string(),
        code: ErrorCode::InternalError.as_str().to_string(),
        details: None,
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
