pub mod health;

use axum::{
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::errors::AppError;
use crate::report::handlers as report;
use crate::research::handlers as research;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {uri}"))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Research relay
        .route("/api/v1/research", post(research::handle_research))
        // Report API
        .route("/api/v1/report/parse", post(report::handle_parse))
        .route("/api/v1/report/docx", post(report::handle_docx))
        .fallback(not_found)
        .with_state(state)
}
