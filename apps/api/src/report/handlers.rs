//! Axum route handlers for the Report API.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::report::models::{GrantRecord, ReportRequest};
use crate::report::parser::parse_grants;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ParseRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ParseResponse {
    pub grants: Vec<GrantRecord>,
}

/// POST /api/v1/report/parse
///
/// Preview of how research text will be split into grant records.
pub async fn handle_parse(Json(request): Json<ParseRequest>) -> Json<ParseResponse> {
    let grants = parse_grants(&request.text);
    Json(ParseResponse { grants })
}

/// POST /api/v1/report/docx
///
/// Renders the research text as a downloadable Word document.
pub async fn handle_docx(
    State(state): State<AppState>,
    Json(request): Json<ReportRequest>,
) -> Result<Response, AppError> {
    info!(
        "Rendering report: {} chars of text, {} context parameters",
        request.text.len(),
        request.context_parameters.len()
    );

    let rendered = state.renderer.render(&request).await?;
    let disposition = format!("attachment; filename=\"{}\"", rendered.filename);

    Ok((
        [
            (header::CONTENT_TYPE, rendered.content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        rendered.bytes,
    )
        .into_response())
}
