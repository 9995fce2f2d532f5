//! Axum route handlers for the Research API.

use axum::{extract::State, Json};
use chrono::Utc;

use crate::errors::AppError;
use crate::research::models::{ResearchRequest, ResearchResponse};
use crate::research::service::run_research;
use crate::state::AppState;

/// POST /api/v1/research
///
/// Sends the composed research prompt to the selected upstreams and returns
/// their combined answer.
pub async fn handle_research(
    State(state): State<AppState>,
    Json(request): Json<ResearchRequest>,
) -> Result<Json<ResearchResponse>, AppError> {
    let response = run_research(
        state.llm.as_ref(),
        state.grants.as_ref(),
        &request,
        Utc::now(),
    )
    .await?;
    Ok(Json(response))
}
