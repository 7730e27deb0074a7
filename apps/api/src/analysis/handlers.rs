//! Axum route handlers for the Analysis API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::analysis::scoring::ConfidenceMap;
use crate::errors::AppError;
use crate::models::analysis::AnalysisEntry;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub jd_text: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analyses
///
/// Runs the full analysis pipeline and records the entry in history.
/// An empty JD is accepted and yields the fallback analysis.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<(StatusCode, Json<AnalysisEntry>), AppError> {
    let entry = state
        .engine
        .analyze(
            req.jd_text.as_deref(),
            req.company.as_deref(),
            req.role.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /api/v1/analyses
pub async fn handle_history(State(state): State<AppState>) -> Json<Vec<AnalysisEntry>> {
    Json(state.engine.get_history().await)
}

/// GET /api/v1/analyses/:id
pub async fn handle_get_analysis(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AnalysisEntry>, AppError> {
    state
        .engine
        .get_analysis(&id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Analysis {id} not found")))
}

/// PUT /api/v1/analyses/:id
///
/// Replaces a stored entry. Unknown ids are accepted and ignored.
pub async fn handle_update_analysis(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(entry): Json<AnalysisEntry>,
) -> Result<StatusCode, AppError> {
    if entry.id != id {
        return Err(AppError::Validation(format!(
            "body id '{}' does not match path id '{id}'",
            entry.id
        )));
    }
    state.engine.update_entry(entry).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/v1/analyses/:id/confidence
///
/// Merges confidence tags, recomputes the final score and stores the result.
pub async fn handle_update_confidence(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(updates): Json<ConfidenceMap>,
) -> Result<Json<AnalysisEntry>, AppError> {
    state
        .engine
        .update_confidence(&id, &updates)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Analysis {id} not found")))
}
