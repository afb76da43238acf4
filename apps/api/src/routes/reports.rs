use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::reports::{AnalysisReport, ItemAnswer, PpdtSubmission, ReportRequest};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct AnswersRequest {
    pub answers: Vec<ItemAnswer>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    #[serde(flatten)]
    pub report: AnalysisReport,
    pub generated_at: DateTime<Utc>,
}

async fn generate(
    state: &AppState,
    request: ReportRequest,
) -> Result<Json<ReportResponse>, AppError> {
    let report = state.requester.request(request).await?;
    Ok(Json(ReportResponse {
        report,
        generated_at: Utc::now(),
    }))
}

/// POST /api/v1/reports/word-association
pub async fn handle_word_association(
    State(state): State<AppState>,
    Json(req): Json<AnswersRequest>,
) -> Result<Json<ReportResponse>, AppError> {
    generate(&state, ReportRequest::WordAssociation(req.answers)).await
}

/// POST /api/v1/reports/situation-reaction
pub async fn handle_situation_reaction(
    State(state): State<AppState>,
    Json(req): Json<AnswersRequest>,
) -> Result<Json<ReportResponse>, AppError> {
    generate(&state, ReportRequest::SituationReaction(req.answers)).await
}

/// POST /api/v1/reports/ppdt
pub async fn handle_ppdt(
    State(state): State<AppState>,
    Json(req): Json<PpdtSubmission>,
) -> Result<Json<ReportResponse>, AppError> {
    generate(&state, ReportRequest::Ppdt(req)).await
}
