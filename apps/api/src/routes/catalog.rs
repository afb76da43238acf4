use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::catalog::{self, TestDescriptor, TestMode};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct TestSummary {
    pub mode: TestMode,
    pub title: &'static str,
    pub description: &'static str,
}

/// GET /api/v1/tests
pub async fn handle_list_tests() -> Json<Vec<TestSummary>> {
    Json(
        catalog::all()
            .into_iter()
            .map(|d| TestSummary {
                mode: d.mode,
                title: d.title,
                description: d.description,
            })
            .collect(),
    )
}

/// GET /api/v1/tests/:mode
pub async fn handle_get_test(
    Path(mode): Path<String>,
) -> Result<Json<&'static TestDescriptor>, AppError> {
    let mode: TestMode = mode.parse().map_err(AppError::NotFound)?;
    Ok(Json(catalog::descriptor(mode)))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StimulusResponse {
    pub image_data_uri: String,
}

/// GET /api/v1/stimulus
pub async fn handle_stimulus(
    State(state): State<AppState>,
) -> Result<Json<StimulusResponse>, AppError> {
    let image_data_uri = state.capture.capture().await?;
    Ok(Json(StimulusResponse { image_data_uri }))
}
