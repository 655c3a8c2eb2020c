use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use log::error;

use super::error::ApiError;
use crate::{
    api_types::{CompareRequest, ComparisonRow},
    state::AppState,
};

#[axum::debug_handler]
pub async fn compare_models(
    State(app_state): State<AppState>,
    payload: Result<Json<CompareRequest>, JsonRejection>,
) -> Result<Json<Vec<ComparisonRow>>, ApiError> {
    let Json(request) = payload?;

    // Shape violations are caller errors and never reach the comparator.
    request
        .validate()
        .map_err(|err| ApiError::bad_request(err.to_string()))?;

    let rows = app_state
        .comparator
        .compare_models(&request)
        .await
        .map_err(|err| {
            error!("Error comparing models: {}", err);
            ApiError::internal("Failed to compare models").with_details(err.to_string())
        })?;

    Ok(Json(rows))
}
