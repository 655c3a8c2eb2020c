use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use log::error;

use super::error::ApiError;
use crate::{api_types::InferenceRequest, state::AppState};

/// Pass the upstream body back untouched. Every dispatcher failure is a 500.
#[axum::debug_handler]
pub async fn run_inference(
    State(app_state): State<AppState>,
    payload: Result<Json<InferenceRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        error!("Inference error: {}", rejection.body_text());
        ApiError::internal(rejection.body_text())
    })?;

    let result = app_state
        .dispatcher
        .run_inference(request)
        .await
        .map_err(|err| {
            error!("Inference error: {}", err);
            ApiError::internal(err.to_string())
        })?;

    let content_type = result
        .content_type
        .unwrap_or_else(|| "application/json".to_owned());

    Ok(([(header::CONTENT_TYPE, content_type)], result.body).into_response())
}
