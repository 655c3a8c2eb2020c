use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use log::error;

use super::error::ApiError;
use crate::{
    api_types::{DemoUrlRequest, DemoUrlResponse},
    provider::Provider,
    state::AppState,
};

#[axum::debug_handler]
pub async fn fetch_demo_url(
    State(app_state): State<AppState>,
    payload: Result<Json<DemoUrlRequest>, JsonRejection>,
) -> Result<Json<DemoUrlResponse>, ApiError> {
    let Json(DemoUrlRequest { model_id, provider }) = payload?;

    let model_id = match model_id {
        Some(id) if !id.trim().is_empty() => id,
        _ => return Err(ApiError::bad_request("Model ID is required")),
    };
    let provider = match provider {
        Some(p) if !p.trim().is_empty() => p,
        _ => return Err(ApiError::bad_request("Provider is required")),
    };
    if provider.parse::<Provider>().is_err() {
        return Err(ApiError::bad_request(format!(
            "Invalid provider: {}. Valid providers are: {}",
            provider,
            Provider::valid_tags().join(", ")
        )));
    }

    let demo_url = app_state
        .resolver
        .fetch_demo_url(&model_id, &provider)
        .await
        .map_err(|err| {
            error!("Demo URL error: {}", err);
            ApiError::internal(err.to_string())
        })?;

    Ok(Json(DemoUrlResponse { demo_url }))
}
