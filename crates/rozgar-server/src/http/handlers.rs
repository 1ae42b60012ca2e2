// SPDX-License-Identifier: Apache-2.0

use crate::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, info};

pub(crate) fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

pub(crate) async fn healthz_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub(crate) async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, state.service.metrics.render_prometheus())
}

pub(crate) async fn districts_handler(State(state): State<AppState>) -> Response {
    let districts = state.service.districts();
    match serde_json::to_value(districts) {
        Ok(payload) => Json(payload).into_response(),
        Err(e) => {
            error!("district list serialization failed: {e}");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch districts",
            )
        }
    }
}

pub(crate) async fn district_data_handler(
    State(state): State<AppState>,
    Path(district): Path<String>,
) -> Response {
    let id = match rozgar_model::DistrictId::parse(&district) {
        Ok(id) => id,
        Err(e) => {
            info!(raw = %district, "rejected district id: {e}");
            let message = if district.trim().is_empty() {
                "District ID is required"
            } else {
                "Invalid district ID"
            };
            return error_response(StatusCode::BAD_REQUEST, message);
        }
    };

    match state.service.district_data(&id).await {
        Some(dataset) => {
            // A payload that fails the shape check must never leave the
            // process; the cause is logged, the caller sees a generic error.
            if let Err(e) = dataset.validate() {
                error!(district = %id, "dataset failed validation before send: {e}");
                return error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to fetch district data",
                );
            }
            Json(dataset).into_response()
        }
        None => error_response(StatusCode::NOT_FOUND, "District data not found"),
    }
}
