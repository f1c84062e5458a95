//! REST API handlers

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use sensorgen_core::{DeviceId, GenerationRequest, SensorCategory, SensorQuery};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::state::AppState;

/// API error response
#[derive(Serialize)]
struct ApiError {
    error: String,
}

impl ApiError {
    fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}

/// Catalog filter query string
#[derive(Deserialize)]
pub struct SensorListParams {
    category: Option<String>,
    q: Option<String>,
}

/// List sensors, optionally filtered by category and text
pub async fn list_sensors(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SensorListParams>,
) -> impl IntoResponse {
    let category = match params.category.as_deref().filter(|c| !c.is_empty()) {
        Some(name) => match name.parse::<SensorCategory>() {
            Ok(category) => Some(category),
            Err(e) => {
                return (StatusCode::BAD_REQUEST, Json(ApiError::new(e.to_string())))
                    .into_response()
            }
        },
        None => None,
    };

    let query = SensorQuery {
        category,
        text: params.q,
    };
    Json(state.registry.search(&query)).into_response()
}

/// Get a sensor by id
pub async fn get_sensor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.registry.lookup(&id) {
        Some(sensor) => Json(sensor).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ApiError::new("Sensor not found")),
        )
            .into_response(),
    }
}

#[derive(Serialize)]
struct CategoryCount {
    category: SensorCategory,
    count: usize,
}

/// Sensor counts per category
pub async fn list_categories(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let categories: Vec<CategoryCount> = state
        .registry
        .categories()
        .into_iter()
        .map(|(category, count)| CategoryCount { category, count })
        .collect();
    Json(categories)
}

/// Generate firmware source for inline preview or clipboard copy
pub async fn generate_firmware(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerationRequest>,
) -> impl IntoResponse {
    debug!(device = %request.device_id, sensors = ?request.sensors, "Firmware requested");
    let program = state.generate(request);
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        program.source,
    )
}

/// Generate firmware source as a file download
pub async fn download_firmware(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerationRequest>,
) -> impl IntoResponse {
    let program = state.generate(request);
    info!(file = %program.file_name, "Firmware download");
    let disposition = format!("attachment; filename=\"{}\"", program.file_name);
    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        program.source,
    )
}

/// Wiring guide for the sensors in a request
pub async fn wiring_guide(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerationRequest>,
) -> impl IntoResponse {
    Json(state.wiring(&request))
}

/// Allocate a fresh device id
pub async fn new_device_id() -> impl IntoResponse {
    let id = DeviceId::generate();
    debug!(device = %id, "Generated device id");
    Json(serde_json::json!({ "device_id": id }))
}
