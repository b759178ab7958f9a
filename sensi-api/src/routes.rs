//! Route definitions for the Sensi API.
//!
//! Provides HTTP endpoints for calculation, explanation, presets, device
//! lookup, and health checks.

use crate::devices::{DeviceLookup, DeviceSpec};
use crate::presets::{NewPreset, Preset, PresetStore};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use sensi_common::{Config, Error};
use sensi_engine::{
    calculate, explain, explain_sections, CalculationInput, InputError, RawCalculationInput,
    Section, SensitivityResult, MAX_SENSITIVITY, MIN_SENSITIVITY,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub presets: Arc<PresetStore>,
    pub devices: Arc<DeviceLookup>,
}

impl AppState {
    /// State backed by the configured preset file and device cache.
    pub fn from_config(config: &Config) -> sensi_common::Result<Self> {
        Ok(Self {
            presets: Arc::new(PresetStore::new(config.presets_path())),
            devices: Arc::new(DeviceLookup::from_config(config)?),
        })
    }
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub service: String,
}

/// Calculation request: a raw form plus an optional explanation flag.
#[derive(Debug, Deserialize)]
pub struct CalculateRequest {
    #[serde(flatten)]
    pub input: RawCalculationInput,
    #[serde(default)]
    pub explain: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CalculateResponse {
    pub input: CalculationInput,
    pub sensitivities: SensitivityResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Explanation request. The result is recomputed when omitted.
#[derive(Debug, Deserialize)]
pub struct ExplainRequest {
    #[serde(default)]
    pub input: RawCalculationInput,
    #[serde(default)]
    pub result: Option<SensitivityResult>,
}

#[derive(Debug, Serialize)]
pub struct ExplainResponse {
    pub text: String,
    pub sections: Vec<Section>,
}

/// Preset creation request.
#[derive(Debug, Deserialize)]
pub struct CreatePresetRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default)]
    pub input: RawCalculationInput,
    #[serde(default)]
    pub sensitivities: Option<SensitivityResult>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListPresetsResponse {
    pub presets: Vec<Preset>,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct DeviceQuery {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeviceLookupResponse {
    pub found: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<DeviceSpec>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(err: &Error) -> ApiError {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        tracing::error!(error = %err, "Request failed");
    }
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            code: err.code().into(),
        }),
    )
}

fn input_error(err: &InputError) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: err.to_string(),
            code: "INVALID_INPUT".into(),
        }),
    )
}

/// Build the complete router from configuration.
pub fn build_all_routes(config: &Config) -> sensi_common::Result<Router> {
    Ok(build_all_routes_with_state(AppState::from_config(config)?))
}

/// Build the complete router over explicit state.
/// This is useful for testing with isolated stores.
pub fn build_all_routes_with_state(state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(api_routes(state))
}

/// Health check routes.
pub fn health_routes() -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/v1/health", get(health_handler))
}

/// Calculation, preset, and device routes.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/calculate", post(calculate_handler))
        .route("/api/v1/explain", post(explain_handler))
        .route(
            "/api/v1/presets",
            get(list_presets_handler).post(create_preset_handler),
        )
        .route(
            "/api/v1/presets/:id",
            get(get_preset_handler).delete(delete_preset_handler),
        )
        .route("/api/v1/devices/lookup", get(device_lookup_handler))
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// Calculation Handlers
// ─────────────────────────────────────────────────────────────────────────────

async fn calculate_handler(
    Json(request): Json<CalculateRequest>,
) -> Result<Json<CalculateResponse>, ApiError> {
    let input = request.input.normalize().map_err(|e| input_error(&e))?;
    let sensitivities = calculate(&input);
    let explanation = request.explain.then(|| explain(&input, &sensitivities));

    tracing::debug!(
        platform = %input.platform,
        playstyle = %input.playstyle,
        general = sensitivities.general,
        "Calculated sensitivities"
    );

    Ok(Json(CalculateResponse {
        input,
        sensitivities,
        explanation,
    }))
}

async fn explain_handler(
    Json(request): Json<ExplainRequest>,
) -> Result<Json<ExplainResponse>, ApiError> {
    let input = request.input.normalize().map_err(|e| input_error(&e))?;
    let result = match request.result {
        Some(result) => {
            check_range(&result).map_err(|e| api_error(&e))?;
            result
        }
        None => calculate(&input),
    };

    Ok(Json(ExplainResponse {
        text: explain(&input, &result),
        sections: explain_sections(&input, &result),
    }))
}

fn check_range(result: &SensitivityResult) -> sensi_common::Result<()> {
    for (channel, value) in result.iter() {
        if !(MIN_SENSITIVITY..=MAX_SENSITIVITY).contains(&value) {
            return Err(Error::InvalidInput(format!(
                "{} must be between {} and {}, got {}",
                channel.label(),
                MIN_SENSITIVITY,
                MAX_SENSITIVITY,
                value
            )));
        }
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Preset Handlers
// ─────────────────────────────────────────────────────────────────────────────

async fn list_presets_handler(
    State(state): State<AppState>,
) -> Result<Json<ListPresetsResponse>, ApiError> {
    let presets = state.presets.list().await.map_err(|e| api_error(&e))?;
    Ok(Json(ListPresetsResponse {
        total: presets.len(),
        presets,
    }))
}

async fn create_preset_handler(
    State(state): State<AppState>,
    Json(request): Json<CreatePresetRequest>,
) -> Result<(StatusCode, Json<Preset>), ApiError> {
    let input = request.input.normalize().map_err(|e| input_error(&e))?;
    let sensitivities = match request.sensitivities {
        Some(result) => {
            check_range(&result).map_err(|e| api_error(&e))?;
            result
        }
        None => calculate(&input),
    };

    let preset = state
        .presets
        .create(NewPreset {
            name: request.name,
            device: request.device,
            input,
            sensitivities,
        })
        .await
        .map_err(|e| api_error(&e))?;

    Ok((StatusCode::CREATED, Json(preset)))
}

async fn get_preset_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Preset>, ApiError> {
    match state.presets.get(&id).await.map_err(|e| api_error(&e))? {
        Some(preset) => Ok(Json(preset)),
        None => Err(api_error(&Error::NotFound(format!("preset {id}")))),
    }
}

async fn delete_preset_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let deleted = state.presets.delete(&id).await.map_err(|e| api_error(&e))?;
    if !deleted {
        return Err(api_error(&Error::NotFound(format!("preset {id}"))));
    }

    Ok(StatusCode::NO_CONTENT)
}

// ─────────────────────────────────────────────────────────────────────────────
// Device Handlers
// ─────────────────────────────────────────────────────────────────────────────

async fn device_lookup_handler(
    State(state): State<AppState>,
    Query(query): Query<DeviceQuery>,
) -> Result<Json<DeviceLookupResponse>, ApiError> {
    let device = state
        .devices
        .lookup(&query.name)
        .await
        .map_err(|e| api_error(&e))?;

    tracing::debug!(device = %query.name, found = device.is_some(), "Device lookup");

    Ok(Json(DeviceLookupResponse {
        found: device.is_some(),
        device,
    }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Health Handlers
// ─────────────────────────────────────────────────────────────────────────────

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        service: "sensi-api".into(),
    })
}
