use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::{Actor, Role};
use shared_models::error::AppError;
use shared_utils::extractor::require_role;

use crate::models::{CreateAvailabilityRequest, UpdateAvailabilityRequest};
use crate::services::AvailabilityService;

#[derive(Clone)]
pub struct PsychologistState {
    pub config: Arc<AppConfig>,
    pub availability: Arc<AvailabilityService>,
}

const MANAGERS: &[Role] = &[Role::Admin, Role::Psychologist];

// ==============================================================================
// PUBLIC HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_availabilities(
    State(state): State<PsychologistState>,
    Path(psychologist_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let items = state.availability.list_by_psychologist(&psychologist_id).await?;
    Ok(Json(json!({ "items": items })))
}

// ==============================================================================
// PROTECTED HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn create_availability(
    State(state): State<PsychologistState>,
    Path(psychologist_id): Path<String>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<CreateAvailabilityRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_role(&actor, MANAGERS)?;

    let availability = state
        .availability
        .create(&psychologist_id, request, &actor)
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "availability": availability }))))
}

#[axum::debug_handler]
pub async fn update_availability(
    State(state): State<PsychologistState>,
    Path(availability_id): Path<String>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<UpdateAvailabilityRequest>,
) -> Result<Json<Value>, AppError> {
    require_role(&actor, MANAGERS)?;

    let availability = state
        .availability
        .update(&availability_id, request, &actor)
        .await?;

    Ok(Json(json!({ "availability": availability })))
}

#[axum::debug_handler]
pub async fn delete_availability(
    State(state): State<PsychologistState>,
    Path(availability_id): Path<String>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Value>, AppError> {
    require_role(&actor, MANAGERS)?;

    state.availability.delete(&availability_id, &actor).await?;

    Ok(Json(json!({ "ok": true })))
}
