use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::{Actor, Role};
use shared_models::error::AppError;
use shared_utils::extractor::require_role;
use shared_utils::pagination::{PageQuery, Pagination};

use crate::models::{CalendarQuery, CreateConsultationRequest, UpdateConsultationRequest};
use crate::services::ConsultationBookingService;

#[derive(Clone)]
pub struct ConsultationState {
    pub config: Arc<AppConfig>,
    pub booking: Arc<ConsultationBookingService>,
}

#[axum::debug_handler]
pub async fn list_my_consultations(
    State(state): State<ConsultationState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>, AppError> {
    let page = state
        .booking
        .list_my_consultations(&actor, Pagination::from_query(&query))
        .await?;

    Ok(Json(json!(page)))
}

#[axum::debug_handler]
pub async fn get_consultation(
    State(state): State<ConsultationState>,
    Path(consultation_id): Path<String>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Value>, AppError> {
    let consultation = state.booking.get_consultation(&consultation_id, &actor).await?;
    Ok(Json(json!({ "consultation": consultation })))
}

#[axum::debug_handler]
pub async fn create_consultation(
    State(state): State<ConsultationState>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<CreateConsultationRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_role(&actor, &[Role::Patient, Role::Admin])?;

    let consultation = state.booking.create_consultation(&actor, request).await?;

    Ok((StatusCode::CREATED, Json(json!({ "consultation": consultation }))))
}

#[axum::debug_handler]
pub async fn update_consultation(
    State(state): State<ConsultationState>,
    Path(consultation_id): Path<String>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<UpdateConsultationRequest>,
) -> Result<Json<Value>, AppError> {
    require_role(&actor, &[Role::Psychologist, Role::Admin])?;

    let consultation = state
        .booking
        .update_consultation(&consultation_id, &actor, request)
        .await?;

    Ok(Json(json!({ "consultation": consultation })))
}

#[axum::debug_handler]
pub async fn cancel_consultation(
    State(state): State<ConsultationState>,
    Path(consultation_id): Path<String>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Value>, AppError> {
    let consultation = state.booking.cancel_consultation(&consultation_id, &actor).await?;
    Ok(Json(json!({ "consultation": consultation })))
}

#[axum::debug_handler]
pub async fn list_psychologist_consultations(
    State(state): State<ConsultationState>,
    Path(psychologist_id): Path<String>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<Value>, AppError> {
    let items = state
        .booking
        .list_for_psychologist(&psychologist_id, query.status.as_deref(), &actor)
        .await?;

    Ok(Json(json!({ "items": items })))
}
