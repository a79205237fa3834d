use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use consultation_cell::handlers::ConsultationState;
use consultation_cell::router::consultation_routes;
use consultation_cell::services::ConsultationBookingService;
use consultation_cell::store::{ConsultationStore, MemoryConsultationStore, SupabaseConsultationStore};
use psychologist_cell::handlers::PsychologistState;
use psychologist_cell::router::psychologist_routes;
use psychologist_cell::services::AvailabilityService;
use psychologist_cell::store::{
    AvailabilityStore, MemoryAvailabilityStore, MemoryPsychologistDirectory, PsychologistDirectory,
    SupabaseAvailabilityStore, SupabasePsychologistDirectory,
};
use shared_config::{AppConfig, StorageBackend};
use shared_database::supabase::SupabaseClient;
use shared_utils::lock::ScheduleLocks;

struct Stores {
    availability: Arc<dyn AvailabilityStore>,
    directory: Arc<dyn PsychologistDirectory>,
    consultations: Arc<dyn ConsultationStore>,
}

fn build_stores(config: &AppConfig) -> Stores {
    match config.storage_backend {
        StorageBackend::Supabase => {
            let supabase = Arc::new(SupabaseClient::new(config));
            Stores {
                availability: Arc::new(SupabaseAvailabilityStore::new(supabase.clone())),
                directory: Arc::new(SupabasePsychologistDirectory::new(supabase.clone())),
                consultations: Arc::new(SupabaseConsultationStore::new(supabase)),
            }
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, data is lost on restart");
            Stores {
                availability: Arc::new(MemoryAvailabilityStore::new()),
                directory: Arc::new(MemoryPsychologistDirectory::new()),
                consultations: Arc::new(MemoryConsultationStore::new()),
            }
        }
    }
}

/// Both cells share one lock registry so availability and consultation
/// writes for a psychologist are serialized in-process.
pub fn create_router(config: Arc<AppConfig>) -> Router {
    let stores = build_stores(&config);
    let locks = ScheduleLocks::new();

    let availability = Arc::new(AvailabilityService::new(stores.availability, locks.clone()));
    let booking = Arc::new(ConsultationBookingService::new(
        stores.consultations,
        stores.directory,
        availability.clone(),
        locks,
        &config.scheduling,
    ));

    let psychologists = PsychologistState {
        config: config.clone(),
        availability,
    };
    let consultations = ConsultationState { config, booking };

    Router::new()
        .route("/health", get(health))
        .merge(psychologist_routes(psychologists))
        .merge(consultation_routes(consultations))
}

async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use shared_models::auth::Role;
    use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_is_public() {
        let app = create_router(TestConfig::default().to_arc());

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(serde_json::from_slice::<Value>(&body).unwrap(), json!({ "ok": true }));
    }

    #[tokio::test]
    async fn cells_share_one_memory_backend() {
        let config = TestConfig::default();
        let app = create_router(config.to_arc());

        let psychologist = TestUser::with_id("psy-9", Role::Psychologist);
        let token = JwtTestUtils::create_test_token(&psychologist, &config.jwt_secret, None);

        let created = app
            .clone()
            .oneshot(
                Request::post("/psychologists/psy-9/availabilities")
                    .header("content-type", "application/json")
                    .header("authorization", format!("Bearer {}", token))
                    .body(Body::from(
                        json!({ "weekday": 1, "start_time": "09:00", "end_time": "12:00" }).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);

        let listed = app
            .clone()
            .oneshot(
                Request::get("/psychologists/psy-9/availabilities")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = to_bytes(listed.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["items"].as_array().unwrap().len(), 1);

        let consultations = app
            .oneshot(
                Request::get("/consultations")
                    .header("authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(consultations.status(), StatusCode::OK);
    }
}
