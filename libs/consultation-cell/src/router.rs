use axum::{
    middleware,
    routing::get,
    Router,
};

use shared_utils::extractor::auth_middleware;

use crate::handlers::{self, ConsultationState};

pub fn consultation_routes(state: ConsultationState) -> Router {
    Router::new()
        .route(
            "/consultations",
            get(handlers::list_my_consultations).post(handlers::create_consultation),
        )
        .route(
            "/consultations/{consultation_id}",
            get(handlers::get_consultation)
                .put(handlers::update_consultation)
                .delete(handlers::cancel_consultation),
        )
        .route(
            "/psychologists/{psychologist_id}/consultations",
            get(handlers::list_psychologist_consultations),
        )
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware))
        .with_state(state)
}
