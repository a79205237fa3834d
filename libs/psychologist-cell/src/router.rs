use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use shared_utils::extractor::auth_middleware;

use crate::handlers::{self, PsychologistState};

pub fn psychologist_routes(state: PsychologistState) -> Router {
    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/psychologists/{psychologist_id}/availabilities", get(handlers::list_availabilities));

    // Protected routes (authentication required)
    let protected_routes = Router::new()
        .route("/psychologists/{psychologist_id}/availabilities", post(handlers::create_availability))
        .route("/availabilities/{availability_id}", put(handlers::update_availability))
        .route("/availabilities/{availability_id}", delete(handlers::delete_availability))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
