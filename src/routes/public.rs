use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without credentials. Handlers here still consult the policy
/// evaluator with an optional viewer, so anonymous callers only ever get reads.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness check for the load balancer.
        .route("/health", get(|| async { "ok" }))
        // POST /register
        // Signs up with the auth provider and mirrors the profile locally.
        .route("/register", post(handlers::accounts::register_user))
        // GET /categories, GET /categories/{id}
        .route("/categories", get(handlers::categories::list_categories))
        .route("/categories/{id}", get(handlers::categories::get_category))
        // GET /courses?search=...&category=...&ordering=-price
        // The public catalog.
        .route("/courses", get(handlers::courses::list_courses))
        // GET /reviews?course=..., GET /reviews/{id}
        .route("/reviews", get(handlers::reviews::list_reviews))
        .route("/reviews/{id}", get(handlers::reviews::get_review))
}
