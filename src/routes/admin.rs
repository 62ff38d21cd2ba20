use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, post, put},
};

/// Admin Router Module
///
/// Staff-only endpoints, nested under `/admin`. Every handler takes an `AuthUser` (so a
/// missing identity is a 401) and then asks the policy evaluator for staff privileges.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin/stats
        // Totals of users, courses, enrollments and reviews.
        .route("/stats", get(handlers::admin::get_admin_stats))
        // User management. Deleting a profile cascades to everything it owns.
        .route("/users", get(handlers::admin::list_users))
        .route("/users/{id}", delete(handlers::admin::delete_user))
        // Catalog maintenance. Category reads are public.
        .route("/categories", post(handlers::categories::create_category))
        .route(
            "/categories/{id}",
            put(handlers::categories::update_category).delete(handlers::categories::delete_category),
        )
}
