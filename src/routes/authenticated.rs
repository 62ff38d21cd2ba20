use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Authenticated Router Module
///
/// Everything a signed-in student or instructor can reach. The router above wraps this
/// module in the auth middleware, so every handler receives a resolved `AuthUser`; who may
/// do what on a given resource is decided per handler by `crate::policy`.
///
/// `POST /courses` and `POST /reviews` live here while their `GET` siblings are public;
/// axum merges the method routers of both modules.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // --- Account & media ---
        .route("/me", get(handlers::accounts::get_me).patch(handlers::accounts::update_me))
        // Short-lived presigned PUT URL for course thumbnails and avatars.
        .route("/upload/presigned", post(handlers::uploads::get_presigned_url))
        // --- Courses ---
        .route("/courses", post(handlers::courses::create_course))
        .route(
            "/courses/{id}",
            get(handlers::courses::get_course)
                .put(handlers::courses::update_course)
                .delete(handlers::courses::delete_course),
        )
        .route("/courses/{id}/lessons", get(handlers::courses::list_course_lessons))
        .route("/courses/{id}/analytics", get(handlers::progress::get_course_analytics))
        .route("/courses/{id}/progress", get(handlers::progress::get_course_progress))
        // Full course tree; requires ownership or an active enrollment even for reads.
        .route("/course-data/{id}", get(handlers::courses::get_course_data))
        // --- Lessons ---
        .route(
            "/lessons",
            get(handlers::lessons::list_lessons).post(handlers::lessons::create_lesson),
        )
        .route(
            "/lessons/{id}",
            get(handlers::lessons::get_lesson)
                .put(handlers::lessons::update_lesson)
                .delete(handlers::lessons::delete_lesson),
        )
        .route("/lessons/{id}/contents", get(handlers::lessons::list_lesson_contents))
        // --- Contents ---
        .route(
            "/contents",
            get(handlers::contents::list_contents).post(handlers::contents::create_content),
        )
        .route(
            "/contents/{id}",
            get(handlers::contents::get_content)
                .put(handlers::contents::update_content)
                .delete(handlers::contents::delete_content),
        )
        // Idempotent: completing twice keeps the first record.
        .route("/contents/{id}/complete", post(handlers::progress::complete_content))
        // --- Quizzes ---
        .route("/quizzes", get(handlers::quizzes::list_quizzes))
        .route("/quizzes/{id}", get(handlers::quizzes::get_quiz))
        // One submission per student and quiz.
        .route("/quizzes/{id}/submit", post(handlers::quizzes::submit_quiz))
        // --- Enrollments ---
        .route(
            "/enrollments",
            get(handlers::enrollments::list_enrollments).post(handlers::enrollments::create_enrollment),
        )
        .route(
            "/enrollments/{id}",
            get(handlers::enrollments::get_enrollment)
                .patch(handlers::enrollments::update_enrollment)
                .delete(handlers::enrollments::delete_enrollment),
        )
        .route("/enrollments/{id}/grade", put(handlers::enrollments::assign_grade))
        // --- Reviews ---
        .route("/reviews", post(handlers::reviews::create_review))
        .route(
            "/reviews/{id}",
            put(handlers::reviews::update_review).delete(handlers::reviews::delete_review),
        )
}
