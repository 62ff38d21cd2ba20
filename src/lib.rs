use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core decision logic: access policy and derived numbers.
pub mod aggregates;
pub mod policy;

// Application services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod storage;

// Routing segregation (Public, Authenticated, Admin).
pub mod routes;
use auth::AuthUser;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::{ApiError, ApiResult};
pub use repository::{MemoryRepository, PostgresRepository, RepositoryState};
pub use storage::{MockStorageService, S3StorageClient, StorageState};

/// ApiDoc
///
/// OpenAPI document assembled from the `#[utoipa::path]` handlers and `ToSchema` models,
/// served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::accounts::register_user, handlers::accounts::get_me, handlers::accounts::update_me,
        handlers::uploads::get_presigned_url,
        handlers::admin::get_admin_stats, handlers::admin::list_users, handlers::admin::delete_user,
        handlers::categories::list_categories, handlers::categories::get_category,
        handlers::categories::create_category, handlers::categories::update_category,
        handlers::categories::delete_category,
        handlers::courses::list_courses, handlers::courses::create_course, handlers::courses::get_course,
        handlers::courses::update_course, handlers::courses::delete_course,
        handlers::courses::list_course_lessons, handlers::courses::get_course_data,
        handlers::lessons::list_lessons, handlers::lessons::create_lesson, handlers::lessons::get_lesson,
        handlers::lessons::update_lesson, handlers::lessons::delete_lesson,
        handlers::lessons::list_lesson_contents,
        handlers::contents::list_contents, handlers::contents::create_content,
        handlers::contents::get_content, handlers::contents::update_content,
        handlers::contents::delete_content,
        handlers::progress::complete_content, handlers::progress::get_course_progress,
        handlers::progress::get_course_analytics,
        handlers::quizzes::list_quizzes, handlers::quizzes::get_quiz, handlers::quizzes::submit_quiz,
        handlers::enrollments::list_enrollments, handlers::enrollments::create_enrollment,
        handlers::enrollments::get_enrollment, handlers::enrollments::update_enrollment,
        handlers::enrollments::assign_grade, handlers::enrollments::delete_enrollment,
        handlers::reviews::list_reviews, handlers::reviews::get_review, handlers::reviews::create_review,
        handlers::reviews::update_review, handlers::reviews::delete_review,
    ),
    components(
        schemas(
            models::Role, models::ContentKind, models::LetterGrade,
            models::UserProfile, models::RegisterUserRequest, models::UpdateProfileRequest,
            models::Category, models::CreateCategoryRequest, models::UpdateCategoryRequest,
            models::Course, models::CreateCourseRequest, models::UpdateCourseRequest,
            models::Lesson, models::CreateLessonRequest, models::UpdateLessonRequest,
            models::Content, models::ContentBody, models::VideoPayload, models::TextPayload,
            models::QuizPayload, models::QuizQuestion,
            models::CreateContentRequest, models::UpdateContentRequest,
            models::Enrollment, models::CreateEnrollmentRequest, models::UpdateEnrollmentRequest,
            models::AssignGradeRequest,
            models::Review, models::CreateReviewRequest, models::UpdateReviewRequest,
            models::SubmitQuizRequest, models::QuizResult, models::ContentProgress,
            models::CourseProgress, models::CourseAnalytics, models::CourseTree, models::LessonWithContents,
            models::CourseSummary, models::ReviewDetail, models::EnrollmentDetail, models::ContentDetail,
            models::PresignedUrlRequest, models::PresignedUrlResponse, models::AdminDashboardStats,
            error::ErrorBody,
        )
    ),
    tags(
        (name = "lms-portal", description = "Learning portal API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The unified, cloneable state shared by every request. Handlers and extractors pull
/// the piece they need through `FromRef`.
#[derive(Clone)]
pub struct AppState {
    /// Persistence, behind `Arc<dyn Repository>`.
    pub repo: RepositoryState,
    /// Object storage for presigned uploads.
    pub storage: StorageState,
    /// Immutable configuration loaded at startup.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Rejects the request with `401` before any handler runs unless `AuthUser` resolves.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the route modules, the Swagger UI and the observability layers around them.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        // Staff checks happen in the handlers via `policy::can_administer`.
        .nest("/admin", admin::admin_routes())
        .with_state(state);

    // Request id is generated first so the trace span and the response both carry it.
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Builds the per-request span so every log line of a request shares its `x-request-id`.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
