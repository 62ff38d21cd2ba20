use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use super::{enrollment_in, load_content, load_course};
use crate::{
    AppState,
    aggregates,
    auth::AuthUser,
    error::{ApiResult, ErrorBody},
    models::{ContentProgress, CourseAnalytics, CourseProgress, EnrollmentFilter},
    policy,
    repository::EnrollmentScope,
};

/// complete_content
///
/// [Authenticated Route] Marks a content item as completed by the calling student.
/// Idempotent: repeating the call returns the original record.
#[utoipa::path(
    post,
    path = "/contents/{id}/complete",
    params(("id" = Uuid, Path, description = "Content ID")),
    responses(
        (status = 200, description = "Completed", body = ContentProgress),
        (status = 403, description = "Not an enrolled student", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn complete_content(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ContentProgress>> {
    let (content, course) = load_content(&state, id).await?;
    let enrollment = enrollment_in(&state, &user, &course).await;
    policy::can_complete_content(Some(&user), enrollment.as_ref()).into_result()?;

    let record = state.repo.mark_content_complete(user.id, content.id).await?;
    tracing::info!(student_id = %user.id, content_id = %content.id, "content completed");
    Ok(Json(record))
}

/// get_course_progress
///
/// [Authenticated Route] The caller's completion percentage for a course.
#[utoipa::path(
    get,
    path = "/courses/{id}/progress",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Progress", body = CourseProgress),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn get_course_progress(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<CourseProgress>> {
    let course = load_course(&state, id).await?;
    let total_contents = state.repo.count_course_contents(course.id).await;
    let completed_contents = state.repo.count_completed_contents(user.id, course.id).await;

    Ok(Json(CourseProgress {
        course_id: course.id,
        total_contents,
        completed_contents,
        percentage: aggregates::completion_percentage(completed_contents, total_contents),
    }))
}

/// get_course_analytics
///
/// [Authenticated Route] Owning instructor only.
#[utoipa::path(
    get,
    path = "/courses/{id}/analytics",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Analytics", body = CourseAnalytics),
        (status = 403, description = "Not the owning instructor", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn get_course_analytics(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<CourseAnalytics>> {
    let course = load_course(&state, id).await?;
    policy::can_view_analytics(Some(&user), &course).into_result()?;

    let filter = EnrollmentFilter {
        course: Some(course.id),
        ..EnrollmentFilter::default()
    };
    let enrollments = state
        .repo
        .list_enrollments(&filter, EnrollmentScope::Instructor(user.id))
        .await;
    let total_contents = state.repo.count_course_contents(course.id).await;
    let completion_counts = state.repo.completion_counts(course.id).await;

    Ok(Json(CourseAnalytics {
        course_id: course.id,
        total_enrollments: enrollments.len() as i64,
        active_enrollments: enrollments.iter().filter(|e| e.is_active).count() as i64,
        total_contents,
        completion_rate: aggregates::completion_rate(&completion_counts, total_contents),
        average_rating: course.average_rating,
    }))
}
