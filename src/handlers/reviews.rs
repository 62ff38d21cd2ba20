use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use super::{DisplayNames, enrollment_in, load_course};
use crate::{
    AppState,
    auth::AuthUser,
    error::{ApiError, ApiResult, ErrorBody},
    models::{CreateReviewRequest, Review, ReviewDetail, ReviewFilter, UpdateReviewRequest},
    policy::{self, Access},
};

async fn refresh_rating(state: &AppState, course_id: Uuid) -> ApiResult<()> {
    let average = state.repo.recompute_average_rating(course_id).await?;
    tracing::debug!(course_id = %course_id, average, "average rating recomputed");
    Ok(())
}

/// list_reviews
///
/// [Public Route] Optionally filtered by `course`.
#[utoipa::path(
    get,
    path = "/reviews",
    params(ReviewFilter),
    responses((status = 200, description = "Reviews", body = [ReviewDetail]))
)]
pub async fn list_reviews(
    viewer: Option<AuthUser>,
    State(state): State<AppState>,
    Query(filter): Query<ReviewFilter>,
) -> ApiResult<Json<Vec<ReviewDetail>>> {
    policy::can_review(viewer.as_ref(), Access::Read, None).into_result()?;
    let reviews = state.repo.list_reviews(&filter).await;
    let mut names = DisplayNames::new(&state);
    let mut listed = Vec::with_capacity(reviews.len());
    for review in reviews {
        listed.push(names.review_detail(review).await);
    }
    Ok(Json(listed))
}

/// get_review
///
/// [Public Route]
#[utoipa::path(
    get,
    path = "/reviews/{id}",
    params(("id" = Uuid, Path, description = "Review ID")),
    responses(
        (status = 200, description = "Found", body = ReviewDetail),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn get_review(
    viewer: Option<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ReviewDetail>> {
    let review = state.repo.get_review(id).await.ok_or(ApiError::NotFound)?;
    policy::can_edit_review(viewer.as_ref(), Access::Read, &review).into_result()?;
    Ok(Json(DisplayNames::new(&state).review_detail(review).await))
}

/// create_review
///
/// [Authenticated Route] Students holding an enrollment (active or not) may review a course
/// once. The course's average rating is recomputed afterwards.
#[utoipa::path(
    post,
    path = "/reviews",
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Created", body = Review),
        (status = 400, description = "Invalid rating or comment", body = ErrorBody),
        (status = 403, description = "Not an enrolled student", body = ErrorBody),
        (status = 409, description = "Already reviewed", body = ErrorBody)
    )
)]
pub async fn create_review(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateReviewRequest>,
) -> ApiResult<(StatusCode, Json<Review>)> {
    let course = load_course(&state, payload.course_id).await?;
    let enrollment = enrollment_in(&state, &user, &course).await;
    policy::can_review(Some(&user), Access::Write, enrollment.as_ref()).into_result()?;
    payload.validate()?;

    let review = state.repo.create_review(user.id, payload).await?;
    refresh_rating(&state, course.id).await?;
    tracing::info!(review_id = %review.id, course_id = %course.id, rating = review.rating, "review posted");
    Ok((StatusCode::CREATED, Json(review)))
}

/// update_review
///
/// [Authenticated Route] Author only.
#[utoipa::path(
    put,
    path = "/reviews/{id}",
    params(("id" = Uuid, Path, description = "Review ID")),
    request_body = UpdateReviewRequest,
    responses(
        (status = 200, description = "Updated", body = Review),
        (status = 403, description = "Not the author", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn update_review(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateReviewRequest>,
) -> ApiResult<Json<Review>> {
    let review = state.repo.get_review(id).await.ok_or(ApiError::NotFound)?;
    policy::can_edit_review(Some(&user), Access::Write, &review).into_result()?;
    payload.validate()?;

    let review = state.repo.update_review(id, payload).await?;
    refresh_rating(&state, review.course_id).await?;
    Ok(Json(review))
}

/// delete_review
///
/// [Authenticated Route] Author only. The average rating is recomputed without the review.
#[utoipa::path(
    delete,
    path = "/reviews/{id}",
    params(("id" = Uuid, Path, description = "Review ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not the author", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn delete_review(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let review = state.repo.get_review(id).await.ok_or(ApiError::NotFound)?;
    policy::can_edit_review(Some(&user), Access::Write, &review).into_result()?;
    if !state.repo.delete_review(id).await {
        return Err(ApiError::NotFound);
    }
    refresh_rating(&state, review.course_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
