use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use super::{DisplayNames, enrollment_in, gate_content, load_content, load_lesson, visible_contents};
use crate::{
    AppState,
    auth::AuthUser,
    error::{ApiError, ApiResult, ErrorBody},
    models::{Content, ContentDetail, ContentFilter, CreateContentRequest, UpdateContentRequest},
    policy::{self, Access},
};

/// list_contents
///
/// [Authenticated Route] Optionally filtered by `lesson`. Quizzes the caller cannot open are
/// left out; quiz answers are only shown to the owning instructor.
#[utoipa::path(
    get,
    path = "/contents",
    params(ContentFilter),
    responses((status = 200, description = "Contents", body = [ContentDetail]))
)]
pub async fn list_contents(
    user: AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<ContentFilter>,
) -> Json<Vec<ContentDetail>> {
    let contents = visible_contents(&state, &user, state.repo.list_contents(&filter).await).await;
    let mut names = DisplayNames::new(&state);
    let mut listed = Vec::with_capacity(contents.len());
    for content in contents {
        listed.push(names.content_detail(content).await);
    }
    Json(listed)
}

/// create_content
///
/// [Authenticated Route] Owning instructor of the lesson's course only. The body is validated
/// against its declared type before anything is stored.
#[utoipa::path(
    post,
    path = "/contents",
    request_body = CreateContentRequest,
    responses(
        (status = 201, description = "Created", body = Content),
        (status = 400, description = "Malformed body", body = ErrorBody),
        (status = 403, description = "Not Owner", body = ErrorBody),
        (status = 404, description = "Lesson Not Found", body = ErrorBody)
    )
)]
pub async fn create_content(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateContentRequest>,
) -> ApiResult<(StatusCode, Json<Content>)> {
    let (_, course) = load_lesson(&state, payload.lesson_id).await?;
    policy::can_modify_lesson(Some(&user), Access::Write, &course).into_result()?;
    payload.validate()?;
    let content = state.repo.create_content(payload).await?;
    tracing::info!(content_id = %content.id, kind = ?content.kind(), "content created");
    Ok((StatusCode::CREATED, Json(content)))
}

/// get_content
#[utoipa::path(
    get,
    path = "/contents/{id}",
    params(("id" = Uuid, Path, description = "Content ID")),
    responses(
        (status = 200, description = "Found", body = ContentDetail),
        (status = 403, description = "Quiz requires an active enrollment", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn get_content(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ContentDetail>> {
    let (content, course) = load_content(&state, id).await?;
    let enrollment = enrollment_in(&state, &user, &course).await;
    let content = gate_content(&user, content, &course, enrollment.as_ref())?;
    Ok(Json(DisplayNames::new(&state).content_detail(content).await))
}

/// update_content
#[utoipa::path(
    put,
    path = "/contents/{id}",
    params(("id" = Uuid, Path, description = "Content ID")),
    request_body = UpdateContentRequest,
    responses(
        (status = 200, description = "Updated", body = Content),
        (status = 403, description = "Not Owner", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn update_content(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateContentRequest>,
) -> ApiResult<Json<Content>> {
    let (_, course) = load_content(&state, id).await?;
    policy::can_modify_lesson(Some(&user), Access::Write, &course).into_result()?;
    payload.validate()?;
    Ok(Json(state.repo.update_content(id, payload).await?))
}

/// delete_content
#[utoipa::path(
    delete,
    path = "/contents/{id}",
    params(("id" = Uuid, Path, description = "Content ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not Owner", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn delete_content(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let (_, course) = load_content(&state, id).await?;
    policy::can_modify_lesson(Some(&user), Access::Write, &course).into_result()?;
    if state.repo.delete_content(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}
