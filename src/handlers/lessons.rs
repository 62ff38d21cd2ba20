use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use super::{load_course, load_lesson, visible_contents};
use crate::{
    AppState,
    auth::AuthUser,
    error::{ApiError, ApiResult, ErrorBody},
    models::{Content, ContentFilter, CreateLessonRequest, Lesson, LessonFilter, UpdateLessonRequest},
    policy::{self, Access},
};

/// list_lessons
///
/// [Authenticated Route] Filterable by `course`, searchable by title, ordered by `order`
/// unless `ordering` says otherwise.
#[utoipa::path(
    get,
    path = "/lessons",
    params(LessonFilter),
    responses((status = 200, description = "Lessons", body = [Lesson]))
)]
pub async fn list_lessons(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<LessonFilter>,
) -> Json<Vec<Lesson>> {
    Json(state.repo.list_lessons(&filter).await)
}

/// create_lesson
///
/// [Authenticated Route] Only the instructor owning the target course may add lessons.
#[utoipa::path(
    post,
    path = "/lessons",
    request_body = CreateLessonRequest,
    responses(
        (status = 201, description = "Created", body = Lesson),
        (status = 403, description = "Not Owner", body = ErrorBody),
        (status = 404, description = "Course Not Found", body = ErrorBody)
    )
)]
pub async fn create_lesson(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateLessonRequest>,
) -> ApiResult<(StatusCode, Json<Lesson>)> {
    let course = load_course(&state, payload.course_id).await?;
    policy::can_modify_lesson(Some(&user), Access::Write, &course).into_result()?;
    payload.validate()?;
    let lesson = state.repo.create_lesson(payload).await?;
    Ok((StatusCode::CREATED, Json(lesson)))
}

/// get_lesson
#[utoipa::path(
    get,
    path = "/lessons/{id}",
    params(("id" = Uuid, Path, description = "Lesson ID")),
    responses(
        (status = 200, description = "Found", body = Lesson),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn get_lesson(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Lesson>> {
    let (lesson, course) = load_lesson(&state, id).await?;
    policy::can_modify_lesson(Some(&user), Access::Read, &course).into_result()?;
    Ok(Json(lesson))
}

/// update_lesson
#[utoipa::path(
    put,
    path = "/lessons/{id}",
    params(("id" = Uuid, Path, description = "Lesson ID")),
    request_body = UpdateLessonRequest,
    responses(
        (status = 200, description = "Updated", body = Lesson),
        (status = 403, description = "Not Owner", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn update_lesson(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLessonRequest>,
) -> ApiResult<Json<Lesson>> {
    let (_, course) = load_lesson(&state, id).await?;
    policy::can_modify_lesson(Some(&user), Access::Write, &course).into_result()?;
    payload.validate()?;
    Ok(Json(state.repo.update_lesson(id, payload).await?))
}

/// delete_lesson
#[utoipa::path(
    delete,
    path = "/lessons/{id}",
    params(("id" = Uuid, Path, description = "Lesson ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not Owner", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn delete_lesson(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let (_, course) = load_lesson(&state, id).await?;
    policy::can_modify_lesson(Some(&user), Access::Write, &course).into_result()?;
    if state.repo.delete_lesson(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

/// list_lesson_contents
///
/// [Authenticated Route] Contents of one lesson. Quizzes the caller cannot open are left out.
#[utoipa::path(
    get,
    path = "/lessons/{id}/contents",
    params(("id" = Uuid, Path, description = "Lesson ID")),
    responses(
        (status = 200, description = "Contents", body = [Content]),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn list_lesson_contents(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<Content>>> {
    let (lesson, course) = load_lesson(&state, id).await?;
    policy::can_modify_lesson(Some(&user), Access::Read, &course).into_result()?;
    let filter = ContentFilter {
        lesson: Some(lesson.id),
    };
    let contents = state.repo.list_contents(&filter).await;
    Ok(Json(visible_contents(&state, &user, contents).await))
}
