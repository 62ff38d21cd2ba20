use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use super::{DisplayNames, enrollment_in, load_course, visible_contents};
use crate::{
    AppState,
    auth::AuthUser,
    error::{ApiError, ApiResult, ErrorBody},
    models::{
        Course, CourseFilter, CourseSummary, CourseTree, CreateCourseRequest, Lesson, LessonFilter, LessonWithContents,
        UpdateCourseRequest,
    },
    policy::{self, Access},
};

/// list_courses
///
/// [Public Route] The catalog. `search` covers title, description and category name.
#[utoipa::path(
    get,
    path = "/courses",
    params(CourseFilter),
    responses((status = 200, description = "Courses", body = [CourseSummary]))
)]
pub async fn list_courses(
    State(state): State<AppState>,
    Query(filter): Query<CourseFilter>,
) -> Json<Vec<CourseSummary>> {
    let courses = state.repo.list_courses(&filter).await;
    let mut names = DisplayNames::new(&state);
    let mut listed = Vec::with_capacity(courses.len());
    for course in courses {
        listed.push(names.course_summary(course).await);
    }
    Json(listed)
}

/// create_course
///
/// [Authenticated Route] Instructors only. The caller becomes the owning instructor.
#[utoipa::path(
    post,
    path = "/courses",
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Created", body = Course),
        (status = 400, description = "Invalid payload", body = ErrorBody),
        (status = 403, description = "Not an instructor", body = ErrorBody)
    )
)]
pub async fn create_course(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateCourseRequest>,
) -> ApiResult<(StatusCode, Json<Course>)> {
    policy::can_create_course(Some(&user)).into_result()?;
    payload.validate()?;
    state
        .repo
        .get_category(payload.category_id)
        .await
        .ok_or(ApiError::NotFound)?;

    let course = state.repo.create_course(payload, user.id).await?;
    tracing::info!(course_id = %course.id, instructor_id = %user.id, "course created");
    Ok((StatusCode::CREATED, Json(course)))
}

/// get_course
///
/// [Authenticated Route]
#[utoipa::path(
    get,
    path = "/courses/{id}",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Found", body = CourseSummary),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn get_course(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<CourseSummary>> {
    let course = load_course(&state, id).await?;
    policy::can_modify_course(Some(&user), Access::Read, &course).into_result()?;
    Ok(Json(DisplayNames::new(&state).course_summary(course).await))
}

/// update_course
///
/// [Authenticated Route] Owning instructor only.
#[utoipa::path(
    put,
    path = "/courses/{id}",
    params(("id" = Uuid, Path, description = "Course ID")),
    request_body = UpdateCourseRequest,
    responses(
        (status = 200, description = "Updated", body = Course),
        (status = 403, description = "Not Owner", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn update_course(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCourseRequest>,
) -> ApiResult<Json<Course>> {
    let course = load_course(&state, id).await?;
    policy::can_modify_course(Some(&user), Access::Write, &course).into_result()?;
    payload.validate()?;
    if let Some(category_id) = payload.category_id {
        state.repo.get_category(category_id).await.ok_or(ApiError::NotFound)?;
    }
    Ok(Json(state.repo.update_course(id, payload).await?))
}

/// delete_course
///
/// [Authenticated Route] Owning instructor only. Lessons, contents, enrollments and
/// reviews of the course are removed with it.
#[utoipa::path(
    delete,
    path = "/courses/{id}",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not Owner", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn delete_course(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let course = load_course(&state, id).await?;
    policy::can_modify_course(Some(&user), Access::Write, &course).into_result()?;
    if state.repo.delete_course(id).await {
        tracing::info!(course_id = %id, "course deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

/// list_course_lessons
///
/// [Authenticated Route] Lessons of one course, by `order`.
#[utoipa::path(
    get,
    path = "/courses/{id}/lessons",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Lessons", body = [Lesson]),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn list_course_lessons(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<Lesson>>> {
    let course = load_course(&state, id).await?;
    policy::can_modify_lesson(Some(&user), Access::Read, &course).into_result()?;
    let filter = LessonFilter {
        course: Some(course.id),
        ..LessonFilter::default()
    };
    Ok(Json(state.repo.list_lessons(&filter).await))
}

/// get_course_data
///
/// [Authenticated Route] The whole course tree. Unlike the plain course read, this needs a
/// relationship with the course: ownership, staff, or an active enrollment.
#[utoipa::path(
    get,
    path = "/course-data/{id}",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course with lessons and contents", body = CourseTree),
        (status = 403, description = "Not enrolled", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn get_course_data(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<CourseTree>> {
    let course = load_course(&state, id).await?;
    let enrollment = enrollment_in(&state, &user, &course).await;
    policy::can_view_course_data(Some(&user), &course, enrollment.as_ref()).into_result()?;

    let filter = LessonFilter {
        course: Some(course.id),
        ..LessonFilter::default()
    };
    let lessons = state.repo.list_lessons(&filter).await;
    let contents = visible_contents(&state, &user, state.repo.list_course_contents(course.id).await).await;

    let lessons = lessons
        .into_iter()
        .map(|lesson| {
            let contents = contents
                .iter()
                .filter(|c| c.lesson_id == lesson.id)
                .cloned()
                .collect();
            LessonWithContents { lesson, contents }
        })
        .collect();

    Ok(Json(CourseTree { course, lessons }))
}
