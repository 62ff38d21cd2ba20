use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use super::{DisplayNames, load_course};
use crate::{
    AppState,
    auth::AuthUser,
    error::{ApiError, ApiResult, ErrorBody, ValidationError},
    models::{
        AssignGradeRequest, Course, CreateEnrollmentRequest, Enrollment, EnrollmentDetail, EnrollmentFilter, Role,
        UpdateEnrollmentRequest,
    },
    policy::{self, Access, DenyReason},
    repository::EnrollmentScope,
};

async fn load_enrollment(state: &AppState, id: Uuid) -> ApiResult<(Enrollment, Course)> {
    let enrollment = state.repo.get_enrollment(id).await.ok_or(ApiError::NotFound)?;
    let course = load_course(state, enrollment.course_id).await?;
    Ok((enrollment, course))
}

/// list_enrollments
///
/// [Authenticated Route] Scoped to the caller: students see their own enrollments,
/// instructors those of the courses they own, staff everything.
#[utoipa::path(
    get,
    path = "/enrollments",
    params(EnrollmentFilter),
    responses((status = 200, description = "Enrollments", body = [EnrollmentDetail]))
)]
pub async fn list_enrollments(
    user: AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<EnrollmentFilter>,
) -> Json<Vec<EnrollmentDetail>> {
    let scope = match user.role {
        _ if user.is_staff => EnrollmentScope::All,
        Role::Student => EnrollmentScope::Student(user.id),
        Role::Instructor => EnrollmentScope::Instructor(user.id),
    };
    let enrollments = state.repo.list_enrollments(&filter, scope).await;
    let mut names = DisplayNames::new(&state);
    let mut listed = Vec::with_capacity(enrollments.len());
    for enrollment in enrollments {
        listed.push(names.enrollment_detail(enrollment).await);
    }
    Json(listed)
}

/// create_enrollment
///
/// [Authenticated Route] A student enrolls themself; an instructor enrolls a named student
/// into a course they own. Nobody else may create enrollments.
#[utoipa::path(
    post,
    path = "/enrollments",
    request_body = CreateEnrollmentRequest,
    responses(
        (status = 201, description = "Enrolled", body = Enrollment),
        (status = 403, description = "Not permitted", body = ErrorBody),
        (status = 404, description = "Course or student not found", body = ErrorBody),
        (status = 409, description = "Already enrolled", body = ErrorBody)
    )
)]
pub async fn create_enrollment(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateEnrollmentRequest>,
) -> ApiResult<(StatusCode, Json<Enrollment>)> {
    let course = load_course(&state, payload.course_id).await?;

    let student_id = match user.role {
        Role::Student => {
            policy::can_self_enroll(Some(&user)).into_result()?;
            match payload.student_id {
                Some(other) if other != user.id => return Err(DenyReason::NotOwner.into()),
                _ => user.id,
            }
        }
        Role::Instructor => {
            policy::can_manage_enrollment(Some(&user), Access::Write, &course).into_result()?;
            let student_id = payload
                .student_id
                .ok_or(ValidationError::MissingField("student_id"))?;
            let student = state.repo.get_user(student_id).await.ok_or(ApiError::NotFound)?;
            if student.role != Role::Student {
                return Err(ValidationError::NotAStudent(student.id).into());
            }
            student.id
        }
    };

    let enrollment = state.repo.create_enrollment(student_id, course.id).await?;
    tracing::info!(
        enrollment_id = %enrollment.id,
        student_id = %student_id,
        course_id = %course.id,
        enrolled_by = %user.id,
        "student enrolled"
    );
    Ok((StatusCode::CREATED, Json(enrollment)))
}

/// get_enrollment
///
/// [Authenticated Route] The enrolled student, the owning instructor or staff.
#[utoipa::path(
    get,
    path = "/enrollments/{id}",
    params(("id" = Uuid, Path, description = "Enrollment ID")),
    responses(
        (status = 200, description = "Found", body = EnrollmentDetail),
        (status = 403, description = "Not permitted", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn get_enrollment(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<EnrollmentDetail>> {
    let (enrollment, course) = load_enrollment(&state, id).await?;
    policy::can_view_enrollment(Some(&user), &enrollment, &course).into_result()?;
    Ok(Json(DisplayNames::new(&state).enrollment_detail(enrollment).await))
}

/// update_enrollment
///
/// [Authenticated Route] Owning instructor only: toggles `is_active` / `completed`.
#[utoipa::path(
    patch,
    path = "/enrollments/{id}",
    params(("id" = Uuid, Path, description = "Enrollment ID")),
    request_body = UpdateEnrollmentRequest,
    responses(
        (status = 200, description = "Updated", body = Enrollment),
        (status = 403, description = "Not the owning instructor", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn update_enrollment(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEnrollmentRequest>,
) -> ApiResult<Json<Enrollment>> {
    let (_, course) = load_enrollment(&state, id).await?;
    policy::can_manage_enrollment(Some(&user), Access::Write, &course).into_result()?;
    let enrollment = state.repo.update_enrollment(id, payload).await?;
    tracing::info!(
        enrollment_id = %id,
        is_active = enrollment.is_active,
        completed = enrollment.completed,
        "enrollment updated"
    );
    Ok(Json(enrollment))
}

/// assign_grade
///
/// [Authenticated Route] Owning instructor only. Grades outside A+, A, B+, B, C, F are
/// rejected with `invalid_grade`.
#[utoipa::path(
    put,
    path = "/enrollments/{id}/grade",
    params(("id" = Uuid, Path, description = "Enrollment ID")),
    request_body = AssignGradeRequest,
    responses(
        (status = 200, description = "Graded", body = Enrollment),
        (status = 400, description = "Invalid grade", body = ErrorBody),
        (status = 403, description = "Not the owning instructor", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn assign_grade(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignGradeRequest>,
) -> ApiResult<Json<Enrollment>> {
    let (_, course) = load_enrollment(&state, id).await?;
    policy::can_assign_grade(Some(&user), &course).into_result()?;
    let grade = payload.validate()?;

    let enrollment = state.repo.set_grade(id, grade).await?;
    tracing::info!(enrollment_id = %id, grade = grade.as_str(), graded_by = %user.id, "grade assigned");
    Ok(Json(enrollment))
}

/// delete_enrollment
#[utoipa::path(
    delete,
    path = "/enrollments/{id}",
    params(("id" = Uuid, Path, description = "Enrollment ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not the owning instructor", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn delete_enrollment(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let (_, course) = load_enrollment(&state, id).await?;
    policy::can_manage_enrollment(Some(&user), Access::Write, &course).into_result()?;
    if state.repo.delete_enrollment(id).await {
        tracing::info!(enrollment_id = %id, "enrollment removed");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}
