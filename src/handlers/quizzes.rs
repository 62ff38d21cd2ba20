use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use super::{enrollment_in, gate_content, load_content, visible_contents};
use crate::{
    AppState,
    aggregates,
    auth::AuthUser,
    error::{ApiError, ApiResult, ErrorBody, RepoError, ValidationError},
    models::{Content, ContentKind, QuizResult, SubmitQuizRequest},
    policy::{self, DenyReason},
};

/// list_quizzes
///
/// [Authenticated Route] Every quiz the caller may open.
#[utoipa::path(
    get,
    path = "/quizzes",
    responses((status = 200, description = "Quizzes", body = [Content]))
)]
pub async fn list_quizzes(user: AuthUser, State(state): State<AppState>) -> Json<Vec<Content>> {
    let quizzes = state.repo.list_quizzes().await;
    Json(visible_contents(&state, &user, quizzes).await)
}

/// get_quiz
///
/// [Authenticated Route] Students need an active enrollment in the owning course.
#[utoipa::path(
    get,
    path = "/quizzes/{id}",
    params(("id" = Uuid, Path, description = "Quiz content ID")),
    responses(
        (status = 200, description = "Found", body = Content),
        (status = 403, description = "Not enrolled", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn get_quiz(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Content>> {
    let (content, course) = load_content(&state, id).await?;
    if content.kind() != ContentKind::Quiz {
        return Err(ApiError::NotFound);
    }
    let enrollment = enrollment_in(&state, &user, &course).await;
    Ok(Json(gate_content(&user, content, &course, enrollment.as_ref())?))
}

/// submit_quiz
///
/// [Authenticated Route] Scores the answers server-side and stores the submission.
/// A student gets exactly one submission per quiz; a concurrent duplicate that slips past
/// the check is caught by the storage constraint and reported the same way.
#[utoipa::path(
    post,
    path = "/quizzes/{id}/submit",
    params(("id" = Uuid, Path, description = "Quiz content ID")),
    request_body = SubmitQuizRequest,
    responses(
        (status = 201, description = "Scored", body = QuizResult),
        (status = 400, description = "Not a quiz", body = ErrorBody),
        (status = 403, description = "Not enrolled or already submitted", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn submit_quiz(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SubmitQuizRequest>,
) -> ApiResult<(StatusCode, Json<QuizResult>)> {
    let (content, course) = load_content(&state, id).await?;
    let quiz = content.body.as_quiz().ok_or(ValidationError::NotAQuiz(content.id))?;

    let enrollment = enrollment_in(&state, &user, &course).await;
    policy::can_access_quiz(Some(&user), enrollment.as_ref()).into_result()?;
    let existing = state.repo.find_submission(user.id, content.id).await;
    policy::can_submit_quiz_once(Some(&user), existing.as_ref()).into_result()?;

    let score = aggregates::quiz_score(quiz, &payload.answers);
    let submission = state
        .repo
        .create_submission(user.id, content.id, payload.answers, score)
        .await
        .map_err(|e| match e {
            RepoError::Conflict(_) => ApiError::from(DenyReason::AlreadySubmitted),
            other => ApiError::from(other),
        })?;

    tracing::info!(
        student_id = %user.id,
        content_id = %content.id,
        score = submission.score,
        "quiz submitted"
    );
    Ok((
        StatusCode::CREATED,
        Json(QuizResult {
            submission_id: submission.id,
            score: submission.score,
        }),
    ))
}
