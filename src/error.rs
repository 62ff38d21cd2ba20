use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::policy::DenyReason;

/// ValidationError
///
/// Rejections raised while checking an incoming payload at the API boundary.
/// These always surface as `400 Bad Request` with a stable code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("'{0}' is not a valid grade; expected one of A+, A, B+, B, C, F")]
    InvalidGrade(String),
    #[error("rating {0} is out of range; expected a value between 1 and 5")]
    RatingOutOfRange(i32),
    #[error("field '{0}' is required")]
    MissingField(&'static str),
    #[error("field '{field}' exceeds {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("field '{0}' must not be negative")]
    Negative(&'static str),
    #[error("field '{0}' is out of range")]
    OutOfRange(&'static str),
    #[error("a user cannot be both student and instructor")]
    ConflictingRoles,
    #[error("a user must register as either student or instructor")]
    MissingRole,
    #[error("invalid content payload: {0}")]
    InvalidContent(String),
    #[error("content {0} is not a quiz")]
    NotAQuiz(uuid::Uuid),
    #[error("unsupported upload type '{0}'; only images are accepted")]
    UnsupportedUpload(String),
    #[error("user {0} is not a student")]
    NotAStudent(uuid::Uuid),
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::InvalidGrade(_) => "invalid_grade",
            ValidationError::RatingOutOfRange(_) => "rating_out_of_range",
            ValidationError::MissingField(_) => "missing_field",
            ValidationError::TooLong { .. } => "too_long",
            ValidationError::Negative(_) => "negative_value",
            ValidationError::OutOfRange(_) => "out_of_range",
            ValidationError::ConflictingRoles => "conflicting_roles",
            ValidationError::MissingRole => "missing_role",
            ValidationError::InvalidContent(_) => "invalid_content",
            ValidationError::NotAQuiz(_) => "not_a_quiz",
            ValidationError::UnsupportedUpload(_) => "unsupported_upload",
            ValidationError::NotAStudent(_) => "not_a_student",
        }
    }
}

/// ApiError
///
/// The single error type returned by handlers. Every variant maps onto one HTTP status
/// and a JSON body of the form `{ "code": "...", "detail": "..." }`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Denied(DenyReason),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("resource not found")]
    NotFound,
    #[error("{0}")]
    Conflict(String),
    /// The external auth provider refused a registration.
    #[error("registration rejected: {0}")]
    Rejected(String),
    #[error("internal server error")]
    Internal,
}

/// ErrorBody
///
/// Wire representation of an `ApiError`.
#[derive(Debug, Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct ErrorBody {
    pub code: String,
    pub detail: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Denied(DenyReason::NotAuthenticated) => StatusCode::UNAUTHORIZED,
            ApiError::Denied(_) => StatusCode::FORBIDDEN,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Rejected(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Denied(reason) => reason.code(),
            ApiError::Validation(err) => err.code(),
            ApiError::NotFound => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::Rejected(_) => "registration_rejected",
            ApiError::Internal => "internal",
        }
    }
}

impl From<DenyReason> for ApiError {
    fn from(reason: DenyReason) -> Self {
        tracing::debug!(reason = reason.code(), "access denied");
        ApiError::Denied(reason)
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => ApiError::NotFound,
            RepoError::Conflict(what) => ApiError::Conflict(what),
            RepoError::Database(e) => {
                tracing::error!("repository failure: {:?}", e);
                ApiError::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: self.code().to_string(),
            detail: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// RepoError
///
/// Failures of repository write operations. Read operations return `Option`/`Vec`
/// and log their own failures instead.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("record not found")]
    NotFound,
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl RepoError {
    /// Translates a unique-constraint violation into `Conflict`, leaving other
    /// database errors untouched.
    pub fn from_sqlx(err: sqlx::Error, conflict: &str) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return RepoError::Conflict(conflict.to_string());
            }
        }
        if matches!(err, sqlx::Error::RowNotFound) {
            return RepoError::NotFound;
        }
        RepoError::Database(err)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
