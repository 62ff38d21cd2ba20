use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::{collections::HashMap, fmt, str::FromStr};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ValidationError;

// --- Enumerations (mirrored as Postgres enum types) ---

/// Role
///
/// The exclusive role of a user. A profile is either a student or an instructor, never both
/// and never neither. Staff privileges are tracked separately via `User::is_staff`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    Student,
    Instructor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Instructor => "instructor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ContentKind
///
/// Discriminant of a `ContentBody`, stored in the `contents.kind` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "content_kind", rename_all = "lowercase")]
#[ts(export)]
pub enum ContentKind {
    Video,
    Text,
    Quiz,
}

/// LetterGrade
///
/// The fixed set of grades an instructor may assign to an enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, sqlx::Type)]
#[sqlx(type_name = "letter_grade")]
#[ts(export)]
pub enum LetterGrade {
    #[serde(rename = "A+")]
    #[sqlx(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    #[sqlx(rename = "A")]
    A,
    #[serde(rename = "B+")]
    #[sqlx(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    #[sqlx(rename = "B")]
    B,
    #[serde(rename = "C")]
    #[sqlx(rename = "C")]
    C,
    #[serde(rename = "F")]
    #[sqlx(rename = "F")]
    F,
}

impl LetterGrade {
    pub fn as_str(&self) -> &'static str {
        match self {
            LetterGrade::APlus => "A+",
            LetterGrade::A => "A",
            LetterGrade::BPlus => "B+",
            LetterGrade::B => "B",
            LetterGrade::C => "C",
            LetterGrade::F => "F",
        }
    }
}

impl FromStr for LetterGrade {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A+" => Ok(LetterGrade::APlus),
            "A" => Ok(LetterGrade::A),
            "B+" => Ok(LetterGrade::BPlus),
            "B" => Ok(LetterGrade::B),
            "C" => Ok(LetterGrade::C),
            "F" => Ok(LetterGrade::F),
            other => Err(ValidationError::InvalidGrade(other.to_string())),
        }
    }
}

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// A profile record from the `profiles` table. The id mirrors the external auth provider's user id.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub bio: String,
    /// Storage key of the uploaded avatar, if any.
    pub profile_image: Option<String>,
    pub role: Role,
    pub is_staff: bool,
}

/// Category
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

/// Course
///
/// A course owned by exactly one instructor. `average_rating` is derived from the course's
/// reviews and is rewritten every time a review is created, updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[ts(type = "string")]
    pub price: Decimal,
    pub category_id: Uuid,
    pub instructor_id: Uuid,
    pub thumbnail: Option<String>,
    pub average_rating: f64,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Lesson
///
/// Lessons are always listed by `order` within their course.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct Lesson {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub order: i32,
}

/// VideoPayload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct VideoPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<i32>,
}

/// TextPayload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct TextPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub body: String,
}

/// QuizQuestion
///
/// One question of a quiz. The `answer` is omitted from responses once redacted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct QuizQuestion {
    pub prompt: String,
    #[serde(default)]
    pub choices: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub answer: String,
}

/// QuizPayload
///
/// Ordered list of questions. Submissions answer by question index (`"0"`, `"1"`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct QuizPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub questions: Vec<QuizQuestion>,
}

/// ContentBody
///
/// The typed payload of a content item. Serialized as `{ "type": "quiz", "data": { ... } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
#[ts(export)]
pub enum ContentBody {
    Video(VideoPayload),
    Text(TextPayload),
    Quiz(QuizPayload),
}

impl ContentBody {
    pub fn kind(&self) -> ContentKind {
        match self {
            ContentBody::Video(_) => ContentKind::Video,
            ContentBody::Text(_) => ContentKind::Text,
            ContentBody::Quiz(_) => ContentKind::Quiz,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            ContentBody::Video(v) => v.title.as_deref(),
            ContentBody::Text(t) => t.title.as_deref(),
            ContentBody::Quiz(q) => q.title.as_deref(),
        }
    }

    pub fn as_quiz(&self) -> Option<&QuizPayload> {
        match self {
            ContentBody::Quiz(quiz) => Some(quiz),
            _ => None,
        }
    }

    /// Rebuilds a body from the stored `(kind, data)` column pair.
    pub fn from_parts(kind: ContentKind, data: serde_json::Value) -> Result<Self, ValidationError> {
        let invalid = |e: serde_json::Error| ValidationError::InvalidContent(e.to_string());
        let body = match kind {
            ContentKind::Video => ContentBody::Video(serde_json::from_value(data).map_err(invalid)?),
            ContentKind::Text => ContentBody::Text(serde_json::from_value(data).map_err(invalid)?),
            ContentKind::Quiz => ContentBody::Quiz(serde_json::from_value(data).map_err(invalid)?),
        };
        Ok(body)
    }

    /// The `data` half of the stored column pair.
    pub fn data(&self) -> serde_json::Value {
        let value = match self {
            ContentBody::Video(v) => serde_json::to_value(v),
            ContentBody::Text(t) => serde_json::to_value(t),
            ContentBody::Quiz(q) => serde_json::to_value(q),
        };
        value.unwrap_or(serde_json::Value::Null)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            ContentBody::Video(v) => {
                require_text("url", &v.url, 2048)?;
                if v.duration_seconds.is_some_and(|d| d < 0) {
                    return Err(ValidationError::Negative("duration_seconds"));
                }
            }
            ContentBody::Text(t) => require_text("body", &t.body, usize::MAX)?,
            ContentBody::Quiz(q) => {
                for (index, question) in q.questions.iter().enumerate() {
                    if question.prompt.trim().is_empty() {
                        return Err(ValidationError::InvalidContent(format!(
                            "question {index} has no prompt"
                        )));
                    }
                    if question.answer.trim().is_empty() {
                        return Err(ValidationError::InvalidContent(format!(
                            "question {index} has no answer"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Strips stored answers so a quiz can be shown to students.
    pub fn redacted(&self) -> Self {
        match self {
            ContentBody::Quiz(quiz) => ContentBody::Quiz(QuizPayload {
                title: quiz.title.clone(),
                questions: quiz
                    .questions
                    .iter()
                    .map(|q| QuizQuestion {
                        answer: String::new(),
                        ..q.clone()
                    })
                    .collect(),
            }),
            other => other.clone(),
        }
    }
}

/// Content
///
/// An atomic unit inside a lesson.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Content {
    pub id: Uuid,
    pub lesson_id: Uuid,
    pub order: i32,
    pub body: ContentBody,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

impl Content {
    pub fn kind(&self) -> ContentKind {
        self.body.kind()
    }

    pub fn redacted(mut self) -> Self {
        self.body = self.body.redacted();
        self
    }
}

/// Enrollment
///
/// Unique per `(student_id, course_id)`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct Enrollment {
    pub id: Uuid,
    pub student_id: Uuid,
    pub course_id: Uuid,
    #[ts(type = "string")]
    pub enrolled_at: DateTime<Utc>,
    pub is_active: bool,
    pub completed: bool,
    pub grade: Option<LetterGrade>,
}

/// Review
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct Review {
    pub id: Uuid,
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub rating: i32,
    pub comment: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// QuizSubmission
///
/// A student's scored answers for a quiz. `answers` maps question index to the chosen answer.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct QuizSubmission {
    pub id: Uuid,
    pub student_id: Uuid,
    pub content_id: Uuid,
    pub answers: HashMap<String, String>,
    pub score: f64,
    #[ts(type = "string")]
    pub submitted_at: DateTime<Utc>,
}

/// ContentProgress
///
/// Completion marker; at most one per `(student_id, content_id)`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct ContentProgress {
    pub id: Uuid,
    pub student_id: Uuid,
    pub content_id: Uuid,
    #[ts(type = "string")]
    pub completed_at: DateTime<Utc>,
}

// --- Validation helpers ---

fn require_text(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

fn optional_text(field: &'static str, value: Option<&String>, max: usize) -> Result<(), ValidationError> {
    match value {
        Some(v) => require_text(field, v, max),
        None => Ok(()),
    }
}

pub fn validate_rating(rating: i32) -> Result<(), ValidationError> {
    if (1..=5).contains(&rating) {
        Ok(())
    } else {
        Err(ValidationError::RatingOutOfRange(rating))
    }
}

/// Prices are stored as `NUMERIC(8, 2)`: at most six integer digits and two decimals.
fn validate_price(price: Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() {
        return Err(ValidationError::Negative("price"));
    }
    if price.normalize().scale() > 2 || price >= Decimal::new(1_000_000, 0) {
        return Err(ValidationError::OutOfRange("price"));
    }
    Ok(())
}

fn validate_order(order: i32) -> Result<(), ValidationError> {
    if order < 0 {
        return Err(ValidationError::Negative("order"));
    }
    Ok(())
}

// --- Request Payloads (Input Schemas) ---

/// RegisterUserRequest
///
/// Input payload for `POST /register`. The password is forwarded to the auth provider and never
/// stored here. Exactly one of `is_student` / `is_instructor` must be set.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RegisterUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub is_student: bool,
    #[serde(default)]
    pub is_instructor: bool,
}

impl RegisterUserRequest {
    /// Validates the payload and resolves the single role it asks for.
    pub fn validate(&self) -> Result<Role, ValidationError> {
        require_text("username", &self.username, 150)?;
        require_text("email", &self.email, 254)?;
        require_text("password", &self.password, 128)?;
        match (self.is_student, self.is_instructor) {
            (true, true) => Err(ValidationError::ConflictingRoles),
            (true, false) => Ok(Role::Student),
            (false, true) => Ok(Role::Instructor),
            (false, false) => Err(ValidationError::MissingRole),
        }
    }
}

/// UpdateProfileRequest
///
/// Input payload for `PATCH /me`. `profile_image_key` is the `resource_key` returned by
/// `POST /upload/presigned`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateProfileRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_key: Option<String>,
}

impl UpdateProfileRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        // An empty bio clears it.
        if self.bio.as_ref().is_some_and(|bio| bio.chars().count() > 50) {
            return Err(ValidationError::TooLong { field: "bio", max: 50 });
        }
        optional_text("profile_image_key", self.profile_image_key.as_ref(), 512)
    }
}

/// CreateCategoryRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl CreateCategoryRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name, 100)
    }
}

/// UpdateCategoryRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateCategoryRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl UpdateCategoryRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        optional_text("name", self.name.as_ref(), 100)
    }
}

/// CreateCourseRequest
///
/// The instructor is always the authenticated caller; it is never taken from the payload.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CreateCourseRequest {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "string | null")]
    pub price: Option<Decimal>,
    pub category_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_key: Option<String>,
}

impl CreateCourseRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title, 150)?;
        require_text("description", &self.description, usize::MAX)?;
        self.price.map_or(Ok(()), validate_price)
    }
}

/// UpdateCourseRequest
///
/// Partial update; only provided fields are written.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateCourseRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(type = "string | null")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_key: Option<String>,
}

impl UpdateCourseRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        optional_text("title", self.title.as_ref(), 150)?;
        optional_text("description", self.description.as_ref(), usize::MAX)?;
        self.price.map_or(Ok(()), validate_price)
    }
}

/// CreateLessonRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CreateLessonRequest {
    pub course_id: Uuid,
    pub title: String,
    pub order: i32,
}

impl CreateLessonRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title, 150)?;
        validate_order(self.order)
    }
}

/// UpdateLessonRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateLessonRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

impl UpdateLessonRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        optional_text("title", self.title.as_ref(), 150)?;
        self.order.map_or(Ok(()), validate_order)
    }
}

/// CreateContentRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CreateContentRequest {
    pub lesson_id: Uuid,
    pub order: i32,
    pub body: ContentBody,
}

impl CreateContentRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_order(self.order)?;
        self.body.validate()
    }
}

/// UpdateContentRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<ContentBody>,
}

impl UpdateContentRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.order.map_or(Ok(()), validate_order)?;
        self.body.as_ref().map_or(Ok(()), ContentBody::validate)
    }
}

/// CreateEnrollmentRequest
///
/// Students enroll themselves and leave `student_id` empty; instructors name the student.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CreateEnrollmentRequest {
    pub course_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<Uuid>,
}

/// UpdateEnrollmentRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateEnrollmentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// AssignGradeRequest
///
/// The grade is accepted as free text and parsed into a `LetterGrade`, so an unknown grade
/// surfaces as a validation error rather than a deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AssignGradeRequest {
    pub grade: String,
}

impl AssignGradeRequest {
    pub fn validate(&self) -> Result<LetterGrade, ValidationError> {
        self.grade.parse()
    }
}

/// CreateReviewRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CreateReviewRequest {
    pub course_id: Uuid,
    pub rating: i32,
    pub comment: String,
}

impl CreateReviewRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_rating(self.rating)?;
        require_text("comment", &self.comment, 250)
    }
}

/// UpdateReviewRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateReviewRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl UpdateReviewRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.rating.map_or(Ok(()), validate_rating)?;
        optional_text("comment", self.comment.as_ref(), 250)
    }
}

/// SubmitQuizRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SubmitQuizRequest {
    pub answers: HashMap<String, String>,
}

/// PresignedUrlRequest
///
/// Input payload for requesting a short-lived upload URL for a course thumbnail or avatar.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, TS, Default)]
#[ts(export)]
pub struct PresignedUrlRequest {
    /// The original filename, used to derive the file extension.
    #[schema(example = "cover.png")]
    pub filename: String,
    /// The MIME type; only `image/*` is accepted.
    #[schema(example = "image/png")]
    pub file_type: String,
}

impl PresignedUrlRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("filename", &self.filename, 255)?;
        if !self.file_type.starts_with("image/") {
            return Err(ValidationError::UnsupportedUpload(self.file_type.clone()));
        }
        Ok(())
    }
}

/// PresignedUrlResponse
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS, Default)]
#[ts(export)]
pub struct PresignedUrlResponse {
    /// The time-limited URL for the PUT request.
    pub upload_url: String,
    /// The object key to reference the file by (e.g. as `thumbnail_key`).
    pub resource_key: String,
}

// --- Query Filters ---

/// CourseFilter
///
/// `ordering` accepts `title`, `created_at` or `price`, optionally prefixed with `-`.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
pub struct CourseFilter {
    pub search: Option<String>,
    pub category: Option<Uuid>,
    pub ordering: Option<String>,
}

/// LessonFilter
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
pub struct LessonFilter {
    pub course: Option<Uuid>,
    pub search: Option<String>,
    pub ordering: Option<String>,
}

/// ContentFilter
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
pub struct ContentFilter {
    pub lesson: Option<Uuid>,
}

/// EnrollmentFilter
///
/// `search` matches the student's username or the course title.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
pub struct EnrollmentFilter {
    pub course: Option<Uuid>,
    pub search: Option<String>,
    pub ordering: Option<String>,
}

/// ReviewFilter
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
pub struct ReviewFilter {
    pub course: Option<Uuid>,
}

// --- Dashboard, Progress & Profile Schemas (Output) ---

/// UserProfile
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub bio: String,
    pub profile_image: Option<String>,
    pub role: Role,
    pub is_staff: bool,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            bio: user.bio,
            profile_image: user.profile_image,
            role: user.role,
            is_staff: user.is_staff,
        }
    }
}

/// AdminDashboardStats
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AdminDashboardStats {
    pub total_users: i64,
    pub total_courses: i64,
    pub total_enrollments: i64,
    pub total_reviews: i64,
}

/// CourseProgress
///
/// The requesting student's completion of a course's contents.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CourseProgress {
    pub course_id: Uuid,
    pub total_contents: i64,
    pub completed_contents: i64,
    pub percentage: f64,
}

/// CourseAnalytics
///
/// Instructor-facing summary of a course. `completion_rate` is the fraction (0..=1) of active
/// students who completed every content item.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CourseAnalytics {
    pub course_id: Uuid,
    pub total_enrollments: i64,
    pub active_enrollments: i64,
    pub total_contents: i64,
    pub completion_rate: f64,
    pub average_rating: f64,
}

/// QuizResult
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct QuizResult {
    pub submission_id: Uuid,
    pub score: f64,
}

/// LessonWithContents
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LessonWithContents {
    #[serde(flatten)]
    pub lesson: Lesson,
    pub contents: Vec<Content>,
}

/// CourseTree
///
/// Course → lessons → contents, as served by `GET /course-data/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CourseTree {
    #[serde(flatten)]
    pub course: Course,
    pub lessons: Vec<LessonWithContents>,
}

// --- Read Models (ids joined with display names) ---

/// CourseSummary
///
/// A course as listed in the catalog, with its instructor's username and category name.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CourseSummary {
    #[serde(flatten)]
    pub course: Course,
    pub instructor_name: String,
    pub category_name: String,
}

/// ReviewDetail
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ReviewDetail {
    #[serde(flatten)]
    pub review: Review,
    pub student_name: String,
    pub course_name: String,
    pub course_average_rating: f64,
}

/// EnrollmentDetail
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct EnrollmentDetail {
    #[serde(flatten)]
    pub enrollment: Enrollment,
    pub student_name: String,
    pub course_name: String,
}

/// ContentDetail
///
/// A content item with the titles of the lesson and course it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ContentDetail {
    #[serde(flatten)]
    pub content: Content,
    pub lesson_name: String,
    pub course_name: String,
}
