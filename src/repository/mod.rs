use async_trait::async_trait;
use std::{collections::HashMap, sync::Arc};
use uuid::Uuid;

use crate::{
    error::RepoError,
    models::{
        AdminDashboardStats, Category, Content, ContentFilter, ContentProgress, Course, CourseFilter,
        CreateCategoryRequest, CreateContentRequest, CreateCourseRequest, CreateLessonRequest,
        CreateReviewRequest, Enrollment, EnrollmentFilter, LetterGrade, Lesson, LessonFilter,
        QuizSubmission, Review, ReviewFilter, UpdateCategoryRequest, UpdateContentRequest,
        UpdateCourseRequest, UpdateEnrollmentRequest, UpdateLessonRequest, UpdateProfileRequest,
        UpdateReviewRequest, User,
    },
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PostgresRepository;

/// EnrollmentScope
///
/// Which enrollment rows a listing may return: everything (staff), the rows of one
/// student, or the rows of the courses one instructor owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollmentScope {
    All,
    Student(Uuid),
    Instructor(Uuid),
}

/// Repository Trait
///
/// Abstract contract for all persistence. Handlers only talk to `Arc<dyn Repository>`,
/// backed by `PostgresRepository` in production and `MemoryRepository` in tests.
///
/// Reads return `Option`/`Vec` and log their own failures; writes return
/// `Result<_, RepoError>` so unique-constraint conflicts reach the caller.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn get_user(&self, id: Uuid) -> Option<User>;
    async fn get_user_by_username(&self, username: &str) -> Option<User>;
    /// Every profile, ordered by username.
    async fn list_users(&self) -> Vec<User>;
    async fn create_user(&self, user: User) -> Result<User, RepoError>;
    async fn update_user(&self, id: Uuid, req: UpdateProfileRequest) -> Result<User, RepoError>;
    /// Removes the profile with everything it owns. Courses that lose reviews get their
    /// average rating recomputed.
    async fn delete_user(&self, id: Uuid) -> bool;
    async fn get_stats(&self) -> AdminDashboardStats;

    // --- Categories ---
    async fn list_categories(&self) -> Vec<Category>;
    async fn get_category(&self, id: Uuid) -> Option<Category>;
    async fn create_category(&self, req: CreateCategoryRequest) -> Result<Category, RepoError>;
    async fn update_category(&self, id: Uuid, req: UpdateCategoryRequest) -> Result<Category, RepoError>;
    async fn delete_category(&self, id: Uuid) -> bool;

    // --- Courses ---
    async fn list_courses(&self, filter: &CourseFilter) -> Vec<Course>;
    async fn get_course(&self, id: Uuid) -> Option<Course>;
    async fn create_course(&self, req: CreateCourseRequest, instructor_id: Uuid) -> Result<Course, RepoError>;
    async fn update_course(&self, id: Uuid, req: UpdateCourseRequest) -> Result<Course, RepoError>;
    async fn delete_course(&self, id: Uuid) -> bool;
    /// Rewrites `courses.average_rating` from the course's current reviews.
    async fn recompute_average_rating(&self, course_id: Uuid) -> Result<f64, RepoError>;

    // --- Lessons ---
    async fn list_lessons(&self, filter: &LessonFilter) -> Vec<Lesson>;
    async fn get_lesson(&self, id: Uuid) -> Option<Lesson>;
    async fn create_lesson(&self, req: CreateLessonRequest) -> Result<Lesson, RepoError>;
    async fn update_lesson(&self, id: Uuid, req: UpdateLessonRequest) -> Result<Lesson, RepoError>;
    async fn delete_lesson(&self, id: Uuid) -> bool;

    // --- Contents ---
    async fn list_contents(&self, filter: &ContentFilter) -> Vec<Content>;
    /// Every content of a course, ordered by lesson order then content order.
    async fn list_course_contents(&self, course_id: Uuid) -> Vec<Content>;
    async fn list_quizzes(&self) -> Vec<Content>;
    async fn get_content(&self, id: Uuid) -> Option<Content>;
    async fn create_content(&self, req: CreateContentRequest) -> Result<Content, RepoError>;
    async fn update_content(&self, id: Uuid, req: UpdateContentRequest) -> Result<Content, RepoError>;
    async fn delete_content(&self, id: Uuid) -> bool;

    // --- Enrollments ---
    async fn list_enrollments(&self, filter: &EnrollmentFilter, scope: EnrollmentScope) -> Vec<Enrollment>;
    async fn get_enrollment(&self, id: Uuid) -> Option<Enrollment>;
    async fn find_enrollment(&self, student_id: Uuid, course_id: Uuid) -> Option<Enrollment>;
    /// Fails with `Conflict` when the student is already enrolled.
    async fn create_enrollment(&self, student_id: Uuid, course_id: Uuid) -> Result<Enrollment, RepoError>;
    async fn update_enrollment(&self, id: Uuid, req: UpdateEnrollmentRequest) -> Result<Enrollment, RepoError>;
    async fn set_grade(&self, id: Uuid, grade: LetterGrade) -> Result<Enrollment, RepoError>;
    async fn delete_enrollment(&self, id: Uuid) -> bool;

    // --- Reviews ---
    async fn list_reviews(&self, filter: &ReviewFilter) -> Vec<Review>;
    async fn get_review(&self, id: Uuid) -> Option<Review>;
    async fn create_review(&self, student_id: Uuid, req: CreateReviewRequest) -> Result<Review, RepoError>;
    async fn update_review(&self, id: Uuid, req: UpdateReviewRequest) -> Result<Review, RepoError>;
    async fn delete_review(&self, id: Uuid) -> bool;

    // --- Progress ---
    /// Idempotent: completing the same content twice returns the original record.
    async fn mark_content_complete(&self, student_id: Uuid, content_id: Uuid) -> Result<ContentProgress, RepoError>;
    async fn count_course_contents(&self, course_id: Uuid) -> i64;
    async fn count_completed_contents(&self, student_id: Uuid, course_id: Uuid) -> i64;
    /// Completed-content count per actively enrolled student of the course.
    async fn completion_counts(&self, course_id: Uuid) -> Vec<i64>;

    // --- Quiz submissions ---
    async fn find_submission(&self, student_id: Uuid, content_id: Uuid) -> Option<QuizSubmission>;
    /// Fails with `Conflict` when a submission already exists for the pair.
    async fn create_submission(
        &self,
        student_id: Uuid,
        content_id: Uuid,
        answers: HashMap<String, String>,
        score: f64,
    ) -> Result<QuizSubmission, RepoError>;
}

/// RepositoryState
pub type RepositoryState = Arc<dyn Repository>;

/// Ordering
///
/// A validated `ordering` query parameter: one of the allowed keys, with `-` meaning descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ordering {
    pub key: &'static str,
    pub descending: bool,
}

impl Ordering {
    /// Unknown keys are ignored rather than rejected.
    pub fn parse(raw: Option<&str>, allowed: &[&'static str]) -> Option<Self> {
        let raw = raw?.trim();
        let (descending, name) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        allowed
            .iter()
            .find(|key| **key == name)
            .map(|key| Ordering { key: *key, descending })
    }
}

pub const COURSE_ORDERINGS: &[&str] = &["title", "created_at", "price"];
pub const LESSON_ORDERINGS: &[&str] = &["order", "title"];
pub const ENROLLMENT_ORDERINGS: &[&str] = &["enrolled_at"];
