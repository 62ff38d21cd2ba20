use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, query_builder::QueryBuilder, types::Json};
use std::collections::HashMap;
use uuid::Uuid;

use super::{
    COURSE_ORDERINGS, ENROLLMENT_ORDERINGS, EnrollmentScope, LESSON_ORDERINGS, Ordering, Repository,
};
use crate::{
    error::RepoError,
    models::{
        AdminDashboardStats, Category, Content, ContentBody, ContentFilter, ContentKind, ContentProgress,
        Course, CourseFilter, CreateCategoryRequest, CreateContentRequest, CreateCourseRequest,
        CreateLessonRequest, CreateReviewRequest, Enrollment, EnrollmentFilter, LetterGrade, Lesson,
        LessonFilter, QuizSubmission, Review, ReviewFilter, UpdateCategoryRequest, UpdateContentRequest,
        UpdateCourseRequest, UpdateEnrollmentRequest, UpdateLessonRequest, UpdateProfileRequest,
        UpdateReviewRequest, User,
    },
};

const USER_COLUMNS: &str = "id, username, email, bio, profile_image, role, is_staff";
const COURSE_COLUMNS: &str = "c.id, c.title, c.description, c.price, c.category_id, c.instructor_id, \
     c.thumbnail, c.average_rating, c.created_at, c.updated_at";
const LESSON_COLUMNS: &str = r#"id, course_id, title, "order""#;
const CONTENT_COLUMNS: &str = r#"ct.id, ct.lesson_id, ct.kind, ct."order", ct.data, ct.created_at"#;
const ENROLLMENT_COLUMNS: &str = "e.id, e.student_id, e.course_id, e.enrolled_at, e.is_active, e.completed, e.grade";
const REVIEW_COLUMNS: &str = "id, student_id, course_id, rating, comment, created_at";
const SUBMISSION_COLUMNS: &str = "id, student_id, content_id, answers, score, submitted_at";
const PROGRESS_COLUMNS: &str = "id, student_id, content_id, completed_at";

/// Mean review rating of the `courses` row being updated, rounded half away from zero to one
/// decimal; 0 without reviews.
const AVERAGE_RATING: &str = "COALESCE((SELECT ROUND(AVG(r.rating)::numeric, 1)::float8 \
     FROM reviews r WHERE r.course_id = courses.id), 0)";

/// Raw `contents` row. The JSON `data` column is only trusted after it parses into the
/// `ContentBody` variant named by `kind`.
#[derive(FromRow)]
struct ContentRow {
    id: Uuid,
    lesson_id: Uuid,
    kind: ContentKind,
    order: i32,
    data: Json<serde_json::Value>,
    created_at: DateTime<Utc>,
}

impl ContentRow {
    fn into_content(self) -> Option<Content> {
        match ContentBody::from_parts(self.kind, self.data.0) {
            Ok(body) => Some(Content {
                id: self.id,
                lesson_id: self.lesson_id,
                order: self.order,
                body,
                created_at: self.created_at,
            }),
            Err(e) => {
                tracing::error!(content_id = %self.id, "stored content payload is malformed: {}", e);
                None
            }
        }
    }
}

#[derive(FromRow)]
struct SubmissionRow {
    id: Uuid,
    student_id: Uuid,
    content_id: Uuid,
    answers: Json<HashMap<String, String>>,
    score: f64,
    submitted_at: DateTime<Utc>,
}

impl From<SubmissionRow> for QuizSubmission {
    fn from(row: SubmissionRow) -> Self {
        QuizSubmission {
            id: row.id,
            student_id: row.student_id,
            content_id: row.content_id,
            answers: row.answers.0,
            score: row.score,
            submitted_at: row.submitted_at,
        }
    }
}

/// PostgresRepository
///
/// `Repository` backed by PostgreSQL through a shared `PgPool`.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_contents(&self, builder: &mut QueryBuilder<'_, Postgres>, context: &str) -> Vec<Content> {
        match builder.build_query_as::<ContentRow>().fetch_all(&self.pool).await {
            Ok(rows) => rows.into_iter().filter_map(ContentRow::into_content).collect(),
            Err(e) => {
                tracing::error!("{} error: {:?}", context, e);
                vec![]
            }
        }
    }

    async fn count(&self, sql: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(sql)
            .fetch_one(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("count error: {:?}", e);
                0
            })
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    // --- USERS ---

    async fn get_user(&self, id: Uuid) -> Option<User> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM profiles WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_user error: {:?}", e);
                None
            })
    }

    async fn get_user_by_username(&self, username: &str) -> Option<User> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM profiles WHERE username = $1"))
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_user_by_username error: {:?}", e);
                None
            })
    }

    async fn list_users(&self) -> Vec<User> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM profiles ORDER BY username"))
            .fetch_all(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("list_users error: {:?}", e);
                vec![]
            })
    }

    /// Mirrors a profile created by the external auth provider.
    async fn create_user(&self, user: User) -> Result<User, RepoError> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO profiles (id, username, email, bio, profile_image, role, is_staff) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {USER_COLUMNS}"
        ))
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.bio)
        .bind(&user.profile_image)
        .bind(user.role)
        .bind(user.is_staff)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepoError::from_sqlx(e, "username already taken"))
    }

    async fn update_user(&self, id: Uuid, req: UpdateProfileRequest) -> Result<User, RepoError> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE profiles SET bio = COALESCE($2, bio), profile_image = COALESCE($3, profile_image) \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(req.bio)
        .bind(req.profile_image_key)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepoError::NotFound)
    }

    async fn delete_user(&self, id: Uuid) -> bool {
        let deleted: Result<bool, sqlx::Error> = async {
            let mut tx = self.pool.begin().await?;
            let reviewed: Vec<Uuid> =
                sqlx::query_scalar("SELECT DISTINCT course_id FROM reviews WHERE student_id = $1")
                    .bind(id)
                    .fetch_all(&mut *tx)
                    .await?;
            let removed = sqlx::query("DELETE FROM profiles WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?
                .rows_affected()
                > 0;
            if removed && !reviewed.is_empty() {
                sqlx::query(&format!(
                    "UPDATE courses SET average_rating = {AVERAGE_RATING} WHERE id = ANY($1)"
                ))
                .bind(&reviewed)
                .execute(&mut *tx)
                .await?;
            }
            tx.commit().await?;
            Ok(removed)
        }
        .await;

        deleted.unwrap_or_else(|e| {
            tracing::error!("delete_user error: {:?}", e);
            false
        })
    }

    async fn get_stats(&self) -> AdminDashboardStats {
        AdminDashboardStats {
            total_users: self.count("SELECT COUNT(*) FROM profiles").await,
            total_courses: self.count("SELECT COUNT(*) FROM courses").await,
            total_enrollments: self.count("SELECT COUNT(*) FROM enrollments").await,
            total_reviews: self.count("SELECT COUNT(*) FROM reviews").await,
        }
    }

    // --- CATEGORIES ---

    async fn list_categories(&self) -> Vec<Category> {
        sqlx::query_as::<_, Category>("SELECT id, name, description FROM categories ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("list_categories error: {:?}", e);
                vec![]
            })
    }

    async fn get_category(&self, id: Uuid) -> Option<Category> {
        sqlx::query_as::<_, Category>("SELECT id, name, description FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_category error: {:?}", e);
                None
            })
    }

    async fn create_category(&self, req: CreateCategoryRequest) -> Result<Category, RepoError> {
        sqlx::query_as::<_, Category>(
            "INSERT INTO categories (id, name, description) VALUES ($1, $2, $3) RETURNING id, name, description",
        )
        .bind(Uuid::new_v4())
        .bind(req.name.trim())
        .bind(&req.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepoError::from_sqlx(e, "category name already exists"))
    }

    async fn update_category(&self, id: Uuid, req: UpdateCategoryRequest) -> Result<Category, RepoError> {
        sqlx::query_as::<_, Category>(
            "UPDATE categories SET name = COALESCE($2, name), description = COALESCE($3, description) \
             WHERE id = $1 RETURNING id, name, description",
        )
        .bind(id)
        .bind(req.name.as_deref().map(str::trim))
        .bind(req.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::from_sqlx(e, "category name already exists"))?
        .ok_or(RepoError::NotFound)
    }

    async fn delete_category(&self, id: Uuid) -> bool {
        match sqlx::query("DELETE FROM categories WHERE id = $1").bind(id).execute(&self.pool).await {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_category error: {:?}", e);
                false
            }
        }
    }

    // --- COURSES ---

    /// Search covers title, description and category name; `ordering` is allow-listed.
    async fn list_courses(&self, filter: &CourseFilter) -> Vec<Course> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {COURSE_COLUMNS} FROM courses c JOIN categories cat ON cat.id = c.category_id WHERE true"
        ));

        if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
            let pattern = format!("%{}%", search.trim());
            builder.push(" AND (c.title ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR c.description ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR cat.name ILIKE ");
            builder.push_bind(pattern);
            builder.push(")");
        }

        if let Some(category) = filter.category {
            builder.push(" AND c.category_id = ");
            builder.push_bind(category);
        }

        match Ordering::parse(filter.ordering.as_deref(), COURSE_ORDERINGS) {
            Some(order) => {
                builder.push(format!(
                    " ORDER BY c.{} {}",
                    order.key,
                    if order.descending { "DESC" } else { "ASC" }
                ));
            }
            None => {
                builder.push(" ORDER BY c.created_at DESC");
            }
        }

        builder
            .build_query_as::<Course>()
            .fetch_all(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("list_courses error: {:?}", e);
                vec![]
            })
    }

    async fn get_course(&self, id: Uuid) -> Option<Course> {
        sqlx::query_as::<_, Course>(&format!("SELECT {COURSE_COLUMNS} FROM courses c WHERE c.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_course error: {:?}", e);
                None
            })
    }

    async fn create_course(&self, req: CreateCourseRequest, instructor_id: Uuid) -> Result<Course, RepoError> {
        sqlx::query_as::<_, Course>(&format!(
            "INSERT INTO courses AS c (id, title, description, price, category_id, instructor_id, thumbnail) \
             VALUES ($1, $2, $3, COALESCE($4, 1000.00), $5, $6, $7) RETURNING {COURSE_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&req.title)
        .bind(&req.description)
        .bind(req.price)
        .bind(req.category_id)
        .bind(instructor_id)
        .bind(&req.thumbnail_key)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepoError::from_sqlx(e, "course already exists"))
    }

    async fn update_course(&self, id: Uuid, req: UpdateCourseRequest) -> Result<Course, RepoError> {
        sqlx::query_as::<_, Course>(&format!(
            "UPDATE courses AS c SET title = COALESCE($2, c.title), \
                 description = COALESCE($3, c.description), \
                 price = COALESCE($4, c.price), \
                 category_id = COALESCE($5, c.category_id), \
                 thumbnail = COALESCE($6, c.thumbnail), \
                 updated_at = NOW() \
             WHERE c.id = $1 RETURNING {COURSE_COLUMNS}"
        ))
        .bind(id)
        .bind(req.title)
        .bind(req.description)
        .bind(req.price)
        .bind(req.category_id)
        .bind(req.thumbnail_key)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepoError::NotFound)
    }

    async fn delete_course(&self, id: Uuid) -> bool {
        match sqlx::query("DELETE FROM courses WHERE id = $1").bind(id).execute(&self.pool).await {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_course error: {:?}", e);
                false
            }
        }
    }

    /// Single statement, so the average always reflects the reviews visible at write time.
    async fn recompute_average_rating(&self, course_id: Uuid) -> Result<f64, RepoError> {
        sqlx::query_scalar::<_, f64>(&format!(
            "UPDATE courses SET average_rating = {AVERAGE_RATING} WHERE id = $1 RETURNING average_rating"
        ))
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepoError::NotFound)
    }

    // --- LESSONS ---

    async fn list_lessons(&self, filter: &LessonFilter) -> Vec<Lesson> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {LESSON_COLUMNS} FROM lessons WHERE true"));

        if let Some(course) = filter.course {
            builder.push(" AND course_id = ");
            builder.push_bind(course);
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
            builder.push(" AND title ILIKE ");
            builder.push_bind(format!("%{}%", search.trim()));
        }

        let order = Ordering::parse(filter.ordering.as_deref(), LESSON_ORDERINGS).unwrap_or(Ordering {
            key: "order",
            descending: false,
        });
        builder.push(format!(
            r#" ORDER BY "{}" {}"#,
            order.key,
            if order.descending { "DESC" } else { "ASC" }
        ));

        builder
            .build_query_as::<Lesson>()
            .fetch_all(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("list_lessons error: {:?}", e);
                vec![]
            })
    }

    async fn get_lesson(&self, id: Uuid) -> Option<Lesson> {
        sqlx::query_as::<_, Lesson>(&format!("SELECT {LESSON_COLUMNS} FROM lessons WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_lesson error: {:?}", e);
                None
            })
    }

    async fn create_lesson(&self, req: CreateLessonRequest) -> Result<Lesson, RepoError> {
        sqlx::query_as::<_, Lesson>(&format!(
            r#"INSERT INTO lessons (id, course_id, title, "order") VALUES ($1, $2, $3, $4) RETURNING {LESSON_COLUMNS}"#
        ))
        .bind(Uuid::new_v4())
        .bind(req.course_id)
        .bind(&req.title)
        .bind(req.order)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepoError::from_sqlx(e, "lesson already exists"))
    }

    async fn update_lesson(&self, id: Uuid, req: UpdateLessonRequest) -> Result<Lesson, RepoError> {
        sqlx::query_as::<_, Lesson>(&format!(
            r#"UPDATE lessons SET title = COALESCE($2, title), "order" = COALESCE($3, "order")
               WHERE id = $1 RETURNING {LESSON_COLUMNS}"#
        ))
        .bind(id)
        .bind(req.title)
        .bind(req.order)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepoError::NotFound)
    }

    async fn delete_lesson(&self, id: Uuid) -> bool {
        match sqlx::query("DELETE FROM lessons WHERE id = $1").bind(id).execute(&self.pool).await {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_lesson error: {:?}", e);
                false
            }
        }
    }

    // --- CONTENTS ---

    async fn list_contents(&self, filter: &ContentFilter) -> Vec<Content> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {CONTENT_COLUMNS} FROM contents ct WHERE true"));
        if let Some(lesson) = filter.lesson {
            builder.push(" AND ct.lesson_id = ");
            builder.push_bind(lesson);
        }
        builder.push(r#" ORDER BY ct.lesson_id, ct."order""#);
        self.fetch_contents(&mut builder, "list_contents").await
    }

    async fn list_course_contents(&self, course_id: Uuid) -> Vec<Content> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {CONTENT_COLUMNS} FROM contents ct JOIN lessons l ON l.id = ct.lesson_id WHERE l.course_id = "
        ));
        builder.push_bind(course_id);
        builder.push(r#" ORDER BY l."order", ct."order""#);
        self.fetch_contents(&mut builder, "list_course_contents").await
    }

    async fn list_quizzes(&self) -> Vec<Content> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            r#"SELECT {CONTENT_COLUMNS} FROM contents ct WHERE ct.kind = 'quiz' ORDER BY ct.created_at DESC"#
        ));
        self.fetch_contents(&mut builder, "list_quizzes").await
    }

    async fn get_content(&self, id: Uuid) -> Option<Content> {
        sqlx::query_as::<_, ContentRow>(&format!("SELECT {CONTENT_COLUMNS} FROM contents ct WHERE ct.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_content error: {:?}", e);
                None
            })
            .and_then(ContentRow::into_content)
    }

    async fn create_content(&self, req: CreateContentRequest) -> Result<Content, RepoError> {
        let row = sqlx::query_as::<_, ContentRow>(&format!(
            r#"INSERT INTO contents AS ct (id, lesson_id, kind, "order", data) VALUES ($1, $2, $3, $4, $5)
               RETURNING {CONTENT_COLUMNS}"#
        ))
        .bind(Uuid::new_v4())
        .bind(req.lesson_id)
        .bind(req.body.kind())
        .bind(req.order)
        .bind(Json(req.body.data()))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepoError::from_sqlx(e, "content already exists"))?;
        row.into_content().ok_or(RepoError::NotFound)
    }

    /// Replacing the body rewrites `kind` and `data` together so they never disagree.
    async fn update_content(&self, id: Uuid, req: UpdateContentRequest) -> Result<Content, RepoError> {
        let (kind, data) = match &req.body {
            Some(body) => (Some(body.kind()), Some(Json(body.data()))),
            None => (None, None),
        };
        let row = sqlx::query_as::<_, ContentRow>(&format!(
            r#"UPDATE contents AS ct SET "order" = COALESCE($2, ct."order"),
                   kind = COALESCE($3, ct.kind),
                   data = COALESCE($4, ct.data)
               WHERE ct.id = $1 RETURNING {CONTENT_COLUMNS}"#
        ))
        .bind(id)
        .bind(req.order)
        .bind(kind)
        .bind(data)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepoError::NotFound)?;
        row.into_content().ok_or(RepoError::NotFound)
    }

    async fn delete_content(&self, id: Uuid) -> bool {
        match sqlx::query("DELETE FROM contents WHERE id = $1").bind(id).execute(&self.pool).await {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_content error: {:?}", e);
                false
            }
        }
    }

    // --- ENROLLMENTS ---

    async fn list_enrollments(&self, filter: &EnrollmentFilter, scope: EnrollmentScope) -> Vec<Enrollment> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments e \
             JOIN courses c ON c.id = e.course_id \
             JOIN profiles p ON p.id = e.student_id WHERE true"
        ));

        match scope {
            EnrollmentScope::All => {}
            EnrollmentScope::Student(student_id) => {
                builder.push(" AND e.student_id = ");
                builder.push_bind(student_id);
            }
            EnrollmentScope::Instructor(instructor_id) => {
                builder.push(" AND c.instructor_id = ");
                builder.push_bind(instructor_id);
            }
        }

        if let Some(course) = filter.course {
            builder.push(" AND e.course_id = ");
            builder.push_bind(course);
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
            let pattern = format!("%{}%", search.trim());
            builder.push(" AND (p.username ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR c.title ILIKE ");
            builder.push_bind(pattern);
            builder.push(")");
        }

        let descending = Ordering::parse(filter.ordering.as_deref(), ENROLLMENT_ORDERINGS)
            .map(|o| o.descending)
            .unwrap_or(true);
        builder.push(if descending {
            " ORDER BY e.enrolled_at DESC"
        } else {
            " ORDER BY e.enrolled_at ASC"
        });

        builder
            .build_query_as::<Enrollment>()
            .fetch_all(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("list_enrollments error: {:?}", e);
                vec![]
            })
    }

    async fn get_enrollment(&self, id: Uuid) -> Option<Enrollment> {
        sqlx::query_as::<_, Enrollment>(&format!("SELECT {ENROLLMENT_COLUMNS} FROM enrollments e WHERE e.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_enrollment error: {:?}", e);
                None
            })
    }

    async fn find_enrollment(&self, student_id: Uuid, course_id: Uuid) -> Option<Enrollment> {
        sqlx::query_as::<_, Enrollment>(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments e WHERE e.student_id = $1 AND e.course_id = $2"
        ))
        .bind(student_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("find_enrollment error: {:?}", e);
            None
        })
    }

    async fn create_enrollment(&self, student_id: Uuid, course_id: Uuid) -> Result<Enrollment, RepoError> {
        sqlx::query_as::<_, Enrollment>(&format!(
            "INSERT INTO enrollments AS e (id, student_id, course_id) VALUES ($1, $2, $3) RETURNING {ENROLLMENT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(student_id)
        .bind(course_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepoError::from_sqlx(e, "student is already enrolled in this course"))
    }

    async fn update_enrollment(&self, id: Uuid, req: UpdateEnrollmentRequest) -> Result<Enrollment, RepoError> {
        sqlx::query_as::<_, Enrollment>(&format!(
            "UPDATE enrollments AS e SET is_active = COALESCE($2, e.is_active), completed = COALESCE($3, e.completed) \
             WHERE e.id = $1 RETURNING {ENROLLMENT_COLUMNS}"
        ))
        .bind(id)
        .bind(req.is_active)
        .bind(req.completed)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepoError::NotFound)
    }

    async fn set_grade(&self, id: Uuid, grade: LetterGrade) -> Result<Enrollment, RepoError> {
        sqlx::query_as::<_, Enrollment>(&format!(
            "UPDATE enrollments AS e SET grade = $2 WHERE e.id = $1 RETURNING {ENROLLMENT_COLUMNS}"
        ))
        .bind(id)
        .bind(grade)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepoError::NotFound)
    }

    async fn delete_enrollment(&self, id: Uuid) -> bool {
        match sqlx::query("DELETE FROM enrollments WHERE id = $1").bind(id).execute(&self.pool).await {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_enrollment error: {:?}", e);
                false
            }
        }
    }

    // --- REVIEWS ---

    async fn list_reviews(&self, filter: &ReviewFilter) -> Vec<Review> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE true"));
        if let Some(course) = filter.course {
            builder.push(" AND course_id = ");
            builder.push_bind(course);
        }
        builder.push(" ORDER BY created_at DESC");

        builder
            .build_query_as::<Review>()
            .fetch_all(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("list_reviews error: {:?}", e);
                vec![]
            })
    }

    async fn get_review(&self, id: Uuid) -> Option<Review> {
        sqlx::query_as::<_, Review>(&format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_review error: {:?}", e);
                None
            })
    }

    async fn create_review(&self, student_id: Uuid, req: CreateReviewRequest) -> Result<Review, RepoError> {
        sqlx::query_as::<_, Review>(&format!(
            "INSERT INTO reviews (id, student_id, course_id, rating, comment) VALUES ($1, $2, $3, $4, $5) \
             RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(student_id)
        .bind(req.course_id)
        .bind(req.rating)
        .bind(&req.comment)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepoError::from_sqlx(e, "you have already reviewed this course"))
    }

    async fn update_review(&self, id: Uuid, req: UpdateReviewRequest) -> Result<Review, RepoError> {
        sqlx::query_as::<_, Review>(&format!(
            "UPDATE reviews SET rating = COALESCE($2, rating), comment = COALESCE($3, comment) \
             WHERE id = $1 RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(id)
        .bind(req.rating)
        .bind(req.comment)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepoError::NotFound)
    }

    async fn delete_review(&self, id: Uuid) -> bool {
        match sqlx::query("DELETE FROM reviews WHERE id = $1").bind(id).execute(&self.pool).await {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_review error: {:?}", e);
                false
            }
        }
    }

    // --- PROGRESS ---

    /// The no-op `DO UPDATE` makes `RETURNING` yield the existing row on a repeat completion.
    async fn mark_content_complete(&self, student_id: Uuid, content_id: Uuid) -> Result<ContentProgress, RepoError> {
        sqlx::query_as::<_, ContentProgress>(&format!(
            "INSERT INTO content_progress (id, student_id, content_id) VALUES ($1, $2, $3) \
             ON CONFLICT (student_id, content_id) DO UPDATE SET completed_at = content_progress.completed_at \
             RETURNING {PROGRESS_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(student_id)
        .bind(content_id)
        .fetch_one(&self.pool)
        .await
        .map_err(RepoError::from)
    }

    async fn count_course_contents(&self, course_id: Uuid) -> i64 {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM contents ct JOIN lessons l ON l.id = ct.lesson_id WHERE l.course_id = $1",
        )
        .bind(course_id)
        .fetch_one(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("count_course_contents error: {:?}", e);
            0
        })
    }

    async fn count_completed_contents(&self, student_id: Uuid, course_id: Uuid) -> i64 {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM content_progress cp \
             JOIN contents ct ON ct.id = cp.content_id \
             JOIN lessons l ON l.id = ct.lesson_id \
             WHERE cp.student_id = $1 AND l.course_id = $2",
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_one(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("count_completed_contents error: {:?}", e);
            0
        })
    }

    async fn completion_counts(&self, course_id: Uuid) -> Vec<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(cp.id) FROM enrollments e \
             LEFT JOIN content_progress cp ON cp.student_id = e.student_id AND cp.content_id IN ( \
                 SELECT ct.id FROM contents ct JOIN lessons l ON l.id = ct.lesson_id WHERE l.course_id = $1) \
             WHERE e.course_id = $1 AND e.is_active \
             GROUP BY e.id",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("completion_counts error: {:?}", e);
            vec![]
        })
    }

    // --- QUIZ SUBMISSIONS ---

    async fn find_submission(&self, student_id: Uuid, content_id: Uuid) -> Option<QuizSubmission> {
        sqlx::query_as::<_, SubmissionRow>(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM quiz_submissions WHERE student_id = $1 AND content_id = $2"
        ))
        .bind(student_id)
        .bind(content_id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("find_submission error: {:?}", e);
            None
        })
        .map(QuizSubmission::from)
    }

    async fn create_submission(
        &self,
        student_id: Uuid,
        content_id: Uuid,
        answers: HashMap<String, String>,
        score: f64,
    ) -> Result<QuizSubmission, RepoError> {
        sqlx::query_as::<_, SubmissionRow>(&format!(
            "INSERT INTO quiz_submissions (id, student_id, content_id, answers, score) VALUES ($1, $2, $3, $4, $5) \
             RETURNING {SUBMISSION_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(student_id)
        .bind(content_id)
        .bind(Json(answers))
        .bind(score)
        .fetch_one(&self.pool)
        .await
        .map(QuizSubmission::from)
        .map_err(|e| RepoError::from_sqlx(e, "quiz already submitted"))
    }
}
