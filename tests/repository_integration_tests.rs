//! Runs against a real Postgres (`DATABASE_URL`). Ignored by default:
//! `cargo test -- --ignored` once the database is up.

use lms_portal::{
    error::RepoError,
    models::{
        ContentBody, CourseFilter, CreateCategoryRequest, CreateContentRequest, CreateCourseRequest,
        CreateLessonRequest, CreateReviewRequest, LetterGrade, QuizPayload, QuizQuestion, Role,
        UpdateCourseRequest, User,
    },
    repository::{PostgresRepository, Repository},
};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

// --- Test Context and Setup ---

struct DbTestContext {
    pool: PgPool,
}

impl DbTestContext {
    async fn setup() -> Self {
        dotenv::dotenv().ok();

        let db_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set to run integration tests");

        let pool = PgPool::connect(&db_url)
            .await
            .expect("Failed to connect to database for integration tests.");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run database migrations.");

        DbTestContext { pool }
    }

    fn repository(&self) -> PostgresRepository {
        PostgresRepository::new(self.pool.clone())
    }
}

// --- Test Data Helpers ---

/// Every test uses fresh names, so runs against a shared database don't collide.
fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

async fn create_test_user(repo: &PostgresRepository, role: Role) -> User {
    let username = unique(role.as_str());
    repo.create_user(User {
        id: Uuid::new_v4(),
        email: format!("{}@test.com", username),
        username,
        bio: String::new(),
        profile_image: None,
        role,
        is_staff: false,
    })
    .await
    .expect("Failed to create test user")
}

struct Seeded {
    instructor: User,
    student: User,
    course_id: Uuid,
    quiz_id: Uuid,
}

async fn seed(repo: &PostgresRepository) -> Seeded {
    let instructor = create_test_user(repo, Role::Instructor).await;
    let student = create_test_user(repo, Role::Student).await;

    let category = repo
        .create_category(CreateCategoryRequest {
            name: unique("category"),
            description: String::new(),
        })
        .await
        .unwrap();
    let course = repo
        .create_course(
            CreateCourseRequest {
                title: unique("Course"),
                description: "Integration".to_string(),
                price: None,
                category_id: category.id,
                thumbnail_key: None,
            },
            instructor.id,
        )
        .await
        .unwrap();
    let lesson = repo
        .create_lesson(CreateLessonRequest {
            course_id: course.id,
            title: "Only lesson".to_string(),
            order: 1,
        })
        .await
        .unwrap();
    let quiz = repo
        .create_content(CreateContentRequest {
            lesson_id: lesson.id,
            order: 1,
            body: ContentBody::Quiz(QuizPayload {
                title: None,
                questions: vec![QuizQuestion {
                    prompt: "1 + 1?".to_string(),
                    choices: vec!["1".into(), "2".into()],
                    answer: "2".to_string(),
                }],
            }),
        })
        .await
        .unwrap();

    Seeded {
        instructor,
        student,
        course_id: course.id,
        quiz_id: quiz.id,
    }
}

// --- Tests ---

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn test_course_defaults_and_partial_update() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let s = seed(&repo).await;

    let course = repo.get_course(s.course_id).await.unwrap();
    assert_eq!(course.price, Decimal::new(100_000, 2));
    assert_eq!(course.instructor_id, s.instructor.id);
    assert_eq!(course.average_rating, 0.0);

    let updated = repo
        .update_course(
            s.course_id,
            UpdateCourseRequest {
                price: Some(Decimal::new(4999, 2)),
                ..UpdateCourseRequest::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.price, Decimal::new(4999, 2));
    assert_eq!(updated.title, course.title);

    let found = repo
        .list_courses(&CourseFilter {
            search: Some(course.title.to_uppercase()),
            ..CourseFilter::default()
        })
        .await;
    assert_eq!(found.len(), 1);
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn test_unique_constraints_surface_as_conflicts() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let s = seed(&repo).await;

    repo.create_enrollment(s.student.id, s.course_id).await.unwrap();
    assert!(matches!(
        repo.create_enrollment(s.student.id, s.course_id).await,
        Err(RepoError::Conflict(_))
    ));

    let answers: HashMap<String, String> = [("0".to_string(), "2".to_string())].into();
    repo.create_submission(s.student.id, s.quiz_id, answers.clone(), 100.0)
        .await
        .unwrap();
    assert!(matches!(
        repo.create_submission(s.student.id, s.quiz_id, answers, 100.0).await,
        Err(RepoError::Conflict(_))
    ));

    let stored = repo.find_submission(s.student.id, s.quiz_id).await.unwrap();
    assert_eq!(stored.answers.get("0").map(String::as_str), Some("2"));
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn test_quiz_body_round_trips_through_jsonb() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let s = seed(&repo).await;

    let content = repo.get_content(s.quiz_id).await.unwrap();
    let quiz = content.body.as_quiz().unwrap();
    assert_eq!(quiz.questions[0].answer, "2");

    let quizzes = repo.list_quizzes().await;
    assert!(quizzes.iter().any(|c| c.id == s.quiz_id));
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn test_rating_progress_and_grade() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let s = seed(&repo).await;
    let enrollment = repo.create_enrollment(s.student.id, s.course_id).await.unwrap();

    repo.create_review(
        s.student.id,
        CreateReviewRequest {
            course_id: s.course_id,
            rating: 3,
            comment: "Average".to_string(),
        },
    )
    .await
    .unwrap();
    assert_eq!(repo.recompute_average_rating(s.course_id).await.unwrap(), 3.0);

    let first = repo.mark_content_complete(s.student.id, s.quiz_id).await.unwrap();
    let second = repo.mark_content_complete(s.student.id, s.quiz_id).await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(repo.count_completed_contents(s.student.id, s.course_id).await, 1);
    assert_eq!(repo.completion_counts(s.course_id).await, vec![1]);

    let graded = repo.set_grade(enrollment.id, LetterGrade::APlus).await.unwrap();
    assert_eq!(graded.grade, Some(LetterGrade::APlus));
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn test_course_delete_cascades() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let s = seed(&repo).await;
    repo.create_enrollment(s.student.id, s.course_id).await.unwrap();

    assert!(repo.delete_course(s.course_id).await);
    assert!(repo.get_content(s.quiz_id).await.is_none());
    assert!(repo.find_enrollment(s.student.id, s.course_id).await.is_none());
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn test_average_rating_recomputed_in_database() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let s = seed(&repo).await;
    let second = create_test_user(&repo, Role::Student).await;

    for (student, rating) in [(s.student.id, 4), (second.id, 5)] {
        repo.create_review(
            student,
            CreateReviewRequest {
                course_id: s.course_id,
                rating,
                comment: "ok".to_string(),
            },
        )
        .await
        .unwrap();
    }
    assert_eq!(repo.recompute_average_rating(s.course_id).await.unwrap(), 4.5);

    // Deleting a reviewer refreshes the stored average in the same transaction.
    assert!(repo.delete_user(second.id).await);
    assert_eq!(repo.get_course(s.course_id).await.unwrap().average_rating, 4.0);

    assert!(matches!(
        repo.recompute_average_rating(Uuid::new_v4()).await,
        Err(RepoError::NotFound)
    ));
}
