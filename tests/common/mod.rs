#![allow(dead_code)]

use lms_portal::{
    AppState,
    auth::AuthUser,
    config::AppConfig,
    models::{
        Category, Content, ContentBody, Course, CreateCategoryRequest, CreateContentRequest,
        CreateCourseRequest, CreateLessonRequest, Enrollment, Lesson, QuizPayload, QuizQuestion, Role,
        TextPayload, User,
    },
    repository::{MemoryRepository, Repository},
    storage::MockStorageService,
};
use std::sync::Arc;
use uuid::Uuid;

pub fn user(username: &str, role: Role) -> User {
    User {
        id: Uuid::new_v4(),
        username: username.to_string(),
        email: format!("{}@example.com", username),
        bio: String::new(),
        profile_image: None,
        role,
        is_staff: false,
    }
}

pub fn auth(user: &User) -> AuthUser {
    AuthUser {
        id: user.id,
        role: user.role,
        is_staff: user.is_staff,
    }
}

pub fn create_test_state(repo: Arc<MemoryRepository>) -> AppState {
    AppState {
        repo,
        storage: Arc::new(MockStorageService::new()),
        config: AppConfig::default(),
    }
}

pub fn quiz_body() -> ContentBody {
    let question = |prompt: &str, answer: &str| QuizQuestion {
        prompt: prompt.to_string(),
        choices: vec!["A".into(), "B".into(), "C".into(), "D".into()],
        answer: answer.to_string(),
    };
    ContentBody::Quiz(QuizPayload {
        title: Some("Checkpoint".to_string()),
        questions: vec![
            question("First?", "A"),
            question("Second?", "B"),
            question("Third?", "C"),
            question("Fourth?", "D"),
        ],
    })
}

/// A small seeded world: one course owned by `instructor` with a text item and a quiz,
/// `student` actively enrolled, `outsider` a student with no enrollment.
pub struct Fixture {
    pub repo: Arc<MemoryRepository>,
    pub state: AppState,
    pub instructor: User,
    pub other_instructor: User,
    pub student: User,
    pub outsider: User,
    pub staff: User,
    pub category: Category,
    pub course: Course,
    pub lesson: Lesson,
    pub text: Content,
    pub quiz: Content,
    pub enrollment: Enrollment,
}

pub async fn seed() -> Fixture {
    let repo = Arc::new(MemoryRepository::new());

    let instructor = repo.create_user(user("ada", Role::Instructor)).await.unwrap();
    let other_instructor = repo.create_user(user("grace", Role::Instructor)).await.unwrap();
    let student = repo.create_user(user("linus", Role::Student)).await.unwrap();
    let outsider = repo.create_user(user("ken", Role::Student)).await.unwrap();
    let staff = repo
        .create_user(User {
            is_staff: true,
            ..user("root", Role::Instructor)
        })
        .await
        .unwrap();

    let category = repo
        .create_category(CreateCategoryRequest {
            name: "Systems".to_string(),
            description: "Low-level programming".to_string(),
        })
        .await
        .unwrap();

    let course = repo
        .create_course(
            CreateCourseRequest {
                title: "Operating Systems".to_string(),
                description: "Processes, memory and files".to_string(),
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
            title: "Scheduling".to_string(),
            order: 1,
        })
        .await
        .unwrap();

    let text = repo
        .create_content(CreateContentRequest {
            lesson_id: lesson.id,
            order: 1,
            body: ContentBody::Text(TextPayload {
                title: Some("Round robin".to_string()),
                body: "Each process gets a time slice.".to_string(),
            }),
        })
        .await
        .unwrap();

    let quiz = repo
        .create_content(CreateContentRequest {
            lesson_id: lesson.id,
            order: 2,
            body: quiz_body(),
        })
        .await
        .unwrap();

    let enrollment = repo.create_enrollment(student.id, course.id).await.unwrap();

    Fixture {
        state: create_test_state(repo.clone()),
        repo,
        instructor,
        other_instructor,
        student,
        outsider,
        staff,
        category,
        course,
        lesson,
        text,
        quiz,
        enrollment,
    }
}
