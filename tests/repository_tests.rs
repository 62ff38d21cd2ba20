mod common;

use common::{quiz_body, seed, user};
use lms_portal::{
    error::RepoError,
    models::{
        CourseFilter, CreateCategoryRequest, CreateCourseRequest, CreateReviewRequest, EnrollmentFilter,
        LessonFilter, LetterGrade, Role, UpdateCategoryRequest, UpdateCourseRequest, UpdateProfileRequest,
    },
    repository::{EnrollmentScope, Ordering, Repository, COURSE_ORDERINGS},
};
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

fn course_request(title: &str, price: i64, category_id: Uuid) -> CreateCourseRequest {
    CreateCourseRequest {
        title: title.to_string(),
        description: format!("All about {}", title),
        price: Some(Decimal::new(price, 0)),
        category_id,
        thumbnail_key: None,
    }
}

// --- Ordering parameter ---

#[test]
fn test_ordering_parse() {
    assert_eq!(
        Ordering::parse(Some("-price"), COURSE_ORDERINGS),
        Some(Ordering {
            key: "price",
            descending: true
        })
    );
    assert_eq!(
        Ordering::parse(Some("title"), COURSE_ORDERINGS),
        Some(Ordering {
            key: "title",
            descending: false
        })
    );
    assert_eq!(Ordering::parse(Some("password"), COURSE_ORDERINGS), None);
    assert_eq!(Ordering::parse(None, COURSE_ORDERINGS), None);
}

// --- Uniqueness ---

#[tokio::test]
async fn test_username_and_category_uniqueness() {
    let f = seed().await;

    let duplicate_user = f.repo.create_user(user("ada", Role::Student)).await;
    assert!(matches!(duplicate_user, Err(RepoError::Conflict(_))));

    let duplicate_category = f
        .repo
        .create_category(CreateCategoryRequest {
            name: "Systems".to_string(),
            description: String::new(),
        })
        .await;
    assert!(matches!(duplicate_category, Err(RepoError::Conflict(_))));

    let other = f
        .repo
        .create_category(CreateCategoryRequest {
            name: "Graphics".to_string(),
            description: String::new(),
        })
        .await
        .unwrap();
    let rename = f
        .repo
        .update_category(
            other.id,
            UpdateCategoryRequest {
                name: Some("Systems".to_string()),
                description: None,
            },
        )
        .await;
    assert!(matches!(rename, Err(RepoError::Conflict(_))));
}

#[tokio::test]
async fn test_one_enrollment_review_and_submission_per_student() {
    let f = seed().await;

    let enrollment = f.repo.create_enrollment(f.student.id, f.course.id).await;
    assert!(matches!(enrollment, Err(RepoError::Conflict(_))));

    let review = || CreateReviewRequest {
        course_id: f.course.id,
        rating: 4,
        comment: "Good".to_string(),
    };
    f.repo.create_review(f.student.id, review()).await.unwrap();
    assert!(matches!(
        f.repo.create_review(f.student.id, review()).await,
        Err(RepoError::Conflict(_))
    ));

    f.repo
        .create_submission(f.student.id, f.quiz.id, HashMap::new(), 0.0)
        .await
        .unwrap();
    assert!(matches!(
        f.repo
            .create_submission(f.student.id, f.quiz.id, HashMap::new(), 100.0)
            .await,
        Err(RepoError::Conflict(_))
    ));
}

#[tokio::test]
async fn test_missing_parents_are_not_found() {
    let f = seed().await;

    let course = f
        .repo
        .create_course(course_request("Ghost", 10, Uuid::new_v4()), f.instructor.id)
        .await;
    assert!(matches!(course, Err(RepoError::NotFound)));

    let enrollment = f.repo.create_enrollment(f.student.id, Uuid::new_v4()).await;
    assert!(matches!(enrollment, Err(RepoError::NotFound)));

    let update = f
        .repo
        .update_course(Uuid::new_v4(), UpdateCourseRequest::default())
        .await;
    assert!(matches!(update, Err(RepoError::NotFound)));
}

// --- Cascades ---

#[tokio::test]
async fn test_deleting_lesson_cascades_to_contents_and_progress() {
    let f = seed().await;
    f.repo.mark_content_complete(f.student.id, f.text.id).await.unwrap();
    f.repo
        .create_submission(f.student.id, f.quiz.id, HashMap::new(), 25.0)
        .await
        .unwrap();

    assert!(f.repo.delete_lesson(f.lesson.id).await);

    assert!(f.repo.get_content(f.text.id).await.is_none());
    assert!(f.repo.get_content(f.quiz.id).await.is_none());
    assert!(f.repo.find_submission(f.student.id, f.quiz.id).await.is_none());
    assert_eq!(f.repo.count_completed_contents(f.student.id, f.course.id).await, 0);
    assert!(!f.repo.delete_lesson(f.lesson.id).await);
}

#[tokio::test]
async fn test_deleting_category_cascades_to_courses() {
    let f = seed().await;

    assert!(f.repo.delete_category(f.category.id).await);

    assert!(f.repo.get_course(f.course.id).await.is_none());
    assert!(f.repo.find_enrollment(f.student.id, f.course.id).await.is_none());
    assert_eq!(f.repo.get_stats().await.total_courses, 0);
}

// --- Listing ---

#[tokio::test]
async fn test_course_search_and_ordering() {
    let f = seed().await;
    f.repo
        .create_course(course_request("Algorithms", 50, f.category.id), f.instructor.id)
        .await
        .unwrap();
    f.repo
        .create_course(course_request("Compilers", 2000, f.category.id), f.other_instructor.id)
        .await
        .unwrap();

    let by_price = f
        .repo
        .list_courses(&CourseFilter {
            ordering: Some("-price".to_string()),
            ..CourseFilter::default()
        })
        .await;
    let titles: Vec<&str> = by_price.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["Compilers", "Operating Systems", "Algorithms"]);

    let by_title = f
        .repo
        .list_courses(&CourseFilter {
            ordering: Some("title".to_string()),
            ..CourseFilter::default()
        })
        .await;
    assert_eq!(by_title[0].title, "Algorithms");

    // Category names are searched too.
    let by_category = f
        .repo
        .list_courses(&CourseFilter {
            search: Some("systems".to_string()),
            ..CourseFilter::default()
        })
        .await;
    assert_eq!(by_category.len(), 3);

    let by_text = f
        .repo
        .list_courses(&CourseFilter {
            search: Some("compil".to_string()),
            ..CourseFilter::default()
        })
        .await;
    assert_eq!(by_text.len(), 1);
}

#[tokio::test]
async fn test_lessons_listed_by_order() {
    let f = seed().await;
    let early = f
        .repo
        .create_lesson(lms_portal::models::CreateLessonRequest {
            course_id: f.course.id,
            title: "Introduction".to_string(),
            order: 0,
        })
        .await
        .unwrap();

    let lessons = f
        .repo
        .list_lessons(&LessonFilter {
            course: Some(f.course.id),
            ..LessonFilter::default()
        })
        .await;

    let ids: Vec<Uuid> = lessons.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![early.id, f.lesson.id]);
}

#[tokio::test]
async fn test_enrollment_scopes() {
    let f = seed().await;
    let filter = EnrollmentFilter::default();

    assert_eq!(f.repo.list_enrollments(&filter, EnrollmentScope::All).await.len(), 1);
    assert_eq!(
        f.repo
            .list_enrollments(&filter, EnrollmentScope::Student(f.student.id))
            .await
            .len(),
        1
    );
    assert!(
        f.repo
            .list_enrollments(&filter, EnrollmentScope::Student(f.outsider.id))
            .await
            .is_empty()
    );
    assert_eq!(
        f.repo
            .list_enrollments(&filter, EnrollmentScope::Instructor(f.instructor.id))
            .await
            .len(),
        1
    );
    assert!(
        f.repo
            .list_enrollments(&filter, EnrollmentScope::Instructor(f.other_instructor.id))
            .await
            .is_empty()
    );
}

// --- Derived values ---

#[tokio::test]
async fn test_recompute_average_rating() {
    let f = seed().await;
    let second = f.repo.create_user(user("dennis", Role::Student)).await.unwrap();

    for (student, rating) in [(f.student.id, 5), (second.id, 4)] {
        f.repo
            .create_review(
                student,
                CreateReviewRequest {
                    course_id: f.course.id,
                    rating,
                    comment: "ok".to_string(),
                },
            )
            .await
            .unwrap();
    }

    let average = f.repo.recompute_average_rating(f.course.id).await.unwrap();
    assert_eq!(average, 4.5);
    assert_eq!(f.repo.get_course(f.course.id).await.unwrap().average_rating, 4.5);
}

#[tokio::test]
async fn test_completion_counts_only_active_students() {
    let f = seed().await;
    f.repo.mark_content_complete(f.student.id, f.text.id).await.unwrap();
    f.repo.mark_content_complete(f.student.id, f.quiz.id).await.unwrap();
    let dropped = f.repo.create_enrollment(f.outsider.id, f.course.id).await.unwrap();
    f.repo
        .update_enrollment(
            dropped.id,
            lms_portal::models::UpdateEnrollmentRequest {
                is_active: Some(false),
                completed: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(f.repo.count_course_contents(f.course.id).await, 2);
    assert_eq!(f.repo.completion_counts(f.course.id).await, vec![2]);
}

#[tokio::test]
async fn test_quiz_listing_and_grade() {
    let f = seed().await;
    let quizzes = f.repo.list_quizzes().await;
    assert_eq!(quizzes.len(), 1);
    assert_eq!(quizzes[0].body, quiz_body());

    let graded = f.repo.set_grade(f.enrollment.id, LetterGrade::C).await.unwrap();
    assert_eq!(graded.grade, Some(LetterGrade::C));
    assert!(matches!(
        f.repo.set_grade(Uuid::new_v4(), LetterGrade::A).await,
        Err(RepoError::NotFound)
    ));
}

// --- Users ---

#[tokio::test]
async fn test_user_lookup_and_profile_update() {
    let f = seed().await;

    assert_eq!(f.repo.get_user_by_username("linus").await.map(|u| u.id), Some(f.student.id));
    assert!(f.repo.get_user_by_username("Linus").await.is_none());

    let updated = f
        .repo
        .update_user(
            f.student.id,
            UpdateProfileRequest {
                bio: None,
                profile_image_key: Some("uploads/me.png".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.bio, "");
    assert_eq!(updated.profile_image.as_deref(), Some("uploads/me.png"));

    assert!(matches!(
        f.repo.update_user(Uuid::new_v4(), UpdateProfileRequest::default()).await,
        Err(RepoError::NotFound)
    ));
}

#[tokio::test]
async fn test_deleting_student_removes_their_records() {
    let f = seed().await;
    f.repo.mark_content_complete(f.student.id, f.text.id).await.unwrap();
    f.repo
        .create_submission(f.student.id, f.quiz.id, HashMap::new(), 50.0)
        .await
        .unwrap();
    f.repo
        .create_review(
            f.student.id,
            CreateReviewRequest {
                course_id: f.course.id,
                rating: 1,
                comment: "Too fast".to_string(),
            },
        )
        .await
        .unwrap();
    f.repo.recompute_average_rating(f.course.id).await.unwrap();

    assert!(f.repo.delete_user(f.student.id).await);

    assert!(f.repo.find_enrollment(f.student.id, f.course.id).await.is_none());
    assert!(f.repo.find_submission(f.student.id, f.quiz.id).await.is_none());
    assert_eq!(f.repo.count_completed_contents(f.student.id, f.course.id).await, 0);
    assert_eq!(f.repo.get_stats().await.total_reviews, 0);
    assert_eq!(f.repo.get_course(f.course.id).await.unwrap().average_rating, 0.0);
    assert!(!f.repo.delete_user(f.student.id).await);
}
