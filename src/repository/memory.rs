use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    COURSE_ORDERINGS, ENROLLMENT_ORDERINGS, EnrollmentScope, LESSON_ORDERINGS, Ordering, Repository,
};
use crate::{
    aggregates,
    error::RepoError,
    models::{
        AdminDashboardStats, Category, Content, ContentFilter, ContentKind, ContentProgress, Course,
        CourseFilter, CreateCategoryRequest, CreateContentRequest, CreateCourseRequest, CreateLessonRequest,
        CreateReviewRequest, Enrollment, EnrollmentFilter, LetterGrade, Lesson, LessonFilter, QuizSubmission,
        Review, ReviewFilter, UpdateCategoryRequest, UpdateContentRequest, UpdateCourseRequest,
        UpdateEnrollmentRequest, UpdateLessonRequest, UpdateProfileRequest, UpdateReviewRequest, User,
    },
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    categories: Vec<Category>,
    courses: Vec<Course>,
    lessons: Vec<Lesson>,
    contents: Vec<Content>,
    enrollments: Vec<Enrollment>,
    reviews: Vec<Review>,
    submissions: Vec<QuizSubmission>,
    progress: Vec<ContentProgress>,
}

impl Tables {
    fn course_of_content(&self, content: &Content) -> Option<Uuid> {
        self.lessons
            .iter()
            .find(|l| l.id == content.lesson_id)
            .map(|l| l.course_id)
    }

    fn course_content_ids(&self, course_id: Uuid) -> Vec<Uuid> {
        self.contents
            .iter()
            .filter(|c| self.course_of_content(c) == Some(course_id))
            .map(|c| c.id)
            .collect()
    }

    fn completed_in_course(&self, student_id: Uuid, course_id: Uuid) -> i64 {
        let content_ids = self.course_content_ids(course_id);
        self.progress
            .iter()
            .filter(|p| p.student_id == student_id && content_ids.contains(&p.content_id))
            .count() as i64
    }

    fn refresh_rating(&mut self, course_id: Uuid) -> Option<f64> {
        let ratings: Vec<i32> = self
            .reviews
            .iter()
            .filter(|r| r.course_id == course_id)
            .map(|r| r.rating)
            .collect();
        let course = self.courses.iter_mut().find(|c| c.id == course_id)?;
        course.average_rating = aggregates::average_rating(&ratings);
        Some(course.average_rating)
    }

    // Cascades mirror the ON DELETE CASCADE foreign keys of the schema.

    fn remove_contents(&mut self, content_ids: &[Uuid]) {
        self.contents.retain(|c| !content_ids.contains(&c.id));
        self.submissions.retain(|s| !content_ids.contains(&s.content_id));
        self.progress.retain(|p| !content_ids.contains(&p.content_id));
    }

    fn remove_lessons(&mut self, lesson_ids: &[Uuid]) {
        let content_ids: Vec<Uuid> = self
            .contents
            .iter()
            .filter(|c| lesson_ids.contains(&c.lesson_id))
            .map(|c| c.id)
            .collect();
        self.remove_contents(&content_ids);
        self.lessons.retain(|l| !lesson_ids.contains(&l.id));
    }

    fn remove_courses(&mut self, course_ids: &[Uuid]) {
        let lesson_ids: Vec<Uuid> = self
            .lessons
            .iter()
            .filter(|l| course_ids.contains(&l.course_id))
            .map(|l| l.id)
            .collect();
        self.remove_lessons(&lesson_ids);
        self.enrollments.retain(|e| !course_ids.contains(&e.course_id));
        self.reviews.retain(|r| !course_ids.contains(&r.course_id));
        self.courses.retain(|c| !course_ids.contains(&c.id));
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn search_term(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

/// MemoryRepository
///
/// In-process `Repository` used by the test suites and for running the API without a
/// database. Enforces the same uniqueness rules and cascades as the Postgres schema.
#[derive(Default)]
pub struct MemoryRepository {
    tables: RwLock<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    // --- USERS ---

    async fn get_user(&self, id: Uuid) -> Option<User> {
        self.tables.read().await.users.iter().find(|u| u.id == id).cloned()
    }

    async fn create_user(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.id == user.id || u.username == user.username) {
            return Err(RepoError::Conflict("username already taken".to_string()));
        }
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn get_user_by_username(&self, username: &str) -> Option<User> {
        self.tables
            .read()
            .await
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned()
    }

    async fn list_users(&self) -> Vec<User> {
        let mut users = self.tables.read().await.users.clone();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        users
    }

    async fn update_user(&self, id: Uuid, req: UpdateProfileRequest) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        let user = tables.users.iter_mut().find(|u| u.id == id).ok_or(RepoError::NotFound)?;
        if let Some(bio) = req.bio {
            user.bio = bio;
        }
        if let Some(key) = req.profile_image_key {
            user.profile_image = Some(key);
        }
        Ok(user.clone())
    }

    async fn delete_user(&self, id: Uuid) -> bool {
        let mut tables = self.tables.write().await;
        if !tables.users.iter().any(|u| u.id == id) {
            return false;
        }

        let owned: Vec<Uuid> = tables
            .courses
            .iter()
            .filter(|c| c.instructor_id == id)
            .map(|c| c.id)
            .collect();
        tables.remove_courses(&owned);

        let mut reviewed: Vec<Uuid> = tables
            .reviews
            .iter()
            .filter(|r| r.student_id == id)
            .map(|r| r.course_id)
            .collect();
        reviewed.dedup();

        tables.enrollments.retain(|e| e.student_id != id);
        tables.reviews.retain(|r| r.student_id != id);
        tables.submissions.retain(|s| s.student_id != id);
        tables.progress.retain(|p| p.student_id != id);
        tables.users.retain(|u| u.id != id);

        for course_id in reviewed {
            tables.refresh_rating(course_id);
        }
        true
    }

    async fn get_stats(&self) -> AdminDashboardStats {
        let tables = self.tables.read().await;
        AdminDashboardStats {
            total_users: tables.users.len() as i64,
            total_courses: tables.courses.len() as i64,
            total_enrollments: tables.enrollments.len() as i64,
            total_reviews: tables.reviews.len() as i64,
        }
    }

    // --- CATEGORIES ---

    async fn list_categories(&self) -> Vec<Category> {
        let mut categories = self.tables.read().await.categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        categories
    }

    async fn get_category(&self, id: Uuid) -> Option<Category> {
        self.tables.read().await.categories.iter().find(|c| c.id == id).cloned()
    }

    async fn create_category(&self, req: CreateCategoryRequest) -> Result<Category, RepoError> {
        let mut tables = self.tables.write().await;
        let name = req.name.trim().to_string();
        if tables.categories.iter().any(|c| c.name == name) {
            return Err(RepoError::Conflict("category name already exists".to_string()));
        }
        let category = Category {
            id: Uuid::new_v4(),
            name,
            description: req.description,
        };
        tables.categories.push(category.clone());
        Ok(category)
    }

    async fn update_category(&self, id: Uuid, req: UpdateCategoryRequest) -> Result<Category, RepoError> {
        let mut tables = self.tables.write().await;
        let name = req.name.map(|n| n.trim().to_string());
        if let Some(name) = &name {
            if tables.categories.iter().any(|c| c.id != id && c.name == *name) {
                return Err(RepoError::Conflict("category name already exists".to_string()));
            }
        }
        let category = tables
            .categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(RepoError::NotFound)?;
        if let Some(name) = name {
            category.name = name;
        }
        if let Some(description) = req.description {
            category.description = description;
        }
        Ok(category.clone())
    }

    async fn delete_category(&self, id: Uuid) -> bool {
        let mut tables = self.tables.write().await;
        let before = tables.categories.len();
        tables.categories.retain(|c| c.id != id);
        if tables.categories.len() == before {
            return false;
        }
        let course_ids: Vec<Uuid> = tables
            .courses
            .iter()
            .filter(|c| c.category_id == id)
            .map(|c| c.id)
            .collect();
        tables.remove_courses(&course_ids);
        true
    }

    // --- COURSES ---

    async fn list_courses(&self, filter: &CourseFilter) -> Vec<Course> {
        let tables = self.tables.read().await;
        let search = search_term(filter.search.as_deref());

        let mut courses: Vec<Course> = tables
            .courses
            .iter()
            .filter(|c| filter.category.is_none_or(|category| c.category_id == category))
            .filter(|c| {
                search.is_none_or(|term| {
                    let category_name = tables
                        .categories
                        .iter()
                        .find(|cat| cat.id == c.category_id)
                        .map(|cat| cat.name.as_str())
                        .unwrap_or_default();
                    contains_ci(&c.title, term) || contains_ci(&c.description, term) || contains_ci(category_name, term)
                })
            })
            .cloned()
            .collect();

        match Ordering::parse(filter.ordering.as_deref(), COURSE_ORDERINGS) {
            Some(order) => {
                courses.sort_by(|a, b| match order.key {
                    "title" => a.title.cmp(&b.title),
                    "price" => a.price.cmp(&b.price),
                    _ => a.created_at.cmp(&b.created_at),
                });
                if order.descending {
                    courses.reverse();
                }
            }
            None => courses.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }
        courses
    }

    async fn get_course(&self, id: Uuid) -> Option<Course> {
        self.tables.read().await.courses.iter().find(|c| c.id == id).cloned()
    }

    async fn create_course(&self, req: CreateCourseRequest, instructor_id: Uuid) -> Result<Course, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.categories.iter().any(|c| c.id == req.category_id) {
            return Err(RepoError::NotFound);
        }
        let now = Utc::now();
        let course = Course {
            id: Uuid::new_v4(),
            title: req.title,
            description: req.description,
            price: req.price.unwrap_or_else(|| Decimal::new(100_000, 2)),
            category_id: req.category_id,
            instructor_id,
            thumbnail: req.thumbnail_key,
            average_rating: 0.0,
            created_at: now,
            updated_at: now,
        };
        tables.courses.push(course.clone());
        Ok(course)
    }

    async fn update_course(&self, id: Uuid, req: UpdateCourseRequest) -> Result<Course, RepoError> {
        let mut tables = self.tables.write().await;
        if let Some(category_id) = req.category_id {
            if !tables.categories.iter().any(|c| c.id == category_id) {
                return Err(RepoError::NotFound);
            }
        }
        let course = tables
            .courses
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(RepoError::NotFound)?;
        if let Some(title) = req.title {
            course.title = title;
        }
        if let Some(description) = req.description {
            course.description = description;
        }
        if let Some(price) = req.price {
            course.price = price;
        }
        if let Some(category_id) = req.category_id {
            course.category_id = category_id;
        }
        if let Some(thumbnail) = req.thumbnail_key {
            course.thumbnail = Some(thumbnail);
        }
        course.updated_at = Utc::now();
        Ok(course.clone())
    }

    async fn delete_course(&self, id: Uuid) -> bool {
        let mut tables = self.tables.write().await;
        if !tables.courses.iter().any(|c| c.id == id) {
            return false;
        }
        tables.remove_courses(&[id]);
        true
    }

    async fn recompute_average_rating(&self, course_id: Uuid) -> Result<f64, RepoError> {
        self.tables
            .write()
            .await
            .refresh_rating(course_id)
            .ok_or(RepoError::NotFound)
    }

    // --- LESSONS ---

    async fn list_lessons(&self, filter: &LessonFilter) -> Vec<Lesson> {
        let tables = self.tables.read().await;
        let search = search_term(filter.search.as_deref());

        let mut lessons: Vec<Lesson> = tables
            .lessons
            .iter()
            .filter(|l| filter.course.is_none_or(|course| l.course_id == course))
            .filter(|l| search.is_none_or(|term| contains_ci(&l.title, term)))
            .cloned()
            .collect();

        let order = Ordering::parse(filter.ordering.as_deref(), LESSON_ORDERINGS).unwrap_or(Ordering {
            key: "order",
            descending: false,
        });
        lessons.sort_by(|a, b| match order.key {
            "title" => a.title.cmp(&b.title),
            _ => a.order.cmp(&b.order),
        });
        if order.descending {
            lessons.reverse();
        }
        lessons
    }

    async fn get_lesson(&self, id: Uuid) -> Option<Lesson> {
        self.tables.read().await.lessons.iter().find(|l| l.id == id).cloned()
    }

    async fn create_lesson(&self, req: CreateLessonRequest) -> Result<Lesson, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.courses.iter().any(|c| c.id == req.course_id) {
            return Err(RepoError::NotFound);
        }
        let lesson = Lesson {
            id: Uuid::new_v4(),
            course_id: req.course_id,
            title: req.title,
            order: req.order,
        };
        tables.lessons.push(lesson.clone());
        Ok(lesson)
    }

    async fn update_lesson(&self, id: Uuid, req: UpdateLessonRequest) -> Result<Lesson, RepoError> {
        let mut tables = self.tables.write().await;
        let lesson = tables
            .lessons
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(RepoError::NotFound)?;
        if let Some(title) = req.title {
            lesson.title = title;
        }
        if let Some(order) = req.order {
            lesson.order = order;
        }
        Ok(lesson.clone())
    }

    async fn delete_lesson(&self, id: Uuid) -> bool {
        let mut tables = self.tables.write().await;
        if !tables.lessons.iter().any(|l| l.id == id) {
            return false;
        }
        tables.remove_lessons(&[id]);
        true
    }

    // --- CONTENTS ---

    async fn list_contents(&self, filter: &ContentFilter) -> Vec<Content> {
        let tables = self.tables.read().await;
        let mut contents: Vec<Content> = tables
            .contents
            .iter()
            .filter(|c| filter.lesson.is_none_or(|lesson| c.lesson_id == lesson))
            .cloned()
            .collect();
        contents.sort_by(|a, b| a.lesson_id.cmp(&b.lesson_id).then(a.order.cmp(&b.order)));
        contents
    }

    async fn list_course_contents(&self, course_id: Uuid) -> Vec<Content> {
        let tables = self.tables.read().await;
        let mut lessons: Vec<&Lesson> = tables.lessons.iter().filter(|l| l.course_id == course_id).collect();
        lessons.sort_by_key(|l| l.order);

        lessons
            .into_iter()
            .flat_map(|lesson| {
                let mut contents: Vec<Content> = tables
                    .contents
                    .iter()
                    .filter(|c| c.lesson_id == lesson.id)
                    .cloned()
                    .collect();
                contents.sort_by_key(|c| c.order);
                contents
            })
            .collect()
    }

    async fn list_quizzes(&self) -> Vec<Content> {
        let tables = self.tables.read().await;
        let mut quizzes: Vec<Content> = tables
            .contents
            .iter()
            .filter(|c| c.kind() == ContentKind::Quiz)
            .cloned()
            .collect();
        quizzes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        quizzes
    }

    async fn get_content(&self, id: Uuid) -> Option<Content> {
        self.tables.read().await.contents.iter().find(|c| c.id == id).cloned()
    }

    async fn create_content(&self, req: CreateContentRequest) -> Result<Content, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.lessons.iter().any(|l| l.id == req.lesson_id) {
            return Err(RepoError::NotFound);
        }
        let content = Content {
            id: Uuid::new_v4(),
            lesson_id: req.lesson_id,
            order: req.order,
            body: req.body,
            created_at: Utc::now(),
        };
        tables.contents.push(content.clone());
        Ok(content)
    }

    async fn update_content(&self, id: Uuid, req: UpdateContentRequest) -> Result<Content, RepoError> {
        let mut tables = self.tables.write().await;
        let content = tables
            .contents
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(RepoError::NotFound)?;
        if let Some(order) = req.order {
            content.order = order;
        }
        if let Some(body) = req.body {
            content.body = body;
        }
        Ok(content.clone())
    }

    async fn delete_content(&self, id: Uuid) -> bool {
        let mut tables = self.tables.write().await;
        if !tables.contents.iter().any(|c| c.id == id) {
            return false;
        }
        tables.remove_contents(&[id]);
        true
    }

    // --- ENROLLMENTS ---

    async fn list_enrollments(&self, filter: &EnrollmentFilter, scope: EnrollmentScope) -> Vec<Enrollment> {
        let tables = self.tables.read().await;
        let search = search_term(filter.search.as_deref());
        let course_of = |id: Uuid| tables.courses.iter().find(|c| c.id == id);

        let mut enrollments: Vec<Enrollment> = tables
            .enrollments
            .iter()
            .filter(|e| match scope {
                EnrollmentScope::All => true,
                EnrollmentScope::Student(student_id) => e.student_id == student_id,
                EnrollmentScope::Instructor(instructor_id) => {
                    course_of(e.course_id).is_some_and(|c| c.instructor_id == instructor_id)
                }
            })
            .filter(|e| filter.course.is_none_or(|course| e.course_id == course))
            .filter(|e| {
                search.is_none_or(|term| {
                    let username_hit = tables
                        .users
                        .iter()
                        .find(|u| u.id == e.student_id)
                        .is_some_and(|u| contains_ci(&u.username, term));
                    let title_hit = course_of(e.course_id).is_some_and(|c| contains_ci(&c.title, term));
                    username_hit || title_hit
                })
            })
            .cloned()
            .collect();

        let descending = Ordering::parse(filter.ordering.as_deref(), ENROLLMENT_ORDERINGS)
            .map(|o| o.descending)
            .unwrap_or(true);
        enrollments.sort_by(|a, b| a.enrolled_at.cmp(&b.enrolled_at));
        if descending {
            enrollments.reverse();
        }
        enrollments
    }

    async fn get_enrollment(&self, id: Uuid) -> Option<Enrollment> {
        self.tables.read().await.enrollments.iter().find(|e| e.id == id).cloned()
    }

    async fn find_enrollment(&self, student_id: Uuid, course_id: Uuid) -> Option<Enrollment> {
        self.tables
            .read()
            .await
            .enrollments
            .iter()
            .find(|e| e.student_id == student_id && e.course_id == course_id)
            .cloned()
    }

    async fn create_enrollment(&self, student_id: Uuid, course_id: Uuid) -> Result<Enrollment, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.courses.iter().any(|c| c.id == course_id) || !tables.users.iter().any(|u| u.id == student_id) {
            return Err(RepoError::NotFound);
        }
        if tables
            .enrollments
            .iter()
            .any(|e| e.student_id == student_id && e.course_id == course_id)
        {
            return Err(RepoError::Conflict(
                "student is already enrolled in this course".to_string(),
            ));
        }
        let enrollment = Enrollment {
            id: Uuid::new_v4(),
            student_id,
            course_id,
            enrolled_at: Utc::now(),
            is_active: true,
            completed: false,
            grade: None,
        };
        tables.enrollments.push(enrollment.clone());
        Ok(enrollment)
    }

    async fn update_enrollment(&self, id: Uuid, req: UpdateEnrollmentRequest) -> Result<Enrollment, RepoError> {
        let mut tables = self.tables.write().await;
        let enrollment = tables
            .enrollments
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(RepoError::NotFound)?;
        if let Some(is_active) = req.is_active {
            enrollment.is_active = is_active;
        }
        if let Some(completed) = req.completed {
            enrollment.completed = completed;
        }
        Ok(enrollment.clone())
    }

    async fn set_grade(&self, id: Uuid, grade: LetterGrade) -> Result<Enrollment, RepoError> {
        let mut tables = self.tables.write().await;
        let enrollment = tables
            .enrollments
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(RepoError::NotFound)?;
        enrollment.grade = Some(grade);
        Ok(enrollment.clone())
    }

    async fn delete_enrollment(&self, id: Uuid) -> bool {
        let mut tables = self.tables.write().await;
        let before = tables.enrollments.len();
        tables.enrollments.retain(|e| e.id != id);
        tables.enrollments.len() < before
    }

    // --- REVIEWS ---

    async fn list_reviews(&self, filter: &ReviewFilter) -> Vec<Review> {
        let tables = self.tables.read().await;
        let mut reviews: Vec<Review> = tables
            .reviews
            .iter()
            .filter(|r| filter.course.is_none_or(|course| r.course_id == course))
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        reviews
    }

    async fn get_review(&self, id: Uuid) -> Option<Review> {
        self.tables.read().await.reviews.iter().find(|r| r.id == id).cloned()
    }

    async fn create_review(&self, student_id: Uuid, req: CreateReviewRequest) -> Result<Review, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.courses.iter().any(|c| c.id == req.course_id) {
            return Err(RepoError::NotFound);
        }
        if tables
            .reviews
            .iter()
            .any(|r| r.student_id == student_id && r.course_id == req.course_id)
        {
            return Err(RepoError::Conflict("you have already reviewed this course".to_string()));
        }
        let review = Review {
            id: Uuid::new_v4(),
            student_id,
            course_id: req.course_id,
            rating: req.rating,
            comment: req.comment,
            created_at: Utc::now(),
        };
        tables.reviews.push(review.clone());
        Ok(review)
    }

    async fn update_review(&self, id: Uuid, req: UpdateReviewRequest) -> Result<Review, RepoError> {
        let mut tables = self.tables.write().await;
        let review = tables
            .reviews
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(RepoError::NotFound)?;
        if let Some(rating) = req.rating {
            review.rating = rating;
        }
        if let Some(comment) = req.comment {
            review.comment = comment;
        }
        Ok(review.clone())
    }

    async fn delete_review(&self, id: Uuid) -> bool {
        let mut tables = self.tables.write().await;
        let before = tables.reviews.len();
        tables.reviews.retain(|r| r.id != id);
        tables.reviews.len() < before
    }

    // --- PROGRESS ---

    async fn mark_content_complete(&self, student_id: Uuid, content_id: Uuid) -> Result<ContentProgress, RepoError> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables
            .progress
            .iter()
            .find(|p| p.student_id == student_id && p.content_id == content_id)
        {
            return Ok(existing.clone());
        }
        if !tables.contents.iter().any(|c| c.id == content_id) {
            return Err(RepoError::NotFound);
        }
        let record = ContentProgress {
            id: Uuid::new_v4(),
            student_id,
            content_id,
            completed_at: Utc::now(),
        };
        tables.progress.push(record.clone());
        Ok(record)
    }

    async fn count_course_contents(&self, course_id: Uuid) -> i64 {
        self.tables.read().await.course_content_ids(course_id).len() as i64
    }

    async fn count_completed_contents(&self, student_id: Uuid, course_id: Uuid) -> i64 {
        self.tables.read().await.completed_in_course(student_id, course_id)
    }

    async fn completion_counts(&self, course_id: Uuid) -> Vec<i64> {
        let tables = self.tables.read().await;
        tables
            .enrollments
            .iter()
            .filter(|e| e.course_id == course_id && e.is_active)
            .map(|e| tables.completed_in_course(e.student_id, course_id))
            .collect()
    }

    // --- QUIZ SUBMISSIONS ---

    async fn find_submission(&self, student_id: Uuid, content_id: Uuid) -> Option<QuizSubmission> {
        self.tables
            .read()
            .await
            .submissions
            .iter()
            .find(|s| s.student_id == student_id && s.content_id == content_id)
            .cloned()
    }

    async fn create_submission(
        &self,
        student_id: Uuid,
        content_id: Uuid,
        answers: HashMap<String, String>,
        score: f64,
    ) -> Result<QuizSubmission, RepoError> {
        let mut tables = self.tables.write().await;
        if tables
            .submissions
            .iter()
            .any(|s| s.student_id == student_id && s.content_id == content_id)
        {
            return Err(RepoError::Conflict("quiz already submitted".to_string()));
        }
        let submission = QuizSubmission {
            id: Uuid::new_v4(),
            student_id,
            content_id,
            answers,
            score,
            submitted_at: Utc::now(),
        };
        tables.submissions.push(submission.clone());
        Ok(submission)
    }
}
