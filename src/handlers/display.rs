use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    AppState,
    models::{
        Content, ContentDetail, Course, CourseSummary, Enrollment, EnrollmentDetail, Lesson, Review,
        ReviewDetail,
    },
};

/// DisplayNames
///
/// Per-request cache of the names read endpoints attach next to ids, so a listing looks up
/// each user, course, category and lesson once. A dangling id resolves to an empty name.
pub(crate) struct DisplayNames<'a> {
    state: &'a AppState,
    users: HashMap<Uuid, String>,
    categories: HashMap<Uuid, String>,
    courses: HashMap<Uuid, Option<Course>>,
    lessons: HashMap<Uuid, Option<Lesson>>,
}

impl<'a> DisplayNames<'a> {
    pub(crate) fn new(state: &'a AppState) -> Self {
        Self {
            state,
            users: HashMap::new(),
            categories: HashMap::new(),
            courses: HashMap::new(),
            lessons: HashMap::new(),
        }
    }

    async fn username(&mut self, id: Uuid) -> String {
        if let Some(name) = self.users.get(&id) {
            return name.clone();
        }
        let name = self.state.repo.get_user(id).await.map(|u| u.username).unwrap_or_default();
        self.users.insert(id, name.clone());
        name
    }

    async fn category_name(&mut self, id: Uuid) -> String {
        if let Some(name) = self.categories.get(&id) {
            return name.clone();
        }
        let name = self.state.repo.get_category(id).await.map(|c| c.name).unwrap_or_default();
        self.categories.insert(id, name.clone());
        name
    }

    async fn course(&mut self, id: Uuid) -> Option<Course> {
        if let Some(course) = self.courses.get(&id) {
            return course.clone();
        }
        let course = self.state.repo.get_course(id).await;
        self.courses.insert(id, course.clone());
        course
    }

    async fn lesson(&mut self, id: Uuid) -> Option<Lesson> {
        if let Some(lesson) = self.lessons.get(&id) {
            return lesson.clone();
        }
        let lesson = self.state.repo.get_lesson(id).await;
        self.lessons.insert(id, lesson.clone());
        lesson
    }

    async fn course_title(&mut self, id: Uuid) -> String {
        self.course(id).await.map(|c| c.title).unwrap_or_default()
    }

    pub(crate) async fn course_summary(&mut self, course: Course) -> CourseSummary {
        let instructor_name = self.username(course.instructor_id).await;
        let category_name = self.category_name(course.category_id).await;
        CourseSummary {
            course,
            instructor_name,
            category_name,
        }
    }

    pub(crate) async fn review_detail(&mut self, review: Review) -> ReviewDetail {
        let student_name = self.username(review.student_id).await;
        let course = self.course(review.course_id).await;
        ReviewDetail {
            student_name,
            course_name: course.as_ref().map(|c| c.title.clone()).unwrap_or_default(),
            course_average_rating: course.map_or(0.0, |c| c.average_rating),
            review,
        }
    }

    pub(crate) async fn enrollment_detail(&mut self, enrollment: Enrollment) -> EnrollmentDetail {
        let student_name = self.username(enrollment.student_id).await;
        let course_name = self.course_title(enrollment.course_id).await;
        EnrollmentDetail {
            enrollment,
            student_name,
            course_name,
        }
    }

    pub(crate) async fn content_detail(&mut self, content: Content) -> ContentDetail {
        let (lesson_name, course_name) = match self.lesson(content.lesson_id).await {
            Some(lesson) => (lesson.title, self.course_title(lesson.course_id).await),
            None => (String::new(), String::new()),
        };
        ContentDetail {
            content,
            lesson_name,
            course_name,
        }
    }
}
