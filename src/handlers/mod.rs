//! HTTP handlers, grouped by resource.
//!
//! Every handler follows the same shape: load the target resource and whichever
//! enrollment or submission facts the rule needs, ask `crate::policy`, then act.

use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    AppState,
    auth::AuthUser,
    error::{ApiError, ApiResult},
    models::{Content, ContentKind, Course, Enrollment, Lesson},
    policy,
};

pub(crate) use display::DisplayNames;

pub mod accounts;
pub mod admin;
pub mod categories;
pub mod contents;
pub mod courses;
mod display;
pub mod enrollments;
pub mod lessons;
pub mod progress;
pub mod quizzes;
pub mod reviews;
pub mod uploads;

pub(crate) async fn load_course(state: &AppState, id: Uuid) -> ApiResult<Course> {
    state.repo.get_course(id).await.ok_or(ApiError::NotFound)
}

/// Resolves a lesson together with the course that owns it.
pub(crate) async fn load_lesson(state: &AppState, id: Uuid) -> ApiResult<(Lesson, Course)> {
    let lesson = state.repo.get_lesson(id).await.ok_or(ApiError::NotFound)?;
    let course = load_course(state, lesson.course_id).await?;
    Ok((lesson, course))
}

/// Resolves a content item together with the course owning its lesson.
pub(crate) async fn load_content(state: &AppState, id: Uuid) -> ApiResult<(Content, Course)> {
    let content = state.repo.get_content(id).await.ok_or(ApiError::NotFound)?;
    let (_, course) = load_lesson(state, content.lesson_id).await?;
    Ok((content, course))
}

/// The caller's own enrollment in `course`, if any.
pub(crate) async fn enrollment_in(state: &AppState, user: &AuthUser, course: &Course) -> Option<Enrollment> {
    state.repo.find_enrollment(user.id, course.id).await
}

/// gate_content
///
/// Applies the read rules of a content item: quizzes need `can_access_quiz`, and their
/// stored answers are stripped unless the caller owns the course.
pub(crate) fn gate_content(
    user: &AuthUser,
    content: Content,
    course: &Course,
    enrollment: Option<&Enrollment>,
) -> ApiResult<Content> {
    if content.kind() != ContentKind::Quiz {
        return Ok(content);
    }
    policy::can_access_quiz(Some(user), enrollment).into_result()?;
    if policy::can_view_quiz_answers(Some(user), course).is_allowed() {
        Ok(content)
    } else {
        Ok(content.redacted())
    }
}

/// Filters a listing down to what the caller may read, resolving each lesson's course once.
pub(crate) async fn visible_contents(state: &AppState, user: &AuthUser, contents: Vec<Content>) -> Vec<Content> {
    let mut lessons: HashMap<Uuid, Option<(Course, Option<Enrollment>)>> = HashMap::new();
    let mut visible = Vec::with_capacity(contents.len());

    for content in contents {
        if !lessons.contains_key(&content.lesson_id) {
            let context = match load_lesson(state, content.lesson_id).await {
                Ok((_, course)) => {
                    let enrollment = enrollment_in(state, user, &course).await;
                    Some((course, enrollment))
                }
                Err(_) => None,
            };
            lessons.insert(content.lesson_id, context);
        }

        let Some(Some((course, enrollment))) = lessons.get(&content.lesson_id) else {
            continue;
        };
        if let Ok(content) = gate_content(user, content, course, enrollment.as_ref()) {
            visible.push(content);
        }
    }
    visible
}
