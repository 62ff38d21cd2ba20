//! Access policy evaluation.
//!
//! Every function in this module is a pure decision over an actor and a snapshot of the
//! target resource (plus whichever enrollment or submission facts the rule depends on).
//! Handlers load those snapshots from the repository, ask the evaluator, and only then
//! perform the action. A denial is an ordinary return value carrying a stable reason code.
//!
//! The actor is `Option<&AuthUser>`: `None` is an anonymous caller.

use axum::http::Method;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    models::{Course, Enrollment, QuizSubmission, Review, Role},
};

/// Access
///
/// The kind of operation being attempted. Safe HTTP verbs are reads, everything else is a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

impl Access {
    pub fn from_method(method: &Method) -> Self {
        match *method {
            Method::GET | Method::HEAD | Method::OPTIONS => Access::Read,
            _ => Access::Write,
        }
    }
}

/// DenyReason
///
/// Stable reason codes attached to every denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    #[error("authentication credentials were not provided")]
    NotAuthenticated,
    #[error("your role does not permit this action")]
    WrongRole,
    #[error("only the owner of this resource may perform this action")]
    NotOwner,
    #[error("an enrollment in this course is required")]
    NotEnrolled,
    #[error("this quiz has already been submitted")]
    AlreadySubmitted,
}

impl DenyReason {
    pub fn code(&self) -> &'static str {
        match self {
            DenyReason::NotAuthenticated => "not_authenticated",
            DenyReason::WrongRole => "wrong_role",
            DenyReason::NotOwner => "not_owner",
            DenyReason::NotEnrolled => "not_enrolled",
            DenyReason::AlreadySubmitted => "already_submitted",
        }
    }
}

/// Decision
///
/// Outcome of a policy check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn reason(&self) -> Option<DenyReason> {
        match self {
            Decision::Allow => None,
            Decision::Deny(reason) => Some(*reason),
        }
    }

    /// Converts the decision into a `Result` so handlers can short-circuit with `?`.
    pub fn into_result(self) -> Result<(), DenyReason> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(reason),
        }
    }
}

impl From<Result<(), DenyReason>> for Decision {
    fn from(result: Result<(), DenyReason>) -> Self {
        match result {
            Ok(()) => Decision::Allow,
            Err(reason) => Decision::Deny(reason),
        }
    }
}

// --- Building blocks ---

fn require_user(actor: Option<&AuthUser>) -> Result<&AuthUser, DenyReason> {
    actor.ok_or(DenyReason::NotAuthenticated)
}

fn require_role(user: &AuthUser, role: Role) -> Result<(), DenyReason> {
    if user.role == role {
        Ok(())
    } else {
        Err(DenyReason::WrongRole)
    }
}

fn require_owner(user: &AuthUser, owner_id: Uuid) -> Result<(), DenyReason> {
    if user.id == owner_id {
        Ok(())
    } else {
        Err(DenyReason::NotOwner)
    }
}

/// An enrollment only counts when it belongs to the acting student.
fn enrollment_of<'a>(user: &AuthUser, enrollment: Option<&'a Enrollment>) -> Option<&'a Enrollment> {
    enrollment.filter(|e| e.student_id == user.id)
}

fn require_active_enrollment(user: &AuthUser, enrollment: Option<&Enrollment>) -> Result<(), DenyReason> {
    match enrollment_of(user, enrollment) {
        Some(e) if e.is_active => Ok(()),
        _ => Err(DenyReason::NotEnrolled),
    }
}

/// Read for everyone, write for the instructor owning the course. Shared by courses,
/// lessons and lesson contents since all three are owned through the course.
fn owner_or_read_only(actor: Option<&AuthUser>, access: Access, course: &Course) -> Result<(), DenyReason> {
    if access == Access::Read {
        return Ok(());
    }
    let user = require_user(actor)?;
    require_owner(user, course.instructor_id)
}

fn owning_instructor(actor: Option<&AuthUser>, course: &Course) -> Result<(), DenyReason> {
    let user = require_user(actor)?;
    require_role(user, Role::Instructor)?;
    require_owner(user, course.instructor_id)
}

// --- Courses & lessons ---

pub fn can_modify_course(actor: Option<&AuthUser>, access: Access, course: &Course) -> Decision {
    owner_or_read_only(actor, access, course).into()
}

pub fn can_create_course(actor: Option<&AuthUser>) -> Decision {
    require_user(actor)
        .and_then(|user| require_role(user, Role::Instructor))
        .into()
}

/// `course` is the course owning the lesson (or the lesson owning the content).
pub fn can_modify_lesson(actor: Option<&AuthUser>, access: Access, course: &Course) -> Decision {
    owner_or_read_only(actor, access, course).into()
}

/// Full course tree (lessons and their contents). Requires a relationship with the course
/// even for reads: the owner, staff, or a student with an active enrollment.
pub fn can_view_course_data(
    actor: Option<&AuthUser>,
    course: &Course,
    enrollment: Option<&Enrollment>,
) -> Decision {
    let check = || -> Result<(), DenyReason> {
        let user = require_user(actor)?;
        if user.id == course.instructor_id || user.is_staff {
            return Ok(());
        }
        match user.role {
            Role::Student => require_active_enrollment(user, enrollment),
            Role::Instructor => Err(DenyReason::NotOwner),
        }
    };
    check().into()
}

pub fn can_view_analytics(actor: Option<&AuthUser>, course: &Course) -> Decision {
    owning_instructor(actor, course).into()
}

// --- Reviews ---

/// Writing a review needs any enrollment row, active or not.
pub fn can_review(actor: Option<&AuthUser>, access: Access, enrollment: Option<&Enrollment>) -> Decision {
    if access == Access::Read {
        return Decision::Allow;
    }
    let check = || -> Result<(), DenyReason> {
        let user = require_user(actor)?;
        require_role(user, Role::Student)?;
        enrollment_of(user, enrollment)
            .map(|_| ())
            .ok_or(DenyReason::NotEnrolled)
    };
    check().into()
}

pub fn can_edit_review(actor: Option<&AuthUser>, access: Access, review: &Review) -> Decision {
    if access == Access::Read {
        return Decision::Allow;
    }
    require_user(actor)
        .and_then(|user| require_owner(user, review.student_id))
        .into()
}

// --- Enrollments ---

pub fn can_self_enroll(actor: Option<&AuthUser>) -> Decision {
    require_user(actor)
        .and_then(|user| require_role(user, Role::Student))
        .into()
}

/// Instructors may list enrollments; mutating one needs ownership of `course`.
pub fn can_manage_enrollment(actor: Option<&AuthUser>, access: Access, course: &Course) -> Decision {
    let check = || -> Result<(), DenyReason> {
        let user = require_user(actor)?;
        require_role(user, Role::Instructor)?;
        match access {
            Access::Read => Ok(()),
            Access::Write => require_owner(user, course.instructor_id),
        }
    };
    check().into()
}

pub fn can_view_enrollment(actor: Option<&AuthUser>, enrollment: &Enrollment, course: &Course) -> Decision {
    let check = || -> Result<(), DenyReason> {
        let user = require_user(actor)?;
        if user.id == enrollment.student_id || user.id == course.instructor_id || user.is_staff {
            Ok(())
        } else {
            Err(DenyReason::NotOwner)
        }
    };
    check().into()
}

pub fn can_assign_grade(actor: Option<&AuthUser>, course: &Course) -> Decision {
    owning_instructor(actor, course).into()
}

// --- Quizzes & progress ---

/// Instructors may always open a quiz; students need an active enrollment in the course
/// owning the quiz's lesson. Applies to reads as well.
pub fn can_access_quiz(actor: Option<&AuthUser>, enrollment: Option<&Enrollment>) -> Decision {
    let check = || -> Result<(), DenyReason> {
        let user = require_user(actor)?;
        match user.role {
            Role::Instructor => Ok(()),
            Role::Student => require_active_enrollment(user, enrollment),
        }
    };
    check().into()
}

/// Only the owning instructor sees the stored answers of a quiz.
pub fn can_view_quiz_answers(actor: Option<&AuthUser>, course: &Course) -> Decision {
    require_user(actor)
        .and_then(|user| require_owner(user, course.instructor_id))
        .into()
}

pub fn can_submit_quiz_once(actor: Option<&AuthUser>, existing: Option<&QuizSubmission>) -> Decision {
    let check = || -> Result<(), DenyReason> {
        let user = require_user(actor)?;
        require_role(user, Role::Student)?;
        match existing {
            Some(prior) if prior.student_id == user.id => Err(DenyReason::AlreadySubmitted),
            _ => Ok(()),
        }
    };
    check().into()
}

pub fn can_complete_content(actor: Option<&AuthUser>, enrollment: Option<&Enrollment>) -> Decision {
    let check = || -> Result<(), DenyReason> {
        let user = require_user(actor)?;
        require_role(user, Role::Student)?;
        require_active_enrollment(user, enrollment)
    };
    check().into()
}

// --- Catalog & administration ---

/// Categories: public reads, staff-only writes.
pub fn can_manage_catalog(actor: Option<&AuthUser>, access: Access) -> Decision {
    if access == Access::Read {
        return Decision::Allow;
    }
    can_administer(actor)
}

pub fn can_administer(actor: Option<&AuthUser>) -> Decision {
    let check = || -> Result<(), DenyReason> {
        let user = require_user(actor)?;
        if user.is_staff {
            Ok(())
        } else {
            Err(DenyReason::WrongRole)
        }
    };
    check().into()
}
