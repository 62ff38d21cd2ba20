//! Derived numbers computed from persisted relations: course ratings, completion
//! percentages and quiz scores. All functions are pure; callers fetch the inputs.

use std::collections::HashMap;

use crate::models::QuizPayload;

/// Rounds half away from zero to `places` decimal digits.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Arithmetic mean of the ratings, one decimal place. No ratings yields `0.0`.
pub fn average_rating(ratings: &[i32]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let sum: i64 = ratings.iter().map(|&r| i64::from(r)).sum();
    round_to(sum as f64 / ratings.len() as f64, 1)
}

/// `completed / total * 100`, two decimal places. A course without contents is at `0.0`.
pub fn completion_percentage(completed: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    round_to(completed as f64 / total as f64 * 100.0, 2)
}

/// Fraction of students whose completed-content count reaches `total_contents`.
///
/// `completed_counts` holds one entry per actively enrolled student. Returns `0.0` when
/// there are no students or no contents.
pub fn completion_rate(completed_counts: &[i64], total_contents: i64) -> f64 {
    if completed_counts.is_empty() || total_contents <= 0 {
        return 0.0;
    }
    let finished = completed_counts
        .iter()
        .filter(|&&count| count >= total_contents)
        .count();
    round_to(finished as f64 / completed_counts.len() as f64, 2)
}

/// Percentage of questions whose stored answer matches the submitted one for the same
/// index (`"0"`, `"1"`, ...), two decimal places. A quiz without questions scores `0.0`.
pub fn quiz_score(quiz: &QuizPayload, answers: &HashMap<String, String>) -> f64 {
    if quiz.questions.is_empty() {
        return 0.0;
    }
    let correct = quiz
        .questions
        .iter()
        .enumerate()
        .filter(|(index, question)| {
            answers
                .get(&index.to_string())
                .is_some_and(|given| *given == question.answer)
        })
        .count();
    round_to(correct as f64 / quiz.questions.len() as f64 * 100.0, 2)
}
