//! Progress attempt arithmetic
//!
//! Pure functions behind progress recording; the database layer in
//! [`crate::db::progress`] wraps them in a transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::phases::ArticleId;
use crate::{Error, Result};

/// Percentage at or above which an article counts as completed
pub const PASS_PERCENTAGE: f64 = 70.0;

/// Persisted progress of one user on one article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleProgress {
    pub article_id: ArticleId,
    /// Correct answers of the latest attempt
    pub correct_answers: i64,
    /// Total answers of the latest attempt
    pub total_answers: i64,
    /// Latest attempt percentage (0-100, two decimals)
    pub percentage: f64,
    pub attempts: i64,
    /// Historical maximum percentage
    pub best_score: f64,
    /// Sticky once the pass threshold was reached
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Answers submitted for one attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptInput {
    pub correct_answers: i64,
    pub total_answers: i64,
}

impl AttemptInput {
    pub fn validate(&self) -> Result<()> {
        if self.total_answers < 1 {
            return Err(Error::Validation(
                "total_answers must be at least 1".to_string(),
            ));
        }
        if self.correct_answers < 0 {
            return Err(Error::Validation(
                "correct_answers cannot be negative".to_string(),
            ));
        }
        if self.correct_answers > self.total_answers {
            return Err(Error::Validation(format!(
                "correct_answers ({}) exceeds total_answers ({})",
                self.correct_answers, self.total_answers
            )));
        }
        Ok(())
    }

    /// round(correct / total * 100, 2)
    pub fn percentage(&self) -> f64 {
        let raw = self.correct_answers as f64 / self.total_answers as f64 * 100.0;
        (raw * 100.0).round() / 100.0
    }

    pub fn is_passing(&self) -> bool {
        self.percentage() >= PASS_PERCENTAGE
    }
}

/// Fold one validated attempt into the previous progress record
pub fn apply_attempt(
    previous: Option<ArticleProgress>,
    article_id: ArticleId,
    input: AttemptInput,
    now: DateTime<Utc>,
) -> ArticleProgress {
    let percentage = input.percentage();
    let passed = percentage >= PASS_PERCENTAGE;

    match previous {
        Some(previous) => {
            let newly_completed = passed && !previous.is_completed;
            ArticleProgress {
                article_id,
                correct_answers: input.correct_answers,
                total_answers: input.total_answers,
                percentage,
                attempts: previous.attempts + 1,
                best_score: previous.best_score.max(percentage),
                is_completed: previous.is_completed || passed,
                completed_at: if newly_completed {
                    Some(now)
                } else {
                    previous.completed_at
                },
                updated_at: now,
            }
        }
        None => ArticleProgress {
            article_id,
            correct_answers: input.correct_answers,
            total_answers: input.total_answers,
            percentage,
            attempts: 1,
            best_score: percentage,
            is_completed: passed,
            completed_at: passed.then_some(now),
            updated_at: now,
        },
    }
}

/// Lives after a failed attempt; `None` when no life is lost
///
/// A life is lost only below the pass threshold, without the unlimited-lives
/// entitlement and while lives remain.
pub fn life_after_attempt(percentage: f64, has_unlimited_lives: bool, lives: i64) -> Option<i64> {
    if percentage < PASS_PERCENTAGE && !has_unlimited_lives && lives > 0 {
        Some((lives - 1).max(0))
    } else {
        None
    }
}
