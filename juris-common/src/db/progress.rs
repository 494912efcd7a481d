//! Per-article progress store
//!
//! Reads feed the progression evaluator through [`ProgressSnapshot`]; writes
//! apply one attempt as a single transaction over the progress row and the
//! user's lives/XP.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use std::collections::HashSet;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::EconomySettings;
use crate::phases::{ArticleId, LawId, ProgressSnapshot};
use crate::progress::{apply_attempt, life_after_attempt, ArticleProgress, AttemptInput};
use crate::time::parse_timestamp;
use crate::{Error, Result};

/// Result of recording one attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttemptOutcome {
    pub progress: ArticleProgress,
    pub life_lost: bool,
    pub lives_remaining: i64,
    pub has_unlimited_lives: bool,
    pub xp_gained: i64,
}

fn progress_from_row(row: &SqliteRow) -> Result<ArticleProgress> {
    let completed_at: Option<String> = row.get("completed_at");
    let updated_at: String = row.get("updated_at");

    Ok(ArticleProgress {
        article_id: row.get("article_id"),
        correct_answers: row.get("correct_answers"),
        total_answers: row.get("total_answers"),
        percentage: row.get("percentage"),
        attempts: row.get("attempts"),
        best_score: row.get("best_score"),
        is_completed: row.get::<i64, _>("is_completed") != 0,
        completed_at: completed_at.as_deref().map(parse_timestamp).transpose()?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

const PROGRESS_COLUMNS: &str = "article_id, correct_answers, total_answers, percentage, \
     attempts, best_score, is_completed, completed_at, updated_at";

/// Progress of `user` for the given articles
///
/// Articles without a record are simply absent from the snapshot.
pub async fn load_progress(
    pool: &SqlitePool,
    user: Uuid,
    article_ids: &[ArticleId],
) -> Result<ProgressSnapshot> {
    let wanted: HashSet<ArticleId> = article_ids.iter().copied().collect();

    let rows: Vec<(ArticleId, f64)> = sqlx::query_as(
        "SELECT article_id, percentage FROM user_article_progress WHERE user_guid = ?",
    )
    .bind(user.to_string())
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .filter(|(article_id, _)| wanted.contains(article_id))
        .collect())
}

/// Full progress record of one article
pub async fn get_progress(
    pool: &SqlitePool,
    user: Uuid,
    article_id: ArticleId,
) -> Result<Option<ArticleProgress>> {
    let sql = format!(
        "SELECT {} FROM user_article_progress WHERE user_guid = ? AND article_id = ?",
        PROGRESS_COLUMNS
    );

    let row = sqlx::query(&sql)
        .bind(user.to_string())
        .bind(article_id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(progress_from_row).transpose()
}

async fn load_progress_for_update(
    tx: &mut Transaction<'_, Sqlite>,
    user: Uuid,
    article_id: ArticleId,
) -> Result<Option<ArticleProgress>> {
    let sql = format!(
        "SELECT {} FROM user_article_progress WHERE user_guid = ? AND article_id = ?",
        PROGRESS_COLUMNS
    );

    let row = sqlx::query(&sql)
        .bind(user.to_string())
        .bind(article_id)
        .fetch_optional(&mut **tx)
        .await?;

    row.as_ref().map(progress_from_row).transpose()
}

/// Record one attempt of `user` on `article_id`
///
/// Validation happens before anything is written. The progress row and the
/// user's lives/XP are updated in one transaction that takes the write lock
/// up front, so concurrent attempts of the same user serialize.
pub async fn record_attempt(
    pool: &SqlitePool,
    user: Uuid,
    article_id: ArticleId,
    input: AttemptInput,
    economy: &EconomySettings,
    now: DateTime<Utc>,
) -> Result<AttemptOutcome> {
    input.validate()?;

    let mut tx = pool.begin().await?;

    // Write first: the transaction must hold the write lock before reading
    let (lives, has_unlimited_lives): (i64, i64) = sqlx::query_as(
        "UPDATE users SET updated_at = ? WHERE guid = ? RETURNING lives, has_unlimited_lives",
    )
    .bind(now.to_rfc3339())
    .bind(user.to_string())
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| Error::NotFound(format!("User {} does not exist", user)))?;
    let has_unlimited_lives = has_unlimited_lives != 0;

    let (article_active, law_active): (i64, i64) = sqlx::query_as(
        r#"
        SELECT a.is_active, l.is_active
        FROM articles a
        JOIN laws l ON l.id = a.law_id
        WHERE a.id = ?
        "#,
    )
    .bind(article_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| Error::NotFound(format!("Article {} does not exist", article_id)))?;

    if article_active == 0 || law_active == 0 {
        return Err(Error::Validation(format!(
            "Article {} is not available for practice",
            article_id
        )));
    }

    let previous = load_progress_for_update(&mut tx, user, article_id).await?;
    let progress = apply_attempt(previous, article_id, input, now);

    sqlx::query(
        r#"
        INSERT INTO user_article_progress (
            user_guid, article_id, correct_answers, total_answers, percentage,
            attempts, best_score, is_completed, completed_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(user_guid, article_id) DO UPDATE SET
            correct_answers = excluded.correct_answers,
            total_answers = excluded.total_answers,
            percentage = excluded.percentage,
            attempts = excluded.attempts,
            best_score = excluded.best_score,
            is_completed = excluded.is_completed,
            completed_at = excluded.completed_at,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(user.to_string())
    .bind(article_id)
    .bind(progress.correct_answers)
    .bind(progress.total_answers)
    .bind(progress.percentage)
    .bind(progress.attempts)
    .bind(progress.best_score)
    .bind(progress.is_completed as i64)
    .bind(progress.completed_at.map(|dt| dt.to_rfc3339()))
    .bind(progress.updated_at.to_rfc3339())
    .execute(&mut *tx)
    .await?;

    let new_lives = life_after_attempt(progress.percentage, has_unlimited_lives, lives);
    let lives_remaining = new_lives.unwrap_or(lives);
    let xp_gained = input.correct_answers * economy.xp_per_correct_answer;

    sqlx::query("UPDATE users SET lives = ?, xp = xp + ?, updated_at = ? WHERE guid = ?")
        .bind(lives_remaining)
        .bind(xp_gained)
        .bind(now.to_rfc3339())
        .bind(user.to_string())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    debug!(
        "Recorded attempt {} for user {} on article {}: {:.2}%",
        progress.attempts, user, article_id, progress.percentage
    );
    if new_lives.is_some() {
        info!("User {} lost a life ({} remaining)", user, lives_remaining);
    }

    Ok(AttemptOutcome {
        progress,
        life_lost: new_lives.is_some(),
        lives_remaining,
        has_unlimited_lives,
        xp_gained,
    })
}

/// Delete a user's progress on every article of one law
///
/// Explicit reset is the only way a completed phase becomes incomplete
/// again. Returns the number of records removed.
pub async fn reset_law_progress(pool: &SqlitePool, user: Uuid, law_id: LawId) -> Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM user_article_progress
        WHERE user_guid = ?
          AND article_id IN (SELECT id FROM articles WHERE law_id = ?)
        "#,
    )
    .bind(user.to_string())
    .bind(law_id)
    .execute(pool)
    .await?;

    info!(
        "Reset {} progress records of law {} for user {}",
        result.rows_affected(),
        law_id,
        user
    );

    Ok(result.rows_affected())
}
