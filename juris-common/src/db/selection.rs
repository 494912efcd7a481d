//! User law selection

use sqlx::SqlitePool;
use std::collections::HashSet;
use uuid::Uuid;

use super::users::require_user;
use crate::phases::LawId;
use crate::{Error, Result};

/// Selected law ids in study order (empty when the user never chose)
pub async fn get_law_selection(pool: &SqlitePool, user: Uuid) -> Result<Vec<LawId>> {
    let ids = sqlx::query_scalar(
        "SELECT law_id FROM user_law_selections WHERE user_guid = ? ORDER BY position ASC",
    )
    .bind(user.to_string())
    .fetch_all(pool)
    .await?;

    Ok(ids)
}

/// Replace the user's selection
///
/// Duplicates keep their first position. Every id must name an active law.
/// An empty list clears the selection, falling back to all active laws.
pub async fn set_law_selection(pool: &SqlitePool, user: Uuid, law_ids: &[LawId]) -> Result<Vec<LawId>> {
    require_user(pool, user).await?;

    let mut seen = HashSet::new();
    let ordered: Vec<LawId> = law_ids
        .iter()
        .copied()
        .filter(|law_id| seen.insert(*law_id))
        .collect();

    let mut tx = pool.begin().await?;

    // Write first: the transaction must hold the write lock before reading
    sqlx::query("DELETE FROM user_law_selections WHERE user_guid = ?")
        .bind(user.to_string())
        .execute(&mut *tx)
        .await?;

    for law_id in &ordered {
        let active: Option<i64> = sqlx::query_scalar("SELECT is_active FROM laws WHERE id = ?")
            .bind(law_id)
            .fetch_optional(&mut *tx)
            .await?;

        match active {
            None => return Err(Error::Validation(format!("Law {} does not exist", law_id))),
            Some(0) => return Err(Error::Validation(format!("Law {} is not active", law_id))),
            Some(_) => {}
        }
    }

    for (position, law_id) in ordered.iter().enumerate() {
        sqlx::query("INSERT INTO user_law_selections (user_guid, law_id, position) VALUES (?, ?, ?)")
            .bind(user.to_string())
            .bind(law_id)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    Ok(ordered)
}
