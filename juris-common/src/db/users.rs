//! User economy read model
//!
//! Accounts are created by the authentication collaborator and the
//! unlimited-lives entitlement is written by the subscription collaborator;
//! this module only reads and adjusts lives/XP.

use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::time::now;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub guid: Uuid,
    pub username: String,
    pub lives: i64,
    pub max_lives: i64,
    pub xp: i64,
    pub has_unlimited_lives: bool,
}

/// Load a user, `None` when the guid is unknown
pub async fn get_user(pool: &SqlitePool, guid: Uuid) -> Result<Option<User>> {
    let row = sqlx::query(
        r#"
        SELECT guid, username, lives, max_lives, xp, has_unlimited_lives
        FROM users
        WHERE guid = ?
        "#,
    )
    .bind(guid.to_string())
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| User {
        guid,
        username: row.get("username"),
        lives: row.get("lives"),
        max_lives: row.get("max_lives"),
        xp: row.get("xp"),
        has_unlimited_lives: row.get::<i64, _>("has_unlimited_lives") != 0,
    }))
}

/// Load a user or fail with `NotFound`
pub async fn require_user(pool: &SqlitePool, guid: Uuid) -> Result<User> {
    get_user(pool, guid)
        .await?
        .ok_or_else(|| Error::NotFound(format!("User {} does not exist", guid)))
}

/// Create a user with full lives
pub async fn create_user(pool: &SqlitePool, username: &str, lives: i64) -> Result<Uuid> {
    let guid = Uuid::new_v4();
    let created_at = now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO users (guid, username, lives, max_lives, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(guid.to_string())
    .bind(username)
    .bind(lives)
    .bind(lives)
    .bind(created_at.clone())
    .bind(created_at)
    .execute(pool)
    .await?;

    Ok(guid)
}

/// Record the subscription entitlement for unlimited lives
pub async fn set_unlimited_lives(pool: &SqlitePool, guid: Uuid, unlimited: bool) -> Result<()> {
    let result = sqlx::query(
        "UPDATE users SET has_unlimited_lives = ?, updated_at = ? WHERE guid = ?",
    )
    .bind(unlimited as i64)
    .bind(now().to_rfc3339())
    .bind(guid.to_string())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("User {} does not exist", guid)));
    }

    Ok(())
}
