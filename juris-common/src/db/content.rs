//! Law and article writes
//!
//! Content is authored by an external admin tool. These helpers cover bulk
//! imports and test fixtures; the progression engine only reads content.

use sqlx::SqlitePool;

use crate::phases::{ArticleId, LawId};
use crate::{Error, Result};

/// Article to insert
#[derive(Debug, Clone)]
pub struct NewArticle<'a> {
    pub law_id: LawId,
    pub label: &'a str,
    pub position: Option<i64>,
    pub difficulty: i64,
    pub payload: &'a str,
}

impl<'a> NewArticle<'a> {
    pub fn new(law_id: LawId, label: &'a str) -> Self {
        Self {
            law_id,
            label,
            position: None,
            difficulty: 1,
            payload: "{}",
        }
    }
}

pub async fn insert_law(pool: &SqlitePool, name: &str, position: i64) -> Result<LawId> {
    let result = sqlx::query("INSERT INTO laws (name, position) VALUES (?, ?)")
        .bind(name)
        .bind(position)
        .execute(pool)
        .await?;

    Ok(result.last_insert_rowid())
}

pub async fn insert_article(pool: &SqlitePool, article: &NewArticle<'_>) -> Result<ArticleId> {
    if !(1..=5).contains(&article.difficulty) {
        return Err(Error::Validation(format!(
            "difficulty must be between 1 and 5, got {}",
            article.difficulty
        )));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO articles (law_id, label, position, difficulty, payload)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(article.law_id)
    .bind(article.label)
    .bind(article.position)
    .bind(article.difficulty)
    .bind(article.payload)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

pub async fn set_law_active(pool: &SqlitePool, law_id: LawId, active: bool) -> Result<()> {
    let result = sqlx::query("UPDATE laws SET is_active = ? WHERE id = ?")
        .bind(active as i64)
        .bind(law_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Law {} does not exist", law_id)));
    }

    Ok(())
}

pub async fn set_article_active(pool: &SqlitePool, article_id: ArticleId, active: bool) -> Result<()> {
    let result = sqlx::query("UPDATE articles SET is_active = ? WHERE id = ?")
        .bind(active as i64)
        .bind(article_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Article {} does not exist", article_id)));
    }

    Ok(())
}
