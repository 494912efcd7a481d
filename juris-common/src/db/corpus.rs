//! Article corpus provider
//!
//! Resolves the ordered laws a user studies: the user's explicit selection
//! (in selection order) or, without one, every active law by position.
//! Only active articles of active laws are returned. A selection whose laws
//! are all inactive resolves to nothing rather than to the fallback.

use sqlx::SqlitePool;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use super::selection::get_law_selection;
use super::users::require_user;
use crate::phases::{ArticleId, LawArticles, LawCorpus, LawId};
use crate::{Error, Result};

/// Article ordering row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleOrder {
    pub id: ArticleId,
    pub label: String,
    pub position: Option<i64>,
}

/// Leading number and the remainder of a reference label
///
/// `"Art. 12-A"` parses as `(12, "a")`; labels without digits yield `None`.
fn label_number(label: &str) -> Option<(i64, String)> {
    let start = label.find(|c: char| c.is_ascii_digit())?;
    let digits: String = label[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    let number = digits.parse().ok()?;
    let suffix = label[start + digits.len()..]
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect();
    Some((number, suffix))
}

/// Sort key: explicit position, else the label number, unparsable last
fn order_key(article: &ArticleOrder) -> (u8, i64, String, ArticleId) {
    if let Some(position) = article.position {
        return (0, position, String::new(), article.id);
    }
    match label_number(&article.label) {
        Some((number, suffix)) => (0, number, suffix, article.id),
        None => (1, 0, String::new(), article.id),
    }
}

/// Stable total order of articles within one law
pub fn compare_articles(a: &ArticleOrder, b: &ArticleOrder) -> Ordering {
    order_key(a).cmp(&order_key(b))
}

/// Ordered corpus for a user
///
/// Fails with `NotFound` for unknown users, `NoLawsAvailable` when no active
/// law exists at all and `EmptySelection` when the resolved laws hold no
/// active articles.
pub async fn load_user_corpus(pool: &SqlitePool, user: Uuid) -> Result<LawCorpus> {
    require_user(pool, user).await?;

    let active_laws: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM laws WHERE is_active = 1")
        .fetch_one(pool)
        .await?;
    if active_laws == 0 {
        return Err(Error::NoLawsAvailable);
    }

    let selection = get_law_selection(pool, user).await?;

    let laws: Vec<(LawId, String)> = if selection.is_empty() {
        debug!("User {} has no law selection, using all active laws", user);
        sqlx::query_as("SELECT id, name FROM laws WHERE is_active = 1 ORDER BY position ASC, id ASC")
            .fetch_all(pool)
            .await?
    } else {
        sqlx::query_as(
            r#"
            SELECT l.id, l.name
            FROM user_law_selections s
            JOIN laws l ON l.id = s.law_id
            WHERE s.user_guid = ? AND l.is_active = 1
            ORDER BY s.position ASC, l.id ASC
            "#,
        )
        .bind(user.to_string())
        .fetch_all(pool)
        .await?
    };

    // A saved selection is never replaced by other laws, even when every
    // selected law has been deactivated since
    if laws.is_empty() {
        return Err(Error::EmptySelection);
    }

    let rows: Vec<(ArticleId, LawId, String, Option<i64>)> = sqlx::query_as(
        r#"
        SELECT a.id, a.law_id, a.label, a.position
        FROM articles a
        JOIN laws l ON l.id = a.law_id
        WHERE a.is_active = 1 AND l.is_active = 1
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut by_law: HashMap<LawId, Vec<ArticleOrder>> = HashMap::new();
    for (id, law_id, label, position) in rows {
        by_law
            .entry(law_id)
            .or_default()
            .push(ArticleOrder { id, label, position });
    }

    let corpus = LawCorpus::new(
        laws.into_iter()
            .map(|(law_id, law_name)| {
                let mut articles = by_law.remove(&law_id).unwrap_or_default();
                articles.sort_by(compare_articles);
                LawArticles {
                    law_id,
                    law_name,
                    article_ids: articles.into_iter().map(|a| a.id).collect(),
                }
            })
            .collect(),
    );

    if corpus.total_articles() == 0 {
        return Err(Error::EmptySelection);
    }

    debug!(
        "Loaded corpus for {}: {} laws, {} articles",
        user,
        corpus.laws.len(),
        corpus.total_articles()
    );

    Ok(corpus)
}
