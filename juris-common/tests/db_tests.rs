//! Integration tests for the SQLite persistence layer
//!
//! Covers schema initialization, the corpus provider, progress recording
//! with the lives/XP economy, law selection and progress resets.

use juris_common::config::{EconomySettings, PhaseSettings};
use juris_common::db::content::{insert_article, insert_law, set_article_active, set_law_active, NewArticle};
use juris_common::db::corpus::load_user_corpus;
use juris_common::db::progress::{get_progress, load_progress, record_attempt, reset_law_progress};
use juris_common::db::selection::{get_law_selection, set_law_selection};
use juris_common::db::users::{create_user, get_user, set_unlimited_lives};
use juris_common::db::init_database;
use juris_common::phases::{build_structure, evaluate, ProgressOracle};
use juris_common::progress::AttemptInput;
use juris_common::time::{now, parse_timestamp};
use juris_common::Error;
use sqlx::SqlitePool;
use tempfile::TempDir;
use uuid::Uuid;

/// Test helper: fresh database in a temporary directory
///
/// The TempDir must stay alive for the duration of the test.
async fn setup_test_db() -> (TempDir, SqlitePool) {
    let temp_dir = TempDir::new().expect("Should create temp dir");
    let db_path = temp_dir.path().join("juris-test.db");
    let pool = init_database(&db_path)
        .await
        .expect("Should initialize database");
    (temp_dir, pool)
}

/// Test helper: law with `count` articles labelled "Art. 1".."Art. n"
async fn seed_law(pool: &SqlitePool, name: &str, position: i64, count: usize) -> (i64, Vec<i64>) {
    let law_id = insert_law(pool, name, position).await.unwrap();
    let mut article_ids = Vec::new();
    for n in 1..=count {
        let label = format!("Art. {}", n);
        let id = insert_article(pool, &NewArticle::new(law_id, &label))
            .await
            .unwrap();
        article_ids.push(id);
    }
    (law_id, article_ids)
}

fn attempt(correct: i64, total: i64) -> AttemptInput {
    AttemptInput {
        correct_answers: correct,
        total_answers: total,
    }
}

// =============================================================================
// Initialization
// =============================================================================

#[tokio::test]
async fn test_database_created_when_missing() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("nested").join("juris.db");

    let pool = init_database(&db_path).await;
    assert!(pool.is_ok(), "Database initialization failed: {:?}", pool.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_reopens_existing() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("juris.db");

    let first = init_database(&db_path).await.unwrap();
    let user = create_user(&first, "ana", 5).await.unwrap();
    first.close().await;

    let second = init_database(&db_path).await.unwrap();
    assert!(get_user(&second, user).await.unwrap().is_some());

    let versions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schema_version")
        .fetch_one(&second)
        .await
        .unwrap();
    assert_eq!(versions, 1);
}

#[tokio::test]
async fn test_difficulty_out_of_range_rejected() {
    let (_dir, pool) = setup_test_db().await;
    let law_id = insert_law(&pool, "Penal Code", 0).await.unwrap();

    let article = NewArticle {
        difficulty: 6,
        ..NewArticle::new(law_id, "Art. 1")
    };
    let result = insert_article(&pool, &article).await;
    assert!(matches!(result, Err(Error::Validation(_))));
}

// =============================================================================
// Corpus provider
// =============================================================================

#[tokio::test]
async fn test_corpus_without_laws_is_configuration_error() {
    let (_dir, pool) = setup_test_db().await;
    let user = create_user(&pool, "ana", 5).await.unwrap();

    let result = load_user_corpus(&pool, user).await;
    assert!(matches!(result, Err(Error::NoLawsAvailable)));
}

#[tokio::test]
async fn test_corpus_for_unknown_user_not_found() {
    let (_dir, pool) = setup_test_db().await;
    seed_law(&pool, "Civil Code", 0, 3).await;

    let result = load_user_corpus(&pool, Uuid::new_v4()).await;
    assert!(matches!(result, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn test_corpus_falls_back_to_all_active_laws() {
    let (_dir, pool) = setup_test_db().await;
    let user = create_user(&pool, "ana", 5).await.unwrap();
    let (penal, _) = seed_law(&pool, "Penal Code", 2, 3).await;
    let (civil, _) = seed_law(&pool, "Civil Code", 1, 2).await;
    let (retired, _) = seed_law(&pool, "Retired Code", 0, 2).await;
    set_law_active(&pool, retired, false).await.unwrap();

    let corpus = load_user_corpus(&pool, user).await.unwrap();
    let law_ids: Vec<i64> = corpus.laws.iter().map(|l| l.law_id).collect();
    assert_eq!(law_ids, vec![civil, penal]);
    assert_eq!(corpus.law_name(civil), Some("Civil Code"));
}

#[tokio::test]
async fn test_corpus_respects_selection_order() {
    let (_dir, pool) = setup_test_db().await;
    let user = create_user(&pool, "ana", 5).await.unwrap();
    let (first, _) = seed_law(&pool, "Constitution", 0, 2).await;
    let (second, _) = seed_law(&pool, "Labour Code", 1, 2).await;
    let (third, _) = seed_law(&pool, "Tax Code", 2, 2).await;

    let stored = set_law_selection(&pool, user, &[third, first, third]).await.unwrap();
    assert_eq!(stored, vec![third, first]);
    assert_eq!(get_law_selection(&pool, user).await.unwrap(), vec![third, first]);

    let corpus = load_user_corpus(&pool, user).await.unwrap();
    let law_ids: Vec<i64> = corpus.laws.iter().map(|l| l.law_id).collect();
    assert_eq!(law_ids, vec![third, first]);
    assert!(corpus.law_name(second).is_none());
}

#[tokio::test]
async fn test_selection_rejects_unknown_law() {
    let (_dir, pool) = setup_test_db().await;
    let user = create_user(&pool, "ana", 5).await.unwrap();
    let (law, _) = seed_law(&pool, "Constitution", 0, 2).await;
    set_law_selection(&pool, user, &[law]).await.unwrap();

    let result = set_law_selection(&pool, user, &[law, 999]).await;
    assert!(matches!(result, Err(Error::Validation(_))));

    // Previous selection untouched
    assert_eq!(get_law_selection(&pool, user).await.unwrap(), vec![law]);
}

#[tokio::test]
async fn test_corpus_orders_articles_and_skips_inactive() {
    let (_dir, pool) = setup_test_db().await;
    let user = create_user(&pool, "ana", 5).await.unwrap();
    let law_id = insert_law(&pool, "Civil Code", 0).await.unwrap();

    let art10 = insert_article(&pool, &NewArticle::new(law_id, "Art. 10")).await.unwrap();
    let art2 = insert_article(&pool, &NewArticle::new(law_id, "Art. 2")).await.unwrap();
    let art1 = insert_article(&pool, &NewArticle::new(law_id, "Art. 1")).await.unwrap();
    let art3 = insert_article(&pool, &NewArticle::new(law_id, "Art. 3")).await.unwrap();
    set_article_active(&pool, art3, false).await.unwrap();

    let corpus = load_user_corpus(&pool, user).await.unwrap();
    assert_eq!(corpus.laws[0].article_ids, vec![art1, art2, art10]);
}

#[tokio::test]
async fn test_selection_without_active_articles_is_empty_selection() {
    let (_dir, pool) = setup_test_db().await;
    let user = create_user(&pool, "ana", 5).await.unwrap();
    let (_, articles) = seed_law(&pool, "Civil Code", 0, 1).await;
    let (empty_law, _) = seed_law(&pool, "Draft Code", 1, 0).await;
    set_article_active(&pool, articles[0], false).await.unwrap();

    let result = load_user_corpus(&pool, user).await;
    assert!(matches!(result, Err(Error::EmptySelection)));

    set_law_selection(&pool, user, &[empty_law]).await.unwrap();
    let result = load_user_corpus(&pool, user).await;
    assert!(matches!(result, Err(Error::EmptySelection)));
}

#[tokio::test]
async fn test_deactivated_selection_does_not_fall_back() {
    let (_dir, pool) = setup_test_db().await;
    let user = create_user(&pool, "ana", 5).await.unwrap();
    seed_law(&pool, "Civil Code", 0, 3).await;
    let (penal, _) = seed_law(&pool, "Penal Code", 1, 3).await;

    set_law_selection(&pool, user, &[penal]).await.unwrap();
    set_law_active(&pool, penal, false).await.unwrap();

    // The civil code is still active but was never selected
    let result = load_user_corpus(&pool, user).await;
    assert!(matches!(result, Err(Error::EmptySelection)));
    assert_eq!(get_law_selection(&pool, user).await.unwrap(), vec![penal]);
}

// =============================================================================
// Progress recording
// =============================================================================

#[tokio::test]
async fn test_failed_first_attempt_costs_a_life() {
    let (_dir, pool) = setup_test_db().await;
    let user = create_user(&pool, "ana", 3).await.unwrap();
    let (_, articles) = seed_law(&pool, "Civil Code", 0, 2).await;

    let outcome = record_attempt(&pool, user, articles[0], attempt(3, 5), &EconomySettings::default(), now())
        .await
        .unwrap();

    assert_eq!(outcome.progress.percentage, 60.0);
    assert!(!outcome.progress.is_completed);
    assert_eq!(outcome.progress.attempts, 1);
    assert!(outcome.life_lost);
    assert_eq!(outcome.lives_remaining, 2);
    assert_eq!(outcome.xp_gained, 30);

    let stored = get_user(&pool, user).await.unwrap().unwrap();
    assert_eq!(stored.lives, 2);
    assert_eq!(stored.xp, 30);
}

#[tokio::test]
async fn test_second_perfect_attempt_completes_article() {
    let (_dir, pool) = setup_test_db().await;
    let user = create_user(&pool, "ana", 3).await.unwrap();
    let (_, articles) = seed_law(&pool, "Civil Code", 0, 2).await;
    let economy = EconomySettings::default();

    record_attempt(&pool, user, articles[0], attempt(3, 5), &economy, now())
        .await
        .unwrap();
    let outcome = record_attempt(&pool, user, articles[0], attempt(5, 5), &economy, now())
        .await
        .unwrap();

    assert_eq!(outcome.progress.percentage, 100.0);
    assert_eq!(outcome.progress.best_score, 100.0);
    assert_eq!(outcome.progress.attempts, 2);
    assert!(outcome.progress.is_completed);
    assert!(outcome.progress.completed_at.is_some());
    assert!(!outcome.life_lost);

    let stored = get_progress(&pool, user, articles[0]).await.unwrap().unwrap();
    assert_eq!(stored, outcome.progress);
}

#[tokio::test]
async fn test_unlimited_lives_never_decrease() {
    let (_dir, pool) = setup_test_db().await;
    let user = create_user(&pool, "ana", 1).await.unwrap();
    set_unlimited_lives(&pool, user, true).await.unwrap();
    let (_, articles) = seed_law(&pool, "Civil Code", 0, 1).await;

    let outcome = record_attempt(&pool, user, articles[0], attempt(0, 5), &EconomySettings::default(), now())
        .await
        .unwrap();

    assert!(!outcome.life_lost);
    assert!(outcome.has_unlimited_lives);
    assert_eq!(outcome.lives_remaining, 1);
}

#[tokio::test]
async fn test_lives_floor_at_zero() {
    let (_dir, pool) = setup_test_db().await;
    let user = create_user(&pool, "ana", 1).await.unwrap();
    let (_, articles) = seed_law(&pool, "Civil Code", 0, 1).await;
    let economy = EconomySettings::default();

    let first = record_attempt(&pool, user, articles[0], attempt(1, 5), &economy, now()).await.unwrap();
    assert!(first.life_lost);
    assert_eq!(first.lives_remaining, 0);

    let second = record_attempt(&pool, user, articles[0], attempt(1, 5), &economy, now()).await.unwrap();
    assert!(!second.life_lost);
    assert_eq!(second.lives_remaining, 0);
}

#[tokio::test]
async fn test_invalid_attempt_mutates_nothing() {
    let (_dir, pool) = setup_test_db().await;
    let user = create_user(&pool, "ana", 3).await.unwrap();
    let (_, articles) = seed_law(&pool, "Civil Code", 0, 1).await;
    let economy = EconomySettings::default();

    let zero_total = record_attempt(&pool, user, articles[0], attempt(0, 0), &economy, now()).await;
    assert!(matches!(zero_total, Err(Error::Validation(_))));

    let too_many = record_attempt(&pool, user, articles[0], attempt(6, 5), &economy, now()).await;
    assert!(matches!(too_many, Err(Error::Validation(_))));

    assert!(get_progress(&pool, user, articles[0]).await.unwrap().is_none());
    assert_eq!(get_user(&pool, user).await.unwrap().unwrap().lives, 3);
}

#[tokio::test]
async fn test_attempt_on_missing_user_or_article_not_found() {
    let (_dir, pool) = setup_test_db().await;
    let user = create_user(&pool, "ana", 3).await.unwrap();
    let (_, articles) = seed_law(&pool, "Civil Code", 0, 1).await;
    let economy = EconomySettings::default();

    let missing_user = record_attempt(&pool, Uuid::new_v4(), articles[0], attempt(1, 1), &economy, now()).await;
    assert!(matches!(missing_user, Err(Error::NotFound(_))));

    let missing_article = record_attempt(&pool, user, 4242, attempt(1, 1), &economy, now()).await;
    assert!(matches!(missing_article, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn test_attempt_on_inactive_article_is_validation_error() {
    let (_dir, pool) = setup_test_db().await;
    let user = create_user(&pool, "ana", 3).await.unwrap();
    let (_, articles) = seed_law(&pool, "Civil Code", 0, 1).await;
    set_article_active(&pool, articles[0], false).await.unwrap();

    let result = record_attempt(&pool, user, articles[0], attempt(1, 1), &EconomySettings::default(), now()).await;
    assert!(matches!(result, Err(Error::Validation(_))));
}

#[tokio::test]
async fn test_snapshot_only_contains_requested_articles() {
    let (_dir, pool) = setup_test_db().await;
    let user = create_user(&pool, "ana", 3).await.unwrap();
    let (_, articles) = seed_law(&pool, "Civil Code", 0, 3).await;
    let economy = EconomySettings::default();

    for article_id in &articles {
        record_attempt(&pool, user, *article_id, attempt(4, 4), &economy, now()).await.unwrap();
    }

    let snapshot = load_progress(&pool, user, &articles[..2]).await.unwrap();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.status(articles[0]).map(|s| s.percentage), Some(100.0));
    assert!(snapshot.status(articles[2]).is_none());
}

#[tokio::test]
async fn test_reset_law_progress_reopens_phases() {
    let (_dir, pool) = setup_test_db().await;
    let user = create_user(&pool, "ana", 3).await.unwrap();
    let (law_id, articles) = seed_law(&pool, "Civil Code", 0, 6).await;
    let economy = EconomySettings::default();

    for article_id in &articles {
        record_attempt(&pool, user, *article_id, attempt(1, 1), &economy, now()).await.unwrap();
    }

    let corpus = load_user_corpus(&pool, user).await.unwrap();
    let phases = build_structure(&corpus, &PhaseSettings::default());
    let snapshot = load_progress(&pool, user, &articles).await.unwrap();
    assert!(evaluate(&phases, &snapshot).phases[0].is_complete);

    let removed = reset_law_progress(&pool, user, law_id).await.unwrap();
    assert_eq!(removed, 6);

    let snapshot = load_progress(&pool, user, &articles).await.unwrap();
    let evaluation = evaluate(&phases, &snapshot);
    assert!(!evaluation.phases[0].is_complete);
    assert_eq!(evaluation.current_phase_id, Some(1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_attempts_are_all_recorded() {
    let (_dir, pool) = setup_test_db().await;
    let user = create_user(&pool, "ana", 50).await.unwrap();
    let (_, articles) = seed_law(&pool, "Civil Code", 0, 1).await;
    let article_id = articles[0];

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let pool = pool.clone();
            tokio::spawn(async move {
                record_attempt(&pool, user, article_id, attempt(1, 5), &EconomySettings::default(), now()).await
            })
        })
        .collect();

    for handle in handles {
        let outcome = handle.await.expect("Task should not panic");
        assert!(outcome.is_ok(), "Concurrent attempt failed: {:?}", outcome.err());
    }

    let progress = get_progress(&pool, user, article_id).await.unwrap().unwrap();
    assert_eq!(progress.attempts, 16);

    let stored = get_user(&pool, user).await.unwrap().unwrap();
    assert_eq!(stored.lives, 34);
    assert_eq!(stored.xp, 160);
}

#[tokio::test]
async fn test_user_timestamps_are_rfc3339() {
    let (_dir, pool) = setup_test_db().await;
    let user = create_user(&pool, "ana", 5).await.unwrap();
    set_unlimited_lives(&pool, user, true).await.unwrap();

    let (created_at, updated_at): (String, String) =
        sqlx::query_as("SELECT created_at, updated_at FROM users WHERE guid = ?")
            .bind(user.to_string())
            .fetch_one(&pool)
            .await
            .unwrap();

    assert!(parse_timestamp(&created_at).is_ok(), "created_at: {}", created_at);
    assert!(parse_timestamp(&updated_at).is_ok(), "updated_at: {}", updated_at);
}
