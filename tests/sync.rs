//! Library-level sync engine tests against a temporary SQLite store.

use std::fs;
use std::path::Path;
use std::time::Duration;

use sqlx::Row;
use tempfile::TempDir;

use skillbase::config::{Config, ContentConfig, DbConfig};
use skillbase::fragments::{self, ReconcileOutcome};
use skillbase::models::PromptConfig;
use skillbase::{db, migrate, sync};

fn test_config(root: &Path) -> Config {
    Config {
        db: DbConfig {
            path: root.join("data/skb.sqlite"),
        },
        content: ContentConfig {
            skills_root: root.join("skills"),
            prompts_root: root.join("prompts"),
            prompt_configs_root: root.join("prompt-configs"),
            skill_globs: vec!["**/*.md".to_string()],
            prompt_config_globs: vec!["**/*.yaml".to_string(), "**/*.yml".to_string()],
            exclude_globs: vec![],
            follow_symlinks: false,
        },
    }
}

fn setup_content(root: &Path) {
    fs::create_dir_all(root.join("skills/language")).unwrap();
    fs::create_dir_all(root.join("skills/libraries/data_validation")).unwrap();
    fs::create_dir_all(root.join("prompts")).unwrap();
    fs::create_dir_all(root.join("prompt-configs")).unwrap();

    fs::write(
        root.join("skills/language/rust.md"),
        "---\ntitle: Rust\n---\n# Rust\n\nOwnership and borrowing.",
    )
    .unwrap();
    fs::write(
        root.join("skills/language/clojure.md"),
        "---\ntitle: Clojure\n---\n# Clojure\n\nImmutable data.",
    )
    .unwrap();
    fs::write(
        root.join("skills/libraries/data_validation/malli.md"),
        "# Malli\n\nSchema-driven validation.",
    )
    .unwrap();

    fs::write(root.join("prompts/helper.md"), "# Helper prompt body").unwrap();
    fs::write(
        root.join("prompt-configs/helper.yaml"),
        "name: helper\ntitle: Helper\nskills:\n  - language/rust.md\n  - language/clojure.md\n",
    )
    .unwrap();
}

async fn skill_rows(pool: &sqlx::SqlitePool) -> Vec<(String, String, i64, i64)> {
    sqlx::query("SELECT path, file_hash, created_at, updated_at FROM skills ORDER BY path")
        .fetch_all(pool)
        .await
        .unwrap()
        .iter()
        .map(|r| {
            (
                r.get("path"),
                r.get("file_hash"),
                r.get("created_at"),
                r.get("updated_at"),
            )
        })
        .collect()
}

async fn fragment_memberships(pool: &sqlx::SqlitePool, fragment: &str) -> Vec<(i64, String)> {
    sqlx::query(
        r#"
        SELECT fs.position, s.name
        FROM fragments f
        JOIN fragment_skills fs ON fs.fragment_id = f.id
        JOIN skills s ON s.id = fs.skill_id
        WHERE f.name = ?
        ORDER BY fs.position
        "#,
    )
    .bind(fragment)
    .fetch_all(pool)
    .await
    .unwrap()
    .iter()
    .map(|r| (r.get("position"), r.get("name")))
    .collect()
}

#[tokio::test]
async fn full_sync_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    setup_content(tmp.path());
    let config = test_config(tmp.path());

    let first = sync::sync_all(&config).await.unwrap();
    assert_eq!(first.skills.synced, 3);
    assert_eq!(first.skills.errored, 0);
    assert_eq!(first.prompts.synced, 1);
    assert_eq!(first.fragments.synced, 1);

    let pool = db::connect(&config).await.unwrap();
    let rows_after_first = skill_rows(&pool).await;
    pool.close().await;

    // Timestamps are second-granular; space the runs out so an accidental
    // write would be visible in updated_at.
    tokio::time::sleep(Duration::from_millis(1100)).await;

    let second = sync::sync_all(&config).await.unwrap();
    assert_eq!(second.skills.synced, 0);
    assert_eq!(second.skills.skipped, 3);
    assert_eq!(second.prompts.skipped, 1);

    let pool = db::connect(&config).await.unwrap();
    let rows_after_second = skill_rows(&pool).await;
    pool.close().await;

    assert_eq!(rows_after_first, rows_after_second);
}

#[tokio::test]
async fn single_byte_change_triggers_resync() {
    let tmp = TempDir::new().unwrap();
    setup_content(tmp.path());
    let config = test_config(tmp.path());

    sync::sync_all(&config).await.unwrap();

    let pool = db::connect(&config).await.unwrap();
    let before = skill_rows(&pool).await;
    pool.close().await;

    tokio::time::sleep(Duration::from_millis(1100)).await;

    // Flip one byte in one skill's body.
    fs::write(
        tmp.path().join("skills/language/rust.md"),
        "---\ntitle: Rust\n---\n# Rust\n\nOwnership and borrowing!",
    )
    .unwrap();

    let report = sync::sync_all(&config).await.unwrap();
    assert_eq!(report.skills.synced, 1);
    assert_eq!(report.skills.skipped, 2);

    let pool = db::connect(&config).await.unwrap();
    let after = skill_rows(&pool).await;
    pool.close().await;

    let changed: Vec<_> = before
        .iter()
        .zip(after.iter())
        .filter(|(b, a)| b != a)
        .collect();
    assert_eq!(changed.len(), 1);
    let (b, a) = changed[0];
    assert!(a.0.ends_with("rust.md"));
    assert_ne!(b.1, a.1, "hash must change");
    assert_eq!(b.2, a.2, "created_at must not change");
    assert!(a.3 > b.3, "updated_at must advance");
}

#[tokio::test]
async fn fragment_reconciliation_replaces_not_merges() {
    let tmp = TempDir::new().unwrap();
    setup_content(tmp.path());
    let config = test_config(tmp.path());

    sync::sync_all(&config).await.unwrap();

    let pool = db::connect(&config).await.unwrap();
    let members = fragment_memberships(&pool, "helper-embedded").await;
    assert_eq!(
        members,
        vec![(0, "rust".to_string()), (1, "clojure".to_string())]
    );
    pool.close().await;

    // New declaration: [clojure, malli] — rust must disappear, order must
    // match the new list exactly.
    fs::write(
        tmp.path().join("prompt-configs/helper.yaml"),
        "name: helper\ntitle: Helper\nskills:\n  - language/clojure.md\n  - libraries/data_validation/malli.md\n",
    )
    .unwrap();

    sync::sync_all(&config).await.unwrap();

    let pool = db::connect(&config).await.unwrap();
    let members = fragment_memberships(&pool, "helper-embedded").await;
    assert_eq!(
        members,
        vec![(0, "clojure".to_string()), (1, "malli".to_string())]
    );

    // Exactly one fragment reference for the prompt survives.
    let ref_count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM prompt_references WHERE reference_type = 'fragment'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(ref_count, 1);
    pool.close().await;
}

#[tokio::test]
async fn unresolved_skill_reference_is_skipped_not_fatal() {
    let tmp = TempDir::new().unwrap();
    setup_content(tmp.path());
    fs::write(
        tmp.path().join("prompt-configs/helper.yaml"),
        "name: helper\nskills:\n  - language/rust.md\n  - language/typo.md\n  - language/clojure.md\n",
    )
    .unwrap();
    let config = test_config(tmp.path());

    let report = sync::sync_all(&config).await.unwrap();
    assert_eq!(report.fragments.synced, 1);
    assert_eq!(report.fragments.errored, 0);

    let pool = db::connect(&config).await.unwrap();
    let members = fragment_memberships(&pool, "helper-embedded").await;
    // The valid references link, in declared order, positions compacted.
    assert_eq!(
        members,
        vec![(0, "rust".to_string()), (1, "clojure".to_string())]
    );
    pool.close().await;
}

#[tokio::test]
async fn empty_skill_list_yields_linked_empty_fragment() {
    let tmp = TempDir::new().unwrap();
    setup_content(tmp.path());
    fs::write(
        tmp.path().join("prompt-configs/helper.yaml"),
        "name: helper\nskills: []\n",
    )
    .unwrap();
    let config = test_config(tmp.path());

    let report = sync::sync_all(&config).await.unwrap();
    assert_eq!(report.fragments.synced, 1);

    let pool = db::connect(&config).await.unwrap();
    let members = fragment_memberships(&pool, "helper-embedded").await;
    assert!(members.is_empty());

    let ref_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM prompt_references WHERE reference_type = 'fragment'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(ref_count, 1);
    pool.close().await;
}

#[tokio::test]
async fn one_corrupt_file_does_not_abort_the_batch() {
    let tmp = TempDir::new().unwrap();
    setup_content(tmp.path());
    // Invalid UTF-8: read_to_string fails for this file only.
    fs::write(tmp.path().join("skills/broken.md"), [0xff, 0xfe, 0x00]).unwrap();
    let config = test_config(tmp.path());

    let report = sync::sync_all(&config).await.unwrap();
    assert_eq!(report.skills.errored, 1);
    assert_eq!(report.skills.synced, 3);

    let pool = db::connect(&config).await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM skills")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 3);
    pool.close().await;
}

#[tokio::test]
async fn missing_owning_prompt_skips_fragment_with_warning() {
    let tmp = TempDir::new().unwrap();
    setup_content(tmp.path());
    let config = test_config(tmp.path());

    let pool = db::connect(&config).await.unwrap();
    migrate::ensure_schema(&pool).await.unwrap();

    // No prompt pass has run; reconciliation must not invent rows.
    let outcome = fragments::reconcile_fragment(
        &pool,
        "never-synced",
        &PromptConfig::default(),
        &config.content.skills_root,
    )
    .await
    .unwrap();
    assert_eq!(outcome, ReconcileOutcome::MissingPrompt);

    let fragment_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM fragments")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(fragment_count, 0);
    pool.close().await;
}

#[tokio::test]
async fn fts_index_follows_base_table_writes() {
    let tmp = TempDir::new().unwrap();
    setup_content(tmp.path());
    let config = test_config(tmp.path());

    sync::sync_all(&config).await.unwrap();

    let pool = db::connect(&config).await.unwrap();
    let hits: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM skills_fts WHERE skills_fts MATCH 'ownership'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(hits, 1);

    let prompt_hits: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM prompts_fts WHERE prompts_fts MATCH 'helper'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(prompt_hits >= 1);
    pool.close().await;
}
