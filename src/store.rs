//! Row-level store primitives: identity lookups and idempotent upserts.
//!
//! Each upsert is a single `INSERT .. ON CONFLICT .. DO UPDATE` statement,
//! so a half-written row is never observable. The identity key (`path` for
//! skills, `name` for prompts) and `created_at` are never mutated on
//! update; `updated_at` advances on every real write.

use anyhow::Result;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{PromptRecord, SkillRecord};

/// Stored digest for a skill identity, if any.
pub async fn skill_hash(pool: &SqlitePool, path: &str) -> Result<Option<String>> {
    let hash = sqlx::query_scalar("SELECT file_hash FROM skills WHERE path = ?")
        .bind(path)
        .fetch_optional(pool)
        .await?;
    Ok(hash)
}

/// Stored digest for a prompt identity, if any.
pub async fn prompt_hash(pool: &SqlitePool, name: &str) -> Result<Option<String>> {
    let hash = sqlx::query_scalar("SELECT file_hash FROM prompts WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    Ok(hash)
}

pub async fn skill_id_by_path(pool: &SqlitePool, path: &str) -> Result<Option<String>> {
    let id = sqlx::query_scalar("SELECT id FROM skills WHERE path = ?")
        .bind(path)
        .fetch_optional(pool)
        .await?;
    Ok(id)
}

pub async fn prompt_id_by_name(pool: &SqlitePool, name: &str) -> Result<Option<String>> {
    let id = sqlx::query_scalar("SELECT id FROM prompts WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    Ok(id)
}

/// Insert or update a skill row keyed by `path`. Returns the row id.
pub async fn upsert_skill(pool: &SqlitePool, record: &SkillRecord) -> Result<String> {
    let existing_id = skill_id_by_path(pool, &record.path).await?;
    let id = existing_id.unwrap_or_else(|| Uuid::new_v4().to_string());
    let now = chrono::Utc::now().timestamp();

    sqlx::query(
        r#"
        INSERT INTO skills (id, path, category, name, title, description, content,
                            file_hash, size_bytes, token_count, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(path) DO UPDATE SET
            category = excluded.category,
            name = excluded.name,
            title = excluded.title,
            description = excluded.description,
            content = excluded.content,
            file_hash = excluded.file_hash,
            size_bytes = excluded.size_bytes,
            token_count = excluded.token_count,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&id)
    .bind(&record.path)
    .bind(&record.category)
    .bind(&record.name)
    .bind(&record.title)
    .bind(&record.description)
    .bind(&record.content)
    .bind(&record.file_hash)
    .bind(record.size_bytes)
    .bind(record.token_count)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(id)
}

/// Insert or update a prompt row keyed by `name`. Returns the row id.
pub async fn upsert_prompt(pool: &SqlitePool, record: &PromptRecord) -> Result<String> {
    let existing_id = prompt_id_by_name(pool, &record.name).await?;
    let id = existing_id.unwrap_or_else(|| Uuid::new_v4().to_string());
    let now = chrono::Utc::now().timestamp();

    sqlx::query(
        r#"
        INSERT INTO prompts (id, name, path, category, title, description, content,
                             file_hash, size_bytes, token_count, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(name) DO UPDATE SET
            path = excluded.path,
            category = excluded.category,
            title = excluded.title,
            description = excluded.description,
            content = excluded.content,
            file_hash = excluded.file_hash,
            size_bytes = excluded.size_bytes,
            token_count = excluded.token_count,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&id)
    .bind(&record.name)
    .bind(&record.path)
    .bind(&record.category)
    .bind(&record.title)
    .bind(&record.description)
    .bind(&record.content)
    .bind(&record.file_hash)
    .bind(record.size_bytes)
    .bind(record.token_count)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(id)
}
