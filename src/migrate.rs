use anyhow::Result;
use sqlx::SqlitePool;

/// Create the full schema if it does not exist. Idempotent; callers treat
/// any error here as fatal — sync never runs against a partial schema.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS skills (
            id TEXT PRIMARY KEY,
            path TEXT NOT NULL UNIQUE,
            category TEXT NOT NULL,
            name TEXT NOT NULL,
            title TEXT,
            description TEXT,
            content TEXT NOT NULL,
            file_hash TEXT NOT NULL,
            size_bytes INTEGER NOT NULL,
            token_count INTEGER NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS prompts (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            path TEXT NOT NULL,
            category TEXT NOT NULL,
            title TEXT,
            description TEXT,
            content TEXT NOT NULL,
            file_hash TEXT NOT NULL,
            size_bytes INTEGER NOT NULL,
            token_count INTEGER NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS fragments (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            title TEXT,
            description TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS fragment_skills (
            fragment_id TEXT NOT NULL,
            skill_id TEXT NOT NULL,
            position INTEGER NOT NULL,
            UNIQUE(fragment_id, position),
            FOREIGN KEY (fragment_id) REFERENCES fragments(id),
            FOREIGN KEY (skill_id) REFERENCES skills(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS prompt_references (
            id TEXT PRIMARY KEY,
            source_prompt_id TEXT NOT NULL,
            target_fragment_id TEXT NOT NULL,
            reference_type TEXT NOT NULL,
            position INTEGER NOT NULL,
            FOREIGN KEY (source_prompt_id) REFERENCES prompts(id),
            FOREIGN KEY (target_fragment_id) REFERENCES fragments(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS plans (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            description TEXT,
            status TEXT NOT NULL DEFAULT 'active',
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS task_lists (
            id TEXT PRIMARY KEY,
            plan_id TEXT NOT NULL,
            name TEXT NOT NULL,
            position INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL,
            FOREIGN KEY (plan_id) REFERENCES plans(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tasks (
            id TEXT PRIMARY KEY,
            task_list_id TEXT NOT NULL,
            description TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'todo',
            position INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            FOREIGN KEY (task_list_id) REFERENCES task_lists(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS task_results (
            id TEXT PRIMARY KEY,
            task_id TEXT NOT NULL,
            summary TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            FOREIGN KEY (task_id) REFERENCES tasks(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // FTS5 CREATE is not idempotent natively, so we check first
    ensure_fts(pool, "skills").await?;
    ensure_fts(pool, "prompts").await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_skills_category ON skills(category)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_fragment_skills_fragment ON fragment_skills(fragment_id)",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_prompt_references_source ON prompt_references(source_prompt_id)",
    )
    .execute(pool)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_tasks_list ON tasks(task_list_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create an FTS5 index over `{base}` plus the triggers that keep it in
/// step with base-table writes.
async fn ensure_fts(pool: &SqlitePool, base: &str) -> Result<()> {
    let fts = format!("{base}_fts");

    let fts_exists: bool = sqlx::query_scalar(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name = ?",
    )
    .bind(&fts)
    .fetch_one(pool)
    .await?;

    if !fts_exists {
        sqlx::query(&format!(
            r#"
            CREATE VIRTUAL TABLE {fts} USING fts5(
                row_id UNINDEXED,
                name,
                title,
                description,
                content
            )
            "#
        ))
        .execute(pool)
        .await?;
    }

    sqlx::query(&format!(
        r#"
        CREATE TRIGGER IF NOT EXISTS {base}_fts_insert AFTER INSERT ON {base} BEGIN
            INSERT INTO {fts} (row_id, name, title, description, content)
            VALUES (new.id, new.name, new.title, new.description, new.content);
        END
        "#
    ))
    .execute(pool)
    .await?;

    sqlx::query(&format!(
        r#"
        CREATE TRIGGER IF NOT EXISTS {base}_fts_update AFTER UPDATE ON {base} BEGIN
            DELETE FROM {fts} WHERE row_id = old.id;
            INSERT INTO {fts} (row_id, name, title, description, content)
            VALUES (new.id, new.name, new.title, new.description, new.content);
        END
        "#
    ))
    .execute(pool)
    .await?;

    sqlx::query(&format!(
        r#"
        CREATE TRIGGER IF NOT EXISTS {base}_fts_delete AFTER DELETE ON {base} BEGIN
            DELETE FROM {fts} WHERE row_id = old.id;
        END
        "#
    ))
    .execute(pool)
    .await?;

    Ok(())
}
