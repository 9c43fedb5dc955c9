use anyhow::{bail, Result};
use sqlx::{Row, SqlitePool};

use crate::config::Config;
use crate::db;
use crate::fragments;

/// Print a stored skill row by its path identity.
pub async fn run_show_skill(config: &Config, path: &str) -> Result<()> {
    let pool = db::connect(config).await?;

    let row = sqlx::query(
        "SELECT path, category, name, title, description, content, file_hash, size_bytes, token_count, updated_at FROM skills WHERE path = ?",
    )
    .bind(path)
    .fetch_optional(&pool)
    .await?;

    let Some(row) = row else {
        pool.close().await;
        bail!("Skill not found: {}", path);
    };

    print_document_header(&row);
    println!();
    let content: String = row.get("content");
    println!("{content}");

    pool.close().await;
    Ok(())
}

/// Print a stored prompt row by name, with its fragment's ordered skills.
pub async fn run_show_prompt(config: &Config, name: &str) -> Result<()> {
    let pool = db::connect(config).await?;

    let row = sqlx::query(
        "SELECT id, name, path, category, title, description, file_hash, size_bytes, token_count, updated_at FROM prompts WHERE name = ?",
    )
    .bind(name)
    .fetch_optional(&pool)
    .await?;

    let Some(row) = row else {
        pool.close().await;
        bail!("Prompt not found: {}", name);
    };

    print_document_header(&row);

    let members = fragment_members(&pool, name).await?;
    if members.is_empty() {
        println!("skills: (none)");
    } else {
        println!("skills:");
        for (position, skill_name, skill_path) in members {
            println!("  {}. {} ({})", position, skill_name, skill_path);
        }
    }

    pool.close().await;
    Ok(())
}

async fn fragment_members(
    pool: &SqlitePool,
    prompt_name: &str,
) -> Result<Vec<(i64, String, String)>> {
    let rows = sqlx::query(
        r#"
        SELECT fs.position, s.name, s.path
        FROM fragments f
        JOIN fragment_skills fs ON fs.fragment_id = f.id
        JOIN skills s ON s.id = fs.skill_id
        WHERE f.name = ?
        ORDER BY fs.position
        "#,
    )
    .bind(fragments::fragment_name(prompt_name))
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| (row.get("position"), row.get("name"), row.get("path")))
        .collect())
}

fn print_document_header(row: &sqlx::sqlite::SqliteRow) {
    let name: String = row.get("name");
    let category: String = row.get("category");
    let title: Option<String> = row.get("title");
    let description: Option<String> = row.get("description");
    let path: String = row.get("path");
    let size_bytes: i64 = row.get("size_bytes");
    let token_count: i64 = row.get("token_count");
    let updated_at: i64 = row.get("updated_at");

    println!("name: {name}");
    println!("category: {category}");
    if let Some(title) = title {
        println!("title: {title}");
    }
    if let Some(description) = description {
        println!("description: {description}");
    }
    println!("path: {path}");
    println!("size: {size_bytes} bytes (~{token_count} tokens)");
    let date = chrono::DateTime::from_timestamp(updated_at, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default();
    println!("updated: {date}");
}
