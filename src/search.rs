use anyhow::{bail, Result};
use sqlx::{Row, SqlitePool};

use crate::config::Config;
use crate::db;

const DEFAULT_LIMIT: i64 = 12;

/// Search the FTS5 indexes and print ranked results.
pub async fn run_search(
    config: &Config,
    query: &str,
    kind: &str,
    limit: Option<i64>,
) -> Result<()> {
    if query.trim().is_empty() {
        println!("No results.");
        return Ok(());
    }

    match kind {
        "skills" | "prompts" | "all" => {}
        _ => bail!("Unknown search kind: {}. Use skills, prompts, or all.", kind),
    }

    let pool = db::connect(config).await?;
    let limit = limit.unwrap_or(DEFAULT_LIMIT);

    let mut results: Vec<SearchHit> = Vec::new();
    if kind == "skills" || kind == "all" {
        results.extend(fetch_hits(&pool, "skills", query, limit).await?);
    }
    if kind == "prompts" || kind == "all" {
        results.extend(fetch_hits(&pool, "prompts", query, limit).await?);
    }

    if results.is_empty() {
        println!("No results.");
        pool.close().await;
        return Ok(());
    }

    // Sort: score desc, name asc (deterministic)
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.name.cmp(&b.name))
    });
    results.truncate(limit as usize);

    for (i, hit) in results.iter().enumerate() {
        let title = hit.title.as_deref().unwrap_or("(untitled)");
        println!("{}. [{:.2}] {} / {}", i + 1, hit.score, hit.kind, title);
        println!("    name: {}", hit.name);
        println!("    excerpt: \"{}\"", hit.snippet.replace('\n', " ").trim());
        println!();
    }

    pool.close().await;
    Ok(())
}

struct SearchHit {
    kind: &'static str,
    name: String,
    title: Option<String>,
    score: f64,
    snippet: String,
}

async fn fetch_hits(
    pool: &SqlitePool,
    base: &'static str,
    query: &str,
    limit: i64,
) -> Result<Vec<SearchHit>> {
    let sql = format!(
        r#"
        SELECT name, title, rank,
               snippet({base}_fts, 4, '>>>', '<<<', '...', 48) AS snippet
        FROM {base}_fts
        WHERE {base}_fts MATCH ?
        ORDER BY rank
        LIMIT ?
        "#
    );

    let rows = sqlx::query(&sql)
        .bind(query)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    let hits = rows
        .iter()
        .map(|row| {
            let rank: f64 = row.get("rank");
            SearchHit {
                kind: base,
                name: row.get("name"),
                title: row.get("title"),
                score: -rank, // negate so higher = better
                snippet: row.get("snippet"),
            }
        })
        .collect();

    Ok(hits)
}
