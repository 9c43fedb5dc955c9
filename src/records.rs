//! Plan / task-list / task CRUD layered over the synced knowledge base.
//!
//! Plain parameterized SQL with input validation; no sync machinery is
//! involved. Plans own task lists, task lists own ordered tasks, tasks
//! accumulate recorded results.

use anyhow::{bail, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::config::Config;
use crate::db;

const PLAN_STATUSES: &[&str] = &["active", "completed", "archived"];
const TASK_STATUSES: &[&str] = &["todo", "in_progress", "done", "skipped"];

pub async fn add_plan(config: &Config, name: &str, description: Option<&str>) -> Result<()> {
    if name.trim().is_empty() {
        bail!("Plan name must not be empty");
    }

    let pool = db::connect(config).await?;
    let now = chrono::Utc::now().timestamp();
    let id = Uuid::new_v4().to_string();

    sqlx::query(
        "INSERT INTO plans (id, name, description, status, created_at, updated_at) VALUES (?, ?, ?, 'active', ?, ?)",
    )
    .bind(&id)
    .bind(name)
    .bind(description)
    .bind(now)
    .bind(now)
    .execute(&pool)
    .await?;

    println!("created plan '{}' ({})", name, id);
    pool.close().await;
    Ok(())
}

pub async fn list_plans(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;

    let rows = sqlx::query("SELECT name, status, description FROM plans ORDER BY created_at")
        .fetch_all(&pool)
        .await?;

    if rows.is_empty() {
        println!("No plans.");
    }
    for row in &rows {
        let name: String = row.get("name");
        let status: String = row.get("status");
        let description: Option<String> = row.get("description");
        match description {
            Some(d) => println!("[{status}] {name} — {d}"),
            None => println!("[{status}] {name}"),
        }
    }

    pool.close().await;
    Ok(())
}

pub async fn show_plan(config: &Config, name: &str) -> Result<()> {
    let pool = db::connect(config).await?;
    let plan_id = require_plan(&pool, name).await?;

    let status: String = sqlx::query_scalar("SELECT status FROM plans WHERE id = ?")
        .bind(&plan_id)
        .fetch_one(&pool)
        .await?;
    println!("plan: {name} [{status}]");

    let lists = sqlx::query(
        "SELECT id, name FROM task_lists WHERE plan_id = ? ORDER BY position, created_at",
    )
    .bind(&plan_id)
    .fetch_all(&pool)
    .await?;

    for list in &lists {
        let list_id: String = list.get("id");
        let list_name: String = list.get("name");
        println!("  list: {list_name} ({list_id})");

        let tasks = sqlx::query(
            "SELECT id, description, status FROM tasks WHERE task_list_id = ? ORDER BY position",
        )
        .bind(&list_id)
        .fetch_all(&pool)
        .await?;

        for task in &tasks {
            let task_id: String = task.get("id");
            let description: String = task.get("description");
            let task_status: String = task.get("status");
            println!("    [{task_status}] {description} ({task_id})");

            let results: Vec<String> = sqlx::query_scalar(
                "SELECT summary FROM task_results WHERE task_id = ? ORDER BY created_at",
            )
            .bind(&task_id)
            .fetch_all(&pool)
            .await?;
            for summary in results {
                println!("      -> {summary}");
            }
        }
    }

    pool.close().await;
    Ok(())
}

pub async fn set_plan_status(config: &Config, name: &str, status: &str) -> Result<()> {
    if !PLAN_STATUSES.contains(&status) {
        bail!(
            "Unknown plan status: '{}'. Use one of: {}",
            status,
            PLAN_STATUSES.join(", ")
        );
    }

    let pool = db::connect(config).await?;
    let plan_id = require_plan(&pool, name).await?;
    let now = chrono::Utc::now().timestamp();

    sqlx::query("UPDATE plans SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status)
        .bind(now)
        .bind(&plan_id)
        .execute(&pool)
        .await?;

    println!("plan '{}' -> {}", name, status);
    pool.close().await;
    Ok(())
}

pub async fn remove_plan(config: &Config, name: &str) -> Result<()> {
    let pool = db::connect(config).await?;
    let plan_id = require_plan(&pool, name).await?;

    let mut tx = pool.begin().await?;
    sqlx::query(
        "DELETE FROM task_results WHERE task_id IN (SELECT t.id FROM tasks t JOIN task_lists l ON t.task_list_id = l.id WHERE l.plan_id = ?)",
    )
    .bind(&plan_id)
    .execute(&mut *tx)
    .await?;
    sqlx::query(
        "DELETE FROM tasks WHERE task_list_id IN (SELECT id FROM task_lists WHERE plan_id = ?)",
    )
    .bind(&plan_id)
    .execute(&mut *tx)
    .await?;
    sqlx::query("DELETE FROM task_lists WHERE plan_id = ?")
        .bind(&plan_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM plans WHERE id = ?")
        .bind(&plan_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    println!("removed plan '{}'", name);
    pool.close().await;
    Ok(())
}

pub async fn list_task_lists(config: &Config, plan_name: &str) -> Result<()> {
    let pool = db::connect(config).await?;
    let plan_id = require_plan(&pool, plan_name).await?;

    let rows = sqlx::query(
        "SELECT id, name FROM task_lists WHERE plan_id = ? ORDER BY position, created_at",
    )
    .bind(&plan_id)
    .fetch_all(&pool)
    .await?;

    if rows.is_empty() {
        println!("No task lists.");
    }
    for row in &rows {
        let id: String = row.get("id");
        let name: String = row.get("name");
        println!("{name} ({id})");
    }

    pool.close().await;
    Ok(())
}

pub async fn add_task_list(config: &Config, plan_name: &str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        bail!("Task list name must not be empty");
    }

    let pool = db::connect(config).await?;
    let plan_id = require_plan(&pool, plan_name).await?;

    let position: i64 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(position) + 1, 0) FROM task_lists WHERE plan_id = ?",
    )
    .bind(&plan_id)
    .fetch_one(&pool)
    .await?;

    let id = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO task_lists (id, plan_id, name, position, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&plan_id)
    .bind(name)
    .bind(position)
    .bind(chrono::Utc::now().timestamp())
    .execute(&pool)
    .await?;

    println!("created task list '{}' ({})", name, id);
    pool.close().await;
    Ok(())
}

pub async fn add_task(config: &Config, list_id: &str, description: &str) -> Result<()> {
    if description.trim().is_empty() {
        bail!("Task description must not be empty");
    }

    let pool = db::connect(config).await?;

    let exists: bool = sqlx::query_scalar("SELECT COUNT(*) > 0 FROM task_lists WHERE id = ?")
        .bind(list_id)
        .fetch_one(&pool)
        .await?;
    if !exists {
        pool.close().await;
        bail!("Task list not found: {}", list_id);
    }

    let position: i64 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(position) + 1, 0) FROM tasks WHERE task_list_id = ?",
    )
    .bind(list_id)
    .fetch_one(&pool)
    .await?;

    let now = chrono::Utc::now().timestamp();
    let id = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO tasks (id, task_list_id, description, status, position, created_at, updated_at) VALUES (?, ?, ?, 'todo', ?, ?, ?)",
    )
    .bind(&id)
    .bind(list_id)
    .bind(description)
    .bind(position)
    .bind(now)
    .bind(now)
    .execute(&pool)
    .await?;

    println!("created task ({})", id);
    pool.close().await;
    Ok(())
}

pub async fn list_tasks(config: &Config, list_id: &str) -> Result<()> {
    let pool = db::connect(config).await?;

    let exists: bool = sqlx::query_scalar("SELECT COUNT(*) > 0 FROM task_lists WHERE id = ?")
        .bind(list_id)
        .fetch_one(&pool)
        .await?;
    if !exists {
        pool.close().await;
        bail!("Task list not found: {}", list_id);
    }

    let rows = sqlx::query(
        "SELECT id, description, status FROM tasks WHERE task_list_id = ? ORDER BY position",
    )
    .bind(list_id)
    .fetch_all(&pool)
    .await?;

    if rows.is_empty() {
        println!("No tasks.");
    }
    for row in &rows {
        let id: String = row.get("id");
        let description: String = row.get("description");
        let status: String = row.get("status");
        println!("[{status}] {description} ({id})");
    }

    pool.close().await;
    Ok(())
}

pub async fn remove_task(config: &Config, task_id: &str) -> Result<()> {
    let pool = db::connect(config).await?;

    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM task_results WHERE task_id = ?")
        .bind(task_id)
        .execute(&mut *tx)
        .await?;
    let deleted = sqlx::query("DELETE FROM tasks WHERE id = ?")
        .bind(task_id)
        .execute(&mut *tx)
        .await?;

    if deleted.rows_affected() == 0 {
        tx.rollback().await?;
        pool.close().await;
        bail!("Task not found: {}", task_id);
    }
    tx.commit().await?;

    println!("removed task {}", task_id);
    pool.close().await;
    Ok(())
}

pub async fn set_task_status(config: &Config, task_id: &str, status: &str) -> Result<()> {
    if !TASK_STATUSES.contains(&status) {
        bail!(
            "Unknown task status: '{}'. Use one of: {}",
            status,
            TASK_STATUSES.join(", ")
        );
    }

    let pool = db::connect(config).await?;
    let updated = sqlx::query("UPDATE tasks SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status)
        .bind(chrono::Utc::now().timestamp())
        .bind(task_id)
        .execute(&pool)
        .await?;

    if updated.rows_affected() == 0 {
        pool.close().await;
        bail!("Task not found: {}", task_id);
    }

    println!("task {} -> {}", task_id, status);
    pool.close().await;
    Ok(())
}

pub async fn add_task_result(config: &Config, task_id: &str, summary: &str) -> Result<()> {
    if summary.trim().is_empty() {
        bail!("Result summary must not be empty");
    }

    let pool = db::connect(config).await?;

    let exists: bool = sqlx::query_scalar("SELECT COUNT(*) > 0 FROM tasks WHERE id = ?")
        .bind(task_id)
        .fetch_one(&pool)
        .await?;
    if !exists {
        pool.close().await;
        bail!("Task not found: {}", task_id);
    }

    let id = Uuid::new_v4().to_string();
    sqlx::query("INSERT INTO task_results (id, task_id, summary, created_at) VALUES (?, ?, ?, ?)")
        .bind(&id)
        .bind(task_id)
        .bind(summary)
        .bind(chrono::Utc::now().timestamp())
        .execute(&pool)
        .await?;

    println!("recorded result for task {}", task_id);
    pool.close().await;
    Ok(())
}

async fn require_plan(pool: &SqlitePool, name: &str) -> Result<String> {
    let id: Option<String> = sqlx::query_scalar("SELECT id FROM plans WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    id.ok_or_else(|| anyhow::anyhow!("Plan not found: {}", name))
}
