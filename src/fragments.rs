//! Fragment reconciliation.
//!
//! A prompt config declares an ordered list of skill references. This
//! module makes that list authoritative over the database: one derived
//! fragment per prompt (`{name}-embedded`), whose memberships are wiped
//! and rewritten from the declaration on every run, and a freshly
//! replaced prompt→fragment reference. Full reset instead of a diff —
//! no stale membership or orphaned link can survive a config edit.
//!
//! All writes for one prompt happen in a single transaction.

use anyhow::Result;
use sqlx::SqlitePool;
use std::path::Path;
use uuid::Uuid;

use crate::models::PromptConfig;
use crate::store;

/// Reference type managed by the sync engine. Other reference types are
/// left untouched by reconciliation.
const REF_TYPE_FRAGMENT: &str = "fragment";

/// Outcome of reconciling one prompt config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Fragment rebuilt; `linked` memberships written, `skipped_refs`
    /// references could not be resolved.
    Reconciled { linked: usize, skipped_refs: usize },
    /// The owning prompt has not been synced yet; nothing was written.
    MissingPrompt,
}

/// Derived fragment identity for a prompt. One fragment per prompt, never
/// shared, so edits to one prompt's skill list cannot affect another's.
pub fn fragment_name(prompt_name: &str) -> String {
    format!("{prompt_name}-embedded")
}

/// Rebuild the fragment for `prompt_name` from its config's declared
/// skill list.
///
/// Unresolvable skill references are warned about and skipped one by one;
/// an empty declared list is valid and yields a fragment with zero
/// memberships, still linked from the prompt.
pub async fn reconcile_fragment(
    pool: &SqlitePool,
    prompt_name: &str,
    config: &PromptConfig,
    skills_root: &Path,
) -> Result<ReconcileOutcome> {
    let Some(prompt_id) = store::prompt_id_by_name(pool, prompt_name).await? else {
        println!(
            "warning: prompt '{}' not found in store; skipping fragment sync",
            prompt_name
        );
        tracing::warn!(prompt = prompt_name, "owning prompt missing, fragment pass skipped");
        return Ok(ReconcileOutcome::MissingPrompt);
    };

    // Resolve declared references to stored skill ids, preserving order.
    let mut resolved: Vec<String> = Vec::new();
    let mut skipped_refs = 0usize;
    for reference in &config.skills {
        let skill_path = resolve_skill_path(reference, skills_root);
        match store::skill_id_by_path(pool, &skill_path).await? {
            Some(skill_id) => resolved.push(skill_id),
            None => {
                println!(
                    "warning: prompt '{}': skill reference '{}' not found; skipping",
                    prompt_name, reference
                );
                tracing::warn!(
                    prompt = prompt_name,
                    reference = %reference,
                    "unresolved skill reference"
                );
                skipped_refs += 1;
            }
        }
    }

    let name = fragment_name(prompt_name);
    let now = chrono::Utc::now().timestamp();

    let mut tx = pool.begin().await?;

    // Get-or-create the fragment row, carrying the prompt's display
    // metadata forward.
    let existing: Option<String> = sqlx::query_scalar("SELECT id FROM fragments WHERE name = ?")
        .bind(&name)
        .fetch_optional(&mut *tx)
        .await?;

    let fragment_id = match existing {
        Some(id) => {
            sqlx::query("UPDATE fragments SET title = ?, description = ?, updated_at = ? WHERE id = ?")
                .bind(&config.title)
                .bind(&config.description)
                .bind(now)
                .bind(&id)
                .execute(&mut *tx)
                .await?;
            id
        }
        None => {
            let id = Uuid::new_v4().to_string();
            sqlx::query(
                r#"
                INSERT INTO fragments (id, name, title, description, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&id)
            .bind(&name)
            .bind(&config.title)
            .bind(&config.description)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await?;
            id
        }
    };

    // Full membership reset: declared order becomes position 0..n.
    sqlx::query("DELETE FROM fragment_skills WHERE fragment_id = ?")
        .bind(&fragment_id)
        .execute(&mut *tx)
        .await?;

    for (position, skill_id) in resolved.iter().enumerate() {
        sqlx::query(
            "INSERT INTO fragment_skills (fragment_id, skill_id, position) VALUES (?, ?, ?)",
        )
        .bind(&fragment_id)
        .bind(skill_id)
        .bind(position as i64)
        .execute(&mut *tx)
        .await?;
    }

    // Replace this prompt's fragment references wholesale.
    sqlx::query(
        "DELETE FROM prompt_references WHERE source_prompt_id = ? AND reference_type = ?",
    )
    .bind(&prompt_id)
    .bind(REF_TYPE_FRAGMENT)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO prompt_references (id, source_prompt_id, target_fragment_id, reference_type, position)
        VALUES (?, ?, ?, ?, 0)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&prompt_id)
    .bind(&fragment_id)
    .bind(REF_TYPE_FRAGMENT)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(ReconcileOutcome::Reconciled {
        linked: resolved.len(),
        skipped_refs,
    })
}

/// Turn a config-declared reference (relative to the skills root, or
/// already absolute) into the stored skill identity.
fn resolve_skill_path(reference: &str, skills_root: &Path) -> String {
    let ref_path = Path::new(reference);
    if ref_path.is_absolute() {
        reference.to_string()
    } else {
        skills_root.join(ref_path).to_string_lossy().to_string()
    }
}
