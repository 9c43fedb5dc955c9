//! Sync orchestration.
//!
//! Drives the full file-to-database pass: skills, then prompts, then
//! fragment reconciliation. The fragment pass runs strictly last because
//! it resolves prompt and skill identities created by the first two.
//!
//! Failure isolation is the contract here: every per-file error is caught
//! at the pipeline boundary, reported with its source path, counted, and
//! the batch moves on. A corrupt file degrades a run to "incomplete",
//! never "crashed". The only fatal errors are store connection and schema
//! setup.

use anyhow::Result;
use sqlx::SqlitePool;
use std::path::Path;

use crate::config::Config;
use crate::db;
use crate::fragments::{self, ReconcileOutcome};
use crate::migrate;
use crate::models::PassReport;
use crate::record;
use crate::scan;
use crate::store;

/// Aggregated result of a full sync run.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncSummary {
    pub skills: PassReport,
    pub prompts: PassReport,
    pub fragments: PassReport,
}

impl SyncSummary {
    pub fn errored(&self) -> u64 {
        self.skills.errored + self.prompts.errored + self.fragments.errored
    }
}

/// What happened to a single file inside a pass.
enum FileOutcome {
    Synced,
    Skipped,
}

/// Hash comparison is the single change signal: same digest means skip,
/// anything else (including no stored row) means upsert.
fn is_unchanged(existing_hash: Option<&str>, new_hash: &str) -> bool {
    existing_hash == Some(new_hash)
}

/// Run all three passes and print a human-readable summary.
///
/// Individual file errors are reported and counted but never fail the
/// run; the returned summary carries the counts for the caller's exit
/// policy.
pub async fn sync_all(config: &Config) -> Result<SyncSummary> {
    let pool = db::connect(config).await?;
    migrate::ensure_schema(&pool).await?;

    let skills = sync_skills(&pool, config).await?;
    let prompts = sync_prompts(&pool, config).await?;
    let fragments = sync_fragments(&pool, config).await?;

    let summary = SyncSummary {
        skills,
        prompts,
        fragments,
    };

    if summary.errored() > 0 {
        println!("done ({} file errors)", summary.errored());
    } else {
        println!("ok");
    }

    pool.close().await;
    Ok(summary)
}

/// Pass 1: mirror the skills tree.
pub async fn sync_skills(pool: &SqlitePool, config: &Config) -> Result<PassReport> {
    println!("sync skills");
    let mut report = PassReport::default();

    let files = match skill_files(config) {
        Ok(files) => files,
        Err(e) => {
            println!("  error scanning {}: {e:#}", config.content.skills_root.display());
            report.errored += 1;
            print_pass_report(&report);
            return Ok(report);
        }
    };

    for path in &files {
        match sync_one_skill(pool, path, &config.content.skills_root).await {
            Ok(FileOutcome::Synced) => {
                report.synced += 1;
                println!("  synced  {}", path.display());
            }
            Ok(FileOutcome::Skipped) => {
                report.skipped += 1;
                println!("  skipped {}", path.display());
            }
            Err(e) => {
                report.errored += 1;
                println!("  error   {}: {e:#}", path.display());
                tracing::warn!(path = %path.display(), error = %e, "skill sync failed");
            }
        }
    }

    print_pass_report(&report);
    Ok(report)
}

async fn sync_one_skill(pool: &SqlitePool, path: &Path, skills_root: &Path) -> Result<FileOutcome> {
    let record = record::build_skill_record(path, skills_root)?;

    let existing = store::skill_hash(pool, &record.path).await?;
    if is_unchanged(existing.as_deref(), &record.file_hash) {
        return Ok(FileOutcome::Skipped);
    }

    store::upsert_skill(pool, &record).await?;
    Ok(FileOutcome::Synced)
}

/// Pass 2: mirror prompt configs and their rendered bodies.
pub async fn sync_prompts(pool: &SqlitePool, config: &Config) -> Result<PassReport> {
    println!("sync prompts");
    let mut report = PassReport::default();

    let files = match prompt_config_files(config) {
        Ok(files) => files,
        Err(e) => {
            println!(
                "  error scanning {}: {e:#}",
                config.content.prompt_configs_root.display()
            );
            report.errored += 1;
            print_pass_report(&report);
            return Ok(report);
        }
    };

    for path in &files {
        match sync_one_prompt(pool, path, config).await {
            Ok(FileOutcome::Synced) => {
                report.synced += 1;
                println!("  synced  {}", path.display());
            }
            Ok(FileOutcome::Skipped) => {
                report.skipped += 1;
                println!("  skipped {}", path.display());
            }
            Err(e) => {
                report.errored += 1;
                println!("  error   {}: {e:#}", path.display());
                tracing::warn!(path = %path.display(), error = %e, "prompt sync failed");
            }
        }
    }

    print_pass_report(&report);
    Ok(report)
}

async fn sync_one_prompt(pool: &SqlitePool, path: &Path, config: &Config) -> Result<FileOutcome> {
    let (record, _) = record::build_prompt_record(
        path,
        &config.content.prompts_root,
        &config.content.prompt_configs_root,
    )?;

    let existing = store::prompt_hash(pool, &record.name).await?;
    if is_unchanged(existing.as_deref(), &record.file_hash) {
        return Ok(FileOutcome::Skipped);
    }

    store::upsert_prompt(pool, &record).await?;
    Ok(FileOutcome::Synced)
}

/// Pass 3: rebuild each prompt's embedded-skill fragment. Must run after
/// the first two passes; it resolves rows they created.
pub async fn sync_fragments(pool: &SqlitePool, config: &Config) -> Result<PassReport> {
    println!("sync fragments");
    let mut report = PassReport::default();

    let files = match prompt_config_files(config) {
        Ok(files) => files,
        Err(e) => {
            println!(
                "  error scanning {}: {e:#}",
                config.content.prompt_configs_root.display()
            );
            report.errored += 1;
            print_pass_report(&report);
            return Ok(report);
        }
    };

    for path in &files {
        match sync_one_fragment(pool, path, config).await {
            Ok(ReconcileOutcome::Reconciled { linked, skipped_refs }) => {
                report.synced += 1;
                if skipped_refs > 0 {
                    println!(
                        "  synced  {} ({} skills, {} unresolved)",
                        path.display(),
                        linked,
                        skipped_refs
                    );
                } else {
                    println!("  synced  {} ({} skills)", path.display(), linked);
                }
            }
            Ok(ReconcileOutcome::MissingPrompt) => {
                report.skipped += 1;
            }
            Err(e) => {
                report.errored += 1;
                println!("  error   {}: {e:#}", path.display());
                tracing::warn!(path = %path.display(), error = %e, "fragment sync failed");
            }
        }
    }

    print_pass_report(&report);
    Ok(report)
}

async fn sync_one_fragment(
    pool: &SqlitePool,
    config_path: &Path,
    config: &Config,
) -> Result<ReconcileOutcome> {
    let (record, prompt_config) = record::build_prompt_record(
        config_path,
        &config.content.prompts_root,
        &config.content.prompt_configs_root,
    )?;

    fragments::reconcile_fragment(
        pool,
        &record.name,
        &prompt_config,
        &config.content.skills_root,
    )
    .await
}

fn print_pass_report(report: &PassReport) {
    println!(
        "  synced: {}  skipped: {}  errored: {}",
        report.synced, report.skipped, report.errored
    );
}

fn skill_files(config: &Config) -> Result<Vec<std::path::PathBuf>> {
    scan::scan_files(
        &config.content.skills_root,
        &config.content.skill_globs,
        &config.content.exclude_globs,
        config.content.follow_symlinks,
    )
}

fn prompt_config_files(config: &Config) -> Result<Vec<std::path::PathBuf>> {
    scan::scan_files(
        &config.content.prompt_configs_root,
        &config.content.prompt_config_globs,
        &config.content.exclude_globs,
        config.content.follow_symlinks,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unchanged_requires_matching_hash() {
        assert!(is_unchanged(Some("abc"), "abc"));
        assert!(!is_unchanged(Some("abc"), "abd"));
    }

    #[test]
    fn test_missing_row_is_always_changed() {
        assert!(!is_unchanged(None, "abc"));
    }
}
