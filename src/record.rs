//! Normalized record construction.
//!
//! Combines file reads, hashing, front-matter parsing, and path
//! classification into store-ready records. Pure aside from the reads:
//! no database access happens here. Unreadable files propagate as
//! per-file errors for the orchestrator to catch; malformed front matter
//! degrades to "no metadata".

use anyhow::{bail, Context, Result};
use std::path::Path;

use crate::classify;
use crate::frontmatter;
use crate::hash;
use crate::models::{estimate_tokens, PromptConfig, PromptRecord, SkillRecord};

/// Build a [`SkillRecord`] from a markdown file under `skills_root`.
pub fn build_skill_record(path: &Path, skills_root: &Path) -> Result<SkillRecord> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read skill file: {}", path.display()))?;

    let file_hash = hash::content_hash(raw.as_bytes());
    let (metadata, body) = frontmatter::parse(&raw);
    let classification = classify::classify(path, skills_root);

    if classification.name.is_empty() {
        bail!("Skill file has no usable name: {}", path.display());
    }

    let (title, description) = match &metadata {
        Some(map) => (
            frontmatter::get_string(map, "title"),
            frontmatter::get_string(map, "description"),
        ),
        None => (None, None),
    };

    Ok(SkillRecord {
        path: path.to_string_lossy().to_string(),
        category: classification.category,
        name: classification.name,
        title,
        description,
        content: body.to_string(),
        file_hash,
        size_bytes: raw.len() as i64,
        token_count: estimate_tokens(body),
    })
}

/// Build a [`PromptRecord`] from a prompt-config file plus its rendered
/// markdown sibling at `{prompts_root}/{stem}.md`.
///
/// The hash covers both inputs so an edit to either file triggers a
/// re-sync. Returns the parsed config alongside the record; the fragment
/// pass reuses it to reconcile skill memberships.
pub fn build_prompt_record(
    config_path: &Path,
    prompts_root: &Path,
    configs_root: &Path,
) -> Result<(PromptRecord, PromptConfig)> {
    let config_text = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read prompt config: {}", config_path.display()))?;

    let config: PromptConfig = serde_yaml_ng::from_str(&config_text)
        .with_context(|| format!("Failed to parse prompt config: {}", config_path.display()))?;

    let stem = config_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    // Config-declared name wins; filename stem is the fallback.
    let name = config
        .name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| stem.clone());
    if name.is_empty() {
        bail!(
            "Prompt config has no usable name: {}",
            config_path.display()
        );
    }

    let rendered_path = prompts_root.join(format!("{stem}.md"));
    let body = std::fs::read_to_string(&rendered_path).with_context(|| {
        format!(
            "Failed to read rendered prompt: {}",
            rendered_path.display()
        )
    })?;

    let classification = classify::classify(config_path, configs_root);

    let record = PromptRecord {
        name,
        path: rendered_path.to_string_lossy().to_string(),
        category: classification.category,
        title: config.title.clone(),
        description: config.description.clone(),
        content: body.clone(),
        file_hash: hash::prompt_hash(&config_text, &body),
        size_bytes: (config_text.len() + body.len()) as i64,
        token_count: estimate_tokens(&body),
    };

    Ok((record, config))
}
