use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub content: ContentConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ContentConfig {
    /// Root of the nested markdown skill tree.
    pub skills_root: PathBuf,
    /// Root of the rendered prompt markdown files.
    pub prompts_root: PathBuf,
    /// Root of the per-prompt YAML config files.
    pub prompt_configs_root: PathBuf,
    #[serde(default = "default_skill_globs")]
    pub skill_globs: Vec<String>,
    #[serde(default = "default_prompt_config_globs")]
    pub prompt_config_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
}

fn default_skill_globs() -> Vec<String> {
    vec!["**/*.md".to_string()]
}

fn default_prompt_config_globs() -> Vec<String> {
    vec!["**/*.yaml".to_string(), "**/*.yml".to_string()]
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.content.skill_globs.is_empty() {
        anyhow::bail!("content.skill_globs must not be empty");
    }
    if config.content.prompt_config_globs.is_empty() {
        anyhow::bail!("content.prompt_config_globs must not be empty");
    }

    Ok(config)
}
