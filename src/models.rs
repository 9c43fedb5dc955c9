//! Core data models for the sync engine.
//!
//! Records are the normalized, store-ready form of a source file; rows are
//! what comes back out of SQLite. Identity is `path` for skills and `name`
//! for prompts (several config variants may render to the same path, so
//! the config-declared name is the stable prompt key).

use serde::Deserialize;

/// Normalized skill document, ready for upsert. Identity: `path`.
#[derive(Debug, Clone)]
pub struct SkillRecord {
    pub path: String,
    pub category: String,
    pub name: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: String,
    pub file_hash: String,
    pub size_bytes: i64,
    pub token_count: i64,
}

/// Normalized prompt document, ready for upsert. Identity: `name`.
#[derive(Debug, Clone)]
pub struct PromptRecord {
    pub name: String,
    pub path: String,
    pub category: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: String,
    pub file_hash: String,
    pub size_bytes: i64,
    pub token_count: i64,
}

/// Declared shape of a prompt-config YAML file.
///
/// Unknown keys are ignored; only the fields below are extracted.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PromptConfig {
    pub name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Skill references, as paths relative to the skills root,
    /// in presentation order.
    pub skills: Vec<String>,
}

/// Per-pass outcome counters reported by the orchestrator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    pub synced: u64,
    pub skipped: u64,
    pub errored: u64,
}

impl PassReport {
    pub fn total(&self) -> u64 {
        self.synced + self.skipped + self.errored
    }
}

/// Coarse token estimate: length in bytes divided by four. Never exact
/// tokenization; good enough for sizing prompts at composition time.
pub fn estimate_tokens(text: &str) -> i64 {
    (text.len() / 4) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcdefg"), 1);
        assert_eq!(estimate_tokens("abcdefgh"), 2);
    }

    #[test]
    fn test_prompt_config_unknown_keys_ignored() {
        let yaml = "name: rust-helper\nmodel: gpt-x\nskills:\n  - language/rust.md\n";
        let config: PromptConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.name.as_deref(), Some("rust-helper"));
        assert_eq!(config.skills, vec!["language/rust.md"]);
    }

    #[test]
    fn test_prompt_config_empty_skill_list_valid() {
        let config: PromptConfig = serde_yaml_ng::from_str("name: bare\n").unwrap();
        assert!(config.skills.is_empty());
    }
}
