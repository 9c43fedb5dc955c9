//! Path-derived categorization.
//!
//! A skill's category is the chain of directories between the skills root
//! and the file itself, joined with `/`. Arbitrary nesting depth maps onto
//! the taxonomy without schema changes.

use std::path::Path;

/// Fallback category for files directly under the root or outside it.
pub const UNCATEGORIZED: &str = "uncategorized";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub category: String,
    pub name: String,
}

/// Derive `{category, name}` from a file's location relative to `root`.
///
/// `name` is the filename without extension. `category` joins the
/// intermediate directory segments; an empty segment list (or a path not
/// under `root`) maps to [`UNCATEGORIZED`].
pub fn classify(path: &Path, root: &Path) -> Classification {
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let category = path
        .strip_prefix(root)
        .ok()
        .and_then(|rel| rel.parent())
        .map(|parent| {
            parent
                .components()
                .map(|c| c.as_os_str().to_string_lossy().to_string())
                .collect::<Vec<_>>()
                .join("/")
        })
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| UNCATEGORIZED.to_string());

    Classification { category, name }
}
