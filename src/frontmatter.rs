//! YAML front-matter splitting.
//!
//! Skills may open with a `---` delimited metadata block. Parsing is
//! best-effort: a missing opening delimiter, an unterminated block, or
//! invalid YAML all degrade to "no metadata" with the raw input returned
//! as the body. A malformed header in one file must never block the rest
//! of a sync pass.

use serde_yaml_ng::{Mapping, Value};

const DELIMITER: &str = "---";

/// Split `raw` into an optional metadata mapping and the body text.
///
/// The body excludes the front-matter block and its delimiters. When no
/// valid block is present the whole input is returned as the body.
pub fn parse(raw: &str) -> (Option<Mapping>, &str) {
    let Some(rest) = strip_opening_delimiter(raw) else {
        return (None, raw);
    };

    // Find the closing delimiter on its own line.
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == DELIMITER {
            let block = &rest[..offset];
            let body = &rest[offset + line.len()..];
            // An empty block is a valid, metadata-less header.
            if block.trim().is_empty() {
                return (None, body);
            }
            return match serde_yaml_ng::from_str::<Value>(block) {
                Ok(Value::Mapping(map)) => (Some(map), body),
                Ok(Value::Null) => (None, body),
                // Scalar or sequence front matter carries no usable keys.
                _ => (None, raw),
            };
        }
        offset += line.len();
    }

    // Unterminated block: treat the file as plain content.
    (None, raw)
}

/// Extract a string value for `key` from parsed front matter.
pub fn get_string(metadata: &Mapping, key: &str) -> Option<String> {
    match metadata.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn strip_opening_delimiter(raw: &str) -> Option<&str> {
    let first_line_end = raw.find('\n')?;
    let first_line = raw[..first_line_end].trim_end_matches('\r');
    if first_line == DELIMITER {
        Some(&raw[first_line_end + 1..])
    } else {
        None
    }
}
