use serde::{Deserialize, Serialize};

use crate::blob_diff::DEFAULT_CONTEXT_LINES;

/// Largest side, in bytes, that is compared structurally.
pub const MAX_SEMANTIC_SIZE: usize = 1024 * 1024;

/// Tuning knobs for the semantic differ and the unified fallback.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffOptions {
    /// Either side above this size skips structural comparison.
    pub max_semantic_size: usize,
    /// Context lines around each hunk of a unified diff.
    pub context_lines: usize,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            max_semantic_size: MAX_SEMANTIC_SIZE,
            context_lines: DEFAULT_CONTEXT_LINES,
        }
    }
}

impl DiffOptions {
    /// Returns `true` if either side is too large for structural comparison.
    pub fn exceeds_size_limit(&self, base: Option<&[u8]>, head: Option<&[u8]>) -> bool {
        [base, head]
            .into_iter()
            .flatten()
            .any(|side| side.len() > self.max_semantic_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = DiffOptions::default();
        assert_eq!(options.max_semantic_size, 1024 * 1024);
        assert_eq!(options.context_lines, 3);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let options: DiffOptions = serde_json::from_str(r#"{"context_lines": 5}"#).unwrap();
        assert_eq!(options.context_lines, 5);
        assert_eq!(options.max_semantic_size, MAX_SEMANTIC_SIZE);
    }

    #[test]
    fn size_limit_checks_present_sides() {
        let options = DiffOptions {
            max_semantic_size: 4,
            ..Default::default()
        };
        assert!(!options.exceeds_size_limit(Some(b"1234"), None));
        assert!(options.exceeds_size_limit(Some(b"1"), Some(b"12345")));
        assert!(!options.exceeds_size_limit(None, None));
    }
}
