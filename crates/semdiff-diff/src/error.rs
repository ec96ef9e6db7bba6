//! Error types for the diff crate.
//!
//! The engine itself never fails: these errors are produced by the
//! format-specific parsers and absorbed by the semantic differ, which turns
//! them into a unified-diff fallback.

use crate::format::DiffFormat;

/// Errors that can occur while parsing one side of a comparison.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The content is not valid UTF-8 text.
    #[error("content is not valid UTF-8")]
    NotUtf8,

    /// The document contains nothing to parse.
    #[error("empty document")]
    Empty,

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    /// The format has no structural parser (e.g. `fallback`).
    #[error("no structural parser for format {0}")]
    Unsupported(DiffFormat),

    /// The source-code grammar could not be loaded or produced no tree.
    #[error("failed to parse {language} source: {reason}")]
    Syntax {
        language: &'static str,
        reason: String,
    },
}

/// Convenience alias for parse results.
pub type ParseResult<T> = Result<T, ParseError>;
