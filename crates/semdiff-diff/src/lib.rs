//! Semantic diff engine.
//!
//! Compares two versions of a file and reports meaningful changes. Structured
//! data (JSON, YAML, CSV, TOML) is parsed into a [`StructuralNode`] tree and
//! compared key-by-key, so reformatting and key reordering are not reported.
//! Rust and Python sources are compared per top-level declaration. Anything
//! else falls back to a line-based unified diff.
//!
//! # Key Types
//!
//! - [`DiffFormat`] / [`detect_format`] -- Path-based strategy selection
//! - [`StructuralNode`] / [`Scalar`] -- Normalized document tree
//! - [`DiffResult`] / [`ChangeSet`] / [`Change`] -- Semantic diff output
//! - [`BlobDiff`] / [`DiffHunk`] / [`DiffLine`] -- Line-level diff and unified rendering
//! - [`ReconstructedContent`] -- Base/head text rebuilt from a hunk stream
//! - [`DiffSection`] / [`MultiFileDiff`] -- Per-file sections of a raw multi-file diff

pub mod aggregate;
pub mod blob_diff;
pub mod declaration_diff;
pub mod document_diff;
pub mod error;
pub mod format;
pub mod node;
pub mod options;
pub mod parse;
pub mod reconstruct;
pub mod semantic;

pub use aggregate::{
    apply_semantic_diff_to_patch, apply_semantic_diff_to_patch_with, process_multi_file_diff,
    process_multi_file_diff_with, DiffSection, MultiFileDiff,
};
pub use blob_diff::{
    diff_blobs, diff_blobs_with_context, unified_diff, BlobDiff, DiffHunk, DiffLine,
    DEFAULT_CONTEXT_LINES,
};
pub use declaration_diff::{diff_declarations, extract_declarations, CodeLanguage, Declaration};
pub use document_diff::{diff_documents, Change, ChangeKind, ChangeSet};
pub use error::{ParseError, ParseResult};
pub use format::{detect_format, DiffFormat};
pub use node::{ObjectMap, Scalar, StructuralNode};
pub use options::{DiffOptions, MAX_SEMANTIC_SIZE};
pub use parse::{parse_document, parser_for};
pub use reconstruct::{reconstruct, ReconstructedContent};
pub use semantic::{semantic_diff, semantic_diff_with, DiffPayload, DiffResult};
