//! The semantic differ: pick a strategy for a path and compare two versions.
//!
//! [`semantic_diff`] never fails. Anything that cannot be compared
//! structurally (unknown format, parse error, missing side, oversized input)
//! degrades to a unified diff with `used_fallback` set.

use serde::Serialize;
use tracing::debug;

use crate::blob_diff::unified_diff;
use crate::declaration_diff::{diff_declarations, extract_declarations, CodeLanguage};
use crate::document_diff::{diff_documents, ChangeSet};
use crate::format::{detect_format, DiffFormat};
use crate::options::DiffOptions;
use crate::parse::parse_document;

/// The body of a diff result.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DiffPayload {
    /// Path-qualified changes; serialized as an array of change objects.
    Structural(ChangeSet),
    /// Unified diff text.
    Unified(String),
}

/// Outcome of comparing two versions of one file.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffResult {
    pub format: DiffFormat,
    pub diff: DiffPayload,
    pub used_fallback: bool,
    /// Why a fallback happened, when there is something to say.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DiffResult {
    fn structural(format: DiffFormat, changes: ChangeSet) -> Self {
        Self {
            format,
            diff: DiffPayload::Structural(changes),
            used_fallback: false,
            message: None,
        }
    }

    /// The structural changes, if this result has any.
    pub fn changes(&self) -> Option<&ChangeSet> {
        match &self.diff {
            DiffPayload::Structural(changes) => Some(changes),
            DiffPayload::Unified(_) => None,
        }
    }

    /// Render the diff as text: one line per change, or the unified diff.
    pub fn render(&self) -> String {
        match &self.diff {
            DiffPayload::Structural(changes) => changes.render(),
            DiffPayload::Unified(text) => text.clone(),
        }
    }
}

/// Compare two versions of `path` with default options.
///
/// `None` means the file does not exist on that side.
pub fn semantic_diff(path: &str, base: Option<&[u8]>, head: Option<&[u8]>) -> DiffResult {
    semantic_diff_with(&DiffOptions::default(), path, base, head)
}

/// Compare two versions of `path`.
pub fn semantic_diff_with(
    options: &DiffOptions,
    path: &str,
    base: Option<&[u8]>,
    head: Option<&[u8]>,
) -> DiffResult {
    let format = detect_format(path);
    let fallback = |message: Option<String>| {
        if let Some(reason) = &message {
            debug!(path, %format, reason = %reason, "semantic diff fell back to unified diff");
        }
        DiffResult {
            format,
            diff: DiffPayload::Unified(unified_diff(path, base, head, options.context_lines)),
            used_fallback: true,
            message,
        }
    };

    let (base_bytes, head_bytes) = match (base, head) {
        (None, None) => return fallback(Some("no content on either side".to_string())),
        _ if format == DiffFormat::Fallback => return fallback(None),
        (None, Some(_)) => return fallback(Some("file added".to_string())),
        (Some(_), None) => return fallback(Some("file deleted".to_string())),
        (Some(b), Some(h)) => (b, h),
    };

    if options.exceeds_size_limit(base, head) {
        return fallback(Some(format!(
            "file exceeds maximum size for semantic diff ({} bytes), using unified diff",
            options.max_semantic_size
        )));
    }

    let compared = if format == DiffFormat::CodeDeclaration {
        compare_declarations(path, base_bytes, head_bytes)
    } else {
        compare_documents(format, base_bytes, head_bytes)
    };

    match compared {
        Ok(changes) => {
            debug!(path, %format, changes = changes.len(), "structural diff computed");
            DiffResult::structural(format, changes)
        }
        Err(reason) => fallback(Some(reason)),
    }
}

fn compare_documents(format: DiffFormat, base: &[u8], head: &[u8]) -> Result<ChangeSet, String> {
    let base = parse_document(format, base)
        .map_err(|e| format!("failed to parse base as {format}: {e}"))?;
    let head = parse_document(format, head)
        .map_err(|e| format!("failed to parse head as {format}: {e}"))?;
    Ok(diff_documents(&base, &head))
}

fn compare_declarations(path: &str, base: &[u8], head: &[u8]) -> Result<ChangeSet, String> {
    let language = CodeLanguage::from_path(path)
        .ok_or_else(|| format!("no declaration parser for {path}"))?;
    let text = |side: &str, bytes: &[u8]| {
        std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|_| format!("{side} is not valid UTF-8 text"))
    };
    let (base, head) = (text("base", base)?, text("head", head)?);
    let base_decls = extract_declarations(language, &base)
        .map_err(|e| format!("failed to parse base as {}: {e}", language.name()))?;
    let head_decls = extract_declarations(language, &head)
        .map_err(|e| format!("failed to parse head as {}: {e}", language.name()))?;

    let changes = diff_declarations(&base_decls, &head_decls);
    // Edits between or inside partial declarations leave every key unchanged.
    if changes.is_empty() && base != head {
        return Err("changes are outside any complete top-level declaration".to_string());
    }
    Ok(changes)
}
