//! Multi-file diff post-processing.
//!
//! Splits a `git diff` style patch into per-file sections, replaces the hunk
//! body of each structured file with its semantic diff, and stitches the
//! result back together. Sections that are not rewritten are emitted
//! byte-for-byte as they appeared in the input.

use tracing::debug;

use crate::format::{detect_format, DiffFormat};
use crate::options::DiffOptions;
use crate::reconstruct::reconstruct;
use crate::semantic::semantic_diff_with;

const DELIMITER: &str = "diff --git ";

/// Prefixes of the per-file metadata lines that follow the delimiter.
const HEADER_PREFIXES: &[&str] = &[
    "index ",
    "---",
    "+++",
    "new file",
    "deleted file",
    "old mode",
    "new mode",
    "similarity",
    "dissimilarity",
    "rename ",
    "copy ",
    "Binary",
];

/// One file's worth of a multi-file diff.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiffSection {
    /// Head-side path of the file.
    pub filename: String,
    /// The delimiter line and its metadata lines, newline-joined.
    pub header: String,
    /// Everything after the header, newline-joined. `None` for header-only
    /// sections (pure renames, mode changes, binary files).
    pub patch: Option<String>,
}

impl DiffSection {
    pub fn format(&self) -> DiffFormat {
        detect_format(&self.filename)
    }

    /// The section exactly as it appeared in the input.
    pub fn original(&self) -> String {
        match &self.patch {
            Some(patch) => format!("{}\n{}", self.header, patch),
            None => self.header.clone(),
        }
    }
}

/// A parsed multi-file diff.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MultiFileDiff {
    /// Text before the first delimiter, if any.
    pub preamble: Option<String>,
    pub sections: Vec<DiffSection>,
}

struct SectionBuilder<'a> {
    filename: String,
    header: Vec<&'a str>,
    patch: Option<Vec<&'a str>>,
}

impl<'a> SectionBuilder<'a> {
    fn start(delimiter: &'a str) -> Self {
        let filename = delimiter
            .rsplit_once(" b/")
            .map(|(_, path)| path.to_string())
            .unwrap_or_default();
        Self {
            filename,
            header: vec![delimiter],
            patch: None,
        }
    }

    fn push(&mut self, line: &'a str) {
        if let Some(patch) = &mut self.patch {
            patch.push(line);
            return;
        }
        if HEADER_PREFIXES.iter().any(|p| line.starts_with(p)) {
            if let Some(path) = line.strip_prefix("+++ b/") {
                self.filename = path.to_string();
            }
            self.header.push(line);
        } else {
            self.patch = Some(vec![line]);
        }
    }

    fn finish(self) -> DiffSection {
        DiffSection {
            filename: self.filename,
            header: self.header.join("\n"),
            patch: self.patch.map(|lines| lines.join("\n")),
        }
    }
}

impl MultiFileDiff {
    /// Split `raw` into sections at each `diff --git ` line.
    ///
    /// Only the metadata lines directly after a delimiter belong to the
    /// header; from the first other line on, everything is patch body.
    pub fn parse(raw: &str) -> Self {
        let mut preamble: Vec<&str> = Vec::new();
        let mut sections = Vec::new();
        let mut current: Option<SectionBuilder<'_>> = None;

        for line in raw.split('\n') {
            if line.starts_with(DELIMITER) {
                if let Some(done) = current.take() {
                    sections.push(done.finish());
                }
                current = Some(SectionBuilder::start(line));
                continue;
            }
            match &mut current {
                Some(section) => section.push(line),
                None => preamble.push(line),
            }
        }
        if let Some(done) = current {
            sections.push(done.finish());
        }

        Self {
            preamble: (!sections.is_empty() && !preamble.is_empty()).then(|| preamble.join("\n")),
            sections,
        }
    }
}

/// Semantic replacement for one file's patch with default options.
///
/// Returns `None` when the patch should be kept as it is.
pub fn apply_semantic_diff_to_patch(filename: &str, patch: &str) -> Option<String> {
    apply_semantic_diff_to_patch_with(&DiffOptions::default(), filename, patch)
}

/// Semantic replacement for one file's patch.
pub fn apply_semantic_diff_to_patch_with(
    options: &DiffOptions,
    filename: &str,
    patch: &str,
) -> Option<String> {
    if patch.trim().is_empty() || detect_format(filename) == DiffFormat::Fallback {
        return None;
    }

    let Some(content) = reconstruct(patch) else {
        debug!(filename, "nothing to reconstruct from patch");
        return None;
    };

    let result = semantic_diff_with(options, filename, content.base_bytes(), content.head_bytes());
    if result.used_fallback {
        debug!(filename, message = ?result.message, "keeping original patch");
        return None;
    }

    let rendered = result.render();
    (rendered != patch).then_some(rendered)
}

/// Post-process a multi-file diff with default options.
pub fn process_multi_file_diff(raw: &str) -> String {
    process_multi_file_diff_with(&DiffOptions::default(), raw)
}

/// Post-process a multi-file diff.
///
/// Input without any `diff --git ` line is returned unchanged.
pub fn process_multi_file_diff_with(options: &DiffOptions, raw: &str) -> String {
    let diff = MultiFileDiff::parse(raw);
    if diff.sections.is_empty() {
        return raw.to_string();
    }

    let mut parts: Vec<String> = Vec::with_capacity(diff.sections.len() + 1);
    parts.extend(diff.preamble);

    for section in &diff.sections {
        let semantic = section
            .patch
            .as_deref()
            .and_then(|patch| apply_semantic_diff_to_patch_with(options, &section.filename, patch));

        match semantic {
            Some(rendered) => {
                debug!(filename = %section.filename, "section replaced with semantic diff");
                let trailing = match section.patch.as_deref() {
                    Some(patch) if patch.ends_with('\n') => "\n",
                    _ => "",
                };
                parts.push(format!(
                    "--- {} (semantic diff) ---\n{rendered}{trailing}",
                    section.filename
                ));
            }
            None => parts.push(section.original()),
        }
    }

    parts.join("\n")
}
