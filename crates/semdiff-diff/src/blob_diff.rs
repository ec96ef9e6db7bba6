//! Line diffs and unified-diff text, the view used whenever a file cannot
//! be compared structurally. Hunks come from `similar` (Myers).

use similar::{ChangeTag, TextDiff};

/// Context lines around each hunk when none are configured.
pub const DEFAULT_CONTEXT_LINES: usize = 3;

/// Line-level difference between two contents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlobDiff {
    pub hunks: Vec<DiffHunk>,
    /// At least one side is not UTF-8; hunks hold a size summary only.
    pub binary: bool,
}

impl BlobDiff {
    fn unchanged(binary: bool) -> Self {
        Self {
            hunks: Vec::new(),
            binary,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }

    pub fn additions(&self) -> usize {
        self.count(|l| matches!(l, DiffLine::Added(_)))
    }

    pub fn removals(&self) -> usize {
        self.count(|l| matches!(l, DiffLine::Removed(_)))
    }

    fn count(&self, pred: impl Fn(&DiffLine) -> bool) -> usize {
        self.hunks.iter().flat_map(|h| &h.lines).filter(|l| pred(l)).count()
    }
}

/// One `@@` block: a run of changes with surrounding context.
///
/// Starts are 1-based line numbers; counts are the number of lines the
/// hunk spans on each side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiffHunk {
    pub old_start: usize,
    pub old_count: usize,
    pub new_start: usize,
    pub new_count: usize,
    pub lines: Vec<DiffLine>,
}

impl DiffHunk {
    /// The `@@ -a,b +c,d @@` marker. An empty side is anchored at the line
    /// before the hunk, as `diff -u` does.
    pub fn header(&self) -> String {
        let anchor = |start: usize, count: usize| if count == 0 { start - 1 } else { start };
        format!(
            "@@ -{},{} +{},{} @@",
            anchor(self.old_start, self.old_count),
            self.old_count,
            anchor(self.new_start, self.new_count),
            self.new_count
        )
    }
}

/// A hunk line without its trailing newline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiffLine {
    Context(String),
    Added(String),
    Removed(String),
}

impl DiffLine {
    fn prefix(&self) -> char {
        match self {
            DiffLine::Context(_) => ' ',
            DiffLine::Added(_) => '+',
            DiffLine::Removed(_) => '-',
        }
    }

    fn text(&self) -> &str {
        match self {
            DiffLine::Context(t) | DiffLine::Added(t) | DiffLine::Removed(t) => t,
        }
    }
}

/// Compute a line-by-line diff with the default context radius.
pub fn diff_blobs(old: &[u8], new: &[u8]) -> BlobDiff {
    diff_blobs_with_context(old, new, DEFAULT_CONTEXT_LINES)
}

/// Line diff keeping `context` unchanged lines around each change.
///
/// Non-UTF-8 input yields a single synthetic hunk describing the sizes.
pub fn diff_blobs_with_context(old: &[u8], new: &[u8], context: usize) -> BlobDiff {
    let (Ok(old_str), Ok(new_str)) = (std::str::from_utf8(old), std::str::from_utf8(new)) else {
        return binary_diff(old, new);
    };
    if old_str == new_str {
        return BlobDiff::unchanged(false);
    }

    let text_diff = TextDiff::from_lines(old_str, new_str);
    let mut hunks = Vec::new();

    for group in text_diff.grouped_ops(context) {
        let (Some(first), Some(last)) = (group.first(), group.last()) else {
            continue;
        };
        let old_range = first.old_range().start..last.old_range().end;
        let new_range = first.new_range().start..last.new_range().end;

        let mut lines = Vec::new();
        for op in &group {
            for change in text_diff.iter_changes(op) {
                let text = change.value().trim_end_matches(['\n', '\r']).to_string();
                lines.push(match change.tag() {
                    ChangeTag::Equal => DiffLine::Context(text),
                    ChangeTag::Delete => DiffLine::Removed(text),
                    ChangeTag::Insert => DiffLine::Added(text),
                });
            }
        }

        hunks.push(DiffHunk {
            old_start: old_range.start + 1,
            old_count: old_range.len(),
            new_start: new_range.start + 1,
            new_count: new_range.len(),
            lines,
        });
    }

    BlobDiff {
        hunks,
        binary: false,
    }
}

fn binary_diff(old: &[u8], new: &[u8]) -> BlobDiff {
    if old == new {
        return BlobDiff::unchanged(true);
    }

    let summary = |bytes: &[u8]| format!("(binary content, {} bytes)", bytes.len());
    let mut lines = Vec::new();
    if !old.is_empty() {
        lines.push(DiffLine::Removed(summary(old)));
    }
    if !new.is_empty() {
        lines.push(DiffLine::Added(summary(new)));
    }

    BlobDiff {
        hunks: vec![DiffHunk {
            old_start: 1,
            old_count: usize::from(!old.is_empty()),
            new_start: 1,
            new_count: usize::from(!new.is_empty()),
            lines,
        }],
        binary: true,
    }
}

/// Render a unified diff of `path` between two optional contents.
///
/// An absent side is labelled `/dev/null` and diffed as empty. Identical
/// contents render as an empty string.
pub fn unified_diff(path: &str, old: Option<&[u8]>, new: Option<&[u8]>, context: usize) -> String {
    let diff = diff_blobs_with_context(old.unwrap_or_default(), new.unwrap_or_default(), context);
    if diff.is_empty() {
        return String::new();
    }

    let old_label = old.map_or_else(|| "/dev/null".to_string(), |_| format!("a/{path}"));
    let new_label = new.map_or_else(|| "/dev/null".to_string(), |_| format!("b/{path}"));

    if diff.binary {
        return format!("Binary files {old_label} and {new_label} differ\n");
    }

    let mut out = format!("--- {old_label}\n+++ {new_label}\n");
    for hunk in &diff.hunks {
        out.push_str(&hunk.header());
        out.push('\n');
        for line in &hunk.lines {
            out.push(line.prefix());
            out.push_str(line.text());
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_text_has_no_hunks() {
        assert!(diff_blobs(b"x\ny\n", b"x\ny\n").is_empty());
    }

    #[test]
    fn counts_added_and_removed_lines() {
        let diff = diff_blobs(b"keep\nold\n", b"keep\nnew\nextra\n");
        assert_eq!(diff.additions(), 2);
        assert_eq!(diff.removals(), 1);
    }

    #[test]
    fn crlf_line_endings_are_trimmed() {
        let diff = diff_blobs(b"a\r\nb\r\n", b"a\r\nc\r\n");
        assert!(diff.hunks[0].lines.contains(&DiffLine::Removed("b".into())));
    }

    #[test]
    fn non_utf8_yields_size_summary() {
        let diff = diff_blobs(&[0xFF, 0x01], &[0xFE, 0x01, 0x02]);
        assert!(diff.binary);
        assert_eq!(
            diff.hunks[0].lines,
            vec![
                DiffLine::Removed("(binary content, 2 bytes)".into()),
                DiffLine::Added("(binary content, 3 bytes)".into()),
            ]
        );
    }

    #[test]
    fn hunk_ranges_cover_context() {
        let old = b"a\nb\nc\nd\ne\nf\ng\nh\ni\nj\n";
        let new = b"a\nb\nc\nd\nX\nf\ng\nh\ni\nj\n";

        let diff = diff_blobs(old, new);
        let hunk = &diff.hunks[0];
        assert_eq!((hunk.old_start, hunk.old_count), (2, 7));
        assert_eq!((hunk.new_start, hunk.new_count), (2, 7));
        assert_eq!(hunk.header(), "@@ -2,7 +2,7 @@");
    }

    #[test]
    fn context_radius_is_configurable() {
        let old = b"a\nb\nc\nd\ne\n";
        let new = b"a\nb\nX\nd\ne\n";

        let diff = diff_blobs_with_context(old, new, 0);
        assert_eq!(diff.hunks[0].lines.len(), 2);
        assert_eq!(diff.hunks[0].header(), "@@ -3,1 +3,1 @@");
    }

    #[test]
    fn unified_rendering() {
        let text = unified_diff("notes.txt", Some(b"one\ntwo\n"), Some(b"one\nthree\n"), 3);
        assert_eq!(
            text,
            "--- a/notes.txt\n+++ b/notes.txt\n@@ -1,2 +1,2 @@\n one\n-two\n+three\n"
        );
    }

    #[test]
    fn unified_rendering_of_added_file() {
        let text = unified_diff("new.json", None, Some(b"{}\n"), 3);
        assert_eq!(text, "--- /dev/null\n+++ b/new.json\n@@ -0,0 +1,1 @@\n+{}\n");
    }

    #[test]
    fn unified_rendering_of_deleted_file() {
        let text = unified_diff("old.yaml", Some(b"a: 1\nb: 2\n"), None, 3);
        assert_eq!(text, "--- a/old.yaml\n+++ /dev/null\n@@ -1,2 +0,0 @@\n-a: 1\n-b: 2\n");
    }

    #[test]
    fn unified_rendering_of_identical_content_is_empty() {
        assert_eq!(unified_diff("x.txt", Some(b"same\n"), Some(b"same\n"), 3), "");
    }

    #[test]
    fn unified_rendering_of_multiple_hunks() {
        let old = b"a\nb\nc\nd\ne\nf\ng\nh\n";
        let new = b"A\nb\nc\nd\ne\nf\ng\nH\n";
        let text = unified_diff("two.txt", Some(old), Some(new), 1);
        assert_eq!(
            text,
            "--- a/two.txt\n+++ b/two.txt\n@@ -1,2 +1,2 @@\n-a\n+A\n b\n@@ -7,2 +7,2 @@\n g\n-h\n+H\n"
        );
    }

    #[test]
    fn unified_rendering_of_binary_content() {
        let text = unified_diff("logo.png", Some(&[0xFF, 0x00]), Some(&[0xFE, 0x00]), 3);
        assert_eq!(text, "Binary files a/logo.png and b/logo.png differ\n");
    }
}
