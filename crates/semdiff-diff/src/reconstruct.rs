//! Rebuild approximate base and head content from a unified-diff hunk stream.
//!
//! Used when only a patch is available (reviewing an existing change)
//! rather than both full files. The result holds only the lines inside
//! hunks, so it is a best-effort view of each side, not the real file.

/// Content recovered from a patch. A side is `None` when no line of the
/// patch contributed to it (pure addition or pure deletion).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconstructedContent {
    pub base: Option<String>,
    pub head: Option<String>,
}

impl ReconstructedContent {
    pub fn base_bytes(&self) -> Option<&[u8]> {
        self.base.as_deref().map(str::as_bytes)
    }

    pub fn head_bytes(&self) -> Option<&[u8]> {
        self.head.as_deref().map(str::as_bytes)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ScanState {
    /// Before the first `@@` marker; everything is skipped.
    Preamble,
    InHunk,
}

/// Classification of a single patch line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PatchLine<'a> {
    HunkMarker,
    Removed(&'a str),
    Added(&'a str),
    Context(&'a str),
    /// An empty raw line, read as an empty context line.
    Blank,
    NoNewlineMarker,
    Other,
}

impl<'a> PatchLine<'a> {
    fn classify(line: &'a str) -> Self {
        if line.starts_with("@@") {
            return PatchLine::HunkMarker;
        }
        if line.starts_with('\\') {
            return PatchLine::NoNewlineMarker;
        }
        match line.split_at_checked(1) {
            Some(("-", rest)) => PatchLine::Removed(rest),
            Some(("+", rest)) => PatchLine::Added(rest),
            Some((" ", rest)) => PatchLine::Context(rest),
            None if line.is_empty() => PatchLine::Blank,
            _ => PatchLine::Other,
        }
    }
}

#[derive(Default)]
struct Sides<'a> {
    base: Vec<&'a str>,
    head: Vec<&'a str>,
}

impl<'a> Sides<'a> {
    fn both(&mut self, line: &'a str) {
        self.base.push(line);
        self.head.push(line);
    }

    fn finish(self) -> Option<ReconstructedContent> {
        let join = |lines: Vec<&str>| (!lines.is_empty()).then(|| lines.join("\n"));
        let content = ReconstructedContent {
            base: join(self.base),
            head: join(self.head),
        };
        (content.base.is_some() || content.head.is_some()).then_some(content)
    }
}

/// Replay the hunks of `patch` into base and head text.
///
/// Returns `None` if no line was collected, in which case the caller should
/// keep the patch as it is.
pub fn reconstruct(patch: &str) -> Option<ReconstructedContent> {
    let mut state = ScanState::Preamble;
    let mut sides = Sides::default();

    for line in patch.lines() {
        let class = PatchLine::classify(line);
        match (state, class) {
            (_, PatchLine::HunkMarker) => state = ScanState::InHunk,
            (ScanState::Preamble, _) => {}
            (ScanState::InHunk, PatchLine::Removed(text)) => sides.base.push(text),
            (ScanState::InHunk, PatchLine::Added(text)) => sides.head.push(text),
            (ScanState::InHunk, PatchLine::Context(text)) => sides.both(text),
            (ScanState::InHunk, PatchLine::Blank) => sides.both(""),
            (ScanState::InHunk, PatchLine::NoNewlineMarker | PatchLine::Other) => {}
        }
    }

    sides.finish()
}
