//! Document-level diff: compare two [`StructuralNode`] trees.
//!
//! Objects are compared by key identity, so key order never produces a
//! change. Arrays are compared index-by-index, so reordering does. Every
//! change carries a path such as `a.b[2].c`.

use std::fmt;

use serde::Serialize;

use crate::node::{ObjectMap, StructuralNode};

/// The list of changes between two documents.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ChangeSet {
    pub changes: Vec<Change>,
}

impl ChangeSet {
    /// Create an empty change set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if there are no changes.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of changes.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Number of added keys, indices or declarations.
    pub fn additions(&self) -> usize {
        self.count(ChangeKind::Added)
    }

    /// Number of removed keys, indices or declarations.
    pub fn removals(&self) -> usize {
        self.count(ChangeKind::Removed)
    }

    /// Number of changed values and modified declarations.
    pub fn modifications(&self) -> usize {
        self.count(ChangeKind::Changed) + self.count(ChangeKind::Modified)
    }

    fn count(&self, kind: ChangeKind) -> usize {
        self.changes.iter().filter(|c| c.kind == kind).count()
    }

    /// One line per change, or `no changes detected`.
    pub fn render(&self) -> String {
        if self.changes.is_empty() {
            return "no changes detected".to_string();
        }
        self.changes
            .iter()
            .map(Change::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// What happened at a path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Removed,
    /// A value was replaced; both sides are recorded.
    Changed,
    /// An opaque entry (e.g. a declaration) differs; no values are recorded.
    Modified,
}

/// A single change between two documents.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Change {
    /// Dotted key path with `[i]` indices, or a declaration key such as
    /// `function_item main`. Empty for the document root.
    pub path: String,
    pub kind: ChangeKind,
    /// Base-side value; absent for additions and opaque entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old: Option<StructuralNode>,
    /// Head-side value; absent for removals and opaque entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new: Option<StructuralNode>,
}

impl Change {
    /// A key or index present only in head.
    pub fn added(path: impl Into<String>, value: StructuralNode) -> Self {
        Self {
            path: path.into(),
            kind: ChangeKind::Added,
            old: None,
            new: Some(value),
        }
    }

    /// A key or index present only in base.
    pub fn removed(path: impl Into<String>, value: StructuralNode) -> Self {
        Self {
            path: path.into(),
            kind: ChangeKind::Removed,
            old: Some(value),
            new: None,
        }
    }

    /// A value replaced by a different one.
    pub fn changed(path: impl Into<String>, old: StructuralNode, new: StructuralNode) -> Self {
        Self {
            path: path.into(),
            kind: ChangeKind::Changed,
            old: Some(old),
            new: Some(new),
        }
    }

    /// An opaque entry whose content differs.
    pub fn modified(path: impl Into<String>) -> Self {
        Self::opaque(path, ChangeKind::Modified)
    }

    /// A change that records no values, such as an added or removed
    /// declaration.
    pub fn opaque(path: impl Into<String>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
            old: None,
            new: None,
        }
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "(root)" } else { self.path.as_str() };
        let render = |node: &Option<StructuralNode>| {
            node.as_ref().map(StructuralNode::render).unwrap_or_default()
        };
        match (self.kind, &self.old, &self.new) {
            (ChangeKind::Added, _, None) => write!(f, "{path}: added"),
            (ChangeKind::Removed, None, _) => write!(f, "{path}: removed"),
            (ChangeKind::Added, _, _) => write!(f, "{path}: added {}", render(&self.new)),
            (ChangeKind::Removed, _, _) => {
                write!(f, "{path}: removed (was {})", render(&self.old))
            }
            (ChangeKind::Changed, _, _) => {
                write!(f, "{path}: {} → {}", render(&self.old), render(&self.new))
            }
            (ChangeKind::Modified, _, _) => write!(f, "{path}: modified"),
        }
    }
}

/// Compute the diff between two documents.
///
/// Output is depth-first. At each level children are visited objects first,
/// then arrays, then scalars (by the base node's kind, or the head node's
/// when the base lacks the child); within a group, keys follow base order
/// and then keys new in head, and indices ascend.
pub fn diff_documents(base: &StructuralNode, head: &StructuralNode) -> ChangeSet {
    let mut changes = Vec::new();
    diff_nodes("", base, head, &mut changes);
    ChangeSet { changes }
}

fn diff_nodes(path: &str, base: &StructuralNode, head: &StructuralNode, out: &mut Vec<Change>) {
    match (base, head) {
        (StructuralNode::Object(b), StructuralNode::Object(h)) => diff_objects(path, b, h, out),
        (StructuralNode::Array(b), StructuralNode::Array(h)) => diff_arrays(path, b, h, out),
        (StructuralNode::Scalar(b), StructuralNode::Scalar(h)) => {
            if b != h {
                out.push(Change::changed(path, base.clone(), head.clone()));
            }
        }
        _ => out.push(Change::changed(path, base.clone(), head.clone())),
    }
}

/// Visiting order of a child by node kind.
fn kind_rank(node: &StructuralNode) -> u8 {
    match node {
        StructuralNode::Object(_) => 0,
        StructuralNode::Array(_) => 1,
        StructuralNode::Scalar(_) => 2,
    }
}

fn diff_objects(path: &str, base: &ObjectMap, head: &ObjectMap, out: &mut Vec<Change>) {
    let mut keys: Vec<&str> = base.keys().collect();
    keys.extend(head.keys().filter(|k| !base.contains_key(k)));

    let mut children: Vec<(&str, Option<&StructuralNode>, Option<&StructuralNode>)> = keys
        .into_iter()
        .map(|k| (k, base.get(k), head.get(k)))
        .collect();
    // Stable: key order is kept within each rank.
    children.sort_by_key(|(_, b, h)| (*b).or(*h).map(kind_rank).unwrap_or(u8::MAX));

    for (key, base_val, head_val) in children {
        let child_path = join_key(path, key);
        match (base_val, head_val) {
            (Some(b), Some(h)) => diff_nodes(&child_path, b, h, out),
            (Some(b), None) => out.push(Change::removed(child_path, b.clone())),
            (None, Some(h)) => out.push(Change::added(child_path, h.clone())),
            (None, None) => {}
        }
    }
}

fn diff_arrays(path: &str, base: &[StructuralNode], head: &[StructuralNode], out: &mut Vec<Change>) {
    let len = base.len().max(head.len());
    let mut indices: Vec<usize> = (0..len).collect();
    indices.sort_by_key(|&i| base.get(i).or(head.get(i)).map(kind_rank).unwrap_or(u8::MAX));

    for i in indices {
        let child_path = format!("{path}[{i}]");
        match (base.get(i), head.get(i)) {
            (Some(b), Some(h)) => diff_nodes(&child_path, b, h, out),
            (Some(b), None) => out.push(Change::removed(child_path, b.clone())),
            (None, Some(h)) => out.push(Change::added(child_path, h.clone())),
            (None, None) => {}
        }
    }
}

fn join_key(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}
