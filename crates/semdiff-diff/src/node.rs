//! Normalized document tree shared by every structured-format parser.
//!
//! Parsers convert their native value type into a [`StructuralNode`], so the
//! differ never depends on any one format's syntax.

use std::collections::HashMap;
use std::fmt;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// A node of a parsed document.
#[derive(Clone, Debug, PartialEq)]
pub enum StructuralNode {
    /// Ordered mapping of unique string keys to child nodes.
    Object(ObjectMap),
    /// Ordered sequence; position is significant.
    Array(Vec<StructuralNode>),
    /// Typed leaf value.
    Scalar(Scalar),
}

impl StructuralNode {
    /// A `null` leaf.
    pub fn null() -> Self {
        StructuralNode::Scalar(Scalar::Null)
    }

    /// A string leaf.
    pub fn string(value: impl Into<String>) -> Self {
        StructuralNode::Scalar(Scalar::String(value.into()))
    }

    /// `object`, `array` or `scalar`.
    pub fn kind_name(&self) -> &'static str {
        match self {
            StructuralNode::Object(_) => "object",
            StructuralNode::Array(_) => "array",
            StructuralNode::Scalar(_) => "scalar",
        }
    }

    /// Render the node for display in a change line: strings quoted,
    /// containers as compact JSON.
    pub fn render(&self) -> String {
        match self {
            StructuralNode::Scalar(scalar) => scalar.to_string(),
            container => serde_json::to_string(container).unwrap_or_default(),
        }
    }
}

impl From<Scalar> for StructuralNode {
    fn from(scalar: Scalar) -> Self {
        StructuralNode::Scalar(scalar)
    }
}

impl Serialize for StructuralNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StructuralNode::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map.iter() {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
            StructuralNode::Array(items) => {
                let mut out = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    out.serialize_element(item)?;
                }
                out.end()
            }
            StructuralNode::Scalar(scalar) => scalar.serialize(serializer),
        }
    }
}

/// A typed leaf value.
///
/// Equality is type-of-value equality: `String("1")` never equals
/// `Integer(1)`. Integers and floats are both numbers and compare
/// numerically, and NaN equals NaN so an unchanged NaN is not a change.
#[derive(Clone, Debug)]
pub enum Scalar {
    /// JSON `null` and YAML `~`.
    Null,
    Bool(bool),
    /// Any integer that fits in `i64`.
    Integer(i64),
    /// Non-integral numbers, and integers too large for `i64`.
    Float(f64),
    String(String),
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Scalar::Null, Scalar::Null) => true,
            (Scalar::Bool(a), Scalar::Bool(b)) => a == b,
            (Scalar::Integer(a), Scalar::Integer(b)) => a == b,
            (Scalar::Float(a), Scalar::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Scalar::Integer(a), Scalar::Float(b)) | (Scalar::Float(b), Scalar::Integer(a)) => {
                *a as f64 == *b
            }
            (Scalar::String(a), Scalar::String(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => f.write_str("null"),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Integer(i) => write!(f, "{i}"),
            Scalar::Float(x) => write!(f, "{x}"),
            Scalar::String(s) => write!(f, "{s:?}"),
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Null => serializer.serialize_unit(),
            Scalar::Bool(b) => serializer.serialize_bool(*b),
            Scalar::Integer(i) => serializer.serialize_i64(*i),
            Scalar::Float(x) => serializer.serialize_f64(*x),
            Scalar::String(s) => serializer.serialize_str(s),
        }
    }
}

/// Insertion-ordered map with unique keys.
///
/// Inserting an existing key replaces its value in place, keeping the
/// position of the first occurrence.
#[derive(Clone, Debug, Default)]
pub struct ObjectMap {
    entries: Vec<(String, StructuralNode)>,
    index: HashMap<String, usize>,
}

impl ObjectMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace `key`. A replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: StructuralNode) {
        let key = key.into();
        match self.index.get(&key) {
            Some(&pos) => self.entries[pos].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&StructuralNode> {
        self.index.get(key).map(|&pos| &self.entries[pos].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StructuralNode)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl PartialEq for ObjectMap {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: Into<String>> FromIterator<(K, StructuralNode)> for ObjectMap {
    fn from_iter<I: IntoIterator<Item = (K, StructuralNode)>>(iter: I) -> Self {
        let mut map = ObjectMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}
