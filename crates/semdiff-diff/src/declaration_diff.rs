//! Declaration-level diff for source code.
//!
//! Parses both versions with tree-sitter, collects the top-level
//! declarations (functions, types, imports, ...) and compares them by
//! `kind + name`, reporting additions, removals and modified bodies.

use std::collections::HashMap;
use std::path::Path;

use tree_sitter::{Node, Parser};

use crate::document_diff::{Change, ChangeKind, ChangeSet};
use crate::error::{ParseError, ParseResult};

/// Languages with declaration-level diff support.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CodeLanguage {
    Rust,
    Python,
}

impl CodeLanguage {
    /// Pick the language from a file extension.
    pub fn from_path(path: &str) -> Option<Self> {
        let ext = Path::new(path).extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "rs" => Some(CodeLanguage::Rust),
            "py" => Some(CodeLanguage::Python),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CodeLanguage::Rust => "rust",
            CodeLanguage::Python => "python",
        }
    }

    fn grammar(self) -> tree_sitter::Language {
        match self {
            CodeLanguage::Rust => tree_sitter_rust::language(),
            CodeLanguage::Python => tree_sitter_python::language(),
        }
    }

    /// Node kinds that count as top-level declarations.
    fn declaration_kinds(self) -> &'static [&'static str] {
        match self {
            CodeLanguage::Rust => &[
                "function_item",
                "struct_item",
                "enum_item",
                "union_item",
                "impl_item",
                "trait_item",
                "mod_item",
                "use_declaration",
                "type_item",
                "const_item",
                "static_item",
                "macro_definition",
            ],
            CodeLanguage::Python => &[
                "function_definition",
                "class_definition",
                "decorated_definition",
                "import_statement",
                "import_from_statement",
            ],
        }
    }
}

/// A named top-level construct.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    /// Grammar node kind, e.g. `function_item`.
    pub kind: String,
    pub name: String,
    /// Full source text of the declaration.
    pub text: String,
}

impl Declaration {
    fn key(&self) -> String {
        format!("{} {}", self.kind, self.name)
    }
}

/// Parse `source` and return its top-level declarations in source order.
///
/// Source with syntax errors is rejected: tree-sitter recovers from them,
/// but the recovered tree does not describe the real declarations.
pub fn extract_declarations(language: CodeLanguage, source: &str) -> ParseResult<Vec<Declaration>> {
    let mut parser = Parser::new();
    parser
        .set_language(&language.grammar())
        .map_err(|e| ParseError::Syntax {
            language: language.name(),
            reason: e.to_string(),
        })?;

    let tree = parser.parse(source, None).ok_or_else(|| ParseError::Syntax {
        language: language.name(),
        reason: "parser produced no tree".to_string(),
    })?;

    let root = tree.root_node();
    if root.has_error() {
        return Err(ParseError::Syntax {
            language: language.name(),
            reason: "source contains syntax errors".to_string(),
        });
    }
    let kinds = language.declaration_kinds();
    let bytes = source.as_bytes();
    let mut decls = Vec::new();

    for i in 0..root.child_count() {
        let Some(child) = root.child(i) else { continue };
        if !kinds.contains(&child.kind()) {
            continue;
        }

        let name = declaration_name(child, bytes)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("_{}_{}", child.kind(), i));

        decls.push(Declaration {
            kind: child.kind().to_string(),
            name,
            text: node_text(child, bytes).to_string(),
        });
    }

    Ok(decls)
}

fn node_text<'a>(node: Node<'_>, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or_default()
}

fn declaration_name(node: Node<'_>, source: &[u8]) -> Option<String> {
    match node.kind() {
        // impl blocks are named after the type, plus the trait when present.
        "impl_item" => {
            let ty = node_text(node.child_by_field_name("type")?, source);
            match node.child_by_field_name("trait") {
                Some(tr) => Some(format!("{} for {}", node_text(tr, source), ty)),
                None => Some(ty.to_string()),
            }
        }
        "decorated_definition" => {
            declaration_name(node.child_by_field_name("definition")?, source)
        }
        "use_declaration" | "import_statement" | "import_from_statement" => {
            Some(squash_whitespace(node_text(node, source)))
        }
        _ => node
            .child_by_field_name("name")
            .map(|n| node_text(n, source).to_string())
            .or_else(|| first_identifier(node, source)),
    }
}

fn first_identifier(node: Node<'_>, source: &[u8]) -> Option<String> {
    (0..node.child_count())
        .filter_map(|i| node.child(i))
        .find(|c| matches!(c.kind(), "identifier" | "type_identifier"))
        .map(|c| node_text(c, source).to_string())
}

fn squash_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Compare two declaration lists.
///
/// Entries are keyed `<kind> <name>`; repeated keys get a `#n` suffix so
/// overloads and duplicate imports stay distinct. Output follows base
/// order, then declarations new in head.
pub fn diff_declarations(base: &[Declaration], head: &[Declaration]) -> ChangeSet {
    let base_keyed = index_declarations(base);
    let head_keyed = index_declarations(head);
    let head_map: HashMap<&str, &Declaration> =
        head_keyed.iter().map(|(k, d)| (k.as_str(), *d)).collect();
    let base_map: HashMap<&str, &Declaration> =
        base_keyed.iter().map(|(k, d)| (k.as_str(), *d)).collect();

    let mut changes = Vec::new();

    for (key, old) in &base_keyed {
        match head_map.get(key.as_str()) {
            Some(new) if new.text != old.text => changes.push(Change::modified(key.clone())),
            Some(_) => {}
            None => changes.push(Change::opaque(key.clone(), ChangeKind::Removed)),
        }
    }

    for (key, _) in &head_keyed {
        if !base_map.contains_key(key.as_str()) {
            changes.push(Change::opaque(key.clone(), ChangeKind::Added));
        }
    }

    ChangeSet { changes }
}

fn index_declarations(decls: &[Declaration]) -> Vec<(String, &Declaration)> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    decls
        .iter()
        .map(|d| {
            let key = d.key();
            let count = seen.entry(key.clone()).or_insert(0);
            *count += 1;
            let key = if *count == 1 { key } else { format!("{key}#{count}") };
            (key, d)
        })
        .collect()
}
