//! Format-specific parsers producing [`StructuralNode`] trees.
//!
//! Each structured [`DiffFormat`] maps to one parser function through
//! [`parser_for`]; adding a format means adding a tag and one table entry.

use std::collections::HashSet;

use crate::error::{ParseError, ParseResult};
use crate::format::DiffFormat;
use crate::node::{ObjectMap, Scalar, StructuralNode};

/// Signature shared by every document parser.
pub type DocumentParser = fn(&str) -> ParseResult<StructuralNode>;

/// Look up the parser for a format, or `None` if the format has no
/// structural representation.
pub fn parser_for(format: DiffFormat) -> Option<DocumentParser> {
    match format {
        DiffFormat::Json => Some(parse_json),
        DiffFormat::Yaml => Some(parse_yaml),
        DiffFormat::Csv => Some(parse_csv),
        DiffFormat::Toml => Some(parse_toml),
        DiffFormat::CodeDeclaration | DiffFormat::Fallback => None,
    }
}

/// Parse raw bytes as a document of the given format.
pub fn parse_document(format: DiffFormat, content: &[u8]) -> ParseResult<StructuralNode> {
    let parser = parser_for(format).ok_or(ParseError::Unsupported(format))?;
    let text = std::str::from_utf8(content).map_err(|_| ParseError::NotUtf8)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    parser(text)
}

// ---- JSON ----

pub fn parse_json(text: &str) -> ParseResult<StructuralNode> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    Ok(from_json(value))
}

fn from_json(value: serde_json::Value) -> StructuralNode {
    use serde_json::Value;

    match value {
        Value::Null => StructuralNode::null(),
        Value::Bool(b) => Scalar::Bool(b).into(),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Scalar::Integer(i).into(),
            None => Scalar::Float(n.as_f64().unwrap_or(f64::NAN)).into(),
        },
        Value::String(s) => StructuralNode::string(s),
        Value::Array(items) => StructuralNode::Array(items.into_iter().map(from_json).collect()),
        Value::Object(map) => {
            StructuralNode::Object(map.into_iter().map(|(k, v)| (k, from_json(v))).collect())
        }
    }
}

// ---- YAML ----

pub fn parse_yaml(text: &str) -> ParseResult<StructuralNode> {
    if text.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    let value: serde_yaml::Value = serde_yaml::from_str(text)?;
    Ok(from_yaml(value))
}

fn from_yaml(value: serde_yaml::Value) -> StructuralNode {
    use serde_yaml::Value;

    match value {
        Value::Null => StructuralNode::null(),
        Value::Bool(b) => Scalar::Bool(b).into(),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Scalar::Integer(i).into(),
            None => Scalar::Float(n.as_f64().unwrap_or(f64::NAN)).into(),
        },
        Value::String(s) => StructuralNode::string(s),
        Value::Sequence(items) => {
            StructuralNode::Array(items.into_iter().map(from_yaml).collect())
        }
        Value::Mapping(map) => StructuralNode::Object(
            map.into_iter()
                .map(|(k, v)| (yaml_key(&k), from_yaml(v)))
                .collect(),
        ),
        Value::Tagged(tagged) => from_yaml(tagged.value),
    }
}

/// Render a YAML mapping key as a string; YAML allows non-string keys.
fn yaml_key(key: &serde_yaml::Value) -> String {
    use serde_yaml::Value;

    match key {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

// ---- TOML ----

pub fn parse_toml(text: &str) -> ParseResult<StructuralNode> {
    let table: toml::Table = toml::from_str(text)?;
    Ok(from_toml(toml::Value::Table(table)))
}

fn from_toml(value: toml::Value) -> StructuralNode {
    use toml::Value;

    match value {
        Value::String(s) => StructuralNode::string(s),
        Value::Integer(i) => Scalar::Integer(i).into(),
        Value::Float(x) => Scalar::Float(x).into(),
        Value::Boolean(b) => Scalar::Bool(b).into(),
        Value::Datetime(dt) => StructuralNode::string(dt.to_string()),
        Value::Array(items) => StructuralNode::Array(items.into_iter().map(from_toml).collect()),
        Value::Table(table) => StructuralNode::Object(
            table.into_iter().map(|(k, v)| (k, from_toml(v))).collect(),
        ),
    }
}

// ---- CSV ----

/// Parse CSV into an array of rows.
///
/// With a usable header row (non-empty, unique names) each data row becomes
/// an object keyed by column name; otherwise every row, header included, is
/// an array of strings.
pub fn parse_csv(text: &str) -> ParseResult<StructuralNode> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    let Some((header, data)) = rows.split_first() else {
        return Ok(StructuralNode::Array(Vec::new()));
    };

    if !is_usable_header(header) {
        return Ok(StructuralNode::Array(
            rows.iter().map(|row| csv_row_array(row)).collect(),
        ));
    }

    let records = data
        .iter()
        .map(|row| {
            let mut object = ObjectMap::new();
            for (i, cell) in row.iter().enumerate() {
                let column = header.get(i).cloned().unwrap_or_else(|| format!("[{i}]"));
                object.insert(column, StructuralNode::string(cell.as_str()));
            }
            StructuralNode::Object(object)
        })
        .collect();

    Ok(StructuralNode::Array(records))
}

fn is_usable_header(header: &[String]) -> bool {
    let mut seen = HashSet::new();
    !header.is_empty()
        && header
            .iter()
            .all(|name| !name.trim().is_empty() && seen.insert(name.as_str()))
}

fn csv_row_array(row: &[String]) -> StructuralNode {
    StructuralNode::Array(row.iter().map(|c| StructuralNode::string(c.as_str())).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(node: &StructuralNode) -> Vec<String> {
        match node {
            StructuralNode::Object(map) => map.keys().map(str::to_string).collect(),
            other => panic!("expected object, got {}", other.kind_name()),
        }
    }

    #[test]
    fn json_preserves_key_order() {
        let node = parse_json(r#"{"zeta": 1, "alpha": 2, "mid": 3}"#).unwrap();
        assert_eq!(keys(&node), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn json_numbers_are_typed() {
        let node = parse_json(r#"[1, 1.5, "1", true, null]"#).unwrap();
        let StructuralNode::Array(items) = node else {
            panic!("expected array")
        };
        assert_eq!(items[0], Scalar::Integer(1).into());
        assert_eq!(items[1], Scalar::Float(1.5).into());
        assert_eq!(items[2], StructuralNode::string("1"));
        assert_eq!(items[3], Scalar::Bool(true).into());
        assert_eq!(items[4], StructuralNode::null());
    }

    #[test]
    fn invalid_json_is_error() {
        assert!(matches!(parse_json("not json"), Err(ParseError::Json(_))));
    }

    #[test]
    fn yaml_mapping_order_and_nesting() {
        let node = parse_yaml("b: 1\na:\n  c: true\n").unwrap();
        assert_eq!(keys(&node), vec!["b", "a"]);
        let StructuralNode::Object(map) = &node else {
            unreachable!()
        };
        assert_eq!(keys(map.get("a").unwrap()), vec!["c"]);
    }

    #[test]
    fn yaml_non_string_keys_are_stringified() {
        let node = parse_yaml("1: one\ntrue: yes\n").unwrap();
        assert_eq!(keys(&node), vec!["1", "true"]);
    }

    #[test]
    fn empty_yaml_is_error() {
        assert!(matches!(parse_yaml(""), Err(ParseError::Empty)));
        assert!(matches!(parse_yaml("  \n"), Err(ParseError::Empty)));
    }

    #[test]
    fn invalid_yaml_is_error() {
        assert!(parse_yaml("key: [unclosed").is_err());
    }

    #[test]
    fn toml_tables_and_datetimes() {
        let node = parse_toml(
            "title = \"x\"\n[owner]\nname = \"Tom\"\ndob = 1979-05-27T07:32:00Z\n",
        )
        .unwrap();
        assert_eq!(keys(&node), vec!["title", "owner"]);
        let StructuralNode::Object(map) = &node else {
            unreachable!()
        };
        let StructuralNode::Object(owner) = map.get("owner").unwrap() else {
            panic!("expected table")
        };
        assert_eq!(
            owner.get("dob"),
            Some(&StructuralNode::string("1979-05-27T07:32:00Z"))
        );
    }

    #[test]
    fn invalid_toml_is_error() {
        assert!(matches!(parse_toml("key = "), Err(ParseError::Toml(_))));
    }

    #[test]
    fn csv_with_header_becomes_records() {
        let node = parse_csv("id,name\n1,Alice\n2,Bob\n").unwrap();
        let StructuralNode::Array(rows) = node else {
            panic!("expected array")
        };
        assert_eq!(rows.len(), 2);
        assert_eq!(keys(&rows[1]), vec!["id", "name"]);
    }

    #[test]
    fn csv_ragged_rows_use_index_for_extra_cells() {
        let node = parse_csv("id,name\n1,Alice,extra\n2\n").unwrap();
        let StructuralNode::Array(rows) = node else {
            panic!("expected array")
        };
        assert_eq!(keys(&rows[0]), vec!["id", "name", "[2]"]);
        assert_eq!(keys(&rows[1]), vec!["id"]);
    }

    #[test]
    fn csv_duplicate_header_falls_back_to_arrays() {
        let node = parse_csv("a,a\n1,2\n").unwrap();
        let StructuralNode::Array(rows) = node else {
            panic!("expected array")
        };
        assert_eq!(rows.len(), 2);
        assert!(matches!(rows[0], StructuralNode::Array(_)));
    }

    #[test]
    fn parse_document_rejects_unsupported_and_binary() {
        assert!(matches!(
            parse_document(DiffFormat::Fallback, b"x"),
            Err(ParseError::Unsupported(DiffFormat::Fallback))
        ));
        assert!(matches!(
            parse_document(DiffFormat::Json, &[0xff, 0xfe]),
            Err(ParseError::NotUtf8)
        ));
    }

    #[test]
    fn parse_document_strips_bom() {
        let node = parse_document(DiffFormat::Json, "\u{feff}{\"a\": 1}".as_bytes()).unwrap();
        assert_eq!(keys(&node), vec!["a"]);
    }
}
