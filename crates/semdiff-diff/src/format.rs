//! Format detection: map a file path to a diff strategy.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// The strategy used to diff a file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffFormat {
    Json,
    Yaml,
    Csv,
    Toml,
    /// Source code compared per top-level declaration.
    CodeDeclaration,
    /// No semantic strategy; use a unified diff.
    Fallback,
}

impl DiffFormat {
    /// All formats, in detection-table order.
    pub const ALL: [DiffFormat; 6] = [
        DiffFormat::Json,
        DiffFormat::Yaml,
        DiffFormat::Csv,
        DiffFormat::Toml,
        DiffFormat::CodeDeclaration,
        DiffFormat::Fallback,
    ];

    /// The serialized tag for this format.
    pub fn as_str(self) -> &'static str {
        match self {
            DiffFormat::Json => "json",
            DiffFormat::Yaml => "yaml",
            DiffFormat::Csv => "csv",
            DiffFormat::Toml => "toml",
            DiffFormat::CodeDeclaration => "code_declaration",
            DiffFormat::Fallback => "fallback",
        }
    }

    /// Returns `true` for key/value data formats with a document parser.
    pub fn is_structured(self) -> bool {
        matches!(
            self,
            DiffFormat::Json | DiffFormat::Yaml | DiffFormat::Csv | DiffFormat::Toml
        )
    }

    /// File extensions recognised for this format (lowercase, no dot).
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            DiffFormat::Json => &["json"],
            DiffFormat::Yaml => &["yaml", "yml"],
            DiffFormat::Csv => &["csv"],
            DiffFormat::Toml => &["toml"],
            DiffFormat::CodeDeclaration => &["rs", "py"],
            DiffFormat::Fallback => &[],
        }
    }
}

impl fmt::Display for DiffFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Well-known file names whose extension does not reveal the format.
const KNOWN_FILE_NAMES: &[(&str, DiffFormat)] = &[
    ("cargo.lock", DiffFormat::Toml),
    ("pipfile", DiffFormat::Toml),
    ("poetry.lock", DiffFormat::Toml),
    (".clang-format", DiffFormat::Yaml),
];

/// Classify a path into a [`DiffFormat`].
///
/// Matching is case-insensitive. Unrecognised paths map to
/// [`DiffFormat::Fallback`]; this is a normal outcome, not an error.
pub fn detect_format(path: &str) -> DiffFormat {
    let path = Path::new(path);

    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        let name = name.to_ascii_lowercase();
        if let Some((_, format)) = KNOWN_FILE_NAMES.iter().find(|(known, _)| *known == name) {
            return *format;
        }
    }

    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return DiffFormat::Fallback;
    };
    let ext = ext.to_ascii_lowercase();

    DiffFormat::ALL
        .into_iter()
        .find(|format| format.extensions().contains(&ext.as_str()))
        .unwrap_or(DiffFormat::Fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_extensions() {
        assert_eq!(detect_format("config.json"), DiffFormat::Json);
        assert_eq!(detect_format("deploy/values.yaml"), DiffFormat::Yaml);
        assert_eq!(detect_format(".github/workflows/ci.yml"), DiffFormat::Yaml);
        assert_eq!(detect_format("data/users.csv"), DiffFormat::Csv);
        assert_eq!(detect_format("Cargo.toml"), DiffFormat::Toml);
    }

    #[test]
    fn extension_is_case_insensitive() {
        assert_eq!(detect_format("CONFIG.JSON"), DiffFormat::Json);
        assert_eq!(detect_format("Values.YmL"), DiffFormat::Yaml);
    }

    #[test]
    fn source_code_extensions() {
        assert_eq!(detect_format("src/lib.rs"), DiffFormat::CodeDeclaration);
        assert_eq!(detect_format("app/main.py"), DiffFormat::CodeDeclaration);
    }

    #[test]
    fn well_known_file_names() {
        assert_eq!(detect_format("Cargo.lock"), DiffFormat::Toml);
        assert_eq!(detect_format("sub/dir/Pipfile"), DiffFormat::Toml);
    }

    #[test]
    fn unknown_paths_fall_back() {
        assert_eq!(detect_format("README.md"), DiffFormat::Fallback);
        assert_eq!(detect_format("notes.txt"), DiffFormat::Fallback);
        assert_eq!(detect_format("Makefile"), DiffFormat::Fallback);
        assert_eq!(detect_format(""), DiffFormat::Fallback);
        assert_eq!(detect_format("archive.json.gz"), DiffFormat::Fallback);
    }

    #[test]
    fn dotfile_without_extension_falls_back() {
        assert_eq!(detect_format(".json"), DiffFormat::Fallback);
    }

    #[test]
    fn tags_serialize_as_snake_case() {
        assert_eq!(serde_json::to_string(&DiffFormat::Json).unwrap(), "\"json\"");
        assert_eq!(
            serde_json::to_string(&DiffFormat::CodeDeclaration).unwrap(),
            "\"code_declaration\""
        );
        for format in DiffFormat::ALL {
            let json = serde_json::to_string(&format).unwrap();
            assert_eq!(json, format!("\"{}\"", format.as_str()));
        }
    }

    #[test]
    fn structured_flag() {
        assert!(DiffFormat::Csv.is_structured());
        assert!(!DiffFormat::CodeDeclaration.is_structured());
        assert!(!DiffFormat::Fallback.is_structured());
    }
}
