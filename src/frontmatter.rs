//! YAML frontmatter extraction and `path_mapping` decoding.
//!
//! A story document opens with a `---` delimited YAML block. A document
//! without that block has no path mapping (all categories empty); a block
//! that does not parse to a mapping is a `GateError::Parse`.

use crate::error::{GateError, Result};
use crate::models::{Category, PathMapping};
use regex::Regex;
use serde_yaml::{Mapping, Value as Yaml};
use std::sync::OnceLock;

fn frontmatter_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)\A---[ \t]*\r?\n(?:(.*?)\r?\n)?---[ \t]*(?:\r?\n|\z)")
            .expect("frontmatter pattern")
    })
}

/// Return the text between the leading `---` line and the next `---` line.
///
/// The block must start at the very beginning of the document.
pub fn extract_frontmatter(content: &str) -> Option<&str> {
    let caps = frontmatter_re().captures(content)?;
    Some(caps.get(1).map_or("", |m| m.as_str()))
}

/// True when the document opens with a frontmatter block.
pub fn has_frontmatter(content: &str) -> bool {
    frontmatter_re().is_match(content)
}

/// Parse frontmatter text; the top level must be a mapping.
pub fn parse_frontmatter(frontmatter: &str, origin: &str) -> Result<Mapping> {
    let value: Yaml = serde_yaml::from_str(frontmatter).map_err(|e| GateError::Parse {
        path: origin.to_string(),
        message: format!("invalid YAML: {e}"),
    })?;
    match value {
        Yaml::Mapping(map) => Ok(map),
        other => Err(GateError::Parse {
            path: origin.to_string(),
            message: format!("expected a mapping, got {}", yaml_kind(&other)),
        }),
    }
}

fn yaml_kind(value: &Yaml) -> &'static str {
    match value {
        Yaml::Null => "null",
        Yaml::Bool(_) => "bool",
        Yaml::Number(_) => "number",
        Yaml::String(_) => "string",
        Yaml::Sequence(_) => "sequence",
        Yaml::Mapping(_) => "mapping",
        Yaml::Tagged(_) => "tagged value",
    }
}

/// Pull the three path lists out of parsed frontmatter.
///
/// A missing or non-mapping `path_mapping` yields empty lists, as does a
/// missing or null category.
pub fn extract_path_mapping(data: &Mapping) -> PathMapping {
    let Some(Yaml::Mapping(pm)) = data.get("path_mapping") else {
        return PathMapping::default();
    };
    let list = |category: Category| -> Vec<String> {
        match pm.get(category.key()) {
            Some(Yaml::Sequence(items)) => items.iter().filter_map(scalar_to_string).collect(),
            Some(v @ Yaml::String(_)) => scalar_to_string(v).into_iter().collect(),
            _ => Vec::new(),
        }
    };
    PathMapping {
        code_paths: list(Category::Code),
        test_paths: list(Category::Test),
        docs_paths: list(Category::Docs),
    }
}

fn scalar_to_string(value: &Yaml) -> Option<String> {
    match value {
        Yaml::String(s) => Some(s.clone()),
        Yaml::Number(n) => Some(n.to_string()),
        Yaml::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Decode the path mapping of a whole document.
///
/// `origin` only labels parse errors (usually the document path).
pub fn parse_story_path_mapping(content: &str, origin: &str) -> Result<PathMapping> {
    match extract_frontmatter(content) {
        None => Ok(PathMapping::default()),
        Some(fm) => {
            let data = parse_frontmatter(fm, origin)?;
            Ok(extract_path_mapping(&data))
        }
    }
}

/// The frontmatter `id` of a document, if present and parseable.
pub fn read_story_id(content: &str) -> Option<String> {
    let fm = extract_frontmatter(content)?;
    let data = parse_frontmatter(fm, "").ok()?;
    match data.get("id")? {
        Yaml::String(s) => Some(s.clone()),
        other => scalar_to_string(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORY: &str = "---\nid: CORE-005\npath_mapping:\n  code_paths:\n    - scripts/backlog/git_tracker.sh\n  test_paths: []\n  docs_paths:\n    - README.md\n    - docs/**/*.md\n---\n# Story\n";

    #[test]
    fn test_extract_frontmatter_block() {
        let fm = extract_frontmatter("---\nid: CORE-001\n---\n# Story").unwrap();
        assert_eq!(fm, "id: CORE-001");
    }

    #[test]
    fn test_frontmatter_must_open_the_document() {
        assert!(extract_frontmatter("# Title\n---\nid: x\n---\n").is_none());
        assert!(!has_frontmatter("no delimiters here"));
    }

    #[test]
    fn test_path_mapping_round_trip() {
        let pm = parse_story_path_mapping(STORY, "README.md").unwrap();
        assert_eq!(pm.code_paths, vec!["scripts/backlog/git_tracker.sh"]);
        assert!(pm.test_paths.is_empty());
        assert_eq!(pm.docs_paths, vec!["README.md", "docs/**/*.md"]);
    }

    #[test]
    fn test_missing_and_null_categories_default_to_empty() {
        let doc = "---\nid: CORE-002\npath_mapping:\n  code_paths: ~\n  docs_paths:\n    - a.md\n---\n";
        let pm = parse_story_path_mapping(doc, "x").unwrap();
        assert!(pm.code_paths.is_empty());
        assert!(pm.test_paths.is_empty());
        assert_eq!(pm.docs_paths, vec!["a.md"]);
    }

    #[test]
    fn test_non_mapping_path_mapping_is_empty() {
        let doc = "---\nid: CORE-003\npath_mapping: [a, b]\n---\n";
        assert!(parse_story_path_mapping(doc, "x").unwrap().is_empty());
    }

    #[test]
    fn test_no_frontmatter_is_empty_not_error() {
        let pm = parse_story_path_mapping("# Just a heading\n", "x").unwrap();
        assert_eq!(pm, PathMapping::default());
    }

    #[test]
    fn test_malformed_frontmatter_is_parse_error() {
        let doc = "---\nid: [unclosed\n---\n";
        let err = parse_story_path_mapping(doc, "story.md").unwrap_err();
        assert!(matches!(err, GateError::Parse { .. }));

        let scalar = "---\njust a string\n---\n";
        let err = parse_story_path_mapping(scalar, "story.md").unwrap_err();
        assert!(err.to_string().contains("expected a mapping"));
    }

    #[test]
    fn test_read_story_id() {
        assert_eq!(read_story_id(STORY).as_deref(), Some("CORE-005"));
        assert_eq!(read_story_id("# none"), None);
    }
}
