//! Path existence checks for declared story path mappings.
//!
//! Each declared entry is either a literal path or a glob pattern (`*` or
//! `?`). Literals are tested with a single existence check; patterns are
//! expanded recursively (`**` crosses directories) and count as existing
//! when they match at least one file. Every call reads the current disk
//! state; nothing is cached between calls.

use crate::models::{Category, PathMapping, ValidationResult};
use glob::{glob_with, MatchOptions, Pattern};
use std::path::{Path, PathBuf};

fn match_options() -> MatchOptions {
    MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    }
}

/// Validate every category of a mapping against `repo_root`.
///
/// Results come back in fixed category order (code, test, docs).
pub fn validate_path_mapping(mapping: &PathMapping, repo_root: &Path) -> Vec<ValidationResult> {
    Category::ALL
        .iter()
        .map(|c| validate_category(*c, mapping.get(*c), repo_root))
        .collect()
}

/// Validate one category's declared paths, preserving declaration order.
pub fn validate_category(
    category: Category,
    declared: &[String],
    repo_root: &Path,
) -> ValidationResult {
    let mut result = ValidationResult::new(category, declared.to_vec());
    for entry in declared {
        let normalized = strip_dot_slash(entry);
        if is_glob(normalized) {
            let matches = expand_glob(normalized, repo_root);
            if matches.is_empty() {
                result.missing.push(entry.clone());
            } else {
                result.glob_expanded.push((entry.clone(), matches));
                result.existing.push(entry.clone());
            }
        } else if resolve_literal(normalized, repo_root).exists() {
            result.existing.push(entry.clone());
        } else {
            result.missing.push(entry.clone());
        }
    }
    result
}

fn strip_dot_slash(path: &str) -> &str {
    let mut p = path;
    while let Some(rest) = p.strip_prefix("./") {
        p = rest;
    }
    p
}

pub fn is_glob(path: &str) -> bool {
    path.contains('*') || path.contains('?')
}

fn resolve_literal(path: &str, repo_root: &Path) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        repo_root.join(p)
    }
}

/// Expand a pattern relative to `repo_root`; matches are returned relative
/// to the root when they live under it.
///
/// An invalid pattern expands to nothing.
fn expand_glob(pattern: &str, repo_root: &Path) -> Vec<String> {
    let full = if Path::new(pattern).is_absolute() {
        pattern.to_string()
    } else {
        let root = Pattern::escape(&repo_root.to_string_lossy());
        format!("{}/{}", root.trim_end_matches('/'), pattern)
    };
    let entries = match glob_with(&full, match_options()) {
        Ok(entries) => entries,
        Err(e) => {
            log::debug!("invalid glob pattern '{}': {}", pattern, e);
            return Vec::new();
        }
    };
    entries
        .flatten()
        .map(|m| relative_display(&m, repo_root))
        .collect()
}

fn relative_display(path: &Path, repo_root: &Path) -> String {
    match path.strip_prefix(repo_root) {
        Ok(rel) => rel.to_string_lossy().to_string(),
        Err(_) => pathdiff::diff_paths(path, repo_root)
            .unwrap_or_else(|| path.to_path_buf())
            .to_string_lossy()
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(root: &Path, rel: &str) {
        let p = root.join(rel);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(p, b"x").unwrap();
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_literal_paths_partition_in_order() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        touch(root, "a.sh");
        touch(root, "c.md");
        let declared = strings(&["c.md", "missing.md", "./a.sh"]);
        let r = validate_category(Category::Code, &declared, root);
        assert_eq!(r.existing, strings(&["c.md", "./a.sh"]));
        assert_eq!(r.missing, strings(&["missing.md"]));
        assert_eq!(r.existing.len() + r.missing.len(), r.total());
        assert!(r.glob_expanded.is_empty());
    }

    #[test]
    fn test_glob_counts_as_one_entry() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        touch(root, "src/a/one.rs");
        touch(root, "src/b/c/two.rs");
        touch(root, "src/three.rs");
        let declared = strings(&["src/**/*.rs", "tests/**/*.rs"]);
        let r = validate_category(Category::Code, &declared, root);
        assert_eq!(r.total(), 2);
        assert_eq!(r.exist_count(), 1);
        assert_eq!(r.missing, strings(&["tests/**/*.rs"]));
        let matched = r.glob_matches("src/**/*.rs").unwrap();
        assert_eq!(matched.len(), 3);
        assert!(matched.contains(&"src/b/c/two.rs".to_string()));
        assert!(r.glob_matches("tests/**/*.rs").is_none());
        assert_eq!(r.percentage(), 50.0);
    }

    #[test]
    fn test_glob_expansions_keep_declaration_order() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        touch(root, "zeta/one.md");
        touch(root, "alpha/two.md");
        let declared = strings(&["zeta/*.md", "alpha/*.md"]);
        let r = validate_category(Category::Docs, &declared, root);
        let patterns: Vec<&str> = r.glob_expanded.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(patterns, vec!["zeta/*.md", "alpha/*.md"]);
    }

    #[test]
    fn test_question_mark_is_a_glob() {
        let tmp = tempdir().unwrap();
        touch(tmp.path(), "doc1.md");
        let r = validate_category(Category::Docs, &strings(&["doc?.md"]), tmp.path());
        assert_eq!(r.glob_matches("doc?.md"), Some(&strings(&["doc1.md"])[..]));
    }

    #[test]
    fn test_absolute_literal_is_checked_as_given() {
        let tmp = tempdir().unwrap();
        let other = tempdir().unwrap();
        touch(other.path(), "abs.txt");
        let abs = other.path().join("abs.txt").to_string_lossy().to_string();
        let r = validate_category(Category::Docs, &[abs.clone()], tmp.path());
        assert_eq!(r.existing, vec![abs]);
    }

    #[test]
    fn test_invalid_pattern_is_missing() {
        let tmp = tempdir().unwrap();
        let r = validate_category(Category::Code, &strings(&["src/[*.rs"]), tmp.path());
        assert_eq!(r.missing, strings(&["src/[*.rs"]));
    }

    #[test]
    fn test_scenario_four_of_five() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        for f in ["a.sh", "c.md", "d.md", "e.md"] {
            touch(root, f);
        }
        let mapping = PathMapping {
            code_paths: strings(&["a.sh"]),
            test_paths: strings(&["b.sh"]),
            docs_paths: strings(&["c.md", "d.md", "e.md"]),
        };
        let results = validate_path_mapping(&mapping, root);
        let pct: Vec<f64> = results.iter().map(|r| r.percentage()).collect();
        assert_eq!(pct, vec![100.0, 0.0, 100.0]);
        assert_eq!(results[1].missing, strings(&["b.sh"]));
    }

    #[test]
    fn test_reflects_current_disk_state() {
        let tmp = tempdir().unwrap();
        let declared = strings(&["late.txt"]);
        let before = validate_category(Category::Test, &declared, tmp.path());
        assert_eq!(before.exist_count(), 0);
        touch(tmp.path(), "late.txt");
        let after = validate_category(Category::Test, &declared, tmp.path());
        assert_eq!(after.exist_count(), 1);
    }
}
