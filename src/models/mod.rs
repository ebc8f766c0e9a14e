//! Shared data models for path coverage and story quality results.

pub mod quality;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// One of the three fixed path-mapping categories.
pub enum Category {
    Code,
    Test,
    Docs,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Code, Category::Test, Category::Docs];

    /// Frontmatter key and report label, e.g. `code_paths`.
    pub fn key(self) -> &'static str {
        match self {
            Category::Code => "code_paths",
            Category::Test => "test_paths",
            Category::Docs => "docs_paths",
        }
    }

    /// Compact label used in epic breakdown lines.
    pub fn short(self) -> String {
        self.key()
            .replace("_paths", "")
            .replace('_', "")
            .chars()
            .take(4)
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Declared paths of one story, grouped by category.
pub struct PathMapping {
    pub code_paths: Vec<String>,
    pub test_paths: Vec<String>,
    pub docs_paths: Vec<String>,
}

impl PathMapping {
    pub fn get(&self, category: Category) -> &[String] {
        match category {
            Category::Code => &self.code_paths,
            Category::Test => &self.test_paths,
            Category::Docs => &self.docs_paths,
        }
    }

    pub fn is_empty(&self) -> bool {
        Category::ALL.iter().all(|c| self.get(*c).is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Outcome of checking one category's declared paths against disk.
///
/// `existing` and `missing` partition `declared` in declaration order. A glob
/// pattern is one entry regardless of how many files it expands to.
pub struct ValidationResult {
    pub category: Category,
    pub declared: Vec<String>,
    pub existing: Vec<String>,
    pub missing: Vec<String>,
    /// Matched glob patterns in declaration order, each with its files
    /// relative to the repository root.
    pub glob_expanded: Vec<(String, Vec<String>)>,
}

impl ValidationResult {
    pub fn new(category: Category, declared: Vec<String>) -> Self {
        Self {
            category,
            declared,
            existing: Vec::new(),
            missing: Vec::new(),
            glob_expanded: Vec::new(),
        }
    }

    pub fn total(&self) -> usize {
        self.declared.len()
    }

    pub fn exist_count(&self) -> usize {
        self.existing.len()
    }

    /// Files a declared pattern matched; None for literals and unmatched globs.
    pub fn glob_matches(&self, pattern: &str) -> Option<&[String]> {
        self.glob_expanded
            .iter()
            .find(|(p, _)| p == pattern)
            .map(|(_, files)| files.as_slice())
    }

    /// Existing share in percent; 100 when nothing is declared.
    pub fn percentage(&self) -> f64 {
        crate::utils::ratio_percent(self.exist_count(), self.total(), 100.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
/// Totals across categories (story) or across stories (epic).
pub struct OverallStats {
    pub total: usize,
    pub exist: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone)]
/// Path coverage for one story, categories in fixed order.
pub struct StoryCoverage {
    pub story_id: String,
    pub results: Vec<ValidationResult>,
}

#[derive(Debug, Clone)]
/// Path coverage for every parsed story of an epic, sorted by story id.
pub struct EpicCoverage {
    pub epic_id: String,
    pub stories: Vec<StoryCoverage>,
}
