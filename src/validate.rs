//! Story and epic pipelines: locate, read, parse, check.
//!
//! Single-story entry points propagate `GateError`. Epic entry points
//! isolate per-story failures: an unreadable or malformed story is logged
//! with `warn!` and skipped so the rest of the batch is still validated.

use crate::config::{Effective, Thresholds};
use crate::error::{GateError, Result};
use crate::frontmatter::{extract_frontmatter, parse_story_path_mapping, read_story_id};
use crate::locate::{find_epic_stories, find_story_file, story_id_from_path};
use crate::models::quality::{AcFormatResult, DorDodResult, QualityScore, SchemaReport};
use crate::models::{EpicCoverage, StoryCoverage};
use crate::paths::validate_path_mapping;
use crate::schema::SchemaChecker;
use crate::score::QualityScorer;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub fn read_document(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| GateError::Io {
        source,
        path: path.to_path_buf(),
    })
}

/// Path coverage of one document against `repo_root`.
pub fn validate_document_paths(
    story_id: &str,
    content: &str,
    origin: &str,
    repo_root: &Path,
) -> Result<StoryCoverage> {
    let mapping = parse_story_path_mapping(content, origin)?;
    Ok(StoryCoverage {
        story_id: story_id.to_string(),
        results: validate_path_mapping(&mapping, repo_root),
    })
}

/// Path coverage of a story located by id.
pub fn validate_story_paths(eff: &Effective, story_id: &str) -> Result<StoryCoverage> {
    let doc = find_story_file(eff, story_id).ok_or_else(|| GateError::story_not_found(story_id))?;
    let content = read_document(&doc)?;
    validate_document_paths(story_id, &content, &doc.to_string_lossy(), &eff.repo_root)
}

/// Path coverage of every story in an epic, keyed and sorted by the
/// frontmatter `id`. Stories without an id are skipped.
pub fn validate_epic_paths(eff: &Effective, epic_id: &str) -> Result<EpicCoverage> {
    let docs = find_epic_stories(eff, epic_id);
    if docs.is_empty() {
        return Err(GateError::epic_not_found(epic_id));
    }

    let mut by_id: BTreeMap<String, StoryCoverage> = BTreeMap::new();
    for doc in docs {
        let origin = doc.to_string_lossy().to_string();
        let outcome = read_document(&doc).and_then(|content| {
            let Some(id) = read_story_id(&content) else {
                return Ok(None);
            };
            validate_document_paths(&id, &content, &origin, &eff.repo_root).map(Some)
        });
        match outcome {
            Ok(Some(cov)) => {
                by_id.insert(cov.story_id.clone(), cov);
            }
            Ok(None) => log::warn!("Skipping {}: no story id in frontmatter", story_label(&doc)),
            Err(e) if e.is_per_story() => log::warn!("Skipping {}: {}", story_label(&doc), e),
            Err(e) => return Err(e),
        }
    }

    if by_id.is_empty() {
        return Err(GateError::epic_not_found(epic_id));
    }
    Ok(EpicCoverage {
        epic_id: epic_id.to_string(),
        stories: by_id.into_values().collect(),
    })
}

fn story_label(doc: &Path) -> String {
    doc.parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| doc.to_string_lossy().to_string())
}

#[derive(Debug, Clone, PartialEq)]
/// State of the frontmatter block for the YAML check.
pub enum FrontmatterStatus {
    Missing,
    Invalid(String),
    Valid,
}

#[derive(Debug, Clone)]
/// Every structural result for one story document.
pub struct StoryAssessment {
    pub story_id: String,
    pub story_path: PathBuf,
    pub schema: SchemaReport,
    pub dor_dod: DorDodResult,
    pub ac_format: AcFormatResult,
    pub score: QualityScore,
    pub frontmatter: FrontmatterStatus,
}

/// Run the schema checks once and score from those results.
pub fn assess_document(story_id: &str, story_path: &Path, content: &str) -> StoryAssessment {
    let checker = SchemaChecker::new(content);
    let schema = checker.validate_schema();
    let dor_dod = checker.validate_dor_dod_completeness();
    let ac_format = checker.validate_ac_format();
    let score = QualityScorer::new(&checker).score_from(&schema, &dor_dod, &ac_format);
    let frontmatter = match extract_frontmatter(content) {
        None => FrontmatterStatus::Missing,
        Some(_) => match parse_story_path_mapping(content, &story_path.to_string_lossy()) {
            Ok(_) => FrontmatterStatus::Valid,
            Err(e) => FrontmatterStatus::Invalid(e.to_string()),
        },
    };
    StoryAssessment {
        story_id: story_id.to_string(),
        story_path: story_path.to_path_buf(),
        schema,
        dor_dod,
        ac_format,
        score,
        frontmatter,
    }
}

/// Assess a story located by id.
pub fn assess_story(eff: &Effective, story_id: &str) -> Result<StoryAssessment> {
    let doc = find_story_file(eff, story_id).ok_or_else(|| GateError::story_not_found(story_id))?;
    let content = read_document(&doc)?;
    Ok(assess_document(&story_id_from_path(&doc), &doc, &content))
}

/// Assess every story of an epic, skipping unreadable documents.
pub fn assess_epic(eff: &Effective, epic_id: &str) -> Result<Vec<StoryAssessment>> {
    let docs = find_epic_stories(eff, epic_id);
    if docs.is_empty() {
        return Err(GateError::epic_not_found(epic_id));
    }
    let mut out = Vec::new();
    for doc in docs {
        match read_document(&doc) {
            Ok(content) => out.push(assess_document(&story_id_from_path(&doc), &doc, &content)),
            Err(e) => log::warn!("Skipping {}: {}", story_label(&doc), e),
        }
    }
    if out.is_empty() {
        return Err(GateError::epic_not_found(epic_id));
    }
    Ok(out)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Which story checks to run and report.
pub struct Checks {
    pub schema: bool,
    pub dod: bool,
    pub ac: bool,
    pub yaml: bool,
    pub score: bool,
}

impl Checks {
    /// Schema runs when requested or when no other check is selected.
    pub fn run_schema(self) -> bool {
        self.schema || !(self.dod || self.ac || self.yaml || self.score)
    }

    pub fn run_dod(self) -> bool {
        self.dod || !(self.schema || self.ac || self.yaml || self.score)
    }

    pub fn run_ac(self) -> bool {
        self.ac || !(self.schema || self.dod || self.yaml || self.score)
    }

    pub fn run_yaml(self) -> bool {
        self.yaml
    }

    pub fn run_score(self) -> bool {
        self.score
    }
}

/// Reasons the selected checks fail; empty when the story passes.
pub fn check_failures(a: &StoryAssessment, checks: Checks, thresholds: &Thresholds) -> Vec<String> {
    let mut out = Vec::new();
    if checks.run_schema() {
        let missing = a.schema.missing_sections();
        if !missing.is_empty() {
            out.push(format!("missing sections: {}", missing.join(", ")));
        }
    }
    if checks.run_dod() {
        if a.dor_dod.dor.percentage < thresholds.dor {
            out.push(format!(
                "DoR {}% below {}% threshold",
                a.dor_dod.dor.percentage, thresholds.dor
            ));
        }
        if a.dor_dod.dod.percentage < thresholds.dod {
            out.push(format!(
                "DoD {}% below {}% threshold",
                a.dor_dod.dod.percentage, thresholds.dod
            ));
        }
    }
    if checks.run_ac() && !a.ac_format.issues.is_empty() {
        out.push(format!("{} AC issue(s)", a.ac_format.issues.len()));
    }
    if checks.run_yaml() {
        match &a.frontmatter {
            FrontmatterStatus::Missing => out.push("no YAML frontmatter".to_string()),
            FrontmatterStatus::Invalid(msg) => out.push(msg.clone()),
            FrontmatterStatus::Valid => {}
        }
    }
    if checks.run_score() && a.score.total < thresholds.score {
        out.push(format!(
            "quality score {} below {}",
            a.score.total, thresholds.score
        ));
    }
    out
}
