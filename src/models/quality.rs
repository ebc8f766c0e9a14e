//! Schema, checklist, acceptance-criteria and score result types.
//!
//! These are plain values: the schema checker produces them once per
//! document and the scorer and printers only read them.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The eight required story sections, in canonical order.
pub enum Section {
    Frontmatter,
    RoleNeedBenefit,
    DefinitionOfReady,
    AcceptanceCriteria,
    AcTestMapping,
    ImplementationMapping,
    DefinitionOfDone,
    Subtasks,
}

impl Section {
    pub const ALL: [Section; 8] = [
        Section::Frontmatter,
        Section::RoleNeedBenefit,
        Section::DefinitionOfReady,
        Section::AcceptanceCriteria,
        Section::AcTestMapping,
        Section::ImplementationMapping,
        Section::DefinitionOfDone,
        Section::Subtasks,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Section::Frontmatter => "YAML frontmatter",
            Section::RoleNeedBenefit => "Role / Need / Benefit",
            Section::DefinitionOfReady => "Definition of Ready",
            Section::AcceptanceCriteria => "Acceptance Criteria",
            Section::AcTestMapping => "AC to Test Mapping",
            Section::ImplementationMapping => "Implementation Mapping",
            Section::DefinitionOfDone => "Definition of Done",
            Section::Subtasks => "Subtasks",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Presence flag per required section, in canonical order.
///
/// Returned by `SchemaChecker::validate_schema` and handed to every check
/// that depends on it instead of being re-derived.
pub struct SchemaReport {
    pub sections: Vec<(Section, bool)>,
}

impl SchemaReport {
    pub fn is_present(&self, section: Section) -> bool {
        self.sections
            .iter()
            .any(|(s, present)| *s == section && *present)
    }

    pub fn present_count(&self) -> usize {
        self.sections.iter().filter(|(_, p)| *p).count()
    }
}

impl Serialize for SchemaReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.sections.len()))?;
        for (section, present) in &self.sections {
            map.serialize_entry(section.name(), present)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SectionCount {
    pub present: usize,
    pub required: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
/// Checklist completion inside one section.
pub struct ChecklistResult {
    pub checked: usize,
    pub total: usize,
    /// 0 when the section holds no checklist items.
    pub percentage: f64,
    pub unchecked_items: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DorDodResult {
    pub dor: ChecklistResult,
    pub dod: ChecklistResult,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
/// Given/When/Then coverage of the acceptance criteria.
pub struct AcFormatResult {
    pub ac_count: usize,
    pub testable_count: usize,
    pub percentage: f64,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QualityLevel {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl QualityLevel {
    /// Bands are inclusive at their lower bound.
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            QualityLevel::Excellent
        } else if score >= 70.0 {
            QualityLevel::Good
        } else if score >= 50.0 {
            QualityLevel::Fair
        } else {
            QualityLevel::Poor
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QualityLevel::Excellent => "EXCELLENT",
            QualityLevel::Good => "GOOD",
            QualityLevel::Fair => "FAIR",
            QualityLevel::Poor => "POOR",
        }
    }

    /// GOOD and FAIR share the warning glyph.
    pub fn glyph(self) -> &'static str {
        match self {
            QualityLevel::Excellent => "✅",
            QualityLevel::Good | QualityLevel::Fair => "⚠️",
            QualityLevel::Poor => "❌",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
/// One weighted component of the quality score.
pub struct ComponentScore {
    pub score: f64,
    pub max: u32,
    /// Raw input percentage; absent for flat presence components.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub schema: ComponentScore,
    pub dor: ComponentScore,
    pub dod: ComponentScore,
    pub ac_testability: ComponentScore,
    pub path_mapping: ComponentScore,
    pub yaml: ComponentScore,
}

impl ScoreBreakdown {
    pub fn components(&self) -> [ComponentScore; 6] {
        [
            self.schema,
            self.dor,
            self.dod,
            self.ac_testability,
            self.path_mapping,
            self.yaml,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QualityScore {
    pub breakdown: ScoreBreakdown,
    pub total: f64,
    pub level: QualityLevel,
    pub emoji: &'static str,
    pub max: u32,
}

impl QualityScore {
    pub fn meets_threshold(&self, min_score: f64) -> bool {
        self.total >= min_score
    }
}
