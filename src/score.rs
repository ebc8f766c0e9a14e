//! Weighted 0-100 story quality score.
//!
//! Each component is rounded to one decimal before summing, and the sum is
//! rounded again. Keep both roundings: reported totals depend on them.

use crate::models::quality::{
    AcFormatResult, ComponentScore, DorDodResult, QualityLevel, QualityScore, SchemaReport,
    ScoreBreakdown, Section,
};
use crate::schema::SchemaChecker;
use crate::utils::round1;

pub const WEIGHT_SCHEMA: u32 = 40;
pub const WEIGHT_DOR: u32 = 15;
pub const WEIGHT_DOD: u32 = 15;
pub const WEIGHT_AC: u32 = 15;
pub const WEIGHT_PATH_MAPPING: u32 = 10;
pub const WEIGHT_YAML: u32 = 5;
pub const MAX_SCORE: u32 = 100;

fn weighted(percentage: f64, weight: u32) -> ComponentScore {
    ComponentScore {
        score: round1(percentage / 100.0 * weight as f64),
        max: weight,
        percentage: Some(percentage),
    }
}

fn flat(present: bool, weight: u32) -> ComponentScore {
    ComponentScore {
        score: if present { weight as f64 } else { 0.0 },
        max: weight,
        percentage: None,
    }
}

/// Scores a document from check results already computed for it.
pub struct QualityScorer<'c, 'a> {
    checker: &'c SchemaChecker<'a>,
}

impl<'c, 'a> QualityScorer<'c, 'a> {
    pub fn new(checker: &'c SchemaChecker<'a>) -> Self {
        Self { checker }
    }

    /// Run every check on the checker's document and score it.
    pub fn calculate_score(&self) -> QualityScore {
        let schema = self.checker.validate_schema();
        let dor_dod = self.checker.validate_dor_dod_completeness();
        let ac = self.checker.validate_ac_format();
        self.score_from(&schema, &dor_dod, &ac)
    }

    /// Score from results the caller already holds.
    ///
    /// `path_mapping` only checks for the key in the raw text; whether the
    /// declared paths exist on disk plays no part here.
    pub fn score_from(
        &self,
        schema: &SchemaReport,
        dor_dod: &DorDodResult,
        ac: &AcFormatResult,
    ) -> QualityScore {
        let breakdown = ScoreBreakdown {
            schema: weighted(schema.count_sections().percentage, WEIGHT_SCHEMA),
            dor: weighted(dor_dod.dor.percentage, WEIGHT_DOR),
            dod: weighted(dor_dod.dod.percentage, WEIGHT_DOD),
            ac_testability: weighted(ac.percentage, WEIGHT_AC),
            path_mapping: flat(self.checker.has_path_mapping(), WEIGHT_PATH_MAPPING),
            yaml: flat(
                schema.is_present(Section::Frontmatter),
                WEIGHT_YAML,
            ),
        };
        let sum: f64 = breakdown.components().iter().map(|c| c.score).sum();
        let total = round1(sum);
        let level = QualityLevel::from_score(total);
        QualityScore {
            breakdown,
            total,
            level,
            emoji: level.glyph(),
            max: MAX_SCORE,
        }
    }

    pub fn meets_threshold(&self, min_score: f64) -> bool {
        self.calculate_score().meets_threshold(min_score)
    }
}

/// Level band for an arbitrary score.
pub fn get_level(score: f64) -> QualityLevel {
    QualityLevel::from_score(score)
}
