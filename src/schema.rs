//! Structural checks over a story document.
//!
//! Section detection is a case-insensitive search for a level-2 heading
//! containing the section's words in order. Section bodies run from the
//! line after the heading to the next level-1/level-2 heading.
//!
//! Vacuous cases differ from path coverage on purpose: a checklist with no
//! items, or an Acceptance Criteria section without `AC<n>:` subsections,
//! scores 0%, not 100%.

use crate::frontmatter::has_frontmatter;
use crate::models::quality::{
    AcFormatResult, ChecklistResult, DorDodResult, SchemaReport, Section, SectionCount,
};
use crate::utils::{ratio_percent, round1};
use regex::Regex;
use std::sync::OnceLock;

fn section_words(section: Section) -> &'static [&'static str] {
    match section {
        Section::Frontmatter => &[],
        Section::RoleNeedBenefit => &["Role", "Need", "Benefit"],
        Section::DefinitionOfReady => &["Definition of Ready"],
        Section::AcceptanceCriteria => &["Acceptance Criteria"],
        Section::AcTestMapping => &["AC", "Test", "Mapping"],
        Section::ImplementationMapping => &["Implementation Mapping"],
        Section::DefinitionOfDone => &["Definition of Done"],
        Section::Subtasks => &["Subtasks"],
    }
}

fn heading_patterns() -> &'static Vec<(Section, Regex)> {
    static RES: OnceLock<Vec<(Section, Regex)>> = OnceLock::new();
    RES.get_or_init(|| {
        Section::ALL
            .iter()
            .filter(|s| **s != Section::Frontmatter)
            .map(|s| {
                let words: Vec<String> =
                    section_words(*s).iter().map(|w| regex::escape(w)).collect();
                let pattern = format!(r"(?im)^##[ \t]+.*{}", words.join(".*"));
                (*s, Regex::new(&pattern).expect("section heading pattern"))
            })
            .collect()
    })
}

fn heading_re(section: Section) -> Option<&'static Regex> {
    heading_patterns()
        .iter()
        .find(|(s, _)| *s == section)
        .map(|(_, re)| re)
}

fn top_heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^#{1,2}[ \t]").expect("top heading pattern"))
}

fn ac_heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?im)^###[ \t]+(AC\d+):").expect("AC heading pattern"))
}

fn sub_heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^#{1,3}[ \t]").expect("subheading pattern"))
}

fn checked_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)- \[x\]").expect("checked pattern"))
}

fn unchecked_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"- \[ \](?: (.+))?").expect("unchecked pattern"))
}

#[derive(Clone, Copy)]
enum Marker {
    Given,
    When,
    Then,
}

impl Marker {
    const ALL: [Marker; 3] = [Marker::Given, Marker::When, Marker::Then];

    fn word(self) -> &'static str {
        match self {
            Marker::Given => "Given",
            Marker::When => "When",
            Marker::Then => "Then",
        }
    }

    /// `**Word**`, `Word:` or `Word -`, any case.
    fn regex(self) -> &'static Regex {
        static RES: OnceLock<Vec<Regex>> = OnceLock::new();
        let all = RES.get_or_init(|| {
            Marker::ALL
                .iter()
                .map(|m| {
                    let w = m.word();
                    Regex::new(&format!(r"(?i)(\*\*{w}\*\*|{w}:|{w} -)"))
                        .expect("GWT marker pattern")
                })
                .collect()
        });
        &all[self as usize]
    }
}

/// Where a section body ends when no following heading exists.
#[derive(Clone, Copy, PartialEq, Eq)]
enum SpanEnd {
    NextHeading,
    NextHeadingOrEnd,
}

/// Body text of the first section whose heading matches `heading`.
fn section_body<'a>(content: &'a str, heading: &Regex, end: SpanEnd) -> Option<&'a str> {
    let m = heading.find(content)?;
    let start = match content[m.end()..].find('\n') {
        Some(i) => m.end() + i + 1,
        None => content.len(),
    };
    let rest = &content[start..];
    match top_heading_re().find(rest) {
        Some(next) => Some(&rest[..next.start()]),
        None if end == SpanEnd::NextHeadingOrEnd => Some(rest),
        None => None,
    }
}

fn count_checklist(body: Option<&str>) -> ChecklistResult {
    let Some(text) = body else {
        return ChecklistResult::default();
    };
    let checked = checked_re().find_iter(text).count();
    let mut unchecked = 0;
    let mut unchecked_items = Vec::new();
    for caps in unchecked_re().captures_iter(text) {
        unchecked += 1;
        if let Some(item) = caps.get(1) {
            unchecked_items.push(item.as_str().to_string());
        }
    }
    let total = checked + unchecked;
    ChecklistResult {
        checked,
        total,
        percentage: round1(ratio_percent(checked, total, 0.0)),
        unchecked_items,
    }
}

/// Runs structural checks over one document's raw text.
pub struct SchemaChecker<'a> {
    content: &'a str,
}

impl<'a> SchemaChecker<'a> {
    pub fn new(content: &'a str) -> Self {
        Self { content }
    }

    /// Presence of each required section, in canonical order.
    pub fn validate_schema(&self) -> SchemaReport {
        let sections = Section::ALL
            .iter()
            .map(|s| {
                let present = match heading_re(*s) {
                    Some(re) => re.is_match(self.content),
                    None => has_frontmatter(self.content),
                };
                (*s, present)
            })
            .collect();
        SchemaReport { sections }
    }

    /// DoR runs to the next top-level heading and is absent without one;
    /// DoD may run to the end of the document.
    pub fn validate_dor_dod_completeness(&self) -> DorDodResult {
        let dor = heading_re(Section::DefinitionOfReady)
            .and_then(|re| section_body(self.content, re, SpanEnd::NextHeading));
        let dod = heading_re(Section::DefinitionOfDone)
            .and_then(|re| section_body(self.content, re, SpanEnd::NextHeadingOrEnd));
        DorDodResult {
            dor: count_checklist(dor),
            dod: count_checklist(dod),
        }
    }

    /// Given/When/Then coverage of each `### AC<n>:` subsection.
    pub fn validate_ac_format(&self) -> AcFormatResult {
        let body = heading_re(Section::AcceptanceCriteria)
            .and_then(|re| section_body(self.content, re, SpanEnd::NextHeadingOrEnd));
        let Some(body) = body else {
            return AcFormatResult {
                issues: vec!["No AC section found".to_string()],
                ..AcFormatResult::default()
            };
        };

        let mut ac_count = 0;
        let mut testable_count = 0;
        let mut issues = Vec::new();
        for caps in ac_heading_re().captures_iter(body) {
            let (Some(whole), Some(id)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let after = match body[whole.end()..].find('\n') {
                Some(i) => whole.end() + i + 1,
                None => body.len(),
            };
            let block = match sub_heading_re().find(&body[after..]) {
                Some(next) => &body[after..after + next.start()],
                None => &body[after..],
            };
            ac_count += 1;
            let missing: Vec<&str> = Marker::ALL
                .iter()
                .filter(|m| !m.regex().is_match(block))
                .map(|m| m.word())
                .collect();
            if missing.is_empty() {
                testable_count += 1;
            } else {
                issues.push(format!("{}: Missing {}", id.as_str(), missing.join(", ")));
            }
        }

        AcFormatResult {
            ac_count,
            testable_count,
            percentage: round1(ratio_percent(testable_count, ac_count, 0.0)),
            issues,
        }
    }

    /// Raw-text presence of a `path_mapping:` key.
    pub fn has_path_mapping(&self) -> bool {
        self.content.contains("path_mapping:")
    }
}

impl SchemaReport {
    pub fn count_sections(&self) -> SectionCount {
        let present = self.present_count();
        let required = Section::ALL.len();
        SectionCount {
            present,
            required,
            percentage: round1(ratio_percent(present, required, 0.0)),
        }
    }

    pub fn missing_sections(&self) -> Vec<&'static str> {
        self.sections
            .iter()
            .filter(|(_, present)| !present)
            .map(|(s, _)| s.name())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = "---
id: CORE-008
path_mapping:
  code_paths: []
---
# CORE-008 Story

## 👤 Role / Need / Benefit
As a maintainer I need checks so that stories stay healthy.

## ✅ Definition of Ready
- [x] Scope agreed
- [X] Estimate done
- [ ] Design reviewed
- [ ] Dependencies listed

## 🎯 Acceptance Criteria

### AC1: Schema is validated
**Given** a story
**When** the validator runs
**Then** missing sections are listed

### AC2: Score is computed
Given: a story
Then: a score is printed

## 🧪 AC to Test Mapping
| AC | Test |

## 🔗 Implementation Mapping
Code lives in scripts.

## ✅ Definition of Done
- [x] Code merged
- [x] Tests green
- [x] Docs updated
- [ ] Demo recorded

## 📋 Subtasks
- T1
";

    #[test]
    fn test_full_story_has_all_sections() {
        let report = SchemaChecker::new(FULL).validate_schema();
        assert!(report.sections.iter().all(|(_, p)| *p));
        let count = report.count_sections();
        assert_eq!((count.present, count.required, count.percentage), (8, 8, 100.0));
        assert!(report.missing_sections().is_empty());
    }

    #[test]
    fn test_missing_sections_in_canonical_order() {
        let doc = "## Acceptance Criteria\n## Subtasks\n";
        let report = SchemaChecker::new(doc).validate_schema();
        assert_eq!(
            report.missing_sections(),
            vec![
                "YAML frontmatter",
                "Role / Need / Benefit",
                "Definition of Ready",
                "AC to Test Mapping",
                "Implementation Mapping",
                "Definition of Done",
            ]
        );
        assert_eq!(report.count_sections().percentage, 25.0);
    }

    #[test]
    fn test_heading_words_may_be_separated_and_any_case() {
        let doc = "## ROLE / the need / and BENEFIT\n## ac → test mapping\n";
        let report = SchemaChecker::new(doc).validate_schema();
        assert!(report.is_present(Section::RoleNeedBenefit));
        assert!(report.is_present(Section::AcTestMapping));
    }

    #[test]
    fn test_level_three_heading_is_not_a_section() {
        let report = SchemaChecker::new("### Subtasks\n").validate_schema();
        assert!(!report.is_present(Section::Subtasks));
    }

    #[test]
    fn test_dor_dod_counts() {
        let res = SchemaChecker::new(FULL).validate_dor_dod_completeness();
        assert_eq!((res.dor.checked, res.dor.total, res.dor.percentage), (2, 4, 50.0));
        assert_eq!(
            res.dor.unchecked_items,
            vec!["Design reviewed", "Dependencies listed"]
        );
        assert_eq!((res.dod.checked, res.dod.total, res.dod.percentage), (3, 4, 75.0));
        assert_eq!(res.dod.unchecked_items, vec!["Demo recorded"]);
    }

    #[test]
    fn test_empty_checklist_scores_zero() {
        let doc = "## Definition of Ready\nNothing yet.\n## Definition of Done\n";
        let res = SchemaChecker::new(doc).validate_dor_dod_completeness();
        assert_eq!((res.dor.total, res.dor.percentage), (0, 0.0));
        assert_eq!((res.dod.total, res.dod.percentage), (0, 0.0));
    }

    #[test]
    fn test_dor_needs_a_following_heading_but_dod_does_not() {
        let dor_last = "## Definition of Ready\n- [x] done\n";
        let res = SchemaChecker::new(dor_last).validate_dor_dod_completeness();
        assert_eq!(res.dor.total, 0);

        let dod_last = "## Definition of Done\n- [x] done\n- [ ] left\n";
        let res = SchemaChecker::new(dod_last).validate_dor_dod_completeness();
        assert_eq!((res.dod.checked, res.dod.total), (1, 2));
    }

    #[test]
    fn test_ac_format_reports_missing_markers() {
        let res = SchemaChecker::new(FULL).validate_ac_format();
        assert_eq!(res.ac_count, 2);
        assert_eq!(res.testable_count, 1);
        assert_eq!(res.percentage, 50.0);
        assert_eq!(res.issues, vec!["AC2: Missing When"]);
    }

    #[test]
    fn test_single_ac_without_when_is_untestable() {
        let doc = "## Acceptance Criteria\n### AC1: Login\nGiven - a user\nThen - they are in\n";
        let res = SchemaChecker::new(doc).validate_ac_format();
        assert_eq!(res.testable_count, 0);
        assert_eq!(res.percentage, 0.0);
        assert_eq!(res.issues.len(), 1);
        assert!(res.issues[0].contains("When"));
    }

    #[test]
    fn test_ac_section_without_subsections_scores_zero() {
        let doc = "## Acceptance Criteria\nIt works.\n## Subtasks\n";
        let res = SchemaChecker::new(doc).validate_ac_format();
        assert_eq!((res.ac_count, res.percentage), (0, 0.0));
        assert!(res.issues.is_empty());
    }

    #[test]
    fn test_no_ac_section() {
        let res = SchemaChecker::new("# Empty\n").validate_ac_format();
        assert_eq!(res.ac_count, 0);
        assert_eq!(res.issues, vec!["No AC section found"]);
    }

    #[test]
    fn test_path_mapping_presence_is_textual() {
        assert!(SchemaChecker::new(FULL).has_path_mapping());
        assert!(!SchemaChecker::new("## Subtasks\n").has_path_mapping());
    }
}
