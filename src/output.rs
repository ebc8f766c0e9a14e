//! Output rendering for path coverage and story quality reports.
//!
//! Supports `text` (default) and `json` outputs. Text renderers return a
//! `String` so they can be tested without capturing stdout; colors are only
//! applied when requested and `NO_COLOR` is unset.

use crate::config::{OutputFormat, Thresholds};
use crate::models::quality::ChecklistResult;
use crate::models::{EpicCoverage, StoryCoverage, ValidationResult};
use crate::utils::{colors_enabled, round1};
use crate::validate::{Checks, FrontmatterStatus, StoryAssessment};
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::{Map, Value as JsonVal};

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";
const OK: &str = "✅";
const WARN: &str = "⚠️";
const FAIL: &str = "❌";
const PREVIEW_LIMIT: usize = 3;

fn use_colors(output: OutputFormat) -> bool {
    output != OutputFormat::Json && colors_enabled()
}

fn bold(s: &str, color: bool) -> String {
    if color {
        s.bold().to_string()
    } else {
        s.to_string()
    }
}

fn red(s: &str, color: bool) -> String {
    if color {
        s.red().to_string()
    } else {
        s.to_string()
    }
}

fn yellow(s: &str, color: bool) -> String {
    if color {
        s.yellow().to_string()
    } else {
        s.to_string()
    }
}

fn status(percentage: f64) -> &'static str {
    if percentage == 100.0 {
        OK
    } else {
        WARN
    }
}

fn to_pretty(value: &JsonVal) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Path coverage
// ---------------------------------------------------------------------------

fn compose_category_json(r: &ValidationResult) -> JsonVal {
    let mut obj = Map::new();
    obj.insert("total".into(), json!(r.total()));
    obj.insert("exist".into(), json!(r.exist_count()));
    obj.insert("missing".into(), json!(r.missing));
    obj.insert("percentage".into(), json!(round1(r.percentage())));
    if !r.glob_expanded.is_empty() {
        let counts: Map<String, JsonVal> = r
            .glob_expanded
            .iter()
            .map(|(pattern, files)| (pattern.clone(), json!(files.len())))
            .collect();
        obj.insert("glob_expanded".into(), JsonVal::Object(counts));
    }
    JsonVal::Object(obj)
}

fn compose_coverage_json(cov: &StoryCoverage) -> JsonVal {
    let coverage: Map<String, JsonVal> = cov
        .results
        .iter()
        .map(|r| (r.category.key().to_string(), compose_category_json(r)))
        .collect();
    json!({
        "story_id": cov.story_id,
        "coverage": coverage,
        "overall": cov.overall(),
    })
}

/// Compose the story coverage JSON object (pure) for testing/snapshot purposes.
pub fn compose_story_json(cov: &StoryCoverage) -> JsonVal {
    compose_coverage_json(cov)
}

/// Compose the epic coverage JSON object; stories are sorted by id.
pub fn compose_epic_json(epic: &EpicCoverage) -> JsonVal {
    let mut stories: Vec<&StoryCoverage> = epic.stories.iter().collect();
    stories.sort_by(|a, b| a.story_id.cmp(&b.story_id));
    let items: Vec<JsonVal> = stories.iter().map(|s| compose_coverage_json(s)).collect();
    json!({
        "epic_id": epic.epic_id,
        "stories": items,
        "epic_overall": epic.overall(),
    })
}

fn render_category(lines: &mut Vec<String>, r: &ValidationResult, color: bool) {
    lines.push(format!(
        "{} {:12} {}/{} ({:.0}%)",
        status(r.percentage()),
        r.category.key(),
        r.exist_count(),
        r.total(),
        r.percentage()
    ));
    for (pattern, files) in &r.glob_expanded {
        lines.push(format!("   {} → {} files", pattern, files.len()));
    }
    let literals: Vec<&str> = r
        .existing
        .iter()
        .filter(|p| r.glob_matches(p).is_none())
        .map(String::as_str)
        .collect();
    if !literals.is_empty() {
        let mut preview = literals
            .iter()
            .take(PREVIEW_LIMIT)
            .copied()
            .collect::<Vec<_>>()
            .join(", ");
        if literals.len() > PREVIEW_LIMIT {
            preview.push_str(&format!(" ... (+{} more)", literals.len() - PREVIEW_LIMIT));
        }
        lines.push(format!("   {preview}"));
    }
    if !r.missing.is_empty() {
        lines.push(format!(
            "   {}",
            red(&format!("{FAIL} MISSING ({}):", r.missing.len()), color)
        ));
        for path in &r.missing {
            lines.push(format!("      - {path}"));
        }
    }
}

/// Human-readable story coverage report.
pub fn render_story_text(cov: &StoryCoverage, color: bool) -> String {
    let mut lines = vec![
        RULE.to_string(),
        bold(&format!("📊 Path Mapping Coverage: {}", cov.story_id), color),
        RULE.to_string(),
        String::new(),
    ];
    for r in &cov.results {
        render_category(&mut lines, r, color);
        lines.push(String::new());
    }
    let o = cov.overall();
    lines.push(RULE.to_string());
    lines.push(bold(
        &format!(
            "📈 Overall: {:.0}% ({}/{} paths exist)",
            o.percentage, o.exist, o.total
        ),
        color,
    ));
    lines.push(RULE.to_string());
    lines.join("\n")
}

/// Human-readable epic coverage report.
///
/// Stories at exactly 0% are hidden unless `show_zero` is set; the footer
/// always totals every story.
pub fn render_epic_text(epic: &EpicCoverage, show_zero: bool, color: bool) -> String {
    let mut lines = vec![
        RULE.to_string(),
        bold(&format!("📊 Epic Path Mapping Coverage: {}", epic.epic_id), color),
        RULE.to_string(),
        String::new(),
    ];
    let mut stories: Vec<&StoryCoverage> = epic.stories.iter().collect();
    stories.sort_by(|a, b| a.story_id.cmp(&b.story_id));
    for story in stories {
        let o = story.overall();
        if !show_zero && o.percentage == 0.0 {
            continue;
        }
        lines.push(format!(
            "{} {:12} {:>3.0}% ({}/{} paths)",
            status(o.percentage),
            story.story_id,
            o.percentage,
            o.exist,
            o.total
        ));
        let breakdown: Vec<String> = story
            .results
            .iter()
            .map(|r| format!("{}:{}/{}", r.category.short(), r.exist_count(), r.total()))
            .collect();
        lines.push(format!("   └─ {}", breakdown.join(", ")));
        lines.push(String::new());
    }
    let o = epic.overall();
    lines.push(RULE.to_string());
    lines.push(bold(
        &format!(
            "📈 Epic Total: {:.0}% ({}/{} paths exist)",
            o.percentage, o.exist, o.total
        ),
        color,
    ));
    lines.push(RULE.to_string());
    lines.join("\n")
}

/// Print a story coverage report in the requested format.
pub fn print_story_coverage(cov: &StoryCoverage, output: OutputFormat) {
    match output {
        OutputFormat::Json => println!("{}", to_pretty(&compose_story_json(cov))),
        OutputFormat::Text => println!("{}", render_story_text(cov, use_colors(output))),
    }
}

/// Print an epic coverage report in the requested format.
pub fn print_epic_coverage(epic: &EpicCoverage, output: OutputFormat, show_zero: bool) {
    match output {
        OutputFormat::Json => println!("{}", to_pretty(&compose_epic_json(epic))),
        OutputFormat::Text => {
            println!("{}", render_epic_text(epic, show_zero, use_colors(output)))
        }
    }
}

// ---------------------------------------------------------------------------
// Story quality
// ---------------------------------------------------------------------------

/// Compose one story's quality JSON; `quality_score` only when scoring.
pub fn compose_assessment_json(a: &StoryAssessment, with_score: bool) -> JsonVal {
    let mut out = json!({
        "story_id": a.story_id,
        "story_path": a.story_path.to_string_lossy(),
        "schema": {
            "sections": a.schema,
            "count": a.schema.count_sections(),
            "missing": a.schema.missing_sections(),
        },
        "dor_dod": a.dor_dod,
        "ac_format": a.ac_format,
    });
    if with_score {
        out["quality_score"] = json!(a.score);
    }
    out
}

pub fn compose_epic_assessment_json(epic_id: &str, items: &[StoryAssessment], with_score: bool) -> JsonVal {
    let stories: Vec<JsonVal> = items
        .iter()
        .map(|a| compose_assessment_json(a, with_score))
        .collect();
    json!({ "epic_id": epic_id, "stories": stories })
}

/// One decimal, except a vacuous ratio (nothing to count) which prints `0`.
fn ratio_label(percentage: f64, total: usize) -> String {
    if total == 0 {
        "0".to_string()
    } else {
        format!("{percentage:.1}")
    }
}

fn render_checklist(
    lines: &mut Vec<String>,
    label: &str,
    res: &ChecklistResult,
    threshold: f64,
    color: bool,
) {
    lines.push(format!(
        "  {}: {}/{} ({}%)",
        label,
        res.checked,
        res.total,
        ratio_label(res.percentage, res.total)
    ));
    if res.percentage < threshold {
        lines.push(format!(
            "  {}",
            yellow(&format!("{WARN}  Below {threshold}% threshold"), color)
        ));
    }
    if !res.unchecked_items.is_empty() {
        lines.push(format!("  {}", yellow("Unchecked items:", color)));
        for item in res.unchecked_items.iter().take(PREVIEW_LIMIT) {
            lines.push(format!("     - {item}"));
        }
    }
}

/// Human-readable story quality report for the selected checks.
pub fn render_assessment_text(
    a: &StoryAssessment,
    checks: Checks,
    thresholds: &Thresholds,
    color: bool,
) -> String {
    let banner = "=".repeat(60);
    let mut lines = vec![
        String::new(),
        bold(&banner, color),
        bold(&format!("Story Validation: {}", a.story_id), color),
        bold(&banner, color),
        String::new(),
    ];

    if checks.run_schema() {
        lines.push(bold("📋 Schema Validation", color));
        for (section, present) in &a.schema.sections {
            let mark = if *present { OK } else { FAIL };
            lines.push(format!("  {} {}", mark, section.name()));
        }
        let count = a.schema.count_sections();
        lines.push(String::new());
        lines.push(format!(
            "  Present: {}/{} ({:.1}%)",
            count.present, count.required, count.percentage
        ));
        let missing = a.schema.missing_sections();
        if !missing.is_empty() {
            lines.push(String::new());
            lines.push(format!("  {}", yellow(&format!("{WARN}  Missing sections:"), color)));
            for section in missing {
                lines.push(format!("     - {section}"));
            }
        }
        lines.push(String::new());
    }

    if checks.run_dod() {
        lines.push(bold("✅ DoR/DoD Completeness", color));
        render_checklist(&mut lines, "DoR", &a.dor_dod.dor, thresholds.dor, color);
        lines.push(String::new());
        render_checklist(&mut lines, "DoD", &a.dor_dod.dod, thresholds.dod, color);
        lines.push(String::new());
    }

    if checks.run_ac() {
        lines.push(bold("🧪 AC Testability", color));
        lines.push(format!(
            "  Testable AC: {}/{} ({}%)",
            a.ac_format.testable_count,
            a.ac_format.ac_count,
            ratio_label(a.ac_format.percentage, a.ac_format.ac_count)
        ));
        if !a.ac_format.issues.is_empty() {
            lines.push(format!("  {}", yellow(&format!("{WARN}  Issues:"), color)));
            for issue in &a.ac_format.issues {
                lines.push(format!("     - {issue}"));
            }
        }
        lines.push(String::new());
    }

    if checks.run_yaml() {
        lines.push(bold("🧾 YAML Frontmatter", color));
        match &a.frontmatter {
            FrontmatterStatus::Valid => lines.push(format!("  {OK} valid")),
            FrontmatterStatus::Missing => lines.push(format!("  {}", red(&format!("{FAIL} missing"), color))),
            FrontmatterStatus::Invalid(msg) => {
                lines.push(format!("  {}", red(&format!("{FAIL} invalid: {msg}"), color)))
            }
        }
        lines.push(String::new());
    }

    if checks.run_score() {
        let s = &a.score;
        let b = &s.breakdown;
        lines.push(bold("📊 Quality Score", color));
        let rows = [
            ("Schema:        ", &b.schema),
            ("DoR:           ", &b.dor),
            ("DoD:           ", &b.dod),
            ("AC Testability: ", &b.ac_testability),
            ("Path Mapping:  ", &b.path_mapping),
            ("YAML:          ", &b.yaml),
        ];
        for (label, c) in rows {
            match c.percentage {
                Some(p) => lines.push(format!("  {}{:.1}/{} ({:.1}%)", label, c.score, c.max, p)),
                None => lines.push(format!("  {}{:.1}/{}", label, c.score, c.max)),
            }
        }
        lines.push(format!("  {}", bold(&"─".repeat(50), color)));
        lines.push(format!(
            "  {}",
            bold(
                &format!("TOTAL: {:.1}/{} {} {}", s.total, s.max, s.emoji, s.level.as_str()),
                color
            )
        ));
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Print one story's quality report.
pub fn print_assessment(
    a: &StoryAssessment,
    checks: Checks,
    thresholds: &Thresholds,
    output: OutputFormat,
) {
    match output {
        OutputFormat::Json => println!("{}", to_pretty(&compose_assessment_json(a, checks.run_score()))),
        OutputFormat::Text => println!(
            "{}",
            render_assessment_text(a, checks, thresholds, use_colors(output))
        ),
    }
}

/// Print quality reports for every story of an epic.
pub fn print_epic_assessments(
    epic_id: &str,
    items: &[StoryAssessment],
    checks: Checks,
    thresholds: &Thresholds,
    output: OutputFormat,
) {
    match output {
        OutputFormat::Json => println!(
            "{}",
            to_pretty(&compose_epic_assessment_json(epic_id, items, checks.run_score()))
        ),
        OutputFormat::Text => {
            let color = use_colors(output);
            for a in items {
                println!("{}", render_assessment_text(a, checks, thresholds, color));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use crate::validate::assess_document;
    use std::path::Path;

    fn result(category: Category, existing: &[&str], missing: &[&str]) -> ValidationResult {
        let declared: Vec<String> = existing
            .iter()
            .chain(missing.iter())
            .map(|s| s.to_string())
            .collect();
        let mut r = ValidationResult::new(category, declared);
        r.existing = existing.iter().map(|s| s.to_string()).collect();
        r.missing = missing.iter().map(|s| s.to_string()).collect();
        r
    }

    fn core_005() -> StoryCoverage {
        StoryCoverage {
            story_id: "CORE-005".into(),
            results: vec![
                result(Category::Code, &["scripts/backlog/git_tracker.sh"], &[]),
                result(Category::Test, &[], &["scripts/backlog/test_git_tracker.sh"]),
                result(
                    Category::Docs,
                    &["backlog/README.md", "docs/workflow.md", "CHANGELOG.md"],
                    &[],
                ),
            ],
        }
    }

    #[test]
    fn test_compose_story_json_shape() {
        let out = compose_story_json(&core_005());
        assert_eq!(out["story_id"], "CORE-005");
        assert_eq!(out["coverage"]["test_paths"]["missing"][0], "scripts/backlog/test_git_tracker.sh");
        assert_eq!(out["coverage"]["docs_paths"]["percentage"], 100.0);
        assert!(out["coverage"]["code_paths"].get("glob_expanded").is_none());
        assert_eq!(out["overall"]["total"], 5);
        assert_eq!(out["overall"]["exist"], 4);
        assert_eq!(out["overall"]["percentage"], 80.0);
        let keys: Vec<&String> = out["coverage"].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["code_paths", "test_paths", "docs_paths"]);
    }

    #[test]
    fn test_compose_story_json_glob_counts() {
        let mut r = result(Category::Code, &["src/**/*.rs", "benches/*.rs"], &[]);
        r.glob_expanded
            .push(("src/**/*.rs".into(), vec!["src/a.rs".into(), "src/b.rs".into()]));
        r.glob_expanded
            .push(("benches/*.rs".into(), vec!["benches/c.rs".into()]));
        let cov = StoryCoverage {
            story_id: "CORE-001".into(),
            results: vec![r],
        };
        let out = compose_story_json(&cov);
        let globs = &out["coverage"]["code_paths"]["glob_expanded"];
        assert_eq!(globs["src/**/*.rs"], 2);
        let keys: Vec<&String> = globs.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["src/**/*.rs", "benches/*.rs"]);

        let text = render_story_text(&cov, false);
        let src = text.find("src/**/*.rs → 2 files").unwrap();
        let benches = text.find("benches/*.rs → 1 files").unwrap();
        assert!(src < benches);
    }

    #[test]
    fn test_compose_epic_json_sorted() {
        let mut second = core_005();
        second.story_id = "CORE-001".into();
        let epic = EpicCoverage {
            epic_id: "EPIC-001".into(),
            stories: vec![core_005(), second],
        };
        let out = compose_epic_json(&epic);
        assert_eq!(out["stories"][0]["story_id"], "CORE-001");
        assert_eq!(out["stories"][1]["story_id"], "CORE-005");
        assert_eq!(out["epic_overall"]["total"], 10);
        assert_eq!(out["epic_overall"]["exist"], 8);
        assert_eq!(out["epic_overall"]["percentage"], 80.0);
    }

    #[test]
    fn test_render_story_text() {
        let text = render_story_text(&core_005(), false);
        assert!(text.contains("📊 Path Mapping Coverage: CORE-005"));
        assert!(text.contains("✅ code_paths   1/1 (100%)"));
        assert!(text.contains("⚠️ test_paths   0/1 (0%)"));
        assert!(text.contains("❌ MISSING (1):"));
        assert!(text.contains("      - scripts/backlog/test_git_tracker.sh"));
        assert!(text.contains("📈 Overall: 80% (4/5 paths exist)"));
    }

    #[test]
    fn test_render_story_text_preview_limit() {
        let cov = StoryCoverage {
            story_id: "CORE-002".into(),
            results: vec![result(Category::Docs, &["a", "b", "c", "d", "e"], &[])],
        };
        let text = render_story_text(&cov, false);
        assert!(text.contains("   a, b, c ... (+2 more)"));
    }

    #[test]
    fn test_render_epic_text_hides_zero_stories() {
        let zero = StoryCoverage {
            story_id: "CORE-009".into(),
            results: vec![result(Category::Test, &[], &["t.sh"])],
        };
        let epic = EpicCoverage {
            epic_id: "EPIC-001".into(),
            stories: vec![core_005(), zero],
        };
        let hidden = render_epic_text(&epic, false, false);
        assert!(hidden.contains("⚠️ CORE-005      80% (4/5 paths)"));
        assert!(hidden.contains("   └─ code:1/1, test:0/1, docs:3/3"));
        assert!(!hidden.contains("CORE-009"));
        assert!(hidden.contains("📈 Epic Total: 67% (4/6 paths exist)"));

        let shown = render_epic_text(&epic, true, false);
        assert!(shown.contains("CORE-009"));
    }

    #[test]
    fn test_compose_assessment_json_shape() {
        let doc = "---\nid: CORE-008\npath_mapping: {}\n---\n## Subtasks\n";
        let a = assess_document("CORE-008", Path::new("README.md"), doc);
        let out = compose_assessment_json(&a, true);
        assert_eq!(out["schema"]["sections"]["YAML frontmatter"], true);
        assert_eq!(out["schema"]["sections"]["Definition of Ready"], false);
        assert_eq!(out["schema"]["count"]["present"], 2);
        assert_eq!(out["schema"]["missing"][0], "Role / Need / Benefit");
        assert_eq!(out["dor_dod"]["dor"]["total"], 0);
        assert_eq!(out["ac_format"]["issues"][0], "No AC section found");
        assert_eq!(out["quality_score"]["level"], "POOR");
        assert_eq!(out["quality_score"]["max"], 100);
        assert!(out["quality_score"]["breakdown"]["yaml"].get("percentage").is_none());
        assert_eq!(out["quality_score"]["breakdown"]["schema"]["score"], 10.0);

        let no_score = compose_assessment_json(&a, false);
        assert!(no_score.get("quality_score").is_none());
    }

    #[test]
    fn test_render_assessment_text_sections() {
        let doc = "## Acceptance Criteria\n### AC1: x\nGiven: a\nThen: b\n";
        let a = assess_document("CORE-003", Path::new("README.md"), doc);
        let checks = Checks {
            ac: true,
            score: true,
            ..Checks::default()
        };
        let text = render_assessment_text(&a, checks, &Thresholds::default(), false);
        assert!(text.contains("Story Validation: CORE-003"));
        assert!(text.contains("Testable AC: 0/1 (0.0%)"));
        assert!(text.contains("     - AC1: Missing When"));
        assert!(text.contains("TOTAL: 5.0/100 ❌ POOR"));
        assert!(!text.contains("Schema Validation"));
    }

    #[test]
    fn test_vacuous_ratios_print_as_integer_zero() {
        let doc = "## Definition of Ready\n- [ ] scope\n## Definition of Done\nnothing yet\n";
        let a = assess_document("CORE-004", Path::new("README.md"), doc);
        let checks = Checks {
            dod: true,
            ..Checks::default()
        };
        let text = render_assessment_text(&a, checks, &Thresholds::default(), false);
        assert!(text.contains("  DoR: 0/1 (0.0%)"));
        assert!(text.contains("  DoD: 0/0 (0%)"));
        assert!(text.contains("     - scope"));
    }
}
