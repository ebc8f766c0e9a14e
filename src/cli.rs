//! CLI argument parsing via `clap`.

use clap::{ArgGroup, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "backlog-gate",
    version,
    about = "Backlog story quality gate",
    long_about = "backlog-gate checks backlog story documents: declared path mappings against the repository, required sections, checklist completion and acceptance-criteria testability.\n\nConfiguration precedence: CLI > backlog-gate.toml > defaults.",
    after_help = "Examples:\n  backlog-gate paths --story CORE-005\n  backlog-gate paths --epic EPIC-001 --format json\n  backlog-gate story --story CORE-008 --score --min-score 80\n  backlog-gate story --epic 001 --check-dod",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands for path coverage and story quality.
pub enum Commands {
    /// Show version
    #[command(
        about = "Show version",
        long_about = "Print the current backlog-gate version."
    )]
    Version,
    /// Check declared path mappings
    #[command(
        about = "Report path mapping coverage",
        long_about = "Resolve each path declared under path_mapping (code, test, docs) against the repository root. Globs count as one declared path that exists when it matches at least one file.",
        after_help = "Examples:\n  backlog-gate paths --story CORE-005\n  backlog-gate paths --epic EPIC-001 --show-zero",
        group(ArgGroup::new("target").required(true).args(["story", "epic"]))
    )]
    Paths {
        #[arg(long, help = "Story id (e.g. CORE-005)")]
        story: Option<String>,
        #[arg(long, help = "Epic id (e.g. EPIC-001 or 001)")]
        epic: Option<String>,
        #[arg(long, help = "Output mode: text|json (default: text)")]
        format: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Also list stories at 0% in epic text output")]
        show_zero: bool,
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
    },
    /// Check story structure and quality
    #[command(
        about = "Validate story structure and score quality",
        long_about = "Check required sections, DoR/DoD checklist completion and acceptance-criteria testability. Without a check flag the schema, DoR/DoD and AC checks all run.",
        after_help = "Examples:\n  backlog-gate story --story CORE-008\n  backlog-gate story --story CORE-008 --score --format json",
        group(ArgGroup::new("target").required(true).args(["story", "epic"]))
    )]
    Story {
        #[arg(long, help = "Story id (e.g. CORE-008)")]
        story: Option<String>,
        #[arg(long, help = "Epic id (e.g. EPIC-001 or 001)")]
        epic: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Check required sections")]
        check_schema: bool,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Check DoR/DoD completion")]
        check_dod: bool,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Check AC Given/When/Then format")]
        check_ac: bool,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Check YAML frontmatter is present and valid")]
        check_yaml: bool,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Show the weighted quality score")]
        score: bool,
        #[arg(long, help = "Exit non-zero when the score is below this value (requires --score)")]
        min_score: Option<f64>,
        #[arg(long, help = "Output mode: text|json (default: text)")]
        format: Option<String>,
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
    },
}

/// What a `--story`/`--epic` pair selects.
pub enum Target {
    Story(String),
    Epic(String),
}

impl Target {
    /// `--story` wins when both are somehow present; None when neither is.
    pub fn from_args(story: Option<String>, epic: Option<String>) -> Option<Self> {
        match (story, epic) {
            (Some(s), _) => Some(Target::Story(s)),
            (None, Some(e)) => Some(Target::Epic(e)),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_paths_story() {
        let cli = Cli::try_parse_from(["backlog-gate", "paths", "--story", "CORE-005", "--format", "json"])
            .unwrap();
        match cli.cmd {
            Commands::Paths { story, format, show_zero, .. } => {
                assert_eq!(story.as_deref(), Some("CORE-005"));
                assert_eq!(format.as_deref(), Some("json"));
                assert!(!show_zero);
            }
            _ => panic!("expected paths"),
        }
    }

    #[test]
    fn test_story_and_epic_are_exclusive_and_required() {
        assert!(Cli::try_parse_from(["backlog-gate", "paths"]).is_err());
        assert!(Cli::try_parse_from([
            "backlog-gate", "story", "--story", "CORE-001", "--epic", "EPIC-001"
        ])
        .is_err());
    }

    #[test]
    fn test_parse_story_flags() {
        let cli = Cli::try_parse_from([
            "backlog-gate", "story", "--epic", "001", "--check-dod", "--score", "--min-score", "72.5",
        ])
        .unwrap();
        match cli.cmd {
            Commands::Story { epic, check_dod, check_ac, score, min_score, .. } => {
                assert_eq!(epic.as_deref(), Some("001"));
                assert!(check_dod && score && !check_ac);
                assert_eq!(min_score, Some(72.5));
            }
            _ => panic!("expected story"),
        }
    }

    #[test]
    fn test_target_from_args() {
        assert!(matches!(
            Target::from_args(None, Some("EPIC-001".into())),
            Some(Target::Epic(_))
        ));
        assert!(Target::from_args(None, None).is_none());
    }
}
