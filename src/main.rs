//! backlog-gate CLI binary entry point.
//! Resolves configuration, runs the path or story pipeline and prints results.

use backlog_gate::cli::{Cli, Commands, Target};
use backlog_gate::config::{self, Effective, OutputFormat};
use backlog_gate::error::GateError;
use backlog_gate::output;
use backlog_gate::utils::{error_prefix, note_prefix, warn_prefix};
use backlog_gate::validate::{self, Checks, StoryAssessment};
use clap::Parser;
use env_logger::Env;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let code = match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            0
        }
        Commands::Paths {
            story,
            epic,
            format,
            show_zero,
            repo_root,
        } => {
            let eff = resolve(repo_root.as_deref(), format.as_deref());
            match Target::from_args(story, epic) {
                Some(target) => run_paths(&eff, target, show_zero),
                None => 1,
            }
        }
        Commands::Story {
            story,
            epic,
            check_schema,
            check_dod,
            check_ac,
            check_yaml,
            score,
            min_score,
            format,
            repo_root,
        } => {
            let eff = resolve(repo_root.as_deref(), format.as_deref());
            let checks = Checks {
                schema: check_schema,
                dod: check_dod,
                ac: check_ac,
                yaml: check_yaml,
                score,
            };
            // --min-score only applies together with --score
            let min_score = if score { min_score } else { None };
            match Target::from_args(story, epic) {
                Some(target) => run_story(&eff, target, checks, min_score),
                None => 1,
            }
        }
    };
    std::process::exit(code);
}

fn resolve(repo_root: Option<&str>, format: Option<&str>) -> Effective {
    let eff = config::resolve_effective(repo_root, format);
    log::debug!("repo root: {}", eff.repo_root.display());
    if !eff.config_found && eff.output != OutputFormat::Json {
        eprintln!(
            "{} No backlog-gate.toml found; using defaults.",
            note_prefix()
        );
    }
    eff
}

fn report_error(e: &GateError) -> i32 {
    eprintln!("{} {}", error_prefix(), e);
    1
}

fn run_paths(eff: &Effective, target: Target, show_zero: bool) -> i32 {
    match target {
        Target::Story(id) => match validate::validate_story_paths(eff, &id) {
            Ok(cov) => {
                output::print_story_coverage(&cov, eff.output);
                0
            }
            Err(e) => report_error(&e),
        },
        Target::Epic(id) => match validate::validate_epic_paths(eff, &id) {
            Ok(epic) => {
                output::print_epic_coverage(&epic, eff.output, show_zero);
                0
            }
            Err(e) => report_error(&e),
        },
    }
}

fn run_story(eff: &Effective, target: Target, checks: Checks, min_score: Option<f64>) -> i32 {
    let (epic_id, items) = match target {
        Target::Story(id) => match validate::assess_story(eff, &id) {
            Ok(a) => (None, vec![a]),
            Err(e) => return report_error(&e),
        },
        Target::Epic(id) => match validate::assess_epic(eff, &id) {
            Ok(items) => (Some(id), items),
            Err(e) => return report_error(&e),
        },
    };

    match &epic_id {
        Some(id) => output::print_epic_assessments(id, &items, checks, &eff.thresholds, eff.output),
        None => {
            for a in &items {
                output::print_assessment(a, checks, &eff.thresholds, eff.output);
            }
        }
    }

    let mut code = 0;
    if eff.output == OutputFormat::Text {
        for a in &items {
            let reasons = validate::check_failures(a, checks, &eff.thresholds);
            for reason in &reasons {
                eprintln!("{} {}: {}", warn_prefix(), a.story_id, reason);
            }
            if !reasons.is_empty() {
                code = 1;
            }
        }
    }
    if let Some(min) = min_score {
        if below_min_score(&items, min, eff.output) {
            code = 1;
        }
    }
    code
}

fn below_min_score(items: &[StoryAssessment], min: f64, output: OutputFormat) -> bool {
    let mut below = false;
    for a in items.iter().filter(|a| !a.score.meets_threshold(min)) {
        if output == OutputFormat::Text {
            eprintln!(
                "{} {}: score {} below minimum {}",
                error_prefix(),
                a.story_id,
                a.score.total,
                min
            );
        }
        below = true;
    }
    below
}
