//! Configuration discovery and effective settings resolution.
//!
//! Reads `backlog-gate.toml|yaml|yml` from the repository root (or closest
//! ancestor) and merges it with CLI flags to produce an `Effective` config.
//! Defaults:
//! - `backlog`: `backlog`
//! - `story_file`: `README.md`
//! - `story_pattern`: `CORE-*`
//! - `output`: `text`
//! - `thresholds.{dor,dod,score}`: 75 / 80 / 70
//!
//! Overrides precedence: CLI > config file > defaults.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_NAMES: [&str; 3] = ["backlog-gate.toml", "backlog-gate.yaml", "backlog-gate.yml"];

#[derive(Debug, Default, Deserialize, Clone)]
/// Minimum percentages enforced by the story checks.
pub struct ThresholdCfg {
    pub dor: Option<f64>,
    pub dod: Option<f64>,
    pub score: Option<f64>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `backlog-gate.toml|yaml`.
pub struct GateConfig {
    pub backlog: Option<String>,
    pub story_file: Option<String>,
    pub story_pattern: Option<String>,
    pub output: Option<String>,
    #[serde(default)]
    pub thresholds: Option<ThresholdCfg>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub dor: f64,
    pub dod: f64,
    pub score: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            dor: 75.0,
            dod: 80.0,
            score: 70.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    /// Anything other than `json` renders as text.
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("json") {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub repo_root: PathBuf,
    pub backlog: String,
    pub story_file: String,
    pub story_pattern: String,
    pub output: OutputFormat,
    pub thresholds: Thresholds,
    pub config_found: bool,
}

impl Effective {
    pub fn backlog_dir(&self) -> PathBuf {
        self.repo_root.join(&self.backlog)
    }
}

impl Default for Effective {
    fn default() -> Self {
        Self {
            repo_root: PathBuf::from("."),
            backlog: "backlog".to_string(),
            story_file: "README.md".to_string(),
            story_pattern: "CORE-*".to_string(),
            output: OutputFormat::Text,
            thresholds: Thresholds::default(),
            config_found: false,
        }
    }
}

/// Absolute form of `start`; relative paths resolve against the current dir.
fn absolute_start(start: &Path) -> PathBuf {
    fs::canonicalize(start).unwrap_or_else(|_| match std::env::current_dir() {
        Ok(cwd) => cwd.join(start),
        Err(_) => start.to_path_buf(),
    })
}

/// Walk upward from `start` to detect the repository root.
///
/// Stops when a config file or a `.git` directory is found. `start` is made
/// absolute first so a relative `.` can still walk above the current dir.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let start = absolute_start(start);
    let mut cur = start.as_path();
    loop {
        if CONFIG_NAMES.iter().any(|n| cur.join(n).exists()) {
            return cur.to_path_buf();
        }
        if cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `GateConfig` from `backlog-gate.toml` or `backlog-gate.yaml|yml`.
///
/// An unreadable or invalid file is treated as absent.
pub fn load_config(root: &Path) -> Option<GateConfig> {
    let toml_path = root.join(CONFIG_NAMES[0]);
    if toml_path.exists() {
        let s = fs::read_to_string(&toml_path).ok()?;
        return match toml::from_str(&s) {
            Ok(cfg) => Some(cfg),
            Err(e) => {
                log::warn!("ignoring {}: {}", toml_path.display(), e);
                None
            }
        };
    }
    for yml in &CONFIG_NAMES[1..] {
        let p = root.join(yml);
        if p.exists() {
            let s = fs::read_to_string(&p).ok()?;
            return match serde_yaml::from_str(&s) {
                Ok(cfg) => Some(cfg),
                Err(e) => {
                    log::warn!("ignoring {}: {}", p.display(), e);
                    None
                }
            };
        }
    }
    None
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(cli_repo_root: Option<&str>, cli_output: Option<&str>) -> Effective {
    let repo_root = detect_repo_root(Path::new(cli_repo_root.unwrap_or(".")));
    let loaded = load_config(&repo_root);
    let config_found = loaded.is_some();
    let cfg = loaded.unwrap_or_default();
    let defaults = Effective::default();

    let output = cli_output
        .map(|s| s.to_string())
        .or(cfg.output)
        .map(|s| OutputFormat::parse(&s))
        .unwrap_or(defaults.output);

    let th = cfg.thresholds.unwrap_or_default();
    let thresholds = Thresholds {
        dor: th.dor.unwrap_or(defaults.thresholds.dor),
        dod: th.dod.unwrap_or(defaults.thresholds.dod),
        score: th.score.unwrap_or(defaults.thresholds.score),
    };

    Effective {
        repo_root,
        backlog: cfg.backlog.unwrap_or(defaults.backlog),
        story_file: cfg.story_file.unwrap_or(defaults.story_file),
        story_pattern: cfg.story_pattern.unwrap_or(defaults.story_pattern),
        output,
        thresholds,
        config_found,
    }
}
