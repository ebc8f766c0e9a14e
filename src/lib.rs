//! backlog-gate core library.
//!
//! This crate exposes programmatic APIs for checking backlog story documents:
//! path mapping coverage against the repository and structural quality of
//! the story markdown.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective configuration resolution.
//! - `error`: The crate error type.
//! - `frontmatter`: YAML frontmatter extraction and `path_mapping` parsing.
//! - `paths`: Literal and glob path resolution per category.
//! - `coverage`: Overall statistics for stories and epics.
//! - `schema`: Required sections, DoR/DoD checklists and AC format.
//! - `score`: Weighted quality score.
//! - `locate`: Story and epic discovery under the backlog directory.
//! - `validate`: End-to-end story and epic pipelines.
//! - `models`: Data models for coverage and quality results.
//! - `output`: Human/JSON printers for both reports.
//! - `utils`: Supporting helpers.
pub mod cli;
pub mod config;
pub mod coverage;
pub mod error;
pub mod frontmatter;
pub mod locate;
pub mod models;
pub mod output;
pub mod paths;
pub mod schema;
pub mod score;
pub mod utils;
pub mod validate;
