//! Error taxonomy for locating and parsing story documents.
//!
//! Structural gaps (missing headings, empty checklists, missing declared
//! paths) are result values, not errors. Only a document that cannot be
//! found, read, or parsed surfaces here.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GateError {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("failed to parse frontmatter in {path}: {message}")]
    Parse { path: String, message: String },

    #[error("I/O error: {source} (path: {path})")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },
}

impl GateError {
    pub fn story_not_found(id: &str) -> Self {
        GateError::NotFound {
            kind: "Story",
            id: id.to_string(),
        }
    }

    pub fn epic_not_found(id: &str) -> Self {
        GateError::NotFound {
            kind: "Epic",
            id: id.to_string(),
        }
    }

    /// True for errors that only affect one document of a batch.
    pub fn is_per_story(&self) -> bool {
        matches!(self, GateError::Parse { .. } | GateError::Io { .. })
    }
}

pub type Result<T> = std::result::Result<T, GateError>;
