//! Story and epic discovery under the backlog directory.
//!
//! Layout: `<backlog>/EPIC-<id>-<slug>/stories/<STORY-ID>-<slug>/<story_file>`.

use crate::config::Effective;
use glob::Pattern;
use std::fs;
use std::path::{Path, PathBuf};

fn sorted_dirs(parent: &Path) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = match fs::read_dir(parent) {
        Ok(entries) => entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .collect(),
        Err(_) => Vec::new(),
    };
    dirs.sort();
    dirs
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Locate the document of `story_id`.
///
/// Matches a story directory named exactly `story_id` or `story_id-<slug>`
/// in any epic. First hit in sorted order wins.
pub fn find_story_file(eff: &Effective, story_id: &str) -> Option<PathBuf> {
    let prefix = format!("{story_id}-");
    for epic_dir in sorted_dirs(&eff.backlog_dir()) {
        if !dir_name(&epic_dir).starts_with("EPIC-") {
            continue;
        }
        for story_dir in sorted_dirs(&epic_dir.join("stories")) {
            let name = dir_name(&story_dir);
            if name != story_id && !name.starts_with(&prefix) {
                continue;
            }
            let doc = story_dir.join(&eff.story_file);
            if doc.is_file() {
                log::debug!("story {} -> {}", story_id, doc.display());
                return Some(doc);
            }
        }
    }
    None
}

/// Epic ids may be given in short form (`001` -> `EPIC-001`).
pub fn normalize_epic_id(epic_id: &str) -> String {
    if epic_id.starts_with("EPIC-") {
        epic_id.to_string()
    } else {
        format!("EPIC-{epic_id}")
    }
}

/// Sorted story documents of the first epic directory matching `epic_id`.
///
/// Empty when the epic or its `stories/` directory does not exist.
pub fn find_epic_stories(eff: &Effective, epic_id: &str) -> Vec<PathBuf> {
    let epic_id = normalize_epic_id(epic_id);
    let Some(epic_dir) = sorted_dirs(&eff.backlog_dir())
        .into_iter()
        .find(|d| dir_name(d).starts_with(&epic_id))
    else {
        return Vec::new();
    };
    let pattern = match Pattern::new(&eff.story_pattern) {
        Ok(p) => p,
        Err(e) => {
            log::warn!("invalid story_pattern '{}': {}", eff.story_pattern, e);
            return Vec::new();
        }
    };
    sorted_dirs(&epic_dir.join("stories"))
        .into_iter()
        .filter(|d| pattern.matches(&dir_name(d)))
        .map(|d| d.join(&eff.story_file))
        .filter(|doc| doc.is_file())
        .collect()
}

/// `CORE-008` from `.../CORE-008-schema-validator/README.md`.
///
/// Falls back to the whole directory name when it has fewer than two
/// dash-separated parts.
pub fn story_id_from_path(doc: &Path) -> String {
    let name = doc.parent().map(dir_name).unwrap_or_default();
    let mut parts = name.splitn(3, '-');
    match (parts.next(), parts.next()) {
        (Some(a), Some(b)) => format!("{a}-{b}"),
        _ => name,
    }
}
