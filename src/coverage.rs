//! Roll per-category results up to story and epic totals.

use crate::models::{EpicCoverage, OverallStats, StoryCoverage, ValidationResult};
use crate::utils::{ratio_percent, round1};

/// Sum totals across categories. An empty set counts as 100%.
pub fn overall_stats(results: &[ValidationResult]) -> OverallStats {
    let total = results.iter().map(|r| r.total()).sum();
    let exist = results.iter().map(|r| r.exist_count()).sum();
    stats(total, exist)
}

/// Sum story-level totals across an epic.
pub fn epic_overall<'a, I>(stories: I) -> OverallStats
where
    I: IntoIterator<Item = &'a StoryCoverage>,
{
    let (total, exist) = stories
        .into_iter()
        .map(|s| overall_stats(&s.results))
        .fold((0, 0), |(t, e), o| (t + o.total, e + o.exist));
    stats(total, exist)
}

fn stats(total: usize, exist: usize) -> OverallStats {
    OverallStats {
        total,
        exist,
        percentage: round1(ratio_percent(exist, total, 100.0)),
    }
}

impl StoryCoverage {
    pub fn overall(&self) -> OverallStats {
        overall_stats(&self.results)
    }
}

impl EpicCoverage {
    pub fn overall(&self) -> OverallStats {
        epic_overall(&self.stories)
    }
}
