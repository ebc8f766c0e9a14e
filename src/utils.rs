//! Small shared helpers: decimal rounding and stderr message prefixes.

use owo_colors::OwoColorize;

/// Round to one decimal place.
///
/// Rounds the exact binary value, so `2.85` (stored slightly above) goes up
/// and only exact ties such as `0.25` go to even. Scaling by ten first would
/// turn near-ties into false ties.
pub fn round1(value: f64) -> f64 {
    format!("{value:.1}").parse().unwrap_or(value)
}

/// `part / whole * 100`, or `empty` when `whole` is zero.
pub fn ratio_percent(part: usize, whole: usize, empty: f64) -> f64 {
    if whole == 0 {
        empty
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

pub fn colors_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

pub fn error_prefix() -> String {
    if colors_enabled() {
        "⟦error⟧".red().bold().to_string()
    } else {
        "⟦error⟧".to_string()
    }
}

pub fn warn_prefix() -> String {
    if colors_enabled() {
        "⟦warn⟧".yellow().bold().to_string()
    } else {
        "⟦warn⟧".to_string()
    }
}

pub fn note_prefix() -> String {
    if colors_enabled() {
        "⟦note⟧".blue().bold().to_string()
    } else {
        "⟦note⟧".to_string()
    }
}
