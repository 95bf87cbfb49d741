//! Shared utility functions.

/// Shorten `s` to at most `max_chars` characters for log and UI previews,
/// appending an ellipsis when anything was cut.
pub fn preview(s: &str, max_chars: usize) -> String {
    let flat = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let kept: String = flat.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept)
}
