//! String utilities for the domain layer.

/// Single-line preview of a message, for logs and history listings.
///
/// Newlines collapse to spaces. Uses byte length for `max_len` but truncates
/// on a valid UTF-8 character boundary and appends an ellipsis.
pub fn preview(s: &str, max_len: usize) -> String {
    let flat: String = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.len() <= max_len {
        flat
    } else {
        let target = max_len.saturating_sub(3);
        let mut end = target.min(flat.len());
        while end > 0 && !flat.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &flat[..end])
    }
}
