/// Shared utility functions

pub const MS_PER_DAY: i64 = 86_400_000;

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Safely truncate a string at a UTF-8 boundary
pub fn safe_truncate(s: &str, max_bytes: usize) -> &str {
    if max_bytes >= s.len() { return s; }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// First 8 bytes of a node ID for display.
pub fn truncate_id(id: &str) -> &str {
    safe_truncate(id, 8)
}

/// Truncate a title to `max` characters, appending an ellipsis when cut.
pub fn truncate_title(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((byte_pos, _)) => format!("{}...", &s[..byte_pos]),
    }
}
