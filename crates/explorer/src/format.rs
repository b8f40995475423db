//! Text helpers shared by screens and progress reports.

/// Units of the binary size ladder, smallest first.
const SIZE_UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

/// Marker appended to or prepended on shortened text.
pub const ELLIPSIS: &str = "...";

/// Format a byte count with 1024-based units and two decimals.
///
/// ```
/// assert_eq!(explorer::format_size(1536), "1.50 KB");
/// ```
pub fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in &SIZE_UNITS[..SIZE_UNITS.len() - 1] {
        if size < 1024.0 {
            return format!("{size:.2} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.2} {}", SIZE_UNITS[SIZE_UNITS.len() - 1])
}

/// Keep the first `max - 3` characters and append `...` when `text` has more
/// than `max` characters.
pub fn truncate_end(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(ELLIPSIS.len());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Keep the last `max - 3` characters behind a leading `...` when `text` has
/// more than `max` characters.
pub fn truncate_start(text: &str, max: usize) -> String {
    let count = text.chars().count();
    if count <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(ELLIPSIS.len());
    let tail: String = text.chars().skip(count - keep).collect();
    format!("{ELLIPSIS}{tail}")
}

/// Escape text for Telegram's HTML parse mode.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
