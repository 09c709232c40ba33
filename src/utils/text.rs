const HIGHLIGHT_TAGS: [&str; 2] = ["<highlighttext>", "</highlighttext>"];

/// Strips search highlight markup and collapses whitespace runs.
pub fn normalize(raw: &str) -> String {
    let mut cleaned = raw.to_string();
    for tag in HIGHLIGHT_TAGS {
        cleaned = cleaned.replace(tag, "");
    }
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncates to at most `max_chars` characters, never splitting a char.
pub fn truncate_chars(value: String, max_chars: usize) -> String {
    match value.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => value[..byte_idx].to_string(),
        None => value,
    }
}

pub fn normalize_bounded(raw: Option<&str>, max_chars: usize) -> String {
    truncate_chars(normalize(raw.unwrap_or_default()), max_chars)
}
