//! Locating the JSON object inside free-form model output.

/// The substring from the first `{` to the last `}` inclusive.
///
/// Returns `None` when either brace is missing or the last `}` does not come
/// after the first `{`. Nested braces are not balanced.
pub fn candidate_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&raw[start..=end])
}
