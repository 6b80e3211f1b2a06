/// Replace every character outside `[A-Za-z0-9_-]` with `_`.
///
/// One underscore per character, so multi-byte characters shrink to a single `_`.
pub fn sanitize_filename(name: &str) -> String {
    name.chars().map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' }).collect()
}

/// The first `max_chars` characters of `s`.
pub fn truncate(
    s: &str,
    max_chars: usize,
) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
