/// Collapse every whitespace run (spaces, tabs, newlines) to one space and trim.
///
/// ```
/// use gist_web::text::normalize_whitespace;
///
/// assert_eq!(normalize_whitespace("  a\n\n b\tc  "), "a b c");
/// ```
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First `max_chars` characters of `s`, never splitting a UTF-8 sequence.
pub fn excerpt(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_is_char_based() {
        assert_eq!(excerpt("héllo wörld", 5), "héllo");
        assert_eq!(excerpt("abc", 10), "abc");
    }
}
