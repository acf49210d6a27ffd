//! Small string helpers shared by the API and store crates.

/// Loose check that a submitted link points at YouTube.
///
/// Only the presence of the substring `youtube` is required; URL shape is
/// checked separately by the [`VideoJob`](crate::VideoJob) schema.
pub fn is_youtube_link(url: &str) -> bool {
    !url.is_empty() && url.contains("youtube")
}

/// Truncate to at most `max_chars` characters without splitting a code point.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
