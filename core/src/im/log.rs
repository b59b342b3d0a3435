//! Log helpers for IM traffic. Message content is truncated before it reaches a log line.

use std::borrow::Cow;

const CONTENT_LOG_MAX_CHARS: usize = 120;

/// Truncate message content for logging (avoid huge dumps). Cuts on a char boundary.
#[inline]
pub fn truncate_content(content: &str, max_chars: usize) -> Cow<'_, str> {
    match content.char_indices().nth(max_chars) {
        None => Cow::Borrowed(content),
        Some((idx, _)) => Cow::Owned(format!("{}... ({} bytes)", &content[..idx], content.len())),
    }
}

#[inline]
pub fn truncate_content_default(content: &str) -> Cow<'_, str> {
    truncate_content(content, CONTENT_LOG_MAX_CHARS)
}
