//! Parsers for rendered site pages that have no API equivalent.

mod comments;
mod stories;

pub use comments::parse_comment_rows;
pub use stories::{parse_story_rows, ScrapedStory};

use crate::error::HnError;

/// Reject bodies that are plainly not HTML (the site answers rate-limited
/// page requests with a plain-text notice).
pub(crate) fn ensure_html(body: &str) -> Result<(), HnError> {
    if body.contains('<') || body.contains('>') {
        Ok(())
    } else {
        Err(HnError::MalformedUpstream("not HTML content".to_string()))
    }
}

/// Parse the digit run at the start of `text`, e.g. `123` from "123 points".
pub(crate) fn leading_number(text: &str) -> Option<u64> {
    let digits: String = text.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Parse the first digit run found anywhere in `text`.
pub(crate) fn first_number(text: &str) -> Option<u64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    leading_number(&text[start..])
}
