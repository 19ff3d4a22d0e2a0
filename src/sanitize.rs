//! Cleanup of upstream comment and "about" HTML fragments.

use once_cell::sync::Lazy;
use regex::Regex;

static TRAILING_DASHES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)">-+</font"#).expect("Invalid regex"));
static FONT_TAGS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</?font[^<>]*>").expect("Invalid regex"));
static PARAGRAPH_CLOSERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</p>").expect("Invalid regex"));

/// Normalize a fragment of comment HTML.
///
/// Legacy `<font>` styling (including the signature-dash runs some old
/// comments carry) is stripped, closing `</p>` tags are dropped, and the
/// fragment is prefixed with `<p>` when it does not already start with one.
/// The result is the open-paragraph markup the site's own pages use.
#[must_use]
pub fn clean_text(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }
    let text = TRAILING_DASHES.replace_all(html, "\"></font");
    let text = FONT_TAGS.replace_all(&text, "");
    let text = PARAGRAPH_CLOSERS.replace_all(&text, "");
    let has_leading_p = text
        .get(..3)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("<p>"));
    if has_leading_p {
        text.into_owned()
    } else {
        format!("<p>{text}")
    }
}
