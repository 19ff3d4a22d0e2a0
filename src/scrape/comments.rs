//! Scraping the rendered new-comments feed into flat rows.

use scraper::{Html, Selector};

use crate::constants::COMMENT_INDENT_WIDTH;
use crate::error::HnError;
use crate::hn::forest::FlatComment;
use crate::sanitize;

use super::{ensure_html, first_number};

/// Parse the rendered new-comments feed into flat, level-tagged rows in
/// document order.
///
/// The nesting level is the width of the row's indent spacer divided by
/// the per-level increment; rows without a spacer sit at level 0. Comment
/// bodies go through the same cleanup as API-fetched comments.
///
/// # Errors
///
/// Returns [`HnError::MalformedUpstream`] when the body is not HTML.
pub fn parse_comment_rows(body: &str) -> Result<Vec<FlatComment>, HnError> {
    ensure_html(body)?;
    let document = Html::parse_document(body);

    let row_selector = Selector::parse("tr.athing.comtr").expect("Invalid selector");
    let indent_selector = Selector::parse(r#"td.ind img[src*="s.gif"]"#).expect("Invalid selector");
    let user_selector = Selector::parse("a.hnuser").expect("Invalid selector");
    let age_selector = Selector::parse("span.age").expect("Invalid selector");
    let age_link_selector = Selector::parse("span.age a").expect("Invalid selector");
    let content_selector = Selector::parse(".commtext").expect("Invalid selector");

    let mut rows = Vec::new();
    for row in document.select(&row_selector) {
        let id = row
            .value()
            .attr("id")
            .and_then(|raw| raw.parse().ok())
            .or_else(|| {
                row.select(&age_link_selector)
                    .next()
                    .and_then(|a| a.value().attr("href"))
                    .and_then(first_number)
            });
        let Some(id) = id else { continue };

        let level = row
            .select(&indent_selector)
            .next()
            .and_then(|img| img.value().attr("width"))
            .and_then(|width| width.parse::<usize>().ok())
            .map_or(0, |width| width / COMMENT_INDENT_WIDTH);

        let user = row
            .select(&user_selector)
            .next()
            .map(|el| el.text().collect::<String>())
            .filter(|user| !user.is_empty());

        let time_ago = row
            .select(&age_selector)
            .next()
            .map(|el| {
                el.text()
                    .collect::<String>()
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default();

        let content = row
            .select(&content_selector)
            .next()
            .map(|el| sanitize::clean_text(&el.inner_html()))
            .unwrap_or_default();

        rows.push(FlatComment {
            id,
            level,
            user,
            time_ago,
            content,
        });
    }
    Ok(rows)
}
