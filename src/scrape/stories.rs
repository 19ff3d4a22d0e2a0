//! Scraping story rows out of rendered listing pages.

use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

use crate::error::HnError;
use crate::hn::item::ItemKind;

use super::{ensure_html, first_number, leading_number};

/// One story row lifted from a rendered listing page.
///
/// Rendered rows carry no Unix timestamp, so `time_ago` is the page's own
/// phrasing and there is no `time` field. Jobs rows have neither submitter
/// nor score.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapedStory {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    pub points: Option<u64>,
    pub user: Option<String>,
    pub time_ago: String,
    pub comments_count: u64,
    #[serde(rename = "type")]
    pub kind: ItemKind,
}

/// Parse the story rows of a rendered listing page, in page order.
///
/// Every story row is a `tr.athing` whose metadata (score, submitter, age,
/// comment count) lives in the row that immediately follows it. Rows
/// without that metadata row are skipped.
///
/// # Errors
///
/// Returns [`HnError::MalformedUpstream`] when the body is not HTML.
pub fn parse_story_rows(body: &str) -> Result<Vec<ScrapedStory>, HnError> {
    ensure_html(body)?;
    let document = Html::parse_document(body);

    let row_selector = Selector::parse("tr.athing").expect("Invalid selector");
    let title_link_selector = Selector::parse("td.title a").expect("Invalid selector");
    let vote_link_selector = Selector::parse("a[id^=up]").expect("Invalid selector");
    let subtext_selector = Selector::parse("td.subtext").expect("Invalid selector");
    let domain_selector = Selector::parse("span.sitestr").expect("Invalid selector");
    let score_selector = Selector::parse("span.score").expect("Invalid selector");
    let user_selector = Selector::parse("a.hnuser").expect("Invalid selector");
    let age_selector = Selector::parse("span.age").expect("Invalid selector");
    let item_link_selector = Selector::parse("a[href^=item]").expect("Invalid selector");

    let mut stories = Vec::new();
    for row in document.select(&row_selector) {
        let Some(subtext) = next_sibling_element(row)
            .and_then(|sibling| sibling.select(&subtext_selector).next())
        else {
            continue;
        };

        let title_link = row.select(&title_link_selector).next();
        let title = title_link.map(element_text).unwrap_or_default();
        let url = title_link
            .and_then(|a| a.value().attr("href"))
            .map(str::to_string);
        let domain = row.select(&domain_selector).next().map(element_text);

        let mut id = row
            .value()
            .attr("id")
            .and_then(|raw| raw.parse().ok())
            .or_else(|| {
                row.select(&vote_link_selector)
                    .next()
                    .and_then(|a| a.value().attr("id"))
                    .and_then(first_number)
            });

        let points = subtext
            .select(&score_selector)
            .next()
            .and_then(|score| leading_number(&element_text(score)));
        let user = subtext.select(&user_selector).next().map(element_text);
        let mut time_ago = subtext
            .select(&age_selector)
            .next()
            .map(element_text)
            .unwrap_or_default();

        // The first item link in the subtext is the age permalink; the
        // second is the comments link, whose text is "discuss" until the
        // first comment arrives.
        let comments_count = subtext
            .select(&item_link_selector)
            .nth(1)
            .and_then(|link| leading_number(&element_text(link)))
            .unwrap_or(0);

        let mut kind = if url
            .as_deref()
            .is_some_and(|u| u.get(..4).is_some_and(|p| p.eq_ignore_ascii_case("item")))
        {
            ItemKind::Ask
        } else {
            ItemKind::Link
        };
        if user.is_none() {
            // Job postings render without submitter, score or comment link;
            // their whole subtext is the age.
            kind = ItemKind::Job;
            if id.is_none() {
                id = url.as_deref().and_then(first_number);
            }
            time_ago = element_text(subtext);
        }

        stories.push(ScrapedStory {
            id,
            title,
            url,
            domain,
            points,
            user,
            time_ago,
            comments_count,
            kind,
        });
    }
    Ok(stories)
}

/// The next sibling that is an element, skipping whitespace text nodes.
fn next_sibling_element(row: ElementRef) -> Option<ElementRef> {
    row.next_siblings().find_map(ElementRef::wrap)
}

/// Collapsed text content of an element.
fn element_text(element: ElementRef) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING_PAGE: &str = r##"<html><body><table>
        <tr class="athing" id="101">
            <td class="title"><span class="rank">1.</span></td>
            <td class="votelinks"><a id="up_101" href="vote?id=101"><div class="votearrow"></div></a></td>
            <td class="title"><span class="titleline"><a href="https://www.example.com/story">Big news</a>
                <span class="sitebit comhead"> (<span class="sitestr">example.com</span>)</span></span></td>
        </tr>
        <tr><td colspan="2"></td><td class="subtext">
            <span class="score" id="score_101">142 points</span> by
            <a href="user?id=alice" class="hnuser">alice</a>
            <span class="age" title="2024-01-01T00:00:00"><a href="item?id=101">3 hours ago</a></span> |
            <a href="item?id=101">57&nbsp;comments</a>
        </td></tr>
        <tr class="athing" id="102">
            <td class="title"><span class="rank">2.</span></td>
            <td class="votelinks"><a id="up_102" href="vote?id=102"><div class="votearrow"></div></a></td>
            <td class="title"><span class="titleline"><a href="item?id=102">Ask HN: Favorite paper?</a></span></td>
        </tr>
        <tr><td colspan="2"></td><td class="subtext">
            <span class="score" id="score_102">12 points</span> by
            <a href="user?id=bob" class="hnuser">bob</a>
            <span class="age"><a href="item?id=102">1 hour ago</a></span> |
            <a href="item?id=102">discuss</a>
        </td></tr>
        <tr class="athing" id="103">
            <td class="title"><span class="rank">3.</span></td>
            <td class="votelinks"></td>
            <td class="title"><span class="titleline"><a href="item?id=103">Acme is hiring</a></span></td>
        </tr>
        <tr><td colspan="2"></td><td class="subtext">
            <span class="age"><a href="item?id=103">5 hours ago</a></span>
        </td></tr>
    </table></body></html>"##;

    #[test]
    fn test_story_row_fields() {
        let stories = parse_story_rows(LISTING_PAGE).unwrap();
        assert_eq!(stories.len(), 3);

        let story = &stories[0];
        assert_eq!(story.id, Some(101));
        assert_eq!(story.title, "Big news");
        assert_eq!(story.url.as_deref(), Some("https://www.example.com/story"));
        assert_eq!(story.domain.as_deref(), Some("example.com"));
        assert_eq!(story.points, Some(142));
        assert_eq!(story.user.as_deref(), Some("alice"));
        assert_eq!(story.time_ago, "3 hours ago");
        assert_eq!(story.comments_count, 57);
        assert_eq!(story.kind, ItemKind::Link);
    }

    #[test]
    fn test_self_referential_row_is_ask_and_discuss_means_zero() {
        let stories = parse_story_rows(LISTING_PAGE).unwrap();
        let ask = &stories[1];
        assert_eq!(ask.kind, ItemKind::Ask);
        assert_eq!(ask.comments_count, 0);
        assert_eq!(ask.points, Some(12));
    }

    #[test]
    fn test_job_row_has_no_user_or_points() {
        let stories = parse_story_rows(LISTING_PAGE).unwrap();
        let job = &stories[2];
        assert_eq!(job.kind, ItemKind::Job);
        assert_eq!(job.id, Some(103));
        assert_eq!(job.user, None);
        assert_eq!(job.points, None);
        assert_eq!(job.time_ago, "5 hours ago");
    }

    #[test]
    fn test_id_falls_back_to_url_digits() {
        let page = r#"<html><body><table>
            <tr class="athing">
                <td class="title"><span class="titleline"><a href="item?id=777">Acme is hiring engineers</a></span></td>
            </tr>
            <tr><td class="subtext"><span class="age">2 days ago</span></td></tr>
        </table></body></html>"#;
        let stories = parse_story_rows(page).unwrap();
        assert_eq!(stories[0].id, Some(777));
        assert_eq!(stories[0].kind, ItemKind::Job);
    }

    #[test]
    fn test_rows_without_subtext_are_skipped() {
        let page = r#"<html><body><table>
            <tr class="athing" id="5"><td class="title"><a href="x">Orphan</a></td></tr>
        </table></body></html>"#;
        assert!(parse_story_rows(page).unwrap().is_empty());
    }

    #[test]
    fn test_non_html_body_is_rejected() {
        assert!(matches!(
            parse_story_rows("Sorry."),
            Err(HnError::MalformedUpstream(_))
        ));
    }
}
