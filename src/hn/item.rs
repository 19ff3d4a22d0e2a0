//! Item model and normalization of raw upstream records.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::hn::comment::CommentNode;
use crate::time_ago;

/// Raw item record as the upstream API returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawItem {
    pub id: u64,
    pub title: Option<String>,
    pub url: Option<String>,
    pub score: Option<u64>,
    pub descendants: Option<u64>,
    pub by: Option<String>,
    pub time: Option<i64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub deleted: Option<bool>,
    pub dead: Option<bool>,
    pub text: Option<String>,
    pub kids: Option<Vec<u64>>,
}

/// Classification tag of a public item.
///
/// Upstream "story" becomes `Link` unless the item is a self-referential
/// ask post; every other upstream type passes through unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKind {
    Link,
    Ask,
    Job,
    Other(String),
}

impl ItemKind {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Link => "link",
            Self::Ask => "ask",
            Self::Job => "job",
            Self::Other(tag) => tag,
        }
    }
}

impl Serialize for ItemKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A top-level submission, normalized for responses.
///
/// `points` and `user` always serialize, as explicit `null` when absent;
/// `title`, `domain` and `comments` are omitted entirely when absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub points: Option<u64>,
    pub user: Option<String>,
    pub time: i64,
    pub time_ago: String,
    pub comments_count: u64,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<CommentNode>>,
}

impl Item {
    /// Normalize a raw upstream record into the public item shape.
    ///
    /// Titles are entity-decoded. Items without a URL get the site-relative
    /// `item?id=<id>` permalink and no domain. Job postings drop their
    /// submitter and score. A story that points back at the site and whose
    /// title starts with "ask" is reclassified as an ask post.
    #[must_use]
    pub fn from_raw(raw: RawItem) -> Self {
        let title = raw
            .title
            .map(|t| html_escape::decode_html_entities(&t).into_owned());

        let (url, domain) = match raw.url {
            Some(url) if !url.is_empty() => {
                let domain = derive_domain(&url);
                (url, domain)
            }
            _ => (format!("item?id={}", raw.id), None),
        };

        let is_story = matches!(raw.kind.as_deref(), Some("story"));
        let mut kind = match raw.kind.as_deref() {
            Some("job") => ItemKind::Job,
            Some("story") | None => ItemKind::Link,
            Some(other) => ItemKind::Other(other.to_string()),
        };
        let self_referential = url
            .get(..4)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("item"));
        let ask_title = title
            .as_deref()
            .is_some_and(|t| t.get(..3).is_some_and(|prefix| prefix.eq_ignore_ascii_case("ask")));
        if is_story && self_referential && ask_title {
            kind = ItemKind::Ask;
        }

        let (user, points) = if kind == ItemKind::Job {
            (None, None)
        } else {
            (raw.by, raw.score)
        };

        let time = raw.time.unwrap_or_default();
        Self {
            id: raw.id,
            title,
            points,
            user,
            time,
            time_ago: time_ago::from_unix(time),
            comments_count: raw.descendants.unwrap_or(0),
            kind,
            url,
            domain,
            comments: None,
        }
    }
}

/// Host of `url` with any leading `www.` stripped, or `None` when the URL
/// does not parse.
fn derive_domain(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    let stripped = host
        .get(..4)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("www."));
    if stripped {
        Some(host[4..].to_string())
    } else {
        Some(host.to_string())
    }
}
