//! Hacker News acquisition engine.
//!
//! [`HnClient`] owns the shared [`FetchQueue`] and layers the retry,
//! normalization and tree-expansion policies on top of it. Items, listings
//! and user profiles come from the official item API; listing variants the
//! API does not expose are scraped from the rendered site.

pub mod comment;
pub mod forest;
pub mod item;
pub mod user;

use std::sync::Arc;

use futures_util::future::{join_all, BoxFuture};
use futures_util::FutureExt;
use tracing::{debug, warn};

use crate::config::Config;
use crate::constants::{COMMENT_ATTEMPTS, ITEM_ATTEMPTS, PAGE_LIMIT};
use crate::error::HnError;
use crate::queue::FetchQueue;
use crate::sanitize;
use crate::scrape::{self, ScrapedStory};
use crate::time_ago;

pub use comment::{Comment, CommentNode};
pub use forest::{build_forest, FlatComment};
pub use item::{Item, ItemKind, RawItem};
pub use user::{RawUser, User};

/// Client for the upstream item API and the rendered site.
///
/// Cloning is cheap; clones share one fetch queue and therefore one set of
/// rate limits.
#[derive(Debug, Clone)]
pub struct HnClient {
    queue: Arc<FetchQueue>,
    api_base: String,
    site_base: String,
}

impl HnClient {
    /// Build a client and its fetch queue from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self, HnError> {
        Ok(Self {
            queue: Arc::new(FetchQueue::new(config)?),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            site_base: config.site_base.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch one item without expanding its comment tree.
    ///
    /// # Errors
    ///
    /// Returns [`HnError::ItemNotFound`] when every attempt failed or
    /// upstream has no record for the id.
    pub async fn fetch_item(&self, id: u64) -> Result<Item, HnError> {
        let raw = self.fetch_raw_item(id, ITEM_ATTEMPTS).await?;
        Ok(Item::from_raw(raw))
    }

    /// Fetch one item and expand its full comment forest.
    ///
    /// The `comments` field mirrors the upstream record: absent when the
    /// record carries no kid list, an empty forest when the list is empty.
    ///
    /// # Errors
    ///
    /// Returns [`HnError::ItemNotFound`] when the item itself cannot be
    /// fetched; failures below the item degrade to placeholders instead.
    pub async fn fetch_full_item(&self, id: u64) -> Result<Item, HnError> {
        let raw = self.fetch_raw_item(id, ITEM_ATTEMPTS).await?;
        let kids = raw.kids.clone();
        let mut item = Item::from_raw(raw);
        if let Some(ids) = kids {
            item.comments = Some(self.expand_comments(&ids, 0).await);
        }
        Ok(item)
    }

    /// Expand a list of comment ids into a forest, assigning `level` to its
    /// roots.
    ///
    /// Siblings fetch concurrently through the shared queue but always come
    /// back in the order their ids were given. A node whose fetch keeps
    /// failing becomes a placeholder in its slot; its subtree is lost, the
    /// rest of the forest is not.
    pub fn expand_comments<'a>(
        &'a self,
        ids: &'a [u64],
        level: usize,
    ) -> BoxFuture<'a, Vec<CommentNode>> {
        async move { join_all(ids.iter().map(|&id| self.fetch_comment(id, level))).await }.boxed()
    }

    /// Fetch one comment and recurse into its replies.
    async fn fetch_comment(&self, id: u64, level: usize) -> CommentNode {
        let raw = match self.fetch_raw_item(id, COMMENT_ATTEMPTS).await {
            Ok(raw) => raw,
            Err(error) => {
                warn!(id, %error, "comment fetch failed, leaving a placeholder in its slot");
                return CommentNode::Placeholder {};
            }
        };

        let content = if raw.deleted.unwrap_or(false) {
            "[deleted]".to_string()
        } else {
            raw.text.as_deref().map(sanitize::clean_text).unwrap_or_default()
        };
        let comments = match raw.kids.as_deref() {
            Some(kids) => self.expand_comments(kids, level + 1).await,
            None => Vec::new(),
        };

        let time = raw.time.unwrap_or_default();
        CommentNode::Comment(Comment {
            id: raw.id,
            level,
            user: raw.by,
            time: Some(time),
            time_ago: time_ago::from_unix(time),
            content,
            deleted: raw.deleted,
            dead: raw.dead,
            comments,
        })
    }

    /// Fetch one page of a category listing ("topstories", "newstories",
    /// ...), expanding each id into a normalized item.
    ///
    /// The id query always pulls from the start of the category, so later
    /// pages refetch the whole prefix and slice off their own window. Ids
    /// that fail to expand are dropped from the page rather than failing it.
    ///
    /// # Errors
    ///
    /// Returns an error when the id listing itself cannot be fetched.
    pub async fn list_stories(&self, category: &str, page: usize) -> Result<Vec<Item>, HnError> {
        let page = page.max(1);
        // The page number comes straight from the query string; saturate
        // instead of overflowing on absurd values.
        let wanted = PAGE_LIMIT.saturating_mul(page);
        let url = format!(
            "{}/{category}.json?orderBy=%22%24key%22&limitToFirst={wanted}",
            self.api_base
        );
        let ids: Vec<u64> = self.queue.fetch_json(&url).await?;

        let selected: Vec<u64> = ids
            .into_iter()
            .skip(PAGE_LIMIT.saturating_mul(page - 1))
            .take(PAGE_LIMIT)
            .collect();
        let fetched = join_all(selected.iter().map(|&id| self.fetch_item(id))).await;

        let mut items = Vec::with_capacity(selected.len());
        for (id, result) in selected.into_iter().zip(fetched) {
            match result {
                Ok(item) => items.push(item),
                Err(error) => debug!(id, %error, "dropping listing entry that failed to fetch"),
            }
        }
        Ok(items)
    }

    /// Fetch a user profile.
    ///
    /// # Errors
    ///
    /// Returns [`HnError::UserNotFound`] when upstream has no record.
    pub async fn fetch_user(&self, id: &str) -> Result<User, HnError> {
        let url = format!("{}/user/{id}.json", self.api_base);
        let raw: Option<RawUser> = self.queue.fetch_json(&url).await?;
        raw.map(User::from_raw)
            .ok_or_else(|| HnError::UserNotFound(id.to_string()))
    }

    /// Scrape one of the rendered listing pages that the API does not
    /// expose ("shownew", "active", "noobstories").
    ///
    /// # Errors
    ///
    /// Returns an error when the page cannot be fetched or is not HTML.
    pub async fn front_page(
        &self,
        page_path: &str,
        client_ip: Option<&str>,
    ) -> Result<Vec<ScrapedStory>, HnError> {
        let url = format!("{}/{page_path}", self.site_base);
        let body = self.queue.fetch_page(&url, client_ip).await?;
        scrape::parse_story_rows(&body)
    }

    /// Scrape the new-comments feed and rebuild its forest.
    ///
    /// # Errors
    ///
    /// Returns an error when the page cannot be fetched, is not HTML, or
    /// its rows do not form a valid pre-order listing.
    pub async fn new_comments(&self, client_ip: Option<&str>) -> Result<Vec<CommentNode>, HnError> {
        let url = format!("{}/newcomments", self.site_base);
        let body = self.queue.fetch_page(&url, client_ip).await?;
        let rows = scrape::parse_comment_rows(&body)?;
        build_forest(rows)
    }

    /// Fetch the raw record for an id, retrying up to `attempts` times.
    /// A `null` body counts as a failed attempt; upstream serves it both
    /// for ids that do not exist and transiently for ones that do.
    async fn fetch_raw_item(&self, id: u64, attempts: u32) -> Result<RawItem, HnError> {
        let url = format!("{}/item/{id}.json", self.api_base);
        for attempt in 1..=attempts {
            match self.queue.fetch_json::<Option<RawItem>>(&url).await {
                Ok(Some(raw)) => return Ok(raw),
                Ok(None) => debug!(id, attempt, "upstream returned null for item"),
                Err(error) => debug!(id, attempt, %error, "item fetch attempt failed"),
            }
        }
        Err(HnError::ItemNotFound(id))
    }
}
