//! Shared constants used across the application.

/// Base URL of the official Hacker News item API.
pub const API_BASE_URL: &str = "https://hacker-news.firebaseio.com/v0";

/// Base URL of the rendered Hacker News site, used for listings that have
/// no API equivalent.
pub const SITE_BASE_URL: &str = "https://news.ycombinator.com";

/// Number of stories per listing page.
pub const PAGE_LIMIT: usize = 30;

/// Pixel width of one indentation step in the site's rendered comment rows.
pub const COMMENT_INDENT_WIDTH: usize = 40;

/// Total fetch attempts for a directly requested item.
pub const ITEM_ATTEMPTS: u32 = 3;

/// Total fetch attempts for a comment reached during tree expansion.
pub const COMMENT_ATTEMPTS: u32 = 2;

/// User agent sent with every outbound request.
pub const USER_AGENT: &str = concat!("hn-api/", env!("CARGO_PKG_VERSION"));
