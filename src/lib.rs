//! Unofficial Hacker News JSON API library.
//!
//! A service that serves Hacker News stories, comment trees and user
//! profiles as JSON, pulling from the official item API where one exists
//! and scraping the rendered site where none does. All upstream traffic
//! funnels through a shared rate-limited fetch queue.

// Allow raw string hashes for safety - they're harmless and prevent issues if content changes
#![allow(clippy::needless_raw_string_hashes)]

pub mod config;
pub mod constants;
pub mod error;
pub mod hn;
pub mod queue;
pub mod sanitize;
pub mod scrape;
pub mod time_ago;
pub mod web;
