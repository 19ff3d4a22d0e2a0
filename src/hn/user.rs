//! User profile model.

use serde::{Deserialize, Serialize};

use crate::{sanitize, time_ago};

/// Raw user record from the upstream API.
#[derive(Debug, Clone, Deserialize)]
pub struct RawUser {
    pub id: String,
    pub created: i64,
    pub karma: i64,
    pub about: Option<String>,
}

/// A user profile, normalized for responses.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: String,
    pub created_time: i64,
    pub created: String,
    pub karma: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
}

impl User {
    #[must_use]
    pub fn from_raw(raw: RawUser) -> Self {
        Self {
            created: time_ago::from_unix(raw.created),
            created_time: raw.created,
            id: raw.id,
            karma: raw.karma,
            about: raw.about.map(|about| sanitize::clean_text(&about)),
        }
    }
}
