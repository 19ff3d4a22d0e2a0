//! Comment tree model.

use serde::Serialize;

/// A reply node in an item's comment forest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comment {
    pub id: u64,
    /// Depth below the item: direct replies are level 0.
    pub level: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
    pub time_ago: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dead: Option<bool>,
    pub comments: Vec<CommentNode>,
}

/// One slot in a comment forest.
///
/// A slot either holds a fetched comment or marks a node whose fetch kept
/// failing. Placeholders serialize as the empty object and keep their
/// position, so the surviving siblings never shift.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CommentNode {
    Comment(Comment),
    Placeholder {},
}

impl CommentNode {
    /// The fetched comment, if this slot holds one.
    #[must_use]
    pub fn as_comment(&self) -> Option<&Comment> {
        match self {
            Self::Comment(comment) => Some(comment),
            Self::Placeholder {} => None,
        }
    }

    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder {})
    }
}
