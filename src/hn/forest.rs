//! Rebuilding a nested comment forest from a flat, level-tagged listing.

use crate::error::HnError;
use crate::hn::comment::{Comment, CommentNode};

/// One comment row lifted from a rendered listing, tagged with its depth.
///
/// Rows arrive in document order, which is the pre-order traversal of the
/// tree the page renders; `level` comes from the indentation cue next to
/// each row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatComment {
    pub id: u64,
    pub level: usize,
    pub user: Option<String>,
    pub time_ago: String,
    pub content: String,
}

impl From<FlatComment> for Comment {
    fn from(flat: FlatComment) -> Self {
        Self {
            id: flat.id,
            level: flat.level,
            user: flat.user,
            time: None,
            time_ago: flat.time_ago,
            content: flat.content,
            deleted: None,
            dead: None,
            comments: Vec::new(),
        }
    }
}

/// Rebuild the nested forest implied by a flat pre-order listing.
///
/// Each row attaches to the nearest preceding row with a strictly smaller
/// level; rows at level 0 become roots. Sibling order and the relative
/// order of subtrees follow the input order. A stack of open ancestors
/// makes the parent lookup cheap: by the time a row arrives, every deeper
/// or equal-level predecessor can no longer gain children and is popped.
///
/// # Errors
///
/// Returns [`HnError::MalformedUpstream`] when a row with a nonzero level
/// has no possible parent, which means the input was not a pre-order
/// traversal of any forest.
pub fn build_forest(flat: Vec<FlatComment>) -> Result<Vec<CommentNode>, HnError> {
    let mut roots: Vec<CommentNode> = Vec::new();
    let mut open: Vec<Comment> = Vec::new();

    for row in flat {
        let node = Comment::from(row);
        while open.last().is_some_and(|ancestor| ancestor.level >= node.level) {
            let Some(finished) = open.pop() else { break };
            attach(&mut open, &mut roots, finished);
        }
        if node.level > 0 && open.is_empty() {
            return Err(HnError::MalformedUpstream(format!(
                "comment {} at level {} has no preceding parent",
                node.id, node.level
            )));
        }
        open.push(node);
    }

    while let Some(finished) = open.pop() {
        attach(&mut open, &mut roots, finished);
    }

    Ok(roots)
}

/// Hand a finished subtree to its parent, or to the root list when no
/// ancestor remains open.
fn attach(open: &mut [Comment], roots: &mut Vec<CommentNode>, finished: Comment) {
    if let Some(parent) = open.last_mut() {
        parent.comments.push(CommentNode::Comment(finished));
    } else {
        roots.push(CommentNode::Comment(finished));
    }
}
