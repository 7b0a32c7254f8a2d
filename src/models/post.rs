use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single like. Each user appears at most once in a post's like list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    pub user: Uuid,
}

/// A comment on a post, newest first in the post's comment list.
///
/// `name` and `avatar` are snapshots of the author at comment time; they are
/// not refreshed if the author later changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub user: Uuid,
    pub text: String,
    pub name: String,
    pub avatar: String,
    pub date: DateTime<Utc>,
}

/// A post document with its embedded likes and comments.
///
/// `name` and `avatar` are author snapshots taken at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub user: Uuid,
    pub name: String,
    pub avatar: String,
    pub text: String,
    pub likes: Vec<Like>,
    pub comments: Vec<Comment>,
    pub date: DateTime<Utc>,
}

impl Post {
    pub fn new(
        user: Uuid,
        name: impl Into<String>,
        avatar: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user,
            name: name.into(),
            avatar: avatar.into(),
            text: text.into(),
            likes: Vec::new(),
            comments: Vec::new(),
            date: Utc::now(),
        }
    }

    /// Adds a like for `user` unless one already exists.
    ///
    /// Returns `true` if the like list changed.
    pub fn like(&mut self, user: Uuid) -> bool {
        if self.likes.iter().any(|l| l.user == user) {
            return false;
        }
        self.likes.insert(0, Like { user });
        true
    }

    /// Removes the like belonging to `user`, if any.
    ///
    /// Returns `true` if the like list changed. Unliking a post that was
    /// never liked is a no-op, not an error.
    pub fn unlike(&mut self, user: Uuid) -> bool {
        let before = self.likes.len();
        self.likes.retain(|l| l.user != user);
        self.likes.len() != before
    }

    /// Prepends a comment (newest first) and returns its id.
    pub fn add_comment(
        &mut self,
        user: Uuid,
        name: impl Into<String>,
        avatar: impl Into<String>,
        text: impl Into<String>,
    ) -> Uuid {
        let comment = Comment {
            id: Uuid::new_v4(),
            user,
            text: text.into(),
            name: name.into(),
            avatar: avatar.into(),
            date: Utc::now(),
        };
        let id = comment.id;
        self.comments.insert(0, comment);
        id
    }

    /// Looks up a comment by its id.
    pub fn comment(&self, comment_id: Uuid) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == comment_id)
    }

    /// Removes a comment by its id, preserving the order of the rest.
    ///
    /// Returns `true` if the comment list changed.
    pub fn remove_comment(&mut self, comment_id: Uuid) -> bool {
        let before = self.comments.len();
        self.comments.retain(|c| c.id != comment_id);
        self.comments.len() != before
    }
}
