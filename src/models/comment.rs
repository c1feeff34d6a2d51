use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::{CommentId, TaskId, UserId};

/// An author-owned note on a task. Content is stored untruncated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: CommentId,
    pub task_id: TaskId,
    pub author_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub task_id: TaskId,
    pub author_id: UserId,
    pub content: String,
}

/// Payload for creating a comment. The task comes from the route, the author from the token.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CommentInput {
    #[validate(length(min = 1))]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentView {
    pub id: CommentId,
    pub created_at: DateTime<Utc>,
    /// The author's full name.
    pub author: String,
    pub content: String,
}
