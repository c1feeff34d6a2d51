//! Persistence interface for users, boards, tasks and comments.
//!
//! Multi-row mutations (`update_board`, `delete_board`, `delete_task`) are
//! all-or-nothing. Cascades are issued explicitly by the implementations in a
//! fixed order: comments, then tasks, then memberships, then the board.

pub mod memory;
pub mod postgres;

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{
    Board, BoardChanges, BoardId, Comment, CommentId, Credentials, NewBoard, NewComment, NewTask,
    NewUser, Task, TaskId, User, UserId,
};

pub use memory::InMemoryStore;
pub use postgres::PgStore;

/// Handle shared with every request handler.
pub type SharedStore = Arc<dyn Store>;

#[async_trait]
pub trait Store: Send + Sync {
    async fn insert_user(&self, user: NewUser) -> AppResult<User>;

    async fn find_user(&self, id: UserId) -> AppResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;

    async fn find_credentials(&self, email: &str) -> AppResult<Option<Credentials>>;

    /// Users whose id is in `ids`, ascending by id. Unknown ids are skipped.
    async fn users_by_ids(&self, ids: &BTreeSet<UserId>) -> AppResult<Vec<User>>;

    /// Boards where `user_id` is owner or member, ascending by id.
    async fn boards_for_user(&self, user_id: UserId) -> AppResult<Vec<Board>>;

    async fn find_board(&self, id: BoardId) -> AppResult<Option<Board>>;

    async fn insert_board(&self, board: NewBoard) -> AppResult<Board>;

    /// Applies title and member replacement in one transaction.
    ///
    /// A member replacement that drops a user still assignee or reviewer on one
    /// of the board's tasks fails with `ValidationError` and changes nothing.
    async fn update_board(&self, id: BoardId, changes: BoardChanges) -> AppResult<Board>;

    /// Deletes the board with its memberships, tasks and their comments.
    async fn delete_board(&self, id: BoardId) -> AppResult<()>;

    /// Tasks on a board, ascending by id.
    async fn tasks_for_board(&self, board_id: BoardId) -> AppResult<Vec<Task>>;

    async fn find_task(&self, id: TaskId) -> AppResult<Option<Task>>;

    /// Fails with `ValidationError` unless assignee and reviewer are members of
    /// the board at the time of the write.
    async fn insert_task(&self, task: NewTask) -> AppResult<Task>;

    /// Persists the mutable fields of `task`. Board, creator and timestamps are never rewritten.
    /// Assignee and reviewer are checked against the board's members as in `insert_task`.
    async fn save_task(&self, task: &Task) -> AppResult<Task>;

    /// Deletes the task and its comments.
    async fn delete_task(&self, id: TaskId) -> AppResult<()>;

    /// Tasks assigned to `user_id`, descending by id.
    async fn tasks_assigned_to(&self, user_id: UserId) -> AppResult<Vec<Task>>;

    /// Tasks reviewed by `user_id`, descending by id.
    async fn tasks_reviewed_by(&self, user_id: UserId) -> AppResult<Vec<Task>>;

    /// Live comment count per task. Tasks without comments map to 0.
    async fn comment_counts(&self, task_ids: &[TaskId]) -> AppResult<HashMap<TaskId, i64>>;

    /// Comments on a task, oldest first (ties broken by id).
    async fn comments_for_task(&self, task_id: TaskId) -> AppResult<Vec<Comment>>;

    async fn find_comment(&self, id: CommentId) -> AppResult<Option<Comment>>;

    async fn insert_comment(&self, comment: NewComment) -> AppResult<Comment>;

    async fn delete_comment(&self, id: CommentId) -> AppResult<()>;
}
