pub mod board;
pub mod comment;
pub mod task;
pub mod user;

use serde::{Deserialize, Deserializer};

pub use board::{
    Board, BoardChanges, BoardDetail, BoardInput, BoardSummary, BoardUpdateInput,
    BoardUpdateView, NewBoard,
};
pub use comment::{Comment, CommentInput, CommentView, NewComment};
pub use task::{
    NewTask, Task, TaskInput, TaskPatchView, TaskPriority, TaskStatus, TaskUpdateInput, TaskView,
};
pub use user::{Credentials, NewUser, User, UserSummary};

pub type UserId = i32;
pub type BoardId = i32;
pub type TaskId = i32;
pub type CommentId = i32;

/// Marks a field as present whenever its key appears, even with a `null` value.
/// Combine with `#[serde(default)]` so an absent key stays `None`.
pub(crate) fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}
