//! Request-level operations.
//!
//! Each operation resolves the entities it touches fresh from the store,
//! authorizes the actor against them, validates the payload and only then
//! mutates. Nothing is cached between calls.

pub mod boards;
pub mod comments;
pub mod tasks;
pub mod users;

use std::collections::{BTreeSet, HashMap};

use crate::error::{AppError, AppResult};
use crate::models::{
    Board, BoardId, Task, TaskId, TaskView, User, UserId, UserSummary,
};
use crate::store::Store;

pub(crate) async fn load_board(store: &dyn Store, id: BoardId) -> AppResult<Board> {
    store
        .find_board(id)
        .await?
        .ok_or_else(|| AppError::not_found("Board", id))
}

pub(crate) async fn load_task(store: &dyn Store, id: TaskId) -> AppResult<Task> {
    store
        .find_task(id)
        .await?
        .ok_or_else(|| AppError::not_found("Task", id))
}

/// Looks up users by id and indexes their summaries.
pub(crate) async fn user_summaries(
    store: &dyn Store,
    ids: BTreeSet<UserId>,
) -> AppResult<HashMap<UserId, UserSummary>> {
    let users: Vec<User> = store.users_by_ids(&ids).await?;
    Ok(users
        .iter()
        .map(|user| (user.id, UserSummary::from(user)))
        .collect())
}

/// Renders tasks in their full shape with assignee/reviewer details and live comment counts.
pub(crate) async fn task_views(store: &dyn Store, tasks: Vec<Task>) -> AppResult<Vec<TaskView>> {
    let task_ids: Vec<TaskId> = tasks.iter().map(|task| task.id).collect();
    let counts = store.comment_counts(&task_ids).await?;
    let linked: BTreeSet<UserId> = tasks
        .iter()
        .flat_map(|task| [task.assignee_id, task.reviewer_id])
        .flatten()
        .collect();
    let users = user_summaries(store, linked).await?;

    Ok(tasks
        .into_iter()
        .map(|task| TaskView {
            id: task.id,
            board: task.board_id,
            assignee: task.assignee_id.and_then(|id| users.get(&id).cloned()),
            reviewer: task.reviewer_id.and_then(|id| users.get(&id).cloned()),
            comments_count: counts.get(&task.id).copied().unwrap_or(0),
            title: task.title,
            description: task.description,
            status: task.status,
            priority: task.priority,
            due_date: task.due_date,
        })
        .collect())
}

pub(crate) async fn task_view(store: &dyn Store, task: Task) -> AppResult<TaskView> {
    task_views(store, vec![task])
        .await?
        .pop()
        .ok_or_else(|| AppError::InternalServerError("Task view could not be rendered".into()))
}
