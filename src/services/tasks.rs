use validator::Validate;

use super::{load_board, load_task, task_view, task_views};
use crate::error::{AppError, AppResult};
use crate::membership::check_task_links;
use crate::models::{
    NewTask, TaskId, TaskInput, TaskPatchView, TaskUpdateInput, TaskView, UserId,
};
use crate::policy::{authorize_task, can_create_task, ensure, TaskAction};
use crate::store::Store;

/// Tasks are only reachable through a board or the per-user views.
pub fn list_all_tasks() -> AppResult<Vec<TaskView>> {
    Err(AppError::MethodNotAllowed(
        "Listing all Tasks is not allowed".into(),
    ))
}

pub async fn create_task(store: &dyn Store, actor: UserId, input: TaskInput) -> AppResult<TaskView> {
    let board_id = input
        .board
        .ok_or_else(|| AppError::ValidationError("board is required".into()))?;

    let board = load_board(store, board_id).await?;
    ensure(
        can_create_task(actor, &board),
        format!("You are not a member of board {}", board_id),
    )?;
    input.validate()?;
    check_task_links(&board, input.assignee_id, input.reviewer_id)?;

    let task = store
        .insert_task(NewTask {
            board_id,
            title: input.title,
            description: input.description,
            status: input.status,
            priority: input.priority,
            assignee_id: input.assignee_id,
            reviewer_id: input.reviewer_id,
            due_date: input.due_date,
            created_by: actor,
        })
        .await?;
    log::info!("user {} created task {} on board {}", actor, task.id, board_id);
    task_view(store, task).await
}

pub async fn get_task(store: &dyn Store, actor: UserId, id: TaskId) -> AppResult<TaskView> {
    let task = load_task(store, id).await?;
    let board = load_board(store, task.board_id).await?;
    ensure(
        authorize_task(actor, TaskAction::Read, &task, &board),
        format!("You are not a member of board {}", board.id),
    )?;
    task_view(store, task).await
}

/// Partial update. The board of a task can never change, so any `board`
/// key in the payload is rejected, even one naming the current board.
pub async fn update_task(
    store: &dyn Store,
    actor: UserId,
    id: TaskId,
    input: TaskUpdateInput,
) -> AppResult<TaskPatchView> {
    let mut task = load_task(store, id).await?;
    let board = load_board(store, task.board_id).await?;
    ensure(
        authorize_task(actor, TaskAction::Write, &task, &board),
        format!("You are not a member of board {}", board.id),
    )?;

    if input.board.is_some() {
        return Err(AppError::ValidationError(
            "Changing the board of a task is not allowed".into(),
        ));
    }
    input.validate()?;

    input.apply_to(&mut task);
    check_task_links(&board, task.assignee_id, task.reviewer_id)?;

    let saved = store.save_task(&task).await?;
    log::debug!("user {} updated task {}", actor, id);
    Ok(task_view(store, saved).await?.into())
}

/// Allowed for the board owner and for the task's creator.
pub async fn delete_task(store: &dyn Store, actor: UserId, id: TaskId) -> AppResult<()> {
    let task = load_task(store, id).await?;
    let board = load_board(store, task.board_id).await?;
    ensure(
        authorize_task(actor, TaskAction::Delete, &task, &board),
        "Only the board owner or the task creator can delete this task",
    )?;
    store.delete_task(id).await?;
    log::info!("user {} deleted task {}", actor, id);
    Ok(())
}

pub async fn assigned_to_me(store: &dyn Store, actor: UserId) -> AppResult<Vec<TaskView>> {
    let tasks = store.tasks_assigned_to(actor).await?;
    task_views(store, tasks).await
}

pub async fn reviewing(store: &dyn Store, actor: UserId) -> AppResult<Vec<TaskView>> {
    let tasks = store.tasks_reviewed_by(actor).await?;
    task_views(store, tasks).await
}
