use std::collections::BTreeSet;

use validator::Validate;

use super::{load_board, load_task, user_summaries};
use crate::error::{AppError, AppResult};
use crate::models::{
    Comment, CommentId, CommentInput, CommentView, NewComment, TaskId, UserId,
};
use crate::policy::{authorize_comment, authorize_task, ensure, CommentAction, TaskAction};
use crate::store::Store;

async fn render(store: &dyn Store, comments: Vec<Comment>) -> AppResult<Vec<CommentView>> {
    let authors: BTreeSet<UserId> = comments.iter().map(|comment| comment.author_id).collect();
    let users = user_summaries(store, authors).await?;
    Ok(comments
        .into_iter()
        .map(|comment| CommentView {
            id: comment.id,
            created_at: comment.created_at,
            author: users
                .get(&comment.author_id)
                .map(|user| user.fullname.clone())
                .unwrap_or_default(),
            content: comment.content,
        })
        .collect())
}

pub async fn list_comments(
    store: &dyn Store,
    actor: UserId,
    task_id: TaskId,
) -> AppResult<Vec<CommentView>> {
    let task = load_task(store, task_id).await?;
    let board = load_board(store, task.board_id).await?;
    ensure(
        authorize_task(actor, TaskAction::Read, &task, &board),
        format!("You are not a member of board {}", board.id),
    )?;
    let comments = store.comments_for_task(task_id).await?;
    render(store, comments).await
}

/// The task comes from the route and the author is always the actor.
pub async fn create_comment(
    store: &dyn Store,
    actor: UserId,
    task_id: TaskId,
    input: CommentInput,
) -> AppResult<CommentView> {
    let task = load_task(store, task_id).await?;
    let board = load_board(store, task.board_id).await?;
    ensure(
        authorize_task(actor, TaskAction::Write, &task, &board),
        format!("You are not a member of board {}", board.id),
    )?;
    input.validate()?;

    let comment = store
        .insert_comment(NewComment {
            task_id,
            author_id: actor,
            content: input.content,
        })
        .await?;
    log::debug!("user {} commented on task {}", actor, task_id);
    render(store, vec![comment])
        .await?
        .pop()
        .ok_or_else(|| AppError::InternalServerError("Comment view could not be rendered".into()))
}

/// Only the author may delete a comment; the board owner gets no exception.
pub async fn delete_comment(
    store: &dyn Store,
    actor: UserId,
    task_id: TaskId,
    comment_id: CommentId,
) -> AppResult<()> {
    let task = load_task(store, task_id).await?;
    let comment = store
        .find_comment(comment_id)
        .await?
        .filter(|comment| comment.task_id == task.id)
        .ok_or_else(|| AppError::not_found("Comment", comment_id))?;
    let board = load_board(store, task.board_id).await?;
    ensure(
        authorize_comment(actor, CommentAction::Delete, &comment, &board),
        "Only the author can delete this comment",
    )?;
    store.delete_comment(comment_id).await?;
    log::info!("user {} deleted comment {}", actor, comment_id);
    Ok(())
}
