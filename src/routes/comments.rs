use crate::{
    auth::AuthenticatedUserId,
    error::AppError,
    models::{CommentId, CommentInput, TaskId},
    services::comments,
    store::Store,
};
use actix_web::{delete, get, post, web, HttpResponse, Responder};

/// Lists the comments of a task, oldest first.
///
/// ## Responses:
/// - `200 OK`: JSON array of comments.
/// - `403 Forbidden`: The user is neither owner nor member of the task's board.
/// - `404 Not Found`: No task with this id.
#[get("/{task_id}/comments")]
pub async fn list_comments(
    store: web::Data<dyn Store>,
    actor: AuthenticatedUserId,
    task_id: web::Path<TaskId>,
) -> Result<impl Responder, AppError> {
    let comments = comments::list_comments(&**store, actor.0, task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(comments))
}

/// Adds a comment authored by the authenticated user.
///
/// ## Responses:
/// - `201 Created`: The new comment.
/// - `403 Forbidden`: The user is neither owner nor member of the task's board.
/// - `404 Not Found`: No task with this id.
/// - `422 Unprocessable Entity`: Empty content.
#[post("/{task_id}/comments")]
pub async fn create_comment(
    store: web::Data<dyn Store>,
    actor: AuthenticatedUserId,
    task_id: web::Path<TaskId>,
    comment_data: web::Json<CommentInput>,
) -> Result<impl Responder, AppError> {
    let comment = comments::create_comment(
        &**store,
        actor.0,
        task_id.into_inner(),
        comment_data.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Created().json(comment))
}

/// Deletes a comment. Only its author may do so.
///
/// ## Responses:
/// - `204 No Content`: On successful deletion.
/// - `403 Forbidden`: The user did not write the comment.
/// - `404 Not Found`: No such task, or the comment does not belong to it.
#[delete("/{task_id}/comments/{comment_id}")]
pub async fn delete_comment(
    store: web::Data<dyn Store>,
    actor: AuthenticatedUserId,
    path: web::Path<(TaskId, CommentId)>,
) -> Result<impl Responder, AppError> {
    let (task_id, comment_id) = path.into_inner();
    comments::delete_comment(&**store, actor.0, task_id, comment_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
