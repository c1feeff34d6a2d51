use crate::{
    auth::AuthenticatedUserId,
    error::AppError,
    models::{TaskId, TaskInput, TaskUpdateInput},
    services::tasks,
    store::Store,
};
use actix_web::{delete, get, post, route, web, HttpResponse, Responder};

/// Listing every task is disabled; tasks are reached through a board or the per-user views.
///
/// ## Responses:
/// - `405 Method Not Allowed`: Always.
#[get("")]
pub async fn list_tasks(_actor: AuthenticatedUserId) -> Result<HttpResponse, AppError> {
    let tasks = tasks::list_all_tasks()?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Tasks assigned to the authenticated user, each with its comment count.
#[get("/assigned-to-me")]
pub async fn assigned_to_me(
    store: web::Data<dyn Store>,
    actor: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let tasks = tasks::assigned_to_me(&**store, actor.0).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Tasks the authenticated user reviews, each with its comment count.
#[get("/reviewing")]
pub async fn reviewing(
    store: web::Data<dyn Store>,
    actor: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let tasks = tasks::reviewing(&**store, actor.0).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a task on a board.
///
/// ## Request Body:
/// A JSON object matching `TaskInput`. `board` is required; `status` defaults
/// to `to-do` and `priority` to `medium`.
///
/// ## Responses:
/// - `201 Created`: The new task in full shape.
/// - `403 Forbidden`: The user is neither owner nor member of the board.
/// - `404 Not Found`: The board does not exist.
/// - `422 Unprocessable Entity`: Missing board, invalid title, or assignee/reviewer not a member.
#[post("")]
pub async fn create_task(
    store: web::Data<dyn Store>,
    actor: AuthenticatedUserId,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    let task = tasks::create_task(&**store, actor.0, task_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(task))
}

/// Retrieves a task by id.
///
/// ## Responses:
/// - `200 OK`: The task in full shape.
/// - `403 Forbidden`: The user is neither owner nor member of the task's board.
/// - `404 Not Found`: No task with this id.
#[get("/{id}")]
pub async fn get_task(
    store: web::Data<dyn Store>,
    actor: AuthenticatedUserId,
    task_id: web::Path<TaskId>,
) -> Result<impl Responder, AppError> {
    let task = tasks::get_task(&**store, actor.0, task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Partially updates a task.
///
/// ## Responses:
/// - `200 OK`: The task without `board` and `comments_count`.
/// - `403 Forbidden`: The user is neither owner nor member of the task's board.
/// - `404 Not Found`: No task with this id.
/// - `422 Unprocessable Entity`: The payload contains `board`, or assignee/reviewer is not a member.
#[route("/{id}", method = "PATCH", method = "PUT")]
pub async fn update_task(
    store: web::Data<dyn Store>,
    actor: AuthenticatedUserId,
    task_id: web::Path<TaskId>,
    task_data: web::Json<TaskUpdateInput>,
) -> Result<impl Responder, AppError> {
    let task = tasks::update_task(
        &**store,
        actor.0,
        task_id.into_inner(),
        task_data.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task and its comments.
///
/// ## Responses:
/// - `204 No Content`: On successful deletion.
/// - `403 Forbidden`: The user is neither the board owner nor the task creator.
/// - `404 Not Found`: No task with this id.
#[delete("/{id}")]
pub async fn delete_task(
    store: web::Data<dyn Store>,
    actor: AuthenticatedUserId,
    task_id: web::Path<TaskId>,
) -> Result<impl Responder, AppError> {
    tasks::delete_task(&**store, actor.0, task_id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
