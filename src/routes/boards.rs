use crate::{
    auth::AuthenticatedUserId,
    error::AppError,
    models::{BoardId, BoardInput, BoardUpdateInput},
    services::boards,
    store::Store,
};
use actix_web::{delete, get, post, route, web, HttpResponse, Responder};

/// Lists the boards the authenticated user owns or is a member of.
///
/// ## Responses:
/// - `200 OK`: JSON array of board summaries, ascending by id.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
#[get("")]
pub async fn list_boards(
    store: web::Data<dyn Store>,
    actor: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let summaries = boards::list_boards(&**store, actor.0).await?;
    Ok(HttpResponse::Ok().json(summaries))
}

/// Creates a board owned by the authenticated user.
///
/// ## Request Body:
/// - `title`: 1 to 255 characters.
/// - `members`: user ids; the creator is always added.
///
/// ## Responses:
/// - `201 Created`: The board summary.
/// - `422 Unprocessable Entity`: A member id does not exist, or the title is invalid.
#[post("")]
pub async fn create_board(
    store: web::Data<dyn Store>,
    actor: AuthenticatedUserId,
    board_data: web::Json<BoardInput>,
) -> Result<impl Responder, AppError> {
    let summary = boards::create_board(&**store, actor.0, board_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(summary))
}

/// Returns a board with its members and tasks.
///
/// ## Responses:
/// - `200 OK`: The board detail.
/// - `403 Forbidden`: The user is neither owner nor member.
/// - `404 Not Found`: No board with this id.
#[get("/{id}")]
pub async fn get_board(
    store: web::Data<dyn Store>,
    actor: AuthenticatedUserId,
    board_id: web::Path<BoardId>,
) -> Result<impl Responder, AppError> {
    let detail = boards::get_board(&**store, actor.0, board_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// Updates the title and/or the complete member list of a board.
///
/// ## Responses:
/// - `200 OK`: The updated board with owner and member details.
/// - `403 Forbidden`: The user is neither owner nor member.
/// - `404 Not Found`: No board with this id.
/// - `422 Unprocessable Entity`: Unknown member ids, or removed members still linked to tasks.
#[route("/{id}", method = "PATCH", method = "PUT")]
pub async fn update_board(
    store: web::Data<dyn Store>,
    actor: AuthenticatedUserId,
    board_id: web::Path<BoardId>,
    board_data: web::Json<BoardUpdateInput>,
) -> Result<impl Responder, AppError> {
    let updated = boards::update_board(
        &**store,
        actor.0,
        board_id.into_inner(),
        board_data.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// Deletes a board together with its tasks and their comments.
///
/// ## Responses:
/// - `204 No Content`: On successful deletion.
/// - `403 Forbidden`: The user is not the owner.
/// - `404 Not Found`: No board with this id.
#[delete("/{id}")]
pub async fn delete_board(
    store: web::Data<dyn Store>,
    actor: AuthenticatedUserId,
    board_id: web::Path<BoardId>,
) -> Result<impl Responder, AppError> {
    boards::delete_board(&**store, actor.0, board_id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
