pub mod auth;
pub mod boards;
pub mod comments;
pub mod health;
pub mod tasks;

use actix_web::web;

/// Registers everything under `/api`. The caller wraps the scope in `AuthMiddleware`.
///
/// Within `/tasks` the fixed paths are registered before `/{id}` so they are
/// not captured as task ids.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::registration)
        .service(auth::login)
        .service(auth::email_check)
        .service(
            web::scope("/boards")
                .service(boards::list_boards)
                .service(boards::create_board)
                .service(boards::get_board)
                .service(boards::update_board)
                .service(boards::delete_board),
        )
        .service(
            web::scope("/tasks")
                .service(tasks::assigned_to_me)
                .service(tasks::reviewing)
                .service(tasks::list_tasks)
                .service(tasks::create_task)
                .service(comments::list_comments)
                .service(comments::create_comment)
                .service(comments::delete_comment)
                .service(tasks::get_task)
                .service(tasks::update_task)
                .service(tasks::delete_task),
        );
}
