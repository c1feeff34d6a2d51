//! Authorization decisions.
//!
//! Every function here is pure: it takes the acting user and a freshly loaded
//! snapshot of the entity (plus its board) and answers allow or deny. Callers
//! are responsible for loading the board on every request so membership
//! changes take effect immediately.

use crate::error::{AppError, AppResult};
use crate::models::{Board, Comment, Task, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardAction {
    Read,
    Write,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    Read,
    Write,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentAction {
    Read,
    Write,
    Delete,
}

pub fn can_read_board(actor: UserId, board: &Board) -> bool {
    board.has_access(actor)
}

pub fn can_write_board(actor: UserId, board: &Board) -> bool {
    board.has_access(actor)
}

/// Only the owner may delete a board.
pub fn can_delete_board(actor: UserId, board: &Board) -> bool {
    board.is_owner(actor)
}

/// `board` must be the task's own board.
pub fn can_read_or_write_task(actor: UserId, board: &Board) -> bool {
    board.has_access(actor)
}

/// The board owner or whoever created the task.
pub fn can_delete_task(actor: UserId, task: &Task, board: &Board) -> bool {
    board.is_owner(actor) || task.created_by == actor
}

pub fn can_create_task(actor: UserId, target_board: &Board) -> bool {
    target_board.has_access(actor)
}

/// Only the author. The board owner has no override here, unlike tasks and boards.
pub fn can_delete_comment(actor: UserId, comment: &Comment) -> bool {
    comment.author_id == actor
}

/// `board` must be the board of the comment's task.
pub fn can_read_or_write_comment(actor: UserId, board: &Board) -> bool {
    board.has_access(actor)
}

pub fn authorize_board(actor: UserId, action: BoardAction, board: &Board) -> bool {
    match action {
        BoardAction::Read => can_read_board(actor, board),
        BoardAction::Write => can_write_board(actor, board),
        BoardAction::Delete => can_delete_board(actor, board),
    }
}

pub fn authorize_task(actor: UserId, action: TaskAction, task: &Task, board: &Board) -> bool {
    match action {
        TaskAction::Read | TaskAction::Write => can_read_or_write_task(actor, board),
        TaskAction::Delete => can_delete_task(actor, task, board),
    }
}

pub fn authorize_comment(
    actor: UserId,
    action: CommentAction,
    comment: &Comment,
    board: &Board,
) -> bool {
    match action {
        CommentAction::Read | CommentAction::Write => can_read_or_write_comment(actor, board),
        CommentAction::Delete => can_delete_comment(actor, comment),
    }
}

/// Turns a denied decision into `AppError::Forbidden`.
pub fn ensure(allowed: bool, message: impl Into<String>) -> AppResult<()> {
    if allowed {
        Ok(())
    } else {
        let message = message.into();
        log::debug!("authorization denied: {}", message);
        Err(AppError::Forbidden(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TaskPriority, TaskStatus};
    use chrono::Utc;

    const OWNER: UserId = 1;
    const MEMBER: UserId = 2;
    const OUTSIDER: UserId = 3;

    fn board() -> Board {
        Board {
            id: 10,
            title: "Roadmap".to_string(),
            owner_id: OWNER,
            members: [OWNER, MEMBER].into_iter().collect(),
            created_at: Utc::now().date_naive(),
        }
    }

    fn task_created_by(creator: UserId) -> Task {
        Task {
            id: 20,
            board_id: 10,
            title: "Plan".to_string(),
            description: String::new(),
            status: TaskStatus::ToDo,
            priority: TaskPriority::Medium,
            assignee_id: None,
            reviewer_id: None,
            due_date: None,
            created_at: Utc::now(),
            created_by: creator,
        }
    }

    fn comment_by(author: UserId) -> Comment {
        Comment {
            id: 30,
            task_id: 20,
            author_id: author,
            content: "noted".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test_log::test]
    fn test_board_read_write_for_owner_and_member_only() {
        let board = board();
        for action in [BoardAction::Read, BoardAction::Write] {
            assert!(authorize_board(OWNER, action, &board));
            assert!(authorize_board(MEMBER, action, &board));
            assert!(!authorize_board(OUTSIDER, action, &board));
        }
    }

    #[test]
    fn test_board_delete_owner_only() {
        let board = board();
        assert!(authorize_board(OWNER, BoardAction::Delete, &board));
        assert!(!authorize_board(MEMBER, BoardAction::Delete, &board));
        assert!(!authorize_board(OUTSIDER, BoardAction::Delete, &board));
    }

    #[test]
    fn test_owner_not_in_member_set_still_has_access() {
        let mut board = board();
        board.members.remove(&OWNER);
        assert!(can_read_board(OWNER, &board));
    }

    #[test]
    fn test_task_delete_by_owner_or_creator() {
        let board = board();
        let task = task_created_by(MEMBER);
        assert!(authorize_task(OWNER, TaskAction::Delete, &task, &board));
        assert!(authorize_task(MEMBER, TaskAction::Delete, &task, &board));

        let owners_task = task_created_by(OWNER);
        assert!(!authorize_task(MEMBER, TaskAction::Delete, &owners_task, &board));
        assert!(authorize_task(MEMBER, TaskAction::Write, &owners_task, &board));
        assert!(!authorize_task(OUTSIDER, TaskAction::Read, &owners_task, &board));
    }

    #[test]
    fn test_create_task_requires_access() {
        let board = board();
        assert!(can_create_task(MEMBER, &board));
        assert!(!can_create_task(OUTSIDER, &board));
    }

    #[test]
    fn test_comment_delete_has_no_owner_override() {
        let board = board();
        let comment = comment_by(MEMBER);
        assert!(!authorize_comment(OWNER, CommentAction::Delete, &comment, &board));
        assert!(authorize_comment(MEMBER, CommentAction::Delete, &comment, &board));
        assert!(authorize_comment(OWNER, CommentAction::Read, &comment, &board));
        assert!(!authorize_comment(OUTSIDER, CommentAction::Write, &comment, &board));
    }

    #[test]
    fn test_ensure() {
        assert!(ensure(true, "ok").is_ok());
        assert_eq!(
            ensure(false, "no"),
            Err(AppError::Forbidden("no".to_string()))
        );
    }
}
