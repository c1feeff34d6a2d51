//! Referential checks between boards, their members and the tasks linking to them.

use std::collections::BTreeSet;

use crate::error::{AppError, AppResult};
use crate::models::{Board, Task, User, UserId};

fn format_ids(ids: &BTreeSet<UserId>) -> String {
    let ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
    format!("[{}]", ids.join(", "))
}

/// Requested ids that have no matching user.
pub fn unknown_ids(requested: &BTreeSet<UserId>, known: &[User]) -> BTreeSet<UserId> {
    let known: BTreeSet<UserId> = known.iter().map(|user| user.id).collect();
    requested.difference(&known).copied().collect()
}

/// Deduplicates `requested`, adds the owner and checks every id resolves to a user.
pub fn member_set(
    owner_id: UserId,
    requested: &[UserId],
    known: &[User],
) -> AppResult<BTreeSet<UserId>> {
    let mut members: BTreeSet<UserId> = requested.iter().copied().collect();
    members.insert(owner_id);

    let unknown = unknown_ids(&members, known);
    if !unknown.is_empty() {
        return Err(AppError::ValidationError(format!(
            "Unknown user ids: {}",
            format_ids(&unknown)
        )));
    }
    Ok(members)
}

/// Users that cannot be removed because a task still links them.
///
/// For each task referencing a removed user as assignee or reviewer, both of
/// that task's linked users are reported.
pub fn blocked_members(removed: &BTreeSet<UserId>, tasks: &[Task]) -> BTreeSet<UserId> {
    tasks
        .iter()
        .filter(|task| removed.iter().any(|id| task.links(*id)))
        .flat_map(|task| [task.assignee_id, task.reviewer_id])
        .flatten()
        .collect()
}

/// Rejects a member replacement that would drop a user still linked to a task.
///
/// `tasks` must be every task on the board, read under the same lock or
/// transaction that applies the replacement.
pub fn check_removals(
    current: &BTreeSet<UserId>,
    next: &BTreeSet<UserId>,
    tasks: &[Task],
) -> AppResult<()> {
    let removed: BTreeSet<UserId> = current.difference(next).copied().collect();
    let blocked = blocked_members(&removed, tasks);
    if !blocked.is_empty() {
        return Err(AppError::ValidationError(format!(
            "The following users cannot be removed because they are linked to tasks: {}",
            format_ids(&blocked)
        )));
    }
    Ok(())
}

/// Assignee and reviewer, when set, must be current members of the task's board.
pub fn check_task_links(
    board: &Board,
    assignee_id: Option<UserId>,
    reviewer_id: Option<UserId>,
) -> AppResult<()> {
    if let Some(id) = assignee_id.filter(|id| !board.is_member(*id)) {
        return Err(AppError::ValidationError(format!(
            "assignee_id {} is not a member of board {}",
            id, board.id
        )));
    }
    if let Some(id) = reviewer_id.filter(|id| !board.is_member(*id)) {
        return Err(AppError::ValidationError(format!(
            "reviewer_id {} is not a member of board {}",
            id, board.id
        )));
    }
    Ok(())
}
