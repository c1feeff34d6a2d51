use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::task::{TaskPriority, TaskStatus, TaskView};
use super::user::UserSummary;
use super::{BoardId, Task, UserId};

/// A shared workspace. The owner is fixed at creation and is always part of `members`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub title: String,
    pub owner_id: UserId,
    pub members: BTreeSet<UserId>,
    pub created_at: NaiveDate,
}

impl Board {
    pub fn is_owner(&self, user_id: UserId) -> bool {
        self.owner_id == user_id
    }

    pub fn is_member(&self, user_id: UserId) -> bool {
        self.members.contains(&user_id)
    }

    /// Owner or member.
    pub fn has_access(&self, user_id: UserId) -> bool {
        self.is_owner(user_id) || self.is_member(user_id)
    }
}

/// A board ready to be inserted. `members` already contains the owner.
#[derive(Debug, Clone)]
pub struct NewBoard {
    pub title: String,
    pub owner_id: UserId,
    pub members: BTreeSet<UserId>,
}

/// Replacement values for an existing board; `None` leaves the column as is.
#[derive(Debug, Clone, Default)]
pub struct BoardChanges {
    pub title: Option<String>,
    pub members: Option<BTreeSet<UserId>>,
}

/// Payload for creating a board.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct BoardInput {
    /// Must be between 1 and 255 characters.
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    /// Ids of the initial members. The creator is added automatically.
    #[serde(default)]
    pub members: Vec<UserId>,
}

/// Payload for updating a board. Omitted fields are left untouched.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct BoardUpdateInput {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    /// The complete new member list. The owner is re-added if missing.
    pub members: Option<Vec<UserId>>,
}

/// Board row used by the list and create responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSummary {
    pub id: BoardId,
    pub title: String,
    pub member_count: usize,
    pub ticket_count: usize,
    pub tasks_to_do_count: usize,
    pub tasks_high_prio_count: usize,
    pub owner_id: UserId,
}

impl BoardSummary {
    pub fn new(board: &Board, tasks: &[Task]) -> Self {
        Self {
            id: board.id,
            title: board.title.clone(),
            member_count: board.members.len(),
            ticket_count: tasks.len(),
            tasks_to_do_count: tasks
                .iter()
                .filter(|task| task.status == TaskStatus::ToDo)
                .count(),
            tasks_high_prio_count: tasks
                .iter()
                .filter(|task| task.priority == TaskPriority::High)
                .count(),
            owner_id: board.owner_id,
        }
    }
}

/// Full board with member details and every task on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardDetail {
    pub id: BoardId,
    pub title: String,
    pub owner_id: UserId,
    pub members: Vec<UserSummary>,
    pub tasks: Vec<TaskView>,
}

/// Response to a board update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardUpdateView {
    pub id: BoardId,
    pub title: String,
    pub owner_data: Option<UserSummary>,
    pub members_data: Vec<UserSummary>,
}
