use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::user::UserSummary;
use super::{deserialize_present, BoardId, TaskId, UserId};

/// Represents the priority of a task.
/// Corresponds to the `task_priority` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum. Any status may follow any other.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Serialized as `to-do`.
    #[default]
    ToDo,
    /// Serialized as `in-progress`.
    InProgress,
    Review,
    Done,
}

/// Represents a task entity as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: TaskId,
    /// Fixed at creation.
    pub board_id: BoardId,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    /// Must be a member of the board whenever set.
    pub assignee_id: Option<UserId>,
    /// Must be a member of the board whenever set.
    pub reviewer_id: Option<UserId>,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    /// The creating actor. Never writable by callers.
    pub created_by: UserId,
}

impl Task {
    /// Whether `user_id` is referenced as assignee or reviewer.
    pub fn links(&self, user_id: UserId) -> bool {
        self.assignee_id == Some(user_id) || self.reviewer_id == Some(user_id)
    }
}

/// A task ready to be inserted.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub board_id: BoardId,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub assignee_id: Option<UserId>,
    pub reviewer_id: Option<UserId>,
    pub due_date: Option<NaiveDate>,
    pub created_by: UserId,
}

/// Payload for creating a task. `board` is required here and nowhere else.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    pub board: Option<BoardId>,
    /// Must be between 1 and 255 characters.
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    pub assignee_id: Option<UserId>,
    pub reviewer_id: Option<UserId>,
    pub due_date: Option<NaiveDate>,
}

/// Partial update of a task.
///
/// The outer `Option` records whether a field was sent at all; for the
/// nullable fields the inner `Option` distinguishes `null` (clear) from a value.
/// `board` is captured only so that its presence can be rejected.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct TaskUpdateInput {
    #[serde(default, deserialize_with = "deserialize_present", skip_serializing_if = "Option::is_none")]
    pub board: Option<serde_json::Value>,
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub assignee_id: Option<Option<UserId>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub reviewer_id: Option<Option<UserId>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub due_date: Option<Option<NaiveDate>>,
}

impl TaskUpdateInput {
    /// Writes every supplied field onto `task`. Identity fields are never touched.
    pub fn apply_to(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(assignee_id) = self.assignee_id {
            task.assignee_id = assignee_id;
        }
        if let Some(reviewer_id) = self.reviewer_id {
            task.reviewer_id = reviewer_id;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
    }
}

/// Full task representation used by detail, list and create responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskView {
    pub id: TaskId,
    pub board: BoardId,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub assignee: Option<UserSummary>,
    pub reviewer: Option<UserSummary>,
    pub due_date: Option<NaiveDate>,
    pub comments_count: i64,
}

/// Task representation returned from a partial update: no board, no comment count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatchView {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub assignee: Option<UserSummary>,
    pub reviewer: Option<UserSummary>,
    pub due_date: Option<NaiveDate>,
}

impl From<TaskView> for TaskPatchView {
    fn from(view: TaskView) -> Self {
        Self {
            id: view.id,
            title: view.title,
            description: view.description,
            status: view.status,
            priority: view.priority,
            assignee: view.assignee,
            reviewer: view.reviewer,
            due_date: view.due_date,
        }
    }
}
