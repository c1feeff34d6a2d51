//! In-memory store used when no database is configured, and by the test suite.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::Store;
use crate::error::{AppError, AppResult};
use crate::membership::{check_removals, check_task_links};
use crate::models::{
    Board, BoardChanges, BoardId, Comment, CommentId, Credentials, NewBoard, NewComment, NewTask,
    NewUser, Task, TaskId, User, UserId,
};

/// Thread-safe in-memory store. Each mutation runs under a single write guard,
/// so it is applied entirely or not at all.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

#[derive(Debug, Default)]
struct State {
    users: BTreeMap<UserId, (User, String)>,
    boards: BTreeMap<BoardId, Board>,
    tasks: BTreeMap<TaskId, Task>,
    comments: BTreeMap<CommentId, Comment>,
    last_id: i32,
}

impl State {
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn insert_user(&self, user: NewUser) -> AppResult<User> {
        let mut state = self.state.write().await;
        if state.users.values().any(|(u, _)| u.email == user.email) {
            return Err(AppError::BadRequest("Email already registered".into()));
        }
        let id = state.next_id();
        let created = User {
            id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            created_at: Utc::now(),
        };
        state
            .users
            .insert(id, (created.clone(), user.password_hash));
        Ok(created)
    }

    async fn find_user(&self, id: UserId) -> AppResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.get(&id).map(|(user, _)| user.clone()))
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|(user, _)| user.email == email)
            .map(|(user, _)| user.clone()))
    }

    async fn find_credentials(&self, email: &str) -> AppResult<Option<Credentials>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|(user, _)| user.email == email)
            .map(|(user, hash)| Credentials {
                user: user.clone(),
                password_hash: hash.clone(),
            }))
    }

    async fn users_by_ids(&self, ids: &BTreeSet<UserId>) -> AppResult<Vec<User>> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.users.get(id).map(|(user, _)| user.clone()))
            .collect())
    }

    async fn boards_for_user(&self, user_id: UserId) -> AppResult<Vec<Board>> {
        let state = self.state.read().await;
        Ok(state
            .boards
            .values()
            .filter(|board| board.has_access(user_id))
            .cloned()
            .collect())
    }

    async fn find_board(&self, id: BoardId) -> AppResult<Option<Board>> {
        let state = self.state.read().await;
        Ok(state.boards.get(&id).cloned())
    }

    async fn insert_board(&self, board: NewBoard) -> AppResult<Board> {
        let mut state = self.state.write().await;
        if let Some(missing) = board.members.iter().find(|id| !state.users.contains_key(*id)) {
            return Err(AppError::not_found("User", *missing));
        }
        let id = state.next_id();
        let created = Board {
            id,
            title: board.title,
            owner_id: board.owner_id,
            members: board.members,
            created_at: Utc::now().date_naive(),
        };
        state.boards.insert(id, created.clone());
        Ok(created)
    }

    async fn update_board(&self, id: BoardId, changes: BoardChanges) -> AppResult<Board> {
        let mut state = self.state.write().await;
        if let Some(members) = &changes.members {
            if let Some(missing) = members.iter().find(|id| !state.users.contains_key(*id)) {
                return Err(AppError::not_found("User", *missing));
            }
        }
        let current = state
            .boards
            .get(&id)
            .map(|board| board.members.clone())
            .ok_or_else(|| AppError::not_found("Board", id))?;
        if let Some(members) = &changes.members {
            let tasks: Vec<Task> = state
                .tasks
                .values()
                .filter(|task| task.board_id == id)
                .cloned()
                .collect();
            check_removals(&current, members, &tasks)?;
        }
        let board = state
            .boards
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("Board", id))?;
        if let Some(title) = changes.title {
            board.title = title;
        }
        if let Some(members) = changes.members {
            board.members = members;
        }
        Ok(board.clone())
    }

    async fn delete_board(&self, id: BoardId) -> AppResult<()> {
        let mut state = self.state.write().await;
        if !state.boards.contains_key(&id) {
            return Err(AppError::not_found("Board", id));
        }
        let task_ids: BTreeSet<TaskId> = state
            .tasks
            .values()
            .filter(|task| task.board_id == id)
            .map(|task| task.id)
            .collect();
        state
            .comments
            .retain(|_, comment| !task_ids.contains(&comment.task_id));
        state.tasks.retain(|_, task| task.board_id != id);
        state.boards.remove(&id);
        Ok(())
    }

    async fn tasks_for_board(&self, board_id: BoardId) -> AppResult<Vec<Task>> {
        let state = self.state.read().await;
        Ok(state
            .tasks
            .values()
            .filter(|task| task.board_id == board_id)
            .cloned()
            .collect())
    }

    async fn find_task(&self, id: TaskId) -> AppResult<Option<Task>> {
        let state = self.state.read().await;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn insert_task(&self, task: NewTask) -> AppResult<Task> {
        let mut state = self.state.write().await;
        let board = state
            .boards
            .get(&task.board_id)
            .ok_or_else(|| AppError::not_found("Board", task.board_id))?;
        check_task_links(board, task.assignee_id, task.reviewer_id)?;
        let id = state.next_id();
        let created = Task {
            id,
            board_id: task.board_id,
            title: task.title,
            description: task.description,
            status: task.status,
            priority: task.priority,
            assignee_id: task.assignee_id,
            reviewer_id: task.reviewer_id,
            due_date: task.due_date,
            created_at: Utc::now(),
            created_by: task.created_by,
        };
        state.tasks.insert(id, created.clone());
        Ok(created)
    }

    async fn save_task(&self, task: &Task) -> AppResult<Task> {
        let mut state = self.state.write().await;
        let board = state
            .boards
            .get(&task.board_id)
            .ok_or_else(|| AppError::not_found("Board", task.board_id))?;
        check_task_links(board, task.assignee_id, task.reviewer_id)?;
        let stored = state
            .tasks
            .get_mut(&task.id)
            .ok_or_else(|| AppError::not_found("Task", task.id))?;
        stored.title = task.title.clone();
        stored.description = task.description.clone();
        stored.status = task.status;
        stored.priority = task.priority;
        stored.assignee_id = task.assignee_id;
        stored.reviewer_id = task.reviewer_id;
        stored.due_date = task.due_date;
        Ok(stored.clone())
    }

    async fn delete_task(&self, id: TaskId) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.tasks.remove(&id).is_none() {
            return Err(AppError::not_found("Task", id));
        }
        state.comments.retain(|_, comment| comment.task_id != id);
        Ok(())
    }

    async fn tasks_assigned_to(&self, user_id: UserId) -> AppResult<Vec<Task>> {
        let state = self.state.read().await;
        Ok(state
            .tasks
            .values()
            .rev()
            .filter(|task| task.assignee_id == Some(user_id))
            .cloned()
            .collect())
    }

    async fn tasks_reviewed_by(&self, user_id: UserId) -> AppResult<Vec<Task>> {
        let state = self.state.read().await;
        Ok(state
            .tasks
            .values()
            .rev()
            .filter(|task| task.reviewer_id == Some(user_id))
            .cloned()
            .collect())
    }

    async fn comment_counts(&self, task_ids: &[TaskId]) -> AppResult<HashMap<TaskId, i64>> {
        let state = self.state.read().await;
        let mut counts: HashMap<TaskId, i64> = task_ids.iter().map(|id| (*id, 0)).collect();
        for comment in state.comments.values() {
            if let Some(count) = counts.get_mut(&comment.task_id) {
                *count += 1;
            }
        }
        Ok(counts)
    }

    async fn comments_for_task(&self, task_id: TaskId) -> AppResult<Vec<Comment>> {
        let state = self.state.read().await;
        let mut comments: Vec<Comment> = state
            .comments
            .values()
            .filter(|comment| comment.task_id == task_id)
            .cloned()
            .collect();
        comments.sort_by_key(|comment| (comment.created_at, comment.id));
        Ok(comments)
    }

    async fn find_comment(&self, id: CommentId) -> AppResult<Option<Comment>> {
        let state = self.state.read().await;
        Ok(state.comments.get(&id).cloned())
    }

    async fn insert_comment(&self, comment: NewComment) -> AppResult<Comment> {
        let mut state = self.state.write().await;
        if !state.tasks.contains_key(&comment.task_id) {
            return Err(AppError::not_found("Task", comment.task_id));
        }
        let id = state.next_id();
        let created = Comment {
            id,
            task_id: comment.task_id,
            author_id: comment.author_id,
            content: comment.content,
            created_at: Utc::now(),
        };
        state.comments.insert(id, created.clone());
        Ok(created)
    }

    async fn delete_comment(&self, id: CommentId) -> AppResult<()> {
        let mut state = self.state.write().await;
        state
            .comments
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::not_found("Comment", id))
    }
}
