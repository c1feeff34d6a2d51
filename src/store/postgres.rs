//! Postgres-backed store built on `sqlx`.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgConnection, PgPool};

use super::Store;
use crate::error::{AppError, AppResult};
use crate::membership::{check_removals, check_task_links};
use crate::models::{
    Board, BoardChanges, BoardId, Comment, CommentId, Credentials, NewBoard, NewComment, NewTask,
    NewUser, Task, TaskId, User, UserId,
};

const USER_COLUMNS: &str = "id, email, first_name, last_name, created_at";
const TASK_COLUMNS: &str = "id, board_id, title, description, status, priority, assignee_id, \
                            reviewer_id, due_date, created_at, created_by";
const COMMENT_COLUMNS: &str = "id, task_id, author_id, content, created_at";

#[derive(FromRow)]
struct BoardRow {
    id: BoardId,
    title: String,
    owner_id: UserId,
    created_at: NaiveDate,
}

#[derive(FromRow)]
struct CredentialsRow {
    id: UserId,
    email: String,
    first_name: String,
    last_name: String,
    created_at: DateTime<Utc>,
    password_hash: String,
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> AppResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Applies the schema under `migrations/`.
    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn attach_members(&self, rows: Vec<BoardRow>) -> AppResult<Vec<Board>> {
        let ids: Vec<BoardId> = rows.iter().map(|row| row.id).collect();
        let pairs = sqlx::query_as::<_, (BoardId, UserId)>(
            "SELECT board_id, user_id FROM board_members WHERE board_id = ANY($1)",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut members: BTreeMap<BoardId, BTreeSet<UserId>> = BTreeMap::new();
        for (board_id, user_id) in pairs {
            members.entry(board_id).or_default().insert(user_id);
        }

        Ok(rows
            .into_iter()
            .map(|row| Board {
                members: members.remove(&row.id).unwrap_or_default(),
                id: row.id,
                title: row.title,
                owner_id: row.owner_id,
                created_at: row.created_at,
            })
            .collect())
    }

    async fn tasks_where(&self, column: &str, user_id: UserId) -> AppResult<Vec<Task>> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE {} = $1 ORDER BY id DESC",
            TASK_COLUMNS, column
        );
        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(tasks)
    }
}

/// Reads a board with its members inside a transaction, taking `lock` on the board row.
///
/// Task writes take `FOR SHARE` and member replacement takes `FOR UPDATE`, so a
/// membership check and the write it guards cannot interleave with each other.
async fn locked_board(conn: &mut PgConnection, id: BoardId, lock: &str) -> AppResult<Board> {
    let sql = format!(
        "SELECT id, title, owner_id, created_at FROM boards WHERE id = $1 {}",
        lock
    );
    let row = sqlx::query_as::<_, BoardRow>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::not_found("Board", id))?;
    let members = sqlx::query_scalar::<_, UserId>(
        "SELECT user_id FROM board_members WHERE board_id = $1",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(Board {
        id: row.id,
        title: row.title,
        owner_id: row.owner_id,
        members: members.into_iter().collect(),
        created_at: row.created_at,
    })
}

#[async_trait]
impl Store for PgStore {
    async fn insert_user(&self, user: NewUser) -> AppResult<User> {
        let sql = format!(
            "INSERT INTO users (email, first_name, last_name, password_hash) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        );
        let created = sqlx::query_as::<_, User>(&sql)
            .bind(&user.email)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    AppError::BadRequest("Email already registered".into())
                }
                other => other.into(),
            })?;
        Ok(created)
    }

    async fn find_user(&self, id: UserId) -> AppResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_credentials(&self, email: &str) -> AppResult<Option<Credentials>> {
        let sql = format!(
            "SELECT {}, password_hash FROM users WHERE email = $1",
            USER_COLUMNS
        );
        let row = sqlx::query_as::<_, CredentialsRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|row| Credentials {
            user: User {
                id: row.id,
                email: row.email,
                first_name: row.first_name,
                last_name: row.last_name,
                created_at: row.created_at,
            },
            password_hash: row.password_hash,
        }))
    }

    async fn users_by_ids(&self, ids: &BTreeSet<UserId>) -> AppResult<Vec<User>> {
        let ids: Vec<UserId> = ids.iter().copied().collect();
        let sql = format!(
            "SELECT {} FROM users WHERE id = ANY($1) ORDER BY id",
            USER_COLUMNS
        );
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(&ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn boards_for_user(&self, user_id: UserId) -> AppResult<Vec<Board>> {
        let rows = sqlx::query_as::<_, BoardRow>(
            "SELECT DISTINCT b.id, b.title, b.owner_id, b.created_at \
             FROM boards b LEFT JOIN board_members m ON m.board_id = b.id \
             WHERE b.owner_id = $1 OR m.user_id = $1 \
             ORDER BY b.id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        self.attach_members(rows).await
    }

    async fn find_board(&self, id: BoardId) -> AppResult<Option<Board>> {
        let row = sqlx::query_as::<_, BoardRow>(
            "SELECT id, title, owner_id, created_at FROM boards WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => Ok(self.attach_members(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn insert_board(&self, board: NewBoard) -> AppResult<Board> {
        let members: Vec<UserId> = board.members.iter().copied().collect();
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, BoardRow>(
            "INSERT INTO boards (title, owner_id) VALUES ($1, $2) \
             RETURNING id, title, owner_id, created_at",
        )
        .bind(&board.title)
        .bind(board.owner_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO board_members (board_id, user_id) SELECT $1, UNNEST($2::int4[])",
        )
        .bind(row.id)
        .bind(&members)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Board {
            id: row.id,
            title: row.title,
            owner_id: row.owner_id,
            members: board.members,
            created_at: row.created_at,
        })
    }

    async fn update_board(&self, id: BoardId, changes: BoardChanges) -> AppResult<Board> {
        let mut tx = self.pool.begin().await?;
        let board = locked_board(&mut *tx, id, "FOR UPDATE").await?;

        if let Some(members) = &changes.members {
            let sql = format!(
                "SELECT {} FROM tasks WHERE board_id = $1 ORDER BY id",
                TASK_COLUMNS
            );
            let tasks = sqlx::query_as::<_, Task>(&sql)
                .bind(id)
                .fetch_all(&mut *tx)
                .await?;
            check_removals(&board.members, members, &tasks)?;

            let members: Vec<UserId> = members.iter().copied().collect();
            sqlx::query("DELETE FROM board_members WHERE board_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            sqlx::query(
                "INSERT INTO board_members (board_id, user_id) SELECT $1, UNNEST($2::int4[])",
            )
            .bind(id)
            .bind(&members)
            .execute(&mut *tx)
            .await?;
        }

        if let Some(title) = &changes.title {
            sqlx::query("UPDATE boards SET title = $2 WHERE id = $1")
                .bind(id)
                .bind(title)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        self.find_board(id)
            .await?
            .ok_or_else(|| AppError::not_found("Board", id))
    }

    async fn delete_board(&self, id: BoardId) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "DELETE FROM comments WHERE task_id IN (SELECT id FROM tasks WHERE board_id = $1)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;
        sqlx::query("DELETE FROM tasks WHERE board_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM board_members WHERE board_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM boards WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(AppError::not_found("Board", id));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn tasks_for_board(&self, board_id: BoardId) -> AppResult<Vec<Task>> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE board_id = $1 ORDER BY id",
            TASK_COLUMNS
        );
        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(board_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(tasks)
    }

    async fn find_task(&self, id: TaskId) -> AppResult<Option<Task>> {
        let sql = format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS);
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn insert_task(&self, task: NewTask) -> AppResult<Task> {
        let sql = format!(
            "INSERT INTO tasks (board_id, title, description, status, priority, assignee_id, \
             reviewer_id, due_date, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {}",
            TASK_COLUMNS
        );
        let mut tx = self.pool.begin().await?;
        let board = locked_board(&mut *tx, task.board_id, "FOR SHARE").await?;
        check_task_links(&board, task.assignee_id, task.reviewer_id)?;

        let created = sqlx::query_as::<_, Task>(&sql)
            .bind(task.board_id)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.status)
            .bind(task.priority)
            .bind(task.assignee_id)
            .bind(task.reviewer_id)
            .bind(task.due_date)
            .bind(task.created_by)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(created)
    }

    async fn save_task(&self, task: &Task) -> AppResult<Task> {
        let sql = format!(
            "UPDATE tasks SET title = $2, description = $3, status = $4, priority = $5, \
             assignee_id = $6, reviewer_id = $7, due_date = $8 \
             WHERE id = $1 RETURNING {}",
            TASK_COLUMNS
        );
        let mut tx = self.pool.begin().await?;
        let board = locked_board(&mut *tx, task.board_id, "FOR SHARE").await?;
        check_task_links(&board, task.assignee_id, task.reviewer_id)?;

        let saved = sqlx::query_as::<_, Task>(&sql)
            .bind(task.id)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.status)
            .bind(task.priority)
            .bind(task.assignee_id)
            .bind(task.reviewer_id)
            .bind(task.due_date)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::not_found("Task", task.id))?;

        tx.commit().await?;
        Ok(saved)
    }

    async fn delete_task(&self, id: TaskId) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM comments WHERE task_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(AppError::not_found("Task", id));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn tasks_assigned_to(&self, user_id: UserId) -> AppResult<Vec<Task>> {
        self.tasks_where("assignee_id", user_id).await
    }

    async fn tasks_reviewed_by(&self, user_id: UserId) -> AppResult<Vec<Task>> {
        self.tasks_where("reviewer_id", user_id).await
    }

    async fn comment_counts(&self, task_ids: &[TaskId]) -> AppResult<HashMap<TaskId, i64>> {
        let rows = sqlx::query_as::<_, (TaskId, i64)>(
            "SELECT task_id, COUNT(*) FROM comments WHERE task_id = ANY($1) GROUP BY task_id",
        )
        .bind(task_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut counts: HashMap<TaskId, i64> = task_ids.iter().map(|id| (*id, 0)).collect();
        counts.extend(rows);
        Ok(counts)
    }

    async fn comments_for_task(&self, task_id: TaskId) -> AppResult<Vec<Comment>> {
        let sql = format!(
            "SELECT {} FROM comments WHERE task_id = $1 ORDER BY created_at, id",
            COMMENT_COLUMNS
        );
        let comments = sqlx::query_as::<_, Comment>(&sql)
            .bind(task_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(comments)
    }

    async fn find_comment(&self, id: CommentId) -> AppResult<Option<Comment>> {
        let sql = format!("SELECT {} FROM comments WHERE id = $1", COMMENT_COLUMNS);
        let comment = sqlx::query_as::<_, Comment>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(comment)
    }

    async fn insert_comment(&self, comment: NewComment) -> AppResult<Comment> {
        let sql = format!(
            "INSERT INTO comments (task_id, author_id, content) VALUES ($1, $2, $3) RETURNING {}",
            COMMENT_COLUMNS
        );
        let created = sqlx::query_as::<_, Comment>(&sql)
            .bind(comment.task_id)
            .bind(comment.author_id)
            .bind(&comment.content)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn delete_comment(&self, id: CommentId) -> AppResult<()> {
        let deleted = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(AppError::not_found("Comment", id));
        }
        Ok(())
    }
}
