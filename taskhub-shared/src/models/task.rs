/// Task model and database operations
///
/// Tasks are the core records of TaskHub. Every task belongs to exactly one
/// owning user, and ownership is immutable after creation.
///
/// All ownership-scoped lookups bake the owner predicate into the query
/// itself (`WHERE id = $1 AND owner_id = $2`) rather than checking existence
/// first. A non-owner therefore gets the same `None` as a genuinely absent
/// id, so nothing about other users' tasks leaks through error shapes or
/// timing.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('pending', 'in-progress', 'completed');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     status task_status NOT NULL DEFAULT 'pending',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::user::UserRole;

/// Task progress status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Not started yet (the default for new tasks)
    Pending,

    /// Being worked on
    InProgress,

    /// Done
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
        }
    }

    /// Parses a status string as it appears on the wire
    ///
    /// Returns `None` for anything outside the three enumerated values, so
    /// request validation can reject it with a field-level error instead of
    /// a deserialization failure.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TaskStatus::Pending),
            "in-progress" => Some(TaskStatus::InProgress),
            "completed" => Some(TaskStatus::Completed),
            _ => None,
        }
    }
}

/// Task record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID (UUID v4)
    pub id: Uuid,

    /// Owning user; immutable after creation
    pub owner_id: Uuid,

    /// Short title (non-empty)
    pub title: String,

    /// Optional free-form description
    pub description: Option<String>,

    pub status: TaskStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Task joined with minimal owner identity, for the admin listing
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TaskWithOwner {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Owner's email
    pub owner_email: String,

    /// Owner's role
    pub owner_role: UserRole,
}

/// Input for creating a new task
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,

    /// Defaults to `Pending` when not supplied
    pub status: TaskStatus,
}

/// Partial update for a task
///
/// Only `Some` fields are changed; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
}

impl Task {
    /// Creates a new task owned by `data.owner_id`
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (owner_id, title, description, status)
            VALUES ($1, $2, $3, $4)
            RETURNING id, owner_id, title, description, status, created_at, updated_at
            "#,
        )
        .bind(data.owner_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.status)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Lists all tasks owned by `owner_id`, newest first
    pub async fn list_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, owner_id, title, description, status, created_at, updated_at
            FROM tasks
            WHERE owner_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Finds a task by id, scoped to its owner
    ///
    /// Returns `None` both when the id does not exist and when it belongs to
    /// someone else; callers cannot tell the two apart.
    pub async fn find_by_id_and_owner(
        pool: &PgPool,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, owner_id, title, description, status, created_at, updated_at
            FROM tasks
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Applies a partial update to a task, scoped to its owner
    ///
    /// A single find-and-update statement: the owner predicate and the
    /// mutation are one atomic operation. Returns the post-update record, or
    /// `None` if no task matched id + owner.
    pub async fn update_by_id_and_owner(
        pool: &PgPool,
        id: Uuid,
        owner_id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = COALESCE($3, title),
                description = COALESCE($4, description),
                status = COALESCE($5, status),
                updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING id, owner_id, title, description, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.status)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Deletes a task, scoped to its owner
    ///
    /// Returns true if a row was deleted, false if no task matched id + owner.
    pub async fn delete_by_id_and_owner(
        pool: &PgPool,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists every task in the system with minimal owner identity, newest first
    ///
    /// Admin-only path; no pagination.
    pub async fn list_all_with_owner(pool: &PgPool) -> Result<Vec<TaskWithOwner>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, TaskWithOwner>(
            r#"
            SELECT t.id, t.owner_id, t.title, t.description, t.status,
                   t.created_at, t.updated_at,
                   u.email AS owner_email, u.role AS owner_role
            FROM tasks t
            JOIN users u ON u.id = t.owner_id
            ORDER BY t.created_at DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }
}
