/// Task endpoints
///
/// All routes here sit behind the bearer-token layer; handlers read the
/// caller's identity from [`AuthContext`]. Every store call scopes by owner
/// in the query itself, so a task that exists but belongs to someone else is
/// reported exactly like one that does not exist at all.
///
/// - `POST   /api/v1/tasks` - create a task owned by the caller
/// - `GET    /api/v1/tasks` - list the caller's tasks, newest first
/// - `GET    /api/v1/tasks/:id` - fetch one of the caller's tasks
/// - `PUT    /api/v1/tasks/:id` - partially update one of the caller's tasks
/// - `DELETE /api/v1/tasks/:id` - delete one of the caller's tasks
/// - `GET    /api/v1/tasks/admin/all` - every task with owner info (admin)

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use taskhub_shared::{
    auth::middleware::AuthContext,
    models::task::{CreateTask, Task, TaskStatus, TaskWithOwner, UpdateTask},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
    extract::{ApiJson, ApiPath},
};

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Title (required, non-empty)
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Optional status; must be one of pending / in-progress / completed
    pub status: Option<String>,
}

/// Update task request; all fields optional
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: Option<String>,

    pub description: Option<String>,

    pub status: Option<String>,
}

/// Response wrapper for a single task
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub task: Task,
}

/// Response wrapper for the caller's task list
#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    pub tasks: Vec<Task>,
}

/// Response wrapper for the admin listing
#[derive(Debug, Serialize)]
pub struct AdminTaskListResponse {
    pub tasks: Vec<TaskWithOwner>,
}

/// Parses an optional wire-format status, rejecting unknown values with a
/// field-level validation error
fn parse_status(status: Option<&str>) -> Result<Option<TaskStatus>, ApiError> {
    match status {
        None => Ok(None),
        Some(s) => TaskStatus::parse(s).map(Some).ok_or_else(|| {
            ApiError::ValidationError(vec![ValidationErrorDetail {
                field: "status".to_string(),
                message: "Status must be one of: pending, in-progress, completed".to_string(),
            }])
        }),
    }
}

/// Create a new task owned by the caller
///
/// Status defaults to `pending` when not supplied.
///
/// # Errors
///
/// - `400 Bad Request`: empty title or unknown status value
/// - `401 Unauthorized`: missing or invalid token
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    req.validate()?;
    let status = parse_status(req.status.as_deref())?.unwrap_or(TaskStatus::Pending);

    let task = Task::create(
        &state.db,
        CreateTask {
            owner_id: auth.user_id,
            title: req.title,
            description: req.description,
            status,
        },
    )
    .await?;

    tracing::debug!(task_id = %task.id, owner_id = %auth.user_id, "Task created");

    Ok((StatusCode::CREATED, Json(TaskResponse { task })))
}

/// List the caller's tasks, newest first
pub async fn list_my_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<TaskListResponse>> {
    let tasks = Task::list_by_owner(&state.db, auth.user_id).await?;

    Ok(Json(TaskListResponse { tasks }))
}

/// Fetch a single task owned by the caller
///
/// # Errors
///
/// - `404 Not Found`: no task with this id is owned by the caller
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<TaskResponse>> {
    let task = Task::find_by_id_and_owner(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(TaskResponse { task }))
}

/// Partially update a task owned by the caller
///
/// Only supplied fields change; owner and id are immutable. Returns the
/// post-update record.
///
/// # Errors
///
/// - `400 Bad Request`: empty title or unknown status value
/// - `404 Not Found`: no task with this id is owned by the caller
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    req.validate()?;
    let status = parse_status(req.status.as_deref())?;

    let update = UpdateTask {
        title: req.title,
        description: req.description,
        status,
    };

    let task = Task::update_by_id_and_owner(&state.db, id, auth.user_id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(TaskResponse { task }))
}

/// Delete a task owned by the caller
///
/// # Errors
///
/// - `404 Not Found`: no task with this id is owned by the caller
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    let deleted = Task::delete_by_id_and_owner(&state.db, id, auth.user_id).await?;

    if !deleted {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// List every task in the system with owner identity, newest first
///
/// The admin layer has already confirmed the caller's stored role, so this
/// handler only reads. No pagination.
pub async fn admin_list_all(
    State(state): State<AppState>,
) -> ApiResult<Json<AdminTaskListResponse>> {
    let tasks = Task::list_all_with_owner(&state.db).await?;

    Ok(Json(AdminTaskListResponse { tasks }))
}
