//! Task API endpoints
//!
//! RESTful API for task CRUD operations, scoped to the authenticated
//! caller. Deadlines travel as epoch seconds on the wire and as UTC
//! timestamps internally.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tp_core::task::{Task, TaskPatch, TaskStatus};
use tp_core::Error;

use crate::auth::resolve_user_id;
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Epoch seconds
    #[serde(default)]
    pub deadline: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    /// Epoch seconds
    #[serde(default)]
    pub deadline: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: u64,
    pub owner_id: u64,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    /// Epoch seconds, null when no deadline is set
    pub deadline: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            owner_id: task.owner_id,
            title: task.title,
            description: task.description,
            status: task.status,
            deadline: task.deadline.map(|ts| ts.timestamp()),
            created_at: task.created_at.to_rfc3339(),
            updated_at: task.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type RouteError = (StatusCode, Json<ErrorResponse>);

fn unauthorized(err: String) -> RouteError {
    (StatusCode::UNAUTHORIZED, Json(ErrorResponse { error: err }))
}

fn domain_error(err: Error) -> RouteError {
    let status = match err {
        Error::TaskNotFound(_) => StatusCode::NOT_FOUND,
        Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

fn parse_deadline(secs: i64) -> Result<DateTime<Utc>, RouteError> {
    DateTime::from_timestamp(secs, 0).ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "deadline is out of range".to_string(),
            }),
        )
    })
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/tasks - List the caller's live tasks
async fn list_tasks(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<TaskResponse>>, RouteError> {
    let user_id = resolve_user_id(&headers).map_err(unauthorized)?;

    let tasks = state
        .tasks()
        .list_for_owner(user_id)
        .await
        .map_err(domain_error)?;

    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

/// POST /api/tasks - Create a new task for the caller
async fn create_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskResponse>), RouteError> {
    let user_id = resolve_user_id(&headers).map_err(unauthorized)?;

    let deadline = match req.deadline {
        Some(secs) => Some(parse_deadline(secs)?),
        None => None,
    };

    let created = state
        .tasks()
        .create(user_id, req.title, req.description, deadline)
        .await
        .map_err(domain_error)?;

    Ok((StatusCode::CREATED, Json(TaskResponse::from(created))))
}

/// GET /api/tasks/{id} - Get a single task
async fn get_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<Json<TaskResponse>, RouteError> {
    let user_id = resolve_user_id(&headers).map_err(unauthorized)?;

    let task = state
        .tasks()
        .find_by_id(user_id, id)
        .await
        .map_err(domain_error)?;

    Ok(Json(TaskResponse::from(task)))
}

/// PATCH /api/tasks/{id} - Update a task
async fn update_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<Json<TaskResponse>, RouteError> {
    let user_id = resolve_user_id(&headers).map_err(unauthorized)?;

    let deadline = match req.deadline {
        Some(secs) => Some(parse_deadline(secs)?),
        None => None,
    };

    let patch = TaskPatch {
        title: req.title,
        description: req.description,
        status: req.status,
        deadline,
    };

    let updated = state
        .tasks()
        .apply_update(user_id, id, patch)
        .await
        .map_err(domain_error)?;

    Ok(Json(TaskResponse::from(updated)))
}

/// DELETE /api/tasks/{id} - Soft-delete a task
async fn delete_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<StatusCode, RouteError> {
    let user_id = resolve_user_id(&headers).map_err(unauthorized)?;

    state
        .tasks()
        .remove(user_id, id)
        .await
        .map_err(domain_error)?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Router
// ============================================================================

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route(
            "/api/tasks/{id}",
            get(get_task).patch(update_task).delete(delete_task),
        )
}
