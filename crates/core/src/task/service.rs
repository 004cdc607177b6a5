//! Task service
//!
//! Mediates between the untrusted caller and the repository. This is the
//! one place where ownership and the initial status are enforced: the
//! owner is bound from the authenticated caller at creation and every
//! later access is checked against it. An owner mismatch is reported as
//! `TaskNotFound` so callers cannot probe which ids exist.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::model::{Task, TaskStatus};
use super::repository::TaskRepository;
use crate::{Error, Result};

/// Caller-supplied changes for an update; absent fields are left as is
#[derive(Debug, Default, Clone)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub deadline: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct TaskService {
    repo: Arc<dyn TaskRepository>,
}

impl TaskService {
    pub fn new(repo: Arc<dyn TaskRepository>) -> Self {
        Self { repo }
    }

    /// Create a task for the authenticated caller
    ///
    /// Status starts as `New` and the owner is taken from `owner_id`,
    /// never from request data.
    pub async fn create(
        &self,
        owner_id: u64,
        title: String,
        description: Option<String>,
        deadline: Option<DateTime<Utc>>,
    ) -> Result<Task> {
        if title.trim().is_empty() {
            return Err(Error::InvalidInput("title must not be empty".to_string()));
        }

        let mut task = Task::new(owner_id, title);
        if let Some(description) = description {
            task = task.with_description(description);
        }
        if let Some(deadline) = deadline {
            task = task.with_deadline(deadline);
        }

        self.repo.save(task).await
    }

    /// All live tasks of the caller
    pub async fn list_for_owner(&self, owner_id: u64) -> Result<Vec<Task>> {
        self.repo.list_by_owner(owner_id).await
    }

    /// Fetch a live task, verifying the caller owns it
    pub async fn find_by_id(&self, caller_id: u64, id: u64) -> Result<Task> {
        let task = self.repo.find_by_id(id).await?;
        if task.owner_id != caller_id {
            tracing::warn!(task_id = id, caller_id, "denied access to foreign task");
            return Err(Error::TaskNotFound(id));
        }
        Ok(task)
    }

    /// Overlay the patch onto the caller's live task and persist it
    ///
    /// Identifier, owner and timestamps are never taken from the patch.
    pub async fn apply_update(&self, caller_id: u64, id: u64, patch: TaskPatch) -> Result<Task> {
        let mut task = self.find_by_id(caller_id, id).await?;

        if let Some(title) = patch.title {
            if title.trim().is_empty() {
                return Err(Error::InvalidInput("title must not be empty".to_string()));
            }
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = Some(description);
        }
        if let Some(status) = patch.status {
            task.status = status;
        }
        if let Some(deadline) = patch.deadline {
            task.deadline = Some(deadline);
        }

        self.repo.update(task).await
    }

    /// Soft-delete the caller's live task
    ///
    /// A second remove of the same id reports `TaskNotFound`: the row no
    /// longer resolves as live.
    pub async fn remove(&self, caller_id: u64, id: u64) -> Result<()> {
        let task = self.find_by_id(caller_id, id).await?;
        self.repo.soft_delete(task.id).await
    }
}
