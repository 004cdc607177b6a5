//! Task repository trait
//!
//! Defines the interface for task storage operations. Soft-delete
//! filtering is part of the contract: every single-row lookup and every
//! mutation only sees live rows.

use async_trait::async_trait;

use super::model::Task;
use crate::Result;

/// Repository interface for task CRUD operations
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Insert a new task; the store assigns `id` and stamps
    /// `created_at`/`updated_at`, ignoring whatever the caller supplied
    /// for those fields.
    async fn save(&self, task: Task) -> Result<Task>;

    /// Get a live task by id; soft-deleted rows resolve to
    /// `Error::TaskNotFound` just like missing ones.
    async fn find_by_id(&self, id: u64) -> Result<Task>;

    /// All live tasks for an owner, in insertion order. Empty is not an
    /// error.
    async fn list_by_owner(&self, owner_id: u64) -> Result<Vec<Task>>;

    /// Overwrite the mutable fields (title, description, status,
    /// deadline) of the live row matching `task.id` and refresh
    /// `updated_at`. Owner and creation timestamp stay as stored.
    async fn update(&self, task: Task) -> Result<Task>;

    /// Stamp `deleted_at` on the live row; the row is retained but
    /// disappears from every other operation.
    async fn soft_delete(&self, id: u64) -> Result<()>;
}
