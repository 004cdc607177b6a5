//! File-based task storage implementation
//!
//! Stores tasks as JSON in a file on disk. Soft-deleted rows stay in the
//! file, which is what keeps ids from ever being reused.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::RwLock;

use super::model::Task;
use super::repository::TaskRepository;
use crate::{Error, Result};

/// File-based task store using JSON
pub struct FileTaskStore {
    /// Path to the JSON file
    path: PathBuf,
    /// In-memory cache of tasks, keyed by id, deleted rows included
    cache: RwLock<HashMap<u64, Task>>,
}

impl FileTaskStore {
    /// Create a new FileTaskStore
    ///
    /// If the file doesn't exist, it will be created on first write.
    pub async fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let cache = if path.exists() {
            let content = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| Error::Storage(format!("Failed to read tasks file: {}", e)))?;
            let tasks: Vec<Task> = serde_json::from_str(&content)
                .map_err(|e| Error::Storage(format!("Failed to parse tasks file: {}", e)))?;
            tasks.into_iter().map(|t| (t.id, t)).collect()
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            cache: RwLock::new(cache),
        })
    }

    /// Persist the cache to disk
    async fn persist(&self) -> Result<()> {
        let cache = self.cache.read().await;
        let mut tasks: Vec<&Task> = cache.values().collect();
        tasks.sort_by_key(|t| t.id);
        let content = serde_json::to_string_pretty(&tasks)?;

        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for FileTaskStore {
    async fn save(&self, task: Task) -> Result<Task> {
        let now = Utc::now();
        let stored = {
            let mut cache = self.cache.write().await;
            // Deleted rows are retained, so max + 1 never hands out an id
            // that has existed before.
            let id = cache.keys().max().copied().unwrap_or(0) + 1;
            let stored = Task {
                id,
                created_at: now,
                updated_at: now,
                deleted_at: None,
                ..task
            };
            cache.insert(id, stored.clone());
            stored
        };
        self.persist().await?;
        Ok(stored)
    }

    async fn find_by_id(&self, id: u64) -> Result<Task> {
        let cache = self.cache.read().await;
        cache
            .get(&id)
            .filter(|t| !t.is_deleted())
            .cloned()
            .ok_or(Error::TaskNotFound(id))
    }

    async fn list_by_owner(&self, owner_id: u64) -> Result<Vec<Task>> {
        let cache = self.cache.read().await;
        let mut tasks: Vec<Task> = cache
            .values()
            .filter(|t| t.owner_id == owner_id && !t.is_deleted())
            .cloned()
            .collect();
        tasks.sort_by_key(|t| t.id);
        Ok(tasks)
    }

    async fn update(&self, task: Task) -> Result<Task> {
        let updated = {
            let mut cache = self.cache.write().await;
            let current = cache
                .get_mut(&task.id)
                .filter(|t| !t.is_deleted())
                .ok_or(Error::TaskNotFound(task.id))?;
            current.title = task.title;
            current.description = task.description;
            current.status = task.status;
            current.deadline = task.deadline;
            current.updated_at = Utc::now();
            current.clone()
        };
        self.persist().await?;
        Ok(updated)
    }

    async fn soft_delete(&self, id: u64) -> Result<()> {
        {
            let mut cache = self.cache.write().await;
            let current = cache
                .get_mut(&id)
                .filter(|t| !t.is_deleted())
                .ok_or(Error::TaskNotFound(id))?;
            let now = Utc::now();
            current.deleted_at = Some(now);
            current.updated_at = now;
        }
        self.persist().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskStatus;
    use tempfile::TempDir;

    async fn create_test_store() -> (FileTaskStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tasks.json");
        let store = FileTaskStore::new(&path).await.unwrap();
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_save_assigns_id_and_stamps() {
        let (store, _temp) = create_test_store().await;

        let task = Task::new(42, "Write spec");
        let created = store.save(task).await.unwrap();

        assert_eq!(created.id, 1);
        assert_eq!(created.owner_id, 42);
        assert_eq!(created.status, TaskStatus::New);
        assert_eq!(created.created_at, created.updated_at);
        assert!(created.deleted_at.is_none());

        let second = store.save(Task::new(42, "Another")).await.unwrap();
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn test_save_ignores_caller_supplied_bookkeeping() {
        let (store, _temp) = create_test_store().await;

        let mut task = Task::new(7, "Sneaky");
        task.id = 999;
        task.deleted_at = Some(Utc::now());

        let created = store.save(task).await.unwrap();
        assert_eq!(created.id, 1);
        assert!(created.deleted_at.is_none());
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let (store, _temp) = create_test_store().await;

        let created = store.save(Task::new(1, "Test task")).await.unwrap();

        let found = store.find_by_id(created.id).await.unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.title, "Test task");

        let missing = store.find_by_id(12345).await;
        match missing.unwrap_err() {
            Error::TaskNotFound(id) => assert_eq!(id, 12345),
            e => panic!("Expected TaskNotFound error, got: {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_find_by_id_excludes_deleted() {
        let (store, _temp) = create_test_store().await;

        let created = store.save(Task::new(1, "Short-lived")).await.unwrap();
        store.soft_delete(created.id).await.unwrap();

        let result = store.find_by_id(created.id).await;
        assert!(matches!(result.unwrap_err(), Error::TaskNotFound(_)));
    }

    #[tokio::test]
    async fn test_list_by_owner() {
        let (store, _temp) = create_test_store().await;

        store.save(Task::new(1, "Task A")).await.unwrap();
        store.save(Task::new(2, "Task B")).await.unwrap();
        let mine = store.save(Task::new(1, "Task C")).await.unwrap();

        let tasks = store.list_by_owner(1).await.unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].title, "Task A");
        assert_eq!(tasks[1].title, "Task C");

        store.soft_delete(mine.id).await.unwrap();
        let tasks = store.list_by_owner(1).await.unwrap();
        assert_eq!(tasks.len(), 1);

        let none = store.list_by_owner(99).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_update_task() {
        let (store, _temp) = create_test_store().await;

        let created = store.save(Task::new(5, "Original title")).await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let mut changed = created.clone();
        changed.title = "Updated title".to_string();
        changed.status = TaskStatus::InProgress;
        // Owner and creation time from the caller must not win.
        changed.owner_id = 6;
        changed.created_at = Utc::now();

        let updated = store.update(changed).await.unwrap();
        assert_eq!(updated.title, "Updated title");
        assert_eq!(updated.status, TaskStatus::InProgress);
        assert_eq!(updated.owner_id, 5);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);

        let retrieved = store.find_by_id(created.id).await.unwrap();
        assert_eq!(retrieved.title, "Updated title");
    }

    #[tokio::test]
    async fn test_update_missing_or_deleted_task() {
        let (store, _temp) = create_test_store().await;

        let mut phantom = Task::new(1, "Phantom");
        phantom.id = 41;
        assert!(matches!(
            store.update(phantom).await.unwrap_err(),
            Error::TaskNotFound(41)
        ));

        let created = store.save(Task::new(1, "Doomed")).await.unwrap();
        store.soft_delete(created.id).await.unwrap();
        assert!(matches!(
            store.update(created).await.unwrap_err(),
            Error::TaskNotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_soft_delete_marks_and_retains() {
        let (store, _temp) = create_test_store().await;

        let created = store.save(Task::new(3, "Task to delete")).await.unwrap();
        store.soft_delete(created.id).await.unwrap();

        // Gone from live lookups but still on disk.
        assert!(store.find_by_id(created.id).await.is_err());
        let cache = store.cache.read().await;
        let raw = cache.get(&created.id).unwrap();
        assert!(raw.deleted_at.is_some());
        assert!(raw.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_soft_delete_twice_is_not_found() {
        let (store, _temp) = create_test_store().await;

        let created = store.save(Task::new(3, "Once")).await.unwrap();
        store.soft_delete(created.id).await.unwrap();

        let second = store.soft_delete(created.id).await;
        assert!(matches!(second.unwrap_err(), Error::TaskNotFound(_)));
    }

    #[tokio::test]
    async fn test_ids_not_reused_after_delete() {
        let (store, _temp) = create_test_store().await;

        let first = store.save(Task::new(1, "First")).await.unwrap();
        store.soft_delete(first.id).await.unwrap();

        let second = store.save(Task::new(1, "Second")).await.unwrap();
        assert_eq!(second.id, first.id + 1);
    }

    #[tokio::test]
    async fn test_persistence_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tasks.json");

        let (live_id, deleted_id);

        // Create store, add two tasks, delete one
        {
            let store = FileTaskStore::new(&path).await.unwrap();
            let live = store
                .save(Task::new(42, "Persistent task").with_description("Should survive reload"))
                .await
                .unwrap();
            live_id = live.id;
            let doomed = store.save(Task::new(42, "Doomed task")).await.unwrap();
            deleted_id = doomed.id;
            store.soft_delete(deleted_id).await.unwrap();
        }

        // New store instance sees the same state, including the tombstone
        {
            let store = FileTaskStore::new(&path).await.unwrap();
            let task = store.find_by_id(live_id).await.unwrap();
            assert_eq!(task.title, "Persistent task");
            assert_eq!(task.description, Some("Should survive reload".to_string()));

            assert!(store.find_by_id(deleted_id).await.is_err());

            // The tombstone still blocks id reuse
            let next = store.save(Task::new(42, "After reload")).await.unwrap();
            assert_eq!(next.id, deleted_id + 1);
        }
    }
}
