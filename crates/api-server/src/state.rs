//! Application state

use std::path::PathBuf;
use std::sync::Arc;

use tp_core::task::{FileTaskStore, TaskService};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    task_service: TaskService,
}

impl AppState {
    /// Create a new AppState with the given data directory
    pub async fn new(data_dir: PathBuf) -> tp_core::Result<Self> {
        let tasks_path = data_dir.join("tasks.json");
        let store = FileTaskStore::new(tasks_path).await?;
        let task_service = TaskService::new(Arc::new(store));

        Ok(Self {
            inner: Arc::new(AppStateInner { task_service }),
        })
    }

    /// Get reference to the task service
    pub fn tasks(&self) -> &TaskService {
        &self.inner.task_service
    }
}
