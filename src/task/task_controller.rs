use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{AppError, Result};
use crate::task::task_dto::{CreateTaskRequest, UpdateTaskRequest};
use crate::task::task_models::{StatusFilter, Task};
use crate::task::task_repository::TaskRepository;

/// UI-facing lifecycle of the task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Ready,
    Error,
}

/// Point-in-time copy of the controller state for rendering.
#[derive(Debug, Clone)]
pub struct ListSnapshot {
    pub phase: Phase,
    pub tasks: Vec<Task>,
    pub filter: StatusFilter,
    pub error: Option<String>,
}

/// Confirmation step required before a delete is issued. Declining performs
/// no network call.
pub trait DeletePrompt {
    fn confirm(&self, task: &Task) -> bool;
}

struct ListState {
    phase: Phase,
    tasks: Vec<Task>,
    filter: StatusFilter,
    error: Option<String>,
    create_in_flight: bool,
    fetch_seq: u64,
}

/// Owns the task collection, filter, and loading/error state, and sequences
/// repository calls. After every mutation the collection is refetched; the
/// server's latest state is the only source of truth.
#[derive(Clone)]
pub struct TaskListController {
    repository: TaskRepository,
    state: Arc<Mutex<ListState>>,
}

impl TaskListController {
    pub fn new(repository: TaskRepository) -> Self {
        Self {
            repository,
            state: Arc::new(Mutex::new(ListState {
                phase: Phase::Idle,
                tasks: Vec::new(),
                filter: StatusFilter::All,
                error: None,
                create_in_flight: false,
                fetch_seq: 0,
            })),
        }
    }

    pub fn snapshot(&self) -> ListSnapshot {
        let state = self.lock();
        ListSnapshot {
            phase: state.phase,
            tasks: state.tasks.clone(),
            filter: state.filter,
            error: state.error.clone(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.lock().phase
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.lock().tasks.clone()
    }

    pub fn filter(&self) -> StatusFilter {
        self.lock().filter
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    /// Loads the collection for `filter`. Overlapping fetches are legal;
    /// each one is tagged with a sequence number and only the response
    /// belonging to the most recently initiated fetch is applied, so a slow
    /// stale response can never overwrite a newer one.
    pub async fn fetch(&self, filter: StatusFilter) {
        let seq = {
            let mut state = self.lock();
            state.fetch_seq += 1;
            state.phase = Phase::Loading;
            state.filter = filter;
            state.fetch_seq
        };

        let result = self.repository.list(filter).await;

        let mut state = self.lock();
        if state.fetch_seq != seq {
            tracing::debug!(seq, latest = state.fetch_seq, "Discarding stale fetch result");
            return;
        }
        match result {
            Ok(tasks) => {
                state.phase = Phase::Ready;
                state.tasks = tasks;
                state.error = None;
            }
            Err(err) => {
                state.phase = Phase::Error;
                state.tasks.clear();
                state.error = Some(err.to_string());
            }
        }
    }

    /// Creates a task, then refetches the current filter. A second create
    /// submitted while one is in flight is rejected so repeated submissions
    /// cannot produce duplicate tasks.
    pub async fn create(&self, title: String, description: Option<String>) -> Result<()> {
        {
            let mut state = self.lock();
            if state.create_in_flight {
                return Err(AppError::CreateInFlight);
            }
            state.create_in_flight = true;
        }

        let result = self
            .repository
            .create(CreateTaskRequest::new(title, description))
            .await;
        self.lock().create_in_flight = false;
        result?;

        self.fetch(self.filter()).await;
        Ok(())
    }

    /// Reads the task's current status locally, issues the status update,
    /// and refetches. Never mutates the local copy.
    pub async fn toggle_completion(&self, id: i64) -> Result<()> {
        let next = {
            let state = self.lock();
            state
                .tasks
                .iter()
                .find(|task| task.id == id)
                .map(|task| task.status.toggled())
                .ok_or_else(|| AppError::NotFound(format!("no task with id {id}")))?
        };

        self.repository
            .update(id, UpdateTaskRequest::status(next))
            .await?;
        self.fetch(self.filter()).await;
        Ok(())
    }

    /// Deletes after confirmation. Returns `Ok(false)` when the prompt was
    /// declined; no network call happens in that case.
    pub async fn delete(&self, id: i64, prompt: &dyn DeletePrompt) -> Result<bool> {
        let task = self
            .lock()
            .tasks
            .iter()
            .find(|task| task.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("no task with id {id}")))?;

        if !prompt.confirm(&task) {
            return Ok(false);
        }

        self.repository.remove(id).await?;
        self.fetch(self.filter()).await;
        Ok(true)
    }

    fn lock(&self) -> MutexGuard<'_, ListState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
