use validator::Validate;

use crate::error::Result;
use crate::gateway::ApiGateway;
use crate::task::task_dto::{CreateTaskRequest, UpdateTaskRequest};
use crate::task::task_models::{StatusFilter, Task};

/// Typed CRUD facade over the gateway for tasks. Validates inputs before
/// they reach the network.
#[derive(Clone)]
pub struct TaskRepository {
    gateway: ApiGateway,
}

impl TaskRepository {
    pub fn new(gateway: ApiGateway) -> Self {
        Self { gateway }
    }

    pub async fn list(&self, filter: StatusFilter) -> Result<Vec<Task>> {
        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(status) = filter.as_query() {
            query.push(("status", status));
        }
        let mut tasks: Vec<Task> = self.gateway.fetch("/api/tasks", &query).await?;
        // The backend is expected to honor the status param; re-applying the
        // predicate keeps the partition invariant even if it does not.
        tasks.retain(|task| filter.matches(task));
        Ok(tasks)
    }

    pub async fn create(&self, request: CreateTaskRequest) -> Result<Task> {
        request.validate()?;
        Ok(self.gateway.create("/api/tasks", &request).await?)
    }

    pub async fn update(&self, id: i64, request: UpdateTaskRequest) -> Result<Task> {
        request.validate()?;
        Ok(self
            .gateway
            .replace(&format!("/api/tasks/{id}"), &request)
            .await?)
    }

    pub async fn remove(&self, id: i64) -> Result<()> {
        Ok(self.gateway.remove(&format!("/api/tasks/{id}")).await?)
    }
}
