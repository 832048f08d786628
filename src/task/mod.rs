pub mod task_controller;
pub mod task_dto;
pub mod task_models;
pub mod task_repository;

pub use task_controller::{DeletePrompt, ListSnapshot, Phase, TaskListController};
pub use task_dto::{CreateTaskRequest, UpdateTaskRequest};
pub use task_models::{StatusFilter, Task, TaskStatus};
pub use task_repository::TaskRepository;
