//! Shared harness: an in-process fake of the Todo REST API plus a fully
//! wired client stack pointed at it.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};

use taskdeck::auth::AuthService;
use taskdeck::gateway::ApiGateway;
use taskdeck::session::{Session, SessionStore, User};
use taskdeck::task::{TaskListController, TaskRepository};

pub const TEST_TOKEN: &str = "test-token-1";

#[derive(Clone, Serialize)]
pub struct TaskRecord {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
    pub user_id: String,
}

#[derive(Default)]
struct Inner {
    tasks: Vec<TaskRecord>,
    next_id: i64,
    create_calls: usize,
    delete_calls: usize,
    create_delay: Option<Duration>,
    list_delays: HashMap<String, Duration>,
    list_failure: Option<(u16, Value)>,
    ignore_status_param: bool,
    last_list_status: Option<Option<String>>,
    last_update_body: Option<Value>,
    last_auth_header: Option<Option<String>>,
}

/// Fake backend state; handlers and assertions share it.
#[derive(Clone, Default)]
pub struct Backend {
    inner: Arc<Mutex<Inner>>,
}

impl Backend {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn seed_task(&self, title: &str, status: &str) -> i64 {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.tasks.push(TaskRecord {
            id,
            title: title.to_string(),
            description: None,
            status: status.to_string(),
            created_at: Utc::now().to_rfc3339(),
            updated_at: Utc::now().to_rfc3339(),
            user_id: "1".to_string(),
        });
        id
    }

    pub fn create_calls(&self) -> usize {
        self.lock().create_calls
    }

    pub fn delete_calls(&self) -> usize {
        self.lock().delete_calls
    }

    /// Delay applied to POST /api/tasks before the task is stored.
    pub fn set_create_delay(&self, delay: Duration) {
        self.lock().create_delay = Some(delay);
    }

    /// Delay for list requests with the given `status` param ("all" when
    /// the param is absent).
    pub fn set_list_delay(&self, status: &str, delay: Duration) {
        self.lock().list_delays.insert(status.to_string(), delay);
    }

    pub fn set_list_failure(&self, status: u16, body: Value) {
        self.lock().list_failure = Some((status, body));
    }

    /// Simulates a backend that does not implement server-side filtering.
    pub fn ignore_status_param(&self) {
        self.lock().ignore_status_param = true;
    }

    /// `status` query param of the most recent list request.
    pub fn last_list_status(&self) -> Option<Option<String>> {
        self.lock().last_list_status.clone()
    }

    pub fn last_update_body(&self) -> Option<Value> {
        self.lock().last_update_body.clone()
    }

    /// Authorization header of the most recent list request.
    pub fn last_auth_header(&self) -> Option<Option<String>> {
        self.lock().last_auth_header.clone()
    }
}

fn auth_of(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(String::from)
}

fn user_json(username: &str) -> Value {
    json!({
        "id": "1",
        "username": username,
        "email": format!("{username}@example.com"),
        "created_at": Utc::now().to_rfc3339(),
    })
}

async fn list_tasks(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let status_param = params.get("status").cloned();
    let delay_key = status_param.clone().unwrap_or_else(|| "all".to_string());
    let (delay, failure, ignore_status) = {
        let mut inner = backend.lock();
        inner.last_list_status = Some(status_param.clone());
        inner.last_auth_header = Some(auth_of(&headers));
        (
            inner.list_delays.get(&delay_key).copied(),
            inner.list_failure.clone(),
            inner.ignore_status_param,
        )
    };

    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    if let Some((code, body)) = failure {
        let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, Json(body)).into_response();
    }

    let tasks: Vec<TaskRecord> = backend
        .lock()
        .tasks
        .iter()
        .filter(|task| {
            if ignore_status {
                return true;
            }
            match status_param.as_deref() {
                None | Some("all") => true,
                Some(status) => task.status == status,
            }
        })
        .cloned()
        .collect();
    Json(tasks).into_response()
}

async fn create_task(State(backend): State<Backend>, Json(body): Json<Value>) -> Response {
    let delay = {
        let mut inner = backend.lock();
        inner.create_calls += 1;
        inner.create_delay
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let mut inner = backend.lock();
    inner.next_id += 1;
    let record = TaskRecord {
        id: inner.next_id,
        title: body
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        description: body
            .get("description")
            .and_then(Value::as_str)
            .map(String::from),
        status: body
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("pending")
            .to_string(),
        created_at: Utc::now().to_rfc3339(),
        updated_at: Utc::now().to_rfc3339(),
        user_id: "1".to_string(),
    };
    inner.tasks.push(record.clone());
    (StatusCode::CREATED, Json(record)).into_response()
}

async fn update_task(
    State(backend): State<Backend>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut inner = backend.lock();
    inner.last_update_body = Some(body.clone());
    let Some(record) = inner.tasks.iter_mut().find(|task| task.id == id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "Task not found"})),
        )
            .into_response();
    };
    if let Some(title) = body.get("title").and_then(Value::as_str) {
        record.title = title.to_string();
    }
    if let Some(description) = body.get("description").and_then(Value::as_str) {
        record.description = Some(description.to_string());
    }
    if let Some(status) = body.get("status").and_then(Value::as_str) {
        record.status = status.to_string();
    }
    record.updated_at = Utc::now().to_rfc3339();
    Json(record.clone()).into_response()
}

async fn delete_task(State(backend): State<Backend>, Path(id): Path<i64>) -> Response {
    let mut inner = backend.lock();
    inner.delete_calls += 1;
    let before = inner.tasks.len();
    inner.tasks.retain(|task| task.id != id);
    if inner.tasks.len() == before {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "Task not found"})),
        )
            .into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn login_form(axum::Form(form): axum::Form<HashMap<String, String>>) -> Response {
    let username = form.get("username").cloned().unwrap_or_default();
    if form.get("password").map(String::as_str) == Some("secret123") {
        Json(json!({"user": user_json(&username), "token": TEST_TOKEN})).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Incorrect username or password"})),
        )
            .into_response()
    }
}

async fn register(Json(body): Json<Value>) -> Response {
    let username = body
        .get("username")
        .and_then(Value::as_str)
        .unwrap_or_default();
    Json(json!({"user": user_json(username), "token": TEST_TOKEN})).into_response()
}

async fn me(headers: HeaderMap) -> Response {
    let expected = format!("Bearer {TEST_TOKEN}");
    if auth_of(&headers).as_deref() == Some(expected.as_str()) {
        Json(user_json("alice")).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Not authenticated"})),
        )
            .into_response()
    }
}

pub async fn spawn_backend(backend: Backend) -> String {
    let app = Router::new()
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route("/api/tasks/:id", put(update_task).delete(delete_task))
        .route("/api/auth/login", post(login_form))
        .route("/api/auth/register", post(register))
        .route("/api/auth/me", get(me))
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve fake backend");
    });
    format!("http://{addr}")
}

/// Client stack wired exactly as `main` wires it, with a throwaway session
/// file.
pub struct TestClient {
    pub controller: TaskListController,
    pub repository: TaskRepository,
    pub gateway: ApiGateway,
    pub auth: AuthService,
    pub session: Arc<SessionStore>,
    _dir: tempfile::TempDir,
}

pub async fn start(backend: Backend) -> TestClient {
    let base_url = spawn_backend(backend).await;
    let dir = tempfile::tempdir().expect("tempdir");
    let session = Arc::new(
        SessionStore::open(dir.path().join("session.json")).expect("open session store"),
    );
    let gateway = ApiGateway::new(base_url, session.clone());
    let repository = TaskRepository::new(gateway.clone());
    TestClient {
        controller: TaskListController::new(repository.clone()),
        repository,
        auth: AuthService::new(gateway.clone(), session.clone()),
        gateway,
        session,
        _dir: dir,
    }
}

pub fn test_user() -> User {
    User {
        id: "1".to_string(),
        username: "alice".to_string(),
        email: "alice@example.com".to_string(),
        created_at: Utc::now(),
        role: None,
    }
}

pub fn test_session() -> Session {
    Session {
        token: TEST_TOKEN.to_string(),
        user: test_user(),
    }
}
