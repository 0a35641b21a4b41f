//! HTTP server exposing the task CRUD surface.
//!
//! Five routes over one table: create, get, update, delete, and a paged
//! list. Handlers validate bodies into [`TaskFields`] and translate store
//! results into the fixed JSON response shapes.

use axum::{
    Json, Router,
    extract::rejection::JsonRejection,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::db::Database;
use crate::error::{ApiError, ApiResult};
use crate::types::{STATUS_DEFAULT, Task, TaskFields};

/// Server state shared across handlers.
#[derive(Clone)]
pub struct TaskApi {
    /// Handle to the task store.
    db: Database,
}

impl TaskApi {
    /// Create the server state around an open database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Get the database handle.
    pub fn db(&self) -> &Database {
        &self.db
    }
}

/// Incoming task body for create and update, before validation.
///
/// Every field is optional at the deserialization layer so that missing
/// and empty fields funnel through one validation path.
#[derive(Debug, Default, Deserialize)]
pub struct TaskPayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub status: Option<String>,
}

impl TaskPayload {
    /// Validate a create body: title, description and due_date are
    /// required; status falls back to the default when absent or empty.
    fn into_new_task(self) -> ApiResult<TaskFields> {
        Ok(TaskFields {
            title: require(self.title)?,
            description: require(self.description)?,
            due_date: require(self.due_date)?,
            status: self
                .status
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| STATUS_DEFAULT.to_string()),
        })
    }

    /// Validate a full-update body: all four fields are required.
    fn into_full_update(self) -> ApiResult<TaskFields> {
        Ok(TaskFields {
            title: require(self.title)?,
            description: require(self.description)?,
            due_date: require(self.due_date)?,
            status: require(self.status)?,
        })
    }
}

/// Reject absent or empty required fields.
fn require(field: Option<String>) -> ApiResult<String> {
    match field {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ApiError::MissingFields),
    }
}

/// Unwrap an extracted JSON body.
///
/// A body that parsed as JSON but does not fit the task schema (wrong
/// field types) is a validation failure; anything that never parsed keeps
/// axum's own rejection response.
fn parse_body(body: Result<Json<TaskPayload>, JsonRejection>) -> ApiResult<TaskPayload> {
    match body {
        Ok(Json(payload)) => Ok(payload),
        Err(JsonRejection::JsonDataError(_)) => Err(ApiError::MissingFields),
        Err(rejection) => Err(ApiError::BodyRejection(rejection)),
    }
}

/// Query parameters for the list endpoint.
///
/// Values stay raw strings: a parameter that is absent or fails integer
/// parsing takes its default instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
struct ListParams {
    page: Option<String>,
    per_page: Option<String>,
}

impl ListParams {
    fn page(&self) -> i64 {
        parse_or(self.page.as_deref(), 1)
    }

    fn per_page(&self) -> i64 {
        parse_or(self.per_page.as_deref(), 10)
    }
}

/// Parse a pagination value, falling back to `default` when absent or
/// non-numeric and clamping non-positive values to 1.
fn parse_or(value: Option<&str>, default: i64) -> i64 {
    value
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(default)
        .max(1)
}

/// Body for successful create and update responses.
#[derive(Serialize)]
struct TaskWithMessage {
    message: &'static str,
    task: Task,
}

/// Body for a successful get.
#[derive(Serialize)]
struct TaskEnvelope {
    task: Task,
}

/// Body for a successful delete.
#[derive(Serialize)]
struct MessageOnly {
    message: &'static str,
}

/// Body for a list page.
#[derive(Serialize)]
struct TaskPage {
    tasks: Vec<Task>,
    /// Count of the tasks in this response, not the table total.
    total_tasks: usize,
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// POST /tasks - create a task.
async fn create_task(
    State(state): State<TaskApi>,
    body: Result<Json<TaskPayload>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let fields = parse_body(body)?.into_new_task()?;
    let task = state.db().insert_task(&fields)?;

    Ok((
        StatusCode::CREATED,
        Json(TaskWithMessage {
            message: "Task created successfully",
            task,
        }),
    ))
}

/// GET /tasks/{id} - fetch a single task.
async fn get_task(
    State(state): State<TaskApi>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let task = state.db().get_task(id)?.ok_or(ApiError::TaskNotFound)?;

    Ok(Json(TaskEnvelope { task }))
}

/// PUT /tasks/{id} - replace all mutable fields of a task.
async fn update_task(
    State(state): State<TaskApi>,
    Path(id): Path<i64>,
    body: Result<Json<TaskPayload>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    // A missing row wins over any body problem, so updating a nonexistent
    // id is 404 even when the body would not validate.
    if state.db().get_task(id)?.is_none() {
        return Err(ApiError::TaskNotFound);
    }

    let fields = parse_body(body)?.into_full_update()?;
    let task = state
        .db()
        .update_task(id, &fields)?
        .ok_or(ApiError::TaskNotFound)?;

    Ok(Json(TaskWithMessage {
        message: "Task updated successfully",
        task,
    }))
}

/// DELETE /tasks/{id} - remove a task.
async fn delete_task(
    State(state): State<TaskApi>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    if !state.db().delete_task(id)? {
        return Err(ApiError::TaskNotFound);
    }

    Ok(Json(MessageOnly {
        message: "Task deleted successfully",
    }))
}

/// GET /tasks - list one page of tasks.
async fn list_tasks(
    State(state): State<TaskApi>,
    Query(params): Query<ListParams>,
) -> ApiResult<impl IntoResponse> {
    let page = params.page();
    let per_page = params.per_page();
    // Saturate so oversized values land past the end instead of overflowing
    let offset = page.saturating_sub(1).saturating_mul(per_page);

    let tasks = state.db().list_page(per_page, offset)?;
    let total_tasks = tasks.len();

    Ok(Json(TaskPage { tasks, total_tasks }))
}

/// Health check endpoint.
async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the axum router with all routes and middleware.
fn build_router(state: TaskApi) -> Router {
    // Permissive CORS for browser-based clients
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/health", get(health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server on the given address.
///
/// Returns a oneshot sender for signaling shutdown, the address the
/// listener actually bound (useful when binding port 0), and the join
/// handle of the serving task.
pub async fn start_server(
    db: Database,
    addr: &str,
) -> anyhow::Result<(oneshot::Sender<()>, SocketAddr, JoinHandle<anyhow::Result<()>>)> {
    let state = TaskApi::new(db);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    info!("Task API listening on http://{}", bound_addr);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("Task API server shutting down");
            })
            .await
            .map_err(anyhow::Error::from)
    });

    Ok((shutdown_tx, bound_addr, server))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "healthy",
            version: "0.1.0",
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("0.1.0"));
    }

    #[test]
    fn test_create_body_defaults_status() {
        let payload = TaskPayload {
            title: Some("write report".to_string()),
            description: Some("quarterly numbers".to_string()),
            due_date: Some("2025-07-01".to_string()),
            status: None,
        };

        let fields = payload.into_new_task().unwrap();
        assert_eq!(fields.status, STATUS_DEFAULT);
    }

    #[test]
    fn test_create_body_treats_empty_status_as_absent() {
        let payload = TaskPayload {
            title: Some("write report".to_string()),
            description: Some("quarterly numbers".to_string()),
            due_date: Some("2025-07-01".to_string()),
            status: Some(String::new()),
        };

        let fields = payload.into_new_task().unwrap();
        assert_eq!(fields.status, STATUS_DEFAULT);
    }

    #[test]
    fn test_create_body_rejects_empty_title() {
        let payload = TaskPayload {
            title: Some(String::new()),
            description: Some("quarterly numbers".to_string()),
            due_date: Some("2025-07-01".to_string()),
            status: None,
        };

        assert!(matches!(
            payload.into_new_task(),
            Err(ApiError::MissingFields)
        ));
    }

    #[test]
    fn test_update_body_requires_status() {
        let payload = TaskPayload {
            title: Some("write report".to_string()),
            description: Some("quarterly numbers".to_string()),
            due_date: Some("2025-07-01".to_string()),
            status: None,
        };

        assert!(matches!(
            payload.into_full_update(),
            Err(ApiError::MissingFields)
        ));
    }

    #[test]
    fn test_list_params_defaults_and_clamping() {
        let params = ListParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.per_page(), 10);

        let params = ListParams {
            page: Some("abc".to_string()),
            per_page: Some("-5".to_string()),
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.per_page(), 1);

        let params = ListParams {
            page: Some("3".to_string()),
            per_page: Some("25".to_string()),
        };
        assert_eq!(params.page(), 3);
        assert_eq!(params.per_page(), 25);
    }
}
