//! HTTP API for the Kanvax client.
//!
//! axum-based JSON API serving the board/list/analytics front-end: store
//! reads and mutations, derived views, snapshot export, and the thin AI
//! proxy routes. All mutations funnel through the shared [`TaskStore`]
//! behind a mutex, so every operation runs to completion before another can
//! observe intermediate state.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::ai::{self, AiError, ChatMessage, GenerateClient, MAX_EXTRACT_INPUT};
use crate::error::ApiError;
use crate::snapshot::Snapshot;
use crate::store::TaskStore;
use crate::store::views::{TaskStats, filtered_tasks, task_stats, tasks_by_status};
use crate::types::{
    FilterPatch, PriorityFilter, Status, StatusFilter, Tag, Task, TaskDraft, TaskFilters,
    TaskPatch, ViewMode,
};

/// Shared server state.
#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<TaskStore>>,
    ai: Option<Arc<dyn GenerateClient>>,
    data_file: Arc<PathBuf>,
}

impl AppState {
    pub fn new(
        store: TaskStore,
        ai: Option<Arc<dyn GenerateClient>>,
        data_file: PathBuf,
    ) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            ai,
            data_file: Arc::new(data_file),
        }
    }

    fn store(&self) -> MutexGuard<'_, TaskStore> {
        // A poisoned lock only means a handler panicked mid-read; the store
        // itself is still structurally valid.
        self.store.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn ai_client(&self) -> Result<&dyn GenerateClient, ApiError> {
        self.ai
            .as_deref()
            .ok_or_else(ApiError::ai_not_configured)
    }

    /// Best-effort persistence after a mutation that touched persisted
    /// fields. Not transactional with the mutation; a failure is logged and
    /// the in-memory state stays authoritative.
    pub fn persist(&self) {
        let snapshot = Snapshot::from_store(&self.store());
        if let Err(e) = snapshot.write_to_file(&self.data_file, false) {
            warn!(path = %self.data_file.display(), error = %e, "failed to persist snapshot");
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        use crate::error::ErrorCode::*;
        let status = match self.code {
            MissingRequiredField | TextTooLong => StatusCode::BAD_REQUEST,
            TaskNotFound => StatusCode::NOT_FOUND,
            AiNotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            UpstreamUnavailable => StatusCode::BAD_GATEWAY,
        };
        (status, Json(serde_json::json!({ "error": self }))).into_response()
    }
}

impl From<AiError> for ApiError {
    fn from(err: AiError) -> Self {
        match err {
            AiError::NotConfigured => ApiError::ai_not_configured(),
            other => ApiError::upstream(other),
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Full client-facing state: collections plus UI state.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StateResponse {
    tasks: Vec<Task>,
    tags: Vec<Tag>,
    filters: TaskFilters,
    view_mode: ViewMode,
    selected_task_id: Option<String>,
    is_adding_task: bool,
    is_editing_task: bool,
    user_name: String,
}

async fn get_state(State(state): State<AppState>) -> Json<StateResponse> {
    let store = state.store();
    Json(StateResponse {
        tasks: store.tasks().to_vec(),
        tags: store.tags().to_vec(),
        filters: store.filters().clone(),
        view_mode: store.view_mode(),
        selected_task_id: store.selected_task_id().map(String::from),
        is_adding_task: store.is_adding_task(),
        is_editing_task: store.is_editing_task(),
        user_name: store.user_name().to_string(),
    })
}

/// Optional per-request overrides on top of the stored filters.
#[derive(Debug, Default, Deserialize)]
struct TaskListQuery {
    search: Option<String>,
    priority: Option<PriorityFilter>,
    status: Option<StatusFilter>,
    /// Comma-separated tag ids.
    tags: Option<String>,
}

impl TaskListQuery {
    fn apply(self, mut filters: TaskFilters) -> TaskFilters {
        if let Some(search) = self.search {
            filters.search = search;
        }
        if let Some(priority) = self.priority {
            filters.priority = priority;
        }
        if let Some(status) = self.status {
            filters.status = status;
        }
        if let Some(tags) = self.tags {
            filters.tags = tags
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
        filters
    }
}

async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<TaskListQuery>,
) -> Json<Vec<Task>> {
    let store = state.store();
    let filters = query.apply(store.filters().clone());
    let tasks: Vec<Task> = filtered_tasks(store.tasks(), &filters)
        .into_iter()
        .cloned()
        .collect();
    Json(tasks)
}

/// The three board columns, filtered by the stored filters.
#[derive(Serialize)]
struct BoardResponse {
    todo: Vec<Task>,
    #[serde(rename = "in-progress")]
    in_progress: Vec<Task>,
    done: Vec<Task>,
}

async fn get_board(State(state): State<AppState>) -> Json<BoardResponse> {
    let store = state.store();
    let filtered = filtered_tasks(store.tasks(), store.filters());
    let groups = tasks_by_status(&filtered);
    Json(BoardResponse {
        todo: groups.todo.into_iter().cloned().collect(),
        in_progress: groups.in_progress.into_iter().cloned().collect(),
        done: groups.done.into_iter().cloned().collect(),
    })
}

async fn get_stats(State(state): State<AppState>) -> Json<TaskStats> {
    let store = state.store();
    Json(task_stats(store.tasks()))
}

async fn create_task(
    State(state): State<AppState>,
    Json(draft): Json<TaskDraft>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    // Title validation lives here, at the form boundary; the store itself
    // is deliberately permissive.
    if draft.title.trim().is_empty() {
        return Err(ApiError::missing_field("title"));
    }
    let task = state.store().add_task(draft).clone();
    state.persist();
    Ok((StatusCode::CREATED, Json(task)))
}

async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<Task>, ApiError> {
    let updated = {
        let mut store = state.store();
        if !store.update_task(&id, patch) {
            return Err(ApiError::task_not_found(&id));
        }
        store.get_task(&id).cloned()
    };
    state.persist();
    updated.map(Json).ok_or_else(|| ApiError::task_not_found(&id))
}

#[derive(Serialize)]
struct DeletedResponse {
    deleted: bool,
}

async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<DeletedResponse> {
    let deleted = state.store().delete_task(&id);
    if deleted {
        state.persist();
    }
    Json(DeletedResponse { deleted })
}

#[derive(Deserialize)]
struct MoveRequest {
    status: Status,
}

async fn move_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<Task>, ApiError> {
    let moved = {
        let mut store = state.store();
        if !store.move_task(&id, req.status) {
            return Err(ApiError::task_not_found(&id));
        }
        store.get_task(&id).cloned()
    };
    state.persist();
    moved.map(Json).ok_or_else(|| ApiError::task_not_found(&id))
}

async fn restore_task(State(state): State<AppState>) -> Json<Option<Task>> {
    let restored = state.store().restore_task().cloned();
    if restored.is_some() {
        state.persist();
    }
    Json(restored)
}

async fn list_tags(State(state): State<AppState>) -> Json<Vec<Tag>> {
    Json(state.store().tags().to_vec())
}

#[derive(Deserialize)]
struct TagDraft {
    name: String,
    color: String,
}

async fn create_tag(
    State(state): State<AppState>,
    Json(draft): Json<TagDraft>,
) -> Result<(StatusCode, Json<Tag>), ApiError> {
    if draft.name.trim().is_empty() {
        return Err(ApiError::missing_field("name"));
    }
    let tag = state.store().add_tag(draft.name, draft.color).clone();
    state.persist();
    Ok((StatusCode::CREATED, Json(tag)))
}

async fn delete_tag(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<DeletedResponse> {
    let deleted = state.store().delete_tag(&id);
    if deleted {
        state.persist();
    }
    Json(DeletedResponse { deleted })
}

async fn set_filters(
    State(state): State<AppState>,
    Json(patch): Json<FilterPatch>,
) -> Json<TaskFilters> {
    let mut store = state.store();
    store.set_filters(patch);
    Json(store.filters().clone())
}

async fn reset_filters(State(state): State<AppState>) -> Json<TaskFilters> {
    let mut store = state.store();
    store.reset_filters();
    Json(store.filters().clone())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ViewModeRequest {
    view_mode: ViewMode,
}

async fn set_view_mode(
    State(state): State<AppState>,
    Json(req): Json<ViewModeRequest>,
) -> StatusCode {
    state.store().set_view_mode(req.view_mode);
    state.persist();
    StatusCode::NO_CONTENT
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SelectionRequest {
    task_id: Option<String>,
}

/// Selection is a weak reference: a stale id is accepted and simply fails
/// to resolve later.
async fn set_selection(
    State(state): State<AppState>,
    Json(req): Json<SelectionRequest>,
) -> StatusCode {
    state.store().set_selected_task(req.task_id);
    StatusCode::NO_CONTENT
}

#[derive(Deserialize)]
struct UserRequest {
    name: String,
}

async fn set_user(State(state): State<AppState>, Json(req): Json<UserRequest>) -> StatusCode {
    state.store().set_user_name(req.name);
    state.persist();
    StatusCode::NO_CONTENT
}

/// Backup download: the persisted snapshot document as JSON.
async fn export(State(state): State<AppState>) -> Json<Snapshot> {
    Json(Snapshot::from_store(&state.store()))
}

// AI proxy routes. These never mutate the store; extraction results come
// back to the client for review and re-enter through POST /api/tasks.

#[derive(Deserialize)]
struct ExtractRequest {
    text: String,
}

async fn ai_extract_tasks(
    State(state): State<AppState>,
    Json(req): Json<ExtractRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if req.text.trim().is_empty() {
        return Err(ApiError::missing_field("text"));
    }
    if req.text.len() > MAX_EXTRACT_INPUT {
        return Err(ApiError::text_too_long("text", MAX_EXTRACT_INPUT));
    }
    let client = state.ai_client()?;
    let tasks = ai::extract_tasks(client, &req.text).await?;
    Ok(Json(serde_json::json!({ "tasks": tasks })))
}

#[derive(Deserialize)]
struct EnhanceRequest {
    title: String,
    #[serde(default)]
    description: String,
}

async fn ai_enhance(
    State(state): State<AppState>,
    Json(req): Json<EnhanceRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if req.title.trim().is_empty() {
        return Err(ApiError::missing_field("title"));
    }
    let client = state.ai_client()?;
    let enhanced = ai::enhance_description(client, &req.title, &req.description).await?;
    Ok(Json(serde_json::json!({ "enhanced": enhanced })))
}

async fn ai_breakdown(
    State(state): State<AppState>,
    Json(req): Json<EnhanceRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if req.title.trim().is_empty() {
        return Err(ApiError::missing_field("title"));
    }
    let client = state.ai_client()?;
    let breakdown = ai::breakdown_task(client, &req.title, &req.description).await?;
    Ok(Json(serde_json::json!({ "breakdown": breakdown })))
}

/// Insights are infallible: upstream failure degrades to locally computed
/// fallback text instead of an error.
async fn ai_insights(State(state): State<AppState>) -> Json<serde_json::Value> {
    let tasks: Vec<Task> = state.store().tasks().to_vec();
    let insights = ai::generate_insights(state.ai.as_deref(), &tasks).await;
    Json(serde_json::json!({ "insights": insights }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequest {
    messages: Vec<ChatMessage>,
    task_context: Option<String>,
}

async fn ai_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if req.messages.is_empty() {
        return Err(ApiError::missing_field("messages"));
    }
    let context = match req.task_context {
        Some(context) => context,
        None => ai::summarize_tasks(state.store().tasks()),
    };
    let client = state.ai_client()?;
    let response = ai::chat(client, &req.messages, &context).await?;
    Ok(Json(serde_json::json!({ "response": response })))
}

/// Build the router with all routes.
pub fn build_router(state: AppState) -> Router {
    // Permissive CORS: the front-end dev server runs on its own origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health))
        .route("/api/state", get(get_state))
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route(
            "/api/tasks/{id}",
            axum::routing::patch(update_task).delete(delete_task),
        )
        .route("/api/tasks/{id}/move", post(move_task))
        .route("/api/tasks/restore", post(restore_task))
        .route("/api/board", get(get_board))
        .route("/api/stats", get(get_stats))
        .route("/api/tags", get(list_tags).post(create_tag))
        .route("/api/tags/{id}", delete(delete_tag))
        .route("/api/ui/filters", put(set_filters).delete(reset_filters))
        .route("/api/ui/view-mode", put(set_view_mode))
        .route("/api/ui/selection", put(set_selection))
        .route("/api/user", put(set_user))
        .route("/api/export", get(export))
        .route("/api/ai/extract-tasks", post(ai_extract_tasks))
        .route("/api/ai/enhance", post(ai_enhance))
        .route("/api/ai/breakdown", post(ai_breakdown))
        .route("/api/ai/insights", post(ai_insights))
        .route("/api/ai/chat", post(ai_chat))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server on the specified port.
///
/// Returns a shutdown sender for graceful termination and the actual bound
/// address.
pub async fn start_server(
    state: AppState,
    port: u16,
) -> anyhow::Result<(oneshot::Sender<()>, SocketAddr)> {
    let app = build_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    info!("Kanvax API listening on http://{}", bound_addr);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("API server shutting down");
            })
            .await
        {
            tracing::error!("API server error: {}", e);
        }
    });

    Ok((shutdown_tx, bound_addr))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_error_constructor_maps_to_a_status() {
        assert_eq!(
            ApiError::missing_field("title").into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::text_too_long("text", 10).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::task_not_found("t1").into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::ai_not_configured().into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::upstream("connection refused")
                .into_response()
                .status(),
            StatusCode::BAD_GATEWAY
        );
    }
}
