//! HTTP Control API. Handlers deserialize, call into `fleet_core`, and
//! serialize the result; the error envelope wraps `fleet_core::ErrorCode`.
//! Routes are thin: all business logic lives in `fleet_core`.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use fleet_core::error::CoreError;
use fleet_core::model::{InboxMessage, MessageStatus, OutputMode, ProviderKind, Terminal};
use fleet_core::store::MetadataStore;
use fleet_core::terminal_service::TerminalService;

/// Shared handler state: the two collaborators routes are allowed to reach
/// into directly.
pub struct AppState {
    pub terminals: Arc<TerminalService>,
    pub store: Arc<MetadataStore>,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/terminals", post(create_terminal).get(list_terminals))
        .route("/terminals/{id}", get(get_terminal).delete(delete_terminal))
        .route("/terminals/{id}/output", get(get_output))
        .route("/terminals/{id}/inbox", get(list_inbox))
        .route("/inbox", post(enqueue_message))
        .route("/sessions", get(list_sessions))
        .route("/sessions/{session}/terminals", get(list_session_terminals))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// -- Error envelope -----------------------------------------------------------

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

/// Wraps [`CoreError`] so it can implement [`IntoResponse`] (orphan rule —
/// neither type lives in this crate).
pub struct ApiError(CoreError);

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.code();
        let status = StatusCode::from_u16(code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorResponse { error: ErrorBody { code: code.as_str().to_string(), message: self.0.to_string() } };
        (status, Json(body)).into_response()
    }
}

// -- Types --------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreateTerminalRequest {
    pub agent_profile: String,
    pub provider_kind: Option<String>,
    pub session_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TerminalResponse {
    pub id: String,
    pub session_name: String,
    pub window_name: String,
    pub provider_kind: String,
    pub agent_profile: Option<String>,
}

impl From<Terminal> for TerminalResponse {
    fn from(t: Terminal) -> Self {
        Self {
            id: t.id,
            session_name: t.session,
            window_name: t.window,
            provider_kind: t.provider_kind.as_str().to_string(),
            agent_profile: t.agent_profile,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    pub graceful: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct OutputQuery {
    pub mode: Option<OutputMode>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OutputResponse {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct InboxQuery {
    pub status: Option<MessageStatus>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct EnqueueRequest {
    pub sender_id: String,
    pub receiver_id: String,
    pub body: String,
}

// -- Handlers -----------------------------------------------------------------

/// `GET /healthz`
pub async fn healthz() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// `POST /terminals`
pub async fn create_terminal(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTerminalRequest>,
) -> Result<(StatusCode, Json<TerminalResponse>), ApiError> {
    let kind = req.provider_kind.as_deref().map(ProviderKind::parse).unwrap_or(ProviderKind::Codex);
    let terminal = state.terminals.create_terminal(kind, Some(req.agent_profile), req.session_name).await?;
    Ok((StatusCode::CREATED, Json(terminal.into())))
}

/// `GET /terminals`
pub async fn list_terminals(State(state): State<Arc<AppState>>) -> Json<Vec<TerminalResponse>> {
    Json(state.terminals.list_terminals().into_iter().map(TerminalResponse::from).collect())
}

/// `GET /terminals/{id}`
pub async fn get_terminal(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Result<Json<TerminalResponse>, ApiError> {
    Ok(Json(state.terminals.get_terminal(&id)?.into()))
}

/// `DELETE /terminals/{id}`
pub async fn delete_terminal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> Result<StatusCode, ApiError> {
    state.terminals.destroy_terminal(&id, query.graceful.unwrap_or(true)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /terminals/{id}/output`
pub async fn get_output(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<OutputQuery>,
) -> Result<Json<OutputResponse>, ApiError> {
    let mode = query.mode.unwrap_or(OutputMode::Recent);
    let content = state.terminals.get_output(&id, mode).await?;
    Ok(Json(OutputResponse { content }))
}

/// `GET /terminals/{id}/inbox`
pub async fn list_inbox(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<InboxQuery>,
) -> Json<Vec<InboxMessage>> {
    Json(state.store.list_messages(&id, query.status, query.limit))
}

/// `POST /inbox`
pub async fn enqueue_message(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EnqueueRequest>,
) -> Result<(StatusCode, Json<InboxMessage>), ApiError> {
    let message = InboxMessage::new(req.sender_id, req.receiver_id, req.body);
    state.store.enqueue_message(message.clone())?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// `GET /sessions`
pub async fn list_sessions(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.terminals.list_sessions())
}

/// `GET /sessions/{session}/terminals`
pub async fn list_session_terminals(
    State(state): State<Arc<AppState>>,
    Path(session): Path<String>,
) -> Json<Vec<TerminalResponse>> {
    Json(state.terminals.list_session_terminals(&session).into_iter().map(TerminalResponse::from).collect())
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
