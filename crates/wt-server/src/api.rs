//! Route handlers and status-snapshot assembly.
//!
//! Every endpoint answers with the same body: a [`StatusSnapshot`] for
//! the requesting user and the current UTC day, recomputed from the
//! event log on each request. Client input errors map to 400 with an
//! `{"error": ...}` body and never touch the store; storage failures
//! map to a generic 500.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use wt_core::{EventKind, StatusSnapshot, Username, summarize_day};
use wt_db::{Database, DbError};

/// Shared state for all handlers.
///
/// Holds only the database path: each request opens its own connection
/// (see [`with_db`]), so there is no cross-request mutable state.
#[derive(Debug, Clone)]
pub struct AppState {
    database_path: Arc<PathBuf>,
}

impl AppState {
    /// Creates state pointing at the given database file.
    #[must_use]
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            database_path: Arc::new(database_path),
        }
    }
}

/// Errors surfaced to API clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request was malformed; nothing was recorded.
    #[error("{0}")]
    BadRequest(String),
    /// Storage or infrastructure failure.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        Self::Internal(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": message })),
            )
                .into_response(),
            Self::Internal(err) => {
                tracing::error!(error = ?err, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "internal server error" })),
                )
                    .into_response()
            }
        }
    }
}

/// Builds the application router.
///
/// CORS is fully permissive: the API carries no credentials and any
/// origin may call it.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/login", post(login))
        .route("/event", post(record_event))
        .route("/status/{username}", get(status))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Runs blocking database work on the blocking pool with a
/// request-scoped connection.
async fn with_db<T, F>(state: AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&mut Database) -> Result<T, DbError> + Send + 'static,
    T: Send + 'static,
{
    let result = tokio::task::spawn_blocking(move || {
        let mut db = Database::open(&state.database_path)?;
        f(&mut db)
    })
    .await
    .context("database task panicked")?;
    result.map_err(ApiError::from)
}

/// Queries today's events and folds them into a snapshot.
fn snapshot_now(db: &Database, username: &Username) -> Result<StatusSnapshot, DbError> {
    let now = Utc::now();
    let day = now.date_naive();
    let events = db.events_for_day(username, day)?;
    let summary = summarize_day(&events, now);
    Ok(StatusSnapshot::new(username.clone(), day, summary))
}

async fn index() -> Json<serde_json::Value> {
    Json(json!({
        "service": "wt-server",
        "endpoints": ["/login", "/event", "/status/{username}"],
    }))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    #[serde(default)]
    username: String,
}

/// Mock login: no authentication, any username implicitly exists.
/// Returns the user's current snapshot so clients can render
/// immediately.
async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<StatusSnapshot>, ApiError> {
    let Json(request) = payload.map_err(bad_request)?;
    let username = Username::new(request.username)
        .map_err(|_| ApiError::BadRequest("Username is required".to_string()))?;
    tracing::info!(user = %username, "login");
    let snapshot = with_db(state, move |db| snapshot_now(db, &username)).await?;
    Ok(Json(snapshot))
}

#[derive(Debug, Deserialize)]
struct EventRequest {
    #[serde(default)]
    username: String,
    /// Parsed by the closed [`EventKind`] enum: unknown strings are
    /// rejected during deserialization with a message enumerating the
    /// valid values.
    #[serde(default)]
    event_type: Option<EventKind>,
}

/// Appends one event, then returns the updated snapshot.
///
/// No validation against the user's prior event is performed: any kind
/// may follow any kind. The append is committed before the snapshot is
/// recomputed.
async fn record_event(
    State(state): State<AppState>,
    payload: Result<Json<EventRequest>, JsonRejection>,
) -> Result<Json<StatusSnapshot>, ApiError> {
    let Json(request) = payload.map_err(bad_request)?;
    let (Ok(username), Some(kind)) = (Username::new(request.username), request.event_type) else {
        return Err(ApiError::BadRequest(
            "Username and event_type are required".to_string(),
        ));
    };
    let snapshot = with_db(state, move |db| {
        db.append_event(&username, kind)?;
        snapshot_now(db, &username)
    })
    .await?;
    Ok(Json(snapshot))
}

/// Current snapshot for a user, for today.
async fn status(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<StatusSnapshot>, ApiError> {
    let username = Username::new(username)
        .map_err(|_| ApiError::BadRequest("Username is required".to_string()))?;
    let snapshot = with_db(state, move |db| snapshot_now(db, &username)).await?;
    Ok(Json(snapshot))
}

fn bad_request(rejection: JsonRejection) -> ApiError {
    ApiError::BadRequest(rejection.body_text())
}
