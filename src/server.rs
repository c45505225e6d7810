//! HTTP surface over the knowledge base and the answer composer.
//!
//! [`router`] exposes entry CRUD (`/qa_kb`), the system prompt setting
//! (`/ai_settings`) and question answering (`/ai_test`). [`serve`] wires up the
//! database and generator from config and runs the router until ctrl-c.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::json;

use crate::config::KbqaConfig;
use crate::db;
use crate::kb::types::{EntryPage, SystemPromptSetting};
use crate::kb::{self, KbError, SqliteKnowledgeSource};
use crate::llm;
use crate::qa::answer::{AnswerResult, QaService};

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
    qa: Arc<QaService>,
}

impl AppState {
    pub fn new(db: Connection, qa: QaService) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            qa: Arc::new(qa),
        }
    }
}

/// Error body: `{"detail": "..."}`.
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }

    fn internal(detail: impl std::fmt::Display) -> Self {
        tracing::error!(error = %detail, "request failed");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: detail.to_string(),
        }
    }
}

impl From<KbError> for ApiError {
    fn from(e: KbError) -> Self {
        match e {
            KbError::InvalidInput(msg) => Self::bad_request(msg),
            KbError::NotFound(_) => Self {
                status: StatusCode::NOT_FOUND,
                detail: e.to_string(),
            },
            KbError::Database(err) => Self::internal(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

/// Run a synchronous DB closure on the blocking pool.
async fn with_db<T, E, F>(state: &AppState, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    E: Into<ApiError> + Send + 'static,
    F: FnOnce(&Connection) -> Result<T, E> + Send + 'static,
{
    let db = Arc::clone(&state.db);
    tokio::task::spawn_blocking(move || {
        let conn = db
            .lock()
            .map_err(|e| ApiError::internal(format!("db lock poisoned: {e}")))?;
        f(&*conn).map_err(Into::into)
    })
    .await
    .map_err(|e| ApiError::internal(format!("db task failed: {e}")))?
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self::internal(e)
    }
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    offset: i64,
    #[serde(default)]
    limit: i64,
}

#[derive(Debug, Deserialize)]
pub struct EntryPayload {
    #[serde(default)]
    question: String,
    #[serde(default)]
    answer: String,
}

#[derive(Debug, Deserialize)]
pub struct SettingsPayload {
    #[serde(default)]
    system: String,
}

#[derive(Debug, Deserialize)]
pub struct AskPayload {
    #[serde(default)]
    question: String,
    system: Option<String>,
}

async fn list_entries(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Json<EntryPage> {
    let page = with_db(&state, move |conn| {
        kb::store::list_page(conn, params.offset, params.limit)
    })
    .await;
    // Listing degrades to an empty page rather than an error status.
    Json(page.unwrap_or(EntryPage {
        items: Vec::new(),
        total: 0,
    }))
}

async fn create_entry(
    State(state): State<AppState>,
    Json(payload): Json<EntryPayload>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = with_db(&state, move |conn| {
        kb::store::create_entry(conn, &payload.question, &payload.answer)
    })
    .await?;
    Ok(Json(json!({ "success": true, "id": id })))
}

async fn update_entry(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<EntryPayload>,
) -> Result<Json<serde_json::Value>, ApiError> {
    with_db(&state, move |conn| {
        kb::store::update_entry(conn, id, &payload.question, &payload.answer)
    })
    .await?;
    Ok(Json(json!({ "success": true })))
}

async fn delete_entry(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    with_db(&state, move |conn| kb::store::delete_entry(conn, id)).await?;
    Ok(Json(json!({ "success": true })))
}

async fn get_settings(
    State(state): State<AppState>,
) -> Result<Json<SystemPromptSetting>, ApiError> {
    let setting = with_db(&state, |conn| kb::settings::latest_system_prompt(conn)).await?;
    Ok(Json(setting.unwrap_or(SystemPromptSetting {
        system: String::new(),
        updated_at: None,
    })))
}

async fn put_settings(
    State(state): State<AppState>,
    Json(payload): Json<SettingsPayload>,
) -> Result<Json<serde_json::Value>, ApiError> {
    with_db(&state, move |conn| {
        kb::settings::set_system_prompt(conn, &payload.system)
    })
    .await?;
    Ok(Json(json!({ "success": true })))
}

async fn ask(
    State(state): State<AppState>,
    Json(payload): Json<AskPayload>,
) -> Result<Json<AnswerResult>, ApiError> {
    if payload.question.trim().is_empty() {
        return Err(ApiError::bad_request("请输入问题"));
    }

    // Retrieval and the model call both block.
    let qa = Arc::clone(&state.qa);
    let result = tokio::task::spawn_blocking(move || {
        qa.answer_question(&payload.question, payload.system.as_deref())
    })
    .await
    .map_err(|e| ApiError::internal(format!("answer task failed: {e}")))?;

    Ok(Json(result))
}

/// Build the router over `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/qa_kb", get(list_entries).post(create_entry))
        .route("/qa_kb/{id}", put(update_entry).delete(delete_entry))
        .route("/ai_settings", get(get_settings).put(put_settings))
        .route("/ai_test", post(ask))
        .with_state(state)
}

/// Build a [`QaService`] reading from the database at `db_path`.
pub fn build_qa_service(config: &KbqaConfig, db_path: PathBuf) -> QaService {
    QaService::new(
        Box::new(SqliteKnowledgeSource::new(db_path)),
        llm::create_generator(&config.llm),
        config.retrieval.clone(),
    )
}

/// Start the HTTP server on `server.host:server.port`.
pub async fn serve(config: KbqaConfig) -> Result<()> {
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);

    let db_path = config.resolved_db_path();
    let conn = db::open_database(&db_path)?;
    tracing::info!(db = %db_path.display(), "database ready");

    let qa = build_qa_service(&config, db_path);
    let app = router(AppState::new(conn, qa));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "listening at http://{bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
            }
            tracing::info!("shutting down HTTP server");
        })
        .await?;

    Ok(())
}
