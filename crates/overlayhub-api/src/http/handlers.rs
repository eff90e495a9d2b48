//! REST handlers.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use overlayhub_protocols::analysis::PageAnalysis;
use overlayhub_protocols::command::{CommandContext, HistoryEntry};
use overlayhub_protocols::extension::ExtensionManifest;
use overlayhub_protocols::peer::PeerInfo;
use overlayhub_protocols::schema::CommandSchema;

use crate::error::ApiError;
use crate::hub::Delivery;
use crate::pipeline::submit_command;
use crate::state::AppState;

const DEFAULT_HISTORY_LIMIT: usize = 50;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    /// Connected peers, identified or not.
    pub clients: usize,
    pub browser_connected: bool,
    pub extensions: usize,
    pub commands_processed: usize,
    pub dropped_messages: u64,
    pub provider: String,
}

pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.uptime().as_secs(),
        clients: state.hub.peer_count(),
        browser_connected: state.hub.has_primary(),
        extensions: state.extensions.list().await.len(),
        commands_processed: state.processor.history().len(),
        dropped_messages: state.hub.dropped_messages(),
        provider: state.provider.id().to_string(),
    })
}

#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub status: &'static str,
    pub id: String,
    pub action: String,
    pub delivery: Delivery,
}

/// Submit a raw command. Validation failures map to 400, security rejections to 403.
pub async fn submit(
    State(state): State<Arc<AppState>>,
    Json(raw): Json<Value>,
) -> Result<Json<CommandResponse>, ApiError> {
    let context = CommandContext::new("http").with_metadata("transport", "http");
    let accepted = submit_command(&state, raw, &context).await?;
    info!("HTTP command {} accepted", accepted.command.id);
    Ok(Json(CommandResponse {
        status: "accepted",
        action: accepted.command.action().to_string(),
        id: accepted.command.id,
        delivery: accepted.delivery,
    }))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub count: usize,
    pub entries: Vec<HistoryEntry>,
}

pub async fn history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> Json<HistoryResponse> {
    let entries = state
        .processor
        .history()
        .recent(query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT));
    Json(HistoryResponse {
        count: entries.len(),
        entries,
    })
}

pub async fn schemas(State(state): State<Arc<AppState>>) -> Json<BTreeMap<String, CommandSchema>> {
    Json(state.processor.schemas().catalog())
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    /// Base64 screenshot.
    pub image: String,
    pub prompt: Option<String>,
}

pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<PageAnalysis>, ApiError> {
    if request.image.is_empty() {
        return Err(ApiError::BadRequest("image must not be empty".into()));
    }
    let prompt = request.prompt.as_deref().or_else(|| state.prompt());
    let analysis = state.provider.analyze_image(&request.image, prompt).await?;
    Ok(Json(analysis))
}

pub async fn extensions(State(state): State<Arc<AppState>>) -> Json<Vec<ExtensionManifest>> {
    Json(state.extensions.list().await)
}

#[derive(Debug, Serialize)]
pub struct PeersResponse {
    pub count: usize,
    pub primary: Option<String>,
    pub peers: Vec<PeerInfo>,
}

pub async fn peers(State(state): State<Arc<AppState>>) -> Json<PeersResponse> {
    let peers = state.hub.peers();
    Json(PeersResponse {
        count: peers.len(),
        primary: state.hub.primary(),
        peers,
    })
}

#[cfg(test)]
#[path = "handlers_tests.rs"]
mod tests;
