//! Handlers for the message types the hub understands.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use overlayhub_analysis::dom::{analyze_dom, find_interesting_elements, DomSnapshot};
use overlayhub_analysis::{planner, voice};
use overlayhub_protocols::analysis::PageAnalysis;
use overlayhub_protocols::command::CommandContext;
use overlayhub_protocols::error::{AnalysisError, HubError};
use overlayhub_protocols::hook::names;
use overlayhub_protocols::peer::{PeerRole, RoleFilter};

use super::MessageHandler;
use crate::pipeline::{report_error, submit_command};
use crate::state::AppState;

/// Reports a DOM surface sends back after applying a command.
pub const DOM_REPORT_TYPES: [&str; 5] = [
    "element_clicked",
    "element_highlighted",
    "element_info",
    "dom_changed",
    "all_manipulations_cleared",
];

fn str_field<'a>(message: &'a Value, key: &str) -> Option<&'a str> {
    message.get(key).and_then(Value::as_str)
}

fn timestamp_or_now(message: &Value) -> Value {
    match message.get("timestamp") {
        Some(ts) if !ts.is_null() => ts.clone(),
        _ => json!(Utc::now().timestamp_millis()),
    }
}

/// Push planned commands through the pipeline on behalf of the hub.
async fn submit_planned(state: &AppState, peer: &str, commands: Vec<Value>) -> usize {
    let context = CommandContext::new("analysis").with_metadata("peer", peer);
    let mut accepted = 0;
    for command in commands {
        match submit_command(state, command, &context).await {
            Ok(_) => accepted += 1,
            Err(e) => warn!("Planned command rejected: {}", e),
        }
    }
    accepted
}

/// Runs once a peer identifies itself. Classification already happened.
pub struct IdentifyHandler;

#[async_trait]
impl MessageHandler for IdentifyHandler {
    async fn handle(&self, state: &AppState, peer: &str, message: Value) -> Result<(), HubError> {
        let is_primary_browser = state.hub.role(peer) == Some(PeerRole::Browser)
            && state.hub.primary().as_deref() == Some(peer);
        if is_primary_browser {
            let info = message.get("config").cloned().unwrap_or(Value::Null);
            state.hub.broadcast(
                &json!({"type": "browser_connected", "info": info}),
                RoleFilter::Role(PeerRole::Control),
            );
        }
        Ok(())
    }
}

pub struct PingHandler;

#[async_trait]
impl MessageHandler for PingHandler {
    async fn handle(&self, state: &AppState, peer: &str, message: Value) -> Result<(), HubError> {
        state.hub.send(
            peer,
            &json!({"type": "pong", "timestamp": timestamp_or_now(&message)}),
        );
        Ok(())
    }
}

/// Analyse a screenshot, draw the result and tell the control panels.
pub struct ScreenshotHandler;

#[async_trait]
impl MessageHandler for ScreenshotHandler {
    async fn handle(&self, state: &AppState, peer: &str, message: Value) -> Result<(), HubError> {
        let image = str_field(&message, "data")
            .ok_or_else(|| HubError::InvalidMessage("screenshot needs image data".into()))?;
        let url = str_field(&message, "url").map(str::to_string);
        let timestamp = timestamp_or_now(&message);

        state
            .hooks
            .fire(
                names::SCREENSHOT_TAKEN,
                json!({"url": url, "timestamp": timestamp, "peer": peer}),
            )
            .await;

        let cached = url.as_deref().and_then(|u| state.cached_analysis(u));
        let analysis = match cached {
            Some(analysis) => {
                debug!("Reusing cached analysis for {:?}", url);
                analysis
            }
            None => {
                let analysis = state
                    .provider
                    .analyze_image(image, state.prompt())
                    .await
                    .map_err(|e| HubError::Handler(e.to_string()))?;
                if let Some(url) = &url {
                    state.cache_analysis(url.clone(), analysis.clone());
                }
                analysis
            }
        };

        let completed = state
            .hooks
            .fire(
                names::ANALYSIS_COMPLETE,
                json!({"analysis": analysis, "url": url, "source": "screenshot"}),
            )
            .await;

        let commands = planner::overlay_commands(&analysis);
        let accepted = submit_planned(state, peer, commands.clone()).await;
        info!("Screenshot analysed: {} of {} overlay commands accepted", accepted, commands.len());

        let mut report = json!({
            "type": "screenshot_analysis",
            "analysis": completed.get("analysis").cloned().unwrap_or_else(|| json!(analysis)),
            "commands": commands,
            "url": url,
            "timestamp": timestamp,
        });
        if let Some(accessibility) = completed.get("accessibilityReport") {
            report["accessibilityReport"] = accessibility.clone();
        }
        state.hub.broadcast(&report, RoleFilter::Role(PeerRole::Control));
        Ok(())
    }
}

/// Summarise a DOM snapshot, highlight what matters, tell the control panels.
pub struct DomDataHandler;

#[async_trait]
impl MessageHandler for DomDataHandler {
    async fn handle(&self, state: &AppState, peer: &str, message: Value) -> Result<(), HubError> {
        let data = message.get("data").cloned().unwrap_or(Value::Null);
        let snapshot: DomSnapshot = serde_json::from_value(data)
            .map_err(|e| HubError::InvalidMessage(format!("invalid dom_data payload: {}", e)))?;
        let analysis = analyze_dom(&snapshot);

        let images_without_alt = analysis
            .images
            .len()
            .saturating_sub(analysis.accessibility.has_alt_text);
        state
            .hooks
            .fire(
                names::DOM_READY,
                json!({
                    "url": snapshot.url,
                    "title": snapshot.title,
                    "elementCount": analysis.structure.element_count,
                    "formCount": analysis.forms.len(),
                    "headingCount": analysis.headings.len(),
                    "imageCount": analysis.images.len(),
                    "imagesWithoutAlt": images_without_alt,
                }),
            )
            .await;

        let interesting = find_interesting_elements(&analysis);
        submit_planned(state, peer, planner::highlight_commands(&interesting)).await;

        state.hub.broadcast(
            &json!({
                "type": "dom_analysis",
                "analysis": analysis,
                "interestingElements": interesting,
                "url": snapshot.url,
                "timestamp": timestamp_or_now(&message),
            }),
            RoleFilter::Role(PeerRole::Control),
        );
        Ok(())
    }
}

/// New page in the browser: forget cached analyses and tell everyone.
pub struct PageNavigatedHandler;

#[async_trait]
impl MessageHandler for PageNavigatedHandler {
    async fn handle(
        &self,
        state: &AppState,
        _peer: &str,
        mut message: Value,
    ) -> Result<(), HubError> {
        state.clear_analysis_cache();

        let timestamp = timestamp_or_now(&message);
        if let Some(fields) = message.as_object_mut() {
            fields.remove("type");
        }
        let page = state.hooks.fire(names::PAGE_LOAD, message).await;

        let mut notice = json!({
            "type": "page_navigated",
            "url": page.get("url").cloned().unwrap_or(Value::Null),
            "timestamp": timestamp,
        });
        if let Some(issues) = page.get("accessibilityIssues") {
            notice["accessibilityIssues"] = issues.clone();
        }
        state.hub.broadcast(&notice, RoleFilter::All);
        Ok(())
    }
}

/// On-demand analysis of a screenshot, DOM snapshot or text.
pub struct RequestAnalysisHandler;

impl RequestAnalysisHandler {
    async fn analyze(
        state: &AppState,
        kind: &str,
        message: &Value,
    ) -> Result<Value, AnalysisError> {
        let data = message.get("data").cloned().unwrap_or(Value::Null);
        let prompt = str_field(message, "prompt").or_else(|| state.prompt());

        match kind {
            "screenshot" => {
                let image = data.as_str().ok_or_else(|| {
                    AnalysisError::InvalidResponse("screenshot data must be a string".into())
                })?;
                let analysis: PageAnalysis = state.provider.analyze_image(image, prompt).await?;
                let completed = state
                    .hooks
                    .fire(
                        names::ANALYSIS_COMPLETE,
                        json!({"analysis": analysis, "source": "request"}),
                    )
                    .await;
                Ok(completed.get("analysis").cloned().unwrap_or_else(|| json!(analysis)))
            }
            "dom" => {
                let snapshot: DomSnapshot = serde_json::from_value(data)
                    .map_err(|e| AnalysisError::InvalidResponse(e.to_string()))?;
                serde_json::to_value(analyze_dom(&snapshot))
                    .map_err(|e| AnalysisError::InvalidResponse(e.to_string()))
            }
            "text" => {
                let text = data.as_str().unwrap_or_default();
                state.provider.analyze_text(text, prompt).await
            }
            other => Err(AnalysisError::Unsupported(other.to_string())),
        }
    }
}

#[async_trait]
impl MessageHandler for RequestAnalysisHandler {
    async fn handle(&self, state: &AppState, peer: &str, message: Value) -> Result<(), HubError> {
        let request_id = message
            .get("request_id")
            .or_else(|| message.get("requestId"))
            .cloned()
            .unwrap_or(Value::Null);
        let kind = str_field(&message, "kind")
            .or_else(|| str_field(&message, "analysis_type"))
            .unwrap_or_default()
            .to_string();

        let reply = match Self::analyze(state, &kind, &message).await {
            Ok(analysis) => json!({
                "type": "analysis_result",
                "analysis": analysis,
                "request_id": request_id,
            }),
            Err(e) => {
                report_error(state, "analysis", &e.to_string(), peer).await;
                json!({
                    "type": "analysis_error",
                    "error": e.to_string(),
                    "request_id": request_id,
                })
            }
        };
        state.hub.send(peer, &reply);
        Ok(())
    }
}

/// Turn a spoken phrase into a command and run it.
pub struct VoiceCommandHandler;

#[async_trait]
impl MessageHandler for VoiceCommandHandler {
    async fn handle(&self, state: &AppState, peer: &str, message: Value) -> Result<(), HubError> {
        let transcript =
            str_field(&message, "command").or_else(|| str_field(&message, "transcript"));
        let Some(transcript) = transcript else {
            state.hub.send(
                peer,
                &json!({
                    "type": "voice_command_error",
                    "error": "voice_command needs a command",
                    "command": Value::Null,
                }),
            );
            return Ok(());
        };

        let processed = voice::interpret(transcript);
        let context = CommandContext::new(peer)
            .with_role(state.hub.role(peer).unwrap_or(PeerRole::Unknown))
            .with_metadata("transport", "voice");

        let reply = match submit_command(state, processed, &context).await {
            Ok(accepted) => json!({
                "type": "voice_command_processed",
                "original": transcript,
                "processed": accepted.command.to_value(),
                "delivery": accepted.delivery,
                "timestamp": Utc::now().timestamp_millis(),
            }),
            Err(e) => json!({
                "type": "voice_command_error",
                "error": e.to_string(),
                "command": transcript,
            }),
        };
        state.hub.send(peer, &reply);
        Ok(())
    }
}

/// DOM surface reports are announced on the hook and relayed to control.
pub struct DomReportHandler;

#[async_trait]
impl MessageHandler for DomReportHandler {
    async fn handle(&self, state: &AppState, peer: &str, message: Value) -> Result<(), HubError> {
        state
            .hooks
            .fire(
                names::DOM_MANIPULATION,
                json!({"report": message, "peer": peer}),
            )
            .await;
        state.hub.broadcast(&message, RoleFilter::Role(PeerRole::Control));
        Ok(())
    }
}
