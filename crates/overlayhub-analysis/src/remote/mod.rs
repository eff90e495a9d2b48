//! Analysis providers backed by hosted vision models.
//!
//! Both speak plain JSON over HTTPS with `reqwest`. The model is asked to
//! answer with a [`PageAnalysis`] document; any prose or code fences around
//! it are tolerated.

mod chat;
mod messages;

pub use chat::ChatCompletionsProvider;
pub use messages::MessagesProvider;

use std::time::Duration;

use overlayhub_protocols::analysis::PageAnalysis;
use overlayhub_protocols::error::AnalysisError;

/// Prompt used when neither the request nor the config supplies one.
pub const DEFAULT_PROMPT: &str = "Analyze this web page screenshot. Reply with a single JSON object \
and nothing else, shaped as: {\"description\": string, \"layout\": {area: {\"x\", \"y\", \"width\", \
\"height\"} in percent of the viewport for header, navigation, main, sidebar, footer when present}, \
\"elements\": [{\"type\", \"text\", \"confidence\"}], \"accessibility\": {\"score\": 0-10, \"issues\": \
[string]}, \"suggestions\": [string]}.";

pub(crate) const MAX_TOKENS: u32 = 1024;

/// Settings shared by the remote providers.
#[derive(Debug, Clone)]
pub struct RemoteSettings {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub prompt: Option<String>,
    pub timeout: Duration,
}

impl RemoteSettings {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: None,
            model: None,
            prompt: None,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Request prompt, then configured prompt, then [`DEFAULT_PROMPT`].
    pub(crate) fn prompt<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested
            .or(self.prompt.as_deref())
            .unwrap_or(DEFAULT_PROMPT)
    }

    pub(crate) fn client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .unwrap_or_default()
    }
}

/// Split `data:<media>;base64,<payload>` into media type and payload.
/// Bare base64 is assumed to be PNG.
pub(crate) fn split_data_url(image: &str) -> (&str, &str) {
    image
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
        .unwrap_or(("image/png", image))
}

/// The outermost `{...}` in a model reply.
pub(crate) fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

pub(crate) fn parse_analysis(reply: &str) -> Result<PageAnalysis, AnalysisError> {
    let json = extract_json(reply).ok_or_else(|| {
        AnalysisError::InvalidResponse("reply contains no JSON object".to_string())
    })?;
    serde_json::from_str(json).map_err(|e| AnalysisError::InvalidResponse(e.to_string()))
}

/// Parse a text-analysis reply as JSON when possible, else wrap the prose.
pub(crate) fn parse_text_reply(reply: &str) -> serde_json::Value {
    extract_json(reply)
        .and_then(|json| serde_json::from_str(json).ok())
        .unwrap_or_else(|| serde_json::json!({"text": reply}))
}

/// Turn a non-2xx response into [`AnalysisError::Api`], preferring the
/// provider's `error.message` over the raw body.
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, AnalysisError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or(body);
    Err(AnalysisError::Api { status, message })
}
