//! Anthropic-style messages provider (`remote-b`).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use overlayhub_protocols::analysis::{AnalysisProvider, PageAnalysis};
use overlayhub_protocols::error::AnalysisError;

use super::{
    check_status, parse_analysis, parse_text_reply, split_data_url, RemoteSettings, MAX_TOKENS,
};

pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-latest";
const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct ApiRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<ApiMessage>,
}

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: &'static str,
    content: Vec<ContentBlock>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Image { source: ImageSource },
    Text { text: String },
}

#[derive(Debug, Serialize)]
struct ImageSource {
    #[serde(rename = "type")]
    kind: &'static str,
    media_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    content: Vec<ResponseBlock>,
}

#[derive(Debug, Deserialize)]
struct ResponseBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Vision analysis through a messages endpoint.
pub struct MessagesProvider {
    settings: RemoteSettings,
    client: reqwest::Client,
}

impl MessagesProvider {
    pub fn new(settings: RemoteSettings) -> Self {
        let client = settings.client();
        Self { settings, client }
    }

    fn build_request(&self, content: Vec<ContentBlock>) -> ApiRequest {
        ApiRequest {
            model: self
                .settings
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: MAX_TOKENS,
            messages: vec![ApiMessage {
                role: "user",
                content,
            }],
        }
    }

    async fn send(&self, request: &ApiRequest) -> Result<String, AnalysisError> {
        debug!("Sending analysis request to {}", self.settings.endpoint);
        let mut builder = self
            .client
            .post(&self.settings.endpoint)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json");
        if let Some(key) = &self.settings.api_key {
            builder = builder.header("x-api-key", key);
        }
        let response = builder
            .json(request)
            .send()
            .await
            .map_err(|e| AnalysisError::Network(e.to_string()))?;
        let response = check_status(response).await?;

        let body: ApiResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::InvalidResponse(e.to_string()))?;
        let text: Vec<String> = body
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect();
        if text.is_empty() {
            return Err(AnalysisError::InvalidResponse(
                "no text block in reply".to_string(),
            ));
        }
        Ok(text.join("\n"))
    }
}

#[async_trait]
impl AnalysisProvider for MessagesProvider {
    fn id(&self) -> &str {
        "remote-b"
    }

    async fn analyze_image(
        &self,
        image: &str,
        prompt: Option<&str>,
    ) -> Result<PageAnalysis, AnalysisError> {
        let (media_type, data) = split_data_url(image);
        let request = self.build_request(vec![
            ContentBlock::Image {
                source: ImageSource {
                    kind: "base64",
                    media_type: media_type.to_string(),
                    data: data.to_string(),
                },
            },
            ContentBlock::Text {
                text: self.settings.prompt(prompt).to_string(),
            },
        ]);
        let reply = self.send(&request).await?;
        parse_analysis(&reply)
    }

    async fn analyze_text(&self, text: &str, prompt: Option<&str>) -> Result<Value, AnalysisError> {
        let body = match prompt {
            Some(prompt) => format!("{}\n\n{}", prompt, text),
            None => text.to_string(),
        };
        let request = self.build_request(vec![ContentBlock::Text { text: body }]);
        let reply = self.send(&request).await?;
        Ok(parse_text_reply(&reply))
    }
}

#[cfg(test)]
#[path = "messages_tests.rs"]
mod tests;
