//! OpenAI-style chat completions provider (`remote-a`).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use overlayhub_protocols::analysis::{AnalysisProvider, PageAnalysis};
use overlayhub_protocols::error::AnalysisError;

use super::{
    check_status, parse_analysis, parse_text_reply, split_data_url, RemoteSettings, MAX_TOKENS,
};

pub const DEFAULT_MODEL: &str = "gpt-4o";

#[derive(Debug, Serialize)]
struct ApiRequest {
    model: String,
    messages: Vec<ApiMessage>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: &'static str,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Vision analysis through a chat completions endpoint.
pub struct ChatCompletionsProvider {
    settings: RemoteSettings,
    client: reqwest::Client,
}

impl ChatCompletionsProvider {
    pub fn new(settings: RemoteSettings) -> Self {
        let client = settings.client();
        Self { settings, client }
    }

    fn model(&self) -> String {
        self.settings
            .model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string())
    }

    fn build_request(&self, content: Vec<ContentPart>) -> ApiRequest {
        ApiRequest {
            model: self.model(),
            messages: vec![ApiMessage {
                role: "user",
                content,
            }],
            max_tokens: MAX_TOKENS,
        }
    }

    async fn send(&self, request: &ApiRequest) -> Result<String, AnalysisError> {
        debug!("Sending analysis request to {}", self.settings.endpoint);
        let mut builder = self
            .client
            .post(&self.settings.endpoint)
            .header("Content-Type", "application/json");
        if let Some(key) = &self.settings.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", key));
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
        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                AnalysisError::InvalidResponse("no message content in reply".to_string())
            })
    }
}

#[async_trait]
impl AnalysisProvider for ChatCompletionsProvider {
    fn id(&self) -> &str {
        "remote-a"
    }

    async fn analyze_image(
        &self,
        image: &str,
        prompt: Option<&str>,
    ) -> Result<PageAnalysis, AnalysisError> {
        let (media_type, data) = split_data_url(image);
        let request = self.build_request(vec![
            ContentPart::Text {
                text: self.settings.prompt(prompt).to_string(),
            },
            ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: format!("data:{};base64,{}", media_type, data),
                },
            },
        ]);
        let reply = self.send(&request).await?;
        parse_analysis(&reply)
    }

    async fn analyze_text(&self, text: &str, prompt: Option<&str>) -> Result<Value, AnalysisError> {
        let mut body = String::new();
        if let Some(prompt) = prompt {
            body.push_str(prompt);
            body.push_str("\n\n");
        }
        body.push_str(text);

        let request = self.build_request(vec![ContentPart::Text { text: body }]);
        let reply = self.send(&request).await?;
        Ok(parse_text_reply(&reply))
    }
}

#[cfg(test)]
#[path = "chat_tests.rs"]
mod tests;
