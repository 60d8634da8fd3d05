//! OpenAI Responses API backend.

use super::TextCompletionProvider;
use async_trait::async_trait;
use magic_core::config::DEFAULT_OPENAI_BASE_URL;
use magic_core::{MagicError, Result};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Instant;

pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    structured_output: bool,
}

impl OpenAiProvider {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_OPENAI_BASE_URL.into(),
            structured_output: true,
        }
    }

    /// Point at a compatible API or a test server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Request `json_object` output instead of free text.
    pub fn with_structured_output(mut self, enabled: bool) -> Self {
        self.structured_output = enabled;
        self
    }
}

#[async_trait]
impl TextCompletionProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let start = Instant::now();
        let url = format!("{}/v1/responses", self.base_url);
        let body = ResponsesRequest {
            model: &self.model,
            input: prompt,
            text: self.structured_output.then_some(TextOptions { format: TextFormat { kind: "json_object" } }),
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| MagicError::UpstreamProviderError(format!("openai request failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(MagicError::UpstreamAuthFailure(format!("openai rejected credentials ({status})")));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!(%status, body = %text, "openai returned an error");
            return Err(MagicError::UpstreamProviderError(format!("openai returned {status}")));
        }

        let reply: ResponsesReply = response
            .json()
            .await
            .map_err(|e| MagicError::UpstreamProviderError(format!("unreadable openai response: {e}")))?;

        let text = reply.output_text();
        tracing::debug!(
            model = %self.model,
            elapsed_ms = start.elapsed().as_millis() as u64,
            chars = text.as_deref().map(str::len).unwrap_or(0),
            "openai completion finished"
        );
        text.ok_or_else(|| MagicError::UpstreamProviderError("openai response has no output text".into()))
    }
}

#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<TextOptions>,
}

#[derive(Debug, Serialize)]
struct TextOptions {
    format: TextFormat,
}

#[derive(Debug, Serialize)]
struct TextFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ResponsesReply {
    #[serde(default)]
    output_text: Option<String>,
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(default)]
    content: Vec<OutputContent>,
}

#[derive(Debug, Deserialize)]
struct OutputContent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl ResponsesReply {
    /// Concatenated `output_text` parts, or the top-level convenience field when present.
    fn output_text(self) -> Option<String> {
        if let Some(text) = self.output_text.filter(|t| !t.is_empty()) {
            return Some(text);
        }
        let joined: String = self
            .output
            .into_iter()
            .flat_map(|item| item.content)
            .filter(|c| c.kind == "output_text")
            .filter_map(|c| c.text)
            .collect();
        (!joined.is_empty()).then_some(joined)
    }
}
