//! GigaChat backend: OAuth client-credentials exchange plus chat completions.
//!
//! GigaChat has no JSON output mode, so callers rely on brace extraction.

use super::TextCompletionProvider;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use magic_core::config::{
    DEFAULT_GIGACHAT_API_URL, DEFAULT_GIGACHAT_AUTH_URL, DEFAULT_GIGACHAT_MODEL, DEFAULT_GIGACHAT_SCOPE,
};
use magic_core::{MagicError, Result};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tokio::sync::Mutex;

/// Tokens are refreshed this long before they expire.
const TOKEN_REFRESH_MARGIN_MS: i64 = 60_000;

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at_ms: i64,
}

impl CachedToken {
    fn is_fresh(&self, now_ms: i64) -> bool {
        now_ms + TOKEN_REFRESH_MARGIN_MS < self.expires_at_ms
    }
}

pub struct GigaChatProvider {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    scope: String,
    auth_url: String,
    api_url: String,
    model: String,
    token: Mutex<Option<CachedToken>>,
}

pub struct GigaChatProviderBuilder {
    client_id: String,
    client_secret: String,
    scope: String,
    auth_url: String,
    api_url: String,
    model: String,
    accept_invalid_certs: bool,
}

impl GigaChatProviderBuilder {
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn auth_url(mut self, url: impl Into<String>) -> Self {
        self.auth_url = url.into();
        self
    }

    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// The public endpoints are signed by a CA most trust stores lack.
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    pub fn build(self) -> Result<GigaChatProvider> {
        if self.accept_invalid_certs {
            tracing::warn!("gigachat TLS certificate verification is disabled");
        }
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .build()
            .map_err(|e| MagicError::Config(format!("cannot build gigachat http client: {e}")))?;
        Ok(GigaChatProvider {
            client,
            client_id: self.client_id,
            client_secret: self.client_secret,
            scope: self.scope,
            auth_url: self.auth_url,
            api_url: self.api_url,
            model: self.model,
            token: Mutex::new(None),
        })
    }
}

impl GigaChatProvider {
    pub fn builder(client_id: impl Into<String>, client_secret: impl Into<String>) -> GigaChatProviderBuilder {
        GigaChatProviderBuilder {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            scope: DEFAULT_GIGACHAT_SCOPE.into(),
            auth_url: DEFAULT_GIGACHAT_AUTH_URL.into(),
            api_url: DEFAULT_GIGACHAT_API_URL.into(),
            model: DEFAULT_GIGACHAT_MODEL.into(),
            accept_invalid_certs: false,
        }
    }

    /// Cached bearer token, exchanging credentials when it is missing or about to expire.
    async fn access_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;
        let now_ms = Utc::now().timestamp_millis();
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(now_ms)) {
            return Ok(token.access_token.clone());
        }

        let token = self.exchange_credentials().await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    async fn exchange_credentials(&self) -> Result<CachedToken> {
        let basic = BASE64.encode(format!("{}:{}", self.client_id, self.client_secret));
        let response = self
            .client
            .post(&self.auth_url)
            .header(reqwest::header::AUTHORIZATION, format!("Basic {basic}"))
            .header("RqUID", uuid::Uuid::new_v4().to_string())
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[("scope", self.scope.as_str())])
            .send()
            .await
            .map_err(|e| MagicError::UpstreamAuthFailure(format!("gigachat token request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!(%status, body = %text, "gigachat token exchange rejected");
            return Err(MagicError::UpstreamAuthFailure(format!("gigachat token endpoint returned {status}")));
        }

        let reply: TokenReply = response
            .json()
            .await
            .map_err(|e| MagicError::UpstreamAuthFailure(format!("unreadable gigachat token response: {e}")))?;
        let access_token = reply
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| MagicError::UpstreamAuthFailure("gigachat token response has no access_token".into()))?;

        tracing::debug!(expires_at = reply.expires_at.unwrap_or(0), "gigachat token issued");
        Ok(CachedToken { access_token, expires_at_ms: reply.expires_at.unwrap_or(0) })
    }

    async fn invalidate_token(&self) {
        *self.token.lock().await = None;
    }
}

#[async_trait]
impl TextCompletionProvider for GigaChatProvider {
    fn name(&self) -> &str {
        "gigachat"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let start = Instant::now();
        let token = self.access_token().await?;
        let url = format!("{}/chat/completions", self.api_url);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .map_err(|e| MagicError::UpstreamProviderError(format!("gigachat request failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            self.invalidate_token().await;
            return Err(MagicError::UpstreamAuthFailure("gigachat rejected the access token".into()));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!(%status, body = %text, "gigachat returned an error");
            return Err(MagicError::UpstreamProviderError(format!("gigachat returned {status}")));
        }

        let reply: ChatReply = response
            .json()
            .await
            .map_err(|e| MagicError::UpstreamProviderError(format!("unreadable gigachat response: {e}")))?;

        let content = reply
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .ok_or_else(|| MagicError::UpstreamProviderError("gigachat response has no completion".into()))?;

        tracing::debug!(
            model = %self.model,
            elapsed_ms = start.elapsed().as_millis() as u64,
            chars = content.len(),
            "gigachat completion finished"
        );
        Ok(content)
    }
}

#[derive(Debug, Deserialize)]
struct TokenReply {
    #[serde(default)]
    access_token: Option<String>,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    expires_at: Option<i64>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ReplyMessage>,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}
