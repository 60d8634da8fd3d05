//! Analyze and compatibility flows over a session store and a provider.
//!
//! Session locks are never held across the upstream call: the session is read
//! (and merged) under its lock, released, the provider is called, and the result
//! is written back under the lock again. Two concurrent requests for the same
//! user may therefore both build prompts from the same snapshot; the later
//! write wins.

use crate::extract::extract_json_object;
use crate::prompt::{analysis_prompt, compatibility_prompt};
use crate::provider::TextCompletionProvider;
use magic_core::config::GatewayConfig;
use magic_core::{
    AnalysisView, AnalyzeRequest, CompatibilityReport, CompatibilityRequest, MagicError, Result,
};
use magic_session::SessionStore;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

pub struct Gateway {
    provider: Arc<dyn TextCompletionProvider>,
    store: Arc<dyn SessionStore>,
    timeout: Duration,
    view: AnalysisView,
}

impl Gateway {
    pub fn new(provider: Arc<dyn TextCompletionProvider>, store: Arc<dyn SessionStore>) -> Self {
        Self { provider, store, timeout: DEFAULT_TIMEOUT, view: AnalysisView::default() }
    }

    pub fn from_config(
        provider: Arc<dyn TextCompletionProvider>,
        store: Arc<dyn SessionStore>,
        config: &GatewayConfig,
    ) -> Self {
        Self::new(provider, store)
            .with_timeout(Duration::from_secs(config.timeout_secs))
            .with_view(config.view)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_view(mut self, view: AnalysisView) -> Self {
        self.view = view;
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub fn session_count(&self) -> usize {
        self.store.len()
    }

    /// Merge birth data, ask for a numerology analysis and remember the result.
    ///
    /// Returns the extracted object shaped by the configured [`AnalysisView`].
    pub async fn analyze(&self, req: &AnalyzeRequest) -> Result<Value> {
        let start = Instant::now();
        let session = self.store.merge_fields(&req.user_id, req.birth_date.as_deref(), req.birth_time.as_deref());
        let prompt = analysis_prompt(&session);

        let object = self.complete_json(&prompt).await?;
        let response = self.view.shape(&object);
        let entry = Value::Object(object.clone()).to_string();
        self.store.record_result(&req.user_id, Some(object), &entry);

        tracing::info!(
            user_id = %req.user_id,
            provider = self.provider.name(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "analysis completed"
        );
        Ok(response)
    }

    /// Compatibility with a second birth date. Needs a stored birth date; without
    /// one the provider is not called.
    pub async fn compatibility(&self, req: &CompatibilityRequest) -> Result<CompatibilityReport> {
        let start = Instant::now();
        let session = self.store.get_or_create(&req.user_id);
        if !session.has_birth_date() {
            tracing::info!(user_id = %req.user_id, "compatibility requested without birth date");
            return Err(MagicError::no_birth_date());
        }
        let prompt = compatibility_prompt(&session, &req.second_birth_date);

        let object = self.complete_json(&prompt).await?;
        let report: CompatibilityReport = decode(&object)?;
        self.store.record_result(&req.user_id, None, &Value::Object(object).to_string());

        tracing::info!(
            user_id = %req.user_id,
            provider = self.provider.name(),
            percent = report.percent,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "compatibility completed"
        );
        Ok(report)
    }

    async fn complete_json(&self, prompt: &str) -> Result<Map<String, Value>> {
        let raw = tokio::time::timeout(self.timeout, self.provider.complete(prompt))
            .await
            .map_err(|_| MagicError::UpstreamTimeout { secs: self.timeout.as_secs() })??;
        tracing::debug!(provider = self.provider.name(), raw = %raw, "model reply");
        extract_json_object(&raw)
    }
}

fn decode<T: DeserializeOwned>(object: &Map<String, Value>) -> Result<T> {
    serde_json::from_value(Value::Object(object.clone()))
        .map_err(|e| MagicError::MalformedModelOutput(format!("unexpected reply shape: {e}")))
}
