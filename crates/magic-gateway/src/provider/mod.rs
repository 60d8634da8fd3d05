//! Upstream text-generation backends behind one capability.

mod gigachat;
mod openai;

pub use gigachat::GigaChatProvider;
pub use openai::OpenAiProvider;

use async_trait::async_trait;
use magic_core::config::ProviderConfig;
use magic_core::Result;
use std::sync::Arc;

/// Something that turns a prompt into raw model text.
///
/// Implementations report auth problems as `UpstreamAuthFailure` and every other
/// upstream fault as `UpstreamProviderError`. They never retry.
#[async_trait]
pub trait TextCompletionProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Build the backend selected in configuration.
pub fn build_provider(config: &ProviderConfig) -> Result<Arc<dyn TextCompletionProvider>> {
    let provider: Arc<dyn TextCompletionProvider> = match config {
        ProviderConfig::OpenAi { api_key, model, base_url, structured_output } => Arc::new(
            OpenAiProvider::new(api_key.clone(), model.clone())
                .with_base_url(base_url.clone())
                .with_structured_output(*structured_output),
        ),
        ProviderConfig::GigaChat {
            client_id,
            client_secret,
            scope,
            auth_url,
            api_url,
            model,
            accept_invalid_certs,
        } => Arc::new(
            GigaChatProvider::builder(client_id.clone(), client_secret.clone())
                .scope(scope.clone())
                .auth_url(auth_url.clone())
                .api_url(api_url.clone())
                .model(model.clone())
                .accept_invalid_certs(*accept_invalid_certs)
                .build()?,
        ),
    };
    tracing::info!(provider = provider.name(), "text completion provider ready");
    Ok(provider)
}
