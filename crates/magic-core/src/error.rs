use thiserror::Error;

#[derive(Error, Debug)]
pub enum MagicError {
    #[error("Malformed model output: {0}")]
    MalformedModelOutput(String),
    #[error("Upstream auth failure: {0}")]
    UpstreamAuthFailure(String),
    #[error("Upstream provider error: {0}")]
    UpstreamProviderError(String),
    #[error("Upstream call timed out after {secs}s")]
    UpstreamTimeout { secs: u64 },
    #[error("Missing precondition ({code}): {message}")]
    MissingPrecondition { code: &'static str, message: String },
    #[error("Configuration error: {0}")]
    Config(String),
}

impl MagicError {
    /// Compatibility was requested before any birth date was stored.
    pub fn no_birth_date() -> Self {
        MagicError::MissingPrecondition {
            code: "no_birth_date",
            message: "Birth date is not known yet, call /analyze first".into(),
        }
    }

    /// Stable machine-readable code, safe to show to clients.
    pub fn code(&self) -> &'static str {
        match self {
            MagicError::MalformedModelOutput(_) => "malformed_model_output",
            MagicError::UpstreamAuthFailure(_) => "upstream_auth_failure",
            MagicError::UpstreamProviderError(_) => "upstream_provider_error",
            MagicError::UpstreamTimeout { .. } => "upstream_timeout",
            MagicError::MissingPrecondition { code, .. } => code,
            MagicError::Config(_) => "config_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, MagicError>;
