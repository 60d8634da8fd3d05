use crate::error::{MagicError, Result};
use crate::types::AnalysisView;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MagicConfig {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub gateway: GatewayConfig,
    pub session: SessionConfig,
    pub logging: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Upstream text-generation backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProviderConfig {
    #[serde(rename = "openai")]
    OpenAi {
        api_key: String,
        model: String,
        base_url: String,
        /// Ask the API for a JSON object instead of free text.
        structured_output: bool,
    },
    GigaChat {
        client_id: String,
        client_secret: String,
        scope: String,
        auth_url: String,
        api_url: String,
        model: String,
        accept_invalid_certs: bool,
    },
}

impl ProviderConfig {
    pub fn name(&self) -> &'static str {
        match self {
            ProviderConfig::OpenAi { .. } => "openai",
            ProviderConfig::GigaChat { .. } => "gigachat",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub timeout_secs: u64,
    pub view: AnalysisView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Oldest entries are dropped past this many.
    pub history_limit: usize,
    pub history_entry_chars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub level: String,
    pub format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".into(), port: 3000 }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::OpenAi {
            api_key: String::new(),
            model: DEFAULT_OPENAI_MODEL.into(),
            base_url: DEFAULT_OPENAI_BASE_URL.into(),
            structured_output: true,
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self { timeout_secs: 60, view: AnalysisView::Public }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { history_limit: 20, history_entry_chars: 500 }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: "info".into(), format: "pretty".into() }
    }
}

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4.1-mini";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_GIGACHAT_SCOPE: &str = "GIGACHAT_API_PERS";
pub const DEFAULT_GIGACHAT_AUTH_URL: &str = "https://ngw.devices.sberbank.ru:9443/api/v2/oauth";
pub const DEFAULT_GIGACHAT_API_URL: &str = "https://gigachat.devices.sberbank.ru/api/v1";
pub const DEFAULT_GIGACHAT_MODEL: &str = "GigaChat";

impl MagicConfig {
    /// Load from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = MagicConfig::default();

        let server = ServerConfig {
            host: get("HOST").unwrap_or(defaults.server.host),
            port: parse_or(get("PORT"), "PORT", defaults.server.port)?,
        };

        let provider = match get("PROVIDER").as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("openai") => ProviderConfig::OpenAi {
                api_key: require(get("OPENAI_KEY"), "OPENAI_KEY")?,
                model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.into()),
                base_url: get("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.into()),
                structured_output: parse_bool(get("OPENAI_JSON_MODE"), "OPENAI_JSON_MODE", true)?,
            },
            Some("gigachat") => ProviderConfig::GigaChat {
                client_id: require(get("GIGACHAT_CLIENT_ID"), "GIGACHAT_CLIENT_ID")?,
                client_secret: require(get("GIGACHAT_CLIENT_SECRET"), "GIGACHAT_CLIENT_SECRET")?,
                scope: get("GIGACHAT_SCOPE").unwrap_or_else(|| DEFAULT_GIGACHAT_SCOPE.into()),
                auth_url: get("GIGACHAT_AUTH_URL").unwrap_or_else(|| DEFAULT_GIGACHAT_AUTH_URL.into()),
                api_url: get("GIGACHAT_API_URL").unwrap_or_else(|| DEFAULT_GIGACHAT_API_URL.into()),
                model: get("GIGACHAT_MODEL").unwrap_or_else(|| DEFAULT_GIGACHAT_MODEL.into()),
                accept_invalid_certs: parse_bool(get("GIGACHAT_INSECURE_TLS"), "GIGACHAT_INSECURE_TLS", false)?,
            },
            Some(other) => {
                return Err(MagicError::Config(format!("unknown PROVIDER '{other}', expected openai or gigachat")))
            }
        };

        let gateway = GatewayConfig {
            timeout_secs: parse_or(get("UPSTREAM_TIMEOUT_SECS"), "UPSTREAM_TIMEOUT_SECS", defaults.gateway.timeout_secs)?,
            view: parse_or(get("ANALYSIS_VIEW"), "ANALYSIS_VIEW", defaults.gateway.view)?,
        };
        if gateway.timeout_secs == 0 {
            return Err(MagicError::Config("UPSTREAM_TIMEOUT_SECS must be positive".into()));
        }

        let session = SessionConfig {
            history_limit: parse_or(get("HISTORY_LIMIT"), "HISTORY_LIMIT", defaults.session.history_limit)?,
            history_entry_chars: parse_or(
                get("HISTORY_ENTRY_CHARS"),
                "HISTORY_ENTRY_CHARS",
                defaults.session.history_entry_chars,
            )?,
        };

        let logging = LogConfig {
            level: get("LOG_LEVEL").unwrap_or(defaults.logging.level),
            format: get("LOG_FORMAT").unwrap_or(defaults.logging.format),
        };

        Ok(Self { server, provider, gateway, session, logging })
    }
}

fn require(value: Option<String>, key: &str) -> Result<String> {
    value.ok_or_else(|| MagicError::Config(format!("{key} is required")))
}

fn parse_or<T: FromStr>(value: Option<String>, key: &str, default: T) -> Result<T> {
    match value {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| MagicError::Config(format!("{key} has invalid value '{raw}'"))),
    }
}

fn parse_bool(value: Option<String>, key: &str, default: bool) -> Result<bool> {
    match value.as_deref().map(str::to_ascii_lowercase).as_deref() {
        None => Ok(default),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(raw) => Err(MagicError::Config(format!("{key} has invalid value '{raw}'"))),
    }
}
