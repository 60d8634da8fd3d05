use crate::*;
use crate::config::{ProviderConfig, DEFAULT_GIGACHAT_SCOPE, DEFAULT_OPENAI_MODEL};
use serde_json::{json, Value};
use std::collections::HashMap;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |key| map.get(key).cloned()
}

// ========== Config ==========

#[test]
fn test_config_openai_defaults() {
    let cfg = MagicConfig::from_lookup(lookup(&[("OPENAI_KEY", "sk-test")])).unwrap();
    assert_eq!(cfg.server.port, 3000);
    assert_eq!(cfg.server.host, "0.0.0.0");
    assert_eq!(cfg.gateway.timeout_secs, 60);
    assert_eq!(cfg.gateway.view, AnalysisView::Public);
    assert_eq!(cfg.session.history_entry_chars, 500);
    match cfg.provider {
        ProviderConfig::OpenAi { api_key, model, structured_output, .. } => {
            assert_eq!(api_key, "sk-test");
            assert_eq!(model, DEFAULT_OPENAI_MODEL);
            assert!(structured_output);
        }
        other => panic!("unexpected provider {other:?}"),
    }
}

#[test]
fn test_config_openai_requires_key() {
    let err = MagicConfig::from_lookup(lookup(&[])).unwrap_err();
    assert!(matches!(err, MagicError::Config(ref m) if m.contains("OPENAI_KEY")));
}

#[test]
fn test_config_empty_value_is_unset() {
    let err = MagicConfig::from_lookup(lookup(&[("OPENAI_KEY", "  ")])).unwrap_err();
    assert_eq!(err.code(), "config_error");
}

#[test]
fn test_config_gigachat() {
    let cfg = MagicConfig::from_lookup(lookup(&[
        ("PROVIDER", "GigaChat"),
        ("GIGACHAT_CLIENT_ID", "id"),
        ("GIGACHAT_CLIENT_SECRET", "secret"),
        ("GIGACHAT_INSECURE_TLS", "true"),
        ("PORT", "8080"),
        ("ANALYSIS_VIEW", "full"),
    ]))
    .unwrap();
    assert_eq!(cfg.server.port, 8080);
    assert_eq!(cfg.gateway.view, AnalysisView::Full);
    assert_eq!(cfg.provider.name(), "gigachat");
    match cfg.provider {
        ProviderConfig::GigaChat { scope, accept_invalid_certs, .. } => {
            assert_eq!(scope, DEFAULT_GIGACHAT_SCOPE);
            assert!(accept_invalid_certs);
        }
        other => panic!("unexpected provider {other:?}"),
    }
}

#[test]
fn test_config_gigachat_requires_secret() {
    let err = MagicConfig::from_lookup(lookup(&[("PROVIDER", "gigachat"), ("GIGACHAT_CLIENT_ID", "id")])).unwrap_err();
    assert!(err.to_string().contains("GIGACHAT_CLIENT_SECRET"));
}

#[test]
fn test_config_unknown_provider() {
    let err = MagicConfig::from_lookup(lookup(&[("PROVIDER", "llama")])).unwrap_err();
    assert!(err.to_string().contains("llama"));
}

#[test]
fn test_config_bad_port() {
    let err = MagicConfig::from_lookup(lookup(&[("OPENAI_KEY", "k"), ("PORT", "abc")])).unwrap_err();
    assert!(err.to_string().contains("PORT"));
}

#[test]
fn test_config_zero_timeout_rejected() {
    let err = MagicConfig::from_lookup(lookup(&[("OPENAI_KEY", "k"), ("UPSTREAM_TIMEOUT_SECS", "0")])).unwrap_err();
    assert_eq!(err.code(), "config_error");
}

#[test]
fn test_config_history_logging_and_json_mode() {
    let cfg = MagicConfig::from_lookup(lookup(&[
        ("OPENAI_KEY", "k"),
        ("OPENAI_JSON_MODE", "false"),
        ("HISTORY_LIMIT", "5"),
        ("HISTORY_ENTRY_CHARS", "80"),
        ("LOG_LEVEL", "debug"),
        ("LOG_FORMAT", "json"),
    ]))
    .unwrap();
    assert_eq!(cfg.session.history_limit, 5);
    assert_eq!(cfg.session.history_entry_chars, 80);
    assert_eq!(cfg.logging.level, "debug");
    assert_eq!(cfg.logging.format, "json");
    match cfg.provider {
        ProviderConfig::OpenAi { structured_output, .. } => assert!(!structured_output),
        other => panic!("unexpected provider {other:?}"),
    }

    let err = MagicConfig::from_lookup(lookup(&[("OPENAI_KEY", "k"), ("ANALYSIS_VIEW", "partial")])).unwrap_err();
    assert_eq!(err.code(), "config_error");
    assert!(err.to_string().contains("ANALYSIS_VIEW"));
}

// ========== Errors ==========

#[test]
fn test_error_codes() {
    assert_eq!(MagicError::no_birth_date().code(), "no_birth_date");
    assert_eq!(MagicError::MalformedModelOutput("x".into()).code(), "malformed_model_output");
    assert_eq!(MagicError::UpstreamTimeout { secs: 5 }.code(), "upstream_timeout");
    assert_eq!(MagicError::UpstreamAuthFailure("x".into()).code(), "upstream_auth_failure");
    assert_eq!(MagicError::UpstreamProviderError("x".into()).code(), "upstream_provider_error");
    assert_eq!(MagicError::Config("x".into()).code(), "config_error");
}

// ========== Wire Types ==========

#[test]
fn test_analyze_request_optional_fields() {
    let req: AnalyzeRequest = serde_json::from_value(json!({ "userId": "u1" })).unwrap();
    assert_eq!(req.user_id, "u1");
    assert!(req.birth_date.is_none());
    assert!(req.birth_time.is_none());
}

#[test]
fn test_analysis_view_shapes() {
    let object = json!({ "numbers": { "lifePath": 7 }, "analysis": "a", "dayCard": "d", "luckyColor": "red" });
    let object = object.as_object().unwrap();
    assert_eq!(AnalysisView::Public.shape(object), json!({ "analysis": "a", "dayCard": "d" }));
    assert_eq!(AnalysisView::Full.shape(object), Value::Object(object.clone()));
}

#[test]
fn test_analysis_view_keeps_value_types() {
    let object = json!({ "analysis": { "career": "science" }, "dayCard": 3, "numbers": [7] });
    let object = object.as_object().unwrap();
    assert_eq!(
        AnalysisView::Public.shape(object),
        json!({ "analysis": { "career": "science" }, "dayCard": 3 })
    );
    let empty = serde_json::Map::new();
    assert_eq!(AnalysisView::Public.shape(&empty), json!({}));
}

#[test]
fn test_compatibility_percent_variants() {
    let r: CompatibilityReport = serde_json::from_value(json!({ "percent": "85%" })).unwrap();
    assert_eq!(r.percent, 85);
    let r: CompatibilityReport = serde_json::from_value(json!({ "percent": 140 })).unwrap();
    assert_eq!(r.percent, 100);
    let r: CompatibilityReport = serde_json::from_value(json!({ "percent": 72.6 })).unwrap();
    assert_eq!(r.percent, 73);
    let r: CompatibilityReport = serde_json::from_value(json!({})).unwrap();
    assert_eq!(r.percent, 0);
    assert!(r.summary.is_empty());
}

#[test]
fn test_compatibility_report_lenient_fields() {
    let r: CompatibilityReport = serde_json::from_value(json!({
        "percent": 60,
        "strengths": ["one", "two"],
        "summary": 3
    }))
    .unwrap();
    assert_eq!(r.strengths, "one; two");
    assert_eq!(r.summary, "3");
    assert!(r.weaknesses.is_empty());
}

#[test]
fn test_analysis_view_from_str() {
    assert_eq!("FULL".parse::<AnalysisView>().unwrap(), AnalysisView::Full);
    assert!("partial".parse::<AnalysisView>().is_err());
}

// ========== Logging ==========

#[test]
fn test_init_logging_twice() {
    logging::init_logging("debug", "json");
    logging::init_logging("info", "pretty");
}
