use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Body of `POST /analyze`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub user_id: String,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub birth_time: Option<String>,
}

/// Body of `POST /compatibility`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityRequest {
    pub user_id: String,
    pub second_birth_date: String,
}

/// Structured reply of the compatibility prompt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityReport {
    #[serde(default, deserialize_with = "lenient_percent")]
    pub percent: u8,
    #[serde(default, deserialize_with = "lenient_string")]
    pub strengths: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub weaknesses: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub summary: String,
}

/// Which analysis fields reach the client. Computed `numbers` are always kept server-side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisView {
    #[default]
    Public,
    Full,
}

impl AnalysisView {
    /// Shape the extracted analysis object for the client. Values pass through untouched.
    pub fn shape(&self, object: &Map<String, Value>) -> Value {
        match self {
            AnalysisView::Full => Value::Object(object.clone()),
            AnalysisView::Public => Value::Object(
                ["analysis", "dayCard"]
                    .into_iter()
                    .filter_map(|key| object.get(key).map(|v| (key.to_string(), v.clone())))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for AnalysisView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisView::Public => write!(f, "public"),
            AnalysisView::Full => write!(f, "full"),
        }
    }
}

impl FromStr for AnalysisView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "public" => Ok(AnalysisView::Public),
            "full" => Ok(AnalysisView::Full),
            other => Err(format!("unknown analysis view: {other}")),
        }
    }
}

/// Models sometimes answer with numbers or lists where prose was asked for.
fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Array(items) => items
            .iter()
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    })
}

fn lenient_percent<'de, D: Deserializer<'de>>(d: D) -> Result<u8, D::Error> {
    let raw = match Value::deserialize(d)? {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse().unwrap_or(0.0),
        _ => 0.0,
    };
    Ok(raw.round().clamp(0.0, 100.0) as u8)
}
