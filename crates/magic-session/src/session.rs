use chrono::{DateTime, Utc};
use magic_core::config::SessionConfig;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::VecDeque;

/// Retention rules for [`Session::history`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryPolicy {
    /// Ring buffer capacity. Zero disables history.
    pub max_entries: usize,
    /// Entries are cut to this many characters.
    pub max_entry_chars: usize,
}

impl Default for HistoryPolicy {
    fn default() -> Self {
        Self { max_entries: 20, max_entry_chars: 500 }
    }
}

impl From<&SessionConfig> for HistoryPolicy {
    fn from(cfg: &SessionConfig) -> Self {
        Self { max_entries: cfg.history_limit, max_entry_chars: cfg.history_entry_chars }
    }
}

/// Per-user memory record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
    pub birth_date: Option<String>,
    pub birth_time: Option<String>,
    /// Most recent analysis output, fed back into later prompts.
    pub last_result: Map<String, Value>,
    pub history: VecDeque<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            user_id: user_id.into(),
            birth_date: None,
            birth_time: None,
            last_result: Map::new(),
            history: VecDeque::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite only the fields that carry a non-blank value. Values are stored as given.
    pub fn merge_fields(&mut self, birth_date: Option<&str>, birth_time: Option<&str>) {
        let mut changed = false;
        if let Some(date) = non_empty(birth_date) {
            self.birth_date = Some(date.to_string());
            changed = true;
        }
        if let Some(time) = non_empty(birth_time) {
            self.birth_time = Some(time.to_string());
            changed = true;
        }
        if changed {
            self.touch();
        }
    }

    pub fn replace_last_result(&mut self, result: Map<String, Value>) {
        self.last_result = result;
        self.touch();
    }

    /// Append a truncated entry, evicting the oldest ones past capacity.
    pub fn append_history(&mut self, entry: &str, policy: &HistoryPolicy) {
        if policy.max_entries == 0 {
            return;
        }
        self.history.push_back(truncate_chars(entry, policy.max_entry_chars).to_string());
        while self.history.len() > policy.max_entries {
            self.history.pop_front();
        }
        self.touch();
    }

    pub fn has_birth_date(&self) -> bool {
        self.birth_date.is_some()
    }

    /// History as one newline-joined block.
    pub fn history_text(&self) -> String {
        self.history.iter().map(String::as_str).collect::<Vec<_>>().join("\n")
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Prefix of at most `max_chars` characters, never splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
