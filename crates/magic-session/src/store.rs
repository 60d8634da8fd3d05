//! Session storage behind a swappable trait.

use crate::session::{HistoryPolicy, Session};
use parking_lot::{Mutex, RwLock};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Keyed session storage. Sessions are created on first reference and never removed.
///
/// Every method returns a snapshot taken while the session was locked, so callers
/// never hold a lock across an await point.
pub trait SessionStore: Send + Sync {
    fn get_or_create(&self, user_id: &str) -> Session;

    fn merge_fields(&self, user_id: &str, birth_date: Option<&str>, birth_time: Option<&str>) -> Session;

    fn replace_last_result(&self, user_id: &str, result: Map<String, Value>) -> Session;

    fn append_history(&self, user_id: &str, entry: &str) -> Session;

    /// Append `entry` to history and, when given, replace `last_result`, as one update.
    fn record_result(&self, user_id: &str, result: Option<Map<String, Value>>, entry: &str) -> Session;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

type Slot = Arc<Mutex<Session>>;

/// Process-local store: one mutex per user, the map lock only guards slot lookup.
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Slot>>,
    policy: HistoryPolicy,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::with_policy(HistoryPolicy::default())
    }

    pub fn with_policy(policy: HistoryPolicy) -> Self {
        Self { sessions: RwLock::new(HashMap::new()), policy }
    }

    pub fn policy(&self) -> HistoryPolicy {
        self.policy
    }

    fn slot(&self, user_id: &str) -> Slot {
        if let Some(slot) = self.sessions.read().get(user_id) {
            return Arc::clone(slot);
        }
        let mut map = self.sessions.write();
        let slot = map.entry(user_id.to_string()).or_insert_with(|| {
            tracing::debug!(user_id, "creating session");
            Arc::new(Mutex::new(Session::new(user_id)))
        });
        Arc::clone(slot)
    }

    fn with_session(&self, user_id: &str, f: impl FnOnce(&mut Session)) -> Session {
        let slot = self.slot(user_id);
        let mut session = slot.lock();
        f(&mut session);
        session.clone()
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for InMemorySessionStore {
    fn get_or_create(&self, user_id: &str) -> Session {
        self.with_session(user_id, |_| {})
    }

    fn merge_fields(&self, user_id: &str, birth_date: Option<&str>, birth_time: Option<&str>) -> Session {
        self.with_session(user_id, |s| s.merge_fields(birth_date, birth_time))
    }

    fn replace_last_result(&self, user_id: &str, result: Map<String, Value>) -> Session {
        self.with_session(user_id, |s| s.replace_last_result(result))
    }

    fn append_history(&self, user_id: &str, entry: &str) -> Session {
        let policy = self.policy;
        self.with_session(user_id, |s| s.append_history(entry, &policy))
    }

    fn record_result(&self, user_id: &str, result: Option<Map<String, Value>>, entry: &str) -> Session {
        let policy = self.policy;
        self.with_session(user_id, |s| {
            if let Some(result) = result {
                s.replace_last_result(result);
            }
            s.append_history(entry, &policy);
        })
    }

    fn len(&self) -> usize {
        self.sessions.read().len()
    }
}
