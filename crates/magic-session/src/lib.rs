//! Per-user session memory: birth data, last computed result and a bounded history.

pub mod session;
pub mod store;

pub use session::*;
pub use store::{InMemorySessionStore, SessionStore};
