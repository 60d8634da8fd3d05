//! Prompt/response gateway: composes prompts from session memory, calls the
//! configured text-generation provider and recovers JSON from its reply.

pub mod extract;
pub mod gateway;
pub mod prompt;
pub mod provider;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use extract::extract_json_object;
pub use gateway::Gateway;
pub use provider::{build_provider, GigaChatProvider, OpenAiProvider, TextCompletionProvider};
