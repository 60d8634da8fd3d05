pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::MagicConfig;
pub use error::{MagicError, Result};
pub use types::*;

#[cfg(test)]
mod tests;
