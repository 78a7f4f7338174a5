//! Completion Engine Library
//!
//! A provider-based completion engine for text editing surfaces. Providers
//! contribute proposals to a shared model, the engine tracks the session,
//! navigation and provider filtering, and notifies the host through signals.
//!
//! # Modules
//!
//! - `cli`: Command-line interface and argument parsing
//! - `completion`: Engine, providers, model and navigation
//! - `config`: Configuration management
//! - `error`: Error types and handling
//! - `repl`: Line editor demo driven by the engine
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use completion_engine::completion::{CompletionEngine, WordsProvider};
//! use completion_engine::config::Config;
//! use completion_engine::repl::LineBuffer;
//!
//! fn main() -> completion_engine::Result<()> {
//!     let config = Config::default();
//!     let buffer = Arc::new(LineBuffer::new());
//!     let mut engine = CompletionEngine::new(config.completion, buffer.clone());
//!
//!     let words = Arc::new(WordsProvider::new(3));
//!     words.add_text("println print process");
//!     engine.add_provider(words)?;
//!
//!     buffer.set("pr", 2);
//!     let context = engine.create_context(None);
//!     engine.request_all(context)?;
//!     engine.dispatch_pending();
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod completion;
pub mod config;
pub mod error;
pub mod repl;

// Re-export commonly used types
pub use completion::CompletionEngine;
pub use config::Config;
pub use error::{CompletionError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
///
/// # Returns
/// * `&str` - Version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
