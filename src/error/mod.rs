//! Error handling module for the completion engine.
//!
//! Errors are grouped by the component that reports them:
//! - Registry errors (duplicate or unknown providers)
//! - Request errors (nothing to show, late provider callbacks)
//! - Configuration errors
//!
//! None of these abort the host: the worst visible outcome is that the
//! completion popup does not appear.
//!
//! # Example
//!
//! ```rust
//! use completion_engine::error::{CompletionError, RequestError, Result};
//!
//! fn start() -> Result<()> {
//!     Err(RequestError::NoMatchingProviders.into())
//! }
//!
//! let err = start().unwrap_err();
//! assert!(err.is_nothing_to_show());
//! ```

pub mod kinds;

// Re-export commonly used types
pub use kinds::{CompletionError, ConfigError, RegistryError, RequestError, Result};
