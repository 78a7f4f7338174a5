//! Provider-based completion engine
//!
//! A [`CompletionEngine`] sits next to a text surface and drives one completion
//! session at a time:
//!
//! - **Registry**: providers registered on the engine, in registration order
//! - **Context**: the request handed to providers, cancelled when superseded
//! - **Model**: proposals grouped per provider, with optional header rows
//! - **Navigation / Cycling**: pure selection and provider-filter movement
//! - **Engine**: the session state machine, debounce timer and signals
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use completion_engine::completion::{CompletionEngine, KeywordProvider, TextSurface};
//! use completion_engine::config::CompletionConfig;
//!
//! fn attach(surface: Arc<dyn TextSurface>) -> completion_engine::Result<CompletionEngine> {
//!     let mut engine = CompletionEngine::new(CompletionConfig::default(), surface);
//!     engine.add_provider(Arc::new(KeywordProvider::new("Rust", ["fn", "let", "match"])))?;
//!     engine.signals().show.connect(|_| println!("show popup"));
//!
//!     let context = engine.create_context(None);
//!     engine.request_all(context)?;
//!     Ok(engine)
//! }
//! ```

mod context;
mod cycling;
mod engine;
mod model;
mod navigation;
mod provider;
mod registry;
mod signal;
mod sink;
mod surface;
mod trigger;
mod words;

pub use context::{CompletionContext, ContextId, Position};
pub use cycling::{CycleOutcome, Direction, ProviderCount};
pub use engine::{
    CompletionAction, CompletionEngine, InfoContent, NO_INFO_TEXT, NavOutcome, ProviderSelection, SessionState,
};
pub use model::{ProposalModel, Row, RowKey, RowKind};
pub use navigation::Movement;
pub use provider::{CompletionProvider, InfoWidget, Proposal, ProviderId};
pub use registry::{ProviderRegistry, RegisteredProvider};
pub use signal::{ConnectionId, EngineSignals, Signal};
pub use sink::{ProposalBatch, ProposalSink};
pub use surface::{TextSurface, is_word_char, word_end, word_start};
pub use words::{KeywordProvider, WordsProvider, filter_by_prefix};
