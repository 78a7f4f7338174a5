//! Completion context definitions
//!
//! A [`CompletionContext`] describes one completion request: where the cursor
//! was, whether the request was triggered by typing, and whether it has been
//! cancelled. It is handed to every provider taking part in the request and
//! may be kept by providers that deliver their proposals later.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Position in the text surface, both components 0-based.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    /// Line number
    pub line: usize,
    /// Character offset within the line
    pub offset: usize,
}

impl Position {
    pub fn new(line: usize, offset: usize) -> Self {
        Self { line, offset }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.offset + 1)
    }
}

/// Identity of a completion context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContextId(u64);

impl ContextId {
    fn next() -> Self {
        Self(NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx#{}", self.0)
    }
}

/// Request-scoped state shared between the engine and providers.
///
/// Cloning a context is cheap and every clone keeps the same identity. The
/// cancellation token belongs to the population round the clone was taken
/// from: once the engine cancels that round, [`is_cancelled`](Self::is_cancelled)
/// returns `true` for every clone of it.
#[derive(Clone)]
pub struct CompletionContext {
    id: ContextId,
    position: Position,
    prefix: String,
    interactive: bool,
    token: CancellationToken,
    extras: Arc<RwLock<BTreeMap<String, String>>>,
}

impl CompletionContext {
    /// Create a non-interactive context at `position`.
    pub fn new(position: Position) -> Self {
        Self {
            id: ContextId::next(),
            position,
            prefix: String::new(),
            interactive: false,
            token: CancellationToken::new(),
            extras: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Mark the context as triggered by typing.
    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Attach the word fragment typed before the cursor.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Word fragment before the cursor, empty when the cursor is not in a word.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Token cancelled together with this context's population round.
    ///
    /// Providers doing deferred work can `select!` on
    /// `token.cancelled()` to stop early.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Store an extra value on the context.
    ///
    /// Meant for `populate_context` subscribers that augment a request before
    /// providers are matched against it. Visible to every clone.
    pub fn set_extra(&self, key: impl Into<String>, value: impl Into<String>) {
        self.extras.write().insert(key.into(), value.into());
    }

    pub fn extra(&self, key: &str) -> Option<String> {
        self.extras.read().get(key).cloned()
    }

    /// Whether `other` is the same context (possibly from another round).
    pub fn same_as(&self, other: &CompletionContext) -> bool {
        self.id == other.id
    }

    /// Re-target the context after the user kept typing on the same line.
    pub(crate) fn retarget(&mut self, position: Position, prefix: String) {
        self.position = position;
        self.prefix = prefix;
    }

    /// Cancel the current population round.
    pub(crate) fn cancel(&self) {
        self.token.cancel();
    }

    /// Install a fresh token for the next population round of this context.
    pub(crate) fn renew(&mut self) {
        if self.token.is_cancelled() {
            self.token = CancellationToken::new();
        }
    }
}

impl fmt::Debug for CompletionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionContext")
            .field("id", &self.id)
            .field("position", &self.position)
            .field("prefix", &self.prefix)
            .field("interactive", &self.interactive)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
