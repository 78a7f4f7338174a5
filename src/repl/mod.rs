//! Interactive line editor driven by the completion engine
//!
//! This module wires a [`CompletionEngine`] into reedline:
//! - Tab opens a columnar menu filled by an explicit engine request
//! - Typing arms the engine's interactive trigger, its answer shows as a hint
//! - Submitted lines teach the words provider new words
//! - Configured keywords are always offered

mod buffer;
mod completer;
mod hinter;
mod prompt;

use std::sync::Arc;

use parking_lot::Mutex;
use reedline::{
    ColumnarMenu, Emacs, FileBackedHistory, KeyCode, KeyModifiers, MenuBuilder, Reedline, ReedlineEvent,
    ReedlineMenu, Signal, default_emacs_keybindings,
};

use crate::completion::{CompletionEngine, KeywordProvider, WordsProvider};
use crate::config::Config;
use crate::error::{CompletionError, Result};

pub use buffer::LineBuffer;
pub use completer::EngineCompleter;
pub use hinter::EngineHinter;
pub use prompt::EnginePrompt;

/// Engine shared between the completer and the hinter
pub type SharedEngine = Arc<Mutex<CompletionEngine>>;

const COMPLETION_MENU: &str = "completion_menu";
const HISTORY_SIZE: usize = 500;

/// Engine with its buffer and the words provider the REPL feeds
pub struct EngineParts {
    pub engine: SharedEngine,
    pub buffer: Arc<LineBuffer>,
    pub words: Arc<WordsProvider>,
}

/// Build an engine with the words and keyword providers registered
pub fn build_engine(config: &Config) -> Result<EngineParts> {
    let buffer = Arc::new(LineBuffer::new());
    let words = Arc::new(WordsProvider::new(config.repl.min_word_length));

    let mut engine = CompletionEngine::new(config.completion.clone(), buffer.clone());
    engine.add_provider(words.clone())?;
    engine.add_provider(Arc::new(KeywordProvider::new("Keywords", config.repl.keywords.clone())))?;

    engine.signals().show.connect(|_| tracing::trace!("Completion shown"));
    engine.signals().hide.connect(|_| tracing::trace!("Completion hidden"));

    Ok(EngineParts {
        engine: Arc::new(Mutex::new(engine)),
        buffer,
        words,
    })
}

/// REPL engine reading lines with engine-backed completion
pub struct ReplEngine {
    /// Line editor for input
    editor: Reedline,

    parts: EngineParts,

    /// Number of lines submitted so far
    submitted: usize,

    /// Whether to continue running
    running: bool,
}

impl ReplEngine {
    /// Create a new REPL engine
    ///
    /// # Arguments
    /// * `config` - Completion and REPL configuration
    ///
    /// # Returns
    /// * `Result<Self>` - New REPL engine or error
    pub fn new(config: &Config) -> Result<Self> {
        let parts = build_engine(config)?;

        let mut keybindings = default_emacs_keybindings();
        keybindings.add_binding(
            KeyModifiers::NONE,
            KeyCode::Tab,
            ReedlineEvent::UntilFound(vec![
                ReedlineEvent::Menu(COMPLETION_MENU.to_string()),
                ReedlineEvent::MenuNext,
            ]),
        );

        let history = FileBackedHistory::new(HISTORY_SIZE)
            .map_err(|e| CompletionError::Generic(format!("History error: {}", e)))?;
        let menu = ColumnarMenu::default().with_name(COMPLETION_MENU);

        let editor = Reedline::create()
            .with_history(Box::new(history))
            .with_completer(Box::new(EngineCompleter::new(parts.engine.clone(), parts.buffer.clone())))
            .with_hinter(Box::new(EngineHinter::new(parts.engine.clone(), parts.buffer.clone())))
            .with_menu(ReedlineMenu::EngineCompleter(Box::new(menu)))
            .with_edit_mode(Box::new(Emacs::new(keybindings)));

        Ok(Self {
            editor,
            parts,
            submitted: 0,
            running: true,
        })
    }

    /// Read a single line of input
    ///
    /// # Returns
    /// * `Result<Option<String>>` - Input line, empty on Ctrl-C, `None` on Ctrl-D
    pub fn read_line(&mut self) -> Result<Option<String>> {
        let prompt = EnginePrompt::new(self.submitted + 1, self.parts.words.len());

        match self.editor.read_line(&prompt)? {
            Signal::Success(line) => Ok(Some(line)),
            Signal::CtrlD => {
                self.running = false;
                Ok(None)
            }
            _ => Ok(Some(String::new())),
        }
    }

    /// Close the completion session and learn the words of `line`
    pub fn submit(&mut self, line: &str) {
        self.parts.engine.lock().hide();
        self.parts.words.add_text(line);
        self.submitted += 1;
        tracing::debug!("Line {} submitted, {} words known", self.submitted, self.parts.words.len());
    }

    /// Engine serving completions for this REPL
    pub fn engine(&self) -> &SharedEngine {
        &self.parts.engine
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Check if REPL is still running
    pub fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::SessionState;

    #[test]
    fn test_build_engine_registers_providers() {
        let parts = build_engine(&Config::default()).unwrap();
        let engine = parts.engine.lock();

        let names: Vec<String> = engine
            .providers()
            .into_iter()
            .filter_map(|id| engine.provider(id).map(|p| p.name().to_string()))
            .collect();
        assert_eq!(names, vec!["Words", "Keywords"]);
        assert_eq!(engine.interactive_providers().len(), 1);
    }

    #[test]
    fn test_build_engine_applies_config() {
        let mut config = Config::default();
        config.completion.show_headers = false;
        config.repl.min_word_length = 5;

        let parts = build_engine(&config).unwrap();
        parts.words.add_text("tiny longer");

        assert_eq!(parts.words.len(), 1);
        assert!(!parts.engine.lock().model().show_headers());
    }

    #[test]
    fn test_submit_learns_words_and_hides() {
        let mut repl = ReplEngine::new(&Config::default()).unwrap();

        repl.parts.buffer.set("he", 2);
        {
            let mut engine = repl.engine().lock();
            let context = engine.create_context(None);
            engine.request_all(context).unwrap();
        }
        repl.submit("hello world");

        assert_eq!(repl.parts.words.len(), 2);
        assert_eq!(repl.submitted, 1);
        assert_eq!(repl.engine().lock().state(), SessionState::Idle);
    }

    #[test]
    fn test_stop() {
        let mut repl = ReplEngine::new(&Config::default()).unwrap();
        assert!(repl.is_running());
        repl.stop();
        assert!(!repl.is_running());
    }
}
