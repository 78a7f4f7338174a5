//! Hinter for reedline - shows interactive completion inline
//!
//! Every repaint pumps the engine and reports the edited buffer to it, which
//! arms its interactive trigger. Reedline only repaints on input, so a
//! trigger that elapsed during a pause opens its session on the next
//! keystroke; the selected proposal is then shown as a hint after the
//! cursor. Without an interactive proposal the hinter falls back to the
//! history.

use std::sync::Arc;

use nu_ansi_term::{Color, Style};
use reedline::{Hinter, History, SearchQuery};

use super::SharedEngine;
use super::buffer::LineBuffer;
use crate::completion::TextSurface;

/// Inline hinter fed by the completion engine
pub struct EngineHinter {
    engine: SharedEngine,
    buffer: Arc<LineBuffer>,
    /// Style for hints
    style: Style,
    /// Current hint text
    current_hint: String,
}

impl EngineHinter {
    pub fn new(engine: SharedEngine, buffer: Arc<LineBuffer>) -> Self {
        Self {
            engine,
            buffer,
            style: Style::new().italic().fg(Color::DarkGray),
            current_hint: String::new(),
        }
    }

    /// Remaining part of the selected interactive proposal
    fn engine_hint(&self, line: &str, pos: usize) -> Option<String> {
        let mut engine = self.engine.lock();

        // A trigger that elapsed since the last repaint must open its session
        // before this edit re-arms the timer
        engine.dispatch_pending();

        if !self.buffer.matches(line, pos) {
            self.buffer.set(line, pos);
            engine.text_changed(self.buffer.cursor());
            engine.dispatch_pending();
        }

        if !engine.is_visible() {
            return None;
        }

        let typed = self.buffer.word_at_cursor();
        let proposal = engine.selected_proposal()?.insert_text();
        proposal
            .strip_prefix(typed.as_str())
            .filter(|rest| !rest.is_empty())
            .map(str::to_string)
    }

    /// Remaining part of the latest history entry starting with `line`
    fn history_hint(&self, line: &str, history: &dyn History) -> Option<String> {
        let item = history
            .search(SearchQuery::last_with_prefix(line.to_string(), None))
            .ok()?
            .into_iter()
            .next()?;

        item.command_line
            .strip_prefix(line)
            .filter(|rest| !rest.is_empty())
            .map(str::to_string)
    }
}

impl Hinter for EngineHinter {
    fn handle(
        &mut self,
        line: &str,
        pos: usize,
        history: &dyn History,
        use_ansi_coloring: bool,
        _cwd: &str,
    ) -> String {
        self.current_hint.clear();

        let engine_hint = self.engine_hint(line, pos);

        // Hints only make sense at the end of a non-empty line
        if pos != line.len() || line.trim().is_empty() {
            return String::new();
        }

        let Some(hint) = engine_hint.or_else(|| self.history_hint(line, history)) else {
            return String::new();
        };
        self.current_hint = hint;

        if use_ansi_coloring {
            self.style.paint(&self.current_hint).to_string()
        } else {
            self.current_hint.clone()
        }
    }

    fn complete_hint(&self) -> String {
        self.current_hint.clone()
    }

    /// Hints are single words, accepted as a whole
    fn next_hint_token(&self) -> String {
        self.current_hint.clone()
    }
}
