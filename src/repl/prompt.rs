//! Prompt for the completion REPL

use std::borrow::Cow;

use reedline::{Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus};

/// Prompt showing the line number and how many words are known
pub struct EnginePrompt {
    /// 1-based number of the line being edited
    line_number: usize,
    /// Words remembered by the words provider
    known_words: usize,
}

impl EnginePrompt {
    pub fn new(line_number: usize, known_words: usize) -> Self {
        Self {
            line_number,
            known_words,
        }
    }
}

impl Prompt for EnginePrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        format!("[{}] ", self.line_number).into()
    }

    /// Word count on the right, empty until the first word is learnt
    fn render_prompt_right(&self) -> Cow<'_, str> {
        match self.known_words {
            0 => "".into(),
            1 => "1 word".into(),
            n => format!("{} words", n).into(),
        }
    }

    fn render_prompt_indicator(&self, prompt_mode: PromptEditMode) -> Cow<'_, str> {
        match prompt_mode {
            PromptEditMode::Vi(_) => ": ".into(),
            _ => "> ".into(),
        }
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        "... ".into()
    }

    fn render_prompt_history_search_indicator(&self, history_search: PromptHistorySearch) -> Cow<'_, str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };

        format!("({}reverse-search: {}) ", prefix, history_search.term).into()
    }
}
