//! Completer for reedline - serves Tab completion from the engine

use std::sync::Arc;

use reedline::{Completer, Span, Suggestion};

use super::SharedEngine;
use super::buffer::LineBuffer;
use crate::completion::{CompletionEngine, Row};

/// Reedline completer backed by a [`CompletionEngine`]
///
/// Each Tab press opens an explicit request for every provider. Providers
/// answering synchronously are collected right away; deferred answers
/// arriving later are dropped with the session.
pub struct EngineCompleter {
    engine: SharedEngine,
    buffer: Arc<LineBuffer>,
}

impl EngineCompleter {
    pub fn new(engine: SharedEngine, buffer: Arc<LineBuffer>) -> Self {
        Self { engine, buffer }
    }
}

impl Completer for EngineCompleter {
    /// Complete the input at the given cursor position
    ///
    /// # Arguments
    /// * `line` - The input buffer
    /// * `pos` - Cursor position (byte index)
    ///
    /// # Returns
    /// * `Vec<Suggestion>` - Visible proposals, in popup order
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        self.buffer.set(line, pos);
        let (start, end) = self.buffer.word_span();

        let mut engine = self.engine.lock();
        let context = engine.create_context(None);
        if let Err(err) = engine.request_all(context) {
            tracing::debug!("Tab completion: {}", err);
            return Vec::new();
        }
        engine.dispatch_pending();

        let suggestions = visible_suggestions(&engine, Span::new(start, end));
        engine.hide();
        suggestions
    }
}

/// Convert the engine's visible proposal rows into reedline suggestions
///
/// Header rows are folded into the description as a provider prefix.
fn visible_suggestions(engine: &CompletionEngine, span: Span) -> Vec<Suggestion> {
    let model = engine.model();
    let tag_provider = model.has_headers();

    model
        .visible_rows()
        .iter()
        .filter_map(|key| match model.row(key)? {
            Row::Header { .. } => None,
            Row::Proposal { provider, proposal } => {
                let provider_name = engine.provider(provider).map(|p| p.name().to_string());
                let description = match (tag_provider, provider_name, proposal.info.as_deref()) {
                    (true, Some(name), Some(info)) => Some(format!("{}: {}", name, info)),
                    (true, Some(name), None) => Some(name),
                    (_, _, info) => info.map(str::to_string),
                };

                Some(Suggestion {
                    value: proposal.insert_text().to_string(),
                    description,
                    style: None,
                    extra: None,
                    span,
                    append_whitespace: false,
                    match_indices: None,
                })
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::SessionState;
    use crate::config::Config;
    use crate::repl::build_engine;

    fn create_test_config() -> Config {
        let mut config = Config::default();
        config.repl.keywords = vec!["print_all".to_string(), "return".to_string()];
        config
    }

    fn create_test_completer(text: &str) -> (EngineCompleter, SharedEngine) {
        create_test_completer_with(create_test_config(), text)
    }

    fn create_test_completer_with(config: Config, text: &str) -> (EngineCompleter, SharedEngine) {
        let parts = build_engine(&config).unwrap();
        parts.words.add_text(text);

        let completer = EngineCompleter::new(parts.engine.clone(), parts.buffer);
        (completer, parts.engine)
    }

    #[test]
    fn test_complete_words() {
        let (mut completer, _) = create_test_completer("print println");
        let suggestions = completer.complete("pri", 3);

        let values: Vec<&str> = suggestions.iter().map(|s| s.value.as_str()).collect();
        assert_eq!(values, vec!["print", "println", "print_all"]);
    }

    #[test]
    fn test_provider_tagged_descriptions() {
        let (mut completer, _) = create_test_completer("print");
        let suggestions = completer.complete("pri", 3);

        assert_eq!(suggestions[0].description.as_deref(), Some("Words: Seen 1 time"));
        assert_eq!(suggestions[1].description.as_deref(), Some("Keywords: Keywords keyword"));
    }

    #[test]
    fn test_untagged_descriptions_without_headers() {
        let mut config = create_test_config();
        config.completion.show_headers = false;
        let (mut completer, _) = create_test_completer_with(config, "");
        let suggestions = completer.complete("ret", 3);

        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].description.as_deref(), Some("Keywords keyword"));
    }

    #[test]
    fn test_span_position() {
        let (mut completer, _) = create_test_completer("total");
        let suggestions = completer.complete("x = to + 1", 6);

        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].span.start, 4);
        assert_eq!(suggestions[0].span.end, 6);
    }

    #[test]
    fn test_no_match() {
        let (mut completer, engine) = create_test_completer("alpha");
        assert!(completer.complete("zzz", 3).is_empty());
        assert_eq!(engine.lock().state(), SessionState::Idle);
    }

    #[test]
    fn test_session_closed_after_completion() {
        let (mut completer, engine) = create_test_completer("print");
        assert!(!completer.complete("pr", 2).is_empty());

        let engine = engine.lock();
        assert!(!engine.is_visible());
        assert!(engine.context().is_none());
    }
}
