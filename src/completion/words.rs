//! Built-in providers
//!
//! [`WordsProvider`] offers words already seen in the text, [`KeywordProvider`]
//! a fixed list such as language keywords. Both answer synchronously.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use super::context::CompletionContext;
use super::provider::{CompletionProvider, Proposal};
use super::sink::ProposalSink;
use super::surface::is_word_char;

/// Keep the items starting with `prefix`, best candidates first
///
/// Exact matches come first, then shorter items (more specific matches), then
/// alphabetical order.
pub fn filter_by_prefix<'a>(items: impl IntoIterator<Item = &'a str>, prefix: &str) -> Vec<String> {
    let mut filtered: Vec<String> = items
        .into_iter()
        .filter(|item| item.starts_with(prefix))
        .map(str::to_string)
        .collect();

    filtered.sort_by(|a, b| {
        if !prefix.is_empty() {
            let a_exact = a == prefix;
            let b_exact = b == prefix;
            if a_exact != b_exact {
                return b_exact.cmp(&a_exact);
            }
        }

        a.len().cmp(&b.len()).then_with(|| a.cmp(b))
    });

    filtered
}

/// Words seen in the text, offered while typing
pub struct WordsProvider {
    min_word_length: usize,
    words: RwLock<BTreeMap<String, usize>>,
}

impl WordsProvider {
    pub fn new(min_word_length: usize) -> Self {
        Self {
            min_word_length,
            words: RwLock::new(BTreeMap::new()),
        }
    }

    /// Record every word of `text` at least `min_word_length` characters long
    pub fn add_text(&self, text: &str) {
        let mut words = self.words.write();
        for word in text
            .split(|c: char| !is_word_char(c))
            .filter(|word| word.chars().count() >= self.min_word_length)
        {
            *words.entry(word.to_string()).or_insert(0) += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.words.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.read().is_empty()
    }

    pub fn clear(&self) {
        self.words.write().clear();
    }
}

impl CompletionProvider for WordsProvider {
    fn name(&self) -> &str {
        "Words"
    }

    fn icon(&self) -> Option<&str> {
        Some("text-x-generic")
    }

    /// Typing only triggers completion inside a word
    fn matches(&self, context: &CompletionContext) -> bool {
        !context.is_interactive() || !context.prefix().is_empty()
    }

    fn populate(&self, context: &CompletionContext, sink: ProposalSink) {
        let words = self.words.read();
        let proposals = filter_by_prefix(words.keys().map(String::as_str), context.prefix())
            .into_iter()
            .filter(|word| !(context.is_interactive() && word == context.prefix()))
            .map(|word| {
                let count = words.get(&word).copied().unwrap_or_default();
                let plural = if count == 1 { "" } else { "s" };
                Proposal::new(word).with_info(format!("Seen {} time{}", count, plural))
            })
            .collect();

        sink.add_proposals(proposals, true);
    }

    fn is_interactive(&self) -> bool {
        true
    }
}

/// Fixed list of keywords
pub struct KeywordProvider {
    name: String,
    keywords: Vec<String>,
}

impl KeywordProvider {
    pub fn new(name: impl Into<String>, keywords: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }
}

impl CompletionProvider for KeywordProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn icon(&self) -> Option<&str> {
        Some("format-text-bold")
    }

    fn matches(&self, _context: &CompletionContext) -> bool {
        !self.keywords.is_empty()
    }

    fn populate(&self, context: &CompletionContext, sink: ProposalSink) {
        let proposals = filter_by_prefix(self.keywords.iter().map(String::as_str), context.prefix())
            .into_iter()
            .map(|keyword| Proposal::new(keyword).with_info(format!("{} keyword", self.name)))
            .collect();

        sink.add_proposals(proposals, true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::context::Position;
    use crate::completion::provider::ProviderId;
    use crate::completion::sink::EngineMessage;
    use tokio::sync::mpsc;

    fn collect(provider: &dyn CompletionProvider, context: &CompletionContext) -> Vec<String> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = ProposalSink::new(context.id(), 1, ProviderId(1), context.cancellation_token(), tx);
        provider.populate(context, sink);

        match rx.try_recv() {
            Ok(EngineMessage::Proposals(batch)) => {
                assert!(batch.finished);
                batch.proposals.into_iter().map(|p| p.label).collect()
            }
            other => panic!("Expected proposals, got {:?}", other),
        }
    }

    fn create_test_context(prefix: &str) -> CompletionContext {
        CompletionContext::new(Position::default()).with_prefix(prefix)
    }

    #[test]
    fn test_filter_empty_prefix() {
        let filtered = filter_by_prefix(["beta", "alpha"], "");
        assert_eq!(filtered, vec!["beta", "alpha"]);
    }

    #[test]
    fn test_filter_matching_prefix() {
        let filtered = filter_by_prefix(["alpha", "beta", "gamma"], "a");
        assert_eq!(filtered, vec!["alpha"]);
    }

    #[test]
    fn test_filter_no_match() {
        assert!(filter_by_prefix(["alpha", "beta"], "z").is_empty());
    }

    #[test]
    fn test_sort_shorter_names_first() {
        let filtered = filter_by_prefix(["tag_spare_shadow", "tag_spare", "tag_spare_archive"], "tag_sp");
        assert_eq!(filtered, vec!["tag_spare", "tag_spare_shadow", "tag_spare_archive"]);
    }

    #[test]
    fn test_exact_match_first() {
        let filtered = filter_by_prefix(["format", "for", "fo"], "for");
        assert_eq!(filtered, vec!["for", "format"]);
    }

    #[test]
    fn test_words_provider_collects_words() {
        let provider = WordsProvider::new(3);
        provider.add_text("let total = total + item.price;");

        assert_eq!(provider.len(), 4);
        assert_eq!(collect(&provider, &create_test_context("t")), vec!["total"]);
        assert_eq!(
            collect(&provider, &create_test_context("")),
            vec!["let", "item", "price", "total"]
        );
    }

    #[test]
    fn test_words_provider_skips_typed_word_while_typing() {
        let provider = WordsProvider::new(2);
        provider.add_text("print println");

        let typing = create_test_context("print").with_interactive(true);
        assert_eq!(collect(&provider, &typing), vec!["println"]);

        let explicit = create_test_context("print");
        assert_eq!(collect(&provider, &explicit), vec!["print", "println"]);
    }

    #[test]
    fn test_words_provider_matching() {
        let provider = WordsProvider::new(3);
        assert!(provider.matches(&create_test_context("")));
        assert!(!provider.matches(&create_test_context("").with_interactive(true)));
        assert!(provider.matches(&create_test_context("ab").with_interactive(true)));
        assert!(provider.is_interactive());
    }

    #[test]
    fn test_words_provider_info_counts() {
        let provider = WordsProvider::new(3);
        provider.add_text("foo foo bar");

        let (tx, mut rx) = mpsc::unbounded_channel();
        let context = create_test_context("f");
        provider.populate(&context, ProposalSink::new(context.id(), 1, ProviderId(1), context.cancellation_token(), tx));

        match rx.try_recv() {
            Ok(EngineMessage::Proposals(batch)) => {
                assert_eq!(batch.proposals[0].info.as_deref(), Some("Seen 2 times"));
            }
            other => panic!("Expected proposals, got {:?}", other),
        }
    }

    #[test]
    fn test_words_provider_clear() {
        let provider = WordsProvider::new(1);
        provider.add_text("a b");
        provider.clear();
        assert!(provider.is_empty());
    }

    #[test]
    fn test_keyword_provider() {
        let provider = KeywordProvider::new("Rust", ["fn", "for", "format", "let"]);
        assert_eq!(provider.name(), "Rust");
        assert!(!provider.is_interactive());
        assert_eq!(collect(&provider, &create_test_context("f")), vec!["fn", "for", "format"]);

        let empty = KeywordProvider::new("None", Vec::<String>::new());
        assert!(!empty.matches(&create_test_context("")));
    }
}
