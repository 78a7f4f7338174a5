//! Completion providers and the proposals they produce
//!
//! A provider is one source of completion candidates (buffer words, keywords,
//! snippets, symbols...). The engine asks every matching provider to populate
//! a [`CompletionContext`]; providers answer through the [`ProposalSink`] they
//! are handed, either right away or later from a deferred task.
//!
//! [`ProposalSink`]: super::ProposalSink

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use super::context::{CompletionContext, Position};
use super::sink::ProposalSink;

/// Custom info view built by a provider for one proposal.
///
/// The engine never looks inside; the presentation surface downcasts it.
pub type InfoWidget = Box<dyn Any + Send>;

/// Registry-assigned identity of a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProviderId(pub(crate) u64);

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "provider#{}", self.0)
    }
}

/// One completion candidate
#[derive(Clone, Default)]
pub struct Proposal {
    /// Plain label shown in the popup
    pub label: String,
    /// Optional markup replacing the label when rendered
    pub markup: Option<String>,
    /// Text inserted on activation, the label when absent
    pub text: Option<String>,
    /// Extra information shown in the info panel
    pub info: Option<String>,
    /// Icon name
    pub icon: Option<String>,
    /// Provider-defined handle used at activation time
    pub data: Option<Arc<dyn Any + Send + Sync>>,
}

impl Proposal {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn with_markup(mut self, markup: impl Into<String>) -> Self {
        self.markup = Some(markup.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info = Some(info.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_data<T: Any + Send + Sync>(mut self, data: T) -> Self {
        self.data = Some(Arc::new(data));
        self
    }

    /// Text to insert when the proposal is activated
    pub fn insert_text(&self) -> &str {
        self.text.as_deref().unwrap_or(&self.label)
    }

    /// Downcast the provider-defined handle
    pub fn data<T: Any>(&self) -> Option<&T> {
        self.data.as_deref().and_then(|data| data.downcast_ref::<T>())
    }
}

impl fmt::Debug for Proposal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proposal")
            .field("label", &self.label)
            .field("markup", &self.markup)
            .field("text", &self.text)
            .field("info", &self.info)
            .field("icon", &self.icon)
            .field("has_data", &self.data.is_some())
            .finish()
    }
}

/// Trait implemented by every completion source
///
/// Only [`name`](Self::name) and [`populate`](Self::populate) are required.
pub trait CompletionProvider: Send + Sync {
    /// Name shown in headers and in the provider selection label
    fn name(&self) -> &str;

    /// Icon shown next to the provider name
    fn icon(&self) -> Option<&str> {
        None
    }

    /// Whether the provider wants to take part in `context`
    fn matches(&self, _context: &CompletionContext) -> bool {
        true
    }

    /// Produce proposals for `context`
    ///
    /// Must return promptly. Proposals are reported through `sink`, and the
    /// provider must eventually call [`ProposalSink::finish`] (or add a batch
    /// with `finished = true`), otherwise the request never completes.
    fn populate(&self, context: &CompletionContext, sink: ProposalSink);

    /// Whether the provider takes part in completion triggered by typing
    fn is_interactive(&self) -> bool {
        false
    }

    /// Apply `proposal` at `position`
    ///
    /// Returns `true` when the provider inserted the text itself. Otherwise
    /// the engine replaces the word under the cursor with the proposal text.
    fn activate(&self, _proposal: &Proposal, _position: Position) -> bool {
        false
    }

    /// Info text for `proposal`
    fn info(&self, proposal: &Proposal) -> Option<String> {
        proposal.info.clone()
    }

    /// Custom info view for `proposal`, replacing the info text
    fn info_widget(&self, _proposal: &Proposal) -> Option<InfoWidget> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct SymbolRef(u32);

    #[test]
    fn test_insert_text_defaults_to_label() {
        let proposal = Proposal::new("println");
        assert_eq!(proposal.insert_text(), "println");

        let proposal = Proposal::new("println!").with_text("println!(\"\")");
        assert_eq!(proposal.insert_text(), "println!(\"\")");
    }

    #[test]
    fn test_proposal_data_downcast() {
        let proposal = Proposal::new("len").with_data(SymbolRef(7));
        assert_eq!(proposal.data::<SymbolRef>(), Some(&SymbolRef(7)));
        assert_eq!(proposal.data::<String>(), None);
        assert_eq!(Proposal::new("x").data::<SymbolRef>(), None);
    }

    #[test]
    fn test_proposal_debug_hides_data() {
        let proposal = Proposal::new("len").with_info("Returns the length");
        let rendered = format!("{:?}", proposal);
        assert!(rendered.contains("len"));
        assert!(rendered.contains("has_data: false"));
    }

    #[test]
    fn test_provider_id_display() {
        assert_eq!(ProviderId(3).to_string(), "provider#3");
    }
}
