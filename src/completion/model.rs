//! Proposal model
//!
//! Stores the proposals of the current population round as one block per
//! provider. Blocks keep the order the round was started with (registry
//! order), so a provider registered later always lists after an earlier one,
//! whatever order the providers report in. The flat row sequence, with
//! optional header rows, is derived from the blocks on demand.

use super::provider::{Proposal, ProviderId};

/// What a row holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowKind {
    /// Group header of a provider, never selectable
    Header,
    /// Proposal at this index of its provider's block
    Proposal(usize),
}

/// Stable address of a row
///
/// Unlike a flat index, a key stays valid while other providers append rows
/// before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowKey {
    pub provider: ProviderId,
    pub kind: RowKind,
}

impl RowKey {
    pub fn header(provider: ProviderId) -> Self {
        Self {
            provider,
            kind: RowKind::Header,
        }
    }

    pub fn proposal(provider: ProviderId, index: usize) -> Self {
        Self {
            provider,
            kind: RowKind::Proposal(index),
        }
    }

    pub fn is_header(&self) -> bool {
        matches!(self.kind, RowKind::Header)
    }
}

/// Borrowed view of a row
#[derive(Debug, Clone, Copy)]
pub enum Row<'a> {
    Header {
        provider: ProviderId,
    },
    Proposal {
        provider: ProviderId,
        proposal: &'a Proposal,
    },
}

#[derive(Debug)]
struct ProviderBlock {
    provider: ProviderId,
    proposals: Vec<Proposal>,
    finished: bool,
}

/// Grouped, filterable proposal storage
#[derive(Debug)]
pub struct ProposalModel {
    show_headers: bool,
    blocks: Vec<ProviderBlock>,
    visible: Vec<ProviderId>,
}

impl ProposalModel {
    pub fn new(show_headers: bool) -> Self {
        Self {
            show_headers,
            blocks: Vec::new(),
            visible: Vec::new(),
        }
    }

    pub fn show_headers(&self) -> bool {
        self.show_headers
    }

    pub fn set_show_headers(&mut self, show_headers: bool) {
        self.show_headers = show_headers;
    }

    /// Start a population round for `providers`
    ///
    /// Drops all rows and the visibility filter. Every provider starts pending.
    pub fn begin(&mut self, providers: &[ProviderId]) {
        self.visible.clear();
        self.blocks = providers
            .iter()
            .map(|provider| ProviderBlock {
                provider: *provider,
                proposals: Vec::new(),
                finished: false,
            })
            .collect();
    }

    /// Append `proposals` to the block of `provider`
    ///
    /// Returns `false` (and stores nothing) when `provider` is not part of
    /// the round or already ended.
    pub fn append(&mut self, provider: ProviderId, proposals: Vec<Proposal>) -> bool {
        match self.block_mut(provider) {
            Some(block) if !block.finished => {
                block.proposals.extend(proposals);
                true
            }
            Some(_) => {
                tracing::warn!("Rejected proposals from {} after it finished", provider);
                false
            }
            None => {
                tracing::warn!("Rejected proposals from {} outside the round", provider);
                false
            }
        }
    }

    /// Mark `provider` as finished
    pub fn end(&mut self, provider: ProviderId) -> bool {
        match self.block_mut(provider) {
            Some(block) => {
                block.finished = true;
                true
            }
            None => false,
        }
    }

    /// Abandon the round: every pending provider is ended
    pub fn cancel(&mut self) {
        for block in &mut self.blocks {
            block.finished = true;
        }
    }

    /// Drop all rows and providers
    pub fn clear(&mut self) {
        self.blocks.clear();
        self.visible.clear();
    }

    /// Providers of the round, in round order
    pub fn providers(&self) -> Vec<ProviderId> {
        self.blocks.iter().map(|block| block.provider).collect()
    }

    pub fn is_pending(&self, provider: ProviderId) -> bool {
        self.block(provider).is_some_and(|block| !block.finished)
    }

    pub fn pending(&self) -> Vec<ProviderId> {
        self.blocks
            .iter()
            .filter(|block| !block.finished)
            .map(|block| block.provider)
            .collect()
    }

    pub fn is_populating(&self) -> bool {
        self.blocks.iter().any(|block| !block.finished)
    }

    /// Number of proposals contributed by `provider`
    pub fn n_proposals(&self, provider: ProviderId) -> usize {
        self.block(provider).map_or(0, |block| block.proposals.len())
    }

    /// Whether header rows are emitted for this round
    pub fn has_headers(&self) -> bool {
        self.show_headers && self.blocks.len() > 1
    }

    /// Check for proposal rows
    ///
    /// # Arguments
    /// * `count_all` - `false` looks at visible rows only, `true` at every
    ///   row whatever the visibility filter
    pub fn is_empty(&self, count_all: bool) -> bool {
        !self
            .blocks
            .iter()
            .filter(|block| count_all || self.is_provider_visible(block.provider))
            .any(|block| !block.proposals.is_empty())
    }

    /// Restrict the visible rows to `providers`, empty meaning all
    pub fn set_visible_providers(&mut self, providers: Vec<ProviderId>) {
        self.visible = providers;
    }

    pub fn visible_providers(&self) -> &[ProviderId] {
        &self.visible
    }

    pub fn is_provider_visible(&self, provider: ProviderId) -> bool {
        self.visible.is_empty() || self.visible.contains(&provider)
    }

    /// Every row, ignoring the visibility filter
    pub fn rows(&self) -> Vec<RowKey> {
        self.collect_rows(false)
    }

    /// Rows that pass the visibility filter
    pub fn visible_rows(&self) -> Vec<RowKey> {
        self.collect_rows(true)
    }

    pub fn row(&self, key: &RowKey) -> Option<Row<'_>> {
        let block = self.block(key.provider)?;
        match key.kind {
            RowKind::Header => self.has_headers().then_some(Row::Header {
                provider: key.provider,
            }),
            RowKind::Proposal(index) => block.proposals.get(index).map(|proposal| Row::Proposal {
                provider: key.provider,
                proposal,
            }),
        }
    }

    pub fn proposal(&self, key: &RowKey) -> Option<&Proposal> {
        match self.row(key)? {
            Row::Proposal { proposal, .. } => Some(proposal),
            Row::Header { .. } => None,
        }
    }

    fn collect_rows(&self, visible_only: bool) -> Vec<RowKey> {
        let headers = self.has_headers();
        let mut rows = Vec::new();

        for block in &self.blocks {
            if block.proposals.is_empty() {
                continue;
            }
            if visible_only && !self.is_provider_visible(block.provider) {
                continue;
            }
            if headers {
                rows.push(RowKey::header(block.provider));
            }
            rows.extend((0..block.proposals.len()).map(|i| RowKey::proposal(block.provider, i)));
        }

        rows
    }

    fn block(&self, provider: ProviderId) -> Option<&ProviderBlock> {
        self.blocks.iter().find(|block| block.provider == provider)
    }

    fn block_mut(&mut self, provider: ProviderId) -> Option<&mut ProviderBlock> {
        self.blocks.iter_mut().find(|block| block.provider == provider)
    }
}

impl Default for ProposalModel {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const P1: ProviderId = ProviderId(1);
    const P2: ProviderId = ProviderId(2);
    const P3: ProviderId = ProviderId(3);

    fn proposals(labels: &[&str]) -> Vec<Proposal> {
        labels.iter().map(|label| Proposal::new(*label)).collect()
    }

    fn labels(model: &ProposalModel, rows: &[RowKey]) -> Vec<String> {
        rows.iter()
            .map(|key| match model.row(key) {
                Some(Row::Header { provider }) => format!("[{}]", provider.0),
                Some(Row::Proposal { proposal, .. }) => proposal.label.clone(),
                None => "?".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_single_provider_has_no_header() {
        let mut model = ProposalModel::new(true);
        model.begin(&[P1]);
        model.append(P1, proposals(&["a", "b"]));

        assert_eq!(labels(&model, &model.rows()), vec!["a", "b"]);
    }

    #[test]
    fn test_empty_provider_gets_no_header() {
        let mut model = ProposalModel::new(true);
        model.begin(&[P1, P2]);
        model.append(P1, proposals(&["a", "b"]));
        model.end(P1);
        model.end(P2);

        assert_eq!(labels(&model, &model.rows()), vec!["[1]", "a", "b"]);
        assert!(!model.is_empty(false));
    }

    #[test]
    fn test_headers_disabled() {
        let mut model = ProposalModel::new(false);
        model.begin(&[P1, P2]);
        model.append(P2, proposals(&["x"]));
        model.append(P1, proposals(&["a"]));

        assert_eq!(labels(&model, &model.rows()), vec!["a", "x"]);
    }

    #[test]
    fn test_round_order_beats_arrival_order() {
        let mut model = ProposalModel::new(true);
        model.begin(&[P1, P2]);
        model.append(P2, proposals(&["x", "y"]));
        model.end(P2);
        model.append(P1, proposals(&["a"]));
        model.append(P1, proposals(&["b"]));

        assert_eq!(
            labels(&model, &model.rows()),
            vec!["[1]", "a", "b", "[2]", "x", "y"]
        );
    }

    #[test]
    fn test_append_after_end_is_rejected() {
        let mut model = ProposalModel::new(true);
        model.begin(&[P1]);
        assert!(model.append(P1, proposals(&["a"])));
        assert!(model.end(P1));

        assert!(!model.append(P1, proposals(&["late"])));
        assert_eq!(model.n_proposals(P1), 1);
    }

    #[test]
    fn test_append_outside_round_is_rejected() {
        let mut model = ProposalModel::new(true);
        model.begin(&[P1]);
        assert!(!model.append(P2, proposals(&["a"])));
        assert!(model.is_empty(true));
    }

    #[test]
    fn test_cancel_ends_pending_providers() {
        let mut model = ProposalModel::new(true);
        model.begin(&[P1, P2]);
        model.end(P1);
        assert_eq!(model.pending(), vec![P2]);
        assert!(model.is_populating());

        model.cancel();
        assert!(!model.is_populating());
        assert!(!model.append(P2, proposals(&["late"])));
    }

    #[test]
    fn test_visibility_filter() {
        let mut model = ProposalModel::new(true);
        model.begin(&[P1, P2, P3]);
        model.append(P1, proposals(&["a"]));
        model.append(P3, proposals(&["z"]));

        model.set_visible_providers(vec![P3]);
        assert_eq!(labels(&model, &model.visible_rows()), vec!["[3]", "z"]);
        assert_eq!(model.rows().len(), 4);
        assert_eq!(model.visible_providers(), &[P3]);

        model.set_visible_providers(vec![P2]);
        assert!(model.is_empty(false));
        assert!(!model.is_empty(true));
    }

    #[test]
    fn test_begin_resets_filter_and_rows() {
        let mut model = ProposalModel::new(true);
        model.begin(&[P1, P2]);
        model.append(P1, proposals(&["a"]));
        model.set_visible_providers(vec![P1]);

        model.begin(&[P2]);
        assert!(model.visible_providers().is_empty());
        assert!(model.is_empty(true));
        assert_eq!(model.providers(), vec![P2]);
        assert!(model.is_pending(P2));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut model = ProposalModel::new(true);
        model.begin(&[P1]);
        model.append(P1, proposals(&["a"]));

        model.clear();
        model.clear();
        assert!(model.rows().is_empty());
        assert!(model.providers().is_empty());
    }

    #[test]
    fn test_row_lookup() {
        let mut model = ProposalModel::new(true);
        model.begin(&[P1, P2]);
        model.append(P1, proposals(&["a"]));

        assert_eq!(
            model.proposal(&RowKey::proposal(P1, 0)).map(|p| p.label.as_str()),
            Some("a")
        );
        assert!(model.proposal(&RowKey::header(P1)).is_none());
        assert!(model.row(&RowKey::proposal(P1, 5)).is_none());
        assert!(model.row(&RowKey::proposal(P3, 0)).is_none());
    }
}
