//! Callback channel between providers and the engine
//!
//! Providers never touch the engine directly. Every batch of proposals goes
//! through an unbounded channel and is applied when the host pumps the engine,
//! which keeps all model mutation on the engine's thread no matter where the
//! provider produced its results.

use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use super::context::ContextId;
use super::provider::{Proposal, ProviderId};

/// Proposals reported by one provider for one population round.
#[derive(Debug, Clone)]
pub struct ProposalBatch {
    pub context: ContextId,
    pub round: u64,
    pub provider: ProviderId,
    pub proposals: Vec<Proposal>,
    pub finished: bool,
}

/// Messages drained by the engine.
#[derive(Debug)]
pub(crate) enum EngineMessage {
    /// A provider reported proposals
    Proposals(ProposalBatch),
    /// The interactive completion delay elapsed
    TriggerElapsed { generation: u64 },
}

/// Capability handed to a provider for one population round
///
/// Cloneable and `Send`, so providers may move it into a spawned task and
/// report from there. Once the round is cancelled every call is a no-op.
#[derive(Debug, Clone)]
pub struct ProposalSink {
    context: ContextId,
    round: u64,
    provider: ProviderId,
    token: CancellationToken,
    tx: UnboundedSender<EngineMessage>,
}

impl ProposalSink {
    pub(crate) fn new(
        context: ContextId,
        round: u64,
        provider: ProviderId,
        token: CancellationToken,
        tx: UnboundedSender<EngineMessage>,
    ) -> Self {
        Self {
            context,
            round,
            provider,
            token,
            tx,
        }
    }

    pub fn provider(&self) -> ProviderId {
        self.provider
    }

    pub fn context(&self) -> ContextId {
        self.context
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Report `proposals`, optionally closing the provider's stream
    ///
    /// Returns `false` when the round was cancelled or the engine is gone;
    /// the batch is dropped in that case.
    pub fn add_proposals(&self, proposals: Vec<Proposal>, finished: bool) -> bool {
        if self.token.is_cancelled() {
            return false;
        }

        let batch = ProposalBatch {
            context: self.context,
            round: self.round,
            provider: self.provider,
            proposals,
            finished,
        };

        self.tx.send(EngineMessage::Proposals(batch)).is_ok()
    }

    /// Close the provider's stream without adding proposals
    pub fn finish(&self) -> bool {
        self.add_proposals(Vec::new(), true)
    }
}
