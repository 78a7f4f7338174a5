//! Provider cycling
//!
//! Computes the next visibility filter when the user steps through the
//! providers of a round: either "all providers" or one isolated provider.
//! The walk wraps through the "all" state after the last provider.

use super::model::ProposalModel;
use super::provider::ProviderId;

/// Eligible providers of a round and where the filter stands among them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderCount {
    /// Providers that are isolated or have at least one proposal
    pub eligible: usize,
    /// Index of the isolated provider among eligible ones, `eligible` for "all"
    pub position: usize,
}

impl ProviderCount {
    pub fn is_all(&self) -> bool {
        self.position == self.eligible
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// New filter chosen by [`cycle`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Nothing to move to
    Unchanged,
    /// Show only this provider
    Isolate(ProviderId),
    /// Show all providers
    ShowAll,
}

/// The single isolated provider, if any
pub fn isolated(model: &ProposalModel) -> Option<ProviderId> {
    match model.visible_providers() {
        [single] => Some(*single),
        _ => None,
    }
}

pub fn count_eligible(providers: &[ProviderId], model: &ProposalModel) -> ProviderCount {
    let visible = isolated(model);
    let mut eligible = 0;
    let mut position = None;

    for provider in providers {
        if Some(*provider) == visible {
            position = Some(eligible);
            eligible += 1;
        } else if model.n_proposals(*provider) > 0 {
            eligible += 1;
        }
    }

    ProviderCount {
        eligible,
        position: position.unwrap_or(eligible),
    }
}

/// Step the visibility filter over `providers` in `direction`
///
/// Providers without proposals are skipped. Past either end the walk reaches
/// the "all" state, which is only a valid stop when the model holds any
/// proposal at all.
pub fn cycle(providers: &[ProviderId], model: &ProposalModel, direction: Direction) -> CycleOutcome {
    let visible = isolated(model);

    if count_eligible(providers, model).eligible <= 1 {
        return match visible {
            Some(_) => CycleOutcome::ShowAll,
            None => CycleOutcome::Unchanged,
        };
    }

    // More than one eligible provider, so the list is not empty.
    let end = providers.len() - 1;
    let (head, tail) = match direction {
        Direction::Forward => (0, end),
        Direction::Backward => (end, 0),
    };

    let origin = visible.and_then(|id| providers.iter().position(|p| *p == id));
    let mut current = origin;

    loop {
        current = match current {
            None => Some(head),
            Some(index) if index == tail => None,
            Some(index) => match direction {
                Direction::Forward => Some(index + 1),
                Direction::Backward => Some(index - 1),
            },
        };

        let stop = match current {
            Some(index) => model.n_proposals(providers[index]) != 0,
            None => !model.is_empty(true),
        };

        if stop || current == origin {
            break;
        }
    }

    if current == origin {
        return CycleOutcome::Unchanged;
    }

    match current {
        Some(index) => CycleOutcome::Isolate(providers[index]),
        None => CycleOutcome::ShowAll,
    }
}
