//! Debounced interactive trigger
//!
//! After a text modification the engine waits for the completion delay before
//! opening an interactive request. The wait runs as a tokio task that races a
//! sleep against a cancellation token; when the sleep wins it posts
//! [`EngineMessage::TriggerElapsed`] tagged with the generation it was
//! scheduled under, so a timer superseded after it fired is still ignored.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use super::sink::EngineMessage;

#[derive(Debug)]
struct PendingTrigger {
    generation: u64,
    line: usize,
    token: CancellationToken,
}

/// One-shot, restartable debounce timer
#[derive(Debug, Default)]
pub(crate) struct DebounceTimer {
    generation: u64,
    pending: Option<PendingTrigger>,
}

impl DebounceTimer {
    /// Arm the timer for `delay`, remembering the cursor `line`
    ///
    /// Any previously armed timer is cancelled. Returns `false` when no tokio
    /// runtime is available to run the timer.
    pub fn schedule(&mut self, delay: Duration, line: usize, tx: UnboundedSender<EngineMessage>) -> bool {
        self.cancel();

        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                tracing::warn!("No tokio runtime available, interactive completion disabled");
                return false;
            }
        };

        self.generation += 1;
        let generation = self.generation;
        let token = CancellationToken::new();
        let cancelled = token.clone();

        handle.spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    let _ = tx.send(EngineMessage::TriggerElapsed { generation });
                }
            }
        });

        tracing::trace!("Interactive trigger #{} armed for {:?}", generation, delay);
        self.pending = Some(PendingTrigger {
            generation,
            line,
            token,
        });
        true
    }

    /// Disarm the timer; a message already in flight will be ignored
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.token.cancel();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Consume the timer if `generation` is the armed one
    ///
    /// # Returns
    /// * `Option<usize>` - The line recorded when the timer was armed, or
    ///   `None` for a stale or cancelled timer
    pub fn fire(&mut self, generation: u64) -> Option<usize> {
        match &self.pending {
            Some(pending) if pending.generation == generation => self.pending.take().map(|p| p.line),
            _ => None,
        }
    }
}

impl Drop for DebounceTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn test_timer_fires_after_delay() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timer = DebounceTimer::default();

        assert!(timer.schedule(Duration::from_millis(250), 3, tx));
        assert!(timer.is_pending());

        match rx.recv().await {
            Some(EngineMessage::TriggerElapsed { generation }) => {
                assert_eq!(timer.fire(generation), Some(3));
                assert!(!timer.is_pending());
            }
            other => panic!("Expected trigger, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_supersedes_previous_timer() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timer = DebounceTimer::default();

        timer.schedule(Duration::from_millis(250), 1, tx.clone());
        tokio::time::sleep(Duration::from_millis(100)).await;
        timer.schedule(Duration::from_millis(250), 2, tx);

        match rx.recv().await {
            Some(EngineMessage::TriggerElapsed { generation }) => {
                assert_eq!(generation, 2);
                assert_eq!(timer.fire(generation), Some(2));
            }
            other => panic!("Expected trigger, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_timer_never_fires() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timer = DebounceTimer::default();

        timer.schedule(Duration::from_millis(250), 1, tx);
        timer.cancel();
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert!(rx.try_recv().is_err());
        assert!(!timer.is_pending());
    }

    #[test]
    fn test_stale_generation_is_ignored() {
        let mut timer = DebounceTimer::default();
        assert_eq!(timer.fire(1), None);
    }

    #[test]
    fn test_schedule_without_runtime() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut timer = DebounceTimer::default();
        assert!(!timer.schedule(Duration::from_millis(250), 0, tx));
        assert!(!timer.is_pending());
    }
}
