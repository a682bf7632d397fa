//! The orchestrator's observer channel (spec §6 "Orchestrator observer
//! interface"): a broadcast of typed events a caller can subscribe to
//! without blocking the run itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// One notification emitted during a run. Subscribers that lag behind
/// the broadcast buffer miss older events (`RecvError::Lagged`) rather
/// than stalling the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OrchestratorEvent {
    Progress {
        phase: String,
        completed: usize,
        total: usize,
        current: Option<String>,
        timestamp: DateTime<Utc>,
    },
    ExtractorComplete {
        extractor_id: String,
        succeeded: bool,
        timestamp: DateTime<Utc>,
    },
    Error {
        extractor_id: Option<String>,
        message: String,
        timestamp: DateTime<Utc>,
    },
}

const CHANNEL_CAPACITY: usize = 256;

/// Owns the broadcast sender; cheap to clone, since `broadcast::Sender`
/// is itself an `Arc` internally.
#[derive(Debug, Clone)]
pub struct Observer {
    sender: broadcast::Sender<OrchestratorEvent>,
}

impl Observer {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OrchestratorEvent> {
        self.sender.subscribe()
    }

    /// Broadcasting has no listeners error; silently drop the event
    /// when nobody is subscribed rather than treating it as a failure.
    pub(crate) fn emit(&self, event: OrchestratorEvent) {
        let _ = self.sender.send(event);
    }

    pub(crate) fn progress(&self, phase: &str, completed: usize, total: usize, current: Option<String>) {
        self.emit(OrchestratorEvent::Progress {
            phase: phase.to_string(),
            completed,
            total,
            current,
            timestamp: Utc::now(),
        });
    }

    pub(crate) fn extractor_complete(&self, extractor_id: &str, succeeded: bool) {
        self.emit(OrchestratorEvent::ExtractorComplete {
            extractor_id: extractor_id.to_string(),
            succeeded,
            timestamp: Utc::now(),
        });
    }

    pub(crate) fn error(&self, extractor_id: Option<&str>, message: impl Into<String>) {
        self.emit(OrchestratorEvent::Error {
            extractor_id: extractor_id.map(|s| s.to_string()),
            message: message.into(),
            timestamp: Utc::now(),
        });
    }
}

impl Default for Observer {
    fn default() -> Self {
        Self::new()
    }
}

/// Cooperative cancellation token (spec §5): polled between phases and
/// before dispatching each phase-3 extractor. A plain atomic flag
/// rather than a dedicated crate — the orchestrator's cancellation
/// surface is this simple.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: std::sync::Arc<std::sync::atomic::AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self {
            cancelled: std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false)),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(std::sync::atomic::Ordering::SeqCst)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_emitted_events() {
        let observer = Observer::new();
        let mut rx = observer.subscribe();
        observer.progress("phase3", 1, 10, Some("FINANCIALS".into()));
        let event = rx.recv().await.unwrap();
        assert!(matches!(event, OrchestratorEvent::Progress { completed: 1, total: 10, .. }));
    }

    #[test]
    fn cancellation_token_starts_uncancelled() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn cancellation_token_clones_share_state() {
        let token = CancellationToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }
}
