//! In-process gateway that records every send.
//!
//! Used by tests and local experiments. Can be scripted to fail every call or
//! to stall each call, and tracks how many sends overlapped.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use uuid::Uuid;

use super::{SendError, SendGateway};
use crate::engine::{MessageKind, SyntheticMessage};

/// One message as the queue would have received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedSend {
    pub message_id: Uuid,
    pub external_id: String,
    pub body: String,
    pub kind: MessageKind,
}

#[derive(Debug, Default)]
pub struct RecordingGateway {
    sent: Mutex<Vec<RecordedSend>>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delay: Option<Duration>,
    reject_with: Option<String>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every call with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            reject_with: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Hold every call for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Successful sends, in completion order.
    pub fn sent(&self) -> Vec<RecordedSend> {
        self.sent.lock().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }

    /// Every call, including rejected ones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of calls that were in progress at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

/// Decrements the in-flight count even when the send future is dropped.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl SendGateway for RecordingGateway {
    async fn send(&self, message: &SyntheticMessage) -> Result<String, SendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        let _in_flight = InFlight(&self.in_flight);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(reason) = &self.reject_with {
            return Err(SendError::Rejected(reason.clone()));
        }

        let external_id = Uuid::new_v4().to_string();
        self.sent.lock().push(RecordedSend {
            message_id: message.id,
            external_id: external_id.clone(),
            body: message.body.clone(),
            kind: message.kind,
        });
        Ok(external_id)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
