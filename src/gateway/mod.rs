//! Message queue gateway.
//!
//! # Data Flow
//! ```text
//! RunLoop / invoke-once
//!     → dispatch() (timeout + timing + outcome)
//!     → SendGateway::send()
//!         → sqs.rs (Amazon SQS, production)
//!         → memory.rs (in-process recorder, tests)
//! ```
//!
//! Implementations are shared behind `Arc<dyn SendGateway>` by the loop and
//! by concurrent invoke-once calls, so they must hold no per-call mutable
//! state beyond a client that is itself safe for concurrent use.

mod memory;
mod sqs;

pub use memory::{RecordedSend, RecordingGateway};
pub use sqs::SqsGateway;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::engine::SyntheticMessage;

/// Failure of a real send attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    /// The call did not finish within the configured send timeout.
    #[error("send timed out after {0:?}")]
    Timeout(Duration),

    /// The queue answered and refused the message.
    #[error("queue rejected message: {0}")]
    Rejected(String),

    /// Network, credentials or SDK failure before the queue answered.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Outbound side of the external message queue.
#[async_trait]
pub trait SendGateway: Send + Sync {
    /// Deliver one message, returning the queue-assigned id.
    async fn send(&self, message: &SyntheticMessage) -> Result<String, SendError>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// What happened to one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendOutcome {
    pub attempted: bool,
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SendOutcome {
    /// The message was never handed to the gateway.
    pub fn skipped() -> Self {
        Self {
            attempted: false,
            succeeded: false,
            external_id: None,
            error: None,
        }
    }

    pub fn delivered(external_id: String) -> Self {
        Self {
            attempted: true,
            succeeded: true,
            external_id: Some(external_id),
            error: None,
        }
    }

    pub fn failed(error: String) -> Self {
        Self {
            attempted: true,
            succeeded: false,
            external_id: None,
            error: Some(error),
        }
    }
}

impl From<Result<String, SendError>> for SendOutcome {
    fn from(result: Result<String, SendError>) -> Self {
        match result {
            Ok(id) => Self::delivered(id),
            Err(e) => Self::failed(e.to_string()),
        }
    }
}

/// Send one message with an upper bound on how long the call may take.
///
/// Returns the outcome and how long the attempt took.
pub async fn dispatch(
    gateway: &dyn SendGateway,
    message: &SyntheticMessage,
    timeout: Duration,
) -> (SendOutcome, Duration) {
    let start = Instant::now();
    let result = match tokio::time::timeout(timeout, gateway.send(message)).await {
        Ok(result) => result,
        Err(_) => Err(SendError::Timeout(timeout)),
    };
    (SendOutcome::from(result), start.elapsed())
}
