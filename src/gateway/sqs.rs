//! Amazon SQS gateway.
//!
//! Supports standard AWS SQS and SQS-compatible endpoints (LocalStack,
//! ElasticMQ) through `queue.endpoint_url`. Credentials come from the usual
//! AWS provider chain.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_sqs::error::{DisplayErrorContext, SdkError};
use aws_sdk_sqs::Client;

use super::{SendError, SendGateway};
use crate::config::QueueConfig;
use crate::engine::SyntheticMessage;

/// SQS-backed gateway. The SDK client is cheap to clone and pooled internally.
#[derive(Clone)]
pub struct SqsGateway {
    client: Client,
    queue_url: String,
    fifo: bool,
}

impl SqsGateway {
    /// Build the SDK client for `config`.
    ///
    /// Returns `None` when no queue URL is configured; startup validation
    /// rejects that case before this is called.
    pub async fn new(config: &QueueConfig) -> Option<Self> {
        let queue_url = config.url.clone()?;

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()));
        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;

        tracing::info!(
            queue_url = %queue_url,
            region = %config.region,
            endpoint = ?config.endpoint_url,
            fifo = config.is_fifo(),
            "SQS gateway initialized"
        );

        Some(Self {
            client: Client::new(&sdk_config),
            queue_url,
            fifo: config.is_fifo(),
        })
    }
}

#[async_trait]
impl SendGateway for SqsGateway {
    async fn send(&self, message: &SyntheticMessage) -> Result<String, SendError> {
        let mut request = self
            .client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(&message.body);

        if self.fifo {
            request = request
                .message_group_id(message.kind.group_id())
                .message_deduplication_id(message.id.to_string());
        }

        match request.send().await {
            Ok(output) => Ok(output
                .message_id()
                .map(str::to_string)
                .unwrap_or_else(|| message.id.to_string())),
            Err(SdkError::ServiceError(e)) => {
                Err(SendError::Rejected(DisplayErrorContext(e.err()).to_string()))
            }
            Err(e) => Err(SendError::Transport(DisplayErrorContext(&e).to_string())),
        }
    }

    fn name(&self) -> &'static str {
        "sqs"
    }
}
