//! NATS message producer for prediction replies

use crate::types::PredictionReply;
use anyhow::Result;
use async_nats::{Client, Subject};
use tracing::debug;

/// Producer for publishing prediction replies to NATS
#[derive(Clone)]
pub struct ReplyProducer {
    client: Client,
    /// Fallback subject when a request carries no reply inbox
    estimate_subject: String,
}

impl ReplyProducer {
    /// Create a new reply producer
    pub fn new(client: Client, estimate_subject: &str) -> Self {
        Self {
            client,
            estimate_subject: estimate_subject.to_string(),
        }
    }

    /// Publish a reply, honoring the request's reply inbox when present.
    pub async fn publish(&self, reply: &PredictionReply, reply_to: Option<Subject>) -> Result<()> {
        let payload = serde_json::to_vec(reply)?;
        let subject = reply_to
            .map(|s| s.to_string())
            .unwrap_or_else(|| self.estimate_subject.clone());

        self.client.publish(subject.clone(), payload.into()).await?;

        match reply {
            PredictionReply::Ok(estimate) => debug!(
                subject = %subject,
                request_id = %estimate.request_id,
                display_value = estimate.display_value,
                "Published estimate"
            ),
            PredictionReply::Error(failure) => debug!(
                subject = %subject,
                request_id = %failure.request_id,
                kind = %failure.kind,
                "Published failure reply"
            ),
        }

        Ok(())
    }

    /// Get the fallback subject name
    pub fn estimate_subject(&self) -> &str {
        &self.estimate_subject
    }
}

#[cfg(test)]
mod tests {
    // Integration tests would require a running NATS server
}
