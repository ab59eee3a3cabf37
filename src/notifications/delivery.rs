//! Delivery channel seam.
//!
//! The concrete provider (SMTP relay, transactional email API) lives outside
//! this crate; collaborators implement [`DeliveryChannel`] and hand it to the
//! drain consumer.

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone)]
pub struct DeliveryReceipt {
    /// Provider-assigned message id
    pub provider_id: String,
}

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Delivery rejected: {message}")]
    Rejected { message: String },

    #[error("Delivery channel unavailable: {message}")]
    Unavailable { message: String },
}

#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<DeliveryReceipt, DeliveryError>;
}

/// Channel that logs instead of delivering. Used by the admin binary when no
/// provider is configured, and handy for dry runs.
pub struct LogOnlyChannel;

#[async_trait]
impl DeliveryChannel for LogOnlyChannel {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<DeliveryReceipt, DeliveryError> {
        info!(
            to = to,
            subject = subject,
            body_bytes = html_body.len(),
            "Log-only delivery"
        );
        Ok(DeliveryReceipt {
            provider_id: format!("log-only:{to}"),
        })
    }
}
