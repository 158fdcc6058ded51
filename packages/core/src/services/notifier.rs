//! Notifier interface
//!
//! One outbound text message per call. No retry, no queuing.

use async_trait::async_trait;

use crate::services::error::NotifyError;

/// Provider-assigned identifier of an accepted message.
pub type MessageSid = String;

/// Trait for messaging providers so callers do not depend on Twilio.
#[async_trait]
pub trait Notifier {
    /// Send `body` to `to`, returning the provider's message id.
    async fn send(&self, to: &str, body: &str) -> Result<MessageSid, NotifyError>;

    /// Name of this provider for logging.
    fn provider_name(&self) -> &str;
}

/// Send a message and swallow any failure after logging it.
///
/// Returns `true` when the provider acknowledged the message.
pub async fn deliver(notifier: &(dyn Notifier + Send + Sync), to: &str, body: &str) -> bool {
    match notifier.send(to, body).await {
        Ok(sid) => {
            tracing::info!(to = %to, sid = %sid, "Message sent");
            true
        }
        Err(err) => {
            tracing::error!(
                to = %to,
                provider = notifier.provider_name(),
                "Failed to send message: {}",
                err
            );
            false
        }
    }
}
