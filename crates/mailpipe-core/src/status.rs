//! Status-store seam between the dispatchers and persistence.
//!
//! The dispatchers record send results and delivery events through this
//! trait without knowing where (or whether) they are stored. The shipped
//! implementation is a no-op; a database-backed implementation plugs in here
//! without touching dispatch logic.

use async_trait::async_trait;

use crate::models::{BounceType, EmailId};

/// Outcome of one send attempt, as recorded by the send dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendRecord {
    /// The provider accepted the message and assigned an id.
    Accepted {
        /// Provider-assigned message id.
        message_id: String,
    },

    /// The send failed permanently and will not be retried.
    Failed {
        /// Why the send failed.
        reason: String,
    },
}

/// One delivery-status event, as recorded by the feedback dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryRecord {
    /// A recipient bounced.
    Bounced {
        /// The bounced recipient address.
        recipient: String,
        /// Bounce classification from the provider.
        bounce_type: BounceType,
    },

    /// A recipient complained.
    Complained {
        /// The complaining recipient address.
        recipient: String,
    },

    /// The message was delivered.
    Delivered {
        /// Addresses the message reached.
        recipients: Vec<String>,
    },

    /// The provider rejected the message after accepting the send call.
    Rejected {
        /// Provider-assigned message id.
        message_id: String,
    },
}

/// Narrow persistence interface for delivery status.
///
/// Implementations must contain their own failures: log and swallow, never
/// propagate back into dispatch. A failed status write must not fail a batch
/// or trigger a queue redelivery.
#[async_trait]
pub trait StatusStore: Send + Sync + std::fmt::Debug {
    /// Records the outcome of one send attempt.
    async fn record_send_result(&self, email_id: &EmailId, record: SendRecord);

    /// Records one delivery-status event.
    ///
    /// `email_id` is `None` when the notification carried no correlation tag,
    /// e.g. for mail sent outside this pipeline.
    async fn record_delivery_event(&self, email_id: Option<&EmailId>, record: DeliveryRecord);
}

/// Status store that discards all records.
///
/// The default until a persistence layer exists; also useful in tests that
/// only exercise dispatch behavior.
#[derive(Debug, Default)]
pub struct NoopStatusStore;

impl NoopStatusStore {
    /// Creates a new no-op status store.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl StatusStore for NoopStatusStore {
    async fn record_send_result(&self, _email_id: &EmailId, _record: SendRecord) {}

    async fn record_delivery_event(&self, _email_id: Option<&EmailId>, _record: DeliveryRecord) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_store_accepts_records_without_effect() {
        let store = NoopStatusStore::new();
        let email_id = EmailId::from("id-1");

        store
            .record_send_result(&email_id, SendRecord::Accepted { message_id: "m-1".into() })
            .await;
        store
            .record_delivery_event(
                Some(&email_id),
                DeliveryRecord::Complained { recipient: "a@example.com".into() },
            )
            .await;
    }
}
