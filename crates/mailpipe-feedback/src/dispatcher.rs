//! Feedback dispatcher: classify and record delivery-status notifications.
//!
//! Each envelope in the batch carries a JSON-encoded notification from the
//! provider's feedback channel. The dispatcher parses it, pulls the
//! correlation id out of the echoed tags, and acts per event type. There is
//! no transient failure class on this path: every item either handles, is
//! ignored, or fails its parse, and the invocation always completes the
//! batch.

use std::sync::Arc;

use aws_lambda_events::event::sns::SnsEvent;
use mailpipe_core::{
    models::{EmailId, EventType},
    DeliveryRecord, ParseError, SesNotification, StatusStore,
};
use tracing::{debug, error, info, warn};

/// Per-invocation counters for a processed feedback batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Notifications handled by a matching branch.
    pub processed: usize,
    /// Notifications with an unrecognized event type, dropped silently.
    pub ignored: usize,
    /// Envelopes skipped because their payload failed to parse.
    pub invalid: usize,
}

/// What became of a single notification.
enum Outcome {
    Handled,
    Ignored,
}

/// Dispatches a batch of delivery-status notification envelopes.
#[derive(Debug, Clone)]
pub struct FeedbackDispatcher {
    store: Arc<dyn StatusStore>,
}

impl FeedbackDispatcher {
    /// Creates a dispatcher recording through the given status store.
    pub fn new(store: Arc<dyn StatusStore>) -> Self {
        Self { store }
    }

    /// Processes one batch of envelopes, item by item.
    ///
    /// Malformed payloads are reported per item; the batch itself always
    /// completes.
    pub async fn dispatch(&self, event: &SnsEvent) -> DispatchSummary {
        let mut summary = DispatchSummary::default();

        for record in &event.records {
            match self.process_notification(&record.sns.message).await {
                Ok(Outcome::Handled) => summary.processed += 1,
                Ok(Outcome::Ignored) => summary.ignored += 1,
                Err(parse_error) => {
                    error!(error = %parse_error, "skipping unparseable notification");
                    summary.invalid += 1;
                },
            }
        }

        summary
    }

    /// Parses one inner payload and runs its event-type branch.
    async fn process_notification(&self, raw: &str) -> Result<Outcome, ParseError> {
        let notification: SesNotification =
            serde_json::from_str(raw).map_err(|e| ParseError::invalid_json(&e))?;

        let email_id = notification.mail.email_id();
        let message_id = notification.mail.message_id.as_str();

        match notification.event_type {
            EventType::Bounce => {
                let bounce =
                    notification.bounce.as_ref().ok_or(ParseError::missing_section("bounce"))?;
                for recipient in &bounce.bounced_recipients {
                    info!(
                        bounce_type = %bounce.bounce_type,
                        recipient = %recipient.email_address,
                        email_id = %display_id(&email_id),
                        "bounce received"
                    );
                    self.store
                        .record_delivery_event(
                            email_id.as_ref(),
                            DeliveryRecord::Bounced {
                                recipient: recipient.email_address.clone(),
                                bounce_type: bounce.bounce_type,
                            },
                        )
                        .await;
                }
            },
            EventType::Complaint => {
                let complaint = notification
                    .complaint
                    .as_ref()
                    .ok_or(ParseError::missing_section("complaint"))?;
                for recipient in &complaint.complained_recipients {
                    warn!(
                        recipient = %recipient.email_address,
                        email_id = %display_id(&email_id),
                        "complaint received"
                    );
                    self.store
                        .record_delivery_event(
                            email_id.as_ref(),
                            DeliveryRecord::Complained {
                                recipient: recipient.email_address.clone(),
                            },
                        )
                        .await;
                }
            },
            EventType::Delivery => {
                let delivery = notification
                    .delivery
                    .as_ref()
                    .ok_or(ParseError::missing_section("delivery"))?;
                info!(
                    recipients = ?delivery.recipients,
                    email_id = %display_id(&email_id),
                    "delivery confirmed"
                );
                self.store
                    .record_delivery_event(
                        email_id.as_ref(),
                        DeliveryRecord::Delivered { recipients: delivery.recipients.clone() },
                    )
                    .await;
            },
            EventType::Reject => {
                error!(
                    message_id = %message_id,
                    email_id = %display_id(&email_id),
                    "message rejected by provider"
                );
                self.store
                    .record_delivery_event(
                        email_id.as_ref(),
                        DeliveryRecord::Rejected { message_id: message_id.to_string() },
                    )
                    .await;
            },
            EventType::Other => {
                debug!(message_id = %message_id, "ignoring unrecognized event type");
                return Ok(Outcome::Ignored);
            },
        }

        Ok(Outcome::Handled)
    }
}

/// Log form of an optional correlation id.
fn display_id(email_id: &Option<EmailId>) -> &str {
    email_id.as_ref().map_or("unknown", |id| id.0.as_str())
}
