//! Send dispatcher: one provider send per queued request.
//!
//! Walks a queue batch sequentially. Each record is parsed through a
//! validating deserialization step, sent exactly once, and its outcome
//! logged and recorded. Permanent failures and unparseable records are
//! dropped so the queue does not redeliver work that can never succeed;
//! the first transient failure aborts the remainder of the batch and fails
//! the invocation so the queue redelivers it.

use std::sync::Arc;

use aws_lambda_events::event::sqs::SqsEvent;
use mailpipe_core::{OutboundEmail, ParseError, SendRecord, StatusStore};
use tracing::{error, info};

use crate::{
    error::Result,
    sender::MailSender,
};

/// Per-invocation counters for a processed send batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Requests the provider accepted.
    pub sent: usize,
    /// Requests dropped after a permanent provider failure.
    pub permanent_failures: usize,
    /// Records skipped because their body failed to parse.
    pub invalid: usize,
}

/// Dispatches a batch of queued outbound-mail requests.
///
/// The sender and status store are injected at construction, so tests run
/// against fakes and production wires in the SES sender and a real store.
#[derive(Debug, Clone)]
pub struct SendDispatcher {
    sender: Arc<dyn MailSender>,
    store: Arc<dyn StatusStore>,
}

impl SendDispatcher {
    /// Creates a dispatcher over the given sender and status store.
    pub fn new(sender: Arc<dyn MailSender>, store: Arc<dyn StatusStore>) -> Self {
        Self { sender, store }
    }

    /// Processes one queue batch, attempting one send per record.
    ///
    /// Processing is sequential and not atomic: when item *k* fails with a
    /// transient error, items before *k* have already been sent and stay
    /// sent. The returned error fails the invocation, and the queue
    /// redelivers the whole batch - including the already-sent items, since
    /// nothing deduplicates across redeliveries yet.
    ///
    /// # Errors
    ///
    /// Returns the first transient [`SendError`](crate::SendError)
    /// encountered. Permanent failures and unparseable records are logged,
    /// counted, and swallowed.
    pub async fn dispatch(&self, event: &SqsEvent) -> Result<DispatchSummary> {
        let mut summary = DispatchSummary::default();

        for record in &event.records {
            let queue_message_id = record.message_id.as_deref().unwrap_or("unknown");

            let mail = match parse_request(record.body.as_deref()) {
                Ok(mail) => mail,
                Err(parse_error) => {
                    error!(
                        queue_message_id = %queue_message_id,
                        error = %parse_error,
                        "skipping unparseable send request"
                    );
                    summary.invalid += 1;
                    continue;
                },
            };

            match self.sender.send(&mail).await {
                Ok(receipt) => {
                    info!(
                        message_id = %receipt.message_id,
                        email_id = %mail.email_id,
                        "email sent successfully"
                    );
                    self.store
                        .record_send_result(
                            &mail.email_id,
                            SendRecord::Accepted { message_id: receipt.message_id },
                        )
                        .await;
                    summary.sent += 1;
                },
                Err(send_error) if send_error.is_permanent() => {
                    error!(
                        email_id = %mail.email_id,
                        error = %send_error,
                        "permanent send failure, dropping request"
                    );
                    self.store
                        .record_send_result(
                            &mail.email_id,
                            SendRecord::Failed { reason: send_error.to_string() },
                        )
                        .await;
                    summary.permanent_failures += 1;
                },
                Err(send_error) => {
                    error!(
                        email_id = %mail.email_id,
                        error = %send_error,
                        "transient send failure, batch will be redelivered"
                    );
                    return Err(send_error);
                },
            }
        }

        Ok(summary)
    }
}

/// Parses a queue record body into an outbound-mail request.
fn parse_request(body: Option<&str>) -> std::result::Result<OutboundEmail, ParseError> {
    let body = body.ok_or(ParseError::MissingBody)?;
    serde_json::from_str(body).map_err(|e| ParseError::invalid_json(&e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_request_rejects_missing_body() {
        assert!(matches!(parse_request(None), Err(ParseError::MissingBody)));
    }

    #[test]
    fn parse_request_rejects_wrong_shape() {
        let result = parse_request(Some(r#"{"email_id": "e-1"}"#));
        assert!(matches!(result, Err(ParseError::InvalidJson { .. })));
    }

    #[test]
    fn parse_request_accepts_valid_payload() {
        let body = r#"{
            "email_id": "e-1",
            "from": "noreply@example.com",
            "to": "user@example.com",
            "subject": "Hi",
            "body": "<p>Hi</p>"
        }"#;

        let mail = parse_request(Some(body)).unwrap();
        assert_eq!(mail.to, "user@example.com");
    }
}
