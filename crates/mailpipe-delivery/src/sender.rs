//! Mail sender trait and the SES-backed implementation.
//!
//! `MailSender` is the injection seam between dispatch logic and the
//! provider: the dispatcher receives a sender at construction time, so tests
//! substitute a recording fake and production wires in `SesMailSender`.

use std::fmt;

use async_trait::async_trait;
use aws_sdk_ses::{
    error::SdkError,
    operation::send_email::SendEmailError,
    types::{Body, Content, Destination, Message, MessageTag},
    Client,
};
use mailpipe_core::{models::EmailId, OutboundEmail, EMAIL_ID_TAG};
use tracing::debug;

use crate::error::{Result, SendError};

/// Charset applied to subject and body content.
const CHARSET_UTF8: &str = "UTF-8";

/// Provider acknowledgement of an accepted send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    /// Provider-assigned message id.
    pub message_id: String,
}

/// Performs one outbound send per call.
///
/// Implementations classify their failures through [`SendError`] so the
/// dispatcher can tell permanent conditions from transient ones.
#[async_trait]
pub trait MailSender: Send + Sync + fmt::Debug {
    /// Sends one email, returning the provider's receipt.
    async fn send(&self, mail: &OutboundEmail) -> Result<SendReceipt>;
}

/// Mail sender backed by the Amazon SES `SendEmail` operation.
///
/// Every send carries the configured configuration set, which routes
/// delivery events onto the feedback channel, and a single `email_id` tag
/// the provider echoes back in those events.
#[derive(Debug, Clone)]
pub struct SesMailSender {
    client: Client,
    config_set_name: String,
}

impl SesMailSender {
    /// Creates a sender from an SES client and a configuration-set name.
    pub fn new(client: Client, config_set_name: impl Into<String>) -> Self {
        Self { client, config_set_name: config_set_name.into() }
    }
}

#[async_trait]
impl MailSender for SesMailSender {
    async fn send(&self, mail: &OutboundEmail) -> Result<SendReceipt> {
        debug!(email_id = %mail.email_id, to = %mail.to, "submitting send to provider");

        let output = self
            .client
            .send_email()
            .source(&mail.from)
            .destination(build_destination(&mail.to))
            .message(build_message(&mail.subject, &mail.body)?)
            .configuration_set_name(&self.config_set_name)
            .tags(build_correlation_tag(&mail.email_id)?)
            .send()
            .await
            .map_err(classify_sdk_error)?;

        Ok(SendReceipt { message_id: output.message_id().to_string() })
    }
}

/// Builds the destination for a single recipient.
fn build_destination(to: &str) -> Destination {
    Destination::builder().to_addresses(to).build()
}

/// Builds the message with a UTF-8 subject and UTF-8 HTML body.
fn build_message(subject: &str, body_html: &str) -> Result<Message> {
    let subject = Content::builder()
        .data(subject)
        .charset(CHARSET_UTF8)
        .build()
        .map_err(|e| SendError::invalid_request(e.to_string()))?;

    let html = Content::builder()
        .data(body_html)
        .charset(CHARSET_UTF8)
        .build()
        .map_err(|e| SendError::invalid_request(e.to_string()))?;

    Ok(Message::builder().subject(subject).body(Body::builder().html(html).build()).build())
}

/// Builds the correlation tag echoed back in delivery notifications.
fn build_correlation_tag(email_id: &EmailId) -> Result<MessageTag> {
    MessageTag::builder()
        .name(EMAIL_ID_TAG)
        .value(email_id.to_string())
        .build()
        .map_err(|e| SendError::invalid_request(e.to_string()))
}

/// Maps an SES SDK failure onto the send error taxonomy.
///
/// Rejected messages and unverified sending domains are permanent; dispatch
/// failures and timeouts are transient network conditions; everything else
/// (throttling included) stays transient so the queue retries it.
fn classify_sdk_error(error: SdkError<SendEmailError>) -> SendError {
    if let Some(service_error) = error.as_service_error() {
        if service_error.is_message_rejected() {
            return SendError::rejected(service_error.to_string());
        }
        if service_error.is_mail_from_domain_not_verified_exception() {
            return SendError::domain_not_verified(service_error.to_string());
        }
        return SendError::provider(service_error.to_string());
    }

    match &error {
        SdkError::TimeoutError(_) => SendError::timeout(error.to_string()),
        SdkError::DispatchFailure(_) => SendError::network(error.to_string()),
        _ => SendError::provider(error.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destination_carries_single_recipient() {
        let destination = build_destination("to@example.com");

        assert_eq!(destination.to_addresses(), ["to@example.com"]);
        assert!(destination.cc_addresses().is_empty());
        assert!(destination.bcc_addresses().is_empty());
    }

    #[test]
    fn message_uses_utf8_subject_and_html_body() {
        let message = build_message("Welcome!", "<h1>Hello</h1>").unwrap();

        let subject = message.subject().expect("subject set");
        assert_eq!(subject.data(), "Welcome!");
        assert_eq!(subject.charset(), Some(CHARSET_UTF8));

        let html = message.body().expect("body set").html().expect("html part set");
        assert_eq!(html.data(), "<h1>Hello</h1>");
        assert_eq!(html.charset(), Some(CHARSET_UTF8));
    }

    #[test]
    fn correlation_tag_carries_email_id() {
        let tag = build_correlation_tag(&EmailId::from("order-1042")).unwrap();

        assert_eq!(tag.name(), EMAIL_ID_TAG);
        assert_eq!(tag.value(), "order-1042");
    }
}
