//! Domain models for outbound mail requests and provider notifications.
//!
//! `OutboundEmail` is the queue message a send invocation consumes once per
//! delivery attempt. `SesNotification` is the inner payload of a feedback
//! envelope, keyed by `eventType` with the matching detail section attached.
//! Both are ephemeral: parsed, acted on, discarded.

use std::{collections::HashMap, fmt};

use serde::{Deserialize, Deserializer, Serialize};

use crate::EMAIL_ID_TAG;

/// Strongly-typed correlation identifier.
///
/// Attached to an outbound send as a message tag and echoed back by the
/// provider in later notifications, linking a notification to the request
/// that produced it. Wraps a `String` to prevent mixing with other
/// identifiers such as the provider message id.
///
/// # Example
///
/// ```
/// use mailpipe_core::models::EmailId;
/// let email_id = EmailId::from("order-1042");
/// println!("correlating on {email_id}");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EmailId(pub String);

impl fmt::Display for EmailId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EmailId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EmailId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// Producers are loose about this field: some enqueue it as a JSON string,
// some as a number. Both deserialize to the string form used for the tag.
impl<'de> Deserialize<'de> for EmailId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(i64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(text) => Ok(Self(text)),
            Raw::Number(number) => Ok(Self(number.to_string())),
        }
    }
}

/// A queued request for one outbound email.
///
/// Consumed exactly once per delivery attempt. Addresses are not validated
/// here; the provider rejects invalid or unverified addresses on the send
/// call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundEmail {
    /// Correlation id attached to the send and echoed in notifications.
    pub email_id: EmailId,

    /// Sender address.
    pub from: String,

    /// Single recipient address.
    pub to: String,

    /// Subject line (UTF-8).
    pub subject: String,

    /// HTML body (UTF-8).
    pub body: String,
}

/// Delivery-status notification emitted by the provider's feedback channel.
///
/// The detail sections are present only for their matching event type; a
/// `Bounce` notification carries `bounce` and leaves the others absent.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SesNotification {
    /// Category of the delivery event.
    pub event_type: EventType,

    /// Metadata about the original message, including correlation tags.
    pub mail: MailMetadata,

    /// Bounce detail, present when `event_type` is `Bounce`.
    #[serde(default)]
    pub bounce: Option<BounceDetail>,

    /// Complaint detail, present when `event_type` is `Complaint`.
    #[serde(default)]
    pub complaint: Option<ComplaintDetail>,

    /// Delivery detail, present when `event_type` is `Delivery`.
    #[serde(default)]
    pub delivery: Option<DeliveryDetail>,
}

/// Category of a delivery-status notification.
///
/// Event types the provider may add in the future parse as `Other` and are
/// ignored rather than failing the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum EventType {
    /// The message could not be delivered to one or more recipients.
    Bounce,
    /// A recipient marked the message as unwanted.
    Complaint,
    /// The message was delivered to the recipients' mail server.
    Delivery,
    /// The provider refused to send the message.
    Reject,
    /// Any event type this pipeline does not recognize.
    #[serde(other)]
    Other,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bounce => write!(f, "Bounce"),
            Self::Complaint => write!(f, "Complaint"),
            Self::Delivery => write!(f, "Delivery"),
            Self::Reject => write!(f, "Reject"),
            Self::Other => write!(f, "Other"),
        }
    }
}

/// Metadata about the original message carried on every notification.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailMetadata {
    /// Provider-assigned id of the original message.
    pub message_id: String,

    /// Message tags echoed from the send call. Each tag is multi-valued.
    #[serde(default)]
    pub tags: HashMap<String, Vec<String>>,
}

impl MailMetadata {
    /// Extracts the correlation id from the echoed tags.
    ///
    /// Returns the first value of the `email_id` tag, or `None` when the tag
    /// is absent or empty (e.g. the send was made outside this pipeline).
    pub fn email_id(&self) -> Option<EmailId> {
        self.tags.get(EMAIL_ID_TAG)?.first().map(|value| EmailId::from(value.as_str()))
    }
}

/// Classification of a bounce, as determined by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum BounceType {
    /// A hard bounce; the address should not be retried.
    Permanent,
    /// A soft bounce; the address may succeed later.
    Transient,
    /// The provider could not determine the cause.
    Undetermined,
}

impl fmt::Display for BounceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Permanent => write!(f, "Permanent"),
            Self::Transient => write!(f, "Transient"),
            Self::Undetermined => write!(f, "Undetermined"),
        }
    }
}

/// Detail section of a `Bounce` notification.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BounceDetail {
    /// Bounce classification.
    pub bounce_type: BounceType,

    /// Recipients of the original mail that bounced.
    pub bounced_recipients: Vec<BouncedRecipient>,
}

/// One recipient listed in a bounce report.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BouncedRecipient {
    /// The recipient address that bounced.
    pub email_address: String,
}

/// Detail section of a `Complaint` notification.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintDetail {
    /// Recipients that may have been responsible for the complaint.
    pub complained_recipients: Vec<ComplainedRecipient>,
}

/// One recipient listed in a complaint report.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplainedRecipient {
    /// The recipient address that complained.
    pub email_address: String,
}

/// Detail section of a `Delivery` notification.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryDetail {
    /// Addresses the message was successfully delivered to.
    pub recipients: Vec<String>,
}

/// Batch-level response body returned by a handler invocation.
///
/// The messaging infrastructure only distinguishes success from failure for
/// the invocation as a whole; there is no per-item protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchStatus {
    /// HTTP-style status code for the invocation.
    #[serde(rename = "statusCode")]
    pub status_code: u16,
}

impl BatchStatus {
    /// The whole batch was handled.
    pub fn ok() -> Self {
        Self { status_code: 200 }
    }
}
