//! Core domain types for the mailpipe email delivery handlers.
//!
//! Defines the outbound mail request consumed from the queue, the provider
//! notification payloads consumed from the feedback channel, the validating
//! parse errors both dispatchers report per item, service configuration, and
//! the narrow `StatusStore` seam behind which persistence would attach.

pub mod config;
pub mod error;
pub mod models;
pub mod status;

// Re-export main public API
pub use config::Config;
pub use error::ParseError;
pub use models::{
    BatchStatus, BounceType, EmailId, EventType, OutboundEmail, SesNotification,
};
pub use status::{DeliveryRecord, NoopStatusStore, SendRecord, StatusStore};

/// Name of the message tag attached to every outbound send.
///
/// The provider echoes the tag back in delivery notifications, which is how a
/// notification is correlated to the request that produced it.
pub const EMAIL_ID_TAG: &str = "email_id";
