//! Delivery-status notification dispatch for the mailpipe pipeline.
//!
//! This crate implements the feedback side: a dispatcher that walks a batch
//! of provider notification envelopes, parses each inner payload, and
//! branches on the event type - bounces and complaints per recipient,
//! deliveries in aggregate, rejections singly. Event types the pipeline does
//! not recognize are dropped silently.
//!
//! Each item parses in isolation: a malformed payload is logged and counted
//! for that item and never aborts the rest of its batch.

pub mod dispatcher;

// Re-export main public API
pub use dispatcher::{DispatchSummary, FeedbackDispatcher};
