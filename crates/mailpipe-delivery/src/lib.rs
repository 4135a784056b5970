//! Outbound email dispatch for the mailpipe pipeline.
//!
//! This crate implements the send side: a dispatcher that walks a queue batch
//! of outbound-mail requests and performs exactly one provider send call per
//! request, and the SES-backed sender behind it.
//!
//! # Failure semantics
//!
//! Send failures split into two classes, and the split decides whether the
//! queue redelivers the batch:
//!
//! 1. **Permanent** - the provider rejected the message or the sending domain
//!    is unverified. Retrying cannot succeed, so the failure is logged,
//!    recorded, and swallowed; the batch continues.
//! 2. **Transient** - network faults, timeouts, anything else. The error
//!    propagates, failing the invocation so the queue redelivers the whole
//!    batch. Items sent before the failure stay sent; there is no rollback
//!    and no dedup across redeliveries.
//!
//! The sender is a trait seam: handlers receive it at construction, so tests
//! substitute a fake without touching process-wide state.

pub mod dispatcher;
pub mod error;
pub mod sender;

// Re-export main public API
pub use dispatcher::{DispatchSummary, SendDispatcher};
pub use error::{Result, SendError};
pub use sender::{MailSender, SendReceipt, SesMailSender};
