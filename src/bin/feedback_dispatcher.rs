//! SNS-triggered handler that processes SES delivery-status notifications.
//!
//! Wires tracing and the feedback dispatcher into the Lambda runtime. Each
//! invocation classifies one batch of notification envelopes; malformed
//! payloads are reported per item, so the invocation itself always succeeds.

use std::sync::Arc;

use aws_lambda_events::event::sns::SnsEvent;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use mailpipe_core::{BatchStatus, NoopStatusStore};
use mailpipe_feedback::FeedbackDispatcher;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let dispatcher = FeedbackDispatcher::new(Arc::new(NoopStatusStore::new()));

    info!("feedback dispatcher ready");
    lambda_runtime::run(service_fn(|event: LambdaEvent<SnsEvent>| handle(&dispatcher, event)))
        .await
}

/// Processes one notification batch and reports its counters.
async fn handle(
    dispatcher: &FeedbackDispatcher,
    event: LambdaEvent<SnsEvent>,
) -> Result<BatchStatus, Error> {
    let summary = dispatcher.dispatch(&event.payload).await;

    info!(
        processed = summary.processed,
        ignored = summary.ignored,
        invalid = summary.invalid,
        "feedback batch complete"
    );
    Ok(BatchStatus::ok())
}

/// Initializes tracing with environment-based configuration.
fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,mailpipe=debug"))
        .expect("Invalid RUST_LOG environment variable");

    // CloudWatch renders ANSI escapes literally.
    let fmt_layer = fmt::layer().with_target(true).with_ansi(false);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}
