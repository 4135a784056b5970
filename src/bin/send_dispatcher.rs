//! SQS-triggered handler that submits outbound email through Amazon SES.
//!
//! Wires configuration, tracing, the SES client, and the send dispatcher
//! into the Lambda runtime. Each invocation processes one queue batch; a
//! transient send failure fails the invocation so the queue redelivers the
//! batch.

use std::sync::Arc;

use aws_lambda_events::event::sqs::SqsEvent;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use mailpipe_core::{BatchStatus, Config, NoopStatusStore};
use mailpipe_delivery::{SendDispatcher, SesMailSender};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let config = Config::load()?;
    info!(config_set = %config.ses_config_set_name, "configuration loaded");

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let ses_client = aws_sdk_ses::Client::new(&aws_config);
    let sender = Arc::new(SesMailSender::new(ses_client, config.ses_config_set_name));
    let dispatcher = SendDispatcher::new(sender, Arc::new(NoopStatusStore::new()));

    info!("send dispatcher ready");
    lambda_runtime::run(service_fn(|event: LambdaEvent<SqsEvent>| handle(&dispatcher, event)))
        .await
}

/// Processes one queue batch and maps the outcome onto the invocation
/// response contract.
async fn handle(
    dispatcher: &SendDispatcher,
    event: LambdaEvent<SqsEvent>,
) -> Result<BatchStatus, Error> {
    let summary = dispatcher.dispatch(&event.payload).await?;

    info!(
        sent = summary.sent,
        permanent_failures = summary.permanent_failures,
        invalid = summary.invalid,
        "send batch complete"
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
