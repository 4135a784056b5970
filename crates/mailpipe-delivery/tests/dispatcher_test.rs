//! Batch semantics tests for the send dispatcher.
//!
//! Runs the dispatcher against a scripted fake sender and a recording status
//! store, verifying one send call per valid request, permanent-failure
//! swallowing, transient-failure propagation, and per-item isolation of
//! unparseable records.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use aws_lambda_events::event::sqs::SqsEvent;
use mailpipe_core::{
    models::EmailId, DeliveryRecord, OutboundEmail, SendRecord, StatusStore,
};
use mailpipe_delivery::{MailSender, SendDispatcher, SendError, SendReceipt};

/// Mail sender that replays scripted outcomes and records every call.
#[derive(Debug, Default)]
struct FakeMailSender {
    outcomes: Mutex<VecDeque<Result<SendReceipt, SendError>>>,
    calls: Mutex<Vec<OutboundEmail>>,
}

impl FakeMailSender {
    fn scripted(outcomes: Vec<Result<SendReceipt, SendError>>) -> Arc<Self> {
        Arc::new(Self { outcomes: Mutex::new(outcomes.into()), calls: Mutex::new(Vec::new()) })
    }

    fn calls(&self) -> Vec<OutboundEmail> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl MailSender for FakeMailSender {
    async fn send(&self, mail: &OutboundEmail) -> Result<SendReceipt, SendError> {
        self.calls.lock().unwrap().push(mail.clone());
        self.outcomes.lock().unwrap().pop_front().expect("unscripted send call")
    }
}

/// Status store that records everything it is given.
#[derive(Debug, Default)]
struct RecordingStatusStore {
    send_results: Mutex<Vec<(EmailId, SendRecord)>>,
}

impl RecordingStatusStore {
    fn send_results(&self) -> Vec<(EmailId, SendRecord)> {
        self.send_results.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl StatusStore for RecordingStatusStore {
    async fn record_send_result(&self, email_id: &EmailId, record: SendRecord) {
        self.send_results.lock().unwrap().push((email_id.clone(), record));
    }

    async fn record_delivery_event(&self, _email_id: Option<&EmailId>, _record: DeliveryRecord) {
        panic!("send dispatcher must not record delivery events");
    }
}

fn accepted(message_id: &str) -> Result<SendReceipt, SendError> {
    Ok(SendReceipt { message_id: message_id.to_string() })
}

fn request_body(email_id: &str) -> String {
    serde_json::json!({
        "email_id": email_id,
        "from": "noreply@example.com",
        "to": format!("{email_id}@example.com"),
        "subject": format!("subject {email_id}"),
        "body": format!("<p>{email_id}</p>"),
    })
    .to_string()
}

/// Builds an SQS event from raw record bodies, using the wire shape the
/// queue actually delivers.
fn sqs_event(bodies: &[serde_json::Value]) -> SqsEvent {
    let records: Vec<_> = bodies
        .iter()
        .enumerate()
        .map(|(i, body)| {
            serde_json::json!({
                "messageId": format!("059f36b4-87a3-44ab-83d2-00000000000{i}"),
                "receiptHandle": "MessageReceiptHandle",
                "body": body,
                "attributes": {
                    "ApproximateReceiveCount": "1",
                    "SentTimestamp": "1756641600000",
                    "SenderId": "AIDAIENQZJOLO23YVJ4VO",
                    "ApproximateFirstReceiveTimestamp": "1756641600123"
                },
                "messageAttributes": {},
                "md5OfBody": "7b270e59b47ff90a553787216d55d91d",
                "eventSource": "aws:sqs",
                "eventSourceARN": "arn:aws:sqs:us-east-1:123456789012:outbound-email",
                "awsRegion": "us-east-1"
            })
        })
        .collect();

    serde_json::from_value(serde_json::json!({ "Records": records }))
        .expect("valid SQS event fixture")
}

#[tokio::test]
async fn batch_of_valid_requests_sends_each_one() {
    let sender =
        FakeMailSender::scripted(vec![accepted("m-1"), accepted("m-2"), accepted("m-3")]);
    let store = Arc::new(RecordingStatusStore::default());
    let dispatcher = SendDispatcher::new(sender.clone(), store.clone());

    let event = sqs_event(&[
        request_body("e-1").into(),
        request_body("e-2").into(),
        request_body("e-3").into(),
    ]);

    let summary = dispatcher.dispatch(&event).await.unwrap();

    assert_eq!(summary.sent, 3);
    assert_eq!(summary.permanent_failures, 0);
    assert_eq!(summary.invalid, 0);

    let calls = sender.calls();
    assert_eq!(calls.len(), 3);
    for (call, id) in calls.iter().zip(["e-1", "e-2", "e-3"]) {
        assert_eq!(call.email_id, EmailId::from(id));
        assert_eq!(call.from, "noreply@example.com");
        assert_eq!(call.to, format!("{id}@example.com"));
        assert_eq!(call.subject, format!("subject {id}"));
        assert_eq!(call.body, format!("<p>{id}</p>"));
    }
}

#[tokio::test]
async fn accepted_send_records_provider_message_id() {
    let sender = FakeMailSender::scripted(vec![accepted("provider-id-9")]);
    let store = Arc::new(RecordingStatusStore::default());
    let dispatcher = SendDispatcher::new(sender, store.clone());

    let event = sqs_event(&[request_body("e-9").into()]);
    dispatcher.dispatch(&event).await.unwrap();

    assert_eq!(
        store.send_results(),
        vec![(
            EmailId::from("e-9"),
            SendRecord::Accepted { message_id: "provider-id-9".to_string() }
        )]
    );
}

#[tokio::test]
async fn transient_failure_aborts_remaining_items() {
    // Item 2 of 3 fails transiently: item 3 must never be attempted and the
    // invocation must fail so the queue redelivers the batch.
    let sender = FakeMailSender::scripted(vec![
        accepted("m-1"),
        Err(SendError::network("connection reset")),
    ]);
    let store = Arc::new(RecordingStatusStore::default());
    let dispatcher = SendDispatcher::new(sender.clone(), store.clone());

    let event = sqs_event(&[
        request_body("e-1").into(),
        request_body("e-2").into(),
        request_body("e-3").into(),
    ]);

    let error = dispatcher.dispatch(&event).await.unwrap_err();

    assert!(!error.is_permanent());
    assert_eq!(sender.calls().len(), 2);
    // Only the item that succeeded before the abort was recorded.
    assert_eq!(store.send_results().len(), 1);
}

#[tokio::test]
async fn permanent_failure_is_swallowed_and_batch_continues() {
    let sender = FakeMailSender::scripted(vec![
        Err(SendError::rejected("address suppressed")),
        accepted("m-2"),
    ]);
    let store = Arc::new(RecordingStatusStore::default());
    let dispatcher = SendDispatcher::new(sender.clone(), store.clone());

    let event = sqs_event(&[request_body("e-1").into(), request_body("e-2").into()]);

    let summary = dispatcher.dispatch(&event).await.unwrap();

    assert_eq!(summary.sent, 1);
    assert_eq!(summary.permanent_failures, 1);
    assert_eq!(sender.calls().len(), 2);

    let results = store.send_results();
    assert_eq!(results.len(), 2);
    assert!(matches!(&results[0].1, SendRecord::Failed { reason } if reason.contains("rejected")));
    assert!(matches!(&results[1].1, SendRecord::Accepted { .. }));
}

#[tokio::test]
async fn unverified_domain_is_swallowed_like_rejection() {
    let sender =
        FakeMailSender::scripted(vec![Err(SendError::domain_not_verified("example.org"))]);
    let store = Arc::new(RecordingStatusStore::default());
    let dispatcher = SendDispatcher::new(sender, store.clone());

    let event = sqs_event(&[request_body("e-1").into()]);

    let summary = dispatcher.dispatch(&event).await.unwrap();

    assert_eq!(summary.permanent_failures, 1);
    assert_eq!(summary.sent, 0);
}

#[tokio::test]
async fn malformed_record_is_skipped_without_aborting() {
    let sender = FakeMailSender::scripted(vec![accepted("m-1")]);
    let store = Arc::new(RecordingStatusStore::default());
    let dispatcher = SendDispatcher::new(sender.clone(), store.clone());

    let event = sqs_event(&[
        serde_json::Value::String("not json at all".to_string()),
        request_body("e-2").into(),
    ]);

    let summary = dispatcher.dispatch(&event).await.unwrap();

    assert_eq!(summary.invalid, 1);
    assert_eq!(summary.sent, 1);
    // The malformed record never reached the provider.
    assert_eq!(sender.calls().len(), 1);
    assert_eq!(sender.calls()[0].email_id, EmailId::from("e-2"));
}

#[tokio::test]
async fn record_without_body_counts_as_invalid() {
    let sender = FakeMailSender::scripted(vec![]);
    let store = Arc::new(RecordingStatusStore::default());
    let dispatcher = SendDispatcher::new(sender.clone(), store.clone());

    let event = sqs_event(&[serde_json::Value::Null]);

    let summary = dispatcher.dispatch(&event).await.unwrap();

    assert_eq!(summary.invalid, 1);
    assert!(sender.calls().is_empty());
}

#[tokio::test]
async fn empty_batch_succeeds_with_zero_counters() {
    let sender = FakeMailSender::scripted(vec![]);
    let store = Arc::new(RecordingStatusStore::default());
    let dispatcher = SendDispatcher::new(sender, store);

    let event = sqs_event(&[]);

    let summary = dispatcher.dispatch(&event).await.unwrap();

    assert_eq!(summary, Default::default());
}

#[tokio::test]
async fn numeric_email_id_is_sent_as_string() {
    let sender = FakeMailSender::scripted(vec![accepted("m-1")]);
    let store = Arc::new(RecordingStatusStore::default());
    let dispatcher = SendDispatcher::new(sender.clone(), store);

    let body = serde_json::json!({
        "email_id": 1042,
        "from": "noreply@example.com",
        "to": "user@example.com",
        "subject": "Hi",
        "body": "<p>Hi</p>",
    });
    let event = sqs_event(&[serde_json::Value::String(body.to_string())]);

    dispatcher.dispatch(&event).await.unwrap();

    assert_eq!(sender.calls()[0].email_id, EmailId::from("1042"));
}
