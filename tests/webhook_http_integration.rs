//! Integration tests for the donation HTTP surface.
//!
//! Drives the full axum router against the in-memory ledger:
//! 1. Signed webhooks record donations exactly once
//! 2. Receipts are served only with the matching token
//! 3. Stats and the donor wall reflect the ledger

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use secrecy::SecretString;
use serde_json::{json, Value};
use tower::ServiceExt;

use donation_ledger::adapters::http::{router, DonationAppState};
use donation_ledger::adapters::memory::InMemoryDonationLedger;
use donation_ledger::domain::receipt::ReceiptBranding;
use donation_ledger::domain::webhook::{
    sign_paystack_payload, sign_stripe_payload, PaystackSignatureVerifier,
    StripeSignatureVerifier, DEFAULT_TOLERANCE_SECS, PAYSTACK_SIGNATURE_HEADER,
    STRIPE_SIGNATURE_HEADER,
};
use donation_ledger::ports::{DeliveryError, EmailMessage, NotificationSender};

const STRIPE_SECRET: &str = "whsec_integration";
const PAYSTACK_SECRET: &str = "sk_test_integration";

// =============================================================================
// Test Infrastructure
// =============================================================================

#[derive(Default)]
struct RecordingSender {
    sent: Mutex<Vec<EmailMessage>>,
    fail: bool,
    delay: Option<Duration>,
}

#[async_trait]
impl NotificationSender for RecordingSender {
    async fn send(&self, message: &EmailMessage) -> Result<String, DeliveryError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(DeliveryError::Rejected {
                status: 401,
                message: "Key not found".to_string(),
            });
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok("msg-1".to_string())
    }
}

struct TestApp {
    app: Router,
    ledger: Arc<InMemoryDonationLedger>,
    sender: Arc<RecordingSender>,
}

impl TestApp {
    fn new() -> Self {
        Self::with_sender(RecordingSender::default())
    }

    fn with_sender(sender: RecordingSender) -> Self {
        Self::build(sender, Duration::from_secs(10))
    }

    fn build(sender: RecordingSender, request_timeout: Duration) -> Self {
        let ledger = Arc::new(InMemoryDonationLedger::default());
        let sender = Arc::new(sender);
        let state = DonationAppState {
            ledger: ledger.clone(),
            notifier: sender.clone(),
            stripe_verifier: Arc::new(StripeSignatureVerifier::new(
                SecretString::new(STRIPE_SECRET.to_string()),
                DEFAULT_TOLERANCE_SECS,
            )),
            paystack_verifier: Arc::new(PaystackSignatureVerifier::new(SecretString::new(
                PAYSTACK_SECRET.to_string(),
            ))),
            branding: Arc::new(ReceiptBranding {
                ministry_name: "Life Gate Ministries Worldwide".to_string(),
                campaign_title: "Life Gate Ministries Campaign".to_string(),
                public_base_url: "https://give.example.org".to_string(),
            }),
        };
        Self {
            app: router(state, request_timeout),
            ledger,
            sender,
        }
    }

    /// Receipt emails run in the background; waits until `count` have landed.
    async fn wait_for_emails(&self, count: usize) -> Vec<EmailMessage> {
        for _ in 0..200 {
            {
                let sent = self.sender.sent.lock().unwrap();
                if sent.len() >= count {
                    return sent.clone();
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("expected {} receipt email(s)", count);
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    async fn get(&self, uri: &str) -> (StatusCode, Vec<u8>) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn get_json(&self, uri: &str) -> Value {
        let (status, body) = self.get(uri).await;
        assert_eq!(status, StatusCode::OK);
        serde_json::from_slice(&body).unwrap()
    }

    async fn post_stripe(&self, body: Vec<u8>, signature: &str) -> StatusCode {
        let request = Request::builder()
            .method("POST")
            .uri("/api/stripe/webhook")
            .header(header::CONTENT_TYPE, "application/json")
            .header(STRIPE_SIGNATURE_HEADER, signature)
            .body(Body::from(body))
            .unwrap();
        self.send(request).await.0
    }

    async fn post_signed_stripe(&self, body: Vec<u8>) -> StatusCode {
        let signature = sign_stripe_payload(STRIPE_SECRET, chrono::Utc::now().timestamp(), &body);
        self.post_stripe(body, &signature).await
    }

    async fn post_paystack(&self, body: Vec<u8>, signature: &str) -> StatusCode {
        let request = Request::builder()
            .method("POST")
            .uri("/api/paystack/webhook")
            .header(PAYSTACK_SIGNATURE_HEADER, signature)
            .body(Body::from(body))
            .unwrap();
        self.send(request).await.0
    }
}

fn checkout_completed(session_id: &str, amount: u64) -> Vec<u8> {
    json!({
        "id": "evt_test",
        "type": "checkout.session.completed",
        "data": { "object": {
            "id": session_id,
            "amount_total": amount,
            "currency": "ngn",
            "customer_email": "jane@x.com",
            "metadata": { "donor_name": "Jane Doe" }
        }}
    })
    .to_string()
    .into_bytes()
}

fn charge_success(reference: &str, amount: u64) -> Vec<u8> {
    json!({
        "event": "charge.success",
        "data": {
            "reference": reference,
            "amount": amount,
            "currency": "NGN",
            "metadata": { "donor_name": "Ade" },
            "customer": { "email": "ade@x.com" }
        }
    })
    .to_string()
    .into_bytes()
}

fn contains(haystack: &[u8], needle: &str) -> bool {
    haystack
        .windows(needle.len())
        .any(|window| window == needle.as_bytes())
}

/// Pulls the receipt token out of the emailed download link.
fn token_from_email(html: &str) -> String {
    let start = html.find("&amp;t=").unwrap() + "&amp;t=".len();
    html[start..start + 48].to_string()
}

// =============================================================================
// End-to-end
// =============================================================================

#[tokio::test]
async fn stripe_checkout_end_to_end() {
    let app = TestApp::new();

    let status = app.post_signed_stripe(checkout_completed("cs_test_1", 500_000)).await;
    assert_eq!(status, StatusCode::OK);

    let stats = app.get_json("/api/stats").await;
    assert_eq!(stats["total"], 500_000);
    assert_eq!(stats["count"], 1);
    assert_eq!(stats["goal"], 100_000_000);

    let sent = app.wait_for_emails(1).await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to_email, "jane@x.com");
    let token = token_from_email(&sent[0].html);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));

    let request = Request::builder()
        .uri(format!("/api/receipt?ref=cs_test_1&t={}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"Receipt_cs_test_1.pdf\""
    );
    let pdf = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(contains(&pdf, "Jane Doe"));
    assert!(contains(&pdf, "NGN 5,000.00"));
}

#[tokio::test]
async fn replay_with_different_amount_leaves_ledger_unchanged() {
    let app = TestApp::new();

    assert_eq!(
        app.post_signed_stripe(checkout_completed("cs_test_1", 500_000)).await,
        StatusCode::OK
    );
    assert_eq!(
        app.post_signed_stripe(checkout_completed("cs_test_1", 700_000)).await,
        StatusCode::OK
    );

    let stats = app.get_json("/api/stats").await;
    assert_eq!(stats["total"], 500_000);
    assert_eq!(stats["count"], 1);

    let wall = app.get_json("/api/donations").await;
    assert_eq!(wall["donations"].as_array().unwrap().len(), 1);
    assert_eq!(wall["donations"][0]["amountMinor"], 500_000);
    app.wait_for_emails(1).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(app.sender.sent.lock().unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_deliveries_count_once() {
    let app = Arc::new(TestApp::new());

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let app = app.clone();
        tasks.push(tokio::spawn(async move {
            app.post_signed_stripe(checkout_completed("cs_race", 1_000)).await
        }));
    }
    for task in tasks {
        assert_eq!(task.await.unwrap(), StatusCode::OK);
    }

    let stats = app.get_json("/api/stats").await;
    assert_eq!(stats["total"], 1_000);
    assert_eq!(stats["count"], 1);
}

#[tokio::test]
async fn paystack_charge_end_to_end() {
    let app = TestApp::new();
    let body = charge_success("ps_ref_1", 250_000);
    let signature = sign_paystack_payload(PAYSTACK_SECRET, &body);

    assert_eq!(app.post_paystack(body, &signature).await, StatusCode::OK);

    let wall = app.get_json("/api/donations").await;
    assert_eq!(wall["donations"][0]["id"], "ps_ref_1");
    assert_eq!(wall["donations"][0]["provider"], "paystack");
    assert_eq!(wall["donations"][0]["name"], "Ade");
    assert!(wall["donations"][0].get("email").is_none());
}

// =============================================================================
// Webhook rejection
// =============================================================================

#[tokio::test]
async fn tampered_stripe_body_is_rejected() {
    let app = TestApp::new();
    let signed = checkout_completed("cs_test_1", 500_000);
    let signature = sign_stripe_payload(STRIPE_SECRET, chrono::Utc::now().timestamp(), &signed);

    let status = app
        .post_stripe(checkout_completed("cs_test_1", 900_000), &signature)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.ledger.is_empty().await);
}

#[tokio::test]
async fn stale_stripe_signature_is_rejected() {
    let app = TestApp::new();
    let body = checkout_completed("cs_test_1", 500_000);
    let stale = chrono::Utc::now().timestamp() - DEFAULT_TOLERANCE_SECS - 60;
    let signature = sign_stripe_payload(STRIPE_SECRET, stale, &body);

    assert_eq!(app.post_stripe(body, &signature).await, StatusCode::BAD_REQUEST);
    assert!(app.ledger.is_empty().await);
}

#[tokio::test]
async fn tampered_paystack_body_is_rejected() {
    let app = TestApp::new();
    let signature = sign_paystack_payload(PAYSTACK_SECRET, &charge_success("ps_ref_1", 250_000));

    let status = app
        .post_paystack(charge_success("ps_ref_1", 999_999), &signature)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.ledger.is_empty().await);
}

#[tokio::test]
async fn missing_signature_header_is_rejected() {
    let app = TestApp::new();
    let request = Request::builder()
        .method("POST")
        .uri("/api/stripe/webhook")
        .body(Body::from(checkout_completed("cs_test_1", 500_000)))
        .unwrap();

    assert_eq!(app.send(request).await.0, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn non_donation_event_is_acknowledged() {
    let app = TestApp::new();
    let body = json!({
        "id": "evt_2",
        "type": "customer.created",
        "data": { "object": { "id": "cus_1" } }
    })
    .to_string()
    .into_bytes();

    assert_eq!(app.post_signed_stripe(body).await, StatusCode::OK);
    assert!(app.ledger.is_empty().await);
}

#[tokio::test]
async fn ledger_outage_returns_server_error() {
    let app = TestApp::new();
    app.ledger.set_unavailable(true);

    let status = app.post_signed_stripe(checkout_completed("cs_test_1", 500_000)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(app.sender.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn email_failure_still_acknowledges() {
    let app = TestApp::with_sender(RecordingSender {
        fail: true,
        ..Default::default()
    });

    let status = app.post_signed_stripe(checkout_completed("cs_test_1", 500_000)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.get_json("/api/stats").await["count"], 1);
}

#[tokio::test]
async fn slow_email_does_not_hold_the_webhook_response() {
    let app = TestApp::build(
        RecordingSender {
            delay: Some(Duration::from_millis(300)),
            ..Default::default()
        },
        Duration::from_millis(100),
    );

    let status = app.post_signed_stripe(checkout_completed("cs_slow", 500_000)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.get_json("/api/stats").await["count"], 1);
    let sent = app.wait_for_emails(1).await;
    assert_eq!(sent[0].to_email, "jane@x.com");
}

// =============================================================================
// Receipt retrieval
// =============================================================================

#[tokio::test]
async fn receipt_errors_are_plain_text() {
    let app = TestApp::new();
    app.post_signed_stripe(checkout_completed("cs_test_1", 500_000)).await;

    let (status, body) = app.get("/api/receipt?ref=cs_test_1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, b"Missing ref or token");

    let (status, body) = app.get(&format!("/api/receipt?ref=cs_nope&t={}", "0".repeat(48))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, b"Receipt not found");

    let (status, body) = app.get(&format!("/api/receipt?ref=cs_test_1&t={}", "0".repeat(48))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, b"Invalid token");
}

// =============================================================================
// Reads
// =============================================================================

#[tokio::test]
async fn fresh_service_reports_empty_campaign() {
    let app = TestApp::new();

    let stats = app.get_json("/api/stats").await;
    assert_eq!(stats["total"], 0);
    assert_eq!(stats["count"], 0);
    assert!(stats["updatedAt"].is_string());

    let wall = app.get_json("/api/donations").await;
    assert!(wall["donations"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn donations_limit_is_applied() {
    let app = TestApp::new();
    for i in 0..5 {
        let body = charge_success(&format!("ps_{}", i), 100);
        let signature = sign_paystack_payload(PAYSTACK_SECRET, &body);
        app.post_paystack(body, &signature).await;
    }

    let wall = app.get_json("/api/donations?limit=2").await;
    assert_eq!(wall["donations"].as_array().unwrap().len(), 2);
    assert_eq!(wall["donations"][0]["id"], "ps_4");

    let wall = app.get_json("/api/donations?limit=oops").await;
    assert_eq!(wall["donations"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn health_reports_ok() {
    let app = TestApp::new();
    assert_eq!(app.get_json("/api/health").await, json!({ "status": "ok" }));
}
