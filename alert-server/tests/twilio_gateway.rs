use std::time::Duration;

use donoralert::transport::{OutcomeKind, TransportGateway, TwilioGateway, TwilioSettings};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MESSAGES_PATH: &str = "/2010-04-01/Accounts/AC123/Messages.json";

fn settings() -> TwilioSettings {
    TwilioSettings {
        account_sid: "AC123".to_string(),
        auth_token: "token".to_string(),
        from_number: "+15005550006".to_string(),
    }
}

fn gateway(server: &MockServer, timeout: Duration) -> TwilioGateway {
    TwilioGateway::new(settings(), &server.uri(), timeout).unwrap()
}

#[tokio::test]
async fn accepted_message_is_delivered() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MESSAGES_PATH))
        .and(header_exists("authorization"))
        .and(body_string_contains("To=%2B919322659210"))
        .and(body_string_contains("From=%2B15005550006"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "sid": "SM0001",
            "status": "queued"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = gateway(&server, Duration::from_secs(5))
        .send("+919322659210", "URGENT: Blood needed")
        .await;

    assert_eq!(outcome.kind, OutcomeKind::Delivered);
}

#[tokio::test]
async fn invalid_number_is_permanent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MESSAGES_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": 21211,
            "message": "The 'To' number +910000000000 is not a valid phone number.",
            "more_info": "https://www.twilio.com/docs/errors/21211",
            "status": 400
        })))
        .mount(&server)
        .await;

    let outcome = gateway(&server, Duration::from_secs(5))
        .send("+910000000000", "hello")
        .await;

    assert_eq!(outcome.kind, OutcomeKind::RejectedPermanent);
    assert!(outcome.detail.unwrap().contains("not a valid phone number"));
}

#[tokio::test]
async fn other_rejections_are_transient() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MESSAGES_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": 21610,
            "message": "Attempt to send to unsubscribed recipient",
            "status": 400
        })))
        .mount(&server)
        .await;

    let outcome = gateway(&server, Duration::from_secs(5))
        .send("+919322659210", "hello")
        .await;

    assert_eq!(outcome.kind, OutcomeKind::RejectedTransient);
}

#[tokio::test]
async fn server_error_without_body_is_transient() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MESSAGES_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let outcome = gateway(&server, Duration::from_secs(5))
        .send("+919322659210", "hello")
        .await;

    assert_eq!(outcome.kind, OutcomeKind::RejectedTransient);
    assert_eq!(outcome.detail.as_deref(), Some("HTTP 503"));
}

#[tokio::test]
async fn slow_response_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MESSAGES_PATH))
        .respond_with(ResponseTemplate::new(201).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let outcome = gateway(&server, Duration::from_millis(100))
        .send("+919322659210", "hello")
        .await;

    assert_eq!(outcome.kind, OutcomeKind::TransportError);
}

#[tokio::test]
async fn unreachable_api_is_transport_error() {
    let gateway =
        TwilioGateway::new(settings(), "http://127.0.0.1:1", Duration::from_secs(2)).unwrap();

    let outcome = gateway.send("+919322659210", "hello").await;

    assert_eq!(outcome.kind, OutcomeKind::TransportError);
}
