//! Common test utilities shared across integration tests.
#![allow(dead_code, missing_docs)]

use std::time::Duration;

use mockito::{Matcher, Mock, Server, ServerGuard};
use smartid_core::{ClientConfig, SmartIdClient};

pub const RELYING_PARTY_UUID: &str = "de305d54-75b4-431b-adb2-eb6b9e546014";
pub const RELYING_PARTY_NAME: &str = "BANK123";
pub const DOCUMENT_NUMBER: &str = "PNOEE-31111111111";

pub const CERTIFICATE_SESSION_ID: &str = "97f5058e-e308-4c83-ac14-7712b0eb9d86";
pub const SIGNATURE_SESSION_ID: &str = "2c52caf4-13b0-41c4-bdc6-aa268403cc00";
pub const AUTHENTICATION_SESSION_ID: &str = "1dcc1600-29a6-4e95-a95c-d69b31febcfb";

pub const CERTIFICATE_SESSION_RESPONSE: &str =
    include_str!("fixtures/certificate_choice_session_response.json");
pub const SIGNATURE_SESSION_RESPONSE: &str =
    include_str!("fixtures/signature_session_response.json");
pub const AUTHENTICATION_SESSION_RESPONSE: &str =
    include_str!("fixtures/authentication_session_response.json");

pub const STATUS_RUNNING: &str = include_str!("fixtures/session_status_running.json");
pub const STATUS_CERTIFICATE_OK: &str = include_str!("fixtures/session_status_certificate_ok.json");
pub const STATUS_SIGNATURE_OK: &str = include_str!("fixtures/session_status_signature_ok.json");
pub const STATUS_AUTHENTICATION_OK: &str =
    include_str!("fixtures/session_status_authentication_ok.json");
pub const STATUS_USER_REFUSED: &str = include_str!("fixtures/session_status_user_refused.json");
pub const STATUS_TIMEOUT: &str = include_str!("fixtures/session_status_timeout.json");
pub const STATUS_DOCUMENT_UNUSABLE: &str =
    include_str!("fixtures/session_status_document_unusable.json");
pub const STATUS_WRONG_VC: &str = include_str!("fixtures/session_status_wrong_vc.json");

/// A config pointing at the mock server with a short polling sleep.
pub fn config(server: &ServerGuard) -> ClientConfig {
    ClientConfig::new(RELYING_PARTY_UUID, RELYING_PARTY_NAME, server.url())
        .with_polling_sleep(Duration::from_millis(10))
}

pub fn client(server: &ServerGuard) -> SmartIdClient {
    SmartIdClient::new(config(server)).unwrap()
}

pub async fn mock_post(server: &mut ServerGuard, path: &str, status: usize, body: &str) -> Mock {
    server
        .mock("POST", path)
        .match_header("content-type", "application/json")
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

/// Mocks `hits` status queries for `session_id`, all answered with `body`.
pub async fn mock_status(
    server: &mut ServerGuard,
    session_id: &str,
    body: &str,
    hits: usize,
) -> Mock {
    let path = format!("/session/{session_id}?timeoutMs=1000");
    server
        .mock("GET", path.as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .expect(hits)
        .create_async()
        .await
}

/// Fails the test if anything queries a session status.
pub async fn forbid_status_queries(server: &mut ServerGuard) -> Mock {
    server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await
}

pub async fn new_server() -> ServerGuard {
    Server::new_async().await
}
