//! Integration tests for the signed cloud API client against a mock server.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::Method;
use rsa::RsaPrivateKey;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::signature::Verifier;
use serde_json::json;
use sha2::Sha256;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ci_reaper::application::ports::MachineInventory;
use ci_reaper::domain::error::is_not_found;
use ci_reaper::domain::{CloudApiError, MachineState};
use ci_reaper::infra::cloudapi::{API_VERSION, CloudApiClient};
use ci_reaper::infra::signing::{RequestSigner, signing_string};

const KEY_PEM: &str = include_str!("../fixtures/test_rsa_key.pem");

fn key() -> RsaPrivateKey {
    RsaPrivateKey::from_pkcs1_pem(KEY_PEM).expect("fixture key")
}

fn client(server: &MockServer) -> CloudApiClient {
    let signer = RequestSigner::new("ci", "aa:bb:cc", key());
    CloudApiClient::with_signer(&server.uri(), "ci", signer).expect("client")
}

fn machine_json(id: &str, state: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": format!("ci-{id}"),
        "state": state,
        "created": "2024-05-31T00:00:00.000Z",
        "memory": 1024,
        "primaryIp": "10.0.0.7",
        "dataset": "sdc:sdc:base:1.0.0"
    })
}

// ── Signed request layer ──────────────────────────────────────────────────────

#[tokio::test]
async fn requests_carry_a_verifiable_signature() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ci/machines/m-1"))
        .and(header("api-version", API_VERSION))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(machine_json("m-1", "running")))
        .expect(1)
        .mount(&server)
        .await;

    let machine = client(&server).get_machine("m-1").await.expect("machine");
    assert_eq!(machine.state, MachineState::Running);
    assert_eq!(machine.primary_ip.as_deref(), Some("10.0.0.7"));

    let requests = server.received_requests().await.expect("recording enabled");
    let req = &requests[0];
    let date = req.headers.get("date").unwrap().to_str().unwrap();
    assert!(date.ends_with(" GMT"), "{date}");

    let auth = req.headers.get("authorization").unwrap().to_str().unwrap();
    let prefix = "Signature keyId=\"/ci/keys/aa:bb:cc\",algorithm=\"rsa-sha256\",signature=\"";
    assert!(auth.starts_with(prefix), "{auth}");
    let encoded = auth[prefix.len()..].trim_end_matches('"');
    let raw = STANDARD.decode(encoded).expect("base64 signature");
    let signature = Signature::try_from(raw.as_slice()).expect("signature bytes");
    VerifyingKey::<Sha256>::new(key().to_public_key())
        .verify(signing_string(date).as_bytes(), &signature)
        .expect("signature verifies against the sent Date header");
}

#[tokio::test]
async fn request_returns_headers_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ci"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-request-id", "req-42")
                .set_body_json(json!({"login": "ci"})),
        )
        .mount(&server)
        .await;

    let response = client(&server)
        .request(Method::GET, "/ci", None)
        .await
        .expect("response");

    assert_eq!(response.body["login"], "ci");
    assert_eq!(response.headers.get("x-request-id").map(String::as_str), Some("req-42"));
}

#[tokio::test]
async fn full_urls_are_rejected_before_sending() {
    let server = MockServer::start().await;

    let err = client(&server)
        .request(Method::GET, "https://evil.example/ci/machines", None)
        .await
        .expect_err("full URL");

    assert!(matches!(
        err.downcast_ref::<CloudApiError>(),
        Some(CloudApiError::InvalidPath(_))
    ));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn non_success_status_is_an_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ci/machines/missing"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"code": "ResourceNotFound", "message": "missing"})),
        )
        .mount(&server)
        .await;

    let err = client(&server)
        .get_machine("missing")
        .await
        .expect_err("404");

    match err.downcast_ref::<CloudApiError>() {
        Some(CloudApiError::Api { status, body }) => {
            assert_eq!(*status, 404);
            assert!(body.contains("ResourceNotFound"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(is_not_found(&err));
}

#[tokio::test]
async fn server_error_is_not_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client(&server).get_machine("m-1").await.expect_err("500");

    assert!(!is_not_found(&err));
}

#[tokio::test]
async fn non_json_body_is_an_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = client(&server)
        .request(Method::GET, "/ci", None)
        .await
        .expect_err("html body");

    assert!(matches!(
        err.downcast_ref::<CloudApiError>(),
        Some(CloudApiError::InvalidResponse { .. })
    ));
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let signer = RequestSigner::new("ci", "aa:bb:cc", key());
    let client = CloudApiClient::with_signer(&format!("http://{addr}"), "ci", signer).unwrap();
    let err = client
        .request(Method::GET, "/ci", None)
        .await
        .expect_err("connection refused");

    assert!(matches!(
        err.downcast_ref::<CloudApiError>(),
        Some(CloudApiError::Transport { .. })
    ));
}

// ── Machine inventory ─────────────────────────────────────────────────────────

#[tokio::test]
async fn list_machines_follows_pages_until_a_short_page() {
    let server = MockServer::start().await;
    let pages = [
        ("0", vec![machine_json("a", "running"), machine_json("b", "stopped")]),
        ("2", vec![machine_json("c", "provisioning"), machine_json("d", "running")]),
        ("4", vec![machine_json("e", "failed")]),
    ];
    for (offset, body) in pages {
        Mock::given(method("GET"))
            .and(path("/ci/machines"))
            .and(query_param("limit", "2"))
            .and(query_param("offset", offset))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&server)
            .await;
    }

    let machines = client(&server)
        .with_page_limit(2)
        .list_machines()
        .await
        .expect("machines");

    let ids: Vec<_> = machines.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, ["a", "b", "c", "d", "e"]);
    assert_eq!(machines[4].state, MachineState::Unknown("failed".to_string()));
}

#[tokio::test]
async fn list_machines_stops_after_empty_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ci/machines"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let machines = client(&server).list_machines().await.expect("machines");

    assert!(machines.is_empty());
}

#[tokio::test]
async fn tags_are_read_as_a_map() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ci/machines/m-1/tags"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"permanent": "true", "owner": "qa"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ci/machines/m-2/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let cloud = client(&server);
    let tags = cloud.list_machine_tags("m-1").await.expect("tags");
    assert!(tags.is_permanent());
    assert_eq!(tags.get("owner"), Some(&json!("qa")));

    let empty = cloud.list_machine_tags("m-2").await.expect("tags");
    assert!(empty.is_empty());
}

#[tokio::test]
async fn delete_accepts_empty_no_content_response() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/ci/machines/m-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client(&server).delete_machine("m-1").await.expect("deleted");
}
