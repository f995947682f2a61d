//! Connect backend tests against a wiremock server.

use opdotenv::backends::connect::ConnectBackend;
use opdotenv::{FlatMap, HttpConfig, OpdotenvError, SecretBackend};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend(server: &MockServer) -> ConnectBackend {
    ConnectBackend::new(&server.uri(), "test-token", HttpConfig::default()).unwrap()
}

fn backend_with_timeouts(server: &MockServer, read_ms: u64) -> ConnectBackend {
    let http = HttpConfig {
        connect_timeout: Duration::from_secs(5),
        read_timeout: Duration::from_millis(read_ms),
    };
    ConnectBackend::new(&server.uri(), "test-token", http).unwrap()
}

fn full_item() -> Value {
    json!({
        "id": "item-1",
        "title": "App",
        "category": "LOGIN",
        "vault": {"id": "vault-1"},
        "fields": [
            {"id": "f1", "label": "A", "value": "1"},
            {"id": "f2", "label": "password", "value": "hunter2"},
            {"id": "n1", "label": "notesPlain", "purpose": "NOTES", "value": "FOO=bar\n"}
        ]
    })
}

/// Mounts the vault listing, the item listing, and the full item fetch.
/// The vault listing insists on the bearer token, so every code path
/// through it proves the Authorization header is sent.
async fn mount_standard_item(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/vaults"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"id": "vault-1", "name": "Production"}])),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/vaults/vault-1/items"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"id": "item-1", "title": "App"}])),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/vaults/vault-1/items/item-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(full_item()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn read_field_by_label() {
    let server = MockServer::start().await;
    mount_standard_item(&server).await;

    let value = backend(&server).read("op://Production/App/A").await.unwrap();
    assert_eq!(value, "1");
}

#[tokio::test]
async fn read_field_by_id() {
    let server = MockServer::start().await;
    mount_standard_item(&server).await;

    let value = backend(&server).read("op://Production/App/f2").await.unwrap();
    assert_eq!(value, "hunter2");
}

#[tokio::test]
async fn read_bare_item_returns_notes() {
    let server = MockServer::start().await;
    mount_standard_item(&server).await;

    let value = backend(&server).read("op://Production/App").await.unwrap();
    assert_eq!(value, "FOO=bar\n");
}

#[tokio::test]
async fn read_notes_plain_matches_purpose() {
    let server = MockServer::start().await;
    mount_standard_item(&server).await;

    let value = backend(&server)
        .read("op://Production/App/notesPlain")
        .await
        .unwrap();
    assert_eq!(value, "FOO=bar\n");
}

#[tokio::test]
async fn read_missing_field_is_empty_string() {
    let server = MockServer::start().await;
    mount_standard_item(&server).await;

    let value = backend(&server)
        .read("op://Production/App/NO_SUCH")
        .await
        .unwrap();
    assert_eq!(value, "");
}

#[tokio::test]
async fn vault_accepted_by_id() {
    let server = MockServer::start().await;
    mount_standard_item(&server).await;

    let value = backend(&server).read("op://vault-1/App/A").await.unwrap();
    assert_eq!(value, "1");
}

#[tokio::test]
async fn get_item_returns_full_json() {
    let server = MockServer::start().await;
    mount_standard_item(&server).await;

    let text = backend(&server)
        .get_item("App", Some("Production"))
        .await
        .unwrap();
    let item: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(item["id"], "item-1");
    assert_eq!(item["fields"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn get_item_searches_all_vaults_when_unscoped() {
    let server = MockServer::start().await;
    mount_standard_item(&server).await;

    let text = backend(&server).get_item("App", None).await.unwrap();
    assert!(text.contains("item-1"));
}

#[tokio::test]
async fn get_item_unknown_title_is_not_found() {
    let server = MockServer::start().await;
    mount_standard_item(&server).await;

    let err = backend(&server)
        .get_item("Missing", Some("Production"))
        .await
        .unwrap_err();
    assert!(matches!(err, OpdotenvError::NotFound(_)));
}

#[tokio::test]
async fn unknown_vault_is_not_found() {
    let server = MockServer::start().await;
    mount_standard_item(&server).await;

    let err = backend(&server)
        .get_item("App", Some("Nonexistent"))
        .await
        .unwrap_err();
    assert!(matches!(err, OpdotenvError::NotFound(_)));
    assert!(err.to_string().contains("Nonexistent"));
}

#[tokio::test]
async fn vault_lookup_is_cached_per_instance() {
    let server = MockServer::start().await;
    mount_standard_item(&server).await;

    let backend = backend(&server);
    backend.read("op://Production/App/A").await.unwrap();
    backend.read("op://Production/App/f2").await.unwrap();

    let vault_listings = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/v1/vaults")
        .count();
    assert_eq!(vault_listings, 1);
}

#[tokio::test]
async fn status_401_maps_to_authorization() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/vaults"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = backend(&server).get_item("App", Some("V")).await.unwrap_err();
    match err {
        OpdotenvError::Authorization(msg) => assert!(msg.contains("unauthorized")),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn status_403_maps_to_authorization_forbidden() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/vaults"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = backend(&server).get_item("App", Some("V")).await.unwrap_err();
    match err {
        OpdotenvError::Authorization(msg) => assert!(msg.contains("forbidden")),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn status_404_maps_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/vaults"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = backend(&server).get_item("App", Some("V")).await.unwrap_err();
    assert!(matches!(err, OpdotenvError::NotFound(_)));
}

#[tokio::test]
async fn status_500_surfaces_only_whitelisted_message() {
    let server = MockServer::start().await;
    let body = json!({"message": "Internal Server Error", "secret": "sk_live_leak"});
    Mock::given(method("GET"))
        .and(path("/v1/vaults"))
        .respond_with(ResponseTemplate::new(500).set_body_json(body))
        .mount(&server)
        .await;

    let err = backend(&server).get_item("App", Some("V")).await.unwrap_err();
    let text = err.to_string();
    assert!(text.contains("500"));
    assert!(text.contains("Internal Server Error"));
    assert!(!text.contains("sk_live_leak"));
    assert!(!text.contains("{\"message\""));
}

#[tokio::test]
async fn status_5xx_with_non_json_body_stays_generic() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/vaults"))
        .respond_with(ResponseTemplate::new(503).set_body_string("SECRET=value"))
        .mount(&server)
        .await;

    let err = backend(&server).get_item("App", Some("V")).await.unwrap_err();
    let text = err.to_string();
    assert!(text.contains("server error"));
    assert!(!text.contains("SECRET=value"));
}

#[tokio::test]
async fn unclassified_status_extracts_error_field() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/vaults"))
        .respond_with(ResponseTemplate::new(418).set_body_json(json!({"error": "teapot"})))
        .mount(&server)
        .await;

    let err = backend(&server).get_item("App", Some("V")).await.unwrap_err();
    let text = err.to_string();
    assert!(text.contains("418"));
    assert!(text.contains("teapot"));
}

#[tokio::test]
async fn unclassified_status_with_plain_body_stays_generic() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/vaults"))
        .respond_with(ResponseTemplate::new(400).set_body_string("raw body"))
        .mount(&server)
        .await;

    let err = backend(&server).get_item("App", Some("V")).await.unwrap_err();
    let text = err.to_string();
    assert!(text.contains("request failed"));
    assert!(!text.contains("raw body"));
}

#[tokio::test]
async fn retries_once_then_succeeds() {
    let server = MockServer::start().await;

    // first attempt stalls past the read timeout, second responds promptly
    Mock::given(method("GET"))
        .and(path("/v1/vaults"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(3)),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/vaults"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "vault-1", "name": "Production"}
        ])))
        .mount(&server)
        .await;

    let backend = backend_with_timeouts(&server, 300);
    // vault resolves, so the retried listing was served
    let err = backend.get_item("App", Some("Production")).await;
    // the item listing itself 404s (no mock), proving we got past /v1/vaults
    assert!(matches!(err, Err(OpdotenvError::NotFound(_))));

    let attempts = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/v1/vaults")
        .count();
    assert_eq!(attempts, 2);
}

#[tokio::test]
async fn second_transport_failure_propagates_unwrapped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/vaults"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let backend = backend_with_timeouts(&server, 300);
    let err = backend.get_item("App", Some("V")).await.unwrap_err();
    match err {
        OpdotenvError::Transport(e) => assert!(e.is_timeout()),
        other => panic!("unexpected error: {other}"),
    }

    // exactly one retry: two attempts total
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn connection_refused_is_not_retried() {
    // grab a free port and close it again so nothing is listening
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let backend =
        ConnectBackend::new(&format!("http://{addr}"), "test-token", HttpConfig::default())
            .unwrap();

    let started = std::time::Instant::now();
    let err = backend.get_item("App", Some("V")).await.unwrap_err();
    match err {
        OpdotenvError::Transport(e) => assert!(e.is_connect()),
        other => panic!("unexpected error: {other}"),
    }
    // a retry would have slept through the fixed delay first
    assert!(started.elapsed() < Duration::from_millis(200));
}

#[tokio::test]
async fn create_note_posts_secure_note_payload() {
    let server = MockServer::start().await;
    mount_standard_item(&server).await;
    Mock::given(method("POST"))
        .and(path("/v1/vaults/vault-1/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "new-item"})))
        .mount(&server)
        .await;

    backend(&server)
        .create_note("Production", ".env.test", "FOO=bar\n")
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let post = requests
        .iter()
        .find(|r| r.method.to_string() == "POST")
        .expect("no POST request");
    let body: Value = serde_json::from_slice(&post.body).unwrap();
    assert_eq!(body["category"], "SECURE_NOTE");
    assert_eq!(body["title"], ".env.test");
    assert_eq!(body["vault"]["id"], "vault-1");
    assert_eq!(body["fields"][0]["purpose"], "NOTES");
    assert_eq!(body["fields"][0]["value"], "FOO=bar\n");
}

#[tokio::test]
async fn update_patches_existing_fields_and_adds_new_ones() {
    let server = MockServer::start().await;
    mount_standard_item(&server).await;
    Mock::given(method("PATCH"))
        .and(path("/v1/vaults/vault-1/items/item-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let mut fields = FlatMap::new();
    fields.insert("A".into(), "9".into());
    fields.insert("NEW".into(), "x".into());

    backend(&server)
        .create_or_update_fields("Production", "App", &fields)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let patch = requests
        .iter()
        .find(|r| r.method.to_string() == "PATCH")
        .expect("no PATCH request");
    let ops: Value = serde_json::from_slice(&patch.body).unwrap();
    let ops = ops.as_array().unwrap();
    assert_eq!(ops.len(), 2);

    let replace = ops.iter().find(|o| o["op"] == "replace").unwrap();
    assert_eq!(replace["path"], "/fields/f1/value");
    assert_eq!(replace["value"], "9");

    let add = ops.iter().find(|o| o["op"] == "add").unwrap();
    assert_eq!(add["path"], "/fields");
    assert_eq!(add["value"]["label"], "NEW");
    assert_eq!(add["value"]["type"], "CONCEALED");
}

#[tokio::test]
async fn create_when_item_absent_posts_login_item() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/vaults"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"id": "vault-1", "name": "Production"}])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/vaults/vault-1/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/vaults/vault-1/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "new"})))
        .mount(&server)
        .await;

    let mut fields = FlatMap::new();
    fields.insert("FOO".into(), "bar".into());

    backend(&server)
        .create_or_update_fields("Production", "App", &fields)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let post = requests
        .iter()
        .find(|r| r.method.to_string() == "POST")
        .expect("no POST request");
    let body: Value = serde_json::from_slice(&post.body).unwrap();
    assert_eq!(body["category"], "LOGIN");
    assert_eq!(body["fields"][0]["label"], "FOO");
    assert_eq!(body["fields"][0]["type"], "CONCEALED");
}

#[tokio::test]
async fn empty_200_body_is_an_empty_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/vaults"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    // an empty vault listing means the vault is simply not found
    let err = backend(&server).get_item("App", Some("V")).await.unwrap_err();
    assert!(matches!(err, OpdotenvError::NotFound(_)));
}
