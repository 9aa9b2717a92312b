use avaandmed::{
    AvaandmedClient, AvaandmedError, BearerAuth, ClientConfig, Credentials, HttpMethod,
    KeyLoginAuth, DOWNLOAD_SUCCESS,
};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY_ID: &str = "id";
const API_KEY: &str = "token";
const ACCESS_TOKEN: &str = "T";

fn credentials() -> Credentials {
    Credentials::new(KEY_ID, API_KEY)
}

/// Helper to create a client talking to the mock server
fn create_test_client(server: &MockServer) -> AvaandmedClient {
    let config = ClientConfig::with_base_url(server.uri()).expect("Mock server URI should parse");
    AvaandmedClient::with_config(config, credentials()).expect("Failed to create client")
}

/// Helper to stub a successful key-login
async fn mount_key_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/auth/key-login"))
        .and(header("X-API-KEY", credentials().encode()))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"data": {"accessToken": ACCESS_TOKEN}})),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_acquire_token_returns_access_token() {
    let _ = env_logger::try_init();

    let server = MockServer::start().await;
    mount_key_login(&server).await;

    let config = ClientConfig::with_base_url(server.uri()).unwrap();
    let auth = KeyLoginAuth::new(reqwest::Client::new(), &config, credentials()).unwrap();

    let token = auth.acquire_token().await.expect("Key login should succeed");
    assert_eq!(token, "T");
}

#[tokio::test]
async fn test_rejected_key_login_stops_request() {
    let _ = env_logger::try_init();

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/key-login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"statusCode": 401, "message": "Unauthorized"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/datasets/total"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": 1})))
        .expect(0)
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let err = client
        .request::<u64>(HttpMethod::Get, "/datasets/total")
        .await
        .unwrap_err();

    match err {
        AvaandmedError::Api { status, uri, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Unauthorized");
            assert_eq!(uri, format!("{}/api/auth/key-login", server.uri()));
        }
        other => panic!("Expected API error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_request_unwraps_envelope_and_sends_headers() {
    let _ = env_logger::try_init();

    let server = MockServer::start().await;
    mount_key_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/datasets/total"))
        .and(header("Authorization", "Bearer T"))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": 123})))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let total: i64 = client
        .request(HttpMethod::Get, "/datasets/total")
        .await
        .expect("Request should succeed");

    assert_eq!(total, 123);
}

#[tokio::test]
async fn test_not_found_carries_status_and_url() {
    let _ = env_logger::try_init();

    let server = MockServer::start().await;
    mount_key_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/datasets/missing"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"statusCode": 404, "message": "Dataset not found"})),
        )
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let err = client
        .request::<Value>(HttpMethod::Get, "/datasets/missing")
        .await
        .unwrap_err();

    assert!(err.is_api_error());
    assert_eq!(err.status(), Some(404));
    match err {
        AvaandmedError::Api { uri, message, .. } => {
            assert_eq!(uri, format!("{}/api/datasets/missing", server.uri()));
            assert_eq!(message, "Dataset not found");
        }
        other => panic!("Expected API error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_error_body_falls_back_to_status() {
    let _ = env_logger::try_init();

    let server = MockServer::start().await;
    mount_key_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/datasets/total"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let err = client
        .request::<Value>(HttpMethod::Get, "/datasets/total")
        .await
        .unwrap_err();

    match err {
        AvaandmedError::Api { status, message, .. } => {
            assert_eq!(status, 500);
            assert_eq!(message, "HTTP 500 Internal Server Error");
        }
        other => panic!("Expected API error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_envelope_is_a_decode_error() {
    let _ = env_logger::try_init();

    let server = MockServer::start().await;
    mount_key_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/datasets/total"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total": 5})))
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let err = client
        .request::<u64>(HttpMethod::Get, "/datasets/total")
        .await
        .unwrap_err();

    assert!(matches!(err, AvaandmedError::Json(_)));
}

#[tokio::test]
async fn test_post_body_round_trips() {
    let _ = env_logger::try_init();

    let server = MockServer::start().await;
    mount_key_login(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/echo"))
        .and(body_json(json!({"a": 1})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": {"a": 1}})))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let echoed: Value = client
        .request_with_body(HttpMethod::Post, "/echo", &json!({"a": 1}))
        .await
        .expect("Echo should succeed");

    assert_eq!(echoed, json!({"a": 1}));
}

#[tokio::test]
async fn test_put_without_body_sends_empty_object() {
    let _ = env_logger::try_init();

    let server = MockServer::start().await;
    mount_key_login(&server).await;
    Mock::given(method("PUT"))
        .and(path("/api/things/1/publish"))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    client
        .request_ack(HttpMethod::Put, "/things/1/publish")
        .await
        .expect("Empty acknowledgement should be accepted");
}

#[tokio::test]
async fn test_token_is_fetched_for_every_request() {
    let _ = env_logger::try_init();

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/key-login"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"data": {"accessToken": ACCESS_TOKEN}})),
        )
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/datasets/total"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": 7})))
        .expect(2)
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    for _ in 0..2 {
        let total: u64 = client.request(HttpMethod::Get, "/datasets/total").await.unwrap();
        assert_eq!(total, 7);
    }
}

#[tokio::test]
async fn test_token_ttl_reuses_token() {
    let _ = env_logger::try_init();

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/key-login"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"data": {"accessToken": ACCESS_TOKEN}})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/datasets/total"))
        .and(header("Authorization", "Bearer T"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": 7})))
        .expect(2)
        .mount(&server)
        .await;

    let config = ClientConfig::with_base_url(server.uri())
        .unwrap()
        .token_ttl(Some(Duration::from_secs(300)));
    let client = AvaandmedClient::with_config(config, credentials()).unwrap();

    for _ in 0..2 {
        let total: u64 = client.request(HttpMethod::Get, "/datasets/total").await.unwrap();
        assert_eq!(total, 7);
    }
}

#[tokio::test]
async fn test_concurrent_requests_share_client() {
    let _ = env_logger::try_init();

    let server = MockServer::start().await;
    mount_key_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/datasets/total"))
        .and(header("Authorization", "Bearer T"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": 3})))
        .expect(4)
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let calls = (0..4).map(|_| {
        let client = client.clone();
        tokio::spawn(async move { client.request::<u64>(HttpMethod::Get, "/datasets/total").await })
    });

    for handle in calls.collect::<Vec<_>>() {
        assert_eq!(handle.await.unwrap().unwrap(), 3);
    }
}

#[tokio::test]
async fn test_static_bearer_skips_key_login() {
    let _ = env_logger::try_init();

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/me/datasets/abc"))
        .and(header("Authorization", "Bearer static-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"id": "abc"}})))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::with_base_url(server.uri()).unwrap();
    let client = AvaandmedClient::with_auth(config, BearerAuth::new("static-token")).unwrap();

    let dataset = client.users().me().dataset().get_by_id("abc").await.unwrap();
    assert_eq!(dataset.id.as_deref(), Some("abc"));

    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| r.url.path() != "/api/auth/key-login"));
}

#[tokio::test]
async fn test_unreachable_host_is_a_transport_error() {
    let _ = env_logger::try_init();

    let config = ClientConfig::with_base_url("http://127.0.0.1:1")
        .unwrap()
        .timeout(Some(Duration::from_secs(5)));
    let client = AvaandmedClient::with_config(config, credentials()).unwrap();

    let err = client
        .request::<u64>(HttpMethod::Get, "/datasets/total")
        .await
        .unwrap_err();

    assert!(err.is_transport(), "Expected transport error, got {:?}", err);
    assert!(!err.is_api_error());
}

#[tokio::test]
async fn test_download_writes_file() {
    let _ = env_logger::try_init();

    let server = MockServer::start().await;
    mount_key_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/datasets/d1/files/f1/download"))
        .and(header("Authorization", "Bearer T"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"aasta;arv\n2021;5\n".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("data.csv");

    let client = create_test_client(&server);
    let status = client
        .download("/datasets/d1/files/f1/download", &target)
        .await
        .expect("Download should succeed");

    assert_eq!(status, DOWNLOAD_SUCCESS);
    assert_eq!(status, 0);
    assert!(target.exists());
    assert_eq!(std::fs::read(&target).unwrap(), b"aasta;arv\n2021;5\n");
}

#[tokio::test]
async fn test_download_with_empty_target_makes_no_request() {
    let _ = env_logger::try_init();

    let server = MockServer::start().await;
    mount_key_login(&server).await;

    let client = create_test_client(&server);
    let err = client
        .download("/datasets/d1/files/f1/download", "")
        .await
        .unwrap_err();

    assert!(err.is_invalid_parameter());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_download_error_leaves_no_file() {
    let _ = env_logger::try_init();

    let server = MockServer::start().await;
    mount_key_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/datasets/d1/files/f1/download"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({"statusCode": 403, "message": "Forbidden resource"})),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("data.csv");

    let client = create_test_client(&server);
    let err = client
        .download("/datasets/d1/files/f1/download", &target)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(403));
    assert!(!target.exists());
}

/// Serve one response that announces more bytes than it sends, then hang up
async fn serve_truncated_body() -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                return;
            }
            request.extend_from_slice(&buf[..n]);
        }
        socket
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 1000\r\nContent-Type: text/csv\r\n\r\npartial-bytes")
            .await
            .unwrap();
        socket.flush().await.unwrap();
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn test_truncated_download_removes_partial_file() {
    let _ = env_logger::try_init();

    let base_url = serve_truncated_body().await;
    let config = ClientConfig::with_base_url(base_url).unwrap();
    let client = AvaandmedClient::with_auth(config, BearerAuth::new("static-token")).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("data.csv");

    let err = client
        .download("/datasets/d1/files/f1/download", &target)
        .await
        .unwrap_err();

    assert!(err.is_transport(), "Expected transport error, got {:?}", err);
    assert!(!target.exists());
}

#[tokio::test]
async fn test_rejected_cached_token_is_dropped() {
    let _ = env_logger::try_init();

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/key-login"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"data": {"accessToken": "old"}})),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/key-login"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"data": {"accessToken": "new"}})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/datasets/total"))
        .and(header("Authorization", "Bearer old"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"statusCode": 401, "message": "Unauthorized"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/datasets/total"))
        .and(header("Authorization", "Bearer new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": 7})))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::with_base_url(server.uri())
        .unwrap()
        .token_ttl(Some(Duration::from_secs(300)));
    let client = AvaandmedClient::with_config(config, credentials()).unwrap();

    let err = client
        .request::<u64>(HttpMethod::Get, "/datasets/total")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(401));

    let total: u64 = client.request(HttpMethod::Get, "/datasets/total").await.unwrap();
    assert_eq!(total, 7);
}
