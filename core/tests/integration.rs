//! End-to-end exchanges against the live mock server.
//!
//! # Design
//! Each test starts the mock server on a random loopback port and drives the
//! client over real HTTP through the default ureq transport. The server echoes
//! what it received, so assertions cover both what went on the wire and how
//! the raw response was reassembled.

use std::io::Cursor;
use std::net::SocketAddr;

use http_client_core::{Body, Client, ClientConfig, HttpClientError, Request};
use mock_server::{AuthResult, Echo};

/// Start the mock server on a random port and return its address.
fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn client() -> Client {
    let _ = env_logger::builder().is_test(true).try_init();
    Client::new()
}

#[test]
fn get_returns_echo_with_host_header() {
    let addr = start_server();
    let response = client()
        .send_request(Request::get(&format!("http://{addr}/get")).unwrap())
        .unwrap();

    assert_eq!(response.status, 200);
    assert!(!response.headers.is_empty());
    assert_eq!(response.header("content-type").unwrap(), ["application/json"]);

    let echo: Echo = response.json().unwrap();
    assert_eq!(echo.method, "GET");
    assert!(echo.headers["Host"].contains("127.0.0.1"));
}

#[test]
fn post_sends_form_fields() {
    let addr = start_server();
    let req = Request::new("POST", &format!("http://{addr}/post"))
        .unwrap()
        .with_body("foo=bar");
    let response = client().send_request(req).unwrap();

    assert_eq!(response.status, 200);
    let echo: Echo = response.json().unwrap();
    assert_eq!(echo.method, "POST");
    assert_eq!(echo.form["foo"], "bar");
}

#[test]
fn put_goes_out_as_put_with_form_fields() {
    let addr = start_server();
    let req = Request::new("PUT", &format!("http://{addr}/put"))
        .unwrap()
        .with_body(Body::seekable(Cursor::new(b"foo=bar".to_vec())));
    let response = client().send_request(req).unwrap();

    assert_eq!(response.status, 200);
    let echo: Echo = response.json().unwrap();
    assert_eq!(echo.method, "PUT");
    assert_eq!(echo.form["foo"], "bar");
}

#[test]
fn patch_and_delete_reach_their_routes() {
    let addr = start_server();
    for (method, path) in [("PATCH", "patch"), ("DELETE", "delete")] {
        let req = Request::new(method, &format!("http://{addr}/{path}")).unwrap();
        let response = client().send_request(req).unwrap();

        assert_eq!(response.status, 200, "{method}");
        let echo: Echo = response.json().unwrap();
        assert_eq!(echo.method, method);
        assert!(echo.headers["Host"].contains("127.0.0.1"));
    }
}

#[test]
fn head_returns_status_without_body() {
    let addr = start_server();
    let req = Request::new("HEAD", &format!("http://{addr}/get")).unwrap();
    let response = client().send_request(req).unwrap();

    assert_eq!(response.status, 200);
    assert!(response.body.is_empty());
}

#[test]
fn basic_auth_via_authorization_header() {
    let addr = start_server();
    let req = Request::get(&format!("http://{addr}/basic-auth/john/secret"))
        .unwrap()
        .with_header("Authorization", "Basic am9objpzZWNyZXQ=");
    let response = client().send_request(req).unwrap();

    assert_eq!(response.status, 200);
    let result: AuthResult = response.json().unwrap();
    assert!(result.authenticated);
}

#[test]
fn basic_auth_via_uri_credentials() {
    let addr = start_server();
    let req = Request::get(&format!("http://john:secret@{addr}/basic-auth/john/secret")).unwrap();
    let response = client().send_request(req).unwrap();

    assert_eq!(response.status, 200);
    let result: AuthResult = response.json().unwrap();
    assert_eq!(result.user, "john");
}

#[test]
fn wrong_credentials_are_a_response_not_an_error() {
    let addr = start_server();
    let req = Request::get(&format!("http://john:wrong@{addr}/basic-auth/john/secret")).unwrap();
    let response = client().send_request(req).unwrap();

    assert_eq!(response.status, 401);
    assert!(response.header("www-authenticate").is_some());
}

#[test]
fn request_headers_are_sent_comma_joined() {
    let addr = start_server();
    let req = Request::get(&format!("http://{addr}/headers"))
        .unwrap()
        .with_header("X-Foo", "a")
        .with_header("X-Foo", "b");
    let response = client().send_request(req).unwrap();

    let payload: serde_json::Value = response.json().unwrap();
    assert_eq!(payload["headers"]["X-Foo"], "a, b");
}

#[test]
fn response_header_values_are_split_on_comma_space() {
    let addr = start_server();
    let req = Request::get(&format!("http://{addr}/response-headers?X-List=a,%20b")).unwrap();
    let response = client().send_request(req).unwrap();

    assert_eq!(response.header("x-list").unwrap(), ["a", "b"]);
}

#[test]
fn repeated_response_header_keeps_last_line() {
    let addr = start_server();
    let req = Request::get(&format!("http://{addr}/response-headers?X-Multi=first&X-Multi=second")).unwrap();
    let response = client().send_request(req).unwrap();

    assert_eq!(response.header("x-multi").unwrap(), ["second"]);
}

#[test]
fn non_success_status_is_returned() {
    let addr = start_server();
    let response = client()
        .send_request(Request::get(&format!("http://{addr}/status/404")).unwrap())
        .unwrap();

    assert_eq!(response.status, 404);
    assert!(response.body.is_empty());
}

#[test]
fn redirects_are_not_followed_by_default() {
    let addr = start_server();
    let req = Request::get(&format!("http://{addr}/redirect-to?url=/get")).unwrap();
    let response = client().send_request(req).unwrap();

    assert_eq!(response.status, 302);
    assert_eq!(response.header("location").unwrap(), ["/get"]);
}

#[test]
fn redirects_are_followed_when_configured() {
    let addr = start_server();
    let config = ClientConfig {
        max_redirects: 5,
        ..ClientConfig::default()
    };
    let req = Request::get(&format!("http://{addr}/redirect-to?url=/get")).unwrap();
    let response = Client::with_config(config).send_request(req).unwrap();

    assert_eq!(response.status, 200);
    let echo: Echo = response.json().unwrap();
    assert_eq!(echo.method, "GET");
}

#[test]
fn uncaptured_headers_leave_only_the_body() {
    let addr = start_server();
    let config = ClientConfig {
        capture_headers: false,
        ..ClientConfig::default()
    };
    let req = Request::get(&format!("http://{addr}/uuid")).unwrap();
    let response = Client::with_config(config).send_request(req).unwrap();

    assert_eq!(response.status, 200);
    assert!(response.headers.is_empty());
    let payload: serde_json::Value = response.json().unwrap();
    assert!(payload["uuid"].is_string());
}

#[test]
fn user_agent_from_config_is_sent() {
    let addr = start_server();
    let config = ClientConfig::from_json(r#"{"user_agent":"mapper/1.0"}"#).unwrap();
    let req = Request::get(&format!("http://{addr}/headers")).unwrap();
    let response = Client::with_config(config).send_request(req).unwrap();

    let payload: serde_json::Value = response.json().unwrap();
    assert_eq!(payload["headers"]["User-Agent"], "mapper/1.0");
}

#[test]
fn one_client_serves_several_threads() {
    let addr = start_server();
    let client = client();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let response = client
                    .send_request(Request::get(&format!("http://{addr}/uuid")).unwrap())
                    .unwrap();
                assert_eq!(response.status, 200);
            });
        }
    });
}

#[test]
fn stream_body_fails_before_connecting() {
    // Nothing listens here; reaching the transport would yield a transport error.
    let req = Request::new("POST", "http://127.0.0.1:9/post")
        .unwrap()
        .with_body(Body::stream(Cursor::new(b"foo=bar".to_vec())));
    let err = client().send_request(req).unwrap_err();

    assert!(matches!(err, HttpClientError::InvalidBody(_)));
    assert_eq!(err.code(), 400);
}

#[test]
fn invalid_method_fails_before_connecting() {
    let req = Request::new("INVALID", "http://127.0.0.1:9/get").unwrap();
    let err = client().send_request(req).unwrap_err();

    assert!(matches!(err, HttpClientError::InvalidMethod(_)));
}

#[test]
fn refused_connection_is_a_transport_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let err = client()
        .send_request(Request::get(&format!("http://127.0.0.1:{port}/get")).unwrap())
        .unwrap_err();

    assert!(matches!(err, HttpClientError::Transport { .. }));
    assert_ne!(err.code(), 0);
}

#[test]
fn unresolvable_host_is_a_transport_error() {
    let err = client()
        .send_request(Request::get("https://nope.invalid/").unwrap())
        .unwrap_err();

    match err {
        HttpClientError::Transport { code, ref message } => {
            assert_ne!(code, 0);
            assert!(!message.is_empty());
        }
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[test]
fn transport_traces_outgoing_request_header() {
    use http_client_core::resolver;
    use http_client_core::{Transport, UreqTransport};

    let addr = start_server();
    let mut req = Request::new("PUT", &format!("http://{addr}/put"))
        .unwrap()
        .with_header("X-Foo", "a")
        .with_header("X-Foo", "b")
        .with_body("foo=bar");
    let options = resolver::resolve(&ClientConfig::default(), &mut req).unwrap();
    let raw = UreqTransport::new().execute(&options).unwrap();

    let trace = raw.request_header.unwrap();
    assert!(trace.starts_with("PUT /put HTTP/1.1\r\n"));
    assert!(trace.contains("X-Foo: a, b\r\n"));
    assert!(trace.contains("Content-Type: application/x-www-form-urlencoded\r\n"));
    assert!(!trace.contains("Content-Length"));

    assert_eq!(raw.status, 200);
    assert_eq!(raw.header_size + raw.download_size, raw.buffer.len());
    assert!(raw.buffer.starts_with(b"HTTP/1.1 200 OK\r\n"));
}

#[test]
fn large_body_is_read_in_full_by_default() {
    let addr = start_server();
    let size = 11 * 1024 * 1024;
    let response = client()
        .send_request(Request::get(&format!("http://{addr}/bytes/{size}")).unwrap())
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.body.len(), size);
}

#[test]
fn body_over_configured_limit_fails_with_filesize_code() {
    let addr = start_server();
    let config = ClientConfig {
        max_response_bytes: Some(8),
        ..ClientConfig::default()
    };
    let err = Client::with_config(config)
        .send_request(Request::get(&format!("http://{addr}/bytes/64")).unwrap())
        .unwrap_err();

    assert!(matches!(err, HttpClientError::Transport { code: 63, .. }), "{err:?}");
}

#[test]
fn silent_server_hits_the_overall_timeout() {
    // Accepts the connection and never answers.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        let _held: Vec<_> = listener.incoming().collect();
    });

    let config = ClientConfig {
        timeout_ms: Some(200),
        ..ClientConfig::default()
    };
    let err = Client::with_config(config)
        .send_request(Request::get(&format!("http://{addr}/get")).unwrap())
        .unwrap_err();

    assert!(matches!(err, HttpClientError::Transport { code: 28, .. }), "{err:?}");
    assert!(!err.message().is_empty());
}
