//! HTTP backend tests against a one-shot local server.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use availcheck_core::{CheckError, FieldKind};
use availcheck_http::{HttpBackend, HttpConfig};
use availcheck_runtime::{AvailabilityBackend, FieldConfig, FieldLoop, Status};
use serde_json::json;

/// Serve exactly one response, returning the base URL and a handle that
/// yields the request line.
fn serve_once(status: &'static str, body: &'static str, delay: Duration) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = stream.read(&mut buf).unwrap_or(0);
            request.extend_from_slice(&buf[..n]);
            if n == 0 || request.windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
        }
        thread::sleep(delay);
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let _ = stream.write_all(response.as_bytes());
        String::from_utf8_lossy(&request)
            .lines()
            .next()
            .unwrap_or_default()
            .to_string()
    });
    (format!("http://{addr}/api"), handle)
}

fn backend(base: &str) -> HttpBackend {
    HttpBackend::new(HttpConfig::new(base).unwrap().with_timeout(Duration::from_secs(5))).unwrap()
}

#[test]
fn slug_check_hits_menus_endpoint() {
    let (base, server) = serve_once(
        "200 OK",
        r#"{"available":false,"suggestions":["my-slug-1","my-slug-2"]}"#,
        Duration::ZERO,
    );
    let payload = backend(&base).check(FieldKind::Slug, "my-slug").unwrap();
    assert_eq!(
        payload,
        json!({ "available": false, "suggestions": ["my-slug-1", "my-slug-2"] })
    );
    assert_eq!(
        server.join().unwrap(),
        "GET /api/menus/check-slug?slug=my-slug HTTP/1.1"
    );
}

#[test]
fn email_check_hits_auth_endpoint() {
    let (base, server) = serve_once("200 OK", r#"{"isAvailable":true}"#, Duration::ZERO);
    let payload = backend(&base)
        .check(FieldKind::Email, "owner@bistro.com")
        .unwrap();
    assert_eq!(payload, json!({ "isAvailable": true }));
    assert_eq!(
        server.join().unwrap(),
        "GET /api/auth/check-availability?email=owner%40bistro.com HTTP/1.1"
    );
}

#[test]
fn non_success_status_is_reported() {
    let (base, server) = serve_once("503 Service Unavailable", "{}", Duration::ZERO);
    assert_eq!(
        backend(&base).check(FieldKind::Phone, "55512345"),
        Err(CheckError::Status(503))
    );
    server.join().unwrap();
}

#[test]
fn undecodable_body_is_malformed() {
    let (base, server) = serve_once("200 OK", "<html>oops</html>", Duration::ZERO);
    let err = backend(&base).check(FieldKind::Slug, "abc").unwrap_err();
    assert!(matches!(err, CheckError::Malformed(_)), "got {err:?}");
    server.join().unwrap();
}

#[test]
fn refused_connection_is_transport_error() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let err = backend(&format!("http://{addr}"))
        .check(FieldKind::Slug, "abc")
        .unwrap_err();
    assert!(matches!(err, CheckError::Transport(_)), "got {err:?}");
}

#[test]
fn slow_server_times_out() {
    let (base, server) = serve_once("200 OK", r#"{"available":true}"#, Duration::from_millis(800));
    let timeout = Duration::from_millis(150);
    let backend = HttpBackend::new(HttpConfig::new(&base).unwrap().with_timeout(timeout)).unwrap();
    assert_eq!(
        backend.check(FieldKind::Slug, "abc"),
        Err(CheckError::Timeout(timeout))
    );
    server.join().unwrap();
}

#[test]
fn field_loop_settles_against_http() {
    let (base, server) = serve_once(
        "200 OK",
        r#"{"isAvailable":false,"suggestions":["bistro-2"]}"#,
        Duration::ZERO,
    );
    let config = FieldConfig::default().with_debounce(Duration::from_millis(10));
    let mut field = FieldLoop::new(FieldKind::Slug, config, backend(&base));
    field.keystroke("bistro");
    assert_eq!(
        field.run_until_settled(Duration::from_secs(5)),
        Status::Unavailable
    );
    assert_eq!(field.handle().suggestions, vec!["bistro-2"]);
    server.join().unwrap();
}
