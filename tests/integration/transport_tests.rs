//! Real HTTP transport tests against local sockets.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use koddi_healthcheck::http::{ApiRequest, HttpConfig, HttpTransport, Transport, TransportError};
use koddi_healthcheck::SessionToken;
use serde_json::json;

fn transport(timeout: Duration) -> HttpTransport {
    HttpTransport::new(&HttpConfig {
        timeout,
        ..HttpConfig::default()
    })
    .unwrap()
}

/// Read one HTTP request (headers plus Content-Length body) as text
fn read_request(stream: &mut std::net::TcpStream) -> String {
    let mut raw = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
        let n = stream.read(&mut buf).unwrap();
        if n == 0 {
            break;
        }
        raw.extend_from_slice(&buf[..n]);

        let text = String::from_utf8_lossy(&raw).to_string();
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if raw.len() >= header_end + 4 + content_length {
                return text;
            }
        }
    }
    String::from_utf8_lossy(&raw).to_string()
}

#[test]
fn test_round_trip_with_auth_and_body() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let request = read_request(&mut stream);
        let body = r#"{"status":"success","result":{}}"#;
        write!(
            stream,
            "HTTP/1.1 201 Created\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        )
        .unwrap();
        request
    });

    let request = ApiRequest::post(
        format!("http://{}/console/v1/member_groups/1/advertisers/2/campaigns_report", addr),
        json!({"pagination": {"start": 0}}),
    )
    .with_auth(Some(&SessionToken::new("tok-123")));
    let response = transport(Duration::from_secs(5)).send(&request).unwrap();

    assert_eq!(response.status, 201);
    assert_eq!(response.body, r#"{"status":"success","result":{}}"#);

    let seen = server.join().unwrap().to_lowercase();
    assert!(seen.starts_with("post /console/v1/member_groups/1/advertisers/2/campaigns_report"));
    assert!(seen.contains("authorization: tok-123"));
    assert!(seen.contains("user-agent: koddi-healthcheck/"));
    assert!(seen.contains("content-type: application/json"));
    assert!(seen.contains(r#"{"pagination":{"start":0}}"#));
}

#[test]
fn test_non_2xx_is_still_a_response() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        read_request(&mut stream);
        stream
            .write_all(b"HTTP/1.1 503 Service Unavailable\r\nContent-Length: 4\r\nConnection: close\r\n\r\ndown")
            .unwrap();
    });

    let response = transport(Duration::from_secs(5))
        .send(&ApiRequest::get(format!("http://{}/health", addr)))
        .unwrap();
    server.join().unwrap();

    assert_eq!(response.status, 503);
    assert_eq!(response.body, "down");
}

#[test]
fn test_connection_refused_maps_to_connect() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };

    let err = transport(Duration::from_secs(5))
        .send(&ApiRequest::get(format!("http://{}/session/login", addr)))
        .unwrap_err();

    assert_eq!(
        err,
        TransportError::Connect {
            host: "127.0.0.1".to_string()
        }
    );
}

#[test]
fn test_stalled_server_maps_to_timeout() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    // Accept and hold the connection without ever answering
    let server = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        thread::sleep(Duration::from_secs(2));
        drop(stream);
    });

    let err = transport(Duration::from_millis(300))
        .send(&ApiRequest::get(format!("http://{}/slow", addr)))
        .unwrap_err();
    server.join().unwrap();

    assert_eq!(err, TransportError::Timeout);
}
