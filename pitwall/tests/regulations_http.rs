//! Integration tests for the regulations client against a scripted local
//! HTTP backend: success with citations, bounded retry on transient failures,
//! and immediate surfacing of permanent failures.


use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use pitwall::{RegulationsTool, RetryPolicy, ToolOutput};

async fn read_http_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut tmp = [0u8; 1024];
    loop {
        let n = stream.read(&mut tmp).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&tmp[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let header_end = pos + 4;
            let headers = String::from_utf8_lossy(&buf[..header_end]).to_string();
            let content_length = headers
                .lines()
                .find_map(|line| {
                    line.to_ascii_lowercase()
                        .strip_prefix("content-length:")
                        .and_then(|v| v.trim().parse::<usize>().ok())
                })
                .unwrap_or(0);
            let mut body = buf[header_end..].to_vec();
            while body.len() < content_length {
                let m = stream.read(&mut tmp).await.unwrap();
                if m == 0 {
                    break;
                }
                body.extend_from_slice(&tmp[..m]);
            }
            return String::from_utf8_lossy(&body[..content_length.min(body.len())]).to_string();
        }
    }
    String::new()
}

async fn write_http_response(stream: &mut TcpStream, status: &str, body: &str) {
    let resp = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nConnection: close\r\nContent-Length: {}\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    stream.write_all(resp.as_bytes()).await.unwrap();
}

/// Serves one scripted (status, body) per incoming request, counting hits.
async fn spawn_backend(
    script: Vec<(&'static str, String)>,
) -> (String, Arc<AtomicUsize>, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let handle = tokio::spawn(async move {
        for (status, body) in script {
            let (mut stream, _) = listener.accept().await.unwrap();
            let _ = read_http_request(&mut stream).await;
            counter.fetch_add(1, Ordering::SeqCst);
            write_http_response(&mut stream, status, &body).await;
        }
    });
    (format!("http://{}/rag", addr), hits, handle)
}

fn tool_for(endpoint: &str) -> RegulationsTool {
    RegulationsTool::new(endpoint, "test-key", "kb-1", "gen-1")
        .with_retry_policy(RetryPolicy::fixed(3, Duration::ZERO))
}

fn success_body() -> String {
    json!({
        "answerText": "First place scores 25 points.",
        "citations": [{
            "text": "25 points shall be awarded to the winner",
            "sourceLocation": {"uri": "sporting_regulations.pdf"},
            "metadata": {"article": "6.4"}
        }]
    })
    .to_string()
}

#[tokio::test]
async fn successful_query_returns_text_with_citations_and_latency() {
    let (endpoint, hits, server) = spawn_backend(vec![("200 OK", success_body())]).await;

    let out = tool_for(&endpoint).query("points for first place").await;

    match &out {
        ToolOutput::Text { content, metadata } => {
            assert!(content.contains("25 points"));
            assert_eq!(metadata["status"], "success");
            assert_eq!(metadata["model"], "gen-1");
            assert_eq!(metadata["num_results"], 5);
            assert_eq!(metadata["citations"].as_array().unwrap().len(), 1);
            assert!(metadata["latency_seconds"].is_number());
        }
        other => panic!("expected text output, got {:?}", other),
    }
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    server.await.unwrap();
}

#[tokio::test]
async fn transient_failures_exhaust_three_attempts_then_error() {
    let err = r#"{"error":"overloaded"}"#.to_string();
    let (endpoint, hits, server) = spawn_backend(vec![
        ("500 Internal Server Error", err.clone()),
        ("500 Internal Server Error", err.clone()),
        ("500 Internal Server Error", err),
    ])
    .await;

    let out = tool_for(&endpoint).query("what are the DRS rules").await;

    assert!(out.is_error());
    assert_eq!(out.metadata()["status"], "error");
    assert_eq!(out.metadata()["error_code"], "500");
    assert_eq!(out.metadata()["attempts"], 3);
    assert_eq!(hits.load(Ordering::SeqCst), 3);
    server.await.unwrap();
}

#[tokio::test]
async fn rate_limit_then_success_recovers_on_retry() {
    let (endpoint, hits, server) = spawn_backend(vec![
        ("429 Too Many Requests", r#"{"error":"slow down"}"#.to_string()),
        ("200 OK", success_body()),
    ])
    .await;

    let out = tool_for(&endpoint).query("points for first place").await;

    assert_eq!(out.status(), Some("success"));
    assert_eq!(hits.load(Ordering::SeqCst), 2);
    server.await.unwrap();
}

#[tokio::test]
async fn client_error_surfaces_immediately_without_retry() {
    let (endpoint, hits, server) = spawn_backend(vec![(
        "404 Not Found",
        r#"{"error":"unknown knowledge base"}"#.to_string(),
    )])
    .await;

    let out = tool_for(&endpoint).query("anything").await;

    assert!(out.is_error());
    assert_eq!(out.metadata()["error_code"], "404");
    assert_eq!(out.metadata()["attempts"], 1);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    server.await.unwrap();
}

#[tokio::test]
async fn unreachable_backend_is_a_transient_transport_error() {
    // Nothing listens here; connection refused on every attempt.
    let tool = RegulationsTool::new("http://127.0.0.1:1/rag", "k", "kb", "gen")
        .with_retry_policy(RetryPolicy::fixed(2, Duration::ZERO));

    let out = tool.query("anything").await;

    assert!(out.is_error());
    assert_eq!(out.metadata()["error_code"], "transport");
    assert_eq!(out.metadata()["attempts"], 2);
}
