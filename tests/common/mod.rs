//! Shared utilities for integration and load testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use predict_server::config::ServerConfig;
use predict_server::lifecycle::{self, Shutdown};

/// A server running on an ephemeral loopback port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
}

impl TestServer {
    pub fn stop(&self) {
        self.shutdown.trigger();
    }
}

/// Config bound to `127.0.0.1:0`; everything else at defaults.
pub fn local_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.listener.host = "127.0.0.1".into();
    config.listener.port = 0;
    config
}

/// Start the full service with `config` and return once it is accepting.
pub async fn spawn_server(config: ServerConfig) -> TestServer {
    let (server, listener) = lifecycle::start(config).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });
    TestServer { addr, shutdown }
}

/// Send `pieces` with a short pause between each, half-close, and read the
/// full response.
pub async fn send_pieces(addr: SocketAddr, pieces: &[&[u8]]) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    for piece in pieces {
        if stream.write_all(piece).await.is_err() {
            break;
        }
        let _ = stream.flush().await;
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    let _ = stream.shutdown().await;
    read_all(&mut stream).await
}

/// Send a whole request in one write.
pub async fn send(addr: SocketAddr, request: &[u8]) -> Vec<u8> {
    send_pieces(addr, &[request]).await
}

pub async fn read_all(stream: &mut TcpStream) -> Vec<u8> {
    let mut out = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut out))
        .await
        .expect("response within 5s")
        .unwrap();
    out
}

/// Read until `marker` has been seen, returning everything read so far.
pub async fn read_until(stream: &mut TcpStream, marker: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut buf = [0u8; 256];
    while !out.windows(marker.len()).any(|w| w == marker) {
        let n = tokio::time::timeout(Duration::from_secs(5), stream.read(&mut buf))
            .await
            .expect("data within 5s")
            .unwrap();
        assert!(n > 0, "connection closed before {:?}", String::from_utf8_lossy(marker));
        out.extend_from_slice(&buf[..n]);
    }
    out
}

/// A response split into status, headers and body.
#[derive(Debug)]
pub struct Parsed {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Parsed {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Parse exactly one serialized response; panics on trailing data.
pub fn parse_response(raw: &[u8]) -> Parsed {
    let end = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("complete response head");
    let head = std::str::from_utf8(&raw[..end]).unwrap();
    let mut lines = head.split("\r\n");
    let status_line = lines.next().unwrap();
    assert!(status_line.starts_with("HTTP/1.1 "), "status line {status_line:?}");
    let status = status_line[9..12].parse().unwrap();
    let headers: Vec<(String, String)> = lines
        .map(|line| {
            let (k, v) = line.split_once(':').unwrap();
            (k.trim().to_string(), v.trim().to_string())
        })
        .collect();

    let body = raw[end + 4..].to_vec();
    let parsed = Parsed { status, headers, body };
    let length: usize = parsed.header("Content-Length").unwrap().parse().unwrap();
    assert_eq!(length, parsed.body.len(), "exactly one response expected");
    parsed
}
