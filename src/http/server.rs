//! HTTP server: accept loop and per-connection handling.
//!
//! # Responsibilities
//! - Accept connections and spawn one task per connection
//! - Read the request head, answer `Expect: 100-continue`
//! - Read the body with the right framing strategy
//! - Dispatch through the router, write the response, close
//!
//! # Design Decisions
//! - One request per connection; the socket is always closed afterwards
//! - Protocol errors are answered with a 400 here and never reach handlers
//! - The header block is re-read until complete (bounded by `max_head_bytes`)
//! - No per-connection timeout: a stalled client holds its task until it goes away

use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::broadcast;
use tracing::Instrument;

use crate::config::{LimitsConfig, ServerConfig};
use crate::http::body::{BodyKind, BodyReader};
use crate::http::error::HttpError;
use crate::http::parser::{find_head_end, parse_head};
use crate::http::request::Method;
use crate::http::response::Response;
use crate::net::{ConnectionId, ConnectionLifecycle, ConnectionState, ConnectionTracker, Listener};
use crate::observability::metrics;
use crate::routing::Router;

/// Interim response sent when the client asked for `Expect: 100-continue`.
pub const CONTINUE_RESPONSE: &[u8] = b"HTTP/1.1 100 Continue\r\n\r\n";

const READ_CHUNK: usize = 8 * 1024;

/// How a connection ended, when it ended without an I/O failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionOutcome {
    /// A handler (or the router's 404/405) produced the response.
    Dispatched { status: u16 },
    /// The request was malformed and a 400 was written without dispatch.
    Rejected { status: u16 },
    /// The peer closed before sending anything.
    Empty,
}

/// HTTP server for the prediction service.
pub struct HttpServer {
    router: Arc<Router>,
    config: ServerConfig,
    tracker: ConnectionTracker,
}

impl HttpServer {
    /// Create a new server. The route table is frozen from here on.
    pub fn new(config: ServerConfig, router: Router) -> Self {
        tracing::debug!(routes = router.len(), "Route table built");
        Self {
            router: Arc::new(router),
            config,
            tracker: ConnectionTracker::new(),
        }
    }

    /// Handle to the live-connection counter, for draining on shutdown.
    pub fn tracker(&self) -> ConnectionTracker {
        self.tracker.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Accept connections until a shutdown signal arrives.
    ///
    /// In-flight connection tasks are not cancelled when this returns.
    pub async fn run(self, listener: Listener, mut shutdown: broadcast::Receiver<()>) -> std::io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!(active_connections = self.tracker.active_count(), "Accept loop stopping");
                    break;
                }
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, peer, permit)) => {
                            let router = Arc::clone(&self.router);
                            let limits = self.config.limits.clone();
                            let guard = self.tracker.track();
                            let span = tracing::debug_span!("connection", connection_id = %guard.id(), peer_addr = %peer);
                            tokio::spawn(
                                async move {
                                    let _permit = permit;
                                    handle_stream(stream, peer, guard.id(), &router, &limits).await;
                                    drop(guard);
                                }
                                .instrument(span),
                            );
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "Accept failed");
                            // Avoid spinning when the process is out of descriptors.
                            tokio::time::sleep(Duration::from_millis(10)).await;
                        }
                    }
                }
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn handle_stream(
    mut stream: tokio::net::TcpStream,
    peer: SocketAddr,
    id: ConnectionId,
    router: &Router,
    limits: &LimitsConfig,
) {
    match serve_connection(&mut stream, id, router, limits).await {
        Ok(outcome) => tracing::debug!(peer_addr = %peer, ?outcome, "Connection finished"),
        Err(e) => tracing::debug!(peer_addr = %peer, error = %e, "Connection aborted"),
    }
}

/// Run one request/response cycle on `stream`, then shut down its write side.
pub async fn serve_connection<S>(
    stream: &mut S,
    id: ConnectionId,
    router: &Router,
    limits: &LimitsConfig,
) -> Result<ConnectionOutcome, HttpError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let started = Instant::now();
    let mut conn = ConnectionLifecycle::new(id);

    let result = exchange(stream, &mut conn, router, limits, started).await;
    conn.advance(ConnectionState::Closed);
    let _ = stream.shutdown().await;
    result
}

async fn exchange<S>(
    stream: &mut S,
    conn: &mut ConnectionLifecycle,
    router: &Router,
    limits: &LimitsConfig,
    started: Instant,
) -> Result<ConnectionOutcome, HttpError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let buf = read_head(stream, limits.max_head_bytes).await?;
    if buf.is_empty() {
        return Ok(ConnectionOutcome::Empty);
    }

    let head = match parse_head(&buf) {
        Ok(head) => head,
        Err(e) => return reject(stream, conn.id(), e).await,
    };
    conn.advance(ConnectionState::HeadersRead);
    tracing::debug!(
        connection_id = %conn.id(),
        method = %head.method,
        path = %head.path,
        content_length = ?head.content_length,
        chunked = head.chunked,
        "Request head parsed"
    );

    if head.expect_continue {
        stream.write_all(CONTINUE_RESPONSE).await?;
        stream.flush().await?;
        conn.advance(ConnectionState::Continue);
    }

    conn.advance(ConnectionState::BodyReading);
    let kind = BodyKind::from_head(&head);
    let buffered = Cursor::new(buf[head.body_offset..].to_vec());
    let body = {
        let mut reader = BodyReader::new(buffered.chain(&mut *stream), limits.max_chunk_line_bytes);
        reader.read(kind).await
    };
    let body = match body {
        Ok(body) => body,
        Err(e) => return reject(stream, conn.id(), e).await,
    };

    conn.advance(ConnectionState::Dispatching);
    let response = router.dispatch(&head.method, &head.path, body);
    let status = response.status();

    write_response(stream, &response).await?;
    conn.advance(ConnectionState::ResponseSent);

    let method_label = head.method.parse::<Method>().map_or("OTHER", |m| m.as_str());
    metrics::record_request(method_label, status, started);
    tracing::info!(
        connection_id = %conn.id(),
        method = %head.method,
        path = %head.path,
        status,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Request handled"
    );

    Ok(ConnectionOutcome::Dispatched { status })
}

/// Read until the header block is complete, the peer closes, or `limit` is reached.
async fn read_head<S>(stream: &mut S, limit: usize) -> Result<Vec<u8>, HttpError>
where
    S: AsyncRead + Unpin,
{
    let mut buf = Vec::with_capacity(READ_CHUNK.min(limit));
    let mut chunk = [0u8; READ_CHUNK];
    // Only the newly read tail (plus 3 bytes of overlap) needs scanning.
    let mut scanned = 0;

    while buf.len() < limit {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if find_head_end(&buf[scanned..]).is_some() {
            break;
        }
        scanned = buf.len().saturating_sub(3);
    }

    if !buf.is_empty() && find_head_end(&buf).is_none() {
        tracing::debug!(bytes = buf.len(), "Request head incomplete; parsing what arrived");
    }
    Ok(buf)
}

async fn write_response<S>(stream: &mut S, response: &Response) -> Result<(), HttpError>
where
    S: AsyncWrite + Unpin,
{
    stream.write_all(&response.to_bytes()).await?;
    stream.flush().await?;
    Ok(())
}

/// Answer a protocol error with its 400 response, or give up on I/O errors.
async fn reject<S>(stream: &mut S, id: ConnectionId, err: HttpError) -> Result<ConnectionOutcome, HttpError>
where
    S: AsyncWrite + Unpin,
{
    let Some(response) = err.to_response() else {
        return Err(err);
    };
    tracing::warn!(connection_id = %id, reason = err.reason(), error = %err, "Rejecting request");
    metrics::record_rejected(err.reason());
    write_response(stream, &response).await?;
    Ok(ConnectionOutcome::Rejected {
        status: response.status(),
    })
}
