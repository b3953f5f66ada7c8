//! Minimal HTTP front door over a [`ChatResponder`].
//!
//! Routes:
//! - `GET  /api/health`   liveness probe
//! - `GET  /api/metrics`  [`MetricsReport`] as JSON
//! - `POST /api/classify` `{"message": ".."}` → cached answer or miss
//! - `POST /api/chat`     `{"conversationId": "..", "message": ".."}` → [`Reply`]
//!
//! One request per connection (`Connection: close`).

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use crate::error::{Result, TutorError};
use crate::report::{MetricsReport, DEFAULT_SLOW_LIMIT};
use crate::responder::{ChatRequest, ChatResponder, Generator, Reply};

/// Requests larger than this are rejected with 413.
pub const MAX_REQUEST_BYTES: usize = 64 * 1024;

/// Time a client gets to deliver a complete request before 408.
pub const REQUEST_READ_TIMEOUT: Duration = Duration::from_secs(10);

const MAX_HEADERS: usize = 32;

/// A fully received HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRequest {
    pub method: String,
    /// Path without the query string.
    pub path: String,
    pub body: Vec<u8>,
}

/// Status code plus JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Value,
}

impl HttpResponse {
    fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": message.into() }),
        }
    }

    fn reason(&self) -> &'static str {
        match self.status {
            200 => "OK",
            400 => "Bad Request",
            404 => "Not Found",
            405 => "Method Not Allowed",
            408 => "Request Timeout",
            413 => "Payload Too Large",
            502 => "Bad Gateway",
            503 => "Service Unavailable",
            _ => "Internal Server Error",
        }
    }

    /// Serialize as an HTTP/1.1 response.
    pub fn to_bytes(&self) -> Vec<u8> {
        let body = self.body.to_string();
        format!(
            "HTTP/1.1 {} {}\r\nContent-Type: application/json; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            self.status,
            self.reason(),
            body.len(),
            body,
        )
        .into_bytes()
    }
}

/// Parse `buf` as an HTTP request.
///
/// Returns `Ok(None)` while the head or the `Content-Length` body is still
/// incomplete.
pub fn parse_request(buf: &[u8]) -> Result<Option<ParsedRequest>> {
    let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut req = httparse::Request::new(&mut headers);

    let head_len = match req.parse(buf) {
        Ok(httparse::Status::Complete(n)) => n,
        Ok(httparse::Status::Partial) => return Ok(None),
        Err(e) => return Err(TutorError::Http(e.to_string())),
    };

    let content_length = match req
        .headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case("content-length"))
    {
        Some(h) => std::str::from_utf8(h.value)
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .ok_or_else(|| TutorError::Http("invalid Content-Length".into()))?,
        None => 0,
    };
    if content_length > MAX_REQUEST_BYTES {
        return Err(TutorError::RequestTooLarge {
            declared: content_length,
            limit: MAX_REQUEST_BYTES,
        });
    }

    let Some(body) = buf.get(head_len..head_len + content_length) else {
        return Ok(None);
    };

    let method = req.method.unwrap_or_default().to_string();
    let raw_path = req.path.unwrap_or("/");
    let path = raw_path.split('?').next().unwrap_or(raw_path).to_string();

    Ok(Some(ParsedRequest {
        method,
        path,
        body: body.to_vec(),
    }))
}

#[derive(Debug, Deserialize)]
struct ClassifyBody {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatBody {
    #[serde(default)]
    conversation_id: String,
    #[serde(default)]
    message: String,
}

/// Dispatch one request.
pub async fn route<G: Generator>(req: &ParsedRequest, responder: &ChatResponder<G>) -> HttpResponse {
    match (req.method.as_str(), req.path.as_str()) {
        ("GET", "/api/health") => HttpResponse::ok(json!({
            "status": "ok",
            "timestamp": chrono::Utc::now().to_rfc3339(),
        })),
        ("GET", "/api/metrics") => {
            let report = MetricsReport::collect(responder.tracker(), responder.response_times(), DEFAULT_SLOW_LIMIT);
            match report.to_json() {
                Ok(body) => HttpResponse::ok(body),
                Err(e) => HttpResponse::error(500, e.to_string()),
            }
        }
        ("POST", "/api/classify") => {
            let body: ClassifyBody = match serde_json::from_slice(&req.body) {
                Ok(b) => b,
                Err(e) => return HttpResponse::error(400, format!("invalid body: {e}")),
            };
            match responder.check_cache(&body.message) {
                Some(hit) => HttpResponse::ok(json!({
                    "response": hit.response,
                    "cached": true,
                    "kind": hit.kind,
                    "rule": hit.rule,
                })),
                None => HttpResponse::ok(json!({ "response": null, "cached": false })),
            }
        }
        ("POST", "/api/chat") => {
            let body: ChatBody = match serde_json::from_slice(&req.body) {
                Ok(b) => b,
                Err(e) => return HttpResponse::error(400, format!("invalid body: {e}")),
            };
            if body.message.is_empty() || body.conversation_id.is_empty() {
                return HttpResponse::error(400, "Missing required fields");
            }
            let request = ChatRequest::new(body.conversation_id, body.message);
            match responder.respond(&request).await {
                Ok(reply) => reply_response(&reply),
                Err(e) => HttpResponse::error(502, e.to_string()),
            }
        }
        (_, "/api/health" | "/api/metrics" | "/api/classify" | "/api/chat") => {
            HttpResponse::error(405, "method not allowed")
        }
        _ => HttpResponse::error(404, "not found"),
    }
}

fn reply_response(reply: &Reply) -> HttpResponse {
    match serde_json::to_value(reply) {
        Ok(body) => HttpResponse::ok(body),
        Err(e) => HttpResponse::error(500, e.to_string()),
    }
}

/// Read one request off `stream`; `Ok(None)` if the peer hangs up first.
async fn read_request(stream: &mut TcpStream) -> Result<Option<ParsedRequest>> {
    let mut buf = Vec::with_capacity(4096);
    let mut chunk = [0u8; 4096];

    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(None);
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(req) = parse_request(&buf)? {
            return Ok(Some(req));
        }
        if buf.len() > MAX_REQUEST_BYTES {
            return Err(TutorError::RequestTooLarge {
                declared: buf.len(),
                limit: MAX_REQUEST_BYTES,
            });
        }
    }
}

/// Read, route and answer one connection.
pub async fn handle_connection<G: Generator>(stream: TcpStream, responder: &ChatResponder<G>) -> Result<()> {
    handle_connection_within(stream, responder, REQUEST_READ_TIMEOUT).await
}

/// [`handle_connection`] with an explicit deadline for receiving the request.
pub async fn handle_connection_within<G: Generator>(
    mut stream: TcpStream,
    responder: &ChatResponder<G>,
    read_timeout: Duration,
) -> Result<()> {
    let response = match tokio::time::timeout(read_timeout, read_request(&mut stream)).await {
        Err(_) => {
            debug!(timeout_ms = read_timeout.as_millis() as u64, "request read timed out");
            HttpResponse::error(408, "request timeout")
        }
        Ok(Ok(None)) => return Ok(()),
        Ok(Ok(Some(req))) => {
            debug!(method = %req.method, path = %req.path, "request");
            route(&req, responder).await
        }
        Ok(Err(e @ TutorError::RequestTooLarge { .. })) => HttpResponse::error(413, e.to_string()),
        Ok(Err(TutorError::Io(e))) => return Err(e.into()),
        Ok(Err(e)) => HttpResponse::error(400, e.to_string()),
    };

    stream.write_all(&response.to_bytes()).await?;
    stream.shutdown().await?;
    Ok(())
}

/// Accept connections on `listener` until the task is dropped.
pub async fn serve_listener<G>(listener: TcpListener, responder: Arc<ChatResponder<G>>) -> Result<()>
where
    G: Generator + 'static,
{
    loop {
        let (stream, addr) = listener.accept().await?;
        let responder = Arc::clone(&responder);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, &responder).await {
                warn!(error = %e, peer = %addr, "connection error");
            }
        });
    }
}

/// Bind `addr` and serve forever.
pub async fn serve<G>(addr: &str, responder: Arc<ChatResponder<G>>) -> Result<()>
where
    G: Generator + 'static,
{
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "tutor-cache listening");
    serve_listener(listener, responder).await
}
