//! Just enough HTTP/1.1 for the playground: one request per connection,
//! `Content-Length` bodies only and JSON responses with permissive CORS headers.

use crate::error::{PlaygroundError, Result};
use crate::service::ErrorResponse;
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub const MAX_HEADER_BYTES: usize = 16 * 1024;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
    Options,
    Other(String),
}

impl Method {
    fn parse(raw: &str) -> Self {
        match raw {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "DELETE" => Self::Delete,
            "OPTIONS" => Self::Options,
            other => Self::Other(other.to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    /// Path without the query string.
    pub path: String,
    pub body: Vec<u8>,
}

/// Reads one request head and its body.
///
/// Returns `Ok(None)` when the peer closes the connection before sending
/// anything. Each head line is read through a cap of the remaining
/// [`MAX_HEADER_BYTES`], so a peer cannot grow the buffer without bound.
///
/// # Errors
/// `Configuration` for a malformed or oversized head, a `Transfer-Encoding`
/// body or a body over `max_body` bytes, `Io` when the stream fails.
pub async fn read_request<S>(stream: &mut S, max_body: usize) -> Result<Option<Request>>
where
    S: AsyncBufRead + Unpin,
{
    let Some(line) = read_head_line(stream, MAX_HEADER_BYTES).await? else {
        return Ok(None);
    };
    let mut parts = line.split_whitespace();
    let (Some(method), Some(target), Some(version)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(malformed("request line"));
    };
    if !version.starts_with("HTTP/1.") {
        return Err(malformed("HTTP version"));
    }
    let method = Method::parse(method);
    let path = target.split('?').next().unwrap_or(target).to_string();

    let mut content_length = 0usize;
    let mut head_bytes = line.len();
    loop {
        let budget = MAX_HEADER_BYTES.saturating_sub(head_bytes);
        if budget == 0 {
            return Err(malformed("headers (too large)"));
        }
        let Some(line) = read_head_line(stream, budget).await? else {
            return Err(malformed("headers"));
        };
        head_bytes += line.len();
        let header = line.trim_end_matches(['\r', '\n']);
        if header.is_empty() {
            break;
        }
        let Some((name, value)) = header.split_once(':') else {
            return Err(malformed("header line"));
        };
        let name = name.trim();
        if name.eq_ignore_ascii_case("transfer-encoding") {
            return Err(PlaygroundError::Configuration(format!(
                "Transfer-Encoding '{}' is not supported, send a Content-Length body",
                value.trim()
            )));
        }
        if name.eq_ignore_ascii_case("content-length") {
            content_length = value
                .trim()
                .parse()
                .map_err(|_| malformed("Content-Length"))?;
        }
    }

    if content_length > max_body {
        return Err(PlaygroundError::Configuration(format!(
            "request body of {content_length} bytes exceeds the {max_body} byte limit"
        )));
    }
    let mut body = vec![0u8; content_length];
    stream.read_exact(&mut body).await?;

    Ok(Some(Request { method, path, body }))
}

/// Reads up to and including the next `\n`, never buffering more than `limit` bytes.
async fn read_head_line<S>(stream: &mut S, limit: usize) -> Result<Option<String>>
where
    S: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let n = (&mut *stream)
        .take(limit as u64)
        .read_until(b'\n', &mut buf)
        .await?;
    if n == 0 {
        return Ok(None);
    }
    if buf.last() != Some(&b'\n') {
        return Err(if n >= limit {
            malformed("headers (too large)")
        } else {
            malformed("headers")
        });
    }
    String::from_utf8(buf)
        .map(Some)
        .map_err(|_| malformed("head encoding"))
}

fn malformed(what: &str) -> PlaygroundError {
    PlaygroundError::Configuration(format!("malformed HTTP {what}"))
}

/// The playground's endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Points,
    AddPoint,
    DeletePoint(u64),
    DeleteLastPoint,
    ResetPoints,
    UpdateNoise,
    TrainModel,
    Preflight,
}

impl Route {
    /// `Ok(None)` for an unknown method/path pair.
    ///
    /// # Errors
    /// `Configuration` when `/delete_point/:id` carries a non-numeric id.
    pub fn resolve(method: &Method, path: &str) -> Result<Option<Self>> {
        let path = path.trim_end_matches('/');
        let route = match (method, path) {
            (Method::Options, _) => Self::Preflight,
            (Method::Get, "/points") => Self::Points,
            (Method::Post, "/add_point") => Self::AddPoint,
            (Method::Delete, "/delete_last_point") => Self::DeleteLastPoint,
            (Method::Post, "/reset_points") => Self::ResetPoints,
            (Method::Post, "/update_noise") => Self::UpdateNoise,
            (Method::Post, "/train_model") => Self::TrainModel,
            (Method::Delete, p) if p.starts_with("/delete_point/") => {
                let raw = &p["/delete_point/".len()..];
                let id = raw.parse().map_err(|_| {
                    PlaygroundError::Configuration(format!("point id '{raw}' is not a number"))
                })?;
                Self::DeletePoint(id)
            }
            _ => return Ok(None),
        };
        Ok(Some(route))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Response {
    pub fn json<T: Serialize>(status: u16, value: &T) -> Result<Self> {
        Ok(Self {
            status,
            body: serde_json::to_vec(value)?,
        })
    }

    pub fn no_content() -> Self {
        Self {
            status: 204,
            body: Vec::new(),
        }
    }

    pub fn error(err: &PlaygroundError) -> Self {
        Self::error_body(err.status_code(), &ErrorResponse::from(err))
    }

    pub fn route_not_found(path: &str) -> Self {
        Self::error_body(
            404,
            &ErrorResponse {
                error: "route_not_found".to_string(),
                message: format!("no route for {path}"),
            },
        )
    }

    /// The peer did not deliver a complete request in time.
    pub fn request_timeout() -> Self {
        Self::error_body(
            408,
            &ErrorResponse {
                error: "request_timeout".to_string(),
                message: "request was not received in time".to_string(),
            },
        )
    }

    fn error_body(status: u16, body: &ErrorResponse) -> Self {
        Self {
            status,
            body: serde_json::to_vec(body).unwrap_or_default(),
        }
    }

    pub async fn write_to<W: AsyncWrite + Unpin>(&self, out: &mut W) -> std::io::Result<()> {
        let mut head = format!("HTTP/1.1 {} {}\r\n", self.status, reason(self.status));
        if !self.body.is_empty() {
            head.push_str("Content-Type: application/json\r\n");
        }
        head.push_str(&format!("Content-Length: {}\r\n", self.body.len()));
        head.push_str("Access-Control-Allow-Origin: *\r\n");
        head.push_str("Access-Control-Allow-Methods: GET, POST, DELETE, OPTIONS\r\n");
        head.push_str("Access-Control-Allow-Headers: Content-Type\r\n");
        head.push_str("Connection: close\r\n\r\n");
        out.write_all(head.as_bytes()).await?;
        out.write_all(&self.body).await?;
        out.flush().await
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        204 => "No Content",
        400 => "Bad Request",
        404 => "Not Found",
        408 => "Request Timeout",
        422 => "Unprocessable Entity",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "",
    }
}
