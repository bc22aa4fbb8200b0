//! Minimal HTTP/1.1 framing on top of tokio streams.
//!
//! One request per connection: the request head and a `Content-Length`
//! delimited body are read, one response is written, and the connection is
//! closed. Chunked request bodies are not accepted.

use http::header::{HeaderName, HeaderValue, CONNECTION, CONTENT_LENGTH, CONTENT_TYPE, ORIGIN};
use http::{Method, Request, Response, StatusCode};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

pub const MAX_BODY_BYTES: usize = 64 * 1024;
const MAX_HEAD_BYTES: usize = 16 * 1024;

/// An error that is reported to the client as a JSON `{"detail": ...}` body.
#[derive(Debug, Error)]
#[error("{status}: {detail}")]
pub struct HttpError {
    pub status: StatusCode,
    pub detail: serde_json::Value,
}

impl HttpError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        HttpError {
            status,
            detail: serde_json::Value::String(detail.into()),
        }
    }

    pub fn with_detail(status: StatusCode, detail: serde_json::Value) -> Self {
        HttpError { status, detail }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        HttpError::new(StatusCode::BAD_REQUEST, detail)
    }

    pub fn into_response(self) -> Response<Vec<u8>> {
        json_response(self.status, &json!({ "detail": self.detail }))
    }
}

/// Build a JSON response. Serialization failures become a bare 500.
pub fn json_response<T: Serialize + ?Sized>(status: StatusCode, body: &T) -> Response<Vec<u8>> {
    match serde_json::to_vec(body) {
        Ok(bytes) => {
            let mut response = Response::new(bytes);
            *response.status_mut() = status;
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            response
        }
        Err(err) => {
            tracing::error!(?err, "failed to serialize response body");
            let mut response = Response::new(b"Internal Server Error".to_vec());
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            response
        }
    }
}

pub fn empty_response(status: StatusCode) -> Response<Vec<u8>> {
    let mut response = Response::new(Vec::new());
    *response.status_mut() = status;
    response
}

/// Read one request from `stream`.
///
/// `origin` receives the `Origin` header as soon as it is parsed, so a
/// request rejected later (or timed out) can still be answered with CORS
/// headers.
pub async fn read_request<S>(
    stream: &mut S,
    origin: &mut Option<HeaderValue>,
) -> Result<Request<Vec<u8>>, HttpError>
where
    S: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut head_bytes = 0usize;

    let request_line = read_head_line(&mut reader, &mut head_bytes).await?;
    let mut parts = request_line.split_whitespace();
    let (method, target, version) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(m), Some(t), Some(v), None) => (m, t, v),
        _ => return Err(HttpError::bad_request("Malformed request line")),
    };
    if !version.starts_with("HTTP/1.") {
        return Err(HttpError::new(
            StatusCode::HTTP_VERSION_NOT_SUPPORTED,
            "Only HTTP/1.x is supported",
        ));
    }
    let method = Method::from_bytes(method.as_bytes())
        .map_err(|_| HttpError::bad_request("Invalid method"))?;

    let mut builder = Request::builder().method(method).uri(target);
    let mut content_length = 0usize;

    loop {
        let line = read_head_line(&mut reader, &mut head_bytes).await?;
        if line.is_empty() {
            break;
        }
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| HttpError::bad_request("Malformed header line"))?;
        let name = HeaderName::from_bytes(name.trim().as_bytes())
            .map_err(|_| HttpError::bad_request("Invalid header name"))?;
        let value = HeaderValue::from_str(value.trim())
            .map_err(|_| HttpError::bad_request("Invalid header value"))?;
        if name == ORIGIN {
            *origin = Some(value.clone());
        }

        if name == CONTENT_LENGTH {
            content_length = value
                .to_str()
                .ok()
                .and_then(|v| v.parse().ok())
                .ok_or_else(|| HttpError::bad_request("Invalid Content-Length"))?;
        } else if name == http::header::TRANSFER_ENCODING {
            return Err(HttpError::new(
                StatusCode::LENGTH_REQUIRED,
                "Chunked request bodies are not supported",
            ));
        }
        builder = builder.header(name, value);
    }

    if content_length > MAX_BODY_BYTES {
        return Err(HttpError::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            format!("Request body exceeds {} bytes", MAX_BODY_BYTES),
        ));
    }

    let mut body = vec![0u8; content_length];
    reader
        .read_exact(&mut body)
        .await
        .map_err(|_| HttpError::bad_request("Request body shorter than Content-Length"))?;

    builder
        .body(body)
        .map_err(|e| HttpError::bad_request(format!("Invalid request: {}", e)))
}

async fn read_head_line<R>(reader: &mut R, head_bytes: &mut usize) -> Result<String, HttpError>
where
    R: AsyncBufRead + Unpin,
{
    // Never buffer more than one byte past the head limit
    let limit = (MAX_HEAD_BYTES + 1).saturating_sub(*head_bytes) as u64;
    let mut line = Vec::new();
    let mut limited = (&mut *reader).take(limit);
    let n = limited
        .read_until(b'\n', &mut line)
        .await
        .map_err(|_| HttpError::bad_request("Failed to read request head"))?;
    if n == 0 {
        return Err(HttpError::bad_request("Connection closed before request head was complete"));
    }
    *head_bytes += n;
    if *head_bytes > MAX_HEAD_BYTES {
        return Err(HttpError::new(
            StatusCode::REQUEST_HEADER_FIELDS_TOO_LARGE,
            "Request head too large",
        ));
    }
    let line = String::from_utf8(line)
        .map_err(|_| HttpError::bad_request("Request head is not valid UTF-8"))?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Write `response` with `Content-Length` and `Connection: close`.
pub async fn write_response<S>(stream: &mut S, response: Response<Vec<u8>>) -> std::io::Result<()>
where
    S: AsyncWrite + Unpin,
{
    let (parts, body) = response.into_parts();
    let mut head = format!(
        "HTTP/1.1 {} {}\r\n",
        parts.status.as_u16(),
        parts.status.canonical_reason().unwrap_or("")
    );
    for (name, value) in parts.headers.iter() {
        if name == CONTENT_LENGTH || name == CONNECTION {
            continue;
        }
        head.push_str(name.as_str());
        head.push_str(": ");
        head.push_str(&String::from_utf8_lossy(value.as_bytes()));
        head.push_str("\r\n");
    }
    head.push_str(&format!("content-length: {}\r\nconnection: close\r\n\r\n", body.len()));

    stream.write_all(head.as_bytes()).await?;
    stream.write_all(&body).await?;
    stream.flush().await
}
