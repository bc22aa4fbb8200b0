pub mod codec;
pub mod cors;
pub mod routes;

pub use cors::CorsPolicy;

use anyhow::{Context, Result};
use http::HeaderValue;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use crate::config::{Config, ModelConfig};
use self::codec::{read_request, write_response, HttpError};

/// Immutable settings shared by every connection.
#[derive(Debug, Clone)]
pub struct AppState {
    pub model: ModelConfig,
    pub cors: CorsPolicy,
    pub read_timeout: Duration,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self> {
        let read_timeout = humantime::parse_duration(&config.server.read_timeout)
            .with_context(|| format!("Invalid server.read_timeout '{}'", config.server.read_timeout))?;
        Ok(AppState {
            model: config.model.clone(),
            cors: CorsPolicy::from_config(&config.server.cors),
            read_timeout,
        })
    }
}

/// Accept connections until `shutdown` resolves.
///
/// Each connection is served on its own task; a failing connection is logged
/// and never takes the listener down.
pub async fn run<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("shutting down");
                return Ok(());
            }
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(conn) => conn,
                    Err(err) => {
                        warn!(?err, "accept failed");
                        continue;
                    }
                };
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    if let Err(err) = handle_connection(stream, &state).await {
                        debug!(%peer, ?err, "connection ended with error");
                    }
                });
            }
        }
    }
}

async fn handle_connection(mut stream: TcpStream, state: &AppState) -> Result<()> {
    let started = Instant::now();
    let mut origin = None;

    let read = tokio::time::timeout(state.read_timeout, read_request(&mut stream, &mut origin)).await;
    let request = match read {
        Ok(Ok(request)) => request,
        Ok(Err(err)) => {
            debug!(status = err.status.as_u16(), detail = %err.detail, "rejected request");
            return reject(&mut stream, state, origin.as_ref(), err).await;
        }
        Err(_) => {
            let err = HttpError::new(http::StatusCode::REQUEST_TIMEOUT, "Request Timeout");
            return reject(&mut stream, state, origin.as_ref(), err).await;
        }
    };

    let mut response = routes::handle(&request, state);
    state.cors.apply(&request, &mut response);

    info!(
        method = %request.method(),
        path = request.uri().path(),
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );

    write_response(&mut stream, response).await?;
    Ok(())
}

async fn reject(
    stream: &mut TcpStream,
    state: &AppState,
    origin: Option<&HeaderValue>,
    err: HttpError,
) -> Result<()> {
    let mut response = err.into_response();
    if let Some(origin) = origin {
        state.cors.grant(origin, &mut response);
    }
    write_response(stream, response).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    async fn spawn(read_timeout: Duration) -> std::net::SocketAddr {
        let mut state = AppState::from_config(&Config::default()).unwrap();
        state.read_timeout = read_timeout;
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(run(listener, Arc::new(state), std::future::pending()));
        addr
    }

    async fn exchange(addr: std::net::SocketAddr, raw: &[u8]) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(raw).await.unwrap();
        let mut out = String::new();
        stream.read_to_string(&mut out).await.unwrap();
        out
    }

    #[tokio::test]
    async fn test_partial_head_times_out() {
        let addr = spawn(Duration::from_millis(100)).await;
        let out = exchange(addr, b"GET /health HTTP/1.1\r\nOrigin: http://localhost:3000\r\n").await;
        assert!(out.starts_with("HTTP/1.1 408 Request Timeout\r\n"));
        assert!(out.contains("access-control-allow-origin: http://localhost:3000\r\n"));
        assert!(out.ends_with("{\"detail\":\"Request Timeout\"}"));
    }

    #[tokio::test]
    async fn test_rejected_request_keeps_cors_grant() {
        let addr = spawn(Duration::from_secs(5)).await;
        let raw = b"POST /api/v1/score HTTP/1.1\r\nOrigin: http://localhost:3000\r\nTransfer-Encoding: chunked\r\n\r\n";
        let out = exchange(addr, raw).await;
        assert!(out.starts_with("HTTP/1.1 411 Length Required\r\n"));
        assert!(out.contains("access-control-allow-origin: http://localhost:3000\r\n"));
        assert!(out.contains("access-control-allow-credentials: true\r\n"));
    }

    #[tokio::test]
    async fn test_complete_request_served() {
        let addr = spawn(Duration::from_secs(5)).await;
        let out = exchange(addr, b"GET /health HTTP/1.1\r\nHost: x\r\n\r\n").await;
        assert!(out.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(out.contains("\"status\":\"healthy\""));
    }
}
