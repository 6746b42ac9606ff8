//! Web server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use crate::auth::SessionManager;
use crate::web::middleware::LoginRateLimiter;
use crate::{IntakeError, Result};

use super::handlers::AppState;
use super::router::create_router;

/// Interval of the login limiter cleanup task.
const LIMITER_CLEANUP_INTERVAL_SECS: u64 = 300;

/// HTTP server for the intake site.
pub struct WebServer {
    addr: SocketAddr,
    state: Arc<AppState>,
}

impl WebServer {
    /// Create a server bound to `server.host:server.port`.
    pub fn new(state: AppState) -> Result<Self> {
        let addr = format!("{}:{}", state.config.server.host, state.config.server.port)
            .parse()
            .map_err(|e| IntakeError::Config(format!("invalid server address: {e}")))?;

        Ok(Self {
            addr,
            state: Arc::new(state),
        })
    }

    /// Get the configured address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Periodically delete expired sessions.
    fn start_session_prune_task(sessions: SessionManager, interval_secs: u64) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

            // Skip the first immediate tick
            interval.tick().await;

            loop {
                interval.tick().await;
                match sessions.prune_expired().await {
                    Ok(0) => tracing::debug!("No expired sessions to prune"),
                    Ok(count) => tracing::info!(deleted_count = count, "Pruned expired sessions"),
                    Err(e) => tracing::warn!(error = %e, "Failed to prune sessions"),
                }
            }
        });
    }

    /// Periodically forget idle login limiter entries.
    fn start_limiter_cleanup_task(limiter: Arc<LoginRateLimiter>) {
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(Duration::from_secs(LIMITER_CLEANUP_INTERVAL_SECS));
            interval.tick().await;
            loop {
                interval.tick().await;
                limiter.cleanup();
            }
        });
    }

    async fn bind(self) -> std::io::Result<(TcpListener, axum::Router)> {
        let listener = TcpListener::bind(self.addr).await?;

        let prune_interval = self.state.config.session.prune_interval_secs;
        if prune_interval > 0 {
            Self::start_session_prune_task(self.state.sessions.clone(), prune_interval);
            tracing::info!(interval_secs = prune_interval, "Session prune task started");
        }
        Self::start_limiter_cleanup_task(self.state.login_limiter.clone());

        Ok((listener, create_router(self.state)))
    }

    /// Run the server until it fails.
    pub async fn run(self) -> std::io::Result<()> {
        let (listener, router) = self.bind().await?;
        tracing::info!("Web server listening on http://{}", listener.local_addr()?);

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
    }

    /// Start the server in the background and return the bound address.
    ///
    /// Bind to port 0 to get a free port.
    pub async fn run_with_addr(self) -> std::io::Result<SocketAddr> {
        let (listener, router) = self.bind().await?;
        let local_addr = listener.local_addr()?;
        tracing::info!("Web server listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::web::handlers::Stores;
    use crate::Database;
    use tempfile::TempDir;

    fn config(temp: &TempDir) -> Config {
        let mut config = Config::default();
        config.server.port = 0;
        config.storage.path = temp.path().join("files").to_string_lossy().into_owned();
        config.storage.signing_secret = "0123456789abcdef0123456789abcdef".to_string();
        config
    }

    #[tokio::test]
    async fn test_web_server_new() {
        let temp = TempDir::new().unwrap();
        let config = config(&temp);
        let db = Database::open_in_memory().await.unwrap();
        let state = AppState::from_database(config, &db).unwrap();

        let server = WebServer::new(state).unwrap();
        assert_eq!(server.addr().ip().to_string(), "127.0.0.1");
    }

    #[tokio::test]
    async fn test_invalid_host_is_config_error() {
        let temp = TempDir::new().unwrap();
        let mut config = config(&temp);
        config.server.host = "not a host".to_string();
        let db = Database::open_in_memory().await.unwrap();
        let signer =
            crate::file::UrlSigner::new(config.storage.signing_secret.as_bytes()).unwrap();
        let stores = Stores::persistent(&db, &config, signer).unwrap();
        let state = AppState::new(config, stores).unwrap();

        assert!(matches!(WebServer::new(state), Err(IntakeError::Config(_))));
    }

    /// Body of a raw HTTP/1.1 response, decoding chunked transfer encoding.
    fn response_body(response: &str) -> String {
        let (head, body) = response.split_once("\r\n\r\n").unwrap();
        if !head.to_ascii_lowercase().contains("transfer-encoding: chunked") {
            return body.to_string();
        }

        let mut decoded = String::new();
        let mut rest = body;
        loop {
            let (size, tail) = rest.split_once("\r\n").unwrap();
            let size = usize::from_str_radix(size.trim(), 16).unwrap();
            if size == 0 {
                return decoded;
            }
            decoded.push_str(&tail[..size]);
            rest = &tail[size + 2..];
        }
    }

    #[test]
    fn test_response_body_decodes_chunks() {
        let chunked = "HTTP/1.1 200 OK\r\ntransfer-encoding: chunked\r\n\r\n2\r\nOK\r\n0\r\n\r\n";
        assert_eq!(response_body(chunked), "OK");

        let plain = "HTTP/1.1 200 OK\r\ncontent-length: 2\r\n\r\nOK";
        assert_eq!(response_body(plain), "OK");
    }

    #[tokio::test]
    async fn test_web_server_serves_health() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let temp = TempDir::new().unwrap();
        let config = config(&temp);
        let db = Database::open_in_memory().await.unwrap();
        let state = AppState::from_database(config, &db).unwrap();

        let addr = WebServer::new(state).unwrap().run_with_addr().await.unwrap();

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        assert!(response.starts_with("HTTP/1.1 200"));
        assert_eq!(response_body(&response), "OK");
    }
}
