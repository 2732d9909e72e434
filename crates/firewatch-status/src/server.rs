//! [`StatusServer`] – minimal HTTP liveness endpoint.
//!
//! Listens on `0.0.0.0:8000` (configurable via [`StatusServer::with_port`])
//! and answers every request with a fixed JSON "running" message. No
//! routing, no TLS, no keep-alive — one response per connection.

use std::net::SocketAddr;

use firewatch_types::FirewatchError;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info, warn};

/// Default TCP port for the status endpoint.
pub const DEFAULT_PORT: u16 = 8000;

/// Minimal HTTP server confirming the collector process is alive.
///
/// # Example
///
/// ```rust,no_run
/// use firewatch_status::StatusServer;
///
/// #[tokio::main]
/// async fn main() {
///     StatusServer::new()
///         .with_port(8000)
///         .run()
///         .await
///         .expect("status server failed");
/// }
/// ```
pub struct StatusServer {
    port: u16,
}

impl Default for StatusServer {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusServer {
    /// Create a server on the [`DEFAULT_PORT`].
    pub fn new() -> Self {
        Self { port: DEFAULT_PORT }
    }

    /// Override the listening port (builder-style).
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Return the configured port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Start serving.
    ///
    /// # Errors
    ///
    /// Returns [`FirewatchError::Status`] when the TCP listener cannot
    /// bind; per-connection errors are logged and never fatal.
    pub async fn run(self) -> Result<(), FirewatchError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| FirewatchError::Status(format!("bind error on {addr}: {e}")))?;

        info!(port = self.port, "status endpoint listening");

        loop {
            match listener.accept().await {
                Ok((stream, peer)) => {
                    tokio::spawn(async move {
                        if let Err(e) = serve_status(stream).await {
                            warn!(peer = %peer, error = %e, "status response failed");
                        }
                    });
                }
                Err(e) => error!(error = %e, "status accept error"),
            }
        }
    }
}

/// Read (and discard) the request head, answer, close.
async fn serve_status(mut stream: TcpStream) -> std::io::Result<()> {
    let mut buf = [0u8; 1024];
    let _ = stream.read(&mut buf).await?;

    let response = render_response();
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

/// Build the full HTTP response, headers included.
fn render_response() -> String {
    let body = serde_json::json!({ "message": "firewatch collector is running" }).to_string();
    format!(
        "HTTP/1.1 200 OK\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\
         \r\n\
         {body}",
        body.len(),
    )
}
