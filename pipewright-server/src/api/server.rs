//! HTTP server setup and connection handling.

use super::router;
use super::state::AppState;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use pipewright_core::{PipewrightError, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Configuration for the API server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to listen on; 0 picks an ephemeral port.
    pub port: u16,
}

impl ServerConfig {
    /// Create a new server configuration.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Get the socket address.
    pub fn socket_addr(&self) -> SocketAddr {
        let host: std::net::IpAddr = self.host.parse().unwrap_or([0, 0, 0, 0].into());
        SocketAddr::new(host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// HTTP API server.
pub struct ApiServer {
    config: ServerConfig,
    state: Arc<AppState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl ApiServer {
    /// Create a new API server.
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self {
            config,
            state: Arc::new(state),
            shutdown_tx: None,
        }
    }

    /// Get a reference to the application state.
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    async fn bind(&self) -> Result<TcpListener> {
        TcpListener::bind(self.config.socket_addr())
            .await
            .map_err(|e| PipewrightError::Io {
                path: std::path::PathBuf::from(format!(
                    "{}:{}",
                    self.config.host, self.config.port
                )),
                cause: e.to_string(),
            })
    }

    /// Run the server until [`shutdown`](Self::shutdown) is called.
    pub async fn run(&mut self) -> Result<()> {
        let listener = self.bind().await?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        self.shutdown_tx = Some(shutdown_tx);

        tracing::info!(
            host = %self.config.host,
            port = %self.config.port,
            "API server started"
        );
        serve(listener, Arc::clone(&self.state), shutdown_rx).await
    }

    /// Bind and serve on a background task.
    pub async fn spawn(self) -> Result<ServerHandle> {
        let listener = self.bind().await?;
        let addr = listener.local_addr().map_err(|e| PipewrightError::Network {
            cause: e.to_string(),
        })?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tracing::info!(addr = %addr, "API server started");
        let task = tokio::spawn(serve(listener, self.state, shutdown_rx));
        Ok(ServerHandle {
            addr,
            shutdown_tx: Some(shutdown_tx),
            task,
        })
    }

    /// Shutdown the server.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// A server running on a background task.
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<Result<()>>,
}

impl ServerHandle {
    /// Bound address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL, e.g. `http://127.0.0.1:38211`.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop accepting connections and wait for the accept loop to exit.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        match (&mut self.task).await {
            Ok(result) => result,
            Err(e) => Err(PipewrightError::Network {
                cause: e.to_string(),
            }),
        }
    }
}

async fn serve(
    listener: TcpListener,
    state: Arc<AppState>,
    mut shutdown_rx: oneshot::Receiver<()>,
) -> Result<()> {
    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, remote_addr) = result.map_err(|e| PipewrightError::Network {
                    cause: e.to_string(),
                })?;

                let io = TokioIo::new(stream);
                let state = Arc::clone(&state);

                tokio::spawn(async move {
                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { router::route(req, state).await }
                    });

                    if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                        if !e.is_incomplete_message() {
                            tracing::warn!(
                                remote = %remote_addr,
                                error = %e,
                                "HTTP connection error"
                            );
                        }
                    }
                });
            }
            _ = &mut shutdown_rx => {
                tracing::info!("API server shutting down");
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn server_config_socket_addr() {
        let config = ServerConfig::new("127.0.0.1", 9000);
        let addr = config.socket_addr();

        assert_eq!(addr.port(), 9000);
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
    }
}
