//! Backend server.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use addrfill_config::ServerConfig;

use crate::http::routes::create_router;
use crate::state::AppState;

/// Listening address of the backend.
#[derive(Debug, Clone)]
pub struct InterfaceConfig {
    pub host: String,
    pub port: u16,
}

impl InterfaceConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl Default for InterfaceConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl From<&ServerConfig> for InterfaceConfig {
    fn from(config: &ServerConfig) -> Self {
        Self::new(config.host.clone(), config.port)
    }
}

/// The backend HTTP server.
pub struct InterfaceServer {
    config: InterfaceConfig,
    state: Arc<AppState>,
}

impl InterfaceServer {
    pub fn new(config: InterfaceConfig, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    /// Get the server address.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Bind and serve until the process is stopped.
    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        let app = create_router(self.state.clone());

        let addr: SocketAddr = self.addr().parse()?;
        let listener = TcpListener::bind(addr).await?;

        info!("addrfill backend listening on {}", addr);
        axum::serve(listener, app).await?;

        Ok(())
    }
}
