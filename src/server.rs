//! HTTP catalog service exposing a content provider over the wire format
//! read by [`RemoteSource`](crate::source::RemoteSource).

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::CatalogConfig;
use crate::router::{create_router, AppState};
use crate::source::{ChapterResolver, SyntheticSource};

/// Catalog server.
pub struct CatalogServer {
    config: Arc<CatalogConfig>,
    resolver: Arc<dyn ChapterResolver>,
}

impl CatalogServer {
    /// Creates a catalog server backed by a synthetic series.
    pub fn new(config: CatalogConfig) -> Self {
        let resolver: Arc<dyn ChapterResolver> =
            Arc::new(SyntheticSource::new(config.synthetic.clone()));
        Self::with_resolver(config, resolver)
    }

    /// Creates a catalog server backed by a custom provider.
    pub fn with_resolver(config: CatalogConfig, resolver: Arc<dyn ChapterResolver>) -> Self {
        Self {
            config: Arc::new(config),
            resolver,
        }
    }

    /// Binds the configured address and runs the server.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr: SocketAddr = self.config.bind_address().parse()?;
        let listener = TcpListener::bind(addr).await?;
        self.run_on(listener).await
    }

    /// Runs the server on an already bound listener.
    pub async fn run_on(
        self,
        listener: TcpListener,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let state = AppState {
            config: self.config.clone(),
            resolver: self.resolver.clone(),
        };
        let app = create_router(state).layer(TraceLayer::new_for_http());

        info!(
            "Catalog service is starting at http://{} (obfuscate: {})",
            listener.local_addr()?,
            self.config.obfuscate
        );
        axum::serve(listener, app).await?;

        Ok(())
    }

    /// Returns the bind address.
    pub fn bind_address(&self) -> String {
        self.config.bind_address()
    }

    /// Returns the base URL of the catalog service.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.bind_address())
    }
}

/// Builder for creating a catalog server.
pub struct CatalogServerBuilder {
    config: CatalogConfig,
    resolver: Option<Arc<dyn ChapterResolver>>,
}

impl CatalogServerBuilder {
    /// Creates a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: CatalogConfig::default(),
            resolver: None,
        }
    }

    /// Sets the configuration.
    pub fn config(mut self, config: CatalogConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the host address.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Sets the port.
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Serves page payloads MRI-encoded.
    pub fn obfuscate(mut self, obfuscate: bool) -> Self {
        self.config.obfuscate = obfuscate;
        self
    }

    /// Sets the content provider.
    pub fn resolver(mut self, resolver: Arc<dyn ChapterResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Builds the server.
    pub fn build(self) -> CatalogServer {
        match self.resolver {
            Some(resolver) => CatalogServer::with_resolver(self.config, resolver),
            None => CatalogServer::new(self.config),
        }
    }
}

impl Default for CatalogServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
