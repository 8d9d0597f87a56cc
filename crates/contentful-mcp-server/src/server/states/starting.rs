use std::net::SocketAddr;
use std::sync::Arc;

use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::{StreamableHttpServerConfig, StreamableHttpService};
use rmcp::{ServiceExt as _, transport::stdio};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::{Config, Running};
use crate::contentful::ContentfulClient;
use crate::errors::ServerError;
use crate::metadata_cache::MetadataCache;
use crate::resolver::ContentTypeResolver;
use crate::server::Transport;

pub(super) struct Starting {
    pub(super) config: Config,
}

impl Starting {
    pub(super) async fn start(self) -> Result<Running, ServerError> {
        let client = ContentfulClient::builder()
            .maybe_endpoint(self.config.endpoint)
            .maybe_space_id(self.config.space_id)
            .environment_id(self.config.environment_id)
            .maybe_access_token(self.config.access_token)
            .timeout(self.config.request_timeout)
            .build()?;

        if client.space_id().is_none() {
            warn!("No Contentful space configured, tools will need a spaceId argument");
        }

        let cancellation_token = CancellationToken::new();
        let cache = Arc::new(MetadataCache::new());

        // The first load runs in the background so startup never waits on the API
        cache.clone().spawn_refresh(
            client.clone(),
            self.config.refresh_interval,
            cancellation_token.child_token(),
        );

        let running = Running::new(
            ContentTypeResolver::new(cache, client),
            self.config.default_search_limit,
            cancellation_token.clone(),
        );

        match self.config.transport {
            Transport::StreamableHttp {
                address,
                port,
                stateful_mode,
            } => {
                info!(port = ?port, address = ?address, "Starting MCP server in Streamable HTTP mode");
                let service_running = running.clone();
                let service = StreamableHttpService::new(
                    move || Ok(service_running.clone()),
                    LocalSessionManager::default().into(),
                    StreamableHttpServerConfig {
                        stateful_mode,
                        ..Default::default()
                    },
                );
                let router = axum::Router::new().nest_service("/mcp", service);

                let tcp_listener =
                    tokio::net::TcpListener::bind(SocketAddr::new(address, port)).await?;
                tokio::spawn(async move {
                    if let Err(e) = axum::serve(tcp_listener, router)
                        .with_graceful_shutdown(cancellation_token.cancelled_owned())
                        .await
                    {
                        error!("Failed to serve MCP over HTTP: {e:?}");
                    }
                });
            }
            Transport::Stdio => {
                info!("Starting MCP server in stdio mode");
                let service = running
                    .clone()
                    .serve(stdio())
                    .await
                    .inspect_err(|e| {
                        error!("serving error: {:?}", e);
                    })
                    .map_err(Box::new)?;
                service.waiting().await.map_err(ServerError::StartupError)?;
            }
        }

        Ok(running)
    }
}
