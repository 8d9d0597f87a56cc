use std::time::Duration;

use secrecy::SecretString;
use tracing::{error, info};
use url::Url;

use super::{Server, Transport};
use crate::errors::ServerError;

mod running;
mod starting;

use running::Running;
use starting::Starting;

/// Server settings carried from the builder into the states
pub(super) struct Config {
    pub(super) transport: Transport,
    pub(super) endpoint: Option<Url>,
    pub(super) space_id: Option<String>,
    pub(super) environment_id: String,
    pub(super) access_token: Option<SecretString>,
    pub(super) refresh_interval: Duration,
    pub(super) request_timeout: Duration,
    pub(super) default_search_limit: u32,
}

impl From<Server> for Config {
    fn from(server: Server) -> Self {
        Self {
            transport: server.transport,
            endpoint: server.endpoint,
            space_id: server.space_id,
            environment_id: server.environment_id,
            access_token: server.access_token,
            refresh_interval: server.refresh_interval,
            request_timeout: server.request_timeout,
            default_search_limit: server.default_search_limit,
        }
    }
}

/// Drives the server from startup to shutdown
pub(super) struct StateMachine {}

impl StateMachine {
    pub(crate) async fn start(self, server: Server) -> Result<(), ServerError> {
        let config = Config::from(server);
        let serves_in_background = matches!(config.transport, Transport::StreamableHttp { .. });

        let running = Starting { config }.start().await?;

        // Stdio has already served its client by now
        if serves_in_background {
            shutdown_signal().await;
        }

        info!("Shutting down");
        running.cancellation_token.cancel();
        Ok(())
    }
}

/// Resolves on ctrl-c or, on unix, SIGTERM
pub(super) async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install ctrl-c handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
