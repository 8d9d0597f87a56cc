use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use bon::bon;
use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

use crate::contentful::{DEFAULT_ENVIRONMENT, DEFAULT_REQUEST_TIMEOUT};
use crate::errors::ServerError;
use crate::smart_search::DEFAULT_SEARCH_LIMIT;

mod states;

use states::StateMachine;

/// How often cached metadata is reloaded unless configured otherwise
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// A Contentful MCP Server
pub struct Server {
    transport: Transport,
    endpoint: Option<Url>,
    space_id: Option<String>,
    environment_id: String,
    access_token: Option<SecretString>,
    refresh_interval: Duration,
    request_timeout: Duration,
    default_search_limit: u32,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Transport {
    /// Use standard IO for server <> client communication
    #[default]
    Stdio,

    /// Host the MCP server on the configuration, using streamable HTTP messages.
    StreamableHttp {
        /// The IP address to bind to
        #[serde(default = "Transport::default_address")]
        address: IpAddr,

        /// The port to bind to
        #[serde(default = "Transport::default_port")]
        port: u16,

        /// Enable stateful mode for session management
        #[serde(default = "Transport::default_stateful_mode")]
        stateful_mode: bool,
    },
}

impl Transport {
    fn default_address() -> IpAddr {
        IpAddr::V4(Ipv4Addr::LOCALHOST)
    }

    fn default_port() -> u16 {
        8000
    }

    fn default_stateful_mode() -> bool {
        true
    }
}

#[bon]
impl Server {
    #[builder]
    pub fn new(
        #[builder(default)] transport: Transport,
        endpoint: Option<Url>,
        #[builder(into)] space_id: Option<String>,
        #[builder(into, default = DEFAULT_ENVIRONMENT.to_string())] environment_id: String,
        access_token: Option<SecretString>,
        #[builder(default = DEFAULT_REFRESH_INTERVAL)] refresh_interval: Duration,
        #[builder(default = DEFAULT_REQUEST_TIMEOUT)] request_timeout: Duration,
        #[builder(default = DEFAULT_SEARCH_LIMIT)] default_search_limit: u32,
    ) -> Self {
        Self {
            transport,
            endpoint,
            space_id,
            environment_id,
            access_token,
            refresh_interval,
            request_timeout,
            default_search_limit,
        }
    }

    pub async fn start(self) -> Result<(), ServerError> {
        StateMachine {}.start(self).await
    }
}
