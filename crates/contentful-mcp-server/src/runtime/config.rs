use std::time::Duration;

use contentful_mcp_server::contentful::{DEFAULT_ENVIRONMENT, DEFAULT_REQUEST_TIMEOUT};
use contentful_mcp_server::server::{DEFAULT_REFRESH_INTERVAL, Transport};
use contentful_mcp_server::smart_search::DEFAULT_SEARCH_LIMIT;
use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

use super::logging::Logging;

/// Configuration for the MCP server
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// The Contentful space to serve
    #[serde(default)]
    pub contentful: ContentfulConfig,

    /// Metadata cache behaviour
    #[serde(default)]
    pub cache: CacheConfig,

    /// Smart search defaults
    #[serde(default)]
    pub search: SearchConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: Logging,

    /// The type of server transport to use
    #[serde(default)]
    pub transport: Transport,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ContentfulConfig {
    pub space_id: Option<String>,

    pub environment_id: String,

    /// Content Delivery API token
    pub access_token: Option<SecretString>,

    /// Overrides the GraphQL Content API base URL
    pub endpoint: Option<Url>,
}

impl Default for ContentfulConfig {
    fn default() -> Self {
        Self {
            space_id: None,
            environment_id: DEFAULT_ENVIRONMENT.to_string(),
            access_token: None,
            endpoint: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// How often the cached content types and schemas are reloaded
    #[serde(with = "humantime_serde")]
    pub refresh_interval: Duration,

    /// Timeout applied to every request sent to Contentful
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Entries returned per content type when a search gives no limit
    pub default_limit: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}
