use std::path::PathBuf;

use clap::Parser;
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use contentful_mcp_server::server::Server;
use runtime::logging::{Logging, LoggingLayerBuilder};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::{Layer as _, Registry};

mod runtime;

/// Clap styling
const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// Arguments to the MCP server
#[derive(Debug, clap::Parser)]
#[command(
    version,
    styles = STYLES,
    about = "Contentful MCP Server - explore and query a Contentful space from an AI agent",
)]
struct Args {
    /// Path to the config file. Configuration is read from the environment when omitted.
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match Args::parse().config {
        Some(config_path) => runtime::read_config(config_path)?,
        None => runtime::read_config_from_env()?,
    };

    let (logging_layer, _guard) = LoggingLayerBuilder::new().build(&config.logging)?;
    Registry::default()
        .with(logging_layer.with_filter(Logging::env_filter(&config.logging)?))
        .try_init()?;

    info!(
        "Contentful MCP Server v{} // Licensed under MIT",
        env!("CARGO_PKG_VERSION")
    );

    let contentful = config.contentful;
    Ok(Server::builder()
        .transport(config.transport)
        .maybe_endpoint(contentful.endpoint)
        .maybe_space_id(contentful.space_id)
        .environment_id(contentful.environment_id)
        .maybe_access_token(contentful.access_token)
        .refresh_interval(config.cache.refresh_interval)
        .request_timeout(config.cache.request_timeout)
        .default_search_limit(config.search.default_limit)
        .build()
        .start()
        .await?)
}
