use std::fmt;

use tokio::task::JoinError;

use crate::contentful::FetchError;

/// An error in server initialization
#[derive(Debug)]
pub enum ServerError {
    Client(FetchError),
    Bind(std::io::Error),
    StartupError(JoinError),
    McpInitializeError(Box<rmcp::service::ServerInitializeError>),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::Client(e) => write!(f, "Failed to create Contentful client: {e}"),
            ServerError::Bind(e) => write!(f, "Could not bind listener: {e}"),
            ServerError::StartupError(e) => write!(f, "Failed to start server: {e}"),
            ServerError::McpInitializeError(e) => {
                write!(f, "Failed to initialize MCP server: {e}")
            }
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServerError::Client(e) => Some(e),
            ServerError::Bind(e) => Some(e),
            ServerError::StartupError(e) => Some(e),
            ServerError::McpInitializeError(e) => Some(e.as_ref()),
        }
    }
}

impl From<FetchError> for ServerError {
    fn from(e: FetchError) -> Self {
        ServerError::Client(e)
    }
}

impl From<std::io::Error> for ServerError {
    fn from(e: std::io::Error) -> Self {
        ServerError::Bind(e)
    }
}

impl From<JoinError> for ServerError {
    fn from(e: JoinError) -> Self {
        ServerError::StartupError(e)
    }
}

impl From<Box<rmcp::service::ServerInitializeError>> for ServerError {
    fn from(e: Box<rmcp::service::ServerInitializeError>) -> Self {
        ServerError::McpInitializeError(e)
    }
}

/// An MCP tool error
pub type McpError = rmcp::model::ErrorData;
