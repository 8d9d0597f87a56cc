use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An error reported by the GraphQL API in a response's `errors` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQLError {
    pub message: String,

    /// Locations, paths and extensions, relayed untouched
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl GraphQLError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: Map::new(),
        }
    }
}

/// An error talking to the Contentful GraphQL API
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Missing configuration: {0}")]
    Configuration(String),

    #[error(transparent)]
    Request(#[from] reqwest::Error),

    #[error("HTTP Error {status}: {body}")]
    Http { status: u16, body: String },

    #[error("GraphQL errors: {}", join_messages(.0))]
    GraphQL(Vec<GraphQLError>),

    #[error("Error in response: {0}")]
    Response(String),

    #[error("Type not found (tried: {})", .tried.join(", "))]
    TypeNotFound { tried: Vec<String> },
}

impl FetchError {
    /// The error as a GraphQL-style `errors` list, the shape callers of the
    /// query tool receive for transport and API failures alike.
    pub fn to_errors(&self) -> Vec<GraphQLError> {
        match self {
            FetchError::GraphQL(errors) => errors.clone(),
            other => vec![GraphQLError::new(other.to_string())],
        }
    }
}

fn join_messages(errors: &[GraphQLError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
