//! MCP tools exposing a Contentful space's schema and content to an AI agent.

pub(crate) mod build_search_query;
pub(crate) mod get_content_type_schema;
pub(crate) mod get_example;
pub(crate) mod graphql_query;
pub(crate) mod list_content_types;
pub(crate) mod smart_search;

use rmcp::model::{CallToolResult, Content, ErrorCode};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::contentful::FetchError;
use crate::errors::McpError;
use crate::resolver::{ContentTypeResolver, ResolveError};

/// Optional per-call override of the configured space and environment
#[derive(Debug, Default, Clone, JsonSchema, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    /// The space to use instead of the configured one
    #[serde(default)]
    pub space_id: Option<String>,

    /// The environment to use instead of the configured one
    #[serde(default)]
    pub environment_id: Option<String>,
}

impl Target {
    pub(crate) fn resolver(&self, resolver: &ContentTypeResolver) -> ContentTypeResolver {
        resolver.for_target(self.space_id.clone(), self.environment_id.clone())
    }
}

fn to_pretty_json<T: Serialize>(value: &T) -> Result<String, McpError> {
    serde_json::to_string_pretty(value).map_err(|e| {
        McpError::new(
            ErrorCode::INTERNAL_ERROR,
            format!("Failed to serialize response: {e}"),
            None,
        )
    })
}

/// A successful result holding `value` as pretty-printed JSON
pub(crate) fn json_success<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(to_pretty_json(
        value,
    )?)]))
}

/// An error result holding `value` as pretty-printed JSON
pub(crate) fn json_error<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::error(vec![Content::text(to_pretty_json(
        value,
    )?)]))
}

pub(crate) fn text_error(message: impl Into<String>) -> CallToolResult {
    CallToolResult::error(vec![Content::text(message.into())])
}

/// Failed API calls in the GraphQL `errors` shape
pub(crate) fn fetch_error(error: &FetchError) -> Result<CallToolResult, McpError> {
    json_error(&json!({ "errors": error.to_errors() }))
}

pub(crate) fn resolve_error(error: &ResolveError) -> Result<CallToolResult, McpError> {
    match error {
        ResolveError::NotFound { .. } => Ok(text_error(error.to_string())),
        ResolveError::Fetch(error) => fetch_error(error),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::ops::Deref as _;
    use std::sync::Arc;

    use mockito::ServerGuard;
    use rmcp::model::{CallToolResult, RawContent};

    use crate::contentful::test_support::client_for;
    use crate::contentful::{ContentTypeSchema, ContentTypeSummary, FieldDescriptor};
    use crate::metadata_cache::MetadataCache;
    use crate::resolver::ContentTypeResolver;

    pub(crate) fn text(result: &CallToolResult) -> String {
        result
            .content
            .iter()
            .filter_map(|c| match c.deref() {
                RawContent::Text(text) => Some(text.text.clone()),
                _ => None,
            })
            .collect::<Vec<String>>()
            .join("\n")
    }

    pub(crate) fn is_error(result: &CallToolResult) -> bool {
        result.is_error.unwrap_or(false)
    }

    /// The cache of the scenario space: `pageArticle` and `topicCategory`
    pub(crate) fn scenario_cache() -> Arc<MetadataCache> {
        let cache = Arc::new(MetadataCache::new());
        cache.set_content_types(vec![
            ContentTypeSummary::new("pageArticle"),
            ContentTypeSummary::new("topicCategory"),
        ]);
        cache.insert_schema(ContentTypeSchema::new(
            "pageArticle",
            vec![
                FieldDescriptor::new("title", "String"),
                FieldDescriptor::new("slug", "String"),
                FieldDescriptor::new("body", "String"),
                FieldDescriptor::new("author", "String"),
                FieldDescriptor::new("tags", "[String]"),
            ],
        ));
        cache.insert_schema(ContentTypeSchema::new(
            "topicCategory",
            vec![
                FieldDescriptor::new("name", "String"),
                FieldDescriptor::new("description", "String"),
            ],
        ));
        cache
    }

    pub(crate) fn resolver(cache: Arc<MetadataCache>, server: &ServerGuard) -> ContentTypeResolver {
        ContentTypeResolver::new(cache, client_for(server))
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn fetch_errors_use_the_graphql_error_shape() {
        let result = fetch_error(&FetchError::Http {
            status: 404,
            body: "not found".to_string(),
        })
        .unwrap();

        assert!(is_error(&result));
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&text(&result)).unwrap(),
            json!({ "errors": [{ "message": "HTTP Error 404: not found" }] })
        );
    }

    #[test]
    fn responses_are_pretty_printed() {
        let result = json_success(&json!({ "a": 1 })).unwrap();

        assert_eq!(text(&result), "{\n  \"a\": 1\n}");
    }
}
