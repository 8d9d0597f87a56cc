use rmcp::model::{CallToolResult, Tool};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use super::{Target, json_success, text_error};
use crate::errors::McpError;
use crate::resolver::ContentTypeResolver;
use crate::schema_from_type;
use crate::smart_search::smart_search;

/// The name of the tool to search all content types at once
pub const SMART_SEARCH_TOOL_NAME: &str = "smart_search";

#[derive(Clone)]
pub struct SmartSearch {
    resolver: ContentTypeResolver,
    default_limit: u32,
    pub tool: Tool,
}

/// Input for the smart search tool
#[derive(JsonSchema, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Input {
    /// The text to search for
    query: String,

    /// Only search these content types, given as `list_content_types` names or GraphQL type names
    #[serde(default)]
    content_types: Option<Vec<String>>,

    /// Maximum number of entries returned per content type
    #[serde(default)]
    limit: Option<u32>,

    #[serde(flatten)]
    target: Target,
}

impl SmartSearch {
    pub fn new(resolver: ContentTypeResolver, default_limit: u32) -> Self {
        Self {
            resolver,
            default_limit,
            tool: Tool::new(
                SMART_SEARCH_TOOL_NAME,
                "Search for text across all content types at once. Every text field that supports `_contains` filtering is searched. Returns the matching entries grouped by content type.",
                schema_from_type!(Input),
            ),
        }
    }

    #[tracing::instrument(skip(self, input), fields(query = %input.query))]
    pub async fn execute(&self, input: Input) -> Result<CallToolResult, McpError> {
        let resolver = input.target.resolver(&self.resolver);
        if !resolver.uses_cache() {
            return Ok(text_error(
                "Smart search requires cached metadata, which only covers the configured space and environment.",
            ));
        }

        match smart_search(
            resolver.cache(),
            resolver.client(),
            &input.query,
            input.content_types.as_deref(),
            input.limit.unwrap_or(self.default_limit),
        )
        .await
        {
            Ok(report) => json_success(&report),
            Err(error) => Ok(text_error(error.to_string())),
        }
    }
}
