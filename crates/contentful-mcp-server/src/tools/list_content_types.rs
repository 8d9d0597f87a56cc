use rmcp::model::{CallToolResult, Tool};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{Target, fetch_error, json_success};
use crate::contentful::ContentTypeSummary;
use crate::errors::McpError;
use crate::resolver::ContentTypeResolver;
use crate::schema_from_type;

/// The name of the tool to list the content types of a space
pub const LIST_CONTENT_TYPES_TOOL_NAME: &str = "list_content_types";

#[derive(Clone)]
pub struct ListContentTypes {
    resolver: ContentTypeResolver,
    pub tool: Tool,
}

/// Input for the list content types tool
#[derive(JsonSchema, Deserialize, Default)]
pub struct Input {
    #[serde(flatten)]
    target: Target,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Output {
    message: String,
    content_types: Vec<ContentTypeSummary>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    cached: bool,
}

impl ListContentTypes {
    pub fn new(resolver: ContentTypeResolver) -> Self {
        Self {
            resolver,
            tool: Tool::new(
                LIST_CONTENT_TYPES_TOOL_NAME,
                "List the content types of the Contentful space. Each entry has the content type `name` and the `queryName` of the root field listing its entries. Use `get_content_type_schema` to see the fields of a content type.",
                schema_from_type!(Input),
            ),
        }
    }

    #[tracing::instrument(skip_all)]
    pub async fn execute(&self, input: Input) -> Result<CallToolResult, McpError> {
        let resolver = input.target.resolver(&self.resolver);

        if resolver.uses_cache()
            && resolver.cache().is_available()
            && let Some(content_types) = resolver.cache().content_types()
        {
            debug!("Listing {} content types from cache", content_types.len());
            return json_success(&Output {
                message: found_message(content_types.len()),
                content_types,
                cached: true,
            });
        }

        match resolver.client().discover_content_types().await {
            Ok(content_types) => json_success(&Output {
                message: found_message(content_types.len()),
                content_types,
                cached: false,
            }),
            Err(error) => fetch_error(&error),
        }
    }
}

fn found_message(count: usize) -> String {
    format!("Found {count} content types. Use get_content_type_schema to see the fields of one.")
}
