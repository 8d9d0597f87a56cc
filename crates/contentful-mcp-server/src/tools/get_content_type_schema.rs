use rmcp::model::{CallToolResult, Tool};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Target, json_success, resolve_error};
use crate::contentful::ContentTypeSchema;
use crate::errors::McpError;
use crate::resolver::ContentTypeResolver;
use crate::schema_from_type;

/// The name of the tool to get the fields of a content type
pub const GET_CONTENT_TYPE_SCHEMA_TOOL_NAME: &str = "get_content_type_schema";

#[derive(Clone)]
pub struct GetContentTypeSchema {
    resolver: ContentTypeResolver,
    pub tool: Tool,
}

/// Input for the get content type schema tool
#[derive(JsonSchema, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Input {
    /// The content type name, e.g. `pageArticle`
    content_type: String,

    #[serde(flatten)]
    target: Target,
}

#[derive(Serialize)]
struct Output<'a> {
    #[serde(flatten)]
    schema: &'a ContentTypeSchema,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    cached: bool,
    note: String,
}

impl GetContentTypeSchema {
    pub fn new(resolver: ContentTypeResolver) -> Self {
        Self {
            resolver,
            tool: Tool::new(
                GET_CONTENT_TYPE_SCHEMA_TOOL_NAME,
                "Get the fields of a content type with their GraphQL types. Accepts the content type name or its collection type name.",
                schema_from_type!(Input),
            ),
        }
    }

    #[tracing::instrument(skip(self, input), fields(content_type = %input.content_type))]
    pub async fn execute(&self, input: Input) -> Result<CallToolResult, McpError> {
        let resolver = input.target.resolver(&self.resolver);
        let resolved = match resolver.resolve(&input.content_type).await {
            Ok(resolved) => resolved,
            Err(error) => return resolve_error(&error),
        };

        let note = if resolved.schema.content_type == input.content_type {
            format!(
                "Use get_example with contentType \"{}\" to see how to query it.",
                input.content_type
            )
        } else {
            format!(
                "\"{}\" resolved to the GraphQL type \"{}\".",
                input.content_type, resolved.schema.content_type
            )
        };

        json_success(&Output {
            schema: &resolved.schema,
            cached: resolved.cached,
            note,
        })
    }
}
