use rmcp::model::{CallToolResult, Content, Tool};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};

use super::{Target, text_error};
use crate::errors::McpError;
use crate::resolver::{ContentTypeResolver, ResolveError, candidate_names};
use crate::schema_from_type;
use crate::synthesis::build_search_query;

/// The name of the tool to generate a search query for one content type
pub const BUILD_SEARCH_QUERY_TOOL_NAME: &str = "build_search_query";

#[derive(Clone)]
pub struct BuildSearchQuery {
    resolver: ContentTypeResolver,
    pub tool: Tool,
}

/// Input for the build search query tool
#[derive(JsonSchema, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Input {
    /// The content type to search, e.g. `pageArticle`
    content_type: String,

    /// The text to search for, shown in the example variables
    #[serde(default)]
    search_term: Option<String>,

    /// Only search these fields
    #[serde(default)]
    fields: Option<Vec<String>>,

    #[serde(flatten)]
    target: Target,
}

impl BuildSearchQuery {
    pub fn new(resolver: ContentTypeResolver) -> Self {
        Self {
            resolver,
            tool: Tool::new(
                BUILD_SEARCH_QUERY_TOOL_NAME,
                "Generate a parametrized GraphQL query that searches the text fields of a content type for `$searchTerm`. Run it with `graphql_query`.",
                schema_from_type!(Input),
            ),
        }
    }

    #[tracing::instrument(skip(self, input), fields(content_type = %input.content_type))]
    pub async fn execute(&self, input: Input) -> Result<CallToolResult, McpError> {
        let resolver = input.target.resolver(&self.resolver);
        if !resolver.uses_cache() || !resolver.cache().is_available() {
            return Ok(text_error(
                "Building a search query requires cached metadata, which is not available yet. Try again once the content types have been loaded.",
            ));
        }

        let Some(schema) = resolver.cache().lookup(&input.content_type) else {
            return Ok(text_error(
                ResolveError::NotFound {
                    name: input.content_type.clone(),
                    tried: candidate_names(&input.content_type),
                }
                .to_string(),
            ));
        };

        let query = match build_search_query(&schema, input.fields.as_deref()) {
            Ok(query) => query,
            Err(error) => return Ok(text_error(error.to_string())),
        };

        let variables = json!({
            "searchTerm": input.search_term.as_deref().unwrap_or("your search term"),
        });
        let text = format!(
            "{}\n\n# Searched fields: {}\n# Variables: {variables}",
            query.document,
            query.searched_fields.join(", ")
        );

        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}
