use rmcp::model::{CallToolResult, Content, Tool};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use super::{Target, resolve_error};
use crate::errors::McpError;
use crate::resolver::ContentTypeResolver;
use crate::schema_from_type;
use crate::synthesis::example_query;

/// The name of the tool to generate example queries for a content type
pub const GET_EXAMPLE_TOOL_NAME: &str = "get_example";

#[derive(Clone)]
pub struct GetExample {
    resolver: ContentTypeResolver,
    pub tool: Tool,
}

/// Input for the get example tool
#[derive(JsonSchema, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Input {
    /// The content type name, e.g. `pageArticle`
    content_type: String,

    /// Include reference fields as inline fragment placeholders. Defaults to false.
    #[serde(default)]
    include_relations: bool,

    #[serde(flatten)]
    target: Target,
}

impl GetExample {
    pub fn new(resolver: ContentTypeResolver) -> Self {
        Self {
            resolver,
            tool: Tool::new(
                GET_EXAMPLE_TOOL_NAME,
                "Generate example GraphQL queries for a content type: one listing entries and one fetching a single entry by id.",
                schema_from_type!(Input),
            ),
        }
    }

    #[tracing::instrument(skip(self, input), fields(content_type = %input.content_type))]
    pub async fn execute(&self, input: Input) -> Result<CallToolResult, McpError> {
        let resolver = input.target.resolver(&self.resolver);
        match resolver.resolve(&input.content_type).await {
            Ok(resolved) => Ok(CallToolResult::success(vec![Content::text(example_query(
                &resolved.schema,
                input.include_relations,
            ))])),
            Err(error) => resolve_error(&error),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mockito::Matcher;

    use super::*;
    use crate::contentful::{ContentTypeSchema, ContentTypeSummary, FieldDescriptor};
    use crate::metadata_cache::MetadataCache;
    use crate::tools::test_support::*;

    #[tokio::test]
    async fn returns_plain_text_document() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;
        let cache = Arc::new(MetadataCache::new());
        cache.set_content_types(vec![ContentTypeSummary::new("pageArticle")]);
        cache.insert_schema(ContentTypeSchema::new(
            "PageArticle",
            vec![
                FieldDescriptor::new("title", "String"),
                FieldDescriptor::new("author", "Author"),
            ],
        ));
        let tool = GetExample::new(resolver(cache, &server));

        let result = tool
            .execute(Input {
                content_type: "pageArticle".to_string(),
                include_relations: true,
                target: Target::default(),
            })
            .await
            .unwrap();

        mock.assert_async().await;
        let document = text(&result);
        assert!(document.starts_with("# Example queries for PageArticle"));
        assert!(document.contains("pageArticleCollection(limit: 5)"));
        assert!(document.contains("... on Author {"));
    }

    #[test]
    fn include_relations_defaults_to_false() {
        let input: Input =
            serde_json::from_value(serde_json::json!({ "contentType": "pageArticle" })).unwrap();
        assert!(!input.include_relations);
    }
}
