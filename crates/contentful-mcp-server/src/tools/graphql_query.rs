use apollo_compiler::ast::Document;
use apollo_compiler::validation::{Valid, WithErrors};
use apollo_compiler::{ExecutableDocument, Schema};
use rmcp::model::{CallToolResult, Tool};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{Target, fetch_error, json_error, json_success, text_error};
use crate::errors::McpError;
use crate::resolver::ContentTypeResolver;
use crate::schema_from_type;

/// The name of the tool to run a GraphQL query against the space
pub const GRAPHQL_QUERY_TOOL_NAME: &str = "graphql_query";

const SOURCE_PATH: &str = "query.graphql";

#[derive(Clone)]
pub struct GraphQLQuery {
    resolver: ContentTypeResolver,
    pub tool: Tool,
}

/// Input for the GraphQL query tool
#[derive(JsonSchema, Deserialize)]
pub struct Input {
    /// The GraphQL query
    query: String,

    /// The variable values represented as JSON
    #[schemars(schema_with = "String::json_schema", default)]
    variables: Option<Value>,

    #[serde(flatten)]
    target: Target,
}

impl GraphQLQuery {
    pub fn new(resolver: ContentTypeResolver) -> Self {
        Self {
            resolver,
            tool: Tool::new(
                GRAPHQL_QUERY_TOOL_NAME,
                "Run a GraphQL query against the Contentful Content API and return the raw response. Use `get_content_type_schema` and `get_example` to build queries from the schema rather than guessing field names.",
                schema_from_type!(Input),
            ),
        }
    }

    #[tracing::instrument(skip_all)]
    pub async fn execute(&self, input: Input) -> Result<CallToolResult, McpError> {
        let variables = match variables(input.variables) {
            Ok(variables) => variables,
            Err(message) => return Ok(text_error(message)),
        };

        let resolver = input.target.resolver(&self.resolver);
        let schema = resolver
            .uses_cache()
            .then(|| resolver.cache().graphql_schema())
            .flatten();
        if let Err(message) = validate(&input.query, schema.as_deref()) {
            return Ok(text_error(message));
        }

        match resolver.client().execute(&input.query, variables).await {
            Ok(response) if has_errors(&response) => json_error(&response),
            Ok(response) => json_success(&response),
            Err(error) => fetch_error(&error),
        }
    }
}

/// Variables may be sent as a JSON object or as a string holding one
fn variables(variables: Option<Value>) -> Result<Option<Value>, String> {
    match variables {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => match serde_json::from_str(&s) {
            Ok(Value::Object(object)) => Ok(Some(Value::Object(object))),
            Ok(_) => Err("Variables must be a JSON object or string".to_string()),
            Err(e) => Err(format!("Invalid variables: {e}")),
        },
        Some(object @ Value::Object(_)) => Ok(Some(object)),
        Some(_) => Err("Variables must be a JSON object or string".to_string()),
    }
}

/// Check the query parses, then that it fits the cached schema when there is one
fn validate(query: &str, schema: Option<&Valid<Schema>>) -> Result<(), String> {
    Document::parse(query, SOURCE_PATH)
        .map_err(|errors| format!("GraphQL query syntax error: {}", diagnostics(&errors)))?;

    let Some(schema) = schema else {
        debug!("No cached schema, sending the query unvalidated");
        return Ok(());
    };
    ExecutableDocument::parse_and_validate(schema, query, SOURCE_PATH)
        .map(|_| ())
        .map_err(|errors| {
            format!(
                "GraphQL schema mismatch: {}. Use get_content_type_schema to check the available fields.",
                diagnostics(&errors)
            )
        })
}

fn diagnostics<T>(errors: &WithErrors<T>) -> String {
    errors
        .errors
        .iter()
        .map(|diagnostic| diagnostic.error.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

fn has_errors(response: &Value) -> bool {
    response
        .get("errors")
        .and_then(Value::as_array)
        .is_some_and(|errors| !errors.is_empty())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mockito::Matcher;
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::contentful::test_support::API_PATH;
    use crate::metadata_cache::MetadataCache;
    use crate::tools::test_support::*;

    fn cache_with_schema() -> Arc<MetadataCache> {
        let cache = Arc::new(MetadataCache::new());
        cache.set_graphql_schema(
            Schema::parse_and_validate(
                "type Query { entry(id: String!): Entry } type Entry { title: String }",
                "schema.graphql",
            )
            .unwrap(),
        );
        cache
    }

    fn input(query: &str, variables: Option<Value>) -> Input {
        Input {
            query: query.to_string(),
            variables,
            target: Target::default(),
        }
    }

    #[rstest]
    #[case::object(Some(json!({ "id": "1" })), Ok(Some(json!({ "id": "1" }))))]
    #[case::string(Some(json!("{\"id\":\"1\"}")), Ok(Some(json!({ "id": "1" }))))]
    #[case::missing(None, Ok(None))]
    #[case::null(Some(Value::Null), Ok(None))]
    #[case::number(Some(json!(1)), Err("Variables must be a JSON object or string".to_string()))]
    fn variables_forms(#[case] given: Option<Value>, #[case] expected: Result<Option<Value>, String>) {
        assert_eq!(variables(given), expected);
    }

    #[tokio::test]
    async fn syntax_errors_are_reported_without_a_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("POST", Matcher::Any).expect(0).create_async().await;
        let tool = GraphQLQuery::new(resolver(cache_with_schema(), &server));

        let result = tool.execute(input("query {", None)).await.unwrap();

        mock.assert_async().await;
        assert!(is_error(&result));
        assert!(text(&result).starts_with("GraphQL query syntax error"));
    }

    #[tokio::test]
    async fn schema_mismatches_are_reported_without_a_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("POST", Matcher::Any).expect(0).create_async().await;
        let tool = GraphQLQuery::new(resolver(cache_with_schema(), &server));

        let result = tool
            .execute(input("{ entry(id: \"1\") { missing } }", None))
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(is_error(&result));
        assert!(text(&result).starts_with("GraphQL schema mismatch"));
    }

    #[tokio::test]
    async fn valid_queries_return_the_raw_response() {
        let mut server = mockito::Server::new_async().await;
        let body = json!({ "data": { "entry": { "title": "Hello" } } });
        let _mock = server
            .mock("POST", API_PATH)
            .match_body(Matcher::PartialJson(json!({ "variables": { "id": "1" } })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;
        let tool = GraphQLQuery::new(resolver(cache_with_schema(), &server));

        let result = tool
            .execute(input(
                "query Entry($id: String!) { entry(id: $id) { title } }",
                Some(json!("{\"id\": \"1\"}")),
            ))
            .await
            .unwrap();

        assert!(!is_error(&result));
        assert_eq!(serde_json::from_str::<Value>(&text(&result)).unwrap(), body);
    }

    #[tokio::test]
    async fn graphql_errors_are_relayed_as_tool_errors() {
        let mut server = mockito::Server::new_async().await;
        let body = json!({ "data": null, "errors": [{ "message": "Query cannot be executed" }] });
        let _mock = server
            .mock("POST", API_PATH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;
        let tool = GraphQLQuery::new(resolver(Arc::new(MetadataCache::new()), &server));

        let result = tool.execute(input("{ anything }", None)).await.unwrap();

        assert!(is_error(&result));
        assert_eq!(serde_json::from_str::<Value>(&text(&result)).unwrap(), body);
    }

    #[tokio::test]
    async fn http_errors_use_the_errors_shape() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", API_PATH)
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;
        let tool = GraphQLQuery::new(resolver(Arc::new(MetadataCache::new()), &server));

        let result = tool.execute(input("{ anything }", None)).await.unwrap();

        assert!(is_error(&result));
        assert_eq!(
            serde_json::from_str::<Value>(&text(&result)).unwrap(),
            json!({ "errors": [{ "message": "HTTP Error 500: boom" }] })
        );
    }
}
