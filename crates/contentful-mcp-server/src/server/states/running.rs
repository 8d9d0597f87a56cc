use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, ErrorCode, Implementation, ListToolsResult,
    PaginatedRequestParam, ServerCapabilities, ServerInfo, ToolsCapability,
};
use rmcp::service::RequestContext;
use rmcp::{RoleServer, ServerHandler};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::errors::McpError;
use crate::resolver::ContentTypeResolver;
use crate::tools::{
    build_search_query::{BUILD_SEARCH_QUERY_TOOL_NAME, BuildSearchQuery},
    get_content_type_schema::{GET_CONTENT_TYPE_SCHEMA_TOOL_NAME, GetContentTypeSchema},
    get_example::{GET_EXAMPLE_TOOL_NAME, GetExample},
    graphql_query::{GRAPHQL_QUERY_TOOL_NAME, GraphQLQuery},
    list_content_types::{LIST_CONTENT_TYPES_TOOL_NAME, ListContentTypes},
    smart_search::{SMART_SEARCH_TOOL_NAME, SmartSearch},
};

const INSTRUCTIONS: &str = "Explore and query a Contentful space. Start with list_content_types, \
inspect a content type with get_content_type_schema or get_example, then run queries with \
graphql_query. Use smart_search to look for text across all content types.";

#[derive(Clone)]
pub(super) struct Running {
    pub(super) resolver: ContentTypeResolver,
    pub(super) list_content_types_tool: ListContentTypes,
    pub(super) get_content_type_schema_tool: GetContentTypeSchema,
    pub(super) get_example_tool: GetExample,
    pub(super) graphql_query_tool: GraphQLQuery,
    pub(super) smart_search_tool: SmartSearch,
    pub(super) build_search_query_tool: BuildSearchQuery,
    pub(super) cancellation_token: CancellationToken,
}

impl Running {
    pub(super) fn new(
        resolver: ContentTypeResolver,
        default_search_limit: u32,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self {
            list_content_types_tool: ListContentTypes::new(resolver.clone()),
            get_content_type_schema_tool: GetContentTypeSchema::new(resolver.clone()),
            get_example_tool: GetExample::new(resolver.clone()),
            graphql_query_tool: GraphQLQuery::new(resolver.clone()),
            smart_search_tool: SmartSearch::new(resolver.clone(), default_search_limit),
            build_search_query_tool: BuildSearchQuery::new(resolver.clone()),
            resolver,
            cancellation_token,
        }
    }

    fn list_tools_impl(&self) -> ListToolsResult {
        ListToolsResult {
            meta: None,
            next_cursor: None,
            tools: vec![
                self.list_content_types_tool.tool.clone(),
                self.get_content_type_schema_tool.tool.clone(),
                self.get_example_tool.tool.clone(),
                self.graphql_query_tool.tool.clone(),
                self.smart_search_tool.tool.clone(),
                self.build_search_query_tool.tool.clone(),
            ],
        }
    }

    async fn call_tool_impl(
        &self,
        request: CallToolRequestParam,
    ) -> Result<CallToolResult, McpError> {
        let tool_name = request.name.clone();
        let result = match tool_name.as_ref() {
            LIST_CONTENT_TYPES_TOOL_NAME => {
                self.list_content_types_tool
                    .execute(convert_arguments(request)?)
                    .await
            }
            GET_CONTENT_TYPE_SCHEMA_TOOL_NAME => {
                self.get_content_type_schema_tool
                    .execute(convert_arguments(request)?)
                    .await
            }
            GET_EXAMPLE_TOOL_NAME => {
                self.get_example_tool
                    .execute(convert_arguments(request)?)
                    .await
            }
            GRAPHQL_QUERY_TOOL_NAME => {
                self.graphql_query_tool
                    .execute(convert_arguments(request)?)
                    .await
            }
            SMART_SEARCH_TOOL_NAME => {
                self.smart_search_tool
                    .execute(convert_arguments(request)?)
                    .await
            }
            BUILD_SEARCH_QUERY_TOOL_NAME => {
                self.build_search_query_tool
                    .execute(convert_arguments(request)?)
                    .await
            }
            _ => return Err(tool_not_found(&tool_name)),
        };

        internal_error_as_result(&tool_name, result)
    }
}

impl ServerHandler for Running {
    #[tracing::instrument(skip_all, fields(tool_name = request.name.as_ref(), request_id = %context.id.clone()))]
    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.call_tool_impl(request).await
    }

    #[tracing::instrument(skip_all)]
    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(self.list_tools_impl())
    }

    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "Contentful MCP Server".to_string(),
                description: None,
                icons: None,
                title: Some("Contentful MCP Server".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                website_url: None,
            },
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
                ..Default::default()
            },
            instructions: Some(INSTRUCTIONS.to_string()),
            ..Default::default()
        }
    }
}

fn tool_not_found(name: &str) -> McpError {
    McpError::new(
        ErrorCode::METHOD_NOT_FOUND,
        format!("Tool {name} not found"),
        None,
    )
}

fn convert_arguments<T: serde::de::DeserializeOwned>(
    arguments: CallToolRequestParam,
) -> Result<T, McpError> {
    serde_json::from_value(Value::Object(arguments.arguments.unwrap_or_default())).map_err(|e| {
        McpError::new(
            ErrorCode::INVALID_PARAMS,
            format!("Invalid input: {e}"),
            None,
        )
    })
}

/// Unexpected failures inside a tool are reported to the caller as a tool
/// error rather than a protocol error.
fn internal_error_as_result(
    tool_name: &str,
    result: Result<CallToolResult, McpError>,
) -> Result<CallToolResult, McpError> {
    match result {
        Err(e) if e.code == ErrorCode::INTERNAL_ERROR => {
            error!("Tool {tool_name} failed: {}", e.message);
            Ok(CallToolResult::error(vec![Content::text(format!(
                "Error: {}",
                e.message
            ))]))
        }
        other => other,
    }
}
