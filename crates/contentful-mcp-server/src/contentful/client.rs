use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use bon::bon;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use super::error::{FetchError, GraphQLError};
use super::model::{COLLECTION_SUFFIX, ContentTypeSchema, ContentTypeSummary, FieldDescriptor};
use super::queries::{
    CONTENT_TYPES_OPERATION, CONTENT_TYPES_QUERY, INTROSPECTION_OPERATION, INTROSPECTION_QUERY,
    TYPE_FIELDS_OPERATION, type_alias, type_fields_query, type_name_variable,
};
use crate::introspection::{IntrospectionSchema, TypeRef, TypeShape, normalize_type};
use crate::resolver::candidate_names;

/// The Content API base, before the `/spaces/{space}/environments/{environment}` path
pub const DEFAULT_ENDPOINT: &str = "https://graphql.contentful.com/content/v1";

pub const DEFAULT_ENVIRONMENT: &str = "master";

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A client for one space and environment of the Contentful GraphQL Content API.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Clone)]
pub struct ContentfulClient {
    http: reqwest::Client,
    endpoint: Option<Url>,
    space_id: Option<String>,
    environment_id: String,
    access_token: Option<SecretString>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphQLRequest<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    operation_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    variables: Option<Value>,
}

#[derive(Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Option<Vec<GraphQLError>>,
}

#[derive(Deserialize)]
struct SchemaData {
    #[serde(rename = "__schema")]
    schema: IntrospectionSchema,
}

#[derive(Deserialize)]
struct QueryFieldsData {
    #[serde(rename = "__schema")]
    schema: QueryFieldsSchema,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryFieldsSchema {
    query_type: Option<QueryFieldsType>,
}

#[derive(Deserialize)]
struct QueryFieldsType {
    #[serde(default)]
    fields: Vec<IntrospectedField>,
}

#[derive(Deserialize)]
struct IntrospectedType {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    fields: Option<Vec<IntrospectedField>>,
}

#[derive(Deserialize)]
struct IntrospectedField {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(rename = "type")]
    type_ref: TypeRef,
}

#[bon]
impl ContentfulClient {
    #[builder]
    pub fn new(
        endpoint: Option<Url>,
        #[builder(into)] space_id: Option<String>,
        #[builder(into, default = DEFAULT_ENVIRONMENT.to_string())] environment_id: String,
        access_token: Option<SecretString>,
        #[builder(default = DEFAULT_REQUEST_TIMEOUT)] timeout: Duration,
    ) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("contentful-mcp-server/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint,
            space_id,
            environment_id,
            access_token,
        })
    }
}

impl ContentfulClient {
    pub fn space_id(&self) -> Option<&str> {
        self.space_id.as_deref()
    }

    pub fn environment_id(&self) -> &str {
        &self.environment_id
    }

    /// A client for another space or environment, sharing this client's token
    /// and connection pool. `None` keeps the current value.
    pub fn with_target(&self, space_id: Option<String>, environment_id: Option<String>) -> Self {
        Self {
            space_id: space_id.or_else(|| self.space_id.clone()),
            environment_id: environment_id.unwrap_or_else(|| self.environment_id.clone()),
            ..self.clone()
        }
    }

    /// Whether both clients address the same space and environment
    pub fn same_target(&self, other: &ContentfulClient) -> bool {
        self.space_id == other.space_id && self.environment_id == other.environment_id
    }

    /// Run the standard introspection query.
    #[tracing::instrument(skip(self), fields(space = ?self.space_id, environment = %self.environment_id))]
    pub async fn fetch_schema(&self) -> Result<IntrospectionSchema, FetchError> {
        let data: SchemaData = self
            .query(&GraphQLRequest {
                query: INTROSPECTION_QUERY,
                operation_name: Some(INTROSPECTION_OPERATION),
                variables: None,
            })
            .await?;
        Ok(data.schema)
    }

    /// List content types from the root query fields returning collections.
    #[tracing::instrument(skip(self), fields(space = ?self.space_id, environment = %self.environment_id))]
    pub async fn discover_content_types(&self) -> Result<Vec<ContentTypeSummary>, FetchError> {
        let data: QueryFieldsData = self
            .query(&GraphQLRequest {
                query: CONTENT_TYPES_QUERY,
                operation_name: Some(CONTENT_TYPES_OPERATION),
                variables: None,
            })
            .await?;

        let query_type = data
            .schema
            .query_type
            .ok_or_else(|| FetchError::Response("schema has no query type".to_string()))?;

        Ok(query_type
            .fields
            .into_iter()
            .filter(|field| {
                field.name.ends_with(COLLECTION_SUFFIX)
                    || TypeShape::from_type_ref(Some(&field.type_ref))
                        .leaf_name()
                        .ends_with(COLLECTION_SUFFIX)
            })
            .map(|field| ContentTypeSummary {
                name: field
                    .name
                    .strip_suffix(COLLECTION_SUFFIX)
                    .unwrap_or(&field.name)
                    .to_string(),
                description: field.description,
                query_name: field.name,
            })
            .collect())
    }

    /// Read the fields of a type, falling back through the candidate names of
    /// [`candidate_names`] in order. All candidates are asked for in one request.
    #[tracing::instrument(skip(self), fields(space = ?self.space_id, environment = %self.environment_id))]
    pub async fn discover_type_fields(
        &self,
        type_name: &str,
    ) -> Result<ContentTypeSchema, FetchError> {
        let candidates = candidate_names(type_name);
        let query = type_fields_query(candidates.len());
        let variables = candidates
            .iter()
            .enumerate()
            .map(|(i, name)| (type_name_variable(i), Value::String(name.clone())))
            .collect::<Map<_, _>>();

        let mut found: HashMap<String, Option<IntrospectedType>> = self
            .query(&GraphQLRequest {
                query: &query,
                operation_name: Some(TYPE_FIELDS_OPERATION),
                variables: Some(Value::Object(variables)),
            })
            .await?;

        let introspected = (0..candidates.len())
            .find_map(|i| found.remove(&type_alias(i)).flatten())
            .ok_or_else(|| FetchError::TypeNotFound {
                tried: candidates.clone(),
            })?;

        if introspected.name != type_name {
            debug!("Type {type_name} resolved as {}", introspected.name);
        }

        Ok(ContentTypeSchema {
            content_type: introspected.name,
            description: introspected.description,
            fields: introspected
                .fields
                .unwrap_or_default()
                .into_iter()
                .map(|field| FieldDescriptor {
                    type_name: normalize_type(Some(&field.type_ref)),
                    name: field.name,
                    description: field.description,
                })
                .collect(),
        })
    }

    /// Send a caller-supplied operation and return the raw response body.
    ///
    /// Errors inside a successful response are left in the body for the caller
    /// to relay; only transport failures and non-2xx statuses are errors here.
    #[tracing::instrument(skip(self, query, variables), fields(space = ?self.space_id, environment = %self.environment_id))]
    pub async fn execute(&self, query: &str, variables: Option<Value>) -> Result<Value, FetchError> {
        self.post(&GraphQLRequest {
            query,
            operation_name: None,
            variables,
        })
        .await
    }

    async fn query<T: DeserializeOwned>(&self, request: &GraphQLRequest<'_>) -> Result<T, FetchError> {
        let body = self.post(request).await?;
        let response: GraphQLResponse<T> =
            serde_json::from_value(body).map_err(|e| FetchError::Response(e.to_string()))?;

        if let Some(errors) = response.errors.filter(|errors| !errors.is_empty()) {
            return Err(FetchError::GraphQL(errors));
        }
        response
            .data
            .ok_or_else(|| FetchError::Response("missing data".to_string()))
    }

    async fn post(&self, request: &GraphQLRequest<'_>) -> Result<Value, FetchError> {
        let url = self.url()?;
        let token = self.token()?;

        let response = self
            .http
            .post(url)
            .bearer_auth(token.expose_secret())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Http {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }

    fn url(&self) -> Result<String, FetchError> {
        let space_id = self
            .space_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                FetchError::Configuration(
                    "space id (set CONTENTFUL_SPACE_ID or pass spaceId)".to_string(),
                )
            })?;
        let base = self
            .endpoint
            .as_ref()
            .map(Url::as_str)
            .unwrap_or(DEFAULT_ENDPOINT)
            .trim_end_matches('/');

        Ok(format!(
            "{base}/spaces/{space_id}/environments/{}",
            self.environment_id
        ))
    }

    fn token(&self) -> Result<&SecretString, FetchError> {
        self.access_token
            .as_ref()
            .filter(|token| !token.expose_secret().is_empty())
            .ok_or_else(|| {
                FetchError::Configuration(
                    "access token (set CONTENTFUL_ACCESS_TOKEN)".to_string(),
                )
            })
    }
}

impl fmt::Debug for ContentfulClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentfulClient")
            .field("endpoint", &self.endpoint)
            .field("space_id", &self.space_id)
            .field("environment_id", &self.environment_id)
            .finish_non_exhaustive()
    }
}
