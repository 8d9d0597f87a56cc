//! Process-wide cache of introspected content-type metadata.
//!
//! One [`MetadataCache`] is created by the server and shared by every tool.
//! It is refreshed as a whole by [`MetadataCache::load`], either on demand or
//! from the task started with [`MetadataCache::spawn_refresh`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use apollo_compiler::Schema;
use apollo_compiler::validation::Valid;
use chrono::{DateTime, Utc};
use futures::StreamExt as _;
use futures::stream::FuturesUnordered;
use parking_lot::RwLock;
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::contentful::{ContentTypeSchema, ContentTypeSummary, ContentfulClient};
use crate::resolver::candidate_names;

const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Default)]
struct CacheState {
    content_types: Option<Vec<ContentTypeSummary>>,
    schemas: HashMap<String, ContentTypeSchema>,
    graphql_schema: Option<Arc<Valid<Schema>>>,
    last_update: Option<DateTime<Utc>>,
}

impl CacheState {
    fn is_available(&self) -> bool {
        self.content_types.is_some() && !self.schemas.is_empty()
    }
}

/// A read-only snapshot of the cache's state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatus {
    pub available: bool,
    pub content_types_count: usize,
    pub schemas_count: usize,
    pub last_update: Option<DateTime<Utc>>,
}

/// Cached content types, their field schemas and a snapshot of the whole
/// GraphQL schema.
///
/// Every accessor takes the lock for a single read or write and never across an
/// await, so a refresh in progress is observed key by key: each schema entry
/// is either the previous one or the new one.
#[derive(Default)]
pub struct MetadataCache {
    state: RwLock<CacheState>,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discover content types and load their schemas into the cache.
    ///
    /// A failed discovery leaves the cache untouched. Individual schemas that
    /// fail to load are skipped.
    #[tracing::instrument(skip_all, fields(space = ?client.space_id(), environment = client.environment_id()))]
    pub async fn load(&self, client: &ContentfulClient) {
        let content_types = match client.discover_content_types().await {
            Ok(content_types) => content_types,
            Err(error) => {
                error!("Failed to discover content types, keeping current metadata: {error}");
                return;
            }
        };
        debug!("Discovered {} content types", content_types.len());
        self.set_content_types(content_types.clone());

        let schemas = async {
            let mut pending = content_types
                .iter()
                .map(|content_type| async move {
                    (
                        content_type.name.as_str(),
                        client.discover_type_fields(&content_type.name).await,
                    )
                })
                .collect::<FuturesUnordered<_>>();

            let mut loaded = 0;
            while let Some((name, result)) = pending.next().await {
                match result {
                    Ok(schema) => {
                        self.insert_schema(schema);
                        loaded += 1;
                    }
                    Err(error) => warn!("Failed to load schema for content type {name}: {error}"),
                }
            }
            loaded
        };

        let graphql_schema = async {
            match client.fetch_schema().await {
                Ok(introspection) => Some(introspection.to_schema()),
                Err(error) => {
                    warn!("Failed to introspect GraphQL schema: {error}");
                    None
                }
            }
        };

        let (loaded, graphql_schema) = tokio::join!(schemas, graphql_schema);
        if let Some(graphql_schema) = graphql_schema {
            self.set_graphql_schema(graphql_schema);
        }
        self.state.write().last_update = Some(Utc::now());

        info!(
            "Loaded {loaded} of {} content type schemas",
            content_types.len()
        );
    }

    /// Reload the cache every `interval` until `cancellation_token` is cancelled.
    /// The first load starts immediately.
    pub fn spawn_refresh(
        self: Arc<Self>,
        client: ContentfulClient,
        interval: Duration,
        cancellation_token: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval.max(MIN_REFRESH_INTERVAL));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancellation_token.cancelled() => {
                        debug!("Stopping metadata refresh");
                        break;
                    }
                    _ = ticker.tick() => self.load(&client).await,
                }
            }
        })
    }

    /// The content-type list is present and at least one schema is loaded
    pub fn is_available(&self) -> bool {
        self.state.read().is_available()
    }

    pub fn status(&self) -> CacheStatus {
        let state = self.state.read();
        CacheStatus {
            available: state.is_available(),
            content_types_count: state.content_types.as_ref().map_or(0, Vec::len),
            schemas_count: state.schemas.len(),
            last_update: state.last_update,
        }
    }

    pub fn clear(&self) {
        *self.state.write() = CacheState::default();
    }

    pub fn content_types(&self) -> Option<Vec<ContentTypeSummary>> {
        self.state.read().content_types.clone()
    }

    /// The schema stored under exactly `name`
    pub fn schema(&self, name: &str) -> Option<ContentTypeSchema> {
        self.state.read().schemas.get(name).cloned()
    }

    /// The first cached schema matching one of the candidate names for `name`.
    /// Always misses while the cache is unavailable.
    pub fn lookup(&self, name: &str) -> Option<ContentTypeSchema> {
        let state = self.state.read();
        if !state.is_available() {
            return None;
        }
        candidate_names(name)
            .iter()
            .find_map(|candidate| state.schemas.get(candidate).cloned())
    }

    /// The last successfully introspected GraphQL schema
    pub fn graphql_schema(&self) -> Option<Arc<Valid<Schema>>> {
        self.state.read().graphql_schema.clone()
    }

    pub fn set_content_types(&self, content_types: Vec<ContentTypeSummary>) {
        self.state.write().content_types = Some(content_types);
    }

    /// Store a schema under its own type name
    pub fn insert_schema(&self, schema: ContentTypeSchema) {
        self.state
            .write()
            .schemas
            .insert(schema.content_type.clone(), schema);
    }

    pub fn set_graphql_schema(&self, schema: Valid<Schema>) {
        self.state.write().graphql_schema = Some(Arc::new(schema));
    }
}

#[cfg(test)]
mod tests {
    use mockito::ServerGuard;
    use serde_json::{Value, json};

    use super::*;
    use crate::contentful::FieldDescriptor;
    use crate::contentful::test_support::*;

    fn collection_field(name: &str) -> Value {
        json!({
            "name": format!("{name}Collection"),
            "description": null,
            "type": { "kind": "OBJECT", "name": format!("{name}Collection"), "ofType": null }
        })
    }

    async fn mock_space(server: &mut ServerGuard) -> Vec<mockito::Mock> {
        vec![
            mock_operation(
                server,
                "DiscoverContentTypes",
                json!({ "data": { "__schema": { "queryType": { "fields": [
                    collection_field("pageArticle"),
                    collection_field("topicCategory"),
                ] } } } }),
            )
            .await,
            mock_type_fields(
                server,
                "pageArticle",
                json!({
                    "t0": null,
                    "t1": null,
                    "t2": { "name": "PageArticle", "description": null, "fields": [string_field("title"), string_field("slug")] },
                    "t3": null
                }),
            )
            .await,
            mock_type_fields(
                server,
                "topicCategory",
                json!({
                    "t0": null,
                    "t1": null,
                    "t2": { "name": "TopicCategory", "description": "Topics", "fields": [string_field("name")] },
                    "t3": null
                }),
            )
            .await,
        ]
    }

    #[tokio::test]
    async fn load_populates_content_types_and_schemas() {
        let mut server = mockito::Server::new_async().await;
        let _mocks = mock_space(&mut server).await;
        let cache = MetadataCache::new();

        cache.load(&client_for(&server)).await;

        let status = cache.status();
        assert!(status.available);
        assert_eq!(status.content_types_count, 2);
        assert_eq!(status.schemas_count, 2);
        assert!(status.last_update.is_some());
        assert_eq!(
            cache.content_types().unwrap(),
            vec![
                ContentTypeSummary::new("pageArticle"),
                ContentTypeSummary::new("topicCategory")
            ]
        );
        assert_eq!(
            cache.lookup("pageArticle").unwrap().field_names(),
            vec!["title", "slug"]
        );
        assert!(cache.schema("TopicCategory").is_some());
    }

    #[tokio::test]
    async fn repeated_loads_produce_the_same_snapshot() {
        let mut server = mockito::Server::new_async().await;
        let _mocks = mock_space(&mut server).await;
        let client = client_for(&server);
        let cache = MetadataCache::new();

        cache.clear();
        cache.load(&client).await;
        let first = cache.status();
        cache.load(&client).await;
        let second = cache.status();

        assert_eq!(first.content_types_count, second.content_types_count);
        assert_eq!(first.schemas_count, second.schemas_count);
        assert_eq!(first.available, second.available);
    }

    #[tokio::test]
    async fn failed_discovery_keeps_the_previous_cache() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", API_PATH)
            .with_status(500)
            .with_body("unavailable")
            .create_async()
            .await;
        let cache = MetadataCache::new();
        cache.set_content_types(vec![ContentTypeSummary::new("pageArticle")]);
        cache.insert_schema(ContentTypeSchema::new(
            "pageArticle",
            vec![FieldDescriptor::new("title", "String")],
        ));

        cache.load(&client_for(&server)).await;

        let status = cache.status();
        assert!(status.available);
        assert_eq!(status.schemas_count, 1);
        assert_eq!(status.last_update, None);
    }

    #[tokio::test]
    async fn failed_schema_is_skipped() {
        let mut server = mockito::Server::new_async().await;
        let _discovery = mock_operation(
            &mut server,
            "DiscoverContentTypes",
            json!({ "data": { "__schema": { "queryType": { "fields": [
                collection_field("pageArticle"),
                collection_field("legacyThing"),
            ] } } } }),
        )
        .await;
        let _article = mock_type_fields(
            &mut server,
            "pageArticle",
            json!({ "t0": { "name": "pageArticle", "description": null, "fields": [string_field("title")] } }),
        )
        .await;
        let _legacy = mock_type_fields(
            &mut server,
            "legacyThing",
            json!({ "t0": null, "t1": null, "t2": null, "t3": null }),
        )
        .await;
        let cache = MetadataCache::new();

        cache.load(&client_for(&server)).await;

        let status = cache.status();
        assert!(status.available);
        assert_eq!(status.content_types_count, 2);
        assert_eq!(status.schemas_count, 1);
    }

    #[tokio::test]
    async fn introspected_schema_is_kept_for_validation() {
        let mut server = mockito::Server::new_async().await;
        let _mocks = mock_space(&mut server).await;
        let _introspection = mock_operation(
            &mut server,
            "IntrospectionQuery",
            json!({ "data": { "__schema": {
                "queryType": { "name": "Query" },
                "types": [
                    { "kind": "OBJECT", "name": "Query", "interfaces": [], "fields": [
                        { "name": "hello", "args": [], "type": { "kind": "SCALAR", "name": "String" } }
                    ] }
                ],
                "directives": []
            } } }),
        )
        .await;
        let cache = MetadataCache::new();

        cache.load(&client_for(&server)).await;

        let schema = cache.graphql_schema().unwrap();
        assert!(schema.get_object("Query").is_some());
    }

    #[test]
    fn content_types_without_schemas_are_not_available() {
        let cache = MetadataCache::new();
        assert!(!cache.is_available());

        cache.set_content_types(vec![ContentTypeSummary::new("pageArticle")]);
        assert!(!cache.is_available());
        assert!(cache.lookup("pageArticle").is_none());

        cache.insert_schema(ContentTypeSchema::new("pageArticle", vec![]));
        assert!(cache.is_available());
    }

    #[test]
    fn clear_resets_everything() {
        let cache = MetadataCache::new();
        cache.set_content_types(vec![ContentTypeSummary::new("pageArticle")]);
        cache.insert_schema(ContentTypeSchema::new("pageArticle", vec![]));

        cache.clear();

        assert_eq!(
            cache.status(),
            CacheStatus {
                available: false,
                content_types_count: 0,
                schemas_count: 0,
                last_update: None,
            }
        );
        assert!(cache.content_types().is_none());
    }

    #[tokio::test]
    async fn refresh_task_loads_immediately_and_stops_on_cancel() {
        let mut server = mockito::Server::new_async().await;
        let _mocks = mock_space(&mut server).await;
        let cache = Arc::new(MetadataCache::new());
        let cancellation_token = CancellationToken::new();

        let handle = cache.clone().spawn_refresh(
            client_for(&server),
            Duration::from_secs(300),
            cancellation_token.clone(),
        );

        tokio::time::timeout(Duration::from_secs(5), async {
            while !cache.is_available() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();

        cancellation_token.cancel();
        handle.await.unwrap();
        assert_eq!(cache.status().schemas_count, 2);
    }
}
