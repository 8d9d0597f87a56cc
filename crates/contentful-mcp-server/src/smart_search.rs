//! Full-text search fanned out across every cached content type.

use futures::future::join_all;
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use crate::contentful::{ContentTypeSummary, ContentfulClient, FetchError};
use crate::metadata_cache::MetadataCache;
use crate::resolver::candidate_names;
use crate::synthesis::{SearchQuery, build_smart_search_query};

pub const DEFAULT_SEARCH_LIMIT: u32 = 5;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error(
        "Smart search requires cached metadata, which is not available yet. Try again once the content types have been loaded."
    )]
    CacheUnavailable,
}

/// Matching entries of one content type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub content_type: String,
    /// `id` plus the value of every searched field
    pub items: Vec<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartSearchReport {
    pub query: String,
    pub results: Vec<SearchResult>,
    pub total_content_types_searched: usize,
    pub content_types_with_results: usize,
}

/// Search `term` in every cached content type, or only those named in `content_types`.
///
/// Types without searchable fields are skipped without a request. A failing
/// type contributes no result. Results follow the order of the cached
/// content-type list.
#[tracing::instrument(skip(cache, client))]
pub async fn smart_search(
    cache: &MetadataCache,
    client: &ContentfulClient,
    term: &str,
    content_types: Option<&[String]>,
    limit: u32,
) -> Result<SmartSearchReport, SearchError> {
    if !cache.is_available() {
        return Err(SearchError::CacheUnavailable);
    }
    let Some(summaries) = cache.content_types() else {
        return Err(SearchError::CacheUnavailable);
    };

    let targets: Vec<ContentTypeSummary> = summaries
        .into_iter()
        .filter(|summary| content_types.is_none_or(|names| is_requested(summary, names)))
        .collect();

    let searches = targets
        .iter()
        .map(|summary| search_content_type(cache, client, summary, term, limit));
    let results: Vec<SearchResult> = join_all(searches).await.into_iter().flatten().collect();

    Ok(SmartSearchReport {
        query: term.to_string(),
        total_content_types_searched: targets.len(),
        content_types_with_results: results.len(),
        results,
    })
}

/// Whether one of `names` designates `summary`: its name, its query field, or
/// the GraphQL type name of either.
fn is_requested(summary: &ContentTypeSummary, names: &[String]) -> bool {
    let candidates = candidate_names(&summary.name);
    names
        .iter()
        .any(|name| *name == summary.query_name || candidates.contains(name))
}

async fn search_content_type(
    cache: &MetadataCache,
    client: &ContentfulClient,
    summary: &ContentTypeSummary,
    term: &str,
    limit: u32,
) -> Option<SearchResult> {
    let Some(schema) = cache.lookup(&summary.name) else {
        debug!("No cached schema for {}, skipping", summary.name);
        return None;
    };
    let query = match build_smart_search_query(&schema, &summary.query_name) {
        Ok(query) => query,
        Err(error) => {
            debug!("Skipping {}: {error}", summary.name);
            return None;
        }
    };

    match run_search(client, &query, term, limit).await {
        Ok(items) if items.is_empty() => None,
        Ok(items) => Some(SearchResult {
            content_type: summary.name.clone(),
            items,
        }),
        Err(error) => {
            warn!("Search in content type {} failed: {error}", summary.name);
            None
        }
    }
}

async fn run_search(
    client: &ContentfulClient,
    query: &SearchQuery,
    term: &str,
    limit: u32,
) -> Result<Vec<Map<String, Value>>, FetchError> {
    let response = client
        .execute(
            &query.document,
            Some(json!({ "searchTerm": term, "limit": limit })),
        )
        .await?;

    if let Some(errors) = response.get("errors").and_then(Value::as_array)
        && !errors.is_empty()
    {
        let errors = serde_json::from_value(Value::Array(errors.clone()))
            .map_err(|e| FetchError::Response(e.to_string()))?;
        return Err(FetchError::GraphQL(errors));
    }

    let items = response
        .pointer(&format!("/data/{}/items", query.collection_field))
        .and_then(Value::as_array)
        .ok_or_else(|| FetchError::Response(format!("missing {} items", query.collection_field)))?;

    Ok(items
        .iter()
        .filter_map(Value::as_object)
        .map(|item| {
            let mut entry = Map::new();
            entry.insert(
                "id".to_string(),
                item.get("sys")
                    .and_then(|sys| sys.get("id"))
                    .cloned()
                    .unwrap_or(Value::Null),
            );
            for field in &query.searched_fields {
                entry.insert(
                    field.clone(),
                    item.get(field).cloned().unwrap_or(Value::Null),
                );
            }
            entry
        })
        .collect())
}
