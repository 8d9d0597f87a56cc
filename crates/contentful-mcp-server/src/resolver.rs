//! Resolve a user-supplied content-type name to its schema.

use std::sync::Arc;

use tracing::debug;

use crate::contentful::{COLLECTION_SUFFIX, ContentTypeSchema, ContentfulClient, FetchError};
use crate::metadata_cache::MetadataCache;

/// The type names tried, in order, when looking up `name`.
///
/// The name itself comes first, then its collection type, then both again with
/// the first letter upper-cased. Duplicates are dropped.
///
/// ```
/// use contentful_mcp_server::resolver::candidate_names;
///
/// assert_eq!(candidate_names("Article"), ["Article", "ArticleCollection"]);
/// assert_eq!(
///     candidate_names("blogPost"),
///     ["blogPost", "blogPostCollection", "BlogPost", "BlogPostCollection"]
/// );
/// ```
pub fn candidate_names(name: &str) -> Vec<String> {
    let capitalized = upper_first(name);
    let mut candidates = Vec::with_capacity(4);
    for base in [name, capitalized.as_str()] {
        for candidate in [base.to_string(), with_collection_suffix(base)] {
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
    }
    candidates
}

fn with_collection_suffix(name: &str) -> String {
    if name.ends_with(COLLECTION_SUFFIX) {
        name.to_string()
    } else {
        format!("{name}{COLLECTION_SUFFIX}")
    }
}

pub(crate) fn upper_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub(crate) fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Content type '{name}' not found (tried: {})", .tried.join(", "))]
    NotFound { name: String, tried: Vec<String> },

    #[error(transparent)]
    Fetch(FetchError),
}

/// A resolved schema and whether it came from the cache
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub schema: ContentTypeSchema,
    pub cached: bool,
}

/// Looks a content type up in the cache first and falls back to live
/// introspection.
#[derive(Clone)]
pub struct ContentTypeResolver {
    cache: Arc<MetadataCache>,
    client: ContentfulClient,
    use_cache: bool,
}

impl ContentTypeResolver {
    pub fn new(cache: Arc<MetadataCache>, client: ContentfulClient) -> Self {
        Self {
            cache,
            client,
            use_cache: true,
        }
    }

    /// A resolver for another space or environment.
    ///
    /// The cache only describes the configured target, so it is bypassed when
    /// the override points anywhere else.
    pub fn for_target(&self, space_id: Option<String>, environment_id: Option<String>) -> Self {
        let client = self.client.with_target(space_id, environment_id);
        Self {
            use_cache: self.use_cache && client.same_target(&self.client),
            cache: self.cache.clone(),
            client,
        }
    }

    pub fn cache(&self) -> &Arc<MetadataCache> {
        &self.cache
    }

    pub fn client(&self) -> &ContentfulClient {
        &self.client
    }

    /// Whether lookups may be answered from the cache
    pub fn uses_cache(&self) -> bool {
        self.use_cache
    }

    pub async fn resolve(&self, name: &str) -> Result<Resolved, ResolveError> {
        if self.use_cache
            && let Some(schema) = self.cache.lookup(name)
        {
            debug!("Resolved {name} as {} from cache", schema.content_type);
            return Ok(Resolved {
                schema,
                cached: true,
            });
        }

        match self.client.discover_type_fields(name).await {
            Ok(schema) => Ok(Resolved {
                schema,
                cached: false,
            }),
            Err(FetchError::TypeNotFound { tried }) => Err(ResolveError::NotFound {
                name: name.to_string(),
                tried,
            }),
            Err(error) => Err(ResolveError::Fetch(error)),
        }
    }
}
