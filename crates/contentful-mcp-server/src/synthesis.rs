//! Build GraphQL documents from cached content-type schemas.
//!
//! Nothing here touches the network: every document is derived from a
//! [`ContentTypeSchema`] alone.

mod example;
mod search;

pub use example::example_query;
pub use search::{SearchQuery, build_search_query, build_smart_search_query, searchable_fields};

use crate::contentful::{COLLECTION_SUFFIX, ContentTypeSchema};
use crate::resolver::{lower_first, upper_first};

/// A failure to synthesize a query
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SynthesisError {
    #[error(
        "No searchable text fields found for content type '{content_type}'{}. Available fields: {}",
        requested_note(.requested),
        .available.join(", ")
    )]
    NoSearchableFields {
        content_type: String,
        requested: Option<Vec<String>>,
        available: Vec<String>,
    },
}

fn requested_note(requested: &Option<Vec<String>>) -> String {
    requested
        .as_ref()
        .map(|fields| format!(" among the requested fields ({})", fields.join(", ")))
        .unwrap_or_default()
}

/// The type name with any `Collection` suffix removed
pub(crate) fn base_name(type_name: &str) -> &str {
    type_name.strip_suffix(COLLECTION_SUFFIX).unwrap_or(type_name)
}

/// The root query field listing entries of a type, e.g. `pageArticleCollection`
pub fn collection_field_name(type_name: &str) -> String {
    format!("{}{COLLECTION_SUFFIX}", lower_first(base_name(type_name)))
}

/// The root query field fetching one entry of a type, e.g. `pageArticle`
pub fn single_field_name(type_name: &str) -> String {
    lower_first(base_name(type_name))
}

/// The operation name prefix for a type, e.g. `PageArticle`
pub(crate) fn operation_stem(schema: &ContentTypeSchema) -> String {
    upper_first(base_name(&schema.content_type))
}

/// The named type behind a normalized type string, e.g. `Author` for `[Author!]!`
pub(crate) fn leaf_type_name(type_name: &str) -> &str {
    type_name.trim_matches(|c| c == '[' || c == ']' || c == '!')
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("PageArticle", "pageArticleCollection", "pageArticle")]
    #[case("pageArticle", "pageArticleCollection", "pageArticle")]
    #[case("ArticleCollection", "articleCollection", "article")]
    fn root_field_names(#[case] type_name: &str, #[case] collection: &str, #[case] single: &str) {
        assert_eq!(collection_field_name(type_name), collection);
        assert_eq!(single_field_name(type_name), single);
    }

    #[rstest]
    #[case("Author", "Author")]
    #[case("[Author]", "Author")]
    #[case("[Author!]!", "Author")]
    fn leaf_types(#[case] type_name: &str, #[case] leaf: &str) {
        assert_eq!(leaf_type_name(type_name), leaf);
    }

    #[test]
    fn error_lists_available_fields() {
        let error = SynthesisError::NoSearchableFields {
            content_type: "Asset".to_string(),
            requested: Some(vec!["width".to_string()]),
            available: vec!["width".to_string(), "height".to_string()],
        };
        assert_eq!(
            error.to_string(),
            "No searchable text fields found for content type 'Asset' among the requested fields (width). Available fields: width, height"
        );
    }
}
