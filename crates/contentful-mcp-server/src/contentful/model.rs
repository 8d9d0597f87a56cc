use serde::{Deserialize, Serialize};

/// Contentful suffixes the list wrapper of every content type with this
pub const COLLECTION_SUFFIX: &str = "Collection";

/// A content type as discovered from the root query fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentTypeSummary {
    /// Canonical short identifier, e.g. `pageArticle`
    pub name: String,

    /// Root query field returning the collection, e.g. `pageArticleCollection`
    pub query_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ContentTypeSummary {
    /// A summary whose collection field follows the usual `{name}Collection` convention
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            query_name: format!("{name}{COLLECTION_SUFFIX}"),
            name,
            description: None,
        }
    }
}

/// A single field of a content type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Normalized GraphQL type, e.g. `String!` or `[PageArticle]`
    #[serde(rename = "type")]
    pub type_name: String,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            type_name: type_name.into(),
        }
    }
}

/// The field listing of one GraphQL type, in introspection order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentTypeSchema {
    /// The GraphQL type name the fields were read from
    pub content_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub fields: Vec<FieldDescriptor>,
}

impl ContentTypeSchema {
    pub fn new(content_type: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            content_type: content_type.into(),
            description: None,
            fields,
        }
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}
