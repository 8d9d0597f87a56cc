use std::fmt;

use super::{SynthesisError, collection_field_name, operation_stem};
use crate::contentful::{ContentTypeSchema, FieldDescriptor};
use crate::introspection::{is_scalar, is_searchable_text};

const SEARCH_LIMIT: u32 = 10;

/// A synthesized full-text search operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub operation_name: String,
    /// The root collection field the search runs against
    pub collection_field: String,
    /// Fields matched with `_contains`, in schema order
    pub searched_fields: Vec<String>,
    pub document: String,
}

/// The fields of `schema` that support `_contains`, optionally restricted to `allow_list`.
pub fn searchable_fields<'a>(
    schema: &'a ContentTypeSchema,
    allow_list: Option<&[String]>,
) -> Result<Vec<&'a FieldDescriptor>, SynthesisError> {
    let fields: Vec<_> = schema
        .fields
        .iter()
        .filter(|field| is_searchable_text(&field.type_name))
        .filter(|field| allow_list.is_none_or(|allowed| allowed.contains(&field.name)))
        .collect();

    if fields.is_empty() {
        return Err(SynthesisError::NoSearchableFields {
            content_type: schema.content_type.clone(),
            requested: allow_list.map(<[String]>::to_vec),
            available: schema.fields.iter().map(|f| f.name.clone()).collect(),
        });
    }
    Ok(fields)
}

/// A parametrized search over every searchable field, taking `$searchTerm`.
///
/// Items select `sys.id` and every scalar field of the type.
pub fn build_search_query(
    schema: &ContentTypeSchema,
    allow_list: Option<&[String]>,
) -> Result<SearchQuery, SynthesisError> {
    let fields = searchable_fields(schema, allow_list)?;
    let selection: Vec<&str> = schema
        .fields
        .iter()
        .filter(|field| is_scalar(&field.type_name))
        .map(|field| field.name.as_str())
        .collect();

    let operation_name = format!("Search{}", operation_stem(schema));
    let collection_field = collection_field_name(&schema.content_type);
    let document = SearchDocument {
        signature: &format!("{operation_name}($searchTerm: String!)"),
        collection_field: &collection_field,
        searched: &fields,
        limit: &SEARCH_LIMIT.to_string(),
        selection: &selection,
    }
    .to_string();

    Ok(SearchQuery {
        operation_name,
        collection_field,
        searched_fields: fields.iter().map(|f| f.name.clone()).collect(),
        document,
    })
}

/// The per-type query run by smart search, taking `$searchTerm` and `$limit`.
///
/// Items select `sys.id` and the searchable fields only.
pub fn build_smart_search_query(
    schema: &ContentTypeSchema,
    collection_field: &str,
) -> Result<SearchQuery, SynthesisError> {
    let fields = searchable_fields(schema, None)?;
    let selection: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();

    let operation_name = format!("SmartSearch{}", operation_stem(schema));
    let document = SearchDocument {
        signature: &format!("{operation_name}($searchTerm: String!, $limit: Int!)"),
        collection_field,
        searched: &fields,
        limit: "$limit",
        selection: &selection,
    }
    .to_string();

    Ok(SearchQuery {
        operation_name,
        collection_field: collection_field.to_string(),
        searched_fields: selection.iter().map(|name| name.to_string()).collect(),
        document,
    })
}

/// The text of a search operation
struct SearchDocument<'a> {
    signature: &'a str,
    collection_field: &'a str,
    searched: &'a [&'a FieldDescriptor],
    limit: &'a str,
    selection: &'a [&'a str],
}

impl fmt::Display for SearchDocument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "query {} {{", self.signature)?;
        writeln!(f, "  {}(where: {{ OR: [", self.collection_field)?;
        for (i, field) in self.searched.iter().enumerate() {
            if i > 0 {
                writeln!(f, ",")?;
            }
            write!(f, "    {{ {}_contains: $searchTerm }}", field.name)?;
        }
        writeln!(f)?;
        writeln!(f, "  ] }}, limit: {}) {{", self.limit)?;
        writeln!(f, "    items {{")?;
        writeln!(f, "      sys {{")?;
        writeln!(f, "        id")?;
        writeln!(f, "      }}")?;
        for field in self.selection {
            writeln!(f, "      {field}")?;
        }
        writeln!(f, "    }}")?;
        writeln!(f, "  }}")?;
        write!(f, "}}")
    }
}
