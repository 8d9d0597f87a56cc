//! Classification of introspected GraphQL type references.
//!
//! Field types travel through the rest of the crate as normalized strings
//! (`String`, `String!`, `[PageArticle]`), which is the shape the search and
//! example synthesizers key on. Internally the wrappers are unfolded into a
//! [`TypeShape`] so rendering is a single exhaustive match.

use std::fmt;

use serde::Deserialize;

/// Scalars the classifier treats as leaf values.
const SCALAR_NAMES: [&str; 7] = ["String", "Int", "Float", "Boolean", "ID", "DateTime", "JSON"];

const UNKNOWN_TYPE: &str = "Unknown";

/// The `kind` of an introspected `__Type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
    List,
    NonNull,
    #[serde(other)]
    Other,
}

/// A possibly wrapped type reference as returned by introspection.
///
/// Every member is optional: partial or empty descriptors must still
/// normalize without failing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeRef {
    #[serde(default)]
    pub kind: Option<TypeKind>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub of_type: Option<Box<TypeRef>>,
}

impl TypeRef {
    /// A named leaf reference
    pub fn named(kind: TypeKind, name: impl Into<String>) -> Self {
        Self {
            kind: Some(kind),
            name: Some(name.into()),
            of_type: None,
        }
    }

    /// Wrap this reference in a `LIST`
    pub fn list(self) -> Self {
        Self {
            kind: Some(TypeKind::List),
            name: None,
            of_type: Some(Box::new(self)),
        }
    }

    /// Wrap this reference in a `NON_NULL`
    pub fn non_null(self) -> Self {
        Self {
            kind: Some(TypeKind::NonNull),
            name: None,
            of_type: Some(Box::new(self)),
        }
    }
}

/// A type reference with its wrappers made explicit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeShape {
    Named(String),
    List(Box<TypeShape>),
    NonNull(Box<TypeShape>),
}

impl TypeShape {
    pub fn from_type_ref(type_ref: Option<&TypeRef>) -> Self {
        let Some(type_ref) = type_ref else {
            return TypeShape::Named(UNKNOWN_TYPE.to_string());
        };
        match type_ref.kind {
            Some(TypeKind::NonNull) => TypeShape::NonNull(Box::new(Self::from_type_ref(
                type_ref.of_type.as_deref(),
            ))),
            Some(TypeKind::List) => {
                TypeShape::List(Box::new(Self::from_type_ref(type_ref.of_type.as_deref())))
            }
            _ => TypeShape::Named(
                type_ref
                    .name
                    .clone()
                    .or_else(|| type_ref.of_type.as_ref().and_then(|t| t.name.clone()))
                    .unwrap_or_else(|| UNKNOWN_TYPE.to_string()),
            ),
        }
    }

    /// The named type at the bottom of any wrappers
    pub fn leaf_name(&self) -> &str {
        match self {
            TypeShape::Named(name) => name,
            TypeShape::List(inner) | TypeShape::NonNull(inner) => inner.leaf_name(),
        }
    }
}

impl fmt::Display for TypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeShape::Named(name) => write!(f, "{name}"),
            TypeShape::List(inner) => write!(f, "[{inner}]"),
            TypeShape::NonNull(inner) => write!(f, "{inner}!"),
        }
    }
}

/// Render an introspected type reference as a GraphQL type string.
pub fn normalize_type(type_ref: Option<&TypeRef>) -> String {
    TypeShape::from_type_ref(type_ref).to_string()
}

/// Whether the type string mentions one of the known scalars.
///
/// This is a substring test, so wrapped forms such as `String!` and `[String]`
/// count as scalar too.
pub fn is_scalar(type_name: &str) -> bool {
    SCALAR_NAMES.iter().any(|scalar| type_name.contains(scalar))
}

/// Whether the field supports the `_contains` filter: a nullable, singular `String`.
pub fn is_searchable_text(type_name: &str) -> bool {
    type_name == "String"
}

/// Whether the type points at another entry rather than a value or a collection.
///
/// The empty string is neither scalar nor a collection and so classifies as a
/// reference; it is passed through rather than special-cased.
pub fn is_reference(type_name: &str) -> bool {
    !is_scalar(type_name) && !type_name.contains("Collection") && !type_name.contains("Connection")
}
