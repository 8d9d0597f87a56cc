//! Introspection data model: type classification and schema reconstruction.

pub mod sdl;
pub mod type_ref;

pub use sdl::IntrospectionSchema;
pub use type_ref::{
    TypeKind, TypeRef, TypeShape, is_reference, is_scalar, is_searchable_text, normalize_type,
};
