//! Access to a Contentful space through its GraphQL Content API.

mod client;
pub mod error;
mod model;
mod queries;

pub use client::{ContentfulClient, DEFAULT_ENDPOINT, DEFAULT_ENVIRONMENT, DEFAULT_REQUEST_TIMEOUT};
pub use error::{FetchError, GraphQLError};
pub use model::{COLLECTION_SUFFIX, ContentTypeSchema, ContentTypeSummary, FieldDescriptor};

#[cfg(test)]
pub(crate) use client::test_support;
