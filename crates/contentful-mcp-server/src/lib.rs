#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod contentful;
pub mod errors;
pub mod introspection;
pub(crate) mod json_schema;
pub mod metadata_cache;
pub mod resolver;
pub mod server;
pub mod smart_search;
pub mod synthesis;
pub mod tools;
