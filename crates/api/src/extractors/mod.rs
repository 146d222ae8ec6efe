//! Custom request extractors.

pub mod json;
pub mod query;

pub use json::ApiJson;
pub use query::ApiQuery;
