pub mod schema;
pub mod types;

pub use schema::{CollectionOptions, Namespace, TimeseriesOptions};
pub use types::{Document, FieldPath, Value};
