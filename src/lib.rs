//! Delete-to-canonical-query compilation for a document database with
//! time-series collections.
//!
//! The entry point is [`delete::DeleteCompiler`], which validates a
//! [`delete::DeleteRequest`] against delete-specific invariants, resolves
//! collation, and either takes the identifier fast path or canonicalizes
//! the predicate into a [`query::CanonicalQuery`]. Deletes on time-series
//! collections first decompose the user predicate into a bucket-level
//! filter and a residual filter (see [`timeseries::split`]); the
//! bucket-level filter is guaranteed never to discard a bucket that could
//! hold a matching record.

pub mod catalog;
pub mod config;
pub mod delete;
pub mod error;
pub mod query;
pub mod timeseries;

pub use catalog::{CollectionOptions, Document, Namespace, TimeseriesOptions, Value};
pub use config::TideConfig;
pub use delete::{DeleteCompiler, DeleteRequest, YieldPolicy};
pub use error::{TideError, TideErrorCode};
pub use query::{CanonicalQuery, Expr, QueryError};
pub use timeseries::TimeseriesWriteQueryExprs;
