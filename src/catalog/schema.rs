use crate::query::collation::CollationSpec;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Namespace {
    pub db: String,
    pub coll: String,
}

impl Namespace {
    pub fn new(db: impl Into<String>, coll: impl Into<String>) -> Self {
        Self {
            db: db.into(),
            coll: coll.into(),
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.db, self.coll)
    }
}

/// Storage-level options of a time-series collection. Records are grouped
/// into buckets keyed by the metadata field; each bucket carries min/max
/// summaries of every measurement field it contains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeseriesOptions {
    pub time_field: String,
    pub meta_field: Option<String>,
    pub bucket_max_span_seconds: u32,
}

impl TimeseriesOptions {
    pub fn new(time_field: impl Into<String>) -> Self {
        Self {
            time_field: time_field.into(),
            meta_field: None,
            bucket_max_span_seconds: 3600,
        }
    }

    pub fn with_meta_field(mut self, meta_field: impl Into<String>) -> Self {
        self.meta_field = Some(meta_field.into());
        self
    }

    pub fn with_bucket_max_span_seconds(mut self, seconds: u32) -> Self {
        self.bucket_max_span_seconds = seconds;
        self
    }
}

/// The collection handle the delete compiler borrows. The caller holds a
/// stabilizing snapshot of the collection for the compiler's whole lifetime,
/// so these options cannot change mid-compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionOptions {
    pub namespace: Namespace,
    pub default_collation: Option<CollationSpec>,
    pub timeseries: Option<TimeseriesOptions>,
}

impl CollectionOptions {
    pub fn new(namespace: Namespace) -> Self {
        Self {
            namespace,
            default_collation: None,
            timeseries: None,
        }
    }

    pub fn with_default_collation(mut self, collation: CollationSpec) -> Self {
        self.default_collation = Some(collation);
        self
    }

    pub fn with_timeseries(mut self, options: TimeseriesOptions) -> Self {
        self.timeseries = Some(options);
        self
    }

    pub fn is_timeseries(&self) -> bool {
        self.timeseries.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::{CollectionOptions, Namespace, TimeseriesOptions};

    #[test]
    fn namespace_display_is_db_dot_coll() {
        let ns = Namespace::new("metrics", "weather");
        assert_eq!(ns.to_string(), "metrics.weather");
    }

    #[test]
    fn timeseries_options_builder_defaults() {
        let opts = TimeseriesOptions::new("ts").with_meta_field("m");
        assert_eq!(opts.time_field, "ts");
        assert_eq!(opts.meta_field.as_deref(), Some("m"));
        assert_eq!(opts.bucket_max_span_seconds, 3600);
    }

    #[test]
    fn collection_is_timeseries_only_with_options() {
        let ns = Namespace::new("metrics", "weather");
        let plain = CollectionOptions::new(ns.clone());
        assert!(!plain.is_timeseries());
        let ts = CollectionOptions::new(ns).with_timeseries(TimeseriesOptions::new("ts"));
        assert!(ts.is_timeseries());
    }
}
