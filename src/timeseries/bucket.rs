use crate::catalog::schema::TimeseriesOptions;
use crate::catalog::types::{Document, FieldPath, Value};
use crate::query::expr::Expr;
use crate::query::matcher::matches_document;

/// Bucket metadata field layout. A bucket document carries the shared
/// metadata value under `meta` and, for every measurement field `x` it
/// contains, summary bounds under `control.min.x` / `control.max.x`.
pub const META_FIELD: &str = "meta";
pub const CONTROL_MIN_PREFIX: &str = "control.min";
pub const CONTROL_MAX_PREFIX: &str = "control.max";
pub const CONTROL_CLOSED_FIELD: &str = "control.closed";

pub fn min_field(data_field: &str) -> String {
    format!("{CONTROL_MIN_PREFIX}.{data_field}")
}

pub fn max_field(data_field: &str) -> String {
    format!("{CONTROL_MAX_PREFIX}.{data_field}")
}

/// The guard every bucket-level filter carries: buckets flushed as closed
/// are immutable on the write path and must never be rewritten into.
pub fn closed_bucket_filter() -> Expr {
    Expr::Ne(CONTROL_CLOSED_FIELD.to_string(), Value::Boolean(true))
}

/// The metadata document of one bucket, synthesized from the records it
/// groups: per-field min/max bounds, the shared metadata value, and the
/// closed marker. This is the document a bucket-level filter is evaluated
/// against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketSummary {
    doc: Document,
}

impl BucketSummary {
    pub fn from_records(
        records: &[Document],
        options: &TimeseriesOptions,
        closed: bool,
    ) -> Self {
        let mut doc = Document::new();
        doc.set(CONTROL_CLOSED_FIELD, Value::Boolean(closed));

        for record in records {
            for (path, value) in record.fields() {
                if let Some(meta_root) = &options.meta_field {
                    if FieldPath::new(path).is_or_descends_from(meta_root) {
                        // Metadata is shared by every record in the bucket.
                        doc.set(FieldPath::new(path).rebase(meta_root, META_FIELD), value.clone());
                        continue;
                    }
                }
                if !value.is_scalar() {
                    continue;
                }
                let min_path = min_field(path);
                let max_path = max_field(path);
                match doc.get(&min_path) {
                    Some(current) if current <= value => {}
                    _ => doc.set(min_path, value.clone()),
                }
                match doc.get(&max_path) {
                    Some(current) if current >= value => {}
                    _ => doc.set(max_path, value.clone()),
                }
            }
        }

        Self { doc }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn matches(&self, bucket_expr: &Expr) -> bool {
        matches_document(bucket_expr, &self.doc, None)
    }
}

#[cfg(test)]
mod tests {
    use super::{closed_bucket_filter, BucketSummary};
    use crate::catalog::schema::TimeseriesOptions;
    use crate::catalog::types::{Document, Value};

    fn options() -> TimeseriesOptions {
        TimeseriesOptions::new("ts").with_meta_field("m")
    }

    fn record(ts: i64, temp: f64, region: &str) -> Document {
        Document::from_fields([
            ("ts", Value::Timestamp(ts)),
            ("temp", Value::Float(temp)),
            ("m.region", Value::Text(region.into())),
        ])
    }

    #[test]
    fn summary_tracks_min_and_max_per_field() {
        let records = vec![
            record(100, 20.5, "eu"),
            record(50, 24.0, "eu"),
            record(200, 18.0, "eu"),
        ];
        let summary = BucketSummary::from_records(&records, &options(), false);
        let doc = summary.document();
        assert_eq!(doc.get("control.min.ts"), Some(&Value::Timestamp(50)));
        assert_eq!(doc.get("control.max.ts"), Some(&Value::Timestamp(200)));
        assert_eq!(doc.get("control.min.temp"), Some(&Value::Float(18.0)));
        assert_eq!(doc.get("control.max.temp"), Some(&Value::Float(24.0)));
    }

    #[test]
    fn metadata_is_rebased_not_summarized() {
        let records = vec![record(100, 20.5, "eu")];
        let summary = BucketSummary::from_records(&records, &options(), false);
        let doc = summary.document();
        assert_eq!(doc.get("meta.region"), Some(&Value::Text("eu".into())));
        assert_eq!(doc.get("control.min.m.region"), None);
    }

    #[test]
    fn closed_filter_excludes_closed_buckets_only() {
        let records = vec![record(100, 20.5, "eu")];
        let open = BucketSummary::from_records(&records, &options(), false);
        let closed = BucketSummary::from_records(&records, &options(), true);
        let filter = closed_bucket_filter();
        assert!(open.matches(&filter));
        assert!(!closed.matches(&filter));
    }
}
