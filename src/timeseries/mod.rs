pub mod bucket;
pub mod split;

pub use bucket::BucketSummary;
pub use split::{split_for_delete, TimeseriesWriteQueryExprs};
