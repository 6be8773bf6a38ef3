use crate::catalog::schema::TimeseriesOptions;
use crate::catalog::types::{FieldPath, Value};
use crate::query::context::ExpressionContext;
use crate::query::expr::Expr;
use crate::timeseries::bucket::{closed_bucket_filter, max_field, min_field, META_FIELD};
use tracing::debug;

/// The bucket-level/residual pair a time-series delete compiles its user
/// predicate into. The bucket expression is evaluated against bucket
/// metadata and is never absent; the residual expression, when present, is
/// evaluated against individually unpacked records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeseriesWriteQueryExprs {
    pub bucket_expr: Expr,
    pub residual_expr: Option<Expr>,
}

impl TimeseriesWriteQueryExprs {
    /// With no residual the bucket filter is exact: every record of every
    /// matching bucket satisfies the original predicate.
    pub fn is_exact(&self) -> bool {
        self.residual_expr.is_none()
    }
}

/// One conjunct's contribution to the split. `bucket: None` means the
/// conjunct cannot prune buckets at all (matches every bucket).
struct SplitResult {
    bucket: Option<Expr>,
    residual: Option<Expr>,
}

/// Decomposes a user predicate into a bucket-level filter and a residual
/// filter. Soundness contract: every record matched by the user predicate
/// lies in a bucket whose summary matches the bucket filter.
///
/// The user predicate is attributed to the context's expression counters
/// here; the synthesized bucket and residual expressions never are.
pub fn split_for_delete(
    predicate: Option<&Expr>,
    options: &TimeseriesOptions,
    ctx: &mut ExpressionContext,
) -> TimeseriesWriteQueryExprs {
    let Some(predicate) = predicate else {
        return TimeseriesWriteQueryExprs {
            bucket_expr: closed_bucket_filter(),
            residual_expr: None,
        };
    };

    ctx.count_expression(predicate);

    let split = split_expr(predicate, options);
    let bucket_expr = match split.bucket {
        Some(bucket) => closed_bucket_filter().and(bucket),
        None => closed_bucket_filter(),
    };
    debug!(
        exact = split.residual.is_none(),
        "split time-series delete predicate"
    );

    TimeseriesWriteQueryExprs {
        bucket_expr,
        residual_expr: split.residual,
    }
}

fn split_expr(expr: &Expr, options: &TimeseriesOptions) -> SplitResult {
    if let Some(field) = expr.leaf_field() {
        if let Some(meta_root) = &options.meta_field {
            if FieldPath::new(field).is_or_descends_from(meta_root) {
                // Metadata is shared by every record in a bucket, so a
                // metadata predicate rewrites exactly and leaves no
                // residual.
                return SplitResult {
                    bucket: Some(rebase_leaf(expr, meta_root)),
                    residual: None,
                };
            }
        }
        return split_measurement_leaf(expr, field);
    }

    match expr {
        Expr::And(l, r) => {
            let left = split_expr(l, options);
            let right = split_expr(r, options);
            SplitResult {
                bucket: combine_and(left.bucket, right.bucket),
                residual: combine_and(left.residual, right.residual),
            }
        }
        Expr::Or(l, r) => {
            let left = split_expr(l, options);
            let right = split_expr(r, options);
            // Both branches must prune for the disjunction to prune.
            let bucket = match (left.bucket, right.bucket) {
                (Some(lb), Some(rb)) => Some(lb.or(rb)),
                _ => None,
            };
            // A branch that rewrote exactly still contributes its original
            // form to the residual, otherwise records matching only that
            // branch would be filtered out after unpacking.
            let residual = match (left.residual, right.residual) {
                (None, None) => None,
                (lr, rr) => Some(Expr::Or(
                    Box::new(lr.unwrap_or_else(|| l.as_ref().clone())),
                    Box::new(rr.unwrap_or_else(|| r.as_ref().clone())),
                )),
            };
            SplitResult { bucket, residual }
        }
        // Negations invert bucket bounds unsoundly; fall back to scanning
        // every open bucket and filtering unpacked records.
        Expr::Not(_) => SplitResult {
            bucket: None,
            residual: Some(expr.clone()),
        },
        _ => unreachable!("leaf expressions are handled above"),
    }
}

/// Rewrites a comparison on the time field or a measurement field into a
/// predicate over the bucket's min/max summary of that field. The rewrite
/// widens, so the original conjunct always survives as residual.
fn split_measurement_leaf(expr: &Expr, field: &str) -> SplitResult {
    let bucket = match expr {
        Expr::Eq(_, value) if value.is_scalar() => Some(
            Expr::Lte(min_field(field), value.clone()).and(Expr::Gte(max_field(field), value.clone())),
        ),
        Expr::Lt(_, value) if value.is_scalar() => Some(Expr::Lt(min_field(field), value.clone())),
        Expr::Lte(_, value) if value.is_scalar() => {
            Some(Expr::Lte(min_field(field), value.clone()))
        }
        Expr::Gt(_, value) if value.is_scalar() => Some(Expr::Gt(max_field(field), value.clone())),
        Expr::Gte(_, value) if value.is_scalar() => {
            Some(Expr::Gte(max_field(field), value.clone()))
        }
        Expr::In(_, values) if !values.is_empty() && values.iter().all(Value::is_scalar) => values
            .iter()
            .map(|value| {
                Expr::Lte(min_field(field), value.clone())
                    .and(Expr::Gte(max_field(field), value.clone()))
            })
            .reduce(Expr::or),
        // Ne, Exists, and non-scalar operands are not range-expressible
        // over min/max summaries.
        _ => None,
    };

    SplitResult {
        bucket,
        residual: Some(expr.clone()),
    }
}

fn rebase_leaf(expr: &Expr, meta_root: &str) -> Expr {
    let rebased = |f: &str| FieldPath::new(f).rebase(meta_root, META_FIELD);
    match expr {
        Expr::Eq(f, v) => Expr::Eq(rebased(f), v.clone()),
        Expr::Ne(f, v) => Expr::Ne(rebased(f), v.clone()),
        Expr::Lt(f, v) => Expr::Lt(rebased(f), v.clone()),
        Expr::Lte(f, v) => Expr::Lte(rebased(f), v.clone()),
        Expr::Gt(f, v) => Expr::Gt(rebased(f), v.clone()),
        Expr::Gte(f, v) => Expr::Gte(rebased(f), v.clone()),
        Expr::In(f, values) => Expr::In(rebased(f), values.clone()),
        Expr::Exists(f) => Expr::Exists(rebased(f)),
        _ => unreachable!("only leaves are rebased"),
    }
}

fn combine_and(a: Option<Expr>, b: Option<Expr>) -> Option<Expr> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.and(y)),
        (Some(x), None) | (None, Some(x)) => Some(x),
        (None, None) => None,
    }
}
