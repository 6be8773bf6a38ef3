use crate::catalog::schema::CollectionOptions;
use crate::config::TideConfig;
use crate::delete::request::{DeleteRequest, YieldPolicy};
use crate::query::canonical::{
    canonicalize, is_simple_id_query, validate_filter, CanonicalQuery, ExtensionsPolicy,
};
use crate::query::collation::resolve_collator;
use crate::query::context::ExpressionContext;
use crate::query::error::QueryError;
use crate::query::expr::Expr;
use crate::query::find::FindDescriptor;
use crate::timeseries::split::{split_for_delete, TimeseriesWriteQueryExprs};
use tracing::debug;

/// Compiles a delete request into the canonical query the execution stage
/// runs, enforcing delete-specific invariants along the way. One compiler
/// instance serves exactly one logical operation; the caller keeps the
/// request and the collection handle alive for the compiler's lifetime.
#[derive(Debug)]
pub struct DeleteCompiler<'a> {
    request: &'a DeleteRequest,
    collection: &'a CollectionOptions,
    config: &'a TideConfig,
    timeseries_exprs: Option<TimeseriesWriteQueryExprs>,
    expr_ctx: Option<ExpressionContext>,
    canonical_query: Option<CanonicalQuery>,
}

impl<'a> DeleteCompiler<'a> {
    /// The time-series split is computed eagerly: eligibility decisions read
    /// it before `parse` runs. It stays absent when the rewrite is gated off
    /// or the collection carries no time-series options.
    pub fn new(
        request: &'a DeleteRequest,
        collection: &'a CollectionOptions,
        is_timeseries_delete: bool,
        config: &'a TideConfig,
    ) -> Self {
        let timeseries_exprs = if is_timeseries_delete && config.timeseries_deletes_enabled {
            collection.timeseries.as_ref().map(|ts_options| {
                let mut scratch = ExpressionContext::new(
                    request.namespace.clone(),
                    None,
                    true,
                    request.runtime_constants,
                    request.let_bindings.clone(),
                );
                split_for_delete(request.predicate.as_ref(), ts_options, &mut scratch)
            })
        } else {
            None
        };

        Self {
            request,
            collection,
            config,
            timeseries_exprs,
            expr_ctx: None,
            canonical_query: None,
        }
    }

    /// Validates the request and compiles it, unless the identifier fast
    /// path applies, in which case no canonical query is built at all.
    ///
    /// Panics on caller contract breaches: a delete cannot both return the
    /// deleted document and remove multiple documents, and a projection is
    /// only meaningful when the deleted document is returned.
    pub fn parse(&mut self) -> Result<(), QueryError> {
        assert!(
            self.canonical_query.is_none(),
            "contract violation: delete request parsed twice"
        );
        assert!(
            !(self.request.return_deleted && self.request.multi),
            "contract violation: cannot return the deleted document from a multi delete"
        );
        assert!(
            self.request.projection.is_empty() || self.request.return_deleted,
            "contract violation: a projection requires returning the deleted document"
        );

        let (collator, collation_matches_default) =
            resolve_collator(self.request.collation.as_ref(), self.collection)?;
        let mut ctx = ExpressionContext::new(
            self.request.namespace.clone(),
            collator,
            collation_matches_default,
            self.request.runtime_constants,
            self.request.let_bindings.clone(),
        );

        // The identifier field of a time-series collection is bucket-level,
        // so the fast path only applies without a split in effect.
        if is_simple_id_query(self.request.predicate.as_ref()) && self.timeseries_exprs.is_none() {
            debug!(namespace = %self.request.namespace, "simple _id delete, skipping canonicalization");
            self.expr_ctx = Some(ctx);
            return Ok(());
        }

        ctx.start_expression_counters();
        let result = self.parse_to_canonical(&mut ctx);
        self.expr_ctx = Some(ctx);
        result
    }

    fn parse_to_canonical(&mut self, ctx: &mut ExpressionContext) -> Result<(), QueryError> {
        let mut find = FindDescriptor::new(self.request.namespace.clone());

        if self.timeseries_exprs.is_some() {
            let ts_options = self
                .collection
                .timeseries
                .as_ref()
                .expect("contract violation: time-series split without time-series options");
            // Only the synthesized bucket filter reaches the canonicalizer
            // on this path, so the user predicate is validated here before
            // it is consumed.
            if let Some(predicate) = self.request.predicate.as_ref() {
                predicate.validate_depth(self.config.max_expression_depth)?;
                validate_filter(predicate, ExtensionsPolicy::AllowAll)?;
            }
            // Re-split the original user predicate under the resolved
            // collation context. The canonical query built from here on is
            // internal to the bucket scan, so the counters stop once the
            // user predicate has been consumed.
            let exprs = split_for_delete(self.request.predicate.as_ref(), ts_options, ctx);
            ctx.stop_expression_counters();
            find.filter = Some(exprs.bucket_expr.clone());
            self.timeseries_exprs = Some(exprs);
        } else {
            find.filter = self.request.predicate.clone();
        }

        find.sort = self.request.sort.clone();
        find.collation = self.request.collation.clone();
        find.hint = self.request.hint.clone();

        // A limit is only passed through for the single-document
        // find-and-remove shape, where a top-k sort wants it. A plain delete
        // must be able to skip documents deleted out from under it, which a
        // limit would defeat.
        if !self.request.multi && !self.request.sort.is_empty() {
            if self.timeseries_exprs.is_some() {
                return Err(QueryError::InvalidOptions {
                    reason:
                        "cannot perform a single delete with a query and sort on a time-series collection"
                            .into(),
                });
            }
            find.limit = Some(1);
        }

        find.runtime_constants = self.request.runtime_constants;
        find.let_bindings = self.request.let_bindings.clone();

        let canonical = canonicalize(
            find,
            self.request.is_explain,
            ctx,
            ExtensionsPolicy::AllowAll,
            self.config,
        )?;
        self.canonical_query = Some(canonical);
        Ok(())
    }

    pub fn request(&self) -> &DeleteRequest {
        self.request
    }

    /// True iff a canonical query is currently held: false before `parse`,
    /// false after the fast path, and false again once released.
    pub fn has_canonical_query(&self) -> bool {
        self.canonical_query.is_some()
    }

    /// Transfers ownership of the canonical query to the execution stage.
    /// Single-use: panics when no query is held, so callers check
    /// `has_canonical_query` first or know the fast path was not taken.
    pub fn release_canonical_query(&mut self) -> CanonicalQuery {
        match self.canonical_query.take() {
            Some(query) => query,
            None => panic!("contract violation: no canonical query held to release"),
        }
    }

    pub fn yield_policy(&self) -> YieldPolicy {
        if self.request.god {
            YieldPolicy::NoYield
        } else {
            self.request.yield_policy
        }
    }

    /// A multi delete whose bucket filter is inexact needs per-record
    /// filtering after unpacking, which only the arbitrary deletion path
    /// supports; a single-document delete is always eligible because
    /// execution stops at the first qualifying record.
    pub fn is_eligible_for_arbitrary_timeseries_delete(&self) -> bool {
        self.timeseries_exprs
            .as_ref()
            .is_some_and(|exprs| exprs.residual_expr.is_some() || !self.request.multi)
    }

    pub fn timeseries_exprs(&self) -> Option<&TimeseriesWriteQueryExprs> {
        self.timeseries_exprs.as_ref()
    }

    pub fn residual_expr(&self) -> Option<&Expr> {
        self.timeseries_exprs
            .as_ref()
            .and_then(|exprs| exprs.residual_expr.as_ref())
    }

    pub fn expression_context(&self) -> Option<&ExpressionContext> {
        self.expr_ctx.as_ref()
    }
}
