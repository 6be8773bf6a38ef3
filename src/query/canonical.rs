use crate::catalog::schema::Namespace;
use crate::config::TideConfig;
use crate::query::collation::CollationSpec;
use crate::query::context::{ExpressionContext, LetBindings, RuntimeConstants};
use crate::query::error::QueryError;
use crate::query::expr::{Expr, Order};
use crate::query::find::{FindDescriptor, IndexHint};
use crate::query::normalize::normalize_expr;
use crate::query::shape::QueryShape;
use std::collections::BTreeSet;
use tracing::debug;

/// The document identifier field.
pub const ID_FIELD: &str = "_id";

/// Which parts of the predicate language a canonicalization admits. Internal
/// rewrites always run with `AllowAll`; `Restricted` is the posture for
/// predicates arriving from untrusted sub-pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionsPolicy {
    AllowAll,
    Restricted,
}

/// The validated, normalized, execution-ready query. Immutable once built;
/// produced at most once per delete compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalQuery {
    namespace: Namespace,
    filter: Option<Expr>,
    sort: Vec<(String, Order)>,
    collation: Option<CollationSpec>,
    hint: Option<IndexHint>,
    limit: Option<u64>,
    runtime_constants: Option<RuntimeConstants>,
    let_bindings: Option<LetBindings>,
    shape: QueryShape,
    is_explain: bool,
}

impl CanonicalQuery {
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn filter(&self) -> Option<&Expr> {
        self.filter.as_ref()
    }

    pub fn sort(&self) -> &[(String, Order)] {
        &self.sort
    }

    pub fn collation(&self) -> Option<&CollationSpec> {
        self.collation.as_ref()
    }

    pub fn hint(&self) -> Option<&IndexHint> {
        self.hint.as_ref()
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn runtime_constants(&self) -> Option<&RuntimeConstants> {
        self.runtime_constants.as_ref()
    }

    pub fn let_bindings(&self) -> Option<&LetBindings> {
        self.let_bindings.as_ref()
    }

    pub fn shape(&self) -> &QueryShape {
        &self.shape
    }

    pub fn is_explain(&self) -> bool {
        self.is_explain
    }
}

/// True for the one predicate shape the delete path may skip
/// canonicalization for: a single equality on `_id` with a scalar value.
pub fn is_simple_id_query(filter: Option<&Expr>) -> bool {
    matches!(filter, Some(Expr::Eq(field, value)) if field == ID_FIELD && value.is_scalar())
}

/// Validates and normalizes a find-shaped descriptor into a
/// `CanonicalQuery`. Expression nodes are attributed to the context's
/// counters while they are running.
pub fn canonicalize(
    find: FindDescriptor,
    is_explain: bool,
    ctx: &mut ExpressionContext,
    policy: ExtensionsPolicy,
    config: &TideConfig,
) -> Result<CanonicalQuery, QueryError> {
    if let Some(filter) = &find.filter {
        filter.validate_depth(config.max_expression_depth)?;
        validate_filter(filter, policy)?;
        ctx.count_expression(filter);
    }
    validate_sort(&find.sort)?;
    if find.limit == Some(0) {
        return Err(QueryError::InvalidQuery {
            reason: "limit must be positive".into(),
        });
    }

    let filter = find.filter.as_ref().map(normalize_expr);
    let shape = QueryShape::of(&find.namespace, filter.as_ref(), &find.sort);
    debug!(
        namespace = %find.namespace,
        shape = shape.hash_hex(),
        "canonicalized query"
    );

    Ok(CanonicalQuery {
        namespace: find.namespace,
        filter,
        sort: find.sort,
        collation: find.collation,
        hint: find.hint,
        limit: find.limit,
        runtime_constants: find.runtime_constants,
        let_bindings: find.let_bindings,
        shape,
        is_explain,
    })
}

pub(crate) fn validate_filter(expr: &Expr, policy: ExtensionsPolicy) -> Result<(), QueryError> {
    match expr {
        Expr::Eq(f, _)
        | Expr::Ne(f, _)
        | Expr::Lt(f, _)
        | Expr::Lte(f, _)
        | Expr::Gt(f, _)
        | Expr::Gte(f, _) => require_field_name(f),
        Expr::In(f, values) => {
            require_field_name(f)?;
            if values.is_empty() {
                return Err(QueryError::InvalidQuery {
                    reason: format!("'in' on field '{f}' requires at least one value"),
                });
            }
            Ok(())
        }
        Expr::Exists(f) => {
            if policy == ExtensionsPolicy::Restricted {
                return Err(QueryError::UnsupportedOperator {
                    operator: "exists",
                    reason: "not admitted under the restricted predicate policy".into(),
                });
            }
            require_field_name(f)
        }
        Expr::And(l, r) | Expr::Or(l, r) => {
            validate_filter(l, policy)?;
            validate_filter(r, policy)
        }
        Expr::Not(inner) => validate_filter(inner, policy),
    }
}

fn require_field_name(field: &str) -> Result<(), QueryError> {
    if field.is_empty() {
        return Err(QueryError::InvalidQuery {
            reason: "predicate field name must not be empty".into(),
        });
    }
    Ok(())
}

fn validate_sort(sort: &[(String, Order)]) -> Result<(), QueryError> {
    let mut seen = BTreeSet::new();
    for (field, _) in sort {
        if field.is_empty() {
            return Err(QueryError::InvalidQuery {
                reason: "sort field name must not be empty".into(),
            });
        }
        if !seen.insert(field.as_str()) {
            return Err(QueryError::InvalidQuery {
                reason: format!("duplicate sort field '{field}'"),
            });
        }
    }
    Ok(())
}
