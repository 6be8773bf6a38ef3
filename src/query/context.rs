use crate::catalog::schema::Namespace;
use crate::catalog::types::Value;
use crate::query::collation::Collator;
use crate::query::expr::Expr;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Server-injected constants a predicate may refer to, fixed once per
/// operation so retries and shard retargeting observe the same values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConstants {
    /// Operation start time, milliseconds since the epoch.
    pub local_now_ms: i64,
    /// Cluster logical time observed at operation start.
    pub cluster_time: u64,
}

pub type LetBindings = BTreeMap<String, Value>;

/// Per-compilation evaluation context: the resolved collator, namespace,
/// runtime constants, let-bindings, and expression counters. One context per
/// compilation, owned by the compiler and passed down by reference.
#[derive(Debug)]
pub struct ExpressionContext {
    namespace: Namespace,
    collator: Option<Collator>,
    collation_matches_default: bool,
    runtime_constants: Option<RuntimeConstants>,
    let_bindings: Option<LetBindings>,
    counters_active: bool,
    nodes_counted: u64,
}

impl ExpressionContext {
    pub fn new(
        namespace: Namespace,
        collator: Option<Collator>,
        collation_matches_default: bool,
        runtime_constants: Option<RuntimeConstants>,
        let_bindings: Option<LetBindings>,
    ) -> Self {
        Self {
            namespace,
            collator,
            collation_matches_default,
            runtime_constants,
            let_bindings,
            counters_active: false,
            nodes_counted: 0,
        }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn collator(&self) -> Option<&Collator> {
        self.collator.as_ref()
    }

    pub fn collation_matches_default(&self) -> bool {
        self.collation_matches_default
    }

    pub fn runtime_constants(&self) -> Option<&RuntimeConstants> {
        self.runtime_constants.as_ref()
    }

    pub fn let_bindings(&self) -> Option<&LetBindings> {
        self.let_bindings.as_ref()
    }

    /// Begins attributing expression nodes to this operation. Counting is
    /// explicit so rewrites that synthesize internal expressions do not
    /// inflate the user-visible counters.
    pub fn start_expression_counters(&mut self) {
        self.counters_active = true;
    }

    pub fn stop_expression_counters(&mut self) {
        self.counters_active = false;
    }

    pub fn counters_active(&self) -> bool {
        self.counters_active
    }

    /// Attributes the nodes of `expr` to this operation if the counters are
    /// running; a no-op otherwise.
    pub fn count_expression(&mut self, expr: &Expr) {
        if self.counters_active {
            self.nodes_counted += expr.node_count();
        }
    }

    pub fn nodes_counted(&self) -> u64 {
        self.nodes_counted
    }
}

#[cfg(test)]
mod tests {
    use super::ExpressionContext;
    use crate::catalog::schema::Namespace;
    use crate::query::expr::{field, lit};

    fn ctx() -> ExpressionContext {
        ExpressionContext::new(Namespace::new("db", "c"), None, true, None, None)
    }

    #[test]
    fn counting_requires_started_counters() {
        let mut ctx = ctx();
        let expr = field("a").eq(lit(1)).and(field("b").eq(lit(2)));

        ctx.count_expression(&expr);
        assert_eq!(ctx.nodes_counted(), 0);

        ctx.start_expression_counters();
        ctx.count_expression(&expr);
        assert_eq!(ctx.nodes_counted(), 3);

        ctx.stop_expression_counters();
        ctx.count_expression(&expr);
        assert_eq!(ctx.nodes_counted(), 3);
    }
}
