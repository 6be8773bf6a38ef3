use crate::catalog::schema::Namespace;
use crate::query::collation::CollationSpec;
use crate::query::context::{LetBindings, RuntimeConstants};
use crate::query::expr::{Expr, Order};
use crate::query::find::IndexHint;

/// How a delete plan may yield its snapshot while executing. Privileged
/// internal writes run with `NoYield` regardless of what the request asks
/// for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum YieldPolicy {
    NoYield,
    WriteConflictRetryOnly,
    #[default]
    YieldAuto,
}

/// Immutable snapshot of a delete request's parameters. The caller owns the
/// request and keeps it (and the target collection) alive for the lifetime
/// of the compiler borrowing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRequest {
    pub namespace: Namespace,
    pub predicate: Option<Expr>,
    pub collation: Option<CollationSpec>,
    pub sort: Vec<(String, Order)>,
    pub hint: Option<IndexHint>,
    pub multi: bool,
    pub return_deleted: bool,
    pub projection: Vec<String>,
    pub runtime_constants: Option<RuntimeConstants>,
    pub let_bindings: Option<LetBindings>,
    pub yield_policy: YieldPolicy,
    pub god: bool,
    pub is_explain: bool,
}

impl DeleteRequest {
    pub fn new(namespace: Namespace) -> Self {
        Self {
            namespace,
            predicate: None,
            collation: None,
            sort: Vec::new(),
            hint: None,
            multi: false,
            return_deleted: false,
            projection: Vec::new(),
            runtime_constants: None,
            let_bindings: None,
            yield_policy: YieldPolicy::default(),
            god: false,
            is_explain: false,
        }
    }

    pub fn where_(mut self, predicate: Expr) -> Self {
        self.predicate = Some(predicate);
        self
    }

    pub fn collation(mut self, collation: CollationSpec) -> Self {
        self.collation = Some(collation);
        self
    }

    pub fn sort_by(mut self, field: &str, order: Order) -> Self {
        self.sort.push((field.to_string(), order));
        self
    }

    pub fn hint(mut self, hint: IndexHint) -> Self {
        self.hint = Some(hint);
        self
    }

    pub fn multi(mut self) -> Self {
        self.multi = true;
        self
    }

    pub fn return_deleted(mut self) -> Self {
        self.return_deleted = true;
        self
    }

    pub fn project(mut self, fields: &[&str]) -> Self {
        self.projection = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn runtime_constants(mut self, constants: RuntimeConstants) -> Self {
        self.runtime_constants = Some(constants);
        self
    }

    pub fn let_bindings(mut self, bindings: LetBindings) -> Self {
        self.let_bindings = Some(bindings);
        self
    }

    pub fn yield_policy(mut self, policy: YieldPolicy) -> Self {
        self.yield_policy = policy;
        self
    }

    pub fn god_mode(mut self) -> Self {
        self.god = true;
        self
    }

    pub fn explain(mut self) -> Self {
        self.is_explain = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{DeleteRequest, YieldPolicy};
    use crate::catalog::schema::Namespace;
    use crate::query::expr::{field, lit, Order};

    #[test]
    fn builder_fills_the_snapshot() {
        let request = DeleteRequest::new(Namespace::new("db", "c"))
            .where_(field("status").eq(lit("stale")))
            .sort_by("ts", Order::Desc)
            .return_deleted()
            .project(&["status"]);
        assert!(request.predicate.is_some());
        assert_eq!(request.sort.len(), 1);
        assert!(request.return_deleted);
        assert!(!request.multi);
        assert_eq!(request.projection, vec!["status".to_string()]);
        assert_eq!(request.yield_policy, YieldPolicy::YieldAuto);
    }
}
