use crate::catalog::schema::Namespace;
use crate::query::collation::CollationSpec;
use crate::query::context::{LetBindings, RuntimeConstants};
use crate::query::expr::{Expr, Order};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexHint {
    Index(String),
    Natural,
}

/// The read-shaped descriptor handed to the canonicalizer. Assembled by the
/// delete compiler, mutable until canonicalization seals it into a
/// `CanonicalQuery`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindDescriptor {
    pub namespace: Namespace,
    pub filter: Option<Expr>,
    pub sort: Vec<(String, Order)>,
    pub collation: Option<CollationSpec>,
    pub hint: Option<IndexHint>,
    pub limit: Option<u64>,
    pub runtime_constants: Option<RuntimeConstants>,
    pub let_bindings: Option<LetBindings>,
}

impl FindDescriptor {
    pub fn new(namespace: Namespace) -> Self {
        Self {
            namespace,
            filter: None,
            sort: Vec::new(),
            collation: None,
            hint: None,
            limit: None,
            runtime_constants: None,
            let_bindings: None,
        }
    }
}
