use crate::catalog::types::Value;
use crate::error::TideError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Order {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expr {
    Eq(String, Value),
    Ne(String, Value),
    Lt(String, Value),
    Lte(String, Value),
    Gt(String, Value),
    Gte(String, Value),
    In(String, Vec<Value>),
    Exists(String),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
}

impl Expr {
    pub fn and(self, rhs: Expr) -> Expr {
        Expr::And(Box::new(self), Box::new(rhs))
    }

    pub fn or(self, rhs: Expr) -> Expr {
        Expr::Or(Box::new(self), Box::new(rhs))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Expr {
        Expr::Not(Box::new(self))
    }

    /// Maximum nesting depth of this expression tree.
    pub fn depth(&self) -> usize {
        match self {
            Expr::Eq(_, _)
            | Expr::Ne(_, _)
            | Expr::Lt(_, _)
            | Expr::Lte(_, _)
            | Expr::Gt(_, _)
            | Expr::Gte(_, _)
            | Expr::In(_, _)
            | Expr::Exists(_) => 1,
            Expr::Not(inner) => 1 + inner.depth(),
            Expr::And(left, right) | Expr::Or(left, right) => 1 + left.depth().max(right.depth()),
        }
    }

    /// Total node count, the unit tracked by the expression counters.
    pub fn node_count(&self) -> u64 {
        match self {
            Expr::Eq(_, _)
            | Expr::Ne(_, _)
            | Expr::Lt(_, _)
            | Expr::Lte(_, _)
            | Expr::Gt(_, _)
            | Expr::Gte(_, _)
            | Expr::In(_, _)
            | Expr::Exists(_) => 1,
            Expr::Not(inner) => 1 + inner.node_count(),
            Expr::And(left, right) | Expr::Or(left, right) => {
                1 + left.node_count() + right.node_count()
            }
        }
    }

    pub fn validate_depth(&self, max_depth: usize) -> Result<(), TideError> {
        let depth = self.depth();
        if depth > max_depth {
            return Err(TideError::DepthExceeded {
                depth,
                max: max_depth,
            });
        }
        Ok(())
    }

    /// The field this leaf addresses, if it is a leaf.
    pub fn leaf_field(&self) -> Option<&str> {
        match self {
            Expr::Eq(f, _)
            | Expr::Ne(f, _)
            | Expr::Lt(f, _)
            | Expr::Lte(f, _)
            | Expr::Gt(f, _)
            | Expr::Gte(f, _)
            | Expr::In(f, _)
            | Expr::Exists(f) => Some(f),
            _ => None,
        }
    }
}

pub struct FieldRef(String);

pub fn field(name: &str) -> FieldRef {
    FieldRef(name.to_string())
}

pub trait IntoQueryValue {
    fn into_query_value(self) -> Value;
}

impl IntoQueryValue for Value {
    fn into_query_value(self) -> Value {
        self
    }
}

impl IntoQueryValue for bool {
    fn into_query_value(self) -> Value {
        Value::Boolean(self)
    }
}

impl IntoQueryValue for i64 {
    fn into_query_value(self) -> Value {
        Value::Integer(self)
    }
}

impl IntoQueryValue for i32 {
    fn into_query_value(self) -> Value {
        Value::Integer(self as i64)
    }
}

impl IntoQueryValue for f64 {
    fn into_query_value(self) -> Value {
        Value::Float(self)
    }
}

impl IntoQueryValue for String {
    fn into_query_value(self) -> Value {
        Value::Text(self.into())
    }
}

impl IntoQueryValue for &str {
    fn into_query_value(self) -> Value {
        Value::Text(self.to_string().into())
    }
}

pub fn lit<T: IntoQueryValue>(value: T) -> Value {
    value.into_query_value()
}

impl FieldRef {
    pub fn eq(self, value: Value) -> Expr {
        Expr::Eq(self.0, value)
    }

    pub fn neq(self, value: Value) -> Expr {
        Expr::Ne(self.0, value)
    }

    pub fn gt(self, value: Value) -> Expr {
        Expr::Gt(self.0, value)
    }

    pub fn gte(self, value: Value) -> Expr {
        Expr::Gte(self.0, value)
    }

    pub fn lt(self, value: Value) -> Expr {
        Expr::Lt(self.0, value)
    }

    pub fn lte(self, value: Value) -> Expr {
        Expr::Lte(self.0, value)
    }

    pub fn in_(self, values: Vec<Value>) -> Expr {
        Expr::In(self.0, values)
    }

    pub fn exists(self) -> Expr {
        Expr::Exists(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{field, lit, Expr};

    #[test]
    fn depth_counts_nesting_not_leaves() {
        let leaf = field("a").eq(lit(1));
        assert_eq!(leaf.depth(), 1);
        let tree = field("a").eq(lit(1)).and(field("b").gt(lit(2)).not());
        assert_eq!(tree.depth(), 3);
    }

    #[test]
    fn node_count_counts_every_node() {
        let tree = field("a").eq(lit(1)).and(field("b").gt(lit(2)).not());
        assert_eq!(tree.node_count(), 4);
    }

    #[test]
    fn validate_depth_rejects_deep_trees() {
        let mut expr = field("a").eq(lit(1));
        for _ in 0..40 {
            expr = expr.not();
        }
        assert!(expr.validate_depth(32).is_err());
        assert!(field("a").eq(lit(1)).validate_depth(32).is_ok());
    }

    #[test]
    fn leaf_field_is_none_for_connectives() {
        assert_eq!(field("a").eq(lit(1)).leaf_field(), Some("a"));
        assert_eq!(field("a").eq(lit(1)).not().leaf_field(), None);
    }
}
