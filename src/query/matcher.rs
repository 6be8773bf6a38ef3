use crate::catalog::types::{Document, Value};
use crate::query::collation::Collator;
use crate::query::expr::Expr;
use std::cmp::Ordering;

/// Compares two values for matching purposes. Integers and floats compare
/// numerically; any other cross-kind pair never matches.
fn compare_for_match(collator: Option<&Collator>, a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Integer(x), Value::Float(y)) => Some((*x as f64).total_cmp(y)),
        (Value::Float(x), Value::Integer(y)) => Some(x.total_cmp(&(*y as f64))),
        _ if std::mem::discriminant(a) == std::mem::discriminant(b) => match collator {
            Some(c) => Some(c.compare(a, b)),
            None => Some(a.cmp(b)),
        },
        _ => None,
    }
}

/// Equality with array-field semantics: a predicate value matches an array
/// field when it equals any element.
fn value_matches_eq(collator: Option<&Collator>, field_value: &Value, target: &Value) -> bool {
    if let Value::Array(elems) = field_value {
        if elems
            .iter()
            .any(|e| compare_for_match(collator, e, target) == Some(Ordering::Equal))
        {
            return true;
        }
    }
    compare_for_match(collator, field_value, target) == Some(Ordering::Equal)
}

/// Evaluates `expr` against a document under an optional collator.
pub fn matches_document(expr: &Expr, doc: &Document, collator: Option<&Collator>) -> bool {
    match expr {
        Expr::Eq(f, v) => doc
            .get(f)
            .is_some_and(|x| value_matches_eq(collator, x, v)),
        Expr::Ne(f, v) => !doc
            .get(f)
            .is_some_and(|x| value_matches_eq(collator, x, v)),
        Expr::Lt(f, v) => range_matches(doc, f, collator, v, Ordering::is_lt),
        Expr::Lte(f, v) => range_matches(doc, f, collator, v, Ordering::is_le),
        Expr::Gt(f, v) => range_matches(doc, f, collator, v, Ordering::is_gt),
        Expr::Gte(f, v) => range_matches(doc, f, collator, v, Ordering::is_ge),
        Expr::In(f, values) => doc
            .get(f)
            .is_some_and(|x| values.iter().any(|v| value_matches_eq(collator, x, v))),
        Expr::Exists(f) => doc.contains(f),
        Expr::And(l, r) => {
            matches_document(l, doc, collator) && matches_document(r, doc, collator)
        }
        Expr::Or(l, r) => matches_document(l, doc, collator) || matches_document(r, doc, collator),
        Expr::Not(inner) => !matches_document(inner, doc, collator),
    }
}

fn range_matches<F>(
    doc: &Document,
    field: &str,
    collator: Option<&Collator>,
    target: &Value,
    accept: F,
) -> bool
where
    F: Fn(Ordering) -> bool + Copy,
{
    let Some(field_value) = doc.get(field) else {
        return false;
    };
    if let Value::Array(elems) = field_value {
        return elems
            .iter()
            .any(|e| compare_for_match(collator, e, target).is_some_and(accept));
    }
    compare_for_match(collator, field_value, target).is_some_and(accept)
}
