use crate::catalog::schema::Namespace;
use crate::query::expr::{Expr, Order};
use sha2::{Digest, Sha256};
use std::fmt::Write as _;

/// Literal-free rendering of a query: operators and field names survive,
/// every literal collapses to `?`. Two queries with the same shape differ
/// only in the constants they carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryShape {
    repr: String,
    hash_hex: String,
}

impl QueryShape {
    pub fn of(namespace: &Namespace, filter: Option<&Expr>, sort: &[(String, Order)]) -> Self {
        let mut repr = format!("ns:{namespace}|filter:");
        match filter {
            Some(expr) => write_shape(expr, &mut repr),
            None => repr.push_str("all"),
        }
        if !sort.is_empty() {
            repr.push_str("|sort:");
            for (i, (field, order)) in sort.iter().enumerate() {
                if i > 0 {
                    repr.push(',');
                }
                let dir = match order {
                    Order::Asc => "asc",
                    Order::Desc => "desc",
                };
                let _ = write!(repr, "{field}:{dir}");
            }
        }

        let digest = Sha256::digest(repr.as_bytes());
        let mut hash_hex = String::with_capacity(digest.len() * 2);
        for byte in digest {
            let _ = write!(hash_hex, "{byte:02x}");
        }

        Self { repr, hash_hex }
    }

    pub fn repr(&self) -> &str {
        &self.repr
    }

    pub fn hash_hex(&self) -> &str {
        &self.hash_hex
    }
}

fn write_shape(expr: &Expr, out: &mut String) {
    match expr {
        Expr::Eq(f, _) => {
            let _ = write!(out, "eq({f},?)");
        }
        Expr::Ne(f, _) => {
            let _ = write!(out, "ne({f},?)");
        }
        Expr::Lt(f, _) => {
            let _ = write!(out, "lt({f},?)");
        }
        Expr::Lte(f, _) => {
            let _ = write!(out, "lte({f},?)");
        }
        Expr::Gt(f, _) => {
            let _ = write!(out, "gt({f},?)");
        }
        Expr::Gte(f, _) => {
            let _ = write!(out, "gte({f},?)");
        }
        Expr::In(f, values) => {
            // The arity is part of the shape; the elements are not.
            let _ = write!(out, "in({f},?x{})", values.len());
        }
        Expr::Exists(f) => {
            let _ = write!(out, "exists({f})");
        }
        Expr::And(l, r) => {
            out.push_str("and(");
            write_shape(l, out);
            out.push(',');
            write_shape(r, out);
            out.push(')');
        }
        Expr::Or(l, r) => {
            out.push_str("or(");
            write_shape(l, out);
            out.push(',');
            write_shape(r, out);
            out.push(')');
        }
        Expr::Not(inner) => {
            out.push_str("not(");
            write_shape(inner, out);
            out.push(')');
        }
    }
}
