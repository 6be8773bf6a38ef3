use crate::catalog::types::Value;
use crate::query::expr::Expr;
use lru::LruCache;
use std::cmp::Ordering;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::num::NonZeroUsize;

const NORMALIZE_CACHE_SHARDS: usize = 16;
const NORMALIZE_CACHE_TOTAL_CAPACITY: usize = 256;
const NORMALIZE_CACHE_PER_SHARD: usize = NORMALIZE_CACHE_TOTAL_CAPACITY / NORMALIZE_CACHE_SHARDS;

/// Cache of normalized predicates keyed by the source expression's debug
/// form. Canonicalization is pure, so identical predicates normalize to
/// identical trees and repeat deletes skip the rewrite entirely.
type NormalizeCacheShard = parking_lot::Mutex<LruCache<String, Expr>>;
type NormalizeCache = [NormalizeCacheShard; NORMALIZE_CACHE_SHARDS];

static NORMALIZE_CACHE: once_cell::sync::Lazy<NormalizeCache> = once_cell::sync::Lazy::new(|| {
    std::array::from_fn(|_| {
        let cap = NonZeroUsize::new(NORMALIZE_CACHE_PER_SHARD).unwrap_or(NonZeroUsize::MIN);
        parking_lot::Mutex::new(LruCache::new(cap))
    })
});

fn cache_shard_idx(cache_key: &str) -> usize {
    let mut hasher = DefaultHasher::new();
    cache_key.hash(&mut hasher);
    (hasher.finish() as usize) % NORMALIZE_CACHE_SHARDS
}

fn op_rank(expr: &Expr) -> u8 {
    match expr {
        Expr::Eq(_, _) => 0,
        Expr::Ne(_, _) => 1,
        Expr::Lt(_, _) => 2,
        Expr::Lte(_, _) => 3,
        Expr::Gt(_, _) => 4,
        Expr::Gte(_, _) => 5,
        Expr::In(_, _) => 6,
        Expr::Exists(_) => 7,
        Expr::Not(_) => 8,
        Expr::And(_, _) => 9,
        Expr::Or(_, _) => 10,
    }
}

/// Total structural order over expression trees: operator kind first, then
/// field name, then operands. Gives And/Or operand ordering a deterministic
/// normal form independent of how the user wrote the predicate.
pub fn expr_cmp(a: &Expr, b: &Expr) -> Ordering {
    let rank_cmp = op_rank(a).cmp(&op_rank(b));
    if rank_cmp != Ordering::Equal {
        return rank_cmp;
    }

    match (a, b) {
        (Expr::Eq(fa, va), Expr::Eq(fb, vb))
        | (Expr::Ne(fa, va), Expr::Ne(fb, vb))
        | (Expr::Lt(fa, va), Expr::Lt(fb, vb))
        | (Expr::Lte(fa, va), Expr::Lte(fb, vb))
        | (Expr::Gt(fa, va), Expr::Gt(fb, vb))
        | (Expr::Gte(fa, va), Expr::Gte(fb, vb)) => {
            fa.cmp(fb).then_with(|| va.cmp(vb))
        }
        (Expr::In(fa, va), Expr::In(fb, vb)) => fa
            .cmp(fb)
            .then_with(|| va.len().cmp(&vb.len()))
            .then_with(|| cmp_value_lists(va, vb)),
        (Expr::Exists(fa), Expr::Exists(fb)) => fa.cmp(fb),
        (Expr::Not(ia), Expr::Not(ib)) => expr_cmp(ia, ib),
        (Expr::And(la, ra), Expr::And(lb, rb)) | (Expr::Or(la, ra), Expr::Or(lb, rb)) => {
            expr_cmp(la, lb).then_with(|| expr_cmp(ra, rb))
        }
        _ => Ordering::Equal,
    }
}

fn cmp_value_lists(a: &[Value], b: &[Value]) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        let c = x.cmp(y);
        if c != Ordering::Equal {
            return c;
        }
    }
    Ordering::Equal
}

/// Rewrites a predicate into its deterministic normal form: double negation
/// removed, And/Or chains flattened, operands sorted under `expr_cmp`, and
/// duplicate operands collapsed.
pub fn normalize_expr(expr: &Expr) -> Expr {
    let cache_key = format!("{expr:?}");
    let shard = &NORMALIZE_CACHE[cache_shard_idx(&cache_key)];

    if let Some(normalized) = shard.lock().get(&cache_key) {
        return normalized.clone();
    }

    let normalized = normalize_uncached(expr);
    shard.lock().put(cache_key, normalized.clone());
    normalized
}

fn normalize_uncached(expr: &Expr) -> Expr {
    match expr {
        Expr::Not(inner) => match inner.as_ref() {
            Expr::Not(doubly) => normalize_uncached(doubly),
            _ => Expr::Not(Box::new(normalize_uncached(inner))),
        },
        Expr::And(_, _) => rebuild_connective(expr, true),
        Expr::Or(_, _) => rebuild_connective(expr, false),
        _ => expr.clone(),
    }
}

fn rebuild_connective(expr: &Expr, conjunction: bool) -> Expr {
    let mut operands = Vec::new();
    flatten_into(expr, conjunction, &mut operands);
    operands.sort_by(expr_cmp);
    operands.dedup();

    let mut iter = operands.into_iter();
    let first = iter
        .next()
        .unwrap_or_else(|| unreachable!("connective has at least two operands"));
    iter.fold(first, |acc, operand| {
        if conjunction {
            Expr::And(Box::new(acc), Box::new(operand))
        } else {
            Expr::Or(Box::new(acc), Box::new(operand))
        }
    })
}

fn flatten_into(expr: &Expr, conjunction: bool, out: &mut Vec<Expr>) {
    match (expr, conjunction) {
        (Expr::And(l, r), true) | (Expr::Or(l, r), false) => {
            flatten_into(l, conjunction, out);
            flatten_into(r, conjunction, out);
        }
        _ => out.push(normalize_uncached(expr)),
    }
}
