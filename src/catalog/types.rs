use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    Text(CompactString),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    /// Milliseconds since the epoch.
    Timestamp(i64),
    Array(Vec<Value>),
    Null,
}

impl Value {
    fn kind_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Boolean(_) => 1,
            Value::Integer(_) => 2,
            Value::Timestamp(_) => 3,
            Value::Float(_) => 4,
            Value::Text(_) => 5,
            Value::Array(_) => 6,
        }
    }

    /// Scalar values are the only values the identifier fast path and the
    /// bucket min/max summaries accept.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Value::Array(_) | Value::Null)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        let rank_cmp = self.kind_rank().cmp(&other.kind_rank());
        if rank_cmp != Ordering::Equal {
            return rank_cmp;
        }

        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Array(a), Value::Array(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

/// A record as the compiler sees it: a flat map of dotted field paths to
/// values. Nested structure is modeled by the dotted paths themselves, so
/// `control.min.temp` is a single field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    fields: BTreeMap<String, Value>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fields<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn set(&mut self, path: impl Into<String>, value: Value) {
        self.fields.insert(path.into(), value);
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        self.fields.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.fields.contains_key(path)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// A dotted field path. Only borrows; the splitter uses it to decide whether
/// a predicate field addresses the metadata field or one of its subfields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPath<'a>(&'a str);

impl<'a> FieldPath<'a> {
    pub fn new(path: &'a str) -> Self {
        Self(path)
    }

    pub fn as_str(&self) -> &'a str {
        self.0
    }

    pub fn first_segment(&self) -> &'a str {
        self.0.split('.').next().unwrap_or(self.0)
    }

    /// True when this path is `root` itself or a dotted subpath of it.
    pub fn is_or_descends_from(&self, root: &str) -> bool {
        self.0 == root
            || (self.0.len() > root.len()
                && self.0.starts_with(root)
                && self.0.as_bytes()[root.len()] == b'.')
    }

    /// Rebases `root.rest` onto `new_root.rest`; the path must descend from
    /// `root`.
    pub fn rebase(&self, root: &str, new_root: &str) -> String {
        if self.0 == root {
            new_root.to_string()
        } else {
            format!("{new_root}{}", &self.0[root.len()..])
        }
    }
}
