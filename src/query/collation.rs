use crate::catalog::schema::CollectionOptions;
use crate::catalog::types::Value;
use crate::error::TideError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Locales the comparison layer knows how to build a collator for. "simple"
/// means binary comparison and produces no collator at all.
const KNOWN_LOCALES: &[&str] = &["simple", "en", "en_US", "fr", "de", "es"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollationSpec {
    pub locale: String,
    pub case_insensitive: bool,
}

impl CollationSpec {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            case_insensitive: false,
        }
    }

    pub fn case_insensitive(mut self) -> Self {
        self.case_insensitive = true;
        self
    }

    pub fn is_simple(&self) -> bool {
        self.locale == "simple" && !self.case_insensitive
    }
}

/// A resolved collator. Only text comparison is locale-sensitive; every
/// other value kind falls back to the natural total order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collator {
    spec: CollationSpec,
}

impl Collator {
    pub fn spec(&self) -> &CollationSpec {
        &self.spec
    }

    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        match (a, b) {
            (Value::Text(x), Value::Text(y)) if self.spec.case_insensitive => {
                x.to_lowercase().cmp(&y.to_lowercase())
            }
            _ => a.cmp(b),
        }
    }
}

/// Resolves the effective collator for a request against the collection
/// default, returning the collator (if any) and whether the effective
/// collation matches the collection default.
pub fn resolve_collator(
    request: Option<&CollationSpec>,
    collection: &CollectionOptions,
) -> Result<(Option<Collator>, bool), TideError> {
    let effective = match request {
        Some(spec) => {
            if !KNOWN_LOCALES.contains(&spec.locale.as_str()) {
                return Err(TideError::UnknownCollation {
                    locale: spec.locale.clone(),
                });
            }
            Some(spec.clone())
        }
        None => collection.default_collation.clone(),
    };

    let matches_default = match (&effective, &collection.default_collation) {
        (None, None) => true,
        (Some(e), Some(d)) => e == d,
        (Some(e), None) => e.is_simple(),
        (None, Some(_)) => false,
    };

    let collator = effective
        .filter(|spec| !spec.is_simple())
        .map(|spec| Collator { spec });

    Ok((collator, matches_default))
}
