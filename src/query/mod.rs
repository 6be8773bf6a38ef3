pub mod canonical;
pub mod collation;
pub mod context;
pub mod error;
pub mod expr;
pub mod find;
pub mod matcher;
pub mod normalize;
pub mod shape;

pub use canonical::{canonicalize, is_simple_id_query, CanonicalQuery, ExtensionsPolicy};
pub use collation::{resolve_collator, CollationSpec, Collator};
pub use context::{ExpressionContext, LetBindings, RuntimeConstants};
pub use error::QueryError;
pub use expr::{field, lit, Expr, Order};
pub use find::{FindDescriptor, IndexHint};
pub use shape::QueryShape;
