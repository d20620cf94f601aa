//! Convenience re-exports for the common surface.
//!
//! ```
//! use sqlkit::prelude::*;
//! ```

pub use crate::catalog::{Catalog, CatalogProvider, CatalogRegistry};
pub use crate::compiler::{Compiler, OrderSpec, SortDir};
pub use crate::condition::{ConditionGroup, FieldValue, Logic, Operator, Predicate, SubGroup};
pub use crate::dialect::Dialect;
pub use crate::error::{QueryError, QueryResult};
pub use crate::fragment::SqlFragment;
pub use crate::join::JoinSpec;
pub use crate::update::UpdateSet;
pub use crate::value::Value;
