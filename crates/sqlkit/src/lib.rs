//! # sqlkit
//!
//! A dialect-aware, parameterized SQL fragment compiler.
//!
//! sqlkit turns an in-memory condition model into SQL text plus an ordered
//! bound-variable list, rendering paging, string matching, and ordering the
//! way each supported database product (Oracle, MySQL, DB2, H2, PostgreSQL,
//! partially SQL Server) expects. It never executes SQL and never parses it —
//! statement execution and entity metadata discovery belong to the host
//! application.
//!
//! ## Features
//!
//! - **Condition model**: predicates, nested AND/OR groups with negation,
//!   and an opaque custom-condition escape hatch
//! - **Fragment buffer**: text and bound variables tracked together, so
//!   placeholder positions survive prepend-wrapping and embedding
//! - **Dialect strategies**: per-product paging, wildcard, and
//!   locale-ordering syntax, selected explicitly at compiler construction
//! - **Fail-loud resolution**: every field that cannot be resolved to a
//!   column is reported in one aggregate error; a narrowed WHERE clause is
//!   never returned silently
//!
//! ## Example
//!
//! ```
//! use sqlkit::{Catalog, Compiler, ConditionGroup, Dialect};
//!
//! # fn main() -> sqlkit::QueryResult<()> {
//! let catalog = Catalog::builder("User", "T_USER")?
//!     .primary_key("id", "ID", "Id")?
//!     .column("name", "NAME", "Name")?
//!     .build();
//!
//! let mut cond = ConditionGroup::new();
//! cond.on("id", "=", 5)?;
//! cond.sub("or")?
//!     .on("name", "Like", "bo")?
//!     .is_null("name")?
//!     .end();
//!
//! let compiler = Compiler::new(catalog, Dialect::MySql);
//! let frag = compiler.where_clause(&cond)?;
//! assert_eq!(
//!     frag.sql(),
//!     "WHERE ID = ? AND ( NAME LIKE CONCAT('%',?,'%') OR NAME IS NULL )"
//! );
//! assert_eq!(frag.bindings().len(), 2);
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod compiler;
pub mod condition;
pub mod dialect;
pub mod error;
pub mod fragment;
pub mod ident;
pub mod join;
pub mod prelude;
pub mod update;
pub mod value;

pub use catalog::{Catalog, CatalogBuilder, CatalogProvider, CatalogRegistry, ColumnDef};
pub use compiler::{Compiler, OrderSpec, SortDir, LOCALE_MARKER};
pub use condition::{
    ConditionGroup, ConditionItem, CustomCondition, FieldValue, Logic, Operator, Predicate,
    SubGroup, SubGroupBuilder,
};
pub use dialect::Dialect;
pub use error::{QueryError, QueryResult};
pub use fragment::{Binding, SqlFragment};
pub use join::{JoinBuilder, JoinOnBuilder, JoinRef, JoinSpec, JoinType, TableRef};
pub use update::{Assignment, SetOp, UpdateSet};
pub use value::Value;
