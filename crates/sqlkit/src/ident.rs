//! Safe SQL identifier validation.
//!
//! Physical column names, table names, and aliases are spliced into SQL as
//! text (placeholders cannot stand in for identifiers), so every identifier
//! that reaches the fragment buffer is validated first. Each `.`-separated
//! segment must match `[A-Za-z_][A-Za-z0-9_$]*`.

use crate::error::{QueryError, QueryResult};

/// Validate a (possibly dotted) SQL identifier.
///
/// Returns the input unchanged on success so call sites can validate and
/// forward in one expression.
pub fn validate_ident(ident: &str) -> QueryResult<&str> {
    if ident.is_empty() {
        return Err(QueryError::invalid("empty identifier"));
    }

    for seg in ident.split('.') {
        let mut chars = seg.chars();
        let Some(first) = chars.next() else {
            return Err(QueryError::invalid(format!("invalid identifier '{ident}'")));
        };
        if first != '_' && !first.is_ascii_alphabetic() {
            return Err(QueryError::invalid(format!("invalid identifier '{ident}'")));
        }
        if !chars.all(|c| c == '_' || c == '$' || c.is_ascii_alphanumeric()) {
            return Err(QueryError::invalid(format!("invalid identifier '{ident}'")));
        }
    }

    Ok(ident)
}
