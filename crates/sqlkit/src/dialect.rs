//! Per-database dialect strategies.
//!
//! Each supported product implements three pure operations: paging syntax,
//! wildcard-match syntax, and locale-ordering syntax. Everything else the
//! compiler emits is common SQL.
//!
//! Paging is where dialects diverge hardest: MySQL-family products take a
//! trailing `LIMIT`, while Oracle and DB2 wrap the already-rendered statement
//! in one or two subquery shells. The wrap is why
//! [`SqlFragment::prepend`](crate::fragment::SqlFragment::prepend) exists.

use crate::error::{QueryError, QueryResult};
use crate::fragment::SqlFragment;
use crate::value::Value;
use serde::Serialize;
use std::fmt;

/// Wildcard-match shape of a LIKE-family operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MatchKind {
    /// %value%
    Contains,
    /// value%
    Prefix,
    /// %value
    Suffix,
}

/// A supported database product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Dialect {
    Oracle,
    MySql,
    Db2,
    H2,
    PostgreSql,
    /// Partial coverage: wildcard matching only. Paging is rejected.
    SqlServer,
}

impl Dialect {
    /// Resolve a dialect from a configuration string. Unrecognized
    /// identifiers fail fast rather than silently defaulting.
    pub fn from_name(name: &str) -> QueryResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "oracle" => Ok(Dialect::Oracle),
            "mysql" => Ok(Dialect::MySql),
            "db2" => Ok(Dialect::Db2),
            "h2" => Ok(Dialect::H2),
            "postgresql" | "postgres" => Ok(Dialect::PostgreSql),
            "sqlserver" => Ok(Dialect::SqlServer),
            other => Err(QueryError::UnsupportedDialect(other.to_string())),
        }
    }

    /// Wrap an already-rendered statement in this dialect's paging syntax.
    ///
    /// `start` is the number of rows to skip (0 = no offset), `rows` the page
    /// size. Numbers are spliced as literals; they never come from user text.
    pub fn apply_paging(
        &self,
        frag: &mut SqlFragment,
        start: u64,
        rows: u64,
    ) -> QueryResult<()> {
        let end = start + rows;
        match self {
            Dialect::MySql | Dialect::H2 => {
                if start == 0 {
                    frag.append(&format!(" LIMIT {rows}"));
                } else {
                    frag.append(&format!(" LIMIT {start},{rows}"));
                }
            }
            Dialect::PostgreSql => {
                if start == 0 {
                    frag.append(&format!(" LIMIT {rows}"));
                } else {
                    frag.append(&format!(" LIMIT {rows} OFFSET {start}"));
                }
            }
            Dialect::Oracle => {
                if start == 0 {
                    frag.prepend("SELECT * FROM ( ");
                    frag.append(&format!(" ) WHERE ROWNUM <= {end}"));
                } else {
                    frag.prepend("SELECT * FROM ( SELECT ROW_.*, ROWNUM R_N FROM ( ");
                    frag.append(&format!(
                        " ) ROW_ WHERE ROWNUM <= {end} ) WHERE R_N > {start}"
                    ));
                }
            }
            Dialect::Db2 => {
                if start == 0 {
                    frag.append(&format!(" FETCH FIRST {rows} ROWS ONLY"));
                } else {
                    frag.prepend(
                        "SELECT * FROM ( SELECT ROW_.*, ROWNUMBER() OVER() AS R_N FROM ( ",
                    );
                    frag.append(&format!(
                        " ) AS ROW_ ) WHERE R_N > {start} AND R_N <= {end}"
                    ));
                }
            }
            Dialect::SqlServer => {
                return Err(QueryError::UnsupportedDialect(
                    "SqlServer paging".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Append `column [NOT] LIKE <wildcard concat>` with the dialect's
    /// concatenation syntax, binding the match value.
    pub(crate) fn append_match(
        &self,
        frag: &mut SqlFragment,
        column: &str,
        negated: bool,
        kind: MatchKind,
        bind_name: &str,
        value: Value,
    ) {
        frag.append(column);
        frag.append(if negated { " NOT LIKE " } else { " LIKE " });
        match self {
            Dialect::Oracle | Dialect::Db2 | Dialect::PostgreSql => {
                if matches!(kind, MatchKind::Contains | MatchKind::Suffix) {
                    frag.append("'%'||");
                }
                frag.push_bind(bind_name, value);
                if matches!(kind, MatchKind::Contains | MatchKind::Prefix) {
                    frag.append("||'%'");
                }
            }
            Dialect::MySql | Dialect::H2 => {
                frag.append("CONCAT(");
                if matches!(kind, MatchKind::Contains | MatchKind::Suffix) {
                    frag.append("'%',");
                }
                frag.push_bind(bind_name, value);
                if matches!(kind, MatchKind::Contains | MatchKind::Prefix) {
                    frag.append(",'%'");
                }
                frag.append(")");
            }
            Dialect::SqlServer => {
                if matches!(kind, MatchKind::Contains | MatchKind::Suffix) {
                    frag.append("'%'+");
                }
                frag.push_bind(bind_name, value);
                if matches!(kind, MatchKind::Contains | MatchKind::Prefix) {
                    frag.append("+'%'");
                }
            }
        }
    }

    /// Locale-collated ordering form of a column: pinyin-style collation for
    /// products whose default collation does not already sort that way.
    pub(crate) fn locale_order(&self, column: &str) -> String {
        match self {
            Dialect::MySql => format!("CONVERT({column} USING GBK)"),
            _ => column.to_string(),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dialect::Oracle => "Oracle",
            Dialect::MySql => "MySql",
            Dialect::Db2 => "Db2",
            Dialect::H2 => "H2",
            Dialect::PostgreSql => "PostgreSql",
            Dialect::SqlServer => "SqlServer",
        };
        f.write_str(name)
    }
}
