//! Condition-tree to SQL compilation.
//!
//! The compiler owns the catalog(s) and the dialect, resolves logical field
//! names to physical columns, and walks condition/update/order inputs to emit
//! WHERE/SET/ORDER BY/paging SQL into [`SqlFragment`]s.
//!
//! Resolution failures are collected across the *entire* traversal and
//! reported together as [`QueryError::UnresolvedFields`]. A silently dropped
//! predicate could widen the row set of an UPDATE or DELETE, so a fragment is
//! either rendered completely or not at all. An entirely empty condition
//! tree, by contrast, legitimately compiles to no WHERE clause; guarding
//! against unintentionally-empty trees before mutating is the caller's job.

use crate::catalog::{Catalog, CatalogProvider};
use crate::condition::{
    split_alias, ConditionGroup, ConditionItem, FieldValue, Logic, Operator, Predicate,
};
use crate::dialect::{Dialect, MatchKind};
use crate::error::{QueryError, QueryResult};
use crate::fragment::SqlFragment;
use crate::join::JoinSpec;
use crate::update::{SetOp, UpdateSet};
use crate::value::Value;
use std::sync::Arc;

/// Suffix marking an ORDER BY field for locale-collated ordering.
pub const LOCALE_MARKER: &str = "#locale";

/// Sort direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    fn as_sql(self) -> &'static str {
        match self {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        }
    }
}

/// A single ORDER BY item: logical field name plus direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSpec {
    field: String,
    dir: SortDir,
}

impl OrderSpec {
    pub fn asc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            dir: SortDir::Asc,
        }
    }

    pub fn desc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            dir: SortDir::Desc,
        }
    }
}

/// Compiles condition models into dialect-specific SQL fragments.
///
/// Built once per statement from the catalog(s) and the configured dialect;
/// reads the model, never mutates it.
pub struct Compiler {
    dialect: Dialect,
    major: Arc<Catalog>,
    /// Alias → catalog bindings. Empty in single-table mode.
    aliases: Vec<(String, Arc<Catalog>)>,
    spec: Option<JoinSpec>,
}

impl Compiler {
    /// Single-table compiler.
    pub fn new(catalog: impl Into<Arc<Catalog>>, dialect: Dialect) -> Self {
        Self {
            dialect,
            major: catalog.into(),
            aliases: Vec::new(),
            spec: None,
        }
    }

    /// Multi-table compiler: resolves each table's catalog through the
    /// provider and binds it to the table's alias.
    pub fn with_joins(
        spec: JoinSpec,
        provider: &dyn CatalogProvider,
        dialect: Dialect,
    ) -> QueryResult<Self> {
        let major_ref = spec
            .major()
            .ok_or_else(|| QueryError::invalid("join spec has no primary table"))?;
        let major = provider.catalog(major_ref.entity())?;
        let mut aliases = vec![(major_ref.alias().to_string(), major.clone())];
        for join in spec.joins() {
            let catalog = provider.catalog(join.table().entity())?;
            aliases.push((join.table().alias().to_string(), catalog));
        }
        Ok(Self {
            dialect,
            major,
            aliases,
            spec: Some(spec),
        })
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    // ==================== Field resolution ====================

    /// Resolve a logical field name to its rendered column expression.
    /// Misses are recorded (deduplicated) and return `None`; the caller keeps
    /// traversing so one pass reports every offender.
    fn resolve_field(&self, name: &str, missing: &mut Vec<String>) -> Option<String> {
        let (alias, bare) = split_alias(name);
        let resolved = match alias {
            Some(a) if !self.aliases.is_empty() => self
                .aliases
                .iter()
                .find(|(al, _)| al == a)
                .and_then(|(_, c)| c.resolve(bare))
                .map(|def| format!("{a}.{}", def.column)),
            Some(a) => self
                .major
                .resolve(bare)
                .map(|def| format!("{a}.{}", def.column)),
            None if !self.aliases.is_empty() => {
                // Unqualified fields belong to the primary table; qualify to
                // keep multi-table statements unambiguous.
                let major_alias = &self.aliases[0].0;
                self.major
                    .resolve(bare)
                    .map(|def| format!("{major_alias}.{}", def.column))
            }
            None => self.major.resolve(bare).map(|def| def.column.clone()),
        };
        if resolved.is_none() && !missing.iter().any(|m| m == name) {
            missing.push(name.to_string());
        }
        resolved
    }

    fn finish(missing: Vec<String>, frag: SqlFragment) -> QueryResult<SqlFragment> {
        if missing.is_empty() {
            Ok(frag)
        } else {
            Err(QueryError::UnresolvedFields(missing))
        }
    }

    // ==================== WHERE ====================

    /// Render a condition tree into a WHERE clause, leading keyword included.
    /// An empty tree renders to an empty fragment.
    pub fn where_clause(&self, group: &ConditionGroup) -> QueryResult<SqlFragment> {
        if group.is_empty() {
            return Ok(SqlFragment::new());
        }
        let mut frag = SqlFragment::from_text("WHERE ");
        let mut missing = Vec::new();
        self.append_group(group, Logic::And, &mut frag, &mut missing)?;
        let frag = Self::finish(missing, frag)?;
        tracing::debug!(
            target: "sqlkit.render",
            sql = %frag.sql(),
            binds = frag.bind_count(),
            "rendered where clause"
        );
        Ok(frag)
    }

    fn append_group(
        &self,
        group: &ConditionGroup,
        logic: Logic,
        frag: &mut SqlFragment,
        missing: &mut Vec<String>,
    ) -> QueryResult<()> {
        let mut first = true;
        for item in group.items() {
            if item.is_empty() {
                continue;
            }
            if !first {
                frag.append(" ");
                frag.append(logic.as_sql());
                frag.append(" ");
            }
            first = false;
            match item {
                ConditionItem::Pred(pred) => self.append_predicate(pred, frag, missing)?,
                ConditionItem::Group(sub) => {
                    if !sub.positive() {
                        frag.append("NOT ");
                    }
                    frag.append("( ");
                    self.append_group(sub.group(), sub.logic(), frag, missing)?;
                    frag.append(" )");
                }
                ConditionItem::Custom(custom) => custom.append_to(frag),
            }
        }
        Ok(())
    }

    fn append_predicate(
        &self,
        pred: &Predicate,
        frag: &mut SqlFragment,
        missing: &mut Vec<String>,
    ) -> QueryResult<()> {
        let column = self.resolve_field(pred.field(), missing);
        // Field references on the value side join the same traversal so one
        // pass reports every unresolved name.
        if let FieldValue::Ref(other) = pred.value() {
            let other_column = self.resolve_field(other, missing);
            let (Some(column), Some(other_column)) = (column, other_column) else {
                return Ok(());
            };
            let Some(symbol) = pred.op().symbol() else {
                return Err(QueryError::invalid(format!(
                    "operator {:?} cannot compare two fields",
                    pred.op()
                )));
            };
            frag.append(&format!("{column} {symbol} {other_column}"));
            return Ok(());
        }
        let Some(column) = column else {
            return Ok(());
        };

        match pred.op() {
            Operator::Equals
            | Operator::NotEquals
            | Operator::LessThan
            | Operator::LessThanOrEqual
            | Operator::GreaterThan
            | Operator::GreaterThanOrEqual => {
                let value = self.single_value(pred)?;
                let symbol = pred.op().symbol().unwrap_or("=");
                frag.append(&format!("{column} {symbol} "));
                frag.push_bind(pred.field(), value);
            }
            Operator::IsNull => {
                frag.append(&format!("{column} IS NULL"));
            }
            Operator::IsNotNull => {
                frag.append(&format!("{column} IS NOT NULL"));
            }
            Operator::Like | Operator::NotLike | Operator::StartsWith | Operator::EndsWith => {
                let value = self.single_value(pred)?;
                let (negated, kind) = match pred.op() {
                    Operator::NotLike => (true, MatchKind::Contains),
                    Operator::StartsWith => (false, MatchKind::Prefix),
                    Operator::EndsWith => (false, MatchKind::Suffix),
                    _ => (false, MatchKind::Contains),
                };
                self.dialect
                    .append_match(frag, &column, negated, kind, pred.field(), value);
            }
            Operator::In | Operator::NotIn => {
                let values = match pred.value() {
                    FieldValue::List(vs) => vs.clone(),
                    FieldValue::Single(v) => vec![v.clone()],
                    other => {
                        return Err(QueryError::invalid(format!(
                            "IN requires a value list, got {other:?}"
                        )));
                    }
                };
                // A one-element list degrades to plain (in)equality.
                if let [value] = values.as_slice() {
                    let symbol = if pred.op() == Operator::In { "=" } else { "!=" };
                    frag.append(&format!("{column} {symbol} "));
                    frag.push_bind(pred.field(), value.clone());
                } else {
                    let keyword = if pred.op() == Operator::In {
                        " IN ("
                    } else {
                        " NOT IN ("
                    };
                    frag.append(&column);
                    frag.append(keyword);
                    for (i, value) in values.into_iter().enumerate() {
                        if i > 0 {
                            frag.append(", ");
                        }
                        frag.push_bind(pred.field(), value);
                    }
                    frag.append(")");
                }
            }
            Operator::Between => {
                let (low, high) = match pred.value() {
                    FieldValue::Pair(a, b) => (a.clone(), b.clone()),
                    FieldValue::List(vs) if vs.len() >= 2 => (vs[0].clone(), vs[1].clone()),
                    _ => {
                        return Err(QueryError::invalid(format!(
                            "BETWEEN on '{}' requires two values",
                            pred.field()
                        )));
                    }
                };
                frag.append(&format!("{column} BETWEEN "));
                frag.push_bind(pred.field(), low);
                frag.append(" AND ");
                frag.push_bind(pred.field(), high);
            }
        }
        Ok(())
    }

    fn single_value(&self, pred: &Predicate) -> QueryResult<Value> {
        match pred.value() {
            FieldValue::Single(v) => Ok(v.clone()),
            FieldValue::List(vs) if vs.len() == 1 => Ok(vs[0].clone()),
            other => Err(QueryError::invalid(format!(
                "operator {:?} on '{}' requires a single value, got {other:?}",
                pred.op(),
                pred.field()
            ))),
        }
    }

    // ==================== SET ====================

    /// Render an update-assignment list into SET SQL (no leading keyword).
    /// Blank-value assignments are skipped; `ToNull` always renders.
    pub fn set_clause(&self, update: &UpdateSet) -> QueryResult<SqlFragment> {
        let mut frag = SqlFragment::new();
        let mut missing = Vec::new();
        let mut first = true;
        for assign in update.items() {
            if assign.is_empty() {
                continue;
            }
            let Some(column) = self.resolve_field(assign.field(), &mut missing) else {
                continue;
            };
            if !first {
                frag.append(", ");
            }
            first = false;
            match assign.op() {
                SetOp::Set => {
                    frag.append(&format!("{column} = "));
                    frag.push_bind(assign.field(), assign.value().clone());
                }
                SetOp::Add => {
                    let Some(negative) = assign.value().is_negative() else {
                        return Err(QueryError::invalid(format!(
                            "Add on '{}' requires a numeric value",
                            assign.field()
                        )));
                    };
                    frag.append(&format!("{column} = {column}"));
                    frag.append(if negative { "-" } else { "+" });
                    frag.push_bind(assign.field(), assign.value().magnitude());
                }
                SetOp::ToNull => {
                    frag.append(&format!("{column} = NULL"));
                }
            }
        }
        let frag = Self::finish(missing, frag)?;
        tracing::debug!(
            target: "sqlkit.render",
            sql = %frag.sql(),
            binds = frag.bind_count(),
            "rendered set clause"
        );
        Ok(frag)
    }

    // ==================== ORDER BY ====================

    /// Render ORDER BY SQL, leading keyword included. Fields carrying the
    /// [`LOCALE_MARKER`] suffix use the dialect's locale-collation form.
    pub fn order_by_clause(&self, orders: &[OrderSpec]) -> QueryResult<SqlFragment> {
        if orders.is_empty() {
            return Ok(SqlFragment::new());
        }
        let mut frag = SqlFragment::from_text("ORDER BY ");
        let mut missing = Vec::new();
        let mut first = true;
        for order in orders {
            let (field, locale) = match order.field.strip_suffix(LOCALE_MARKER) {
                Some(stripped) => (stripped, true),
                None => (order.field.as_str(), false),
            };
            let Some(column) = self.resolve_field(field, &mut missing) else {
                continue;
            };
            if !first {
                frag.append(", ");
            }
            first = false;
            let expr = if locale {
                self.dialect.locale_order(&column)
            } else {
                column
            };
            frag.append(&format!("{expr} {}", order.dir.as_sql()));
        }
        Self::finish(missing, frag)
    }

    // ==================== Column lists ====================

    /// Comma-joined column list in declared order, optionally filtered to a
    /// field subset. Subset entries that resolve to nothing are reported
    /// together.
    pub fn select_list(&self, subset: Option<&[&str]>) -> QueryResult<String> {
        match subset {
            None => Ok(self.join_columns(&self.major, None)),
            Some(fields) => {
                let mut missing = Vec::new();
                let mut parts = Vec::with_capacity(fields.len());
                for field in fields {
                    match self.major.resolve(field) {
                        Some(def) => parts.push(def.column.clone()),
                        None => missing.push((*field).to_string()),
                    }
                }
                if missing.is_empty() {
                    Ok(parts.join(", "))
                } else {
                    Err(QueryError::UnresolvedFields(missing))
                }
            }
        }
    }

    /// Column list and placeholder list for an INSERT, in declared order.
    pub fn insert_lists(&self, subset: Option<&[&str]>) -> QueryResult<(String, String)> {
        let columns = self.select_list(subset)?;
        let count = columns.split(", ").filter(|s| !s.is_empty()).count();
        let placeholders = vec!["?"; count].join(", ");
        Ok((columns, placeholders))
    }

    fn join_columns(&self, catalog: &Catalog, alias: Option<&str>) -> String {
        catalog
            .columns()
            .iter()
            .map(|def| match alias {
                Some(a) => format!("{a}.{}", def.column),
                None => def.column.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    // ==================== Statements ====================

    /// Assemble a complete SELECT: projection, FROM (with any joins), WHERE,
    /// ORDER BY, and dialect paging.
    pub fn select_statement(
        &self,
        cond: &ConditionGroup,
        orders: &[OrderSpec],
        paging: Option<(u64, u64)>,
    ) -> QueryResult<SqlFragment> {
        let mut frag = SqlFragment::from_text("SELECT ");
        frag.append(&self.projection());
        frag.append(" FROM ");
        self.append_from(&mut frag)?;

        let where_frag = self.where_clause(cond)?;
        if !where_frag.is_empty() {
            frag.append(" ");
            frag.append_fragment(where_frag);
        }
        let order_frag = self.order_by_clause(orders)?;
        if !order_frag.is_empty() {
            frag.append(" ");
            frag.append_fragment(order_frag);
        }
        if let Some((start, rows)) = paging {
            self.dialect.apply_paging(&mut frag, start, rows)?;
        }
        tracing::debug!(
            target: "sqlkit.render",
            sql = %frag.sql(),
            binds = frag.bind_count(),
            dialect = %self.dialect,
            "rendered select statement"
        );
        Ok(frag)
    }

    /// Assemble `SELECT COUNT(*)` over the same FROM/WHERE shape.
    pub fn count_statement(&self, cond: &ConditionGroup) -> QueryResult<SqlFragment> {
        let mut frag = SqlFragment::from_text("SELECT COUNT(*) FROM ");
        self.append_from(&mut frag)?;
        let where_frag = self.where_clause(cond)?;
        if !where_frag.is_empty() {
            frag.append(" ");
            frag.append_fragment(where_frag);
        }
        Ok(frag)
    }

    fn projection(&self) -> String {
        match &self.spec {
            None => self.join_columns(&self.major, None),
            Some(spec) => {
                let mut parts = Vec::new();
                if let Some(major) = spec.major() {
                    if major.result_field().is_some() {
                        parts.push(self.join_columns(&self.major, Some(major.alias())));
                    }
                }
                for join in spec.joins() {
                    if join.table().result_field().is_none() {
                        continue;
                    }
                    if let Some((_, catalog)) = self
                        .aliases
                        .iter()
                        .find(|(a, _)| a == join.table().alias())
                    {
                        parts.push(self.join_columns(catalog, Some(join.table().alias())));
                    }
                }
                parts.join(", ")
            }
        }
    }

    fn append_from(&self, frag: &mut SqlFragment) -> QueryResult<()> {
        match &self.spec {
            None => {
                frag.append(self.major.table());
                Ok(())
            }
            Some(spec) => {
                let major = spec
                    .major()
                    .ok_or_else(|| QueryError::invalid("join spec has no primary table"))?;
                frag.append(&format!("{} {}", self.major.table(), major.alias()));
                let mut missing = Vec::new();
                for join in spec.joins() {
                    let Some((_, catalog)) = self
                        .aliases
                        .iter()
                        .find(|(a, _)| a == join.table().alias())
                    else {
                        continue;
                    };
                    frag.append(&format!(
                        " {} {} {} ON ( ",
                        join.join_type().as_sql(),
                        catalog.table(),
                        join.table().alias()
                    ));
                    self.append_group(join.on_condition(), Logic::And, frag, &mut missing)?;
                    frag.append(" )");
                }
                if missing.is_empty() {
                    Ok(())
                } else {
                    Err(QueryError::UnresolvedFields(missing))
                }
            }
        }
    }
}
