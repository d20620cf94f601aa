//! Multi-table join specifications.
//!
//! A [`JoinSpec`] names a primary table plus an ordered list of joined
//! tables, each carrying its own join type and ON condition. The ON
//! condition is an ordinary [`ConditionGroup`]; field references across
//! tables are expressed with [`FieldValue::field`].

use crate::condition::{ConditionGroup, FieldValue, Predicate};
use crate::error::{QueryError, QueryResult};
use crate::ident::validate_ident;

/// Join type of a [`JoinRef`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
}

impl JoinType {
    /// Parse a join-type string case-insensitively.
    pub fn parse(code: &str) -> QueryResult<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "inner" => Ok(JoinType::Inner),
            "left" => Ok(JoinType::Left),
            "right" => Ok(JoinType::Right),
            "full" => Ok(JoinType::Full),
            other => Err(QueryError::invalid(format!("unknown join type '{other}'"))),
        }
    }

    pub(crate) fn as_sql(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
            JoinType::Right => "RIGHT JOIN",
            JoinType::Full => "FULL JOIN",
        }
    }
}

/// A table participating in a query: entity name, alias, and the field of
/// the caller's result shape that receives this table's rows (`"this"` for
/// the root shape; `None` when the table only participates in joining).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    entity: String,
    alias: String,
    result_field: Option<String>,
}

impl TableRef {
    pub fn new(entity: &str, alias: &str) -> QueryResult<Self> {
        if entity.trim().is_empty() {
            return Err(QueryError::required("table entity name"));
        }
        validate_ident(alias)?;
        Ok(Self {
            entity: entity.to_string(),
            alias: alias.to_string(),
            result_field: None,
        })
    }

    /// Designate the result field receiving this table's row data.
    pub fn with_result(mut self, result_field: &str) -> Self {
        self.result_field = Some(result_field.to_string());
        self
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn result_field(&self) -> Option<&str> {
        self.result_field.as_deref()
    }

    fn key_segment(&self) -> String {
        let mut seg = self.entity.clone();
        seg.push(':');
        seg.push_str(&self.alias);
        if let Some(rf) = &self.result_field {
            seg.push(':');
            seg.push_str(rf);
        }
        seg
    }
}

/// A joined table: the table reference plus join type and ON condition.
#[derive(Debug, Clone)]
pub struct JoinRef {
    table: TableRef,
    join_type: JoinType,
    on: ConditionGroup,
}

impl JoinRef {
    pub fn table(&self) -> &TableRef {
        &self.table
    }

    pub fn join_type(&self) -> JoinType {
        self.join_type
    }

    pub fn on_condition(&self) -> &ConditionGroup {
        &self.on
    }
}

/// A primary table plus an ordered list of joined tables.
#[derive(Debug, Clone, Default)]
pub struct JoinSpec {
    major: Option<TableRef>,
    joins: Vec<JoinRef>,
}

impl JoinSpec {
    /// Start a spec from the primary table, projected into the root result
    /// shape.
    pub fn new(entity: &str, alias: &str) -> QueryResult<Self> {
        Ok(Self {
            major: Some(TableRef::new(entity, alias)?.with_result("this")),
            joins: Vec::new(),
        })
    }

    /// Start a spec from an explicit primary table reference.
    pub fn from_table(major: TableRef) -> Self {
        Self {
            major: Some(major),
            joins: Vec::new(),
        }
    }

    pub fn major(&self) -> Option<&TableRef> {
        self.major.as_ref()
    }

    pub fn joins(&self) -> &[JoinRef] {
        &self.joins
    }

    /// Open an INNER JOIN. The returned builder must receive at least one
    /// `on(...)` before the join can be finalized.
    pub fn inner_join(&mut self, entity: &str, alias: &str) -> QueryResult<JoinBuilder<'_>> {
        self.join(JoinType::Inner, entity, alias)
    }

    /// Open a LEFT JOIN.
    pub fn left_join(&mut self, entity: &str, alias: &str) -> QueryResult<JoinBuilder<'_>> {
        self.join(JoinType::Left, entity, alias)
    }

    /// Open a RIGHT JOIN.
    pub fn right_join(&mut self, entity: &str, alias: &str) -> QueryResult<JoinBuilder<'_>> {
        self.join(JoinType::Right, entity, alias)
    }

    /// Open a FULL JOIN.
    pub fn full_join(&mut self, entity: &str, alias: &str) -> QueryResult<JoinBuilder<'_>> {
        self.join(JoinType::Full, entity, alias)
    }

    /// Open a join of the given type.
    pub fn join(
        &mut self,
        join_type: JoinType,
        entity: &str,
        alias: &str,
    ) -> QueryResult<JoinBuilder<'_>> {
        let table = TableRef::new(entity, alias)?;
        Ok(JoinBuilder {
            spec: self,
            table,
            join_type,
        })
    }

    /// Deterministic cache key: `entity[:alias][:result_field]` per table,
    /// major first then joins in order, joined by `+`. Join order affects
    /// emitted SQL, so it affects cache identity.
    pub fn cache_key(&self) -> String {
        let mut segments = Vec::with_capacity(1 + self.joins.len());
        if let Some(major) = &self.major {
            segments.push(major.key_segment());
        }
        for join in &self.joins {
            segments.push(join.table.key_segment());
        }
        segments.join("+")
    }
}

/// First stage of the join builder: only `on(...)` is available, so every
/// join carries at least one ON predicate.
pub struct JoinBuilder<'a> {
    spec: &'a mut JoinSpec,
    table: TableRef,
    join_type: JoinType,
}

impl<'a> JoinBuilder<'a> {
    /// Designate the result field receiving this table's row data.
    pub fn result(mut self, result_field: &str) -> Self {
        self.table = self.table.with_result(result_field);
        self
    }

    /// Add the first ON predicate. The value may be a plain
    /// [`Value`](crate::value::Value) (bound) or a [`FieldValue::field`]
    /// reference (resolved to the other table's column).
    pub fn on(
        self,
        field: &str,
        op_code: &str,
        value: impl Into<FieldValue>,
    ) -> QueryResult<JoinOnBuilder<'a>> {
        let mut on = ConditionGroup::new();
        on.push(Predicate::new(field, op_code, value.into())?);
        Ok(JoinOnBuilder {
            spec: self.spec,
            join: JoinRef {
                table: self.table,
                join_type: self.join_type,
                on,
            },
        })
    }
}

/// Second stage of the join builder: additional `and(...)` predicates, then
/// `end()` attaches the join and hands the spec back.
pub struct JoinOnBuilder<'a> {
    spec: &'a mut JoinSpec,
    join: JoinRef,
}

impl<'a> JoinOnBuilder<'a> {
    /// AND-combine another predicate into this join's ON condition.
    pub fn and(
        mut self,
        field: &str,
        op_code: &str,
        value: impl Into<FieldValue>,
    ) -> QueryResult<Self> {
        self.join
            .on
            .push(Predicate::new(field, op_code, value.into())?);
        Ok(self)
    }

    /// Attach the join and return the spec for further chaining.
    pub fn end(self) -> &'a mut JoinSpec {
        self.spec.joins.push(self.join);
        self.spec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec_with_join() -> JoinSpec {
        let mut spec = JoinSpec::new("User", "u").unwrap();
        spec.inner_join("Order", "o")
            .unwrap()
            .result("orders")
            .on("o.user_id", "=", FieldValue::field("u.id"))
            .unwrap()
            .and("o.state", "=", "open")
            .unwrap()
            .end();
        spec
    }

    #[test]
    fn join_carries_its_own_condition() {
        let spec = spec_with_join();
        assert_eq!(spec.joins().len(), 1);
        let join = &spec.joins()[0];
        assert_eq!(join.join_type(), JoinType::Inner);
        assert_eq!(join.on_condition().items().len(), 2);
    }

    #[test]
    fn cache_key_is_order_sensitive() {
        let spec = spec_with_join();
        assert_eq!(spec.cache_key(), "User:u:this+Order:o:orders");

        let mut other = JoinSpec::new("User", "u").unwrap();
        other
            .left_join("Account", "a")
            .unwrap()
            .on("a.user_id", "=", FieldValue::field("u.id"))
            .unwrap()
            .end()
            .inner_join("Order", "o")
            .unwrap()
            .on("o.user_id", "=", FieldValue::field("u.id"))
            .unwrap()
            .end();
        assert_eq!(other.cache_key(), "User:u:this+Account:a+Order:o");
    }

    #[test]
    fn join_only_table_omits_result_segment() {
        let mut spec = JoinSpec::new("User", "u").unwrap();
        spec.left_join("Login", "l")
            .unwrap()
            .on("l.user_id", "=", FieldValue::field("u.id"))
            .unwrap()
            .end();
        assert_eq!(spec.joins()[0].table().result_field(), None);
        assert_eq!(spec.cache_key(), "User:u:this+Login:l");
    }

    #[test]
    fn invalid_alias_is_rejected() {
        assert!(TableRef::new("User", "bad alias").is_err());
        assert!(TableRef::new("", "u").is_err());
    }

    #[test]
    fn join_type_parsing() {
        assert_eq!(JoinType::parse("LEFT").unwrap(), JoinType::Left);
        assert!(JoinType::parse("cross").is_err());
    }
}
