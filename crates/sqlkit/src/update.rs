//! Update-assignment model for SET clauses.
//!
//! [`UpdateSet`] is the sibling root type to
//! [`ConditionGroup`](crate::condition::ConditionGroup): the same flat
//! field/value storage, but assignments never nest and the operator
//! vocabulary is restricted to `Set`, `Add`, and `ToNull`.

use crate::error::{QueryError, QueryResult};
use crate::value::Value;

/// Assignment operator of an [`Assignment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SetOp {
    /// column = value
    #[default]
    Set,
    /// column = column ± value (sign taken from the value itself)
    Add,
    /// column = NULL (value ignored)
    ToNull,
}

impl SetOp {
    /// Parse an assignment operator code. Blank defaults to `Set`.
    pub fn parse(code: &str) -> QueryResult<Self> {
        let code = code.trim();
        if code.is_empty() {
            return Ok(SetOp::Set);
        }
        match code.to_ascii_lowercase().as_str() {
            "set" => Ok(SetOp::Set),
            "add" => Ok(SetOp::Add),
            "tonull" => Ok(SetOp::ToNull),
            other => Err(QueryError::invalid(format!(
                "unknown assignment operator '{other}'"
            ))),
        }
    }
}

/// A single update assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    field: String,
    op: SetOp,
    value: Value,
}

impl Assignment {
    /// Create an assignment. A blank field name is a construction error.
    pub fn new(field: &str, op: SetOp, value: Value) -> QueryResult<Self> {
        if field.trim().is_empty() {
            return Err(QueryError::required("assignment field name"));
        }
        Ok(Self {
            field: field.to_string(),
            op,
            value,
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn op(&self) -> SetOp {
        self.op
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Blank-value assignments are silently skipped at render time, except
    /// `ToNull` which carries no value by design.
    pub fn is_empty(&self) -> bool {
        match self.op {
            SetOp::ToNull => false,
            _ => self.value.is_blank(),
        }
    }
}

/// A flat, ordered list of update assignments.
#[derive(Debug, Clone, Default)]
pub struct UpdateSet {
    items: Vec<Assignment>,
}

impl UpdateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[Assignment] {
        &self.items
    }

    /// True iff no assignment would render.
    pub fn is_empty(&self) -> bool {
        self.items.iter().all(|a| a.is_empty())
    }

    /// Add: field = value
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> QueryResult<&mut Self> {
        self.items
            .push(Assignment::new(field, SetOp::Set, value.into())?);
        Ok(self)
    }

    /// Add: field = field ± value (sign-aware numeric increment)
    pub fn add(&mut self, field: &str, value: impl Into<Value>) -> QueryResult<&mut Self> {
        self.items
            .push(Assignment::new(field, SetOp::Add, value.into())?);
        Ok(self)
    }

    /// Add: field = NULL
    pub fn to_null(&mut self, field: &str) -> QueryResult<&mut Self> {
        self.items
            .push(Assignment::new(field, SetOp::ToNull, Value::Null)?);
        Ok(self)
    }

    /// Add an assignment from an operator code string.
    pub fn assign(
        &mut self,
        field: &str,
        op_code: &str,
        value: impl Into<Value>,
    ) -> QueryResult<&mut Self> {
        self.items
            .push(Assignment::new(field, SetOp::parse(op_code)?, value.into())?);
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn op_codes_parse() {
        assert_eq!(SetOp::parse("").unwrap(), SetOp::Set);
        assert_eq!(SetOp::parse("Set").unwrap(), SetOp::Set);
        assert_eq!(SetOp::parse("add").unwrap(), SetOp::Add);
        assert_eq!(SetOp::parse("ToNull").unwrap(), SetOp::ToNull);
        assert!(SetOp::parse("increment").is_err());
    }

    #[test]
    fn blank_field_is_rejected() {
        let err = Assignment::new(" ", SetOp::Set, Value::Int(1)).unwrap_err();
        assert!(matches!(err, QueryError::RequiredField(_)));
    }

    #[test]
    fn blank_values_skip_except_to_null() {
        let mut set = UpdateSet::new();
        set.set("name", "").unwrap();
        assert!(set.is_empty());

        set.to_null("note").unwrap();
        assert!(!set.is_empty());
    }

    #[test]
    fn fluent_chain_keeps_order() {
        let mut set = UpdateSet::new();
        set.set("name", "Bob")
            .unwrap()
            .add("score", 10)
            .unwrap()
            .to_null("note")
            .unwrap();

        let fields: Vec<_> = set.items().iter().map(|a| a.field()).collect();
        assert_eq!(fields, vec!["name", "score", "note"]);
    }
}
