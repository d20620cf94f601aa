//! Condition model for dynamic WHERE clauses.
//!
//! This module provides the tree the compiler walks: [`Predicate`] leaves,
//! [`ConditionGroup`] composites, nested AND/OR [`SubGroup`]s with optional
//! negation, and an opaque [`CustomCondition`] escape hatch for condition
//! types the compiler does not understand structurally.
//!
//! Model objects are built fluently by request-handling code, handed to the
//! compiler once, and only read from there. They carry no synchronization
//! and must not be shared for concurrent mutation.

use crate::error::{QueryError, QueryResult};
use crate::fragment::SqlFragment;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

// ==================== Operators ====================

/// Comparison operator of a [`Predicate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operator {
    #[default]
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Like,
    NotLike,
    StartsWith,
    EndsWith,
    In,
    NotIn,
    Between,
    IsNull,
    IsNotNull,
}

impl Operator {
    /// Parse an operator code. Accepts word codes (`Equals`, `NotLike`, ...)
    /// case-insensitively and the symbol forms (`=`, `!=`, `<`, ...).
    /// A blank code defaults to `Equals`.
    pub fn parse(code: &str) -> QueryResult<Self> {
        let code = code.trim();
        if code.is_empty() {
            return Ok(Operator::Equals);
        }
        let op = match code.to_ascii_lowercase().as_str() {
            "equals" | "=" | "==" => Operator::Equals,
            "notequals" | "!=" | "<>" => Operator::NotEquals,
            "lessthan" | "<" => Operator::LessThan,
            "lessthanorequal" | "<=" => Operator::LessThanOrEqual,
            "greaterthan" | ">" => Operator::GreaterThan,
            "greaterthanorequal" | ">=" => Operator::GreaterThanOrEqual,
            "like" => Operator::Like,
            "notlike" => Operator::NotLike,
            "startswith" => Operator::StartsWith,
            "endswith" => Operator::EndsWith,
            "in" => Operator::In,
            "notin" => Operator::NotIn,
            "between" => Operator::Between,
            "isnull" => Operator::IsNull,
            "isnotnull" => Operator::IsNotNull,
            _ => {
                return Err(QueryError::invalid(format!(
                    "unknown operator code '{code}'"
                )));
            }
        };
        Ok(op)
    }

    /// SQL symbol for the plain relational operators.
    pub(crate) fn symbol(&self) -> Option<&'static str> {
        match self {
            Operator::Equals => Some("="),
            Operator::NotEquals => Some("!="),
            Operator::LessThan => Some("<"),
            Operator::LessThanOrEqual => Some("<="),
            Operator::GreaterThan => Some(">"),
            Operator::GreaterThanOrEqual => Some(">="),
            _ => None,
        }
    }
}

/// Logical connector of a [`SubGroup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Logic {
    #[default]
    And,
    Or,
}

impl Logic {
    /// Parse a logic-type string case-insensitively; anything other than
    /// AND/OR is a construction error.
    pub fn parse(code: &str) -> QueryResult<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "AND" => Ok(Logic::And),
            "OR" => Ok(Logic::Or),
            other => Err(QueryError::invalid(format!("unknown logic type '{other}'"))),
        }
    }

    pub(crate) fn as_sql(&self) -> &'static str {
        match self {
            Logic::And => "AND",
            Logic::Or => "OR",
        }
    }
}

// ==================== Field values ====================

/// The right-hand side of a predicate.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    /// No value supplied (IsNull/IsNotNull, or a skipped predicate).
    #[default]
    None,
    /// A single bound value.
    Single(Value),
    /// An ordered pair (Between).
    Pair(Value, Value),
    /// A value list (In/NotIn).
    List(Vec<Value>),
    /// A reference to another field, resolved through the catalog instead of
    /// bound. Used by join ON conditions (`o.user_id = u.id`).
    Ref(String),
}

impl FieldValue {
    /// A field reference operand.
    pub fn field(name: impl Into<String>) -> Self {
        FieldValue::Ref(name.into())
    }

    /// A single-value operand.
    pub fn single(value: impl Into<Value>) -> Self {
        FieldValue::Single(value.into())
    }

    /// A list operand.
    pub fn list<T: Into<Value>>(values: Vec<T>) -> Self {
        FieldValue::List(values.into_iter().map(Into::into).collect())
    }

    /// A pair operand.
    pub fn pair(first: impl Into<Value>, second: impl Into<Value>) -> Self {
        FieldValue::Pair(first.into(), second.into())
    }

    fn is_blank(&self) -> bool {
        match self {
            FieldValue::None => true,
            FieldValue::Single(v) => v.is_blank(),
            FieldValue::Pair(a, b) => a.is_blank() && b.is_blank(),
            FieldValue::List(vs) => vs.is_empty(),
            FieldValue::Ref(name) => name.trim().is_empty(),
        }
    }
}

impl From<Value> for FieldValue {
    fn from(v: Value) -> Self {
        FieldValue::Single(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Single(v.into())
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Single(v.into())
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Single(v.into())
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Single(v.into())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Single(v.into())
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Single(v.into())
    }
}

impl From<Vec<Value>> for FieldValue {
    fn from(vs: Vec<Value>) -> Self {
        FieldValue::List(vs)
    }
}

// ==================== Field names ====================

/// Split an `alias.field` name at the first dot.
pub(crate) fn split_alias(name: &str) -> (Option<&str>, &str) {
    match name.split_once('.') {
        Some((alias, field)) => (Some(alias), field),
        None => (None, name),
    }
}

/// Generic field-name match: when either side lacks an alias the bare field
/// names are compared; when both carry one, alias and field must both match.
pub(crate) fn field_matches(query: &str, candidate: &str) -> bool {
    let (qa, qf) = split_alias(query);
    let (ca, cf) = split_alias(candidate);
    if qf != cf {
        return false;
    }
    match (qa, ca) {
        (Some(q), Some(c)) => q == c,
        _ => true,
    }
}

// ==================== Predicate ====================

/// A single field comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    field: String,
    op: Operator,
    value: FieldValue,
}

impl Predicate {
    /// Create a predicate from a field name, an operator code string, and a
    /// value. A blank field name is a construction error.
    pub fn new(field: &str, op_code: &str, value: FieldValue) -> QueryResult<Self> {
        Self::with_op(field, Operator::parse(op_code)?, value)
    }

    /// Create a predicate with an already-parsed operator.
    pub fn with_op(field: &str, op: Operator, value: FieldValue) -> QueryResult<Self> {
        if field.trim().is_empty() {
            return Err(QueryError::required("predicate field name"));
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

    pub fn op(&self) -> Operator {
        self.op
    }

    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    /// An empty predicate is skipped by the compiler: its value is absent or
    /// blank and its operator needs one. IsNull/IsNotNull never need a value,
    /// and Between never skips — missing range bounds are a render error,
    /// not an absent condition.
    pub fn is_empty(&self) -> bool {
        match self.op {
            Operator::IsNull | Operator::IsNotNull | Operator::Between => false,
            _ => self.value.is_blank(),
        }
    }

    fn matches(&self, query: &str) -> bool {
        field_matches(query, &self.field)
    }
}

// ==================== Custom conditions ====================

/// An opaque condition the compiler does not understand structurally.
///
/// Custom items render themselves straight into the fragment buffer; the
/// model matches them against caller-supplied names by type name (the full
/// name when the query contains `::`, the trailing segment otherwise).
pub trait CustomCondition: fmt::Debug + Send + Sync {
    /// Type name used for find/remove/contains matching.
    fn type_name(&self) -> &str;

    /// Empty custom conditions are skipped like empty predicates.
    fn is_empty(&self) -> bool;

    /// Render this condition into the fragment buffer.
    fn append_to(&self, frag: &mut SqlFragment);
}

fn custom_matches(query: &str, type_name: &str) -> bool {
    if query.contains("::") {
        query == type_name
    } else {
        type_name.rsplit("::").next() == Some(query)
    }
}

// ==================== Condition items ====================

/// One entry of a [`ConditionGroup`].
#[derive(Debug, Clone)]
pub enum ConditionItem {
    Pred(Predicate),
    Group(SubGroup),
    Custom(Arc<dyn CustomCondition>),
}

impl ConditionItem {
    pub fn is_empty(&self) -> bool {
        match self {
            ConditionItem::Pred(p) => p.is_empty(),
            ConditionItem::Group(g) => g.is_empty(),
            ConditionItem::Custom(c) => c.is_empty(),
        }
    }

    fn matches(&self, query: &str) -> bool {
        match self {
            ConditionItem::Pred(p) => p.matches(query),
            ConditionItem::Group(_) => false,
            ConditionItem::Custom(c) => custom_matches(query, c.type_name()),
        }
    }
}

impl From<Predicate> for ConditionItem {
    fn from(p: Predicate) -> Self {
        ConditionItem::Pred(p)
    }
}

impl From<SubGroup> for ConditionItem {
    fn from(g: SubGroup) -> Self {
        ConditionItem::Group(g)
    }
}

// ==================== ConditionGroup ====================

/// An ordered composite of predicates, nested subgroups, and custom items.
///
/// Siblings are joined with AND at the root; nested [`SubGroup`]s carry their
/// own connector.
#[derive(Debug, Clone, Default)]
pub struct ConditionGroup {
    items: Vec<ConditionItem>,
}

impl ConditionGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[ConditionItem] {
        &self.items
    }

    /// Emptiness is recursive: no items, or every item empty.
    pub fn is_empty(&self) -> bool {
        self.items.iter().all(|i| i.is_empty())
    }

    /// Append an item.
    pub fn push(&mut self, item: impl Into<ConditionItem>) -> &mut Self {
        self.items.push(item.into());
        self
    }

    /// Append an opaque custom condition.
    pub fn push_custom(&mut self, item: Arc<dyn CustomCondition>) -> &mut Self {
        self.items.push(ConditionItem::Custom(item));
        self
    }

    // ==================== Fluent predicates ====================

    /// Add a predicate from an operator code and a single value.
    pub fn on(
        &mut self,
        field: &str,
        op_code: &str,
        value: impl Into<Value>,
    ) -> QueryResult<&mut Self> {
        self.push(Predicate::new(field, op_code, FieldValue::single(value))?);
        Ok(self)
    }

    /// Add a predicate over a value list (In/NotIn/Between).
    pub fn on_values(
        &mut self,
        field: &str,
        op_code: &str,
        values: Vec<Value>,
    ) -> QueryResult<&mut Self> {
        self.push(Predicate::new(field, op_code, FieldValue::List(values))?);
        Ok(self)
    }

    /// Add a predicate comparing this field against another field.
    pub fn on_field(
        &mut self,
        field: &str,
        op_code: &str,
        other: &str,
    ) -> QueryResult<&mut Self> {
        self.push(Predicate::new(field, op_code, FieldValue::field(other))?);
        Ok(self)
    }

    /// Add: field = value
    pub fn eq(&mut self, field: &str, value: impl Into<Value>) -> QueryResult<&mut Self> {
        self.push(Predicate::with_op(
            field,
            Operator::Equals,
            FieldValue::single(value),
        )?);
        Ok(self)
    }

    /// Add: field != value
    pub fn ne(&mut self, field: &str, value: impl Into<Value>) -> QueryResult<&mut Self> {
        self.push(Predicate::with_op(
            field,
            Operator::NotEquals,
            FieldValue::single(value),
        )?);
        Ok(self)
    }

    /// Add: field > value
    pub fn gt(&mut self, field: &str, value: impl Into<Value>) -> QueryResult<&mut Self> {
        self.push(Predicate::with_op(
            field,
            Operator::GreaterThan,
            FieldValue::single(value),
        )?);
        Ok(self)
    }

    /// Add: field >= value
    pub fn gte(&mut self, field: &str, value: impl Into<Value>) -> QueryResult<&mut Self> {
        self.push(Predicate::with_op(
            field,
            Operator::GreaterThanOrEqual,
            FieldValue::single(value),
        )?);
        Ok(self)
    }

    /// Add: field < value
    pub fn lt(&mut self, field: &str, value: impl Into<Value>) -> QueryResult<&mut Self> {
        self.push(Predicate::with_op(
            field,
            Operator::LessThan,
            FieldValue::single(value),
        )?);
        Ok(self)
    }

    /// Add: field <= value
    pub fn lte(&mut self, field: &str, value: impl Into<Value>) -> QueryResult<&mut Self> {
        self.push(Predicate::with_op(
            field,
            Operator::LessThanOrEqual,
            FieldValue::single(value),
        )?);
        Ok(self)
    }

    /// Add: field LIKE %value%
    pub fn like(&mut self, field: &str, value: impl Into<Value>) -> QueryResult<&mut Self> {
        self.push(Predicate::with_op(
            field,
            Operator::Like,
            FieldValue::single(value),
        )?);
        Ok(self)
    }

    /// Add: field NOT LIKE %value%
    pub fn not_like(&mut self, field: &str, value: impl Into<Value>) -> QueryResult<&mut Self> {
        self.push(Predicate::with_op(
            field,
            Operator::NotLike,
            FieldValue::single(value),
        )?);
        Ok(self)
    }

    /// Add: field LIKE value%
    pub fn starts_with(&mut self, field: &str, value: impl Into<Value>) -> QueryResult<&mut Self> {
        self.push(Predicate::with_op(
            field,
            Operator::StartsWith,
            FieldValue::single(value),
        )?);
        Ok(self)
    }

    /// Add: field LIKE %value
    pub fn ends_with(&mut self, field: &str, value: impl Into<Value>) -> QueryResult<&mut Self> {
        self.push(Predicate::with_op(
            field,
            Operator::EndsWith,
            FieldValue::single(value),
        )?);
        Ok(self)
    }

    /// Add: field IN (values...)
    pub fn in_list<T: Into<Value>>(&mut self, field: &str, values: Vec<T>) -> QueryResult<&mut Self> {
        self.push(Predicate::with_op(
            field,
            Operator::In,
            FieldValue::list(values),
        )?);
        Ok(self)
    }

    /// Add: field NOT IN (values...)
    pub fn not_in<T: Into<Value>>(&mut self, field: &str, values: Vec<T>) -> QueryResult<&mut Self> {
        self.push(Predicate::with_op(
            field,
            Operator::NotIn,
            FieldValue::list(values),
        )?);
        Ok(self)
    }

    /// Add: field BETWEEN first AND second
    pub fn between(
        &mut self,
        field: &str,
        first: impl Into<Value>,
        second: impl Into<Value>,
    ) -> QueryResult<&mut Self> {
        self.push(Predicate::with_op(
            field,
            Operator::Between,
            FieldValue::pair(first, second),
        )?);
        Ok(self)
    }

    /// Add: field IS NULL
    pub fn is_null(&mut self, field: &str) -> QueryResult<&mut Self> {
        self.push(Predicate::with_op(field, Operator::IsNull, FieldValue::None)?);
        Ok(self)
    }

    /// Add: field IS NOT NULL
    pub fn is_not_null(&mut self, field: &str) -> QueryResult<&mut Self> {
        self.push(Predicate::with_op(
            field,
            Operator::IsNotNull,
            FieldValue::None,
        )?);
        Ok(self)
    }

    /// Open a nested subgroup with the given logic type. The returned builder
    /// holds a back-reference to this group; `end()` attaches the subgroup
    /// and hands the group back for further chaining.
    pub fn sub(&mut self, logic: &str) -> QueryResult<SubGroupBuilder<'_>> {
        let logic = Logic::parse(logic)?;
        Ok(SubGroupBuilder {
            parent: self,
            logic,
            positive: true,
            group: ConditionGroup::new(),
        })
    }

    // ==================== Search / mutation ====================

    /// All items matching a field name (or a custom-condition type name),
    /// descending recursively into nested groups.
    pub fn find(&self, name: &str) -> Vec<&ConditionItem> {
        let mut out = Vec::new();
        self.find_into(name, &mut out);
        out
    }

    fn find_into<'a>(&'a self, name: &str, out: &mut Vec<&'a ConditionItem>) {
        for item in &self.items {
            if item.matches(name) {
                out.push(item);
            }
            if let ConditionItem::Group(sub) = item {
                sub.group.find_into(name, out);
            }
        }
    }

    /// True iff any item anywhere in the tree matches the name.
    pub fn contains(&self, name: &str) -> bool {
        self.items.iter().any(|item| {
            item.matches(name)
                || matches!(item, ConditionItem::Group(sub) if sub.group.contains(name))
        })
    }

    /// Remove and return every item matching the name, descending into
    /// nested groups.
    pub fn remove(&mut self, name: &str) -> Vec<ConditionItem> {
        let mut removed = Vec::new();
        self.remove_into(name, &mut removed);
        removed
    }

    fn remove_into(&mut self, name: &str, removed: &mut Vec<ConditionItem>) {
        let mut i = 0;
        while i < self.items.len() {
            if self.items[i].matches(name) {
                removed.push(self.items.remove(i));
                continue;
            }
            if let ConditionItem::Group(sub) = &mut self.items[i] {
                sub.group.remove_into(name, removed);
            }
            i += 1;
        }
    }

    /// Overwrite the operator and value of the first predicate whose field
    /// matches the replacement's. Returns the number of replacements (0 or 1).
    pub fn replace(&mut self, replacement: Predicate) -> usize {
        self.replace_first(&replacement)
    }

    fn replace_first(&mut self, replacement: &Predicate) -> usize {
        for item in &mut self.items {
            match item {
                ConditionItem::Pred(p) if p.matches(&replacement.field) => {
                    p.op = replacement.op;
                    p.value = replacement.value.clone();
                    return 1;
                }
                ConditionItem::Group(sub) => {
                    if sub.group.replace_first(replacement) == 1 {
                        return 1;
                    }
                }
                _ => {}
            }
        }
        0
    }
}

// ==================== SubGroup ====================

/// A nested, logically-connected, optionally negated condition subtree.
#[derive(Debug, Clone)]
pub struct SubGroup {
    logic: Logic,
    positive: bool,
    group: ConditionGroup,
}

impl SubGroup {
    /// Wrap a group under the given logic type.
    pub fn new(logic: &str, group: ConditionGroup) -> QueryResult<Self> {
        Ok(Self {
            logic: Logic::parse(logic)?,
            positive: true,
            group,
        })
    }

    /// Mark the rendered group for logical negation.
    pub fn negated(mut self) -> Self {
        self.positive = false;
        self
    }

    pub fn logic(&self) -> Logic {
        self.logic
    }

    pub fn positive(&self) -> bool {
        self.positive
    }

    pub fn group(&self) -> &ConditionGroup {
        &self.group
    }

    pub fn is_empty(&self) -> bool {
        self.group.is_empty()
    }
}

/// Builder for a nested subgroup, holding a back-reference to the parent
/// group. The back-reference is purely navigational; the parent owns the
/// subgroup once `end()` attaches it.
pub struct SubGroupBuilder<'a> {
    parent: &'a mut ConditionGroup,
    logic: Logic,
    positive: bool,
    group: ConditionGroup,
}

impl<'a> SubGroupBuilder<'a> {
    /// Add a predicate from an operator code and a single value.
    pub fn on(mut self, field: &str, op_code: &str, value: impl Into<Value>) -> QueryResult<Self> {
        self.group.on(field, op_code, value)?;
        Ok(self)
    }

    /// Add a predicate over a value list (In/NotIn/Between).
    pub fn on_values(mut self, field: &str, op_code: &str, values: Vec<Value>) -> QueryResult<Self> {
        self.group.on_values(field, op_code, values)?;
        Ok(self)
    }

    /// Add a predicate comparing this field against another field.
    pub fn on_field(mut self, field: &str, op_code: &str, other: &str) -> QueryResult<Self> {
        self.group.on_field(field, op_code, other)?;
        Ok(self)
    }

    /// Add: field BETWEEN first AND second
    pub fn between(
        mut self,
        field: &str,
        first: impl Into<Value>,
        second: impl Into<Value>,
    ) -> QueryResult<Self> {
        self.group.between(field, first, second)?;
        Ok(self)
    }

    /// Add: field IS NULL
    pub fn is_null(mut self, field: &str) -> QueryResult<Self> {
        self.group.is_null(field)?;
        Ok(self)
    }

    /// Add: field IS NOT NULL
    pub fn is_not_null(mut self, field: &str) -> QueryResult<Self> {
        self.group.is_not_null(field)?;
        Ok(self)
    }

    /// Attach a prebuilt subgroup (deeper nesting composes through values).
    pub fn push_sub(mut self, sub: SubGroup) -> Self {
        self.group.push(sub);
        self
    }

    /// Mark the subgroup for logical negation.
    pub fn negate(mut self) -> Self {
        self.positive = false;
        self
    }

    /// Attach the finished subgroup to the parent and return the parent for
    /// further chaining.
    pub fn end(self) -> &'a mut ConditionGroup {
        self.parent.push(SubGroup {
            logic: self.logic,
            positive: self.positive,
            group: self.group,
        });
        self.parent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct ExistsBlock;

    impl CustomCondition for ExistsBlock {
        fn type_name(&self) -> &str {
            "sqlkit::tests::ExistsBlock"
        }

        fn is_empty(&self) -> bool {
            false
        }

        fn append_to(&self, frag: &mut SqlFragment) {
            frag.append("EXISTS ( SELECT 1 )");
        }
    }

    #[test]
    fn blank_field_is_rejected() {
        let err = Predicate::new("", "=", FieldValue::single(1)).unwrap_err();
        assert!(matches!(err, QueryError::RequiredField(_)));
        let err = Predicate::new("   ", "=", FieldValue::single(1)).unwrap_err();
        assert!(matches!(err, QueryError::RequiredField(_)));
    }

    #[test]
    fn operator_codes_parse_both_forms() {
        assert_eq!(Operator::parse("=").unwrap(), Operator::Equals);
        assert_eq!(Operator::parse("Equals").unwrap(), Operator::Equals);
        assert_eq!(Operator::parse("notlike").unwrap(), Operator::NotLike);
        assert_eq!(Operator::parse("<>").unwrap(), Operator::NotEquals);
        assert_eq!(Operator::parse("").unwrap(), Operator::Equals);
        assert!(Operator::parse("resembles").is_err());
    }

    #[test]
    fn logic_type_is_canonicalized() {
        assert_eq!(Logic::parse("or").unwrap(), Logic::Or);
        assert_eq!(Logic::parse("And").unwrap(), Logic::And);
        let err = Logic::parse("xor").unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn emptiness_is_recursive() {
        let mut group = ConditionGroup::new();
        assert!(group.is_empty());

        // A predicate with a blank value stays empty.
        group.on("name", "=", "").unwrap();
        assert!(group.is_empty());

        // An all-empty subgroup stays empty.
        group.sub("or").unwrap().on("a", "=", Value::Null).unwrap().end();
        assert!(group.is_empty());

        group.on("name", "=", "bob").unwrap();
        assert!(!group.is_empty());
    }

    #[test]
    fn null_checks_are_never_empty() {
        let mut group = ConditionGroup::new();
        group.is_null("deleted_at").unwrap();
        assert!(!group.is_empty());
    }

    #[test]
    fn find_descends_into_subgroups() {
        let mut group = ConditionGroup::new();
        group.on("status", "=", "active").unwrap();
        group
            .sub("or")
            .unwrap()
            .on("status", "=", "pending")
            .unwrap()
            .on("kind", "=", 2)
            .unwrap()
            .end();

        assert_eq!(group.find("status").len(), 2);
        assert_eq!(group.find("kind").len(), 1);
        assert!(group.find("missing").is_empty());
    }

    #[test]
    fn alias_matching_rule() {
        let mut group = ConditionGroup::new();
        group.on("u.name", "=", "bob").unwrap();
        group.on("name", "=", "alice").unwrap();

        // Bare query matches both; alias-qualified query matches only the
        // aliased predicate plus the bare one.
        assert_eq!(group.find("name").len(), 2);
        assert_eq!(group.find("u.name").len(), 2);

        group.on("o.name", "=", "carol").unwrap();
        assert_eq!(group.find("u.name").len(), 2);
        assert_eq!(group.find("name").len(), 3);
    }

    #[test]
    fn remove_returns_matches() {
        let mut group = ConditionGroup::new();
        group.on("a", "=", 1).unwrap();
        group
            .sub("or")
            .unwrap()
            .on("a", "=", 2)
            .unwrap()
            .on("b", "=", 3)
            .unwrap()
            .end();

        let removed = group.remove("a");
        assert_eq!(removed.len(), 2);
        assert!(group.find("a").is_empty());
        assert_eq!(group.find("b").len(), 1);
    }

    #[test]
    fn replace_mutates_first_match_only() {
        let mut group = ConditionGroup::new();
        group.on("score", ">", 10).unwrap();
        group.on("score", ">", 20).unwrap();

        let replacement =
            Predicate::new("score", "<", FieldValue::single(5)).unwrap();
        assert_eq!(group.replace(replacement), 1);

        let found = group.find("score");
        let ConditionItem::Pred(first) = found[0] else {
            panic!("expected predicate");
        };
        assert_eq!(first.op(), Operator::LessThan);
        let ConditionItem::Pred(second) = found[1] else {
            panic!("expected predicate");
        };
        assert_eq!(second.op(), Operator::GreaterThan);
    }

    #[test]
    fn replace_without_match_counts_zero() {
        let mut group = ConditionGroup::new();
        group.on("a", "=", 1).unwrap();
        let replacement = Predicate::new("zzz", "=", FieldValue::single(2)).unwrap();
        assert_eq!(group.replace(replacement), 0);
    }

    #[test]
    fn custom_items_match_by_type_name() {
        let mut group = ConditionGroup::new();
        group.push_custom(Arc::new(ExistsBlock));

        assert!(group.contains("ExistsBlock"));
        assert!(group.contains("sqlkit::tests::ExistsBlock"));
        assert!(!group.contains("sqlkit::other::ExistsBlock"));
        assert!(!group.contains("Exists"));

        let removed = group.remove("ExistsBlock");
        assert_eq!(removed.len(), 1);
        assert!(group.items().is_empty());
    }

    #[test]
    fn subgroup_builder_resumes_parent() {
        let mut group = ConditionGroup::new();
        group
            .on("a", "=", 1)
            .unwrap()
            .sub("or")
            .unwrap()
            .on("b", "Like", "x")
            .unwrap()
            .on("c", "Like", "x")
            .unwrap()
            .end()
            .on("d", "=", 4)
            .unwrap();

        assert_eq!(group.items().len(), 3);
        assert!(matches!(group.items()[1], ConditionItem::Group(_)));
    }

    #[test]
    fn negated_subgroup_keeps_flag() {
        let mut group = ConditionGroup::new();
        group
            .sub("or")
            .unwrap()
            .on("a", "=", 1)
            .unwrap()
            .negate()
            .end();

        let ConditionItem::Group(sub) = &group.items()[0] else {
            panic!("expected subgroup");
        };
        assert!(!sub.positive());
        assert_eq!(sub.logic(), Logic::Or);
    }
}
