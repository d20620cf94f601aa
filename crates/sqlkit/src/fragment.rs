//! SQL fragment buffer.
//!
//! [`SqlFragment`] stores SQL text and bound variables separately: a fragment
//! is an ordered list of segments, each either literal text or a bound
//! variable placeholder. Placeholder positions stay correct while text is
//! appended, prepended, or whole fragments are embedded into one another,
//! which is what lets the Oracle/DB2 paging strategies wrap an
//! already-rendered statement after the fact.
//!
//! Rendering emits positional `?` placeholders. Bound variables carry a
//! logical name for diagnostics, but two predicates on the same field each
//! get their own placeholder under that shared name, so downstream binding
//! MUST be by position, never by name.

use crate::value::Value;

/// A bound variable: the logical field name it came from plus its value.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub name: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Text(String),
    Bind(Binding),
}

/// An accumulator of SQL text interleaved with bound-variable placeholders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlFragment {
    segments: Vec<Segment>,
}

impl SqlFragment {
    /// Create an empty fragment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fragment from an initial piece of SQL text.
    pub fn from_text(sql: impl Into<String>) -> Self {
        let mut frag = Self::new();
        frag.append(&sql.into());
        frag
    }

    /// True iff the fragment holds no segments at all.
    ///
    /// This distinguishes "no condition" from "condition rendered to empty
    /// text": a fragment that ever received text is non-empty even if that
    /// text was later wrapped.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Append raw SQL text. Merges into a trailing text segment.
    pub fn append(&mut self, sql: &str) -> &mut Self {
        if sql.is_empty() {
            return self;
        }
        match self.segments.last_mut() {
            Some(Segment::Text(last)) => last.push_str(sql),
            _ => self.segments.push(Segment::Text(sql.to_string())),
        }
        self
    }

    /// Insert raw SQL text at the front. Merges into a leading text segment.
    ///
    /// Used to wrap an already-rendered statement in dialect paging shells.
    pub fn prepend(&mut self, sql: &str) -> &mut Self {
        if sql.is_empty() {
            return self;
        }
        match self.segments.first_mut() {
            Some(Segment::Text(first)) => first.insert_str(0, sql),
            _ => self.segments.insert(0, Segment::Text(sql.to_string())),
        }
        self
    }

    /// Append a bound-variable placeholder.
    pub fn push_bind(&mut self, name: impl Into<String>, value: Value) -> &mut Self {
        self.segments.push(Segment::Bind(Binding {
            name: name.into(),
            value,
        }));
        self
    }

    /// Embed another fragment, consuming it.
    ///
    /// The embedded fragment's segments are spliced in verbatim, so its
    /// internal variable order is preserved and overall variable order stays
    /// depth-first, left-to-right over the source tree.
    pub fn append_fragment(&mut self, other: SqlFragment) -> &mut Self {
        for seg in other.segments {
            match seg {
                Segment::Text(text) => {
                    self.append(&text);
                }
                Segment::Bind(bind) => {
                    self.segments.push(Segment::Bind(bind));
                }
            }
        }
        self
    }

    /// Number of bound variables in the fragment.
    pub fn bind_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Bind(_)))
            .count()
    }

    /// Render the SQL text with positional `?` placeholders.
    pub fn sql(&self) -> String {
        let mut out = String::new();
        for seg in &self.segments {
            match seg {
                Segment::Text(s) => out.push_str(s),
                Segment::Bind(_) => out.push('?'),
            }
        }
        out
    }

    /// The ordered bound-variable list, positionally matching `sql()`.
    pub fn bindings(&self) -> Vec<&Binding> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Bind(b) => Some(b),
                _ => None,
            })
            .collect()
    }

    /// Consume the fragment into `(sql, ordered bindings)`.
    pub fn into_parts(self) -> (String, Vec<Binding>) {
        let sql = self.sql();
        let binds = self
            .segments
            .into_iter()
            .filter_map(|s| match s {
                Segment::Bind(b) => Some(b),
                _ => None,
            })
            .collect();
        (sql, binds)
    }
}
