//! Query Specifications
//!
//! A specification is a backend-agnostic boolean predicate tree. Leaves test a
//! single field; composites combine other specifications with AND / OR / NOT.
//! Nothing here knows about SQL; the translator lowers a tree into a relational
//! predicate.
//!
//! ```
//! use inv_queries::specification::{Operator, Specification};
//!
//! let spec = Specification::eq("brand", "Apple")
//!     .should(Specification::eq("brand", "Samsung"));
//!
//! assert_eq!(spec.operator(), Operator::Should);
//! assert_eq!(spec.children().len(), 2);
//! ```

use std::fmt;

use crate::value::Value;

/// Operator tag of a specification node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// field = value
    Eq,
    /// field IN (values)
    In,
    /// field LIKE pattern
    Like,
    /// lo <= field <= hi
    Between,
    /// Full-text match
    FullText,
    /// Conjunction of all children
    Must,
    /// Disjunction of all children
    Should,
    /// Negation of the single child
    MustNot,
}

impl Operator {
    pub fn is_composite(&self) -> bool {
        matches!(self, Self::Must | Self::Should | Self::MustNot)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::In => "in",
            Self::Like => "like",
            Self::Between => "between",
            Self::FullText => "full_text",
            Self::Must => "must",
            Self::Should => "should",
            Self::MustNot => "must_not",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node of the predicate tree
///
/// `MustNot` holds exactly one child by construction, so a negation without
/// an operand cannot be built.
#[derive(Debug, Clone, PartialEq)]
pub enum Specification {
    Eq { field: String, value: Value },
    In { field: String, values: Vec<Value> },
    Like { field: String, pattern: String },
    Between { field: String, low: Value, high: Value },
    FullText { field: String, query: String },
    Must(Vec<Specification>),
    Should(Vec<Specification>),
    MustNot(Box<Specification>),
}

/// Borrowed view of a leaf's operand
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand<'a> {
    Scalar(&'a Value),
    List(&'a [Value]),
    Pair(&'a Value, &'a Value),
    Text(&'a str),
}

/// Which composite a combinator builds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Must,
    Should,
}

impl Specification {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn in_list<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::In {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn like(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::Like {
            field: field.into(),
            pattern: pattern.into(),
        }
    }

    pub fn between(
        field: impl Into<String>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        Self::Between {
            field: field.into(),
            low: low.into(),
            high: high.into(),
        }
    }

    pub fn full_text(field: impl Into<String>, query: impl Into<String>) -> Self {
        Self::FullText {
            field: field.into(),
            query: query.into(),
        }
    }

    pub fn operator(&self) -> Operator {
        match self {
            Self::Eq { .. } => Operator::Eq,
            Self::In { .. } => Operator::In,
            Self::Like { .. } => Operator::Like,
            Self::Between { .. } => Operator::Between,
            Self::FullText { .. } => Operator::FullText,
            Self::Must(_) => Operator::Must,
            Self::Should(_) => Operator::Should,
            Self::MustNot(_) => Operator::MustNot,
        }
    }

    /// Field tested by a leaf; `None` for composites
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Eq { field, .. }
            | Self::In { field, .. }
            | Self::Like { field, .. }
            | Self::Between { field, .. }
            | Self::FullText { field, .. } => Some(field),
            Self::Must(_) | Self::Should(_) | Self::MustNot(_) => None,
        }
    }

    /// Operand of a leaf; `None` for composites
    pub fn value(&self) -> Option<Operand<'_>> {
        match self {
            Self::Eq { value, .. } => Some(Operand::Scalar(value)),
            Self::In { values, .. } => Some(Operand::List(values)),
            Self::Like { pattern, .. } => Some(Operand::Text(pattern)),
            Self::Between { low, high, .. } => Some(Operand::Pair(low, high)),
            Self::FullText { query, .. } => Some(Operand::Text(query)),
            Self::Must(_) | Self::Should(_) | Self::MustNot(_) => None,
        }
    }

    pub fn is_composite(&self) -> bool {
        self.operator().is_composite()
    }

    /// Direct children; empty for leaves
    pub fn children(&self) -> &[Specification] {
        match self {
            Self::Must(children) | Self::Should(children) => children,
            Self::MustNot(child) => std::slice::from_ref(child.as_ref()),
            _ => &[],
        }
    }

    /// `self AND other`
    pub fn must(self, other: Specification) -> Self {
        combine(self, other, Combinator::Must)
    }

    /// `self OR other`
    pub fn should(self, other: Specification) -> Self {
        combine(self, other, Combinator::Should)
    }

    /// `NOT self`; negating a negation yields the original operand
    pub fn must_not(self) -> Self {
        match self {
            Self::MustNot(inner) => *inner,
            other => Self::MustNot(Box::new(other)),
        }
    }
}

/// Build a composite of `kind` from `node` and `other`
///
/// When `node` already is a composite of the same kind, `other` joins its
/// children instead of being wrapped in a new node.
pub fn combine(node: Specification, other: Specification, kind: Combinator) -> Specification {
    match (kind, node) {
        (Combinator::Must, Specification::Must(mut children)) => {
            children.push(other);
            Specification::Must(children)
        }
        (Combinator::Should, Specification::Should(mut children)) => {
            children.push(other);
            Specification::Should(children)
        }
        (Combinator::Must, node) => Specification::Must(vec![node, other]),
        (Combinator::Should, node) => Specification::Should(vec![node, other]),
    }
}

/// Conjunction of `specs`
pub fn must(specs: impl IntoIterator<Item = Specification>) -> Specification {
    Specification::Must(specs.into_iter().collect())
}

/// Disjunction of `specs`
pub fn should(specs: impl IntoIterator<Item = Specification>) -> Specification {
    Specification::Should(specs.into_iter().collect())
}

/// Negation of `spec`
pub fn must_not(spec: Specification) -> Specification {
    spec.must_not()
}
