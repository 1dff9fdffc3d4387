//! Search predicate tree
//!
//! A closed set of boolean filter nodes. On the wire every node is a JSON
//! object tagged by its `type` field:
//!
//! ```json
//! {
//!   "type": "AND_PREDICATE",
//!   "predicates": [
//!     { "type": "SINGLE_VALUE_ATTRIBUTE_PREDICATE", "attribute": "status", "operator": "EQUALS", "value": "ACTIVE" },
//!     { "type": "NO_VALUE_ATTRIBUTE_PREDICATE", "attribute": "deleted_at", "operator": "NOT_EXISTS" }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::attribute::{
    MultipleValuesAttributePredicate, MultipleValuesOperator, NoValueAttributePredicate,
    NoValueOperator, SingleValueAttributePredicate, SingleValueOperator,
};
use super::join::{AndPredicate, OrPredicate};

/// Attribute values a predicate is evaluated against
pub type Attributes = HashMap<String, String>;

/// Human-oriented rendering of a predicate
pub trait PrettyPrint {
    /// Render for display to end users; empty when a node has no readable form.
    fn to_pretty_string(&self) -> String {
        String::new()
    }
}

/// A node of a search filter expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
#[allow(clippy::enum_variant_names)]
pub enum SearchPredicate {
    AndPredicate(AndPredicate),
    OrPredicate(OrPredicate),
    NotPredicate(NotPredicate),
    SingleValueAttributePredicate(SingleValueAttributePredicate),
    MultipleValuesAttributePredicate(MultipleValuesAttributePredicate),
    NoValueAttributePredicate(NoValueAttributePredicate),
}

impl SearchPredicate {
    /// Get the wire tag of this node
    pub fn predicate_type(&self) -> &'static str {
        match self {
            Self::AndPredicate(_) => "AND_PREDICATE",
            Self::OrPredicate(_) => "OR_PREDICATE",
            Self::NotPredicate(_) => "NOT_PREDICATE",
            Self::SingleValueAttributePredicate(_) => "SINGLE_VALUE_ATTRIBUTE_PREDICATE",
            Self::MultipleValuesAttributePredicate(_) => "MULTIPLE_VALUES_ATTRIBUTE_PREDICATE",
            Self::NoValueAttributePredicate(_) => "NO_VALUE_ATTRIBUTE_PREDICATE",
        }
    }

    pub fn and<I>(predicates: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        Self::AndPredicate(AndPredicate::new(predicates))
    }

    pub fn or<I>(predicates: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        Self::OrPredicate(OrPredicate::new(predicates))
    }

    pub fn not(predicate: Self) -> Self {
        Self::NotPredicate(NotPredicate::new(predicate))
    }

    pub fn single(
        attribute: impl Into<String>,
        operator: SingleValueOperator,
        value: impl Into<String>,
    ) -> Self {
        Self::SingleValueAttributePredicate(SingleValueAttributePredicate::new(
            attribute, operator, value,
        ))
    }

    pub fn equals(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self::single(attribute, SingleValueOperator::Equals, value)
    }

    pub fn not_equals(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self::single(attribute, SingleValueOperator::NotEquals, value)
    }

    pub fn contains(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self::single(attribute, SingleValueOperator::Contains, value)
    }

    pub fn any_of<I, V>(attribute: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self::MultipleValuesAttributePredicate(MultipleValuesAttributePredicate::new(
            attribute,
            MultipleValuesOperator::In,
            values,
        ))
    }

    pub fn none_of<I, V>(attribute: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self::MultipleValuesAttributePredicate(MultipleValuesAttributePredicate::new(
            attribute,
            MultipleValuesOperator::NotIn,
            values,
        ))
    }

    pub fn exists(attribute: impl Into<String>) -> Self {
        Self::NoValueAttributePredicate(NoValueAttributePredicate::new(
            attribute,
            NoValueOperator::Exists,
        ))
    }

    pub fn not_exists(attribute: impl Into<String>) -> Self {
        Self::NoValueAttributePredicate(NoValueAttributePredicate::new(
            attribute,
            NoValueOperator::NotExists,
        ))
    }

    /// Check if this is an AND / OR node
    pub fn is_join(&self) -> bool {
        matches!(self, Self::AndPredicate(_) | Self::OrPredicate(_))
    }

    /// Evaluate the expression against a set of attribute values
    pub fn matches(&self, attributes: &Attributes) -> bool {
        match self {
            Self::AndPredicate(p) => p.matches(attributes),
            Self::OrPredicate(p) => p.matches(attributes),
            Self::NotPredicate(p) => p.matches(attributes),
            Self::SingleValueAttributePredicate(p) => p.matches(attributes),
            Self::MultipleValuesAttributePredicate(p) => p.matches(attributes),
            Self::NoValueAttributePredicate(p) => p.matches(attributes),
        }
    }
}

/// An empty AND, which renders as "" and matches everything
impl Default for SearchPredicate {
    fn default() -> Self {
        Self::AndPredicate(AndPredicate::default())
    }
}

impl fmt::Display for SearchPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AndPredicate(p) => fmt::Display::fmt(p, f),
            Self::OrPredicate(p) => fmt::Display::fmt(p, f),
            Self::NotPredicate(p) => fmt::Display::fmt(p, f),
            Self::SingleValueAttributePredicate(p) => fmt::Display::fmt(p, f),
            Self::MultipleValuesAttributePredicate(p) => fmt::Display::fmt(p, f),
            Self::NoValueAttributePredicate(p) => fmt::Display::fmt(p, f),
        }
    }
}

impl PrettyPrint for SearchPredicate {
    fn to_pretty_string(&self) -> String {
        match self {
            Self::AndPredicate(p) => p.to_pretty_string(),
            Self::OrPredicate(p) => p.to_pretty_string(),
            Self::NotPredicate(p) => p.to_pretty_string(),
            Self::SingleValueAttributePredicate(p) => p.to_pretty_string(),
            Self::MultipleValuesAttributePredicate(p) => p.to_pretty_string(),
            Self::NoValueAttributePredicate(p) => p.to_pretty_string(),
        }
    }
}

impl From<AndPredicate> for SearchPredicate {
    fn from(p: AndPredicate) -> Self {
        Self::AndPredicate(p)
    }
}

impl From<OrPredicate> for SearchPredicate {
    fn from(p: OrPredicate) -> Self {
        Self::OrPredicate(p)
    }
}

impl From<NotPredicate> for SearchPredicate {
    fn from(p: NotPredicate) -> Self {
        Self::NotPredicate(p)
    }
}

impl From<SingleValueAttributePredicate> for SearchPredicate {
    fn from(p: SingleValueAttributePredicate) -> Self {
        Self::SingleValueAttributePredicate(p)
    }
}

impl From<MultipleValuesAttributePredicate> for SearchPredicate {
    fn from(p: MultipleValuesAttributePredicate) -> Self {
        Self::MultipleValuesAttributePredicate(p)
    }
}

impl From<NoValueAttributePredicate> for SearchPredicate {
    fn from(p: NoValueAttributePredicate) -> Self {
        Self::NoValueAttributePredicate(p)
    }
}

/// Negation of exactly one child predicate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotPredicate {
    pub predicate: Box<SearchPredicate>,
}

impl NotPredicate {
    pub fn new(predicate: SearchPredicate) -> Self {
        Self {
            predicate: Box::new(predicate),
        }
    }

    pub fn matches(&self, attributes: &Attributes) -> bool {
        !self.predicate.matches(attributes)
    }
}

// A child that renders empty (e.g. an empty AND) leaves nothing to negate
impl fmt::Display for NotPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.predicate.to_string();
        if inner.is_empty() {
            return Ok(());
        }
        write!(f, "NOT {inner}")
    }
}

impl PrettyPrint for NotPredicate {
    fn to_pretty_string(&self) -> String {
        let inner = self.predicate.to_pretty_string();
        if inner.is_empty() {
            return inner;
        }
        format!("not {inner}")
    }
}
