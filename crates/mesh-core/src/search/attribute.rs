//! Attribute predicates - leaf nodes testing one named attribute

use serde::{Deserialize, Serialize};
use std::fmt;

use super::predicate::{Attributes, PrettyPrint};

// ============================================================================
// Single value
// ============================================================================

/// Comparison applied between an attribute and one value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SingleValueOperator {
    #[default]
    Equals,
    NotEquals,
    Contains,
    StartsWith,
    EndsWith,
}

impl SingleValueOperator {
    /// Keyword used by the machine-oriented rendering
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Equals => "=",
            Self::NotEquals => "!=",
            Self::Contains => "CONTAINS",
            Self::StartsWith => "STARTS_WITH",
            Self::EndsWith => "ENDS_WITH",
        }
    }

    /// Wording used by the human-oriented rendering
    pub fn phrase(self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "does not equal",
            Self::Contains => "contains",
            Self::StartsWith => "starts with",
            Self::EndsWith => "ends with",
        }
    }
}

/// Compares an attribute against a single value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleValueAttributePredicate {
    pub attribute: String,
    #[serde(default)]
    pub operator: SingleValueOperator,
    pub value: String,
}

impl SingleValueAttributePredicate {
    pub fn new(
        attribute: impl Into<String>,
        operator: SingleValueOperator,
        value: impl Into<String>,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            operator,
            value: value.into(),
        }
    }

    /// A missing attribute only satisfies `NOT_EQUALS`
    pub fn matches(&self, attributes: &Attributes) -> bool {
        let Some(actual) = attributes.get(&self.attribute) else {
            return self.operator == SingleValueOperator::NotEquals;
        };

        match self.operator {
            SingleValueOperator::Equals => *actual == self.value,
            SingleValueOperator::NotEquals => *actual != self.value,
            SingleValueOperator::Contains => actual.contains(self.value.as_str()),
            SingleValueOperator::StartsWith => actual.starts_with(self.value.as_str()),
            SingleValueOperator::EndsWith => actual.ends_with(self.value.as_str()),
        }
    }
}

impl fmt::Display for SingleValueAttributePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} '{}'", self.attribute, self.operator.symbol(), self.value)
    }
}

impl PrettyPrint for SingleValueAttributePredicate {
    fn to_pretty_string(&self) -> String {
        format!("{} {} '{}'", self.attribute, self.operator.phrase(), self.value)
    }
}

// ============================================================================
// Multiple values
// ============================================================================

/// Membership test between an attribute and a list of values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MultipleValuesOperator {
    #[default]
    In,
    NotIn,
}

impl MultipleValuesOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::In => "IN",
            Self::NotIn => "NOT IN",
        }
    }

    pub fn phrase(self) -> &'static str {
        match self {
            Self::In => "is one of",
            Self::NotIn => "is none of",
        }
    }
}

/// Tests an attribute for membership in a list of values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultipleValuesAttributePredicate {
    pub attribute: String,
    #[serde(default)]
    pub operator: MultipleValuesOperator,
    #[serde(default)]
    pub values: Vec<String>,
}

impl MultipleValuesAttributePredicate {
    pub fn new<I, V>(attribute: impl Into<String>, operator: MultipleValuesOperator, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self {
            attribute: attribute.into(),
            operator,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn matches(&self, attributes: &Attributes) -> bool {
        let found = attributes
            .get(&self.attribute)
            .is_some_and(|actual| self.values.contains(actual));

        match self.operator {
            MultipleValuesOperator::In => found,
            MultipleValuesOperator::NotIn => !found,
        }
    }

    fn quoted_values(&self) -> String {
        self.values
            .iter()
            .map(|v| format!("'{v}'"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for MultipleValuesAttributePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({})",
            self.attribute,
            self.operator.symbol(),
            self.quoted_values()
        )
    }
}

impl PrettyPrint for MultipleValuesAttributePredicate {
    fn to_pretty_string(&self) -> String {
        format!(
            "{} {} {}",
            self.attribute,
            self.operator.phrase(),
            self.quoted_values()
        )
    }
}

// ============================================================================
// No value
// ============================================================================

/// Presence test on an attribute
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NoValueOperator {
    #[default]
    Exists,
    NotExists,
}

impl NoValueOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Exists => "EXISTS",
            Self::NotExists => "NOT EXISTS",
        }
    }

    pub fn phrase(self) -> &'static str {
        match self {
            Self::Exists => "is present",
            Self::NotExists => "is absent",
        }
    }
}

/// Tests whether an attribute is present
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoValueAttributePredicate {
    pub attribute: String,
    #[serde(default)]
    pub operator: NoValueOperator,
}

impl NoValueAttributePredicate {
    pub fn new(attribute: impl Into<String>, operator: NoValueOperator) -> Self {
        Self {
            attribute: attribute.into(),
            operator,
        }
    }

    pub fn matches(&self, attributes: &Attributes) -> bool {
        let present = attributes.contains_key(&self.attribute);
        match self.operator {
            NoValueOperator::Exists => present,
            NoValueOperator::NotExists => !present,
        }
    }
}

impl fmt::Display for NoValueAttributePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.attribute, self.operator.symbol())
    }
}

impl PrettyPrint for NoValueAttributePredicate {
    fn to_pretty_string(&self) -> String {
        format!("{} {}", self.attribute, self.operator.phrase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attributes(pairs: &[(&str, &str)]) -> Attributes {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_single_value_rendering() {
        let p = SingleValueAttributePredicate::new("name", SingleValueOperator::StartsWith, "Jo");
        assert_eq!(p.to_string(), "name STARTS_WITH 'Jo'");
        assert_eq!(p.to_pretty_string(), "name starts with 'Jo'");

        let p = SingleValueAttributePredicate::new("name", SingleValueOperator::NotEquals, "x");
        assert_eq!(p.to_string(), "name != 'x'");
        assert_eq!(p.to_pretty_string(), "name does not equal 'x'");
    }

    #[test]
    fn test_single_value_matching() {
        let attrs = attributes(&[("name", "Jonathan")]);

        let matches = |op: SingleValueOperator, value: &str| {
            SingleValueAttributePredicate::new("name", op, value).matches(&attrs)
        };
        assert!(matches(SingleValueOperator::Equals, "Jonathan"));
        assert!(!matches(SingleValueOperator::Equals, "Jon"));
        assert!(matches(SingleValueOperator::NotEquals, "Jon"));
        assert!(matches(SingleValueOperator::Contains, "nat"));
        assert!(matches(SingleValueOperator::StartsWith, "Jon"));
        assert!(matches(SingleValueOperator::EndsWith, "than"));
    }

    #[test]
    fn test_single_value_missing_attribute() {
        let attrs = Attributes::new();
        let eq = SingleValueAttributePredicate::new("name", SingleValueOperator::Equals, "x");
        let ne = SingleValueAttributePredicate::new("name", SingleValueOperator::NotEquals, "x");
        assert!(!eq.matches(&attrs));
        assert!(ne.matches(&attrs));
    }

    #[test]
    fn test_multiple_values_rendering() {
        let p = MultipleValuesAttributePredicate::new("status", MultipleValuesOperator::In, ["A", "B"]);
        assert_eq!(p.to_string(), "status IN ('A', 'B')");
        assert_eq!(p.to_pretty_string(), "status is one of 'A', 'B'");

        let p = MultipleValuesAttributePredicate::new("status", MultipleValuesOperator::NotIn, ["A"]);
        assert_eq!(p.to_string(), "status NOT IN ('A')");
        assert_eq!(p.to_pretty_string(), "status is none of 'A'");
    }

    #[test]
    fn test_multiple_values_matching() {
        let attrs = attributes(&[("status", "B")]);
        let values = ["A", "B"];

        let predicate = |attribute: &str, op: MultipleValuesOperator| {
            MultipleValuesAttributePredicate::new(attribute, op, values)
        };

        assert!(predicate("status", MultipleValuesOperator::In).matches(&attrs));
        assert!(!predicate("status", MultipleValuesOperator::NotIn).matches(&attrs));
        assert!(predicate("other", MultipleValuesOperator::NotIn).matches(&attrs));
        assert!(!predicate("other", MultipleValuesOperator::In).matches(&attrs));
    }

    #[test]
    fn test_no_value_rendering_and_matching() {
        let attrs = attributes(&[("deleted_at", "2024-01-01")]);

        let exists = NoValueAttributePredicate::new("deleted_at", NoValueOperator::Exists);
        assert_eq!(exists.to_string(), "deleted_at EXISTS");
        assert_eq!(exists.to_pretty_string(), "deleted_at is present");
        assert!(exists.matches(&attrs));

        let absent = NoValueAttributePredicate::new("deleted_at", NoValueOperator::NotExists);
        assert_eq!(absent.to_string(), "deleted_at NOT EXISTS");
        assert_eq!(absent.to_pretty_string(), "deleted_at is absent");
        assert!(!absent.matches(&attrs));
    }
}
