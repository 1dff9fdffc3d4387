//! Join predicates - AND / OR nodes over an ordered list of children
//!
//! Both variants share their rendering through [`JoinPredicate`], which is
//! parameterized only by the separator keyword.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::predicate::{Attributes, PrettyPrint, SearchPredicate};

/// Common behavior of AND / OR nodes
pub trait JoinPredicate {
    /// Operator keyword placed between rendered children
    const SEPARATOR: &'static str;

    fn predicates(&self) -> &[SearchPredicate];

    fn predicates_mut(&mut self) -> &mut Vec<SearchPredicate>;

    /// Append a child predicate
    fn add_predicate(&mut self, predicate: SearchPredicate) {
        self.predicates_mut().push(predicate);
    }

    fn is_empty(&self) -> bool {
        self.predicates().is_empty()
    }

    /// Machine-oriented rendering
    ///
    /// - no children: empty string
    /// - one child: the child's own rendering
    /// - otherwise: `(a SEP b SEP c)`
    fn render(&self) -> String {
        join_rendered(
            self.predicates().iter().map(ToString::to_string).collect(),
            Self::SEPARATOR,
        )
    }

    /// Human-oriented rendering, same structure as [`JoinPredicate::render`]
    fn render_pretty(&self) -> String {
        join_rendered(
            self.predicates()
                .iter()
                .map(PrettyPrint::to_pretty_string)
                .collect(),
            Self::SEPARATOR,
        )
    }
}

fn join_rendered(mut parts: Vec<String>, separator: &str) -> String {
    match parts.len() {
        0 => String::new(),
        1 => parts.remove(0),
        _ => format!("({})", parts.join(&format!(" {separator} "))),
    }
}

/// Matches when every child matches (an empty AND matches everything)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AndPredicate {
    #[serde(default)]
    pub predicates: Vec<SearchPredicate>,
}

impl AndPredicate {
    pub fn new<I>(predicates: I) -> Self
    where
        I: IntoIterator<Item = SearchPredicate>,
    {
        Self {
            predicates: predicates.into_iter().collect(),
        }
    }

    pub fn matches(&self, attributes: &Attributes) -> bool {
        self.predicates.iter().all(|p| p.matches(attributes))
    }
}

impl JoinPredicate for AndPredicate {
    const SEPARATOR: &'static str = "AND";

    fn predicates(&self) -> &[SearchPredicate] {
        &self.predicates
    }

    fn predicates_mut(&mut self) -> &mut Vec<SearchPredicate> {
        &mut self.predicates
    }
}

impl PrettyPrint for AndPredicate {
    fn to_pretty_string(&self) -> String {
        self.render_pretty()
    }
}

impl fmt::Display for AndPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Matches when any child matches (an empty OR matches nothing)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrPredicate {
    #[serde(default)]
    pub predicates: Vec<SearchPredicate>,
}

impl OrPredicate {
    pub fn new<I>(predicates: I) -> Self
    where
        I: IntoIterator<Item = SearchPredicate>,
    {
        Self {
            predicates: predicates.into_iter().collect(),
        }
    }

    pub fn matches(&self, attributes: &Attributes) -> bool {
        self.predicates.iter().any(|p| p.matches(attributes))
    }
}

impl JoinPredicate for OrPredicate {
    const SEPARATOR: &'static str = "OR";

    fn predicates(&self) -> &[SearchPredicate] {
        &self.predicates
    }

    fn predicates_mut(&mut self) -> &mut Vec<SearchPredicate> {
        &mut self.predicates
    }
}

impl PrettyPrint for OrPredicate {
    fn to_pretty_string(&self) -> String {
        self.render_pretty()
    }
}

impl fmt::Display for OrPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eq(attribute: &str, value: &str) -> SearchPredicate {
        SearchPredicate::equals(attribute, value)
    }

    #[test]
    fn test_empty_join_renders_empty() {
        assert_eq!(AndPredicate::default().to_string(), "");
        assert_eq!(OrPredicate::default().to_string(), "");
        assert_eq!(AndPredicate::default().to_pretty_string(), "");
        assert_eq!(OrPredicate::default().to_pretty_string(), "");
    }

    #[test]
    fn test_single_child_is_transparent() {
        let child = eq("status", "ACTIVE");

        let and = AndPredicate::new([child.clone()]);
        assert_eq!(and.to_string(), child.to_string());
        assert_eq!(and.to_pretty_string(), child.to_pretty_string());

        let or = OrPredicate::new([child.clone()]);
        assert_eq!(or.to_string(), "status = 'ACTIVE'");
        assert_eq!(or.to_pretty_string(), "status equals 'ACTIVE'");
    }

    #[test]
    fn test_multiple_children_are_parenthesized() {
        let and = AndPredicate::new([eq("a", "1"), eq("b", "2"), eq("c", "3")]);
        assert_eq!(and.to_string(), "(a = '1' AND b = '2' AND c = '3')");

        let or = OrPredicate::new([eq("a", "1"), eq("b", "2")]);
        assert_eq!(or.to_string(), "(a = '1' OR b = '2')");
        assert_eq!(or.to_pretty_string(), "(a equals '1' OR b equals '2')");
    }

    #[test]
    fn test_add_predicate_appends_in_order() {
        let mut and = AndPredicate::default();
        assert!(and.is_empty());

        and.add_predicate(eq("a", "1"));
        assert_eq!(and.to_string(), "a = '1'");

        and.add_predicate(eq("b", "2"));
        assert_eq!(and.to_string(), "(a = '1' AND b = '2')");
        assert_eq!(and.predicates().len(), 2);
    }

    #[test]
    fn test_nested_joins() {
        let or = SearchPredicate::or([eq("a", "1"), eq("b", "2")]);
        let and = AndPredicate::new([or, eq("c", "3")]);
        assert_eq!(and.to_string(), "((a = '1' OR b = '2') AND c = '3')");
    }

    #[test]
    fn test_truth_of_empty_joins() {
        let attributes = Attributes::new();
        assert!(AndPredicate::default().matches(&attributes));
        assert!(!OrPredicate::default().matches(&attributes));
    }
}
