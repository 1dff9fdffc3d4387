//! Composable search predicates and search request DTOs

mod attribute;
mod join;
mod predicate;
mod request;

pub use attribute::{
    MultipleValuesAttributePredicate, MultipleValuesOperator, NoValueAttributePredicate,
    NoValueOperator, SingleValueAttributePredicate, SingleValueOperator,
};
pub use join::{AndPredicate, JoinPredicate, OrPredicate};
pub use predicate::{Attributes, NotPredicate, PrettyPrint, SearchPredicate};
pub use request::{SearchRequest, SearchResult, MAX_PAGE_SIZE};
