//! # mesh-core
//!
//! Domain layer containing the search predicate model, request DTOs, and value objects.
//! This crate has zero dependencies on infrastructure (web framework, logging, crypto, etc.).

pub mod error;
pub mod search;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use error::DomainError;
pub use search::{
    AndPredicate, Attributes, JoinPredicate, MultipleValuesAttributePredicate,
    MultipleValuesOperator, NoValueAttributePredicate, NoValueOperator, NotPredicate,
    OrPredicate, PrettyPrint, SearchPredicate, SearchRequest, SearchResult,
    SingleValueAttributePredicate, SingleValueOperator, MAX_PAGE_SIZE,
};
pub use value_objects::{
    generate_request_id, random_alphanumeric, random_numeric, CpuQuantity, REQUEST_ID_LENGTH,
};
