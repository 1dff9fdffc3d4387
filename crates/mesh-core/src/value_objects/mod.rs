//! Value objects - immutable types that represent domain concepts

mod cpu;
mod random_id;

pub use cpu::CpuQuantity;
pub use random_id::{generate_request_id, random_alphanumeric, random_numeric, REQUEST_ID_LENGTH};
