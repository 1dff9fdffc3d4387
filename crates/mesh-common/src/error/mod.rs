//! Error types and error conversion

mod app_error;
mod converter;

pub use app_error::{AppError, AppResult, ErrorResponse};
pub use converter::{
    Ancestors, Classify, ErrorKind, ExceptionConverter, ExceptionConverterBuilder, Handler,
    PendingRule,
};
