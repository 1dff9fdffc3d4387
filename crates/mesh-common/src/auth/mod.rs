//! Authentication utilities

mod jose;
mod jwt;

pub use jose::{
    JoseError, JoseErrorKind, JoseErrorMapper, FIELD_VALIDATION_FAILURES,
    TOKEN_VALIDATION_FAILURES,
};
pub use jwt::{Claims, JwtService, TokenPair, TokenType};
