//! # mesh-common
//!
//! Shared utilities including error conversion, JWT handling, text encryption,
//! configuration, and telemetry.

pub mod auth;
pub mod config;
pub mod crypto;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{
    Claims, JoseError, JoseErrorKind, JoseErrorMapper, JwtService, TokenPair, TokenType,
};
pub use config::{
    AppConfig, AppSettings, ConfigError, CryptoConfig, Environment, JwtConfig, LogFormat,
    LoggingConfig,
};
pub use crypto::{generate_key, CryptoError, TextEncryptor};
pub use error::{
    AppError, AppResult, Classify, ErrorKind, ErrorResponse, ExceptionConverter,
    ExceptionConverterBuilder,
};
pub use telemetry::{
    init_tracing, init_tracing_with_config, try_init_tracing, try_init_tracing_with_config,
    TracingConfig, TracingError,
};
