//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, ConfigError, CryptoConfig, Environment, JwtConfig, LogFormat,
    LoggingConfig,
};
