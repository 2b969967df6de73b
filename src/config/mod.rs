//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, AuthConfig, CacheConfig, LogFormat, LoggingConfig, RateLimitConfig, ServerConfig,
    StorageBackend, StorageSettings, DEFAULT_JWT_SECRET,
};
