pub mod configs;
pub mod defaults;
pub mod envconfig;
pub mod validate;

pub use configs::{
    AppConfig, CacheConfig, DatabaseConfig, LoggingConfig, SessionConfig, TokenConfig,
};
pub use envconfig::EnvConfig;
