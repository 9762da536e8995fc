//! Resolver settings, loaded from `.message-source.json`.
mod loader;
mod manager;
mod types;

pub use manager::ConfigManager;
pub use types::{
    ConfigError,
    ResolverSettings,
    StoreConfig,
    StoreKind,
    TimingConfig,
    ValidationError,
};
