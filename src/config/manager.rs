//! Settings lifecycle and construction of the configured message source.

use std::path::{
    Path,
    PathBuf,
};

use super::{
    ConfigError,
    ResolverSettings,
    StoreKind,
    ValidationError,
    loader,
};
use crate::source::{
    DbMessageSource,
    MessageSource,
};
use crate::store::{
    InMemoryMessageStore,
    MessageStore,
    SqliteMessageStore,
};
use crate::timing::TimedMessageSource;

/// Holds validated settings and builds stores and sources from them.
#[derive(Default, Debug, Clone)]
pub struct ConfigManager {
    /// Last successfully validated settings.
    current_settings: ResolverSettings,

    /// Directory the settings were loaded from; relative store paths resolve here.
    config_root: Option<PathBuf>,
}

impl ConfigManager {
    #[must_use]
    pub fn new() -> Self {
        Self { current_settings: ResolverSettings::default(), config_root: None }
    }

    /// Loads `.message-source.json` from `config_root`, or defaults when absent.
    ///
    /// # Errors
    /// - File read error
    /// - JSON parse error
    /// - Validation error
    pub fn load_settings(&mut self, config_root: Option<PathBuf>) -> Result<(), ConfigError> {
        tracing::debug!("Loading settings from: {:?}", config_root);

        let settings = if let Some(root) = &config_root {
            loader::load_from_dir(root)?.map_or_else(ResolverSettings::default, |loaded| {
                tracing::debug!("Loaded settings file: {:?}", loaded);
                loaded
            })
        } else {
            ResolverSettings::default()
        };

        settings.validate().map_err(ConfigError::ValidationErrors)?;

        self.current_settings = settings;
        self.config_root = config_root;
        tracing::debug!("Settings loaded successfully: {:?}", self.current_settings);

        Ok(())
    }

    /// Replaces the current settings after validating them.
    ///
    /// # Errors
    /// Validation error; the current settings are kept.
    pub fn update_settings(&mut self, new_settings: ResolverSettings) -> Result<(), ConfigError> {
        new_settings.validate().map_err(ConfigError::ValidationErrors)?;

        self.current_settings = new_settings;
        tracing::debug!("Settings updated successfully");

        Ok(())
    }

    #[must_use]
    pub const fn get_settings(&self) -> &ResolverSettings {
        &self.current_settings
    }

    #[must_use]
    pub const fn config_root(&self) -> Option<&PathBuf> {
        self.config_root.as_ref()
    }

    /// Opens the configured message store.
    ///
    /// A `memory` store is empty unless `store.path` names a directory of
    /// `<lang>.json` files to seed it from.
    ///
    /// # Errors
    /// Store open or seed failure.
    pub fn open_store(&self) -> Result<Box<dyn MessageStore>, ConfigError> {
        let settings = &self.current_settings;
        let path = settings.store.path.as_deref().map(|path| self.resolve_path(path));

        match (settings.store.kind, path) {
            (StoreKind::Sqlite, Some(path)) => Ok(Box::new(SqliteMessageStore::open(&path)?)),
            (StoreKind::Sqlite, None) => Err(ConfigError::ValidationErrors(vec![
                ValidationError::new("store.path", "A database path is required"),
            ])),
            (StoreKind::Memory, path) => {
                let mut store = InMemoryMessageStore::new();
                if let Some(dir) = path {
                    let count = store.load_json_dir(&dir, &settings.key_separator)?;
                    tracing::debug!(dir = %dir.display(), count, "Seeded memory message store");
                }
                Ok(Box::new(store))
            }
        }
    }

    /// Builds a message source over [`ConfigManager::open_store`], wrapped in
    /// [`TimedMessageSource`] when timing is enabled.
    ///
    /// # Errors
    /// Store open or seed failure.
    pub fn build_source(&self) -> Result<Box<dyn MessageSource + Send + Sync>, ConfigError> {
        let settings = &self.current_settings;
        let source = DbMessageSource::with_policy(self.open_store()?, settings.fallback_policy);

        if settings.timing.enabled {
            Ok(Box::new(TimedMessageSource::with_max_logged_length(
                source,
                settings.timing.max_logged_length,
            )))
        } else {
            Ok(Box::new(source))
        }
    }

    /// Joins a relative path onto the configuration root.
    fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.config_root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}
