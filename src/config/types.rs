use std::path::PathBuf;

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use crate::source::FallbackPolicy;
use crate::store::StoreError;
use crate::timing::DEFAULT_MAX_LOGGED_LENGTH;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "store.path")
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Failed to open message store: {0}")]
    StoreError(#[from] StoreError),
}

/// Numbered list, one error per line.
fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResolverSettings {
    /// Winner selection for multi-code lookups.
    pub fallback_policy: FallbackPolicy,

    pub timing: TimingConfig,
    pub store: StoreConfig,

    /// Joins nested keys when a JSON directory seeds the memory store.
    pub key_separator: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimingConfig {
    /// Wrap the source in a timing decorator.
    pub enabled: bool,
    /// Max characters of logged arguments and results before truncation.
    pub max_logged_length: usize,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self { enabled: true, max_logged_length: DEFAULT_MAX_LOGGED_LENGTH }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum StoreKind {
    #[default]
    Memory,
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreConfig {
    pub kind: StoreKind,

    /// Database file for `sqlite`; optional directory of `<lang>.json` files for `memory`.
    ///
    /// Relative paths resolve against the directory the configuration was loaded from.
    pub path: Option<PathBuf>,
}

impl ResolverSettings {
    /// # Errors
    /// - Empty separator
    /// - `sqlite` store without a path
    /// - Empty store path
    /// - Zero logged length
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.key_separator.is_empty() {
            errors.push(ValidationError::new(
                "keySeparator",
                "The separator cannot be empty. Please specify a separator, for example: \".\" (dot)",
            ));
        }

        match &self.store.path {
            Some(path) if path.as_os_str().is_empty() => {
                errors.push(ValidationError::new(
                    "store.path",
                    "The path cannot be empty. Please specify a path, or remove this field",
                ));
            }
            None if self.store.kind == StoreKind::Sqlite => {
                errors.push(ValidationError::new(
                    "store.path",
                    "A database path is required when kind is \"sqlite\". Example: \"messages.db\"",
                ));
            }
            _ => {}
        }

        if self.timing.max_logged_length == 0 {
            errors.push(ValidationError::new(
                "timing.maxLoggedLength",
                "The length must be greater than 0",
            ));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            fallback_policy: FallbackPolicy::default(),
            timing: TimingConfig::default(),
            store: StoreConfig::default(),
            key_separator: ".".to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;

    use super::*;

    /// validate: default settings
    #[rstest]
    fn test_validate_valid_settings() {
        let settings = ResolverSettings::default();

        assert_that!(settings.validate(), ok(anything()));
    }

    /// deserialize: empty object
    #[rstest]
    fn test_deserialize_empty_settings() {
        let settings: ResolverSettings = serde_json::from_str("{}").unwrap();

        assert_eq!(settings, ResolverSettings::default());
        assert_that!(settings.key_separator, eq("."));
        assert_that!(settings.timing.enabled, eq(true));
        assert_that!(settings.timing.max_logged_length, eq(DEFAULT_MAX_LOGGED_LENGTH));
    }

    /// deserialize: partial object
    #[rstest]
    fn test_deserialize_partial_settings() {
        let json = r#"{
            "fallbackPolicy": "storeHit",
            "store": { "kind": "sqlite", "path": "data/messages.db" },
            "timing": { "enabled": false }
        }"#;

        let settings: ResolverSettings = serde_json::from_str(json).unwrap();

        assert_eq!(settings.fallback_policy, FallbackPolicy::StoreHit);
        assert_eq!(settings.store.kind, StoreKind::Sqlite);
        assert_eq!(settings.store.path, Some(PathBuf::from("data/messages.db")));
        assert!(!settings.timing.enabled);
        assert_that!(settings.timing.max_logged_length, eq(DEFAULT_MAX_LOGGED_LENGTH));
        assert_that!(settings.validate(), ok(anything()));
    }

    /// deserialize: unknown policy
    #[rstest]
    fn test_deserialize_unknown_policy_fails() {
        let result = serde_json::from_str::<ResolverSettings>(r#"{"fallbackPolicy": "first"}"#);

        assert!(result.is_err());
    }

    /// validate: empty key separator
    #[rstest]
    fn test_validate_invalid_key_separator_empty() {
        let settings =
            ResolverSettings { key_separator: String::new(), ..ResolverSettings::default() };

        assert_that!(
            settings.validate(),
            err(elements_are![all![
                field!(ValidationError.field_path, eq("keySeparator")),
                field!(ValidationError.message, contains_substring("cannot be empty"))
            ]])
        );
    }

    /// validate: sqlite without path
    #[rstest]
    fn test_validate_sqlite_without_path() {
        let settings = ResolverSettings {
            store: StoreConfig { kind: StoreKind::Sqlite, path: None },
            ..ResolverSettings::default()
        };

        assert_that!(
            settings.validate(),
            err(elements_are![all![
                field!(ValidationError.field_path, eq("store.path")),
                field!(ValidationError.message, contains_substring("required"))
            ]])
        );
    }

    /// validate: empty store path
    #[rstest]
    #[case::memory(StoreKind::Memory)]
    #[case::sqlite(StoreKind::Sqlite)]
    fn test_validate_empty_store_path(#[case] kind: StoreKind) {
        let settings = ResolverSettings {
            store: StoreConfig { kind, path: Some(PathBuf::new()) },
            ..ResolverSettings::default()
        };

        assert_that!(
            settings.validate(),
            err(elements_are![field!(ValidationError.field_path, eq("store.path"))])
        );
    }

    /// validate: zero logged length
    #[rstest]
    fn test_validate_zero_logged_length() {
        let settings = ResolverSettings {
            timing: TimingConfig { enabled: true, max_logged_length: 0 },
            ..ResolverSettings::default()
        };

        assert_that!(
            settings.validate(),
            err(elements_are![field!(ValidationError.field_path, eq("timing.maxLoggedLength"))])
        );
    }

    /// ConfigError: numbered validation errors
    #[rstest]
    fn test_config_error_validation_errors_format() {
        let settings = ResolverSettings {
            key_separator: String::new(),
            store: StoreConfig { kind: StoreKind::Sqlite, path: None },
            ..ResolverSettings::default()
        };

        let errors = settings.validate().unwrap_err();
        let error_message = format!("{}", ConfigError::ValidationErrors(errors));

        assert_that!(error_message, contains_substring("Configuration validation failed"));
        assert_that!(error_message, contains_substring("1. keySeparator"));
        assert_that!(error_message, contains_substring("2. store.path"));
    }
}
