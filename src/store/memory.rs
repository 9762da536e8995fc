//! In-memory message store, optionally seeded from per-language JSON files.

use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;

use super::{
    MessageStore,
    StoreError,
};
use crate::locale::Locale;
use crate::message::Message;

/// Message table held in a `HashMap` keyed by `(key, lang)`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMessageStore {
    /// `(key, lang)` → message
    messages: HashMap<(String, String), Message>,
}

impl InMemoryMessageStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from messages. Later rows win on duplicate `(key, lang)`.
    #[must_use]
    pub fn from_messages(messages: impl IntoIterator<Item = Message>) -> Self {
        let mut store = Self::new();
        for message in messages {
            store.insert(message);
        }
        store
    }

    /// Inserts or replaces the row for the message's `(key, lang)`.
    ///
    /// Returns the replaced message, if any.
    pub fn insert(&mut self, message: Message) -> Option<Message> {
        self.messages.insert((message.key.clone(), message.lang.clone()), message)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Loads one translation file.
    ///
    /// The file stem names the language (`pl.json`, `en-US.json`, `pol.json`);
    /// a three-letter stem must be a known ISO 639-2/T code. Nested objects are
    /// flattened with `separator`.
    ///
    /// # Returns
    /// Number of messages read from the file.
    pub fn load_json_file(&mut self, path: &Path, separator: &str) -> Result<usize, StoreError> {
        let lang = language_from_path(path).ok_or_else(|| {
            StoreError::Parse(format!("No language code in file name: {}", path.display()))
        })?;

        let content = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Io(format!("{}: {e}", path.display())))?;
        let json: Value = serde_json::from_str(&content)
            .map_err(|e| StoreError::Parse(format!("{}: {e}", path.display())))?;

        let keys = flatten_json(&json, separator, None);
        let count = keys.len();
        for (key, text) in keys {
            self.insert(Message::new(key, lang.clone(), text));
        }

        tracing::debug!(path = %path.display(), lang = %lang, count, "Loaded translation file");
        Ok(count)
    }

    /// Loads every `*.json` file in `dir`, in file name order.
    ///
    /// Files whose name is not a language code are skipped.
    ///
    /// # Returns
    /// Total number of messages read.
    pub fn load_json_dir(&mut self, dir: &Path, separator: &str) -> Result<usize, StoreError> {
        let entries = std::fs::read_dir(dir)
            .map_err(|e| StoreError::Io(format!("{}: {e}", dir.display())))?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::Io(format!("{}: {e}", dir.display())))?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut total = 0;
        for path in paths {
            if language_from_path(&path).is_none() {
                tracing::warn!("Skipping {:?}: file name is not a language code", path);
                continue;
            }
            total += self.load_json_file(&path, separator)?;
        }

        Ok(total)
    }
}

impl MessageStore for InMemoryMessageStore {
    fn find_by_key_and_lang(&self, key: &str, lang: &str) -> Result<Option<Message>, StoreError> {
        Ok(self.messages.get(&(key.to_string(), lang.to_string())).cloned())
    }
}

/// Three-letter language code from a file stem such as `pl`, `en_US` or `pol`.
///
/// Stems that are not a known language (`app`, `common`) yield `None`.
fn language_from_path(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    Locale::parse(stem)
        .ok()
        .filter(Locale::has_known_language)
        .map(|locale| locale.iso3_language().to_string())
}

/// Flatten nested JSON object into separator-joined key map.
///
/// Array elements use `[index]` notation; non-string scalars keep their JSON text.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use db_message_source::store::flatten_json;
///
/// let json = json!({ "hello": { "world": "witaj świecie" } });
///
/// let flattened = flatten_json(&json, ".", None);
/// assert_eq!(flattened.get("hello.world"), Some(&"witaj świecie".to_string()));
/// ```
#[must_use]
pub fn flatten_json(
    json: &Value,
    separator: &str,
    prefix: Option<&str>,
) -> HashMap<String, String> {
    let mut result = HashMap::new();
    flatten_json_value(json, separator, prefix, &mut result);
    result
}

fn flatten_json_value(
    json: &Value,
    separator: &str,
    prefix: Option<&str>,
    result: &mut HashMap<String, String>,
) {
    match json {
        Value::Object(map) => {
            for (key, value) in map {
                let full_key =
                    prefix.map_or_else(|| key.clone(), |p| format!("{p}{separator}{key}"));
                flatten_json_value(value, separator, Some(&full_key), result);
            }
        }
        Value::Array(arr) => {
            for (index, value) in arr.iter().enumerate() {
                let full_key =
                    prefix.map_or_else(|| format!("[{index}]"), |p| format!("{p}[{index}]"));
                flatten_json_value(value, separator, Some(&full_key), result);
            }
        }
        Value::String(s) => {
            if let Some(key) = prefix {
                result.insert(key.to_string(), s.clone());
            }
        }
        _ => {
            if let Some(key) = prefix {
                result.insert(key.to_string(), json.to_string());
            }
        }
    }
}
