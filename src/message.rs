//! Stored message record.

use serde::{
    Deserialize,
    Serialize,
};

/// A localized template for one `(key, lang)` pair.
///
/// Stores hold at most one `Message` per pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Message {
    /// Message code.
    pub key: String,
    /// ISO 639-2/T three-letter language code.
    pub lang: String,
    /// Template with positional placeholders (`%s`, `%d`, ...).
    pub text: String,
}

impl Message {
    #[must_use]
    pub fn new(key: impl Into<String>, lang: impl Into<String>, text: impl Into<String>) -> Self {
        Self { key: key.into(), lang: lang.into(), text: text.into() }
    }
}
