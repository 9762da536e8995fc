//! Shared helpers for unit tests.
#![cfg(test)]
#![allow(clippy::unwrap_used)]

use crate::locale::Locale;
use crate::message::Message;
use crate::store::{
    InMemoryMessageStore,
    MessageStore,
    StoreError,
};

/// Builds an in-memory store from `(key, lang, text)` rows.
pub(crate) fn create_store(rows: &[(&str, &str, &str)]) -> InMemoryMessageStore {
    InMemoryMessageStore::from_messages(
        rows.iter().map(|&(key, lang, text)| Message::new(key, lang, text)),
    )
}

/// Parses a locale tag, panicking on invalid input.
pub(crate) fn locale(tag: &str) -> Locale {
    Locale::parse(tag).unwrap()
}

/// Store whose every lookup fails.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct FailingStore;

impl MessageStore for FailingStore {
    fn find_by_key_and_lang(&self, _key: &str, _lang: &str) -> Result<Option<Message>, StoreError> {
        Err(StoreError::Db("connection refused".to_string()))
    }
}
