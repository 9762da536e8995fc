//! Message store abstraction and the bundled store implementations.
mod memory;
mod sqlite;

use std::sync::Arc;

use thiserror::Error;

use crate::message::Message;

pub use memory::{
    InMemoryMessageStore,
    flatten_json,
};
pub use sqlite::SqliteMessageStore;

/// Errors raised by a message store. The resolver surfaces them unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Message store query failed: {0}")]
    Db(String),

    #[error("Failed to read message file: {0}")]
    Io(String),

    #[error("Failed to parse message file: {0}")]
    Parse(String),

    #[error("Message store lock poisoned")]
    Poisoned,
}

/// Read side of a message table.
///
/// Implementations hold at most one [`Message`] per `(key, lang)` pair, so the
/// lookup is a point query.
pub trait MessageStore: Send + Sync {
    /// Finds the message stored for `key` in the three-letter language `lang`.
    fn find_by_key_and_lang(&self, key: &str, lang: &str) -> Result<Option<Message>, StoreError>;
}

impl<S: MessageStore + ?Sized> MessageStore for &S {
    fn find_by_key_and_lang(&self, key: &str, lang: &str) -> Result<Option<Message>, StoreError> {
        (**self).find_by_key_and_lang(key, lang)
    }
}

impl<S: MessageStore + ?Sized> MessageStore for Arc<S> {
    fn find_by_key_and_lang(&self, key: &str, lang: &str) -> Result<Option<Message>, StoreError> {
        (**self).find_by_key_and_lang(key, lang)
    }
}

impl<S: MessageStore + ?Sized> MessageStore for Box<S> {
    fn find_by_key_and_lang(&self, key: &str, lang: &str) -> Result<Option<Message>, StoreError> {
        (**self).find_by_key_and_lang(key, lang)
    }
}
