//! db-message-source
//!
//! Localized message resolution backed by a `(key, lang, text)` message table,
//! with printf-style argument formatting and per-call timing logs.
//!
//! # Examples
//! ```
//! use db_message_source::store::InMemoryMessageStore;
//! use db_message_source::{DbMessageSource, Locale, Message, MessageSource};
//!
//! let store = InMemoryMessageStore::from_messages([
//!     Message::new("hello", "pol", "witaj świecie"),
//!     Message::new("greeting", "eng", "Hello, %s!"),
//! ]);
//! let source = DbMessageSource::new(store);
//!
//! let pl = Locale::parse("pl").unwrap();
//! let en = Locale::parse("en").unwrap();
//! assert_eq!(source.get_message("hello", &[], None, &pl).unwrap(), "witaj świecie");
//! assert_eq!(source.get_message("greeting", &["Ala".into()], None, &en).unwrap(), "Hello, Ala!");
//! assert_eq!(source.get_message("missing.key", &[], None, &en).unwrap(), "missing.key");
//! ```

pub mod config;
pub mod format;
pub mod locale;
pub mod message;
pub mod source;
pub mod store;
pub mod timing;

#[cfg(test)]
mod test_utils;

pub use config::{
    ConfigError,
    ConfigManager,
    ResolverSettings,
};
pub use format::{
    FormatError,
    MessageArg,
};
pub use locale::{
    Locale,
    LocaleError,
};
pub use message::Message;
pub use source::{
    DbMessageSource,
    FallbackPolicy,
    MessageSource,
    MessageSourceResolvable,
    ResolveError,
};
pub use store::{
    MessageStore,
    StoreError,
};
pub use timing::TimedMessageSource;
