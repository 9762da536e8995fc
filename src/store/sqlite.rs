//! `SQLite`-backed message table.

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use rusqlite::{
    Connection,
    OpenFlags,
    OptionalExtension,
    params,
};

use super::{
    MessageStore,
    StoreError,
};
use crate::message::Message;

/// Busy timeout applied to every connection.
const BUSY_TIMEOUT: Duration = Duration::from_millis(5_000);

/// Message table schema. `(key, lang)` is the primary key.
const SCHEMA: &str = r#"CREATE TABLE IF NOT EXISTS messages (
    "key" TEXT NOT NULL,
    "lang" TEXT NOT NULL,
    "text" TEXT NOT NULL,
    PRIMARY KEY ("key", "lang")
);"#;

/// Message store over a `messages(key, lang, text)` table.
///
/// Each lookup is a single point query; nothing is cached, so edits to the
/// table are visible to the next call.
#[derive(Debug)]
pub struct SqliteMessageStore {
    /// Single connection, serialized for `Sync`.
    connection: Mutex<Connection>,
}

impl SqliteMessageStore {
    /// Opens (or creates) a database file and ensures the schema exists.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Io(format!("{}: {e}", parent.display())))?;
        }

        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
        let connection = Connection::open_with_flags(path, flags).map_err(db_error)?;

        tracing::debug!(path = %path.display(), "Opened sqlite message store");
        Self::from_connection(connection)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory().map_err(db_error)?)
    }

    fn from_connection(connection: Connection) -> Result<Self, StoreError> {
        connection.busy_timeout(BUSY_TIMEOUT).map_err(db_error)?;
        connection.execute_batch(SCHEMA).map_err(db_error)?;
        Ok(Self { connection: Mutex::new(connection) })
    }

    /// Inserts a message, replacing the text of an existing `(key, lang)` row.
    pub fn insert(&self, message: &Message) -> Result<(), StoreError> {
        let guard = self.connection.lock().map_err(|_| StoreError::Poisoned)?;
        guard
            .execute(
                r#"INSERT INTO messages ("key", "lang", "text") VALUES (?1, ?2, ?3)
                   ON CONFLICT ("key", "lang") DO UPDATE SET "text" = excluded."text""#,
                params![message.key, message.lang, message.text],
            )
            .map_err(db_error)?;
        Ok(())
    }

    /// Inserts many messages in one transaction.
    pub fn insert_all<'a>(
        &self,
        messages: impl IntoIterator<Item = &'a Message>,
    ) -> Result<usize, StoreError> {
        let mut guard = self.connection.lock().map_err(|_| StoreError::Poisoned)?;
        let tx = guard.transaction().map_err(db_error)?;
        let mut count = 0;
        {
            let mut stmt = tx
                .prepare_cached(
                    r#"INSERT INTO messages ("key", "lang", "text") VALUES (?1, ?2, ?3)
                       ON CONFLICT ("key", "lang") DO UPDATE SET "text" = excluded."text""#,
                )
                .map_err(db_error)?;
            for message in messages {
                stmt.execute(params![message.key, message.lang, message.text])
                    .map_err(db_error)?;
                count += 1;
            }
        }
        tx.commit().map_err(db_error)?;
        Ok(count)
    }

    /// Number of rows in the table.
    pub fn count(&self) -> Result<usize, StoreError> {
        let guard = self.connection.lock().map_err(|_| StoreError::Poisoned)?;
        let count: i64 = guard
            .query_row("SELECT COUNT(*) FROM messages", params![], |row| row.get(0))
            .map_err(db_error)?;
        usize::try_from(count).map_err(|e| StoreError::Db(e.to_string()))
    }
}

impl MessageStore for SqliteMessageStore {
    fn find_by_key_and_lang(&self, key: &str, lang: &str) -> Result<Option<Message>, StoreError> {
        let guard = self.connection.lock().map_err(|_| StoreError::Poisoned)?;
        guard
            .query_row(
                r#"SELECT "key", "lang", "text" FROM messages WHERE "key" = ?1 AND "lang" = ?2"#,
                params![key, lang],
                |row| Ok(Message { key: row.get(0)?, lang: row.get(1)?, text: row.get(2)? }),
            )
            .optional()
            .map_err(db_error)
    }
}

#[allow(clippy::needless_pass_by_value)]
fn db_error(err: rusqlite::Error) -> StoreError {
    StoreError::Db(err.to_string())
}
