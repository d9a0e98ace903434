use std::fs;
use std::path::Path;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;

const SESSION_SCHEMA_SQL: &str = "
  CREATE TABLE IF NOT EXISTS session_state (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
  );
";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionKey {
  CurrentCategory,
  LastPage,
  LastEntry,
  Theme,
}

impl SessionKey {
  pub fn as_str(self) -> &'static str {
    match self {
      SessionKey::CurrentCategory => "currentCat",
      SessionKey::LastPage => "lastPage",
      SessionKey::LastEntry => "lastUnit",
      SessionKey::Theme => "theme",
    }
  }
}

pub struct SessionStore {
  connection: Connection,
}

impl SessionStore {
  pub fn open(db_path: &Path) -> Result<Self> {
    if let Some(parent) = db_path.parent() {
      fs::create_dir_all(parent)?;
    }
    Self::init(Connection::open(db_path)?)
  }

  pub fn open_in_memory() -> Result<Self> {
    Self::init(Connection::open_in_memory()?)
  }

  fn init(connection: Connection) -> Result<Self> {
    connection.execute_batch(SESSION_SCHEMA_SQL)?;
    Ok(Self { connection })
  }

  pub fn get(&self, key: SessionKey) -> Result<Option<String>> {
    let value = self
      .connection
      .query_row(
        "SELECT value FROM session_state WHERE key = ?1 LIMIT 1",
        params![key.as_str()],
        |row| row.get(0),
      )
      .optional()?;
    Ok(value)
  }

  pub fn set(&self, key: SessionKey, value: &str) -> Result<()> {
    self.connection.execute(
      "INSERT INTO session_state (key, value, updated_at)
       VALUES (?1, ?2, ?3)
       ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
      params![key.as_str(), value, Utc::now().to_rfc3339()],
    )?;
    Ok(())
  }

  /// Reads never fail the caller; a broken store behaves like an empty one.
  pub fn read_or_none(&self, key: SessionKey) -> Option<String> {
    match self.get(key) {
      Ok(value) => value,
      Err(error) => {
        log::warn!("reading {} failed: {}", key.as_str(), error);
        None
      }
    }
  }

  pub fn write_or_log(&self, key: SessionKey, value: &str) {
    if let Err(error) = self.set(key, value) {
      log::warn!("persisting {} failed: {}", key.as_str(), error);
    }
  }
}
