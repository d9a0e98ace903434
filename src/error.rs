use serde::{Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
  #[error("catalog request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("catalog request failed with status {0}")]
  HttpStatus(reqwest::StatusCode),

  #[error("malformed catalog payload: {0}")]
  MalformedCatalog(String),

  #[error("session storage error: {0}")]
  Storage(#[from] rusqlite::Error),

  #[error("image error: {0}")]
  Image(#[from] image::ImageError),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("invalid viewer config: {0}")]
  Config(#[from] serde_json::Error),

  #[error("catalog is still loading")]
  NotReady,
}

// Tauri commands hand errors to the frontend as plain strings.
impl Serialize for ArchiveError {
  fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

pub type Result<T> = std::result::Result<T, ArchiveError>;
