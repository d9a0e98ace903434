use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const CONFIG_FILE_NAME: &str = "viewer_config.json";
const PLACEHOLDER_URL_MARKER: &str = "S1p_S1p";

const DEFAULT_FALLBACK_IMAGES: [&str; 3] = [
  "https://images.unsplash.com/photo-1542751371-adc38448a05e?w=400&h=600&fit=crop",
  "https://images.unsplash.com/photo-1552820728-8b83bb6b773f?w=400&h=600&fit=crop",
  "https://images.unsplash.com/photo-1511512578047-dfb367046420?w=400&h=600&fit=crop",
];
const DEFAULT_EXTRA_IMAGES: [&str; 3] = [
  "https://picsum.photos/400/400?random=1",
  "https://picsum.photos/400/400?random=2",
  "https://picsum.photos/400/400?random=3",
];

const DEFAULT_CSV_URL: &str = "https://docs.google.com/spreadsheets/d/e/2PACX-1vTfX6o_W1y8q6v_r1R_S1p_S1p_S1p_S1p_S1p_S1p_S1p_S1p_S1p_S1p_S1p/pub?output=csv";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewerConfig {
  pub csv_url: String,
  pub watermark_text: String,
  pub watermark_short_text: String,
  pub export_prefix: String,
  pub fallback_images: Vec<String>,
  pub extra_image_urls: Vec<String>,
  pub request_timeout_secs: u64,
}

impl Default for ViewerConfig {
  fn default() -> Self {
    Self {
      csv_url: DEFAULT_CSV_URL.to_string(),
      watermark_text: "TikTok : ainime.id".to_string(),
      watermark_short_text: "ainime.id".to_string(),
      export_prefix: "ainime-".to_string(),
      fallback_images: DEFAULT_FALLBACK_IMAGES.map(String::from).to_vec(),
      extra_image_urls: DEFAULT_EXTRA_IMAGES.map(String::from).to_vec(),
      request_timeout_secs: 30,
    }
  }
}

impl ViewerConfig {
  /// A malformed file is logged and ignored.
  pub fn load(dir: &Path) -> Self {
    let path = dir.join(CONFIG_FILE_NAME);
    if !path.exists() {
      return Self::default();
    }
    match Self::read(&path) {
      Ok(config) => config,
      Err(error) => {
        log::warn!("ignoring {}: {}", path.display(), error);
        Self::default()
      }
    }
  }

  fn read(path: &Path) -> Result<Self> {
    let body = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&body)?)
  }

  pub fn uses_placeholder_url(&self) -> bool {
    self.csv_url.trim().is_empty() || self.csv_url.contains(PLACEHOLDER_URL_MARKER)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[test]
  fn missing_file_yields_defaults() {
    let dir = tempdir().unwrap();
    assert_eq!(ViewerConfig::load(dir.path()), ViewerConfig::default());
  }

  #[test]
  fn partial_file_overrides_only_named_fields() {
    let dir = tempdir().unwrap();
    fs::write(
      dir.path().join(CONFIG_FILE_NAME),
      r#"{"csvUrl": "https://example.com/sheet.csv", "exportPrefix": "realm-"}"#,
    )
    .unwrap();

    let config = ViewerConfig::load(dir.path());
    assert_eq!(config.csv_url, "https://example.com/sheet.csv");
    assert_eq!(config.export_prefix, "realm-");
    assert_eq!(config.watermark_text, "TikTok : ainime.id");
    assert!(!config.uses_placeholder_url());
  }

  #[test]
  fn malformed_file_falls_back_to_defaults() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join(CONFIG_FILE_NAME), "{not json").unwrap();
    assert_eq!(ViewerConfig::load(dir.path()), ViewerConfig::default());
  }

  #[test]
  fn default_url_is_placeholder() {
    assert!(ViewerConfig::default().uses_placeholder_url());
  }
}
