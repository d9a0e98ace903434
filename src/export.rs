use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use image::{ImageFormat, RgbaImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::ViewerConfig;
use crate::error::Result;
use crate::source::http_get;
use crate::watermark::{apply_watermark, WatermarkText};

pub fn export_file_name(prefix: &str, now: DateTime<Utc>) -> String {
  format!("{}{}.png", prefix, now.timestamp_millis())
}

fn is_remote(source: &str) -> bool {
  let lowered = source.trim_start().to_ascii_lowercase();
  lowered.starts_with("http://") || lowered.starts_with("https://")
}

fn fetch_image_bytes(url: &str, config: &ViewerConfig) -> Result<Vec<u8>> {
  let response = http_get(config, url, "image/*")?;
  Ok(response.bytes()?.to_vec())
}

pub fn load_source_image(source: &str, config: &ViewerConfig) -> Result<RgbaImage> {
  let bytes = if is_remote(source) {
    fetch_image_bytes(source.trim(), config)?
  } else {
    fs::read(source)?
  };
  Ok(image::load_from_memory(&bytes)?.to_rgba8())
}

/// A source that cannot be loaded produces no file and `Ok(None)`.
pub fn export_watermarked_with<R: Rng + ?Sized>(
  source: &str,
  out_dir: &Path,
  config: &ViewerConfig,
  now: DateTime<Utc>,
  rng: &mut R,
) -> Result<Option<PathBuf>> {
  let image = match load_source_image(source, config) {
    Ok(image) => image,
    Err(error) => {
      log::warn!("skipping export of {}: {}", source, error);
      return Ok(None);
    }
  };

  let text = WatermarkText {
    primary: config.watermark_text.clone(),
    secondary: config.watermark_short_text.clone(),
  };
  let marked = apply_watermark(&image, &text, rng);

  fs::create_dir_all(out_dir)?;
  let path = out_dir.join(export_file_name(&config.export_prefix, now));
  marked.save_with_format(&path, ImageFormat::Png)?;
  log::info!("exported watermarked image to {}", path.display());
  Ok(Some(path))
}

pub fn export_watermarked(
  source: &str,
  out_dir: &Path,
  config: &ViewerConfig,
  now: DateTime<Utc>,
) -> Result<Option<PathBuf>> {
  export_watermarked_with(source, out_dir, config, now, &mut StdRng::from_entropy())
}
