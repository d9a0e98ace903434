use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, USER_AGENT};

use crate::catalog::{CatalogEntry, Category, Rarity, RawRecord};
use crate::config::ViewerConfig;
use crate::error::{ArchiveError, Result};

pub const FIELD_DELIMITER: char = ',';
pub const FALLBACK_ENTRIES_PER_CATEGORY: usize = 3;

/// Header names are trimmed, lowercased and have spaces replaced by
/// underscores. Short rows are padded with empty strings. Quoted fields that
/// contain the delimiter are not supported.
pub fn parse_delimited(text: &str, delimiter: char) -> Vec<RawRecord> {
  let mut lines = text.split('\n').filter(|line| !line.trim().is_empty());
  let Some(header_line) = lines.next() else {
    return Vec::new();
  };

  let headers: Vec<String> = header_line
    .split(delimiter)
    .map(|header| header.trim().to_lowercase().replace(' ', "_"))
    .collect();

  lines
    .map(|line| {
      let values: Vec<&str> = line.split(delimiter).map(str::trim).collect();
      headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
          let value = values.get(index).copied().unwrap_or_default();
          (header.clone(), value.to_string())
        })
        .collect()
    })
    .collect()
}

pub fn entries_from_records(records: &[RawRecord]) -> Vec<CatalogEntry> {
  records
    .iter()
    .filter_map(|record| match CatalogEntry::from_record(record) {
      Ok(entry) => Some(entry),
      Err(error) => {
        log::debug!("skipping catalog row: {}", error);
        None
      }
    })
    .collect()
}

pub fn parse_catalog(text: &str) -> Result<Vec<CatalogEntry>> {
  let records = parse_delimited(text, FIELD_DELIMITER);
  if records.is_empty() {
    return Err(ArchiveError::MalformedCatalog(
      "no data rows in catalog export".to_string(),
    ));
  }
  if !records[0].contains_key("name") || !records[0].contains_key("category") {
    return Err(ArchiveError::MalformedCatalog(
      "catalog export is missing the name or category column".to_string(),
    ));
  }

  let entries = entries_from_records(&records);
  if entries.is_empty() {
    return Err(ArchiveError::MalformedCatalog(
      "no catalog row has a known category".to_string(),
    ));
  }
  Ok(entries)
}

/// GET with the configured timeout. Non-success statuses are errors.
pub fn http_get(config: &ViewerConfig, url: &str, accept: &str) -> Result<Response> {
  let client = Client::builder()
    .timeout(Duration::from_secs(config.request_timeout_secs))
    .build()?;

  let response = client
    .get(url)
    .header(USER_AGENT, concat!("realm-archive/", env!("CARGO_PKG_VERSION")))
    .header(ACCEPT, accept)
    .send()?;

  if !response.status().is_success() {
    return Err(ArchiveError::HttpStatus(response.status()));
  }

  Ok(response)
}

pub fn fetch_catalog_text(config: &ViewerConfig) -> Result<String> {
  let response = http_get(config, &config.csv_url, "text/csv,text/plain,*/*")?;
  Ok(response.text()?)
}

pub fn fallback_dataset<R: Rng + ?Sized>(config: &ViewerConfig, rng: &mut R) -> Vec<CatalogEntry> {
  let mut entries = Vec::with_capacity(Category::ALL.len() * FALLBACK_ENTRIES_PER_CATEGORY);
  for category in Category::ALL {
    for index in 1..=FALLBACK_ENTRIES_PER_CATEGORY {
      let main_image_url = config
        .fallback_images
        .get(index - 1)
        .or_else(|| config.fallback_images.first())
        .cloned()
        .unwrap_or_default();

      entries.push(CatalogEntry {
        category,
        name: format!("{} Legend {}", category, index),
        nickname: Some(format!("Title of {}", category)),
        story: Some(format!(
          "Born from the fragments of the old world, this {} possesses power beyond mortal comprehension.",
          category
        )),
        rarity: Rarity::ALL.choose(rng).copied(),
        main_image_url,
        extra_image_urls: config.extra_image_urls.iter().take(3).cloned().collect(),
        tags: format!("{}, Power, Ancient", category),
      });
    }
  }
  entries
}

/// Substitutes the fallback dataset on any failure, so it never errors.
pub fn load_catalog_with<F, R>(config: &ViewerConfig, fetch: F, rng: &mut R) -> Vec<CatalogEntry>
where
  F: FnOnce(&ViewerConfig) -> Result<String>,
  R: Rng + ?Sized,
{
  if config.uses_placeholder_url() {
    log::info!("catalog url is a placeholder, using fallback dataset");
    return fallback_dataset(config, rng);
  }

  match fetch(config).and_then(|text| parse_catalog(&text)) {
    Ok(entries) => {
      log::info!("loaded {} remote catalog entries", entries.len());
      entries
    }
    Err(error) => {
      log::warn!("catalog load failed, using fallback dataset: {}", error);
      fallback_dataset(config, rng)
    }
  }
}

pub fn load_catalog(config: &ViewerConfig) -> Vec<CatalogEntry> {
  load_catalog_with(config, fetch_catalog_text, &mut rand::thread_rng())
}

#[cfg(test)]
mod tests {
  use super::*;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  fn remote_config() -> ViewerConfig {
    ViewerConfig {
      csv_url: "https://example.com/archive.csv".to_string(),
      ..ViewerConfig::default()
    }
  }

  #[test]
  fn parse_yields_one_record_per_data_line_with_every_header() {
    let text = concat!(
      "Category,Name,Main Image URL,Tags\n",
      "Monster,Grim,https://img/g.png,Dark\n\n  \n",
      "Pet,Mochi\n"
    );
    let records = parse_delimited(text, ',');

    assert_eq!(records.len(), 2);
    for record in &records {
      for header in ["category", "name", "main_image_url", "tags"] {
        assert!(record.contains_key(header), "missing {}", header);
      }
    }
    assert_eq!(records[0]["main_image_url"], "https://img/g.png");
    assert_eq!(records[1]["name"], "Mochi");
    assert_eq!(records[1]["tags"], "");
  }

  #[test]
  fn parse_handles_crlf_and_empty_input() {
    assert!(parse_delimited("", ',').is_empty());
    let records = parse_delimited("name,rarity\r\nAxe,B\r\n", ',');
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["rarity"], "B");
  }

  #[test]
  fn quoted_delimiters_are_split_naively() {
    let records = parse_delimited("name,story\nBlade,\"sharp, old\"", ',');
    assert_eq!(records[0]["story"], "\"sharp");
  }

  #[test]
  fn fallback_dataset_has_three_legends_per_category() {
    let mut rng = StdRng::seed_from_u64(7);
    let entries = fallback_dataset(&ViewerConfig::default(), &mut rng);

    assert_eq!(entries.len(), Category::ALL.len() * 3);
    for category in Category::ALL {
      let names: Vec<&str> = entries
        .iter()
        .filter(|entry| entry.category == category)
        .map(|entry| entry.name.as_str())
        .collect();
      let expected: Vec<String> = (1..=3)
        .map(|n| format!("{} Legend {}", category, n))
        .collect();
      assert_eq!(names, expected);
    }
    for entry in &entries {
      assert!(entry.rarity.is_some());
      assert_eq!(entry.extra_image_urls.len(), 3);
    }
  }

  #[test]
  fn unparseable_url_is_an_http_error() {
    let result = http_get(&remote_config(), "not a url", "*/*");
    assert!(matches!(result, Err(ArchiveError::Http(_))));
  }

  #[test]
  fn fetch_failure_falls_back() {
    let mut rng = StdRng::seed_from_u64(1);
    let entries = load_catalog_with(
      &remote_config(),
      |_| Err(ArchiveError::MalformedCatalog("offline".to_string())),
      &mut rng,
    );
    assert_eq!(entries.len(), 18);
    assert_eq!(entries[0].name, "Character Legend 1");
  }

  #[test]
  fn malformed_payload_falls_back() {
    let mut rng = StdRng::seed_from_u64(1);
    let entries = load_catalog_with(
      &remote_config(),
      |_| Ok("<html><body>Sign in</body></html>".to_string()),
      &mut rng,
    );
    assert_eq!(entries.len(), 18);
  }

  #[test]
  fn placeholder_url_skips_fetch() {
    let mut rng = StdRng::seed_from_u64(1);
    let entries = load_catalog_with(
      &ViewerConfig::default(),
      |_| panic!("placeholder url must not be fetched"),
      &mut rng,
    );
    assert_eq!(entries.len(), 18);
  }

  #[test]
  fn remote_payload_is_used_when_valid() {
    let mut rng = StdRng::seed_from_u64(1);
    let entries = load_catalog_with(
      &remote_config(),
      |_| Ok("category,name,rarity,tags\nMonster,Grim,S,Dark\nWeather,Storm,A,\n".to_string()),
      &mut rng,
    );
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "Grim");
    assert_eq!(entries[0].rarity, Some(Rarity::S));
  }
}
