use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One parsed row of the delimited export, keyed by normalized header name.
pub type RawRecord = HashMap<String, String>;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Category {
  #[default]
  Character,
  Monster,
  Pet,
  Item,
  Magic,
  Area,
}

impl Category {
  pub const ALL: [Category; 6] = [
    Category::Character,
    Category::Monster,
    Category::Pet,
    Category::Item,
    Category::Magic,
    Category::Area,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Category::Character => "Character",
      Category::Monster => "Monster",
      Category::Pet => "Pet",
      Category::Item => "Item",
      Category::Magic => "Magic",
      Category::Area => "Area",
    }
  }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Category {
  type Err = String;

  fn from_str(value: &str) -> Result<Self, Self::Err> {
    let normalized = value.trim();
    Category::ALL
      .into_iter()
      .find(|category| category.as_str().eq_ignore_ascii_case(normalized))
      .ok_or_else(|| format!("Unknown category '{}'.", normalized))
  }
}

/// Quality tier. Declared lowest first so the derived ordering gives S > A > B > C > D.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rarity {
  D,
  C,
  B,
  A,
  S,
}

impl Rarity {
  pub const ALL: [Rarity; 5] = [Rarity::S, Rarity::A, Rarity::B, Rarity::C, Rarity::D];

  pub fn as_str(self) -> &'static str {
    match self {
      Rarity::S => "S",
      Rarity::A => "A",
      Rarity::B => "B",
      Rarity::C => "C",
      Rarity::D => "D",
    }
  }
}

impl fmt::Display for Rarity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// Exact match after trimming, like the rarity chips compare.
impl FromStr for Rarity {
  type Err = String;

  fn from_str(value: &str) -> Result<Self, Self::Err> {
    let normalized = value.trim();
    Rarity::ALL
      .into_iter()
      .find(|rarity| rarity.as_str() == normalized)
      .ok_or_else(|| format!("Unknown rarity '{}'.", normalized))
  }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
  pub category: Category,
  pub name: String,
  pub nickname: Option<String>,
  pub story: Option<String>,
  pub rarity: Option<Rarity>,
  pub main_image_url: String,
  pub extra_image_urls: Vec<String>,
  /// Comma-delimited exactly as loaded. Tag filtering matches against this text.
  pub tags: String,
}

fn non_empty(record: &RawRecord, field: &str) -> Option<String> {
  record
    .get(field)
    .map(|value| value.trim())
    .filter(|value| !value.is_empty())
    .map(str::to_string)
}

fn parse_rarity(raw: &str) -> Option<Rarity> {
  match raw.parse() {
    Ok(rarity) => Some(rarity),
    Err(error) => {
      log::debug!("{}", error);
      None
    }
  }
}

impl CatalogEntry {
  /// Rows whose category is not one of the fixed set are rejected.
  pub fn from_record(record: &RawRecord) -> Result<Self, String> {
    let category = record
      .get("category")
      .map(String::as_str)
      .unwrap_or_default()
      .parse::<Category>()?;

    let rarity = non_empty(record, "rarity").and_then(|raw| parse_rarity(&raw));

    let extra_image_urls = ["extra_image_1", "extra_image_2", "extra_image_3"]
      .into_iter()
      .filter_map(|field| non_empty(record, field))
      .collect();

    Ok(Self {
      category,
      name: record.get("name").cloned().unwrap_or_default(),
      nickname: non_empty(record, "nickname"),
      story: non_empty(record, "story"),
      rarity,
      main_image_url: record.get("main_image_url").cloned().unwrap_or_default(),
      extra_image_urls,
      tags: record.get("tags").cloned().unwrap_or_default(),
    })
  }

  pub fn tag_list(&self) -> Vec<&str> {
    self
      .tags
      .split(',')
      .map(str::trim)
      .filter(|tag| !tag.is_empty())
      .collect()
  }
}
