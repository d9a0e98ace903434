use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogEntry, Category, Rarity};

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
  /// Always stored lowercased.
  pub search_text: String,
  pub rarity: Option<Rarity>,
  /// Insertion ordered, no duplicates.
  pub tags: Vec<String>,
}

impl FilterState {
  pub fn is_empty(&self) -> bool {
    self.search_text.is_empty() && self.rarity.is_none() && self.tags.is_empty()
  }

  pub fn set_search(&mut self, text: &str) {
    self.search_text = text.to_lowercase();
  }

  pub fn toggle_rarity(&mut self, rarity: Rarity) {
    self.rarity = if self.rarity == Some(rarity) {
      None
    } else {
      Some(rarity)
    };
  }

  pub fn toggle_tag(&mut self, tag: &str) {
    if let Some(position) = self.tags.iter().position(|existing| existing == tag) {
      self.tags.remove(position);
    } else {
      self.tags.push(tag.to_string());
    }
  }

  pub fn reset(&mut self) {
    *self = Self::default();
  }

  /// Tags match by substring against the raw tag text, so "Fire" also
  /// matches an entry tagged "Firearm".
  pub fn matches(&self, entry: &CatalogEntry) -> bool {
    let matches_search = entry.name.to_lowercase().contains(&self.search_text);
    let matches_rarity = self.rarity.is_none() || entry.rarity == self.rarity;
    let matches_tags = self.tags.iter().all(|tag| entry.tags.contains(tag));
    matches_search && matches_rarity && matches_tags
  }
}

pub fn filter_visible<'a>(
  entries: &'a [CatalogEntry],
  category: Category,
  filter: &FilterState,
) -> Vec<&'a CatalogEntry> {
  entries
    .iter()
    .filter(|entry| entry.category == category && filter.matches(entry))
    .collect()
}

pub fn tag_cloud(entries: &[CatalogEntry], category: Category) -> Vec<String> {
  let mut tags: Vec<String> = Vec::new();
  for entry in entries.iter().filter(|entry| entry.category == category) {
    for tag in entry.tag_list() {
      if !tags.iter().any(|existing| existing == tag) {
        tags.push(tag.to_string());
      }
    }
  }
  tags
}
