use crate::catalog::{CatalogEntry, Category, Rarity};
use crate::filter::{filter_visible, tag_cloud, FilterState};

/// Entries are only ever replaced as a whole.
#[derive(Clone, Debug, Default)]
pub struct CatalogStore {
  entries: Vec<CatalogEntry>,
  category: Category,
  filter: FilterState,
  tag_cloud: Vec<String>,
}

impl CatalogStore {
  pub fn new(entries: Vec<CatalogEntry>, category: Category) -> Self {
    let tag_cloud = tag_cloud(&entries, category);
    Self {
      entries,
      category,
      filter: FilterState::default(),
      tag_cloud,
    }
  }

  pub fn entries(&self) -> &[CatalogEntry] {
    &self.entries
  }

  pub fn category(&self) -> Category {
    self.category
  }

  pub fn filter(&self) -> &FilterState {
    &self.filter
  }

  pub fn tag_cloud(&self) -> &[String] {
    &self.tag_cloud
  }

  /// Switching category is the only automatic filter reset.
  pub fn select_category(&mut self, category: Category) {
    self.category = category;
    self.filter.reset();
    self.tag_cloud = tag_cloud(&self.entries, category);
  }

  pub fn replace_entries(&mut self, entries: Vec<CatalogEntry>) {
    self.entries = entries;
    self.tag_cloud = tag_cloud(&self.entries, self.category);
  }

  pub fn set_search(&mut self, text: &str) {
    self.filter.set_search(text);
  }

  pub fn toggle_rarity(&mut self, rarity: Rarity) {
    self.filter.toggle_rarity(rarity);
  }

  pub fn toggle_tag(&mut self, tag: &str) {
    self.filter.toggle_tag(tag);
  }

  /// Narrows the tag filter to exactly `tag`, leaving search and rarity alone.
  pub fn focus_tag(&mut self, tag: &str) {
    self.filter.tags = vec![tag.to_string()];
  }

  pub fn reset_filters(&mut self) {
    self.filter.reset();
  }

  pub fn visible(&self) -> Vec<&CatalogEntry> {
    filter_visible(&self.entries, self.category, &self.filter)
  }

  /// First entry with this exact name, searching every category.
  pub fn find_entry(&self, name: &str) -> Option<&CatalogEntry> {
    self.entries.iter().find(|entry| entry.name == name)
  }

  pub fn other_categories(&self) -> Vec<Category> {
    Category::ALL
      .into_iter()
      .filter(|category| *category != self.category)
      .collect()
  }
}
