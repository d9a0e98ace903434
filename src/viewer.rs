use serde::Serialize;

use crate::carousel::{Carousel, CarouselClick};
use crate::catalog::{CatalogEntry, Category, Rarity};
use crate::filter::FilterState;
use crate::session::{SessionKey, SessionStore};
use crate::store::CatalogStore;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Page {
  #[serde(rename = "page-1")]
  Landing,
  #[serde(rename = "page-2")]
  Archive,
  #[serde(rename = "page-3")]
  Detail,
}

impl Page {
  pub fn id(self) -> &'static str {
    match self {
      Page::Landing => "page-1",
      Page::Archive => "page-2",
      Page::Detail => "page-3",
    }
  }

  pub fn from_id(id: &str) -> Option<Self> {
    match id {
      "page-1" => Some(Page::Landing),
      "page-2" => Some(Page::Archive),
      "page-3" => Some(Page::Detail),
      _ => None,
    }
  }
}

#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
  #[default]
  Dark,
  Light,
}

impl Theme {
  pub fn as_str(self) -> &'static str {
    match self {
      Theme::Dark => "dark",
      Theme::Light => "light",
    }
  }

  pub fn toggled(self) -> Self {
    match self {
      Theme::Dark => Theme::Light,
      Theme::Light => Theme::Dark,
    }
  }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DetailView {
  pub entry: CatalogEntry,
  /// Nickname wrapped in double quotes, or empty.
  pub nickname_label: String,
  pub tags: Vec<String>,
  pub carousel: Carousel,
}

impl DetailView {
  fn new(entry: &CatalogEntry) -> Self {
    Self {
      nickname_label: entry
        .nickname
        .as_deref()
        .map(|nickname| format!("\"{}\"", nickname))
        .unwrap_or_default(),
      tags: entry.tag_list().into_iter().map(str::to_string).collect(),
      carousel: Carousel::new(entry.extra_image_urls.clone()),
      entry: entry.clone(),
    }
  }
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ViewSnapshot {
  pub page: Page,
  pub theme: Theme,
  pub category: Category,
  pub other_categories: Vec<Category>,
  pub filter: FilterState,
  pub tag_cloud: Vec<String>,
  pub visible: Vec<CatalogEntry>,
  pub detail: Option<DetailView>,
}

pub struct ViewController {
  store: CatalogStore,
  session: SessionStore,
  page: Page,
  theme: Theme,
  detail: Option<DetailView>,
}

impl ViewController {
  pub fn new(entries: Vec<CatalogEntry>, session: SessionStore) -> Self {
    let category = session
      .read_or_none(SessionKey::CurrentCategory)
      .and_then(|stored| stored.parse::<Category>().ok())
      .unwrap_or_default();
    let theme = match session.read_or_none(SessionKey::Theme).as_deref() {
      Some("light") => Theme::Light,
      _ => Theme::Dark,
    };

    Self {
      store: CatalogStore::new(entries, category),
      session,
      page: Page::Landing,
      theme,
      detail: None,
    }
  }

  pub fn start(entries: Vec<CatalogEntry>, session: SessionStore) -> Self {
    let mut controller = Self::new(entries, session);
    controller.restore();
    controller
  }

  pub fn restore(&mut self) {
    let last_page = self
      .session
      .read_or_none(SessionKey::LastPage)
      .and_then(|id| Page::from_id(&id))
      .unwrap_or(Page::Landing);
    let last_entry = self.session.read_or_none(SessionKey::LastEntry);
    let category = self.store.category();

    match (last_page, last_entry) {
      (Page::Detail, Some(name)) => {
        self.select_category(category, false);
        self.show_entry_detail(&name);
      }
      (Page::Landing, _) => self.show_page(Page::Landing),
      (page, _) => {
        self.select_category(category, false);
        self.show_page(page);
      }
    }
  }

  pub fn page(&self) -> Page {
    self.page
  }

  pub fn theme(&self) -> Theme {
    self.theme
  }

  pub fn store(&self) -> &CatalogStore {
    &self.store
  }

  pub fn detail(&self) -> Option<&DetailView> {
    self.detail.as_ref()
  }

  pub fn show_page(&mut self, page: Page) {
    self.page = page;
    self.session.write_or_log(SessionKey::LastPage, page.id());
  }

  pub fn select_category(&mut self, category: Category, show: bool) {
    self.store.select_category(category);
    self
      .session
      .write_or_log(SessionKey::CurrentCategory, category.as_str());
    if show {
      self.show_page(Page::Archive);
    }
  }

  /// Opens the detail page for the first entry called `name`. Unknown names
  /// change nothing and return false.
  pub fn show_entry_detail(&mut self, name: &str) -> bool {
    let Some(entry) = self.store.find_entry(name) else {
      log::debug!("no catalog entry named '{}'", name);
      return false;
    };
    self.detail = Some(DetailView::new(entry));
    self.session.write_or_log(SessionKey::LastEntry, name);
    self.show_page(Page::Detail);
    true
  }

  pub fn jump_to_tag(&mut self, tag: &str) {
    self.show_page(Page::Archive);
    self.store.focus_tag(tag);
  }

  pub fn set_search(&mut self, text: &str) {
    self.store.set_search(text);
  }

  pub fn toggle_rarity(&mut self, rarity: Rarity) {
    self.store.toggle_rarity(rarity);
  }

  pub fn toggle_tag(&mut self, tag: &str) {
    self.store.toggle_tag(tag);
  }

  pub fn reset_filters(&mut self) {
    self.store.reset_filters();
  }

  pub fn click_carousel(&mut self, index: usize) -> CarouselClick {
    match self.detail.as_mut() {
      Some(detail) => detail.carousel.click(index),
      None => CarouselClick::Ignored,
    }
  }

  pub fn toggle_theme(&mut self) -> Theme {
    self.theme = self.theme.toggled();
    self
      .session
      .write_or_log(SessionKey::Theme, self.theme.as_str());
    self.theme
  }

  pub fn reload(&mut self, entries: Vec<CatalogEntry>) {
    self.store.replace_entries(entries);
    self.detail = None;
    self.page = Page::Landing;
    self.restore();
  }

  pub fn snapshot(&self) -> ViewSnapshot {
    ViewSnapshot {
      page: self.page,
      theme: self.theme,
      category: self.store.category(),
      other_categories: self.store.other_categories(),
      filter: self.store.filter().clone(),
      tag_cloud: self.store.tag_cloud().to_vec(),
      visible: self.store.visible().into_iter().cloned().collect(),
      detail: self.detail.clone(),
    }
  }
}
