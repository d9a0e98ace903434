use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use std::thread;

use chrono::Utc;
use tauri::{AppHandle, Emitter, Manager, State};

use crate::carousel::CarouselClick;
use crate::catalog::{Category, Rarity};
use crate::config::ViewerConfig;
use crate::error::{ArchiveError, Result};
use crate::export::export_watermarked;
use crate::progress::{load_with_progress, ProgressPacing};
use crate::session::SessionStore;
use crate::source::load_catalog;
use crate::viewer::{Page, Theme, ViewController, ViewSnapshot};

const SESSION_DB_FILE: &str = "session.db";
const EVENT_LOADING_PROGRESS: &str = "loading-progress";
const EVENT_CATALOG_READY: &str = "catalog-ready";

struct AppState {
  config: ViewerConfig,
  download_dir: PathBuf,
  viewer: Mutex<Option<ViewController>>,
}

impl AppState {
  fn with_viewer<T>(&self, action: impl FnOnce(&mut ViewController) -> T) -> Result<T> {
    let mut guard = self.viewer.lock().unwrap_or_else(PoisonError::into_inner);
    let viewer = guard.as_mut().ok_or(ArchiveError::NotReady)?;
    Ok(action(viewer))
  }
}

fn emit_or_log<S: serde::Serialize + Clone>(handle: &AppHandle, event: &str, payload: S) {
  if let Err(error) = handle.emit(event, payload) {
    log::debug!("emitting {} failed: {}", event, error);
  }
}

fn spawn_startup(handle: AppHandle, config: ViewerConfig, session: SessionStore) {
  thread::spawn(move || {
    let entries = load_with_progress(
      || load_catalog(&config),
      ProgressPacing::default(),
      |progress| emit_or_log(&handle, EVENT_LOADING_PROGRESS, progress),
    );

    let viewer = ViewController::start(entries, session);
    let snapshot = viewer.snapshot();
    let state = handle.state::<AppState>();
    *state.viewer.lock().unwrap_or_else(PoisonError::into_inner) = Some(viewer);
    emit_or_log(&handle, EVENT_CATALOG_READY, snapshot);
  });
}

#[tauri::command]
fn get_view(state: State<'_, AppState>) -> Result<ViewSnapshot> {
  state.with_viewer(|viewer| viewer.snapshot())
}

#[tauri::command]
fn select_category(state: State<'_, AppState>, category: Category) -> Result<ViewSnapshot> {
  state.with_viewer(|viewer| {
    viewer.select_category(category, true);
    viewer.snapshot()
  })
}

#[tauri::command]
fn show_page(state: State<'_, AppState>, page_id: String) -> Result<ViewSnapshot> {
  state.with_viewer(|viewer| {
    if let Some(page) = Page::from_id(&page_id) {
      viewer.show_page(page);
    }
    viewer.snapshot()
  })
}

#[tauri::command]
fn set_search(state: State<'_, AppState>, text: String) -> Result<ViewSnapshot> {
  state.with_viewer(|viewer| {
    viewer.set_search(&text);
    viewer.snapshot()
  })
}

#[tauri::command]
fn toggle_rarity(state: State<'_, AppState>, rarity: Rarity) -> Result<ViewSnapshot> {
  state.with_viewer(|viewer| {
    viewer.toggle_rarity(rarity);
    viewer.snapshot()
  })
}

#[tauri::command]
fn toggle_tag(state: State<'_, AppState>, tag: String) -> Result<ViewSnapshot> {
  state.with_viewer(|viewer| {
    viewer.toggle_tag(&tag);
    viewer.snapshot()
  })
}

#[tauri::command]
fn reset_filters(state: State<'_, AppState>) -> Result<ViewSnapshot> {
  state.with_viewer(|viewer| {
    viewer.reset_filters();
    viewer.snapshot()
  })
}

#[tauri::command]
fn jump_to_tag(state: State<'_, AppState>, tag: String) -> Result<ViewSnapshot> {
  state.with_viewer(|viewer| {
    viewer.jump_to_tag(&tag);
    viewer.snapshot()
  })
}

#[tauri::command]
fn show_entry_detail(state: State<'_, AppState>, name: String) -> Result<ViewSnapshot> {
  state.with_viewer(|viewer| {
    viewer.show_entry_detail(&name);
    viewer.snapshot()
  })
}

#[tauri::command]
fn click_carousel(state: State<'_, AppState>, index: usize) -> Result<CarouselClick> {
  state.with_viewer(|viewer| viewer.click_carousel(index))
}

#[tauri::command]
fn toggle_theme(state: State<'_, AppState>) -> Result<Theme> {
  state.with_viewer(|viewer| viewer.toggle_theme())
}

#[tauri::command]
fn reload_catalog(state: State<'_, AppState>) -> Result<ViewSnapshot> {
  let entries = load_catalog(&state.config);
  state.with_viewer(|viewer| {
    viewer.reload(entries);
    viewer.snapshot()
  })
}

#[tauri::command]
fn export_image(state: State<'_, AppState>, source: String) -> Result<Option<String>> {
  let written = export_watermarked(&source, &state.download_dir, &state.config, Utc::now())?;
  Ok(written.map(|path| path.display().to_string()))
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
  tauri::Builder::default()
    .setup(|app| {
      if cfg!(debug_assertions) {
        app.handle().plugin(
          tauri_plugin_log::Builder::default()
            .level(log::LevelFilter::Info)
            .build(),
        )?;
      }

      let app_data_dir = app.path().app_data_dir()?;
      let download_dir = app
        .path()
        .download_dir()
        .unwrap_or_else(|_| app_data_dir.join("downloads"));
      let config = ViewerConfig::load(&app_data_dir);
      let session = SessionStore::open(&app_data_dir.join(SESSION_DB_FILE))?;

      app.manage(AppState {
        config: config.clone(),
        download_dir,
        viewer: Mutex::new(None),
      });
      spawn_startup(app.handle().clone(), config, session);
      Ok(())
    })
    .invoke_handler(tauri::generate_handler![
      get_view,
      select_category,
      show_page,
      set_search,
      toggle_rarity,
      toggle_tag,
      reset_filters,
      jump_to_tag,
      show_entry_detail,
      click_carousel,
      toggle_theme,
      reload_catalog,
      export_image
    ])
    .run(tauri::generate_context!())
    .expect("error while running tauri application");
}
