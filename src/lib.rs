pub mod carousel;
pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod progress;
pub mod session;
pub mod source;
pub mod store;
pub mod viewer;
pub mod watermark;

#[cfg(feature = "desktop")]
mod desktop;

pub use catalog::{CatalogEntry, Category, Rarity};
pub use config::ViewerConfig;
pub use error::{ArchiveError, Result};
pub use filter::{filter_visible, tag_cloud, FilterState};
pub use source::{load_catalog, parse_delimited};
pub use store::CatalogStore;
pub use viewer::{Page, Theme, ViewController, ViewSnapshot};
pub use watermark::{apply_watermark, apply_watermark_unseeded, WatermarkText};

#[cfg(feature = "desktop")]
pub use desktop::run;
