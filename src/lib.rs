//! mangaview-rs: windowed, prefetching manga page reader core.
//!
//! A [`ContentSource`] resolves chapters through a pluggable
//! [`ChapterResolver`] and walks the page sequence across chapter
//! boundaries. A [`WindowPresenter`] keeps a bounded window of pages around
//! the reader's viewport, prefetching near either edge and evicting from the
//! other.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use mangaview_rs::{ContentSource, SyntheticSource, WindowConfig, WindowPresenter};
//!
//! #[tokio::main]
//! async fn main() {
//!     let source = Arc::new(ContentSource::new(Arc::new(SyntheticSource::default())));
//!     let presenter = WindowPresenter::new(source, WindowConfig::default()).unwrap();
//!     presenter.load_pages("series").await.unwrap();
//! }
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod server;
pub mod session;
pub mod source;
pub mod window;

// Re-exports for convenience
pub use config::{
    Args, CatalogConfig, ReadConfig, SyntheticConfig, WindowConfig, CHAPTER_PAGE_COUNT,
    DEFAULT_RANGE_SPAN, MAX_PAGES, RANGE_EXPANSION_LIMIT,
};
pub use error::{ErrorKind, SourceError, SourceResult};
pub use models::{
    ChapterData, ChapterRef, ImageHandle, PageKey, PageRange, PageRef, Series, ViewportRange,
};
pub use server::{CatalogServer, CatalogServerBuilder};
pub use source::{ChapterResolver, ContentSource, PageData, RemoteSource, SyntheticSource};
pub use window::{
    Direction, PrefetchOutcome, PrefetchReport, ScrollEvent, WindowEvent, WindowPresenter,
};
