//! Common test utilities.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use mangaview_rs::{
    CatalogConfig, CatalogServerBuilder, ChapterData, ChapterRef, ChapterResolver, ContentSource,
    ErrorKind, ImageHandle, PageRef, SourceError, SourceResult, SyntheticConfig, SyntheticSource,
    WindowConfig, WindowPresenter,
};

pub const SERIES: &str = "test-series";

/// Test server wrapper.
pub struct TestServer {
    pub base_url: String,
}

impl TestServer {
    /// Creates and starts a catalog server on a random port.
    pub async fn start() -> Self {
        Self::start_with(false).await
    }

    /// Creates and starts a catalog server serving MRI-encoded pages.
    pub async fn start_obfuscated() -> Self {
        Self::start_with(true).await
    }

    async fn start_with(obfuscate: bool) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let config = CatalogConfig {
            host: "127.0.0.1".to_string(),
            port,
            obfuscate,
            synthetic: SyntheticConfig::default(),
        };
        let server = CatalogServerBuilder::new().config(config).build();

        // Start server in background
        tokio::spawn(async move {
            server.run_on(listener).await.unwrap();
        });

        Self { base_url }
    }

    /// Returns the URL for a chapter manifest.
    pub fn chapter_url(&self, series: &str, chapter: u32) -> String {
        format!("{}/series/{}/chapters/{}", self.base_url, series, chapter)
    }

    /// Returns the URL for a page image.
    pub fn page_url(&self, series: &str, chapter: u32, page: u32) -> String {
        format!("{}/pages/{}", self.chapter_url(series, chapter), page)
    }
}

pub fn page(chapter: u32, page: u32) -> PageRef {
    PageRef::new(SERIES, chapter, page)
}

/// Synthetic provider with the default shape (10 chapters of 30 pages).
pub fn synthetic() -> Arc<SyntheticSource> {
    Arc::new(SyntheticSource::default())
}

/// Synthetic provider whose every lookup takes `latency`.
pub fn slow_synthetic(latency: Duration) -> Arc<SyntheticSource> {
    Arc::new(SyntheticSource::new(SyntheticConfig {
        latency,
        ..SyntheticConfig::default()
    }))
}

pub fn presenter(resolver: Arc<dyn ChapterResolver>, config: WindowConfig) -> WindowPresenter {
    WindowPresenter::new(Arc::new(ContentSource::new(resolver)), config).unwrap()
}

/// Provider with hand-picked chapter sizes; chapters past the list do not
/// exist.
pub struct FixedSource {
    pub page_counts: Vec<u32>,
}

#[async_trait]
impl ChapterResolver for FixedSource {
    async fn resolve_chapter(&self, chapter: &ChapterRef) -> SourceResult<Option<ChapterData>> {
        Ok(self
            .page_counts
            .get(chapter.chapter_number as usize)
            .map(|&count| ChapterData::with_page_count(chapter.clone(), count)))
    }

    async fn resolve_page_image(&self, page: &PageRef) -> SourceResult<ImageHandle> {
        Ok(ImageHandle::new("text/plain", page.to_string()))
    }
}

/// Wraps the synthetic provider and fails chapter lookups past chapter 0
/// while the switch is on.
pub struct FlakySource {
    inner: SyntheticSource,
    failing: AtomicBool,
}

impl FlakySource {
    pub fn new() -> Self {
        Self {
            inner: SyntheticSource::default(),
            failing: AtomicBool::new(true),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl ChapterResolver for FlakySource {
    async fn resolve_chapter(&self, chapter: &ChapterRef) -> SourceResult<Option<ChapterData>> {
        if chapter.chapter_number > 0 && self.failing.load(Ordering::SeqCst) {
            return Err(SourceError::with_message(
                ErrorKind::Transport,
                format!("connection reset resolving {}", chapter),
            ));
        }
        self.inner.resolve_chapter(chapter).await
    }

    async fn resolve_page_image(&self, page: &PageRef) -> SourceResult<ImageHandle> {
        self.inner.resolve_page_image(page).await
    }
}
