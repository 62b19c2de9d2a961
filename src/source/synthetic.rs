//! Synthetic provider that generates series on the fly.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::time;

use super::ChapterResolver;
use crate::config::SyntheticConfig;
use crate::error::{ErrorKind, SourceError, SourceResult};
use crate::models::{ChapterData, ChapterRef, ImageHandle, PageRef, Series};

const PAGE_WIDTH: u32 = 500;
const PAGE_HEIGHT: u32 = 800;

/// Generates a fixed number of equally sized chapters for any series id,
/// with labelled SVG pages.
pub struct SyntheticSource {
    config: SyntheticConfig,
    chapter_requests: AtomicUsize,
    image_requests: AtomicUsize,
}

impl SyntheticSource {
    pub fn new(config: SyntheticConfig) -> Self {
        Self {
            config,
            chapter_requests: AtomicUsize::new(0),
            image_requests: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &SyntheticConfig {
        &self.config
    }

    /// Number of chapter resolutions served so far.
    pub fn chapter_requests(&self) -> usize {
        self.chapter_requests.load(Ordering::Relaxed)
    }

    /// Number of page images produced so far.
    pub fn image_requests(&self) -> usize {
        self.image_requests.load(Ordering::Relaxed)
    }

    /// Whether `page` lies inside the generated series.
    pub fn contains(&self, page: &PageRef) -> bool {
        page.chapter_number < self.config.chapter_count
            && page.page_number < self.config.chapter_page_count
    }

    async fn simulate_latency(&self) {
        if !self.config.latency.is_zero() {
            time::sleep(self.config.latency).await;
        }
    }
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self::new(SyntheticConfig::default())
    }
}

#[async_trait]
impl ChapterResolver for SyntheticSource {
    async fn resolve_chapter(&self, chapter: &ChapterRef) -> SourceResult<Option<ChapterData>> {
        self.chapter_requests.fetch_add(1, Ordering::Relaxed);
        self.simulate_latency().await;

        if chapter.chapter_number >= self.config.chapter_count {
            return Ok(None);
        }
        Ok(Some(ChapterData::with_page_count(
            chapter.clone(),
            self.config.chapter_page_count,
        )))
    }

    async fn resolve_page_image(&self, page: &PageRef) -> SourceResult<ImageHandle> {
        self.image_requests.fetch_add(1, Ordering::Relaxed);
        if !self.contains(page) {
            return Err(SourceError::with_message(
                ErrorKind::ImageUnavailable,
                format!("Synthetic series has no page {}", page),
            ));
        }
        self.simulate_latency().await;
        Ok(ImageHandle::new("image/svg+xml", render_page(page)))
    }

    async fn popular_series(&self) -> SourceResult<Vec<Series>> {
        self.simulate_latency().await;
        Ok(vec![
            Series::new("1", "Test Series 1").with_description("Magical beasts foo"),
            Series::new("2", "Test Series 2").with_description("Magical yoghurt foo"),
        ])
    }
}

/// Renders a blank page with its chapter and page number in the corner.
pub fn render_page(page: &PageRef) -> String {
    format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}">"#,
            r#"<rect width="100%" height="100%" fill="white"/>"#,
            r#"<text x="30" y="30" font-family="serif" font-size="16" fill="blue">"#,
            "Chapter {c}, page {p}</text></svg>"
        ),
        w = PAGE_WIDTH,
        h = PAGE_HEIGHT,
        c = page.chapter_number,
        p = page.page_number,
    )
}
