//! The contract between the reader core and a concrete content provider.

use async_trait::async_trait;
use futures::future::join_all;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

use crate::error::SourceResult;
use crate::models::{ChapterData, ChapterRef, ImageHandle, PageKey, PageRef, Series};

/// Trait for providers that resolve chapters and page images, e.g. a remote
/// scraper or a synthetic generator.
#[async_trait]
pub trait ChapterResolver: Send + Sync {
    /// Resolves the page list of a chapter.
    ///
    /// Returns `Ok(None)` when the chapter does not exist; errors are
    /// reserved for failures of the provider itself.
    async fn resolve_chapter(&self, chapter: &ChapterRef) -> SourceResult<Option<ChapterData>>;

    /// Produces a displayable image for a page.
    async fn resolve_page_image(&self, page: &PageRef) -> SourceResult<ImageHandle>;

    /// Lists the provider's most popular series. Providers without a
    /// catalog list nothing.
    async fn popular_series(&self) -> SourceResult<Vec<Series>> {
        Ok(Vec::new())
    }
}

/// A page handed to the rendering layer: its reference plus a lazy image
/// loader. Dropping it releases only the handle, never the provider.
#[derive(Clone)]
pub struct PageData {
    pub page_ref: PageRef,
    resolver: Arc<dyn ChapterResolver>,
}

impl PageData {
    pub fn new(page_ref: PageRef, resolver: Arc<dyn ChapterResolver>) -> Self {
        Self { page_ref, resolver }
    }

    pub fn key(&self) -> PageKey {
        self.page_ref.key()
    }

    /// Loads the page image. Every call goes back to the provider.
    pub async fn load_image(&self) -> SourceResult<ImageHandle> {
        self.resolver.resolve_page_image(&self.page_ref).await
    }
}

impl fmt::Debug for PageData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageData")
            .field("page_ref", &self.page_ref)
            .finish_non_exhaustive()
    }
}

impl PartialEq for PageData {
    fn eq(&self, other: &Self) -> bool {
        self.page_ref == other.page_ref
    }
}

/// Loads the images of many pages concurrently.
///
/// Each page gets its own result in input order, so one slow or failing
/// image never holds back its siblings.
pub async fn load_images(pages: &[PageData]) -> Vec<SourceResult<ImageHandle>> {
    let results = join_all(pages.iter().map(|page| page.load_image())).await;
    for (page, result) in pages.iter().zip(&results) {
        if let Err(err) = result {
            warn!("Image for {} unavailable: {}", page.page_ref, err);
        }
    }
    results
}
