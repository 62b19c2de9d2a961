//! Chapter references and resolved chapter data.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::PageRef;

/// Identifies one chapter of a series.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChapterRef {
    pub series_id: String,
    /// Zero-based chapter index.
    pub chapter_number: u32,
}

impl ChapterRef {
    pub fn new(series_id: impl Into<String>, chapter_number: u32) -> Self {
        Self {
            series_id: series_id.into(),
            chapter_number,
        }
    }

    /// Returns the cache key `seriesId-chapterNumber`.
    pub fn key(&self) -> ChapterKey {
        ChapterKey(format!("{}-{}", self.series_id, self.chapter_number))
    }

    pub fn next(&self) -> Self {
        Self::new(self.series_id.clone(), self.chapter_number + 1)
    }

    /// The preceding chapter, or `None` for chapter 0.
    pub fn previous(&self) -> Option<Self> {
        self.chapter_number
            .checked_sub(1)
            .map(|n| Self::new(self.series_id.clone(), n))
    }

    pub fn page(&self, page_number: u32) -> PageRef {
        PageRef::new(self.series_id.clone(), self.chapter_number, page_number)
    }
}

impl From<&PageRef> for ChapterRef {
    fn from(page: &PageRef) -> Self {
        page.chapter_ref()
    }
}

impl fmt::Display for ChapterRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.series_id, self.chapter_number)
    }
}

/// Cache key of a chapter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChapterKey(String);

impl ChapterKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The full, ordered page list of one chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterData {
    pub chapter_ref: ChapterRef,
    pub pages: Vec<PageRef>,
}

impl ChapterData {
    pub fn new(chapter_ref: ChapterRef, pages: Vec<PageRef>) -> Self {
        Self { chapter_ref, pages }
    }

    /// Builds a chapter with pages `0..page_count`.
    pub fn with_page_count(chapter_ref: ChapterRef, page_count: u32) -> Self {
        let pages = (0..page_count).map(|i| chapter_ref.page(i)).collect();
        Self { chapter_ref, pages }
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn first_page(&self) -> Option<&PageRef> {
        self.pages.first()
    }

    pub fn last_page(&self) -> Option<&PageRef> {
        self.pages.last()
    }

    /// Returns the position of `page` within this chapter.
    pub fn position(&self, page: &PageRef) -> Option<usize> {
        self.pages.iter().position(|p| p == page)
    }
}
