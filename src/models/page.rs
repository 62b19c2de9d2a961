//! Page references, page keys and page ranges.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ChapterRef;

/// Identifies one page uniquely within a series.
///
/// Field order matters: the derived ordering compares `(series_id,
/// chapter_number, page_number)` lexicographically, which is sequence order
/// for pages of the same series.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PageRef {
    pub series_id: String,
    /// Zero-based chapter index.
    pub chapter_number: u32,
    /// Zero-based page index within the chapter.
    pub page_number: u32,
}

impl PageRef {
    pub fn new(series_id: impl Into<String>, chapter_number: u32, page_number: u32) -> Self {
        Self {
            series_id: series_id.into(),
            chapter_number,
            page_number,
        }
    }

    /// The first page of a series.
    pub fn series_start(series_id: impl Into<String>) -> Self {
        Self::new(series_id, 0, 0)
    }

    /// Returns the chapter this page belongs to.
    pub fn chapter_ref(&self) -> ChapterRef {
        ChapterRef::new(self.series_id.clone(), self.chapter_number)
    }

    /// Returns the dedup key `seriesId-chapterNumber-pageNumber`.
    pub fn key(&self) -> PageKey {
        PageKey(format!(
            "{}-{}-{}",
            self.series_id, self.chapter_number, self.page_number
        ))
    }

    /// True for page 0 of chapter 0, before which nothing exists.
    pub fn is_series_start(&self) -> bool {
        self.chapter_number == 0 && self.page_number == 0
    }

    pub fn same_series(&self, other: &PageRef) -> bool {
        self.series_id == other.series_id
    }
}

/// Short `chapter:page` form used in logs.
impl fmt::Display for PageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chapter_number, self.page_number)
    }
}

/// String key of a page, used for window dedup sets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageKey(String);

impl PageKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Range of pages, inclusive lower bound and exclusive upper bound.
///
/// A missing bound means "a default span past (or before) the other bound".
/// Both `[A, A]` and a range with no pages between its bounds expand to
/// nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PageRange {
    pub start: Option<PageRef>,
    pub end: Option<PageRef>,
}

impl PageRange {
    pub fn new(start: Option<PageRef>, end: Option<PageRef>) -> Self {
        Self { start, end }
    }

    /// `[start, end)`.
    pub fn between(start: PageRef, end: PageRef) -> Self {
        Self::new(Some(start), Some(end))
    }

    /// Default span forward from `start`.
    pub fn from(start: PageRef) -> Self {
        Self::new(Some(start), None)
    }

    /// Default span ending just before `end`.
    pub fn until(end: PageRef) -> Self {
        Self::new(None, Some(end))
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bound = |p: &Option<PageRef>| match p {
            Some(p) => p.to_string(),
            None => "_".to_string(),
        };
        write!(f, "[{}, {})", bound(&self.start), bound(&self.end))
    }
}

/// Pages visible to the reader, both ends inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViewportRange {
    pub top: PageRef,
    pub bottom: PageRef,
}

impl ViewportRange {
    /// Creates a viewport; bounds given in the wrong order are swapped.
    pub fn new(top: PageRef, bottom: PageRef) -> Self {
        if bottom < top {
            Self {
                top: bottom,
                bottom: top,
            }
        } else {
            Self { top, bottom }
        }
    }

    /// A viewport covering a single page.
    pub fn single(page: PageRef) -> Self {
        Self {
            top: page.clone(),
            bottom: page,
        }
    }

    pub fn contains(&self, page: &PageRef) -> bool {
        page.same_series(&self.top) && &self.top <= page && page <= &self.bottom
    }
}

impl fmt::Display for ViewportRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}..={}]", self.top, self.bottom)
    }
}
