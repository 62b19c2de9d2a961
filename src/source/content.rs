//! Chapter cache and sequential page navigation shared by every provider.

use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

use super::{ChapterResolver, PageData};
use crate::config::{DEFAULT_RANGE_SPAN, RANGE_EXPANSION_LIMIT};
use crate::error::{ErrorKind, SourceError, SourceResult};
use crate::models::{ChapterData, ChapterKey, ChapterRef, PageRange, PageRef};

/// Resolves chapters through a [`ChapterResolver`], caches them for the
/// lifetime of the source, and walks the page sequence across chapter
/// boundaries.
pub struct ContentSource {
    resolver: Arc<dyn ChapterResolver>,
    /// Resolved chapters indexed by `seriesId-chapterNumber`.
    chapters: DashMap<ChapterKey, Arc<ChapterData>>,
    range_limit: usize,
}

impl ContentSource {
    pub fn new(resolver: Arc<dyn ChapterResolver>) -> Self {
        Self {
            resolver,
            chapters: DashMap::new(),
            range_limit: RANGE_EXPANSION_LIMIT,
        }
    }

    /// Overrides the maximum number of pages a range may expand to.
    pub fn with_range_limit(mut self, range_limit: usize) -> Self {
        self.range_limit = range_limit;
        self
    }

    pub fn resolver(&self) -> Arc<dyn ChapterResolver> {
        self.resolver.clone()
    }

    /// Number of chapters currently cached.
    pub fn cached_chapters(&self) -> usize {
        self.chapters.len()
    }

    /// Returns a chapter, resolving and caching it on first use.
    ///
    /// `Ok(None)` means the chapter does not exist.
    pub async fn get_chapter(&self, chapter: &ChapterRef) -> SourceResult<Option<Arc<ChapterData>>> {
        let key = chapter.key();
        if let Some(cached) = self.chapters.get(&key) {
            debug!("Chapter cache hit for {}", chapter);
            return Ok(Some(cached.value().clone()));
        }

        debug!("Chapter cache miss for {}, resolving", chapter);
        let Some(data) = self.resolver.resolve_chapter(chapter).await? else {
            debug!("Chapter {} does not exist", chapter);
            return Ok(None);
        };

        if &data.chapter_ref != chapter {
            return Err(SourceError::with_message(
                ErrorKind::InvalidReference,
                format!(
                    "Requested chapter {} but provider returned {}",
                    chapter, data.chapter_ref
                ),
            ));
        }
        if let Some(stray) = data.pages.iter().find(|p| &p.chapter_ref() != chapter) {
            return Err(SourceError::with_message(
                ErrorKind::InvalidReference,
                format!("Chapter {} lists foreign page {}", chapter, stray),
            ));
        }

        // A concurrent resolution of the same chapter may have won the race.
        let entry = self.chapters.entry(key).or_insert_with(|| Arc::new(data));
        Ok(Some(entry.value().clone()))
    }

    /// Wraps each reference in a [`PageData`], in input order.
    ///
    /// Every reference must name a page of an existing chapter.
    pub async fn get_pages(&self, refs: &[PageRef]) -> SourceResult<Vec<PageData>> {
        let mut pages = Vec::with_capacity(refs.len());
        for page_ref in refs {
            let chapter = self.existing_chapter(page_ref).await?;
            if chapter.position(page_ref).is_none() {
                return Err(missing_page(page_ref));
            }
            pages.push(PageData::new(page_ref.clone(), self.resolver.clone()));
        }
        Ok(pages)
    }

    /// Returns the page after `page`, continuing into the next non-empty
    /// chapter; `None` once content runs out.
    pub async fn get_next_page_ref(&self, page: &PageRef) -> SourceResult<Option<PageRef>> {
        let chapter = self.existing_chapter(page).await?;
        let position = chapter.position(page).ok_or_else(|| missing_page(page))?;
        if let Some(next) = chapter.pages.get(position + 1) {
            return Ok(Some(next.clone()));
        }

        self.first_page_from(page.chapter_ref().next()).await
    }

    /// Returns the first existing page at or after `start`.
    ///
    /// A start inside an empty chapter moves to the first page of the next
    /// non-empty one; `None` means nothing exists from there on. A start past
    /// the end of a non-empty chapter is a malformed reference.
    pub async fn first_page_at_or_after(&self, start: &PageRef) -> SourceResult<Option<PageRef>> {
        let Some(chapter) = self.get_chapter(&start.chapter_ref()).await? else {
            return Ok(None);
        };
        if chapter.position(start).is_some() {
            return Ok(Some(start.clone()));
        }
        if !chapter.is_empty() {
            return Err(missing_page(start));
        }
        self.first_page_from(start.chapter_ref().next()).await
    }

    /// Returns the page before `page`, continuing into the previous
    /// non-empty chapter; `None` before the first page of chapter 0.
    pub async fn get_previous_page_ref(&self, page: &PageRef) -> SourceResult<Option<PageRef>> {
        let chapter = self.existing_chapter(page).await?;
        let position = chapter.position(page).ok_or_else(|| missing_page(page))?;
        if position > 0 {
            return Ok(Some(chapter.pages[position - 1].clone()));
        }

        let mut candidate = page.chapter_ref().previous();
        while let Some(chapter_ref) = candidate {
            match self.get_chapter(&chapter_ref).await? {
                None => return Ok(None),
                Some(data) => match data.last_page() {
                    Some(last) => return Ok(Some(last.clone())),
                    None => candidate = chapter_ref.previous(),
                },
            }
        }
        Ok(None)
    }

    /// Collects up to `|count|` references next to `origin` (excluding it).
    ///
    /// A positive count walks forward, a negative one backward; the result
    /// is ascending either way and simply stops short when content runs out.
    pub async fn get_more_pages(&self, origin: &PageRef, count: isize) -> SourceResult<Vec<PageRef>> {
        let wanted = count.unsigned_abs();
        let forward = count > 0;
        let mut refs = Vec::with_capacity(wanted);
        let mut cursor = origin.clone();

        while refs.len() < wanted {
            let step = if forward {
                self.get_next_page_ref(&cursor).await?
            } else {
                self.get_previous_page_ref(&cursor).await?
            };
            match step {
                Some(page) => {
                    cursor = page.clone();
                    refs.push(page);
                }
                None => break,
            }
        }

        if !forward {
            refs.reverse();
        }
        Ok(refs)
    }

    /// Expands a range into concrete references, `start` inclusive and
    /// `end` exclusive.
    ///
    /// An open end covers a default span after `start`; an open start covers
    /// the same span before `end`. Fails rather than truncating when the
    /// expansion exceeds the range limit.
    pub async fn expand_page_range(&self, range: &PageRange) -> SourceResult<Vec<PageRef>> {
        let (start, end, span) = match (&range.start, &range.end) {
            (Some(start), Some(end)) => {
                if !start.same_series(end) {
                    return Err(SourceError::with_message(
                        ErrorKind::InvalidRange,
                        format!("Range {} spans two series", range),
                    ));
                }
                if end < start {
                    return Err(SourceError::with_message(
                        ErrorKind::InvalidRange,
                        format!("Range {} is inverted", range),
                    ));
                }
                (start.clone(), Some(end.clone()), None)
            }
            (Some(start), None) => (start.clone(), None, Some(DEFAULT_RANGE_SPAN)),
            (None, Some(end)) => {
                let before = self
                    .get_more_pages(end, -(DEFAULT_RANGE_SPAN as isize))
                    .await?;
                let start = before.first().cloned().unwrap_or_else(|| end.clone());
                (start, Some(end.clone()), None)
            }
            (None, None) => {
                return Err(SourceError::with_message(
                    ErrorKind::InvalidRange,
                    "Range has neither a start nor an end",
                ));
            }
        };

        let mut refs = Vec::new();
        let mut cursor = Some(start);
        loop {
            let Some(page) = cursor.take() else {
                if end.is_some() {
                    return Err(unreachable_end(range));
                }
                break;
            };
            match &end {
                Some(end) if &page == end => break,
                Some(end) if &page > end => return Err(unreachable_end(range)),
                _ => {}
            }
            if refs.len() >= self.range_limit {
                return Err(SourceError::with_message(
                    ErrorKind::RangeLimitExceeded,
                    format!(
                        "Range {} expands past the limit of {} pages",
                        range, self.range_limit
                    ),
                ));
            }
            // A filled span stops without looking past its last page.
            if !span.is_some_and(|span| refs.len() + 1 >= span) {
                cursor = self.get_next_page_ref(&page).await?;
            }
            refs.push(page);
        }

        debug!("Expanded {} into {} pages", range, refs.len());
        Ok(refs)
    }

    /// Expands a range and wraps the result as page data.
    pub async fn get_page_range(&self, range: &PageRange) -> SourceResult<Vec<PageData>> {
        let refs = self.expand_page_range(range).await?;
        self.get_pages(&refs).await
    }

    /// Looks up the chapter a page claims to belong to; a page of a missing
    /// chapter is a malformed reference.
    async fn existing_chapter(&self, page: &PageRef) -> SourceResult<Arc<ChapterData>> {
        let chapter_ref = page.chapter_ref();
        self.get_chapter(&chapter_ref).await?.ok_or_else(|| {
            SourceError::with_message(
                ErrorKind::InvalidReference,
                format!("Page {} points into missing chapter {}", page, chapter_ref),
            )
        })
    }

    /// First page of the first non-empty chapter from `chapter` onwards.
    async fn first_page_from(&self, chapter: ChapterRef) -> SourceResult<Option<PageRef>> {
        let mut candidate = chapter;
        loop {
            match self.get_chapter(&candidate).await? {
                None => return Ok(None),
                Some(data) => match data.first_page() {
                    Some(first) => return Ok(Some(first.clone())),
                    None => candidate = candidate.next(),
                },
            }
        }
    }
}

fn unreachable_end(range: &PageRange) -> SourceError {
    SourceError::with_message(
        ErrorKind::InvalidRange,
        format!("Range {} never reaches its end", range),
    )
}

fn missing_page(page: &PageRef) -> SourceError {
    SourceError::with_message(
        ErrorKind::InvalidReference,
        format!("Page {} does not exist in chapter {}", page, page.chapter_ref()),
    )
}
