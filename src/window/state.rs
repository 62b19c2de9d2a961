//! Window contents and the synchronous steps that mutate them.
//!
//! Everything here runs under the presenter's lock, so each method is one
//! atomic step relative to concurrent fetch completions.

use std::collections::{HashSet, VecDeque};
use std::fmt;

use crate::models::{PageKey, PageRef, ViewportRange};
use crate::source::PageData;

/// Edge of the window a prefetch extends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Before,
    After,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Before => "before",
            Direction::After => "after",
        }
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Before => Direction::After,
            Direction::After => Direction::Before,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies an outstanding prefetch: its origin page and direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    pub origin: PageKey,
    pub direction: Direction,
}

impl RequestKey {
    pub fn new(origin: &PageRef, direction: Direction) -> Self {
        Self {
            origin: origin.key(),
            direction,
        }
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.origin, self.direction)
    }
}

/// What a merge did to the window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Merge {
    /// Pages inserted, ascending.
    pub added: Vec<PageRef>,
    /// Pages evicted from the opposite edge, ascending.
    pub evicted: Vec<PageRef>,
    /// Fetched pages dropped as duplicates, out of order, or over capacity.
    pub discarded: usize,
}

/// The materialized window: ordered pages plus the dedup and in-flight
/// key sets and the last reported viewport.
#[derive(Debug, Default)]
pub struct WindowState {
    pages: VecDeque<PageData>,
    page_keys: HashSet<PageKey>,
    in_flight: HashSet<RequestKey>,
    viewport: Option<ViewportRange>,
}

impl WindowState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn first(&self) -> Option<&PageData> {
        self.pages.front()
    }

    pub fn last(&self) -> Option<&PageData> {
        self.pages.back()
    }

    pub fn get(&self, index: usize) -> Option<&PageData> {
        self.pages.get(index)
    }

    pub fn pages(&self) -> impl Iterator<Item = &PageData> {
        self.pages.iter()
    }

    pub fn page_refs(&self) -> Vec<PageRef> {
        self.pages.iter().map(|p| p.page_ref.clone()).collect()
    }

    pub fn contains(&self, key: &PageKey) -> bool {
        self.page_keys.contains(key)
    }

    pub fn position(&self, page: &PageRef) -> Option<usize> {
        self.pages.iter().position(|p| &p.page_ref == page)
    }

    pub fn viewport(&self) -> Option<&ViewportRange> {
        self.viewport.as_ref()
    }

    /// Records the viewport; returns whether it differs from the last one.
    pub fn set_viewport(&mut self, viewport: ViewportRange) -> bool {
        let changed = self.viewport.as_ref() != Some(&viewport);
        self.viewport = Some(viewport);
        changed
    }

    /// True when `page` is one of the first `distance` pages of the window.
    pub fn is_near_start(&self, page: &PageRef, distance: usize) -> bool {
        self.position(page).is_some_and(|i| i < distance)
    }

    /// True when `page` is one of the last `distance` pages of the window.
    pub fn is_near_end(&self, page: &PageRef, distance: usize) -> bool {
        self.position(page)
            .is_some_and(|i| i + distance >= self.pages.len())
    }

    /// Marks a request as in flight; false if it already was.
    pub fn try_begin(&mut self, key: RequestKey) -> bool {
        self.in_flight.insert(key)
    }

    pub fn finish(&mut self, key: &RequestKey) {
        self.in_flight.remove(key);
    }

    pub fn is_in_flight(&self, key: &RequestKey) -> bool {
        self.in_flight.contains(key)
    }

    pub fn in_flight_len(&self) -> usize {
        self.in_flight.len()
    }

    /// Replaces the whole window, dropping duplicates and anything past
    /// `max_pages`. The viewport is forgotten; in-flight markers stay until
    /// their requests finish.
    pub fn replace(&mut self, pages: Vec<PageData>, max_pages: usize) -> Vec<PageRef> {
        self.pages.clear();
        self.page_keys.clear();
        self.viewport = None;

        for page in pages {
            if self.pages.len() >= max_pages {
                break;
            }
            let in_order = self
                .pages
                .back()
                .map_or(true, |last| last.page_ref < page.page_ref);
            if in_order && self.page_keys.insert(page.key()) {
                self.pages.push_back(page);
            }
        }
        self.page_refs()
    }

    /// Empties the window.
    pub fn clear(&mut self) {
        self.pages.clear();
        self.page_keys.clear();
        self.viewport = None;
    }

    /// Merges a fetched batch into the edge named by `direction`.
    ///
    /// The batch was fetched next to `origin`; if that page has since left
    /// the window (evicted, or the window was reloaded) the whole batch is
    /// stale and dropped, as attaching it would leave a gap. Otherwise pages
    /// already present, repeated within the batch, or not strictly beyond the
    /// current edge are dropped. When the result would exceed
    /// `max_pages`, pages are evicted from the opposite edge, but never
    /// pages inside the viewport; surplus that cannot be evicted is cut from
    /// the outer end of the incoming batch instead.
    pub fn merge(
        &mut self,
        direction: Direction,
        origin: &PageRef,
        fetched: Vec<PageData>,
        max_pages: usize,
    ) -> Merge {
        let mut merge = Merge::default();
        if self.position(origin).is_none() {
            merge.discarded = fetched.len();
            return merge;
        }

        let mut batch_keys = HashSet::new();
        let mut incoming = Vec::with_capacity(fetched.len());

        for page in fetched {
            let key = page.key();
            let beyond_edge = match direction {
                Direction::Before => self
                    .pages
                    .front()
                    .map_or(true, |first| page.page_ref < first.page_ref),
                Direction::After => self
                    .pages
                    .back()
                    .map_or(true, |last| page.page_ref > last.page_ref),
            };
            if !beyond_edge || self.page_keys.contains(&key) || !batch_keys.insert(key) {
                merge.discarded += 1;
                continue;
            }
            incoming.push(page);
        }
        incoming.sort_by(|a, b| a.page_ref.cmp(&b.page_ref));

        let overflow = (self.pages.len() + incoming.len()).saturating_sub(max_pages);
        let evict_count = overflow.min(self.evictable(direction.opposite()));
        for _ in 0..evict_count {
            let removed = match direction {
                Direction::Before => self.pages.pop_back(),
                Direction::After => self.pages.pop_front(),
            };
            if let Some(page) = removed {
                self.page_keys.remove(&page.key());
                merge.evicted.push(page.page_ref);
            }
        }
        merge.evicted.sort();

        let surplus = (overflow - evict_count).min(incoming.len());
        if surplus > 0 {
            match direction {
                Direction::Before => {
                    incoming.drain(..surplus);
                }
                Direction::After => incoming.truncate(incoming.len() - surplus),
            }
            merge.discarded += surplus;
        }

        for page in &incoming {
            self.page_keys.insert(page.key());
            merge.added.push(page.page_ref.clone());
        }
        match direction {
            Direction::Before => {
                for page in incoming.into_iter().rev() {
                    self.pages.push_front(page);
                }
            }
            Direction::After => self.pages.extend(incoming),
        }

        merge
    }

    /// Number of pages at `edge` that lie outside the viewport and may be
    /// evicted.
    fn evictable(&self, edge: Direction) -> usize {
        let Some(viewport) = &self.viewport else {
            return self.pages.len();
        };
        let outside = |p: &&PageData| !viewport.contains(&p.page_ref);
        match edge {
            Direction::Before => self.pages.iter().take_while(outside).count(),
            Direction::After => self.pages.iter().rev().take_while(outside).count(),
        }
    }
}
