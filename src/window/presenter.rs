//! The window presenter: reacts to viewport changes by prefetching at
//! either edge and evicting from the other.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::{Direction, RequestKey, ScrollEvent, WindowEvent, WindowState};
use crate::config::WindowConfig;
use crate::error::{SourceError, SourceResult};
use crate::models::{PageRange, PageRef, ViewportRange};
use crate::source::{ContentSource, PageData};

/// Buffered notifications per subscriber before the oldest are dropped.
const EVENT_CAPACITY: usize = 256;

/// What happened to one edge during a viewport change.
#[derive(Debug)]
pub enum PrefetchOutcome {
    /// The viewport is not within the buffer distance of this edge.
    NotNeeded,
    /// The window already starts at the first page of the series.
    AtSeriesStart,
    /// An identical request is still outstanding.
    AlreadyInFlight,
    /// The source had no more pages in this direction.
    Exhausted,
    /// Pages were fetched and merged.
    Loaded { added: usize, evicted: usize },
    /// The fetch failed and the window was left unchanged.
    Failed(SourceError),
}

impl PrefetchOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, PrefetchOutcome::Loaded { .. })
    }

    /// True when this edge issued a request to the source.
    pub fn fetched(&self) -> bool {
        matches!(
            self,
            PrefetchOutcome::Loaded { .. } | PrefetchOutcome::Exhausted | PrefetchOutcome::Failed(_)
        )
    }
}

/// Outcome of both edges for one viewport change.
#[derive(Debug)]
pub struct PrefetchReport {
    pub before: PrefetchOutcome,
    pub after: PrefetchOutcome,
}

impl PrefetchReport {
    pub fn get(&self, direction: Direction) -> &PrefetchOutcome {
        match direction {
            Direction::Before => &self.before,
            Direction::After => &self.after,
        }
    }
}

/// Clears an in-flight marker when dropped, whether the fetch succeeded,
/// failed, or was cancelled.
struct InFlightGuard<'a> {
    state: &'a Mutex<WindowState>,
    key: RequestKey,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.state.lock().finish(&self.key);
    }
}

enum Plan<'a> {
    Skip(PrefetchOutcome),
    Fetch {
        origin: PageRef,
        direction: Direction,
        guard: InFlightGuard<'a>,
    },
}

/// Owns the materialized window of pages for one series.
///
/// All mutation happens in short synchronous steps under one lock, so the
/// filter, insert and evict sequence of a completing fetch never interleaves
/// with another completion. Fetches themselves run without the lock, and the
/// two edges fetch concurrently.
pub struct WindowPresenter {
    source: Arc<ContentSource>,
    config: WindowConfig,
    session: Uuid,
    state: Mutex<WindowState>,
    events: broadcast::Sender<WindowEvent>,
}

impl WindowPresenter {
    /// Creates a presenter with an empty window.
    pub fn new(source: Arc<ContentSource>, config: WindowConfig) -> SourceResult<Self> {
        config.validate()?;
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            source,
            config,
            session: Uuid::new_v4(),
            state: Mutex::new(WindowState::new()),
            events,
        })
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    pub fn source(&self) -> &Arc<ContentSource> {
        &self.source
    }

    /// Identifier of this window, used to tell presenters apart in logs.
    pub fn session(&self) -> Uuid {
        self.session
    }

    /// Subscribes to window notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<WindowEvent> {
        self.events.subscribe()
    }

    /// Snapshot of the window, in sequence order.
    pub fn pages(&self) -> Vec<PageData> {
        self.state.lock().pages().cloned().collect()
    }

    pub fn page_refs(&self) -> Vec<PageRef> {
        self.state.lock().page_refs()
    }

    pub fn viewport(&self) -> Option<ViewportRange> {
        self.state.lock().viewport().cloned()
    }

    pub fn len(&self) -> usize {
        self.state.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().is_empty()
    }

    /// Number of prefetches currently outstanding.
    pub fn in_flight(&self) -> usize {
        self.state.lock().in_flight_len()
    }

    /// Initial load: the opening pages of chapter 0 of `series_id`.
    pub async fn load_pages(&self, series_id: &str) -> SourceResult<usize> {
        self.load_from(PageRef::series_start(series_id)).await
    }

    /// Replaces the window with the default span of pages starting at
    /// `start`, or at the next existing page when `start` lies in an empty
    /// chapter. A series with nothing from `start` onwards leaves the window
    /// empty.
    pub async fn load_from(&self, start: PageRef) -> SourceResult<usize> {
        let pages = match self.source.first_page_at_or_after(&start).await? {
            Some(first) => self.source.get_page_range(&PageRange::from(first)).await?,
            None => {
                debug!(session = %self.session, "Nothing to load from {}", start);
                Vec::new()
            }
        };
        let loaded = self.state.lock().replace(pages, self.config.max_pages);

        info!(
            session = %self.session,
            "Loaded {} pages starting at {}",
            loaded.len(),
            start
        );
        let count = loaded.len();
        self.notify(WindowEvent::Loaded { pages: loaded });
        Ok(count)
    }

    /// Drops every page and the viewport.
    pub fn clear(&self) {
        self.state.lock().clear();
        debug!(session = %self.session, "Window cleared");
        self.notify(WindowEvent::Cleared);
    }

    /// Records a new viewport and prefetches at whichever edges it is close
    /// to. Both edges run concurrently; each is guarded by its own in-flight
    /// key so repeated events collapse into one request per edge.
    pub async fn on_viewport_range_change(&self, viewport: ViewportRange) -> PrefetchReport {
        let (changed, before, after) = {
            let mut state = self.state.lock();
            let changed = state.set_viewport(viewport.clone());
            let before = self.plan(&mut state, &viewport, Direction::Before);
            let after = self.plan(&mut state, &viewport, Direction::After);
            (changed, before, after)
        };
        if changed {
            debug!(session = %self.session, "Viewport is now {}", viewport);
            self.notify(WindowEvent::ViewportChanged(viewport));
        }

        let (before, after) = futures::join!(self.prefetch(before), self.prefetch(after));
        PrefetchReport { before, after }
    }

    /// Derives the viewport from list geometry and, if it moved, handles
    /// the change. Returns `None` when nothing changed.
    pub async fn on_scroll(&self, event: &ScrollEvent) -> Option<PrefetchReport> {
        let viewport = {
            let state = self.state.lock();
            let (top, bottom) = event.visible_indices(state.len())?;
            let viewport = ViewportRange::new(
                state.get(top)?.page_ref.clone(),
                state.get(bottom)?.page_ref.clone(),
            );
            if state.viewport() == Some(&viewport) {
                return None;
            }
            viewport
        };
        Some(self.on_viewport_range_change(viewport).await)
    }

    /// Decides whether `direction` needs a prefetch and, if so, claims its
    /// in-flight key.
    fn plan<'a>(
        &'a self,
        state: &mut WindowState,
        viewport: &ViewportRange,
        direction: Direction,
    ) -> Plan<'a> {
        let distance = self.config.buffer_distance;
        let (edge, near) = match direction {
            Direction::Before => (state.first(), state.is_near_start(&viewport.top, distance)),
            Direction::After => (state.last(), state.is_near_end(&viewport.bottom, distance)),
        };
        let origin = match edge {
            Some(page) if near => page.page_ref.clone(),
            _ => return Plan::Skip(PrefetchOutcome::NotNeeded),
        };

        if direction == Direction::Before && origin.is_series_start() {
            return Plan::Skip(PrefetchOutcome::AtSeriesStart);
        }

        let key = RequestKey::new(&origin, direction);
        if !state.try_begin(key.clone()) {
            debug!(session = %self.session, "Already requesting {}, ignoring", key);
            return Plan::Skip(PrefetchOutcome::AlreadyInFlight);
        }

        Plan::Fetch {
            origin,
            direction,
            guard: InFlightGuard {
                state: &self.state,
                key,
            },
        }
    }

    async fn prefetch(&self, plan: Plan<'_>) -> PrefetchOutcome {
        let (origin, direction, guard) = match plan {
            Plan::Skip(outcome) => return outcome,
            Plan::Fetch {
                origin,
                direction,
                guard,
            } => (origin, direction, guard),
        };

        info!(session = %self.session, "Requesting '{}' from {}", direction, origin);
        let outcome = match self.fetch(&origin, direction).await {
            Err(err) => {
                if err.is_invariant_violation() {
                    error!(
                        session = %self.session,
                        "Prefetch '{}' from {} hit inconsistent content: {}",
                        direction,
                        origin,
                        err
                    );
                } else {
                    warn!(
                        session = %self.session,
                        "Prefetch '{}' from {} failed: {}",
                        direction,
                        origin,
                        err
                    );
                }
                self.notify(WindowEvent::PrefetchFailed {
                    direction,
                    origin,
                    message: err.to_string(),
                });
                PrefetchOutcome::Failed(err)
            }
            Ok(pages) if pages.is_empty() => {
                debug!(session = %self.session, "No pages {} {}", direction, origin);
                PrefetchOutcome::Exhausted
            }
            Ok(pages) => {
                let merge =
                    self.state
                        .lock()
                        .merge(direction, &origin, pages, self.config.max_pages);
                info!(
                    session = %self.session,
                    "Added {} pages {} {}, evicted {}",
                    merge.added.len(),
                    direction,
                    origin,
                    merge.evicted.len()
                );
                let outcome = PrefetchOutcome::Loaded {
                    added: merge.added.len(),
                    evicted: merge.evicted.len(),
                };
                self.notify(WindowEvent::Extended {
                    direction,
                    added: merge.added,
                    evicted: merge.evicted,
                });
                outcome
            }
        };
        drop(guard);
        outcome
    }

    async fn fetch(&self, origin: &PageRef, direction: Direction) -> SourceResult<Vec<PageData>> {
        let amount = self.config.buffer_amount as isize;
        let count = match direction {
            Direction::Before => -amount,
            Direction::After => amount,
        };
        let refs = self.source.get_more_pages(origin, count).await?;
        self.source.get_pages(&refs).await
    }

    fn notify(&self, event: WindowEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}
