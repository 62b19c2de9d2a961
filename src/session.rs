//! Scripted reading sessions that drive a presenter the way a scrolling
//! reader would.

use std::sync::Arc;
use tokio::time;
use tracing::{debug, info, warn};

use crate::config::{ReadConfig, SyntheticConfig};
use crate::error::SourceResult;
use crate::models::PageRef;
use crate::source::{load_images, ChapterResolver, ContentSource, RemoteSource, SyntheticSource};
use crate::window::{PrefetchOutcome, ScrollEvent, WindowPresenter};

/// Height of a rendered page in the simulated list.
const PAGE_HEIGHT: f64 = 800.0;

/// Visible height of the simulated list.
const CLIENT_HEIGHT: f64 = 1000.0;

/// Summary of a finished session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Pages the reader scrolled onto.
    pub pages_read: usize,
    /// Prefetches that merged pages into the window.
    pub prefetches: usize,
    /// Prefetches that failed.
    pub failed_prefetches: usize,
    /// Images that could not be loaded and stay as placeholders.
    pub placeholders: usize,
    /// Largest window size observed.
    pub peak_window: usize,
    /// Last page reached.
    pub last_page: Option<PageRef>,
}

/// Builds the remote provider when a base URL is given, the synthetic one
/// otherwise.
pub fn build_resolver(
    remote: Option<&str>,
    synthetic: &SyntheticConfig,
) -> SourceResult<Arc<dyn ChapterResolver>> {
    Ok(match remote {
        Some(url) => Arc::new(RemoteSource::new(url)?),
        None => Arc::new(SyntheticSource::new(synthetic.clone())),
    })
}

/// Loads the window at the configured chapter and scrolls one page per
/// step, reporting geometry to the presenter and loading the visible images.
pub async fn simulate_reading(
    presenter: &WindowPresenter,
    config: &ReadConfig,
) -> SourceResult<SessionSummary> {
    let source: &Arc<ContentSource> = presenter.source();
    let start = PageRef::new(config.series.clone(), config.start_chapter, 0);
    presenter.load_from(start.clone()).await?;

    let mut summary = SessionSummary {
        peak_window: presenter.len(),
        ..SessionSummary::default()
    };
    let mut current = if config.reverse {
        presenter.page_refs().last().cloned().unwrap_or(start)
    } else {
        start
    };

    for step in 0..config.steps {
        let refs = presenter.page_refs();
        let Some(index) = refs.iter().position(|p| p == &current) else {
            warn!("Page {} fell out of the window, stopping", current);
            break;
        };

        let scroll_top = index as f64 * PAGE_HEIGHT + 1.0;
        let event = ScrollEvent::uniform(scroll_top, CLIENT_HEIGHT, PAGE_HEIGHT, refs.len());
        if let Some(report) = presenter.on_scroll(&event).await {
            for outcome in [&report.before, &report.after] {
                if outcome.is_loaded() {
                    summary.prefetches += 1;
                } else if matches!(outcome, PrefetchOutcome::Failed(_)) {
                    summary.failed_prefetches += 1;
                }
            }
        }

        let viewport = presenter.viewport();
        let visible: Vec<_> = presenter
            .pages()
            .into_iter()
            .filter(|p| viewport.as_ref().is_some_and(|v| v.contains(&p.page_ref)))
            .collect();
        summary.placeholders += load_images(&visible)
            .await
            .iter()
            .filter(|r| r.is_err())
            .count();

        summary.pages_read += 1;
        summary.peak_window = summary.peak_window.max(presenter.len());
        summary.last_page = Some(current.clone());
        debug!("Step {}: at {}, window holds {} pages", step, current, presenter.len());

        let next = if config.reverse {
            source.get_previous_page_ref(&current).await?
        } else {
            source.get_next_page_ref(&current).await?
        };
        match next {
            Some(page) => current = page,
            None => {
                info!("Reached the {} of the series", if config.reverse { "start" } else { "end" });
                break;
            }
        }

        if !config.step_delay.is_zero() {
            time::sleep(config.step_delay).await;
        }
    }

    Ok(summary)
}
