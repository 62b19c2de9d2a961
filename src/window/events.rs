//! Notifications published by the window presenter.

use super::Direction;
use crate::models::{PageRef, ViewportRange};

/// A change to the window, sent after the state mutation has committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowEvent {
    /// The window was (re)loaded from scratch.
    Loaded { pages: Vec<PageRef> },
    /// A prefetch landed at one edge, possibly evicting from the other.
    Extended {
        direction: Direction,
        added: Vec<PageRef>,
        evicted: Vec<PageRef>,
    },
    ViewportChanged(ViewportRange),
    /// A prefetch failed; the window is unchanged.
    PrefetchFailed {
        direction: Direction,
        origin: PageRef,
        message: String,
    },
    /// The window was torn down.
    Cleared,
}
