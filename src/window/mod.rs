//! The materialized page window and its presenter.

mod events;
mod presenter;
mod scroll;
mod state;

pub use events::*;
pub use presenter::*;
pub use scroll::*;
pub use state::*;
