//! Content sources: providers, chapter cache and sequence traversal.

mod content;
pub mod mri;
mod remote;
mod resolver;
mod synthetic;

pub use content::*;
pub use remote::*;
pub use resolver::*;
pub use synthetic::*;
