//! Reference types and content models.

mod chapter;
mod image;
mod page;
mod series;

pub use chapter::*;
pub use image::*;
pub use page::*;
pub use series::*;
