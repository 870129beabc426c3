//! Outline tree model
//!
//! The tree assembled from a streamed outline: one document title, an ordered
//! list of chapters (`## `) and, inside each chapter, an ordered list of
//! sections (`### `) carrying a single line of body text.

mod builder;
mod document;
mod ids;

pub use builder::{OutlineBuilder, TitlePolicy};
pub use document::{Chapter, Document, Section};
pub use ids::{IdSource, SequentialIds, UuidIds};
