//! outliner - incremental outline parser for streamed LLM output
//!
//! Turns a Markdown outline that arrives in arbitrary fragments (title `# `,
//! chapters `## `, sections `### ` with a one-line body) into a live
//! Document → Chapters → Sections tree, and flattens that tree into an
//! editable list for drag-and-drop reordering.

#![deny(unsafe_code)]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::all))]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::pedantic))]
// Allow some pedantic lints that are too strict for this project
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::enum_variant_names)]

pub mod outline_config;
pub mod outline_model;
pub mod stream_parser;

// Flat list for reordering and the paper request
pub mod projection;

// Live stream plumbing
pub mod session;
pub mod sse;

// Post-stream checks and output
pub mod markdown_exporter;
pub mod outline_audit;

// Transcript replay
pub mod pipeline;

pub use outline_config::OutlinerConfig;
pub use outline_model::{Chapter, Document, Section};
pub use projection::{OutlineItem, OutlineList};
pub use session::OutlineSession;
pub use stream_parser::{parse_outline, OutlineParser};
