//! Document splitting.
//!
//! Split points are resolved into contiguous ranges, then each range is
//! materialized into a standalone [`crate::types::Section`].

mod engine;
mod materializer;
mod resolver;

pub use engine::SplitEngine;
pub use materializer::{section_file_stem, SectionMaterializer};
pub use resolver::resolve_split_points;
