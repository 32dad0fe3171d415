//! Heading classification of paragraph style names.
//!
//! A [`StyleTable`] (exact names plus ordered regex rules) is injected into
//! the [`HeadingClassifier`], so locales and rules can be swapped in tests.

mod classifier;
mod config;
mod registry;
mod types;

pub use classifier::HeadingClassifier;
pub use config::create_default_style_table;
pub use registry::StyleTable;
pub use types::StyleRule;
