//! Raw design tree to simplified design.
//!
//! - [`traversal`] walks the raw tree and applies extractors
//! - [`extractors`] built-in extractors and presets
//! - [`design`] envelope parsing and orchestration

pub mod component;
pub mod design;
pub mod extractors;
pub mod layout;
pub mod text;
pub mod traversal;
pub mod visuals;

pub use design::simplify;
pub use extractors::{
    preset, ALL_EXTRACTORS, CONTENT_ONLY, LAYOUT_AND_TEXT, LAYOUT_ONLY, VISUALS_ONLY,
};
pub use traversal::{traverse, Extractor, TraversalContext, TraversalOptions, TraversalResult};
