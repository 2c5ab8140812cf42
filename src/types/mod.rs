//! Core types used throughout the library.
//!
//! - [`simplified`] - Simplified design document and style descriptors
//! - [`style_registry`] - Shared style registry (`globalVars`)
//! - [`audit`] - Findings, rule definitions and reports

pub mod audit;
pub mod simplified;
pub mod style_registry;

pub use audit::{
    AuditFinding, AuditReport, AuditSummary, RuleCategory, RuleDefinition, RuleError, RuleId,
    RuleState,
};
pub use simplified::{
    ComponentProperty, LayoutDimensions, LayoutMode, LayoutPoint, LayoutSizing, LineHeight,
    PaintFill, SimplifiedComponentDefinition, SimplifiedComponentSetDefinition, SimplifiedDesign,
    SimplifiedEffects, SimplifiedFill, SimplifiedLayout, SimplifiedNode, SimplifiedStrokes,
    SizingMode, TextStyle,
};
pub use style_registry::{
    GlobalVars, ImageReference, StyleConcern, StyleEntry, StyleOrigin, StyleTable, StyleValue,
};
