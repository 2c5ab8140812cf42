//! Figma Audit Library
//!
//! Turns raw Figma REST API responses into a compact, de-duplicated
//! simplified design and audits that design for consistency issues.
//!
//! # Module Overview
//!
//! - [`extract`] - Tree traversal, extractors and envelope simplification
//! - [`types`] - Simplified design, style registry and audit report types
//! - [`audit`] - Rule registry, heuristic rules and LLM-assisted analyzers
//! - [`figma`] - Figma REST client and raw API types
//! - [`images`] - Image fill download, crop and batch processing
//! - [`llm`] - LLM collaborator used by AI-assisted rules
//! - [`config`] - Configuration file support
//! - [`output`] - JSON / YAML / markdown rendering
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use figma_audit::{simplify, AuditContext, Auditor, RuleRegistry, TraversalOptions, ALL_EXTRACTORS};
//!
//! # async fn example(raw: serde_json::Value) -> figma_audit::Result<()> {
//! let design = simplify(&raw, ALL_EXTRACTORS, &TraversalOptions::default())?;
//! let auditor = Auditor::new(Arc::new(RuleRegistry::default()));
//! let report = auditor.run_audit(&AuditContext::new(&design)).await;
//! println!("{} issues", report.summary.total_issues);
//! # Ok(())
//! # }
//! ```

pub mod audit;
pub mod config;
pub mod error;
pub mod extract;
pub mod figma;
pub mod images;
pub mod llm;
pub mod output;
pub mod types;

pub use audit::{AiRule, AuditContext, Auditor, Rule, RuleRegistry};
pub use config::{Config, FigmaAuth};
pub use error::{ErrorCategory, ErrorPayload, FigmaAuditError, Result};
pub use extract::{
    preset, simplify, traverse, Extractor, TraversalContext, TraversalOptions, ALL_EXTRACTORS,
    CONTENT_ONLY, LAYOUT_AND_TEXT, LAYOUT_ONLY, VISUALS_ONLY,
};
pub use figma::{map_figma_error, FigmaClient, FigmaError, ImageFormat, RawNode};
pub use images::{
    apply_crop, download_and_process, download_figma_images, image_fill_requests,
    node_render_requests, ImageRequest, ProcessedImage,
};
pub use llm::{GeminiClient, LlmClient, LlmError};
pub use output::{render_design, render_report, write_output, OutputFormat};
pub use types::{
    AuditFinding, AuditReport, GlobalVars, RuleCategory, RuleDefinition, RuleId, RuleState,
    SimplifiedDesign, SimplifiedNode,
};
