//! Rule-based audit of a simplified design.
//!
//! This module provides:
//! - [`Rule`] / [`AiRule`] - the two kinds of rule units
//! - [`RuleRegistry`] - definitions plus enable/disable/error state
//! - [`Auditor`] - runs enabled rules and builds the [`AuditReport`](crate::types::AuditReport)
//! - [`rules`] - heuristic rules
//! - [`ai`] - LLM-assisted analyzers

pub mod ai;
mod engine;
mod registry;
pub mod rules;

pub use engine::Auditor;
pub use registry::RuleRegistry;

use async_trait::async_trait;

use crate::error::Result;
use crate::llm::LlmClient;
use crate::types::{AuditFinding, GlobalVars, RuleDefinition, RuleId, SimplifiedDesign, SimplifiedNode};

/// Everything a rule may read. Rules never mutate the design.
#[derive(Debug, Clone, Copy)]
pub struct AuditContext<'a> {
    pub design: &'a SimplifiedDesign,
}

impl<'a> AuditContext<'a> {
    pub fn new(design: &'a SimplifiedDesign) -> Self {
        Self { design }
    }

    pub fn roots(&self) -> &'a [SimplifiedNode] {
        &self.design.nodes
    }

    pub fn global_vars(&self) -> &'a GlobalVars {
        &self.design.global_vars
    }

    pub fn all_nodes(&self) -> Vec<&'a SimplifiedNode> {
        self.design.all_nodes()
    }
}

/// A deterministic rule: a pure function of the design.
pub trait Rule: Send + Sync {
    fn id(&self) -> RuleId;
    fn check(&self, ctx: &AuditContext<'_>) -> Result<Vec<AuditFinding>>;
}

/// An LLM-assisted rule. Failures of any kind degrade to no findings.
#[async_trait]
pub trait AiRule: Send + Sync {
    fn id(&self) -> RuleId;
    /// `max_attempts` bounds the retries of each LLM call.
    async fn check(
        &self,
        ctx: &AuditContext<'_>,
        llm: Option<&dyn LlmClient>,
        max_attempts: u32,
    ) -> Vec<AuditFinding>;
}

/// Definitions of every built-in rule, all enabled.
pub fn builtin_definitions() -> Vec<RuleDefinition> {
    rules::builtin_definitions()
}
