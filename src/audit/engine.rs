use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{FigmaAuditError, Result};
use crate::llm::LlmClient;
use crate::types::{AuditFinding, AuditReport, RuleError, RuleId};

use super::{ai, rules, AiRule, AuditContext, Rule, RuleRegistry};

/// Runs rules against a design. Cheap to build per request; the registry is
/// shared.
pub struct Auditor {
    registry: Arc<RuleRegistry>,
    rules: Vec<Box<dyn Rule>>,
    ai_rules: Vec<Box<dyn AiRule>>,
    llm: Option<Arc<dyn LlmClient>>,
    max_attempts: u32,
}

impl Auditor {
    /// Auditor with every built-in rule and no LLM collaborator.
    pub fn new(registry: Arc<RuleRegistry>) -> Self {
        Self {
            registry,
            rules: rules::standard_rules(),
            ai_rules: ai::ai_rules(),
            llm: None,
            max_attempts: ai::DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Auditor with an explicit rule set.
    pub fn with_rules(
        registry: Arc<RuleRegistry>,
        rules: Vec<Box<dyn Rule>>,
        ai_rules: Vec<Box<dyn AiRule>>,
    ) -> Self {
        Self {
            registry,
            rules,
            ai_rules,
            llm: None,
            max_attempts: ai::DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_llm(mut self, llm: Arc<dyn LlmClient>, max_attempts: u32) -> Self {
        self.llm = Some(llm);
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run one rule regardless of its state.
    pub async fn run_rule(&self, id: RuleId, ctx: &AuditContext<'_>) -> Result<Vec<AuditFinding>> {
        if let Some(rule) = self.rules.iter().find(|r| r.id() == id) {
            return rule.check(ctx);
        }
        if let Some(rule) = self.ai_rules.iter().find(|r| r.id() == id) {
            let llm = self.llm.as_deref();
            return Ok(rule.check(ctx, llm, self.max_attempts).await);
        }
        Err(FigmaAuditError::rule(id, "no implementation registered"))
    }

    /// Run every enabled rule and aggregate the findings.
    ///
    /// A failing rule is moved to error state and reported in the summary;
    /// the audit itself always completes.
    pub async fn run_audit(&self, ctx: &AuditContext<'_>) -> AuditReport {
        let enabled = self.registry.enabled_definitions();
        info!(rules = enabled.len(), nodes = ctx.all_nodes().len(), "starting audit");

        let mut results = Vec::new();
        let mut rule_errors = Vec::new();
        for definition in enabled {
            debug!(rule_id = definition.id, name = %definition.name, "running rule");
            match self.run_rule(definition.id, ctx).await {
                Ok(findings) => {
                    debug!(rule_id = definition.id, findings = findings.len(), "rule finished");
                    results.extend(findings);
                }
                Err(e) => {
                    let message = match e {
                        FigmaAuditError::Rule { message, .. } => message,
                        other => other.to_string(),
                    };
                    warn!(rule_id = definition.id, error = %message, "rule failed");
                    self.registry.mark_error(definition.id, message.clone());
                    rule_errors.push(RuleError {
                        rule_id: definition.id,
                        message,
                    });
                }
            }
        }

        let report = AuditReport::from_findings(results, rule_errors);
        info!(total_issues = report.summary.total_issues, "audit finished");
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RuleCategory, RuleDefinition, SimplifiedDesign, SimplifiedNode};

    struct Failing;

    impl Rule for Failing {
        fn id(&self) -> RuleId {
            1
        }

        fn check(&self, _ctx: &AuditContext<'_>) -> Result<Vec<AuditFinding>> {
            Err(FigmaAuditError::rule(1, "style table missing"))
        }
    }

    struct EveryRoot;

    impl Rule for EveryRoot {
        fn id(&self) -> RuleId {
            2
        }

        fn check(&self, ctx: &AuditContext<'_>) -> Result<Vec<AuditFinding>> {
            Ok(ctx
                .roots()
                .iter()
                .map(|n| AuditFinding::new(2, n, "root"))
                .collect())
        }
    }

    fn registry() -> Arc<RuleRegistry> {
        Arc::new(RuleRegistry::with_definitions([
            RuleDefinition::new(1, "Failing", "", RuleCategory::Standard),
            RuleDefinition::new(2, "Every root", "", RuleCategory::Standard),
        ]))
    }

    fn design() -> SimplifiedDesign {
        SimplifiedDesign {
            nodes: vec![SimplifiedNode::new("1:1", "Page", "CANVAS")],
            ..SimplifiedDesign::default()
        }
    }

    #[tokio::test]
    async fn failing_rule_is_marked_and_skipped_next_time() {
        let registry = registry();
        let auditor = Auditor::with_rules(registry.clone(), vec![Box::new(Failing), Box::new(EveryRoot)], vec![]);
        let design = design();
        let ctx = AuditContext::new(&design);

        let first = auditor.run_audit(&ctx).await;
        assert_eq!(first.summary.total_issues, 1);
        assert_eq!(first.summary.rule_errors.len(), 1);
        assert_eq!(first.summary.rule_errors[0].message, "style table missing");
        assert_eq!(registry.get(1).map(|d| d.state), Some(crate::types::RuleState::Error));

        let second = auditor.run_audit(&ctx).await;
        assert!(second.summary.rule_errors.is_empty());
        assert_eq!(second.summary.total_issues, 1);
    }

    #[tokio::test]
    async fn unknown_rule_is_an_error() {
        let auditor = Auditor::with_rules(registry(), vec![], vec![]);
        let design = design();
        assert!(auditor.run_rule(42, &AuditContext::new(&design)).await.is_err());
    }
}
