//! Audit findings, rule definitions and the aggregated report.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as FmtWrite;

use super::simplified::SimplifiedNode;

pub type RuleId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleCategory {
    Standard,
    AiBased,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleState {
    Enabled,
    Disabled,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDefinition {
    pub id: RuleId,
    pub name: String,
    pub description: String,
    pub category: RuleCategory,
    pub state: RuleState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl RuleDefinition {
    pub fn new(id: RuleId, name: &str, description: &str, category: RuleCategory) -> Self {
        Self {
            id,
            name: name.to_string(),
            description: description.to_string(),
            category,
            state: RuleState::Enabled,
            error_message: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.state == RuleState::Enabled
    }
}

/// One issue instance tied to one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditFinding {
    pub rule_id: RuleId,
    pub node_id: String,
    pub node_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub more_infos: Option<serde_json::Value>,
}

impl AuditFinding {
    pub fn new(rule_id: RuleId, node: &SimplifiedNode, message: impl Into<String>) -> Self {
        Self::for_id(rule_id, &node.id, &node.name, message)
    }

    pub fn for_id(
        rule_id: RuleId,
        node_id: &str,
        node_name: &str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule_id,
            node_id: node_id.to_string(),
            node_name: node_name.to_string(),
            message: Some(message.into()),
            more_infos: None,
        }
    }

    pub fn with_more_infos(mut self, more_infos: serde_json::Value) -> Self {
        self.more_infos = Some(more_infos);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleError {
    pub rule_id: RuleId,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditSummary {
    pub total_issues: usize,
    pub issues_by_rule: BTreeMap<RuleId, usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rule_errors: Vec<RuleError>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub results: Vec<AuditFinding>,
    pub summary: AuditSummary,
}

impl AuditReport {
    pub fn from_findings(results: Vec<AuditFinding>, rule_errors: Vec<RuleError>) -> Self {
        let mut issues_by_rule = BTreeMap::new();
        for finding in &results {
            *issues_by_rule.entry(finding.rule_id).or_insert(0) += 1;
        }
        Self {
            summary: AuditSummary {
                total_issues: results.len(),
                issues_by_rule,
                rule_errors,
            },
            results,
        }
    }

    /// Render as markdown, one section per rule id.
    pub fn to_markdown(&self, definitions: &[RuleDefinition]) -> String {
        let mut buf = String::new();
        writeln!(buf, "# Design audit").ok();
        writeln!(buf).ok();

        if self.summary.total_issues == 0 {
            writeln!(buf, "No issues found.").ok();
        } else {
            writeln!(buf, "Total issues: {}", self.summary.total_issues).ok();
            for (rule_id, count) in &self.summary.issues_by_rule {
                let title = definitions
                    .iter()
                    .find(|d| d.id == *rule_id)
                    .map(|d| d.name.clone())
                    .unwrap_or_else(|| format!("Rule {}", rule_id));
                writeln!(buf).ok();
                writeln!(
                    buf,
                    "## {} (rule {}, {} issue{})",
                    title,
                    rule_id,
                    count,
                    if *count == 1 { "" } else { "s" }
                )
                .ok();
                writeln!(buf).ok();
                for finding in self.results.iter().filter(|f| f.rule_id == *rule_id) {
                    let detail = finding
                        .message
                        .clone()
                        .or_else(|| finding.more_infos.as_ref().map(|v| v.to_string()))
                        .unwrap_or_default();
                    writeln!(
                        buf,
                        "- **{}** (`{}`): {}",
                        finding.node_name, finding.node_id, detail
                    )
                    .ok();
                }
            }
        }

        for error in &self.summary.rule_errors {
            writeln!(buf).ok();
            writeln!(buf, "> Rule {} failed: {}", error.rule_id, error.message).ok();
        }

        buf
    }
}
