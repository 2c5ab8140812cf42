use crate::audit::{AuditContext, Rule};
use crate::error::Result;
use crate::types::{AuditFinding, RuleId};

use super::MISSING_EXPORT_SETTINGS;

const ASSET_TYPES: [&str; 3] = ["IMAGE-SVG", "VECTOR", "BOOLEAN_OPERATION"];

#[derive(Debug, Clone, Copy, Default)]
pub struct MissingExportSettings;

impl Rule for MissingExportSettings {
    fn id(&self) -> RuleId {
        MISSING_EXPORT_SETTINGS
    }

    fn check(&self, ctx: &AuditContext<'_>) -> Result<Vec<AuditFinding>> {
        Ok(ctx
            .all_nodes()
            .into_iter()
            .filter(|node| ASSET_TYPES.contains(&node.node_type.as_str()))
            .filter(|node| node.export_settings.is_none())
            .map(|node| AuditFinding::new(self.id(), node, "Vector asset has no export settings"))
            .collect())
    }
}
