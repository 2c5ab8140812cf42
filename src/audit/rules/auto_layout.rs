use crate::audit::{AuditContext, Rule};
use crate::error::Result;
use crate::types::{AuditFinding, LayoutMode, RuleId, SimplifiedNode};

use super::AUTO_LAYOUT_USAGE;

/// Flags frames and groups with several children laid out by hand.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoLayoutUsage;

impl AutoLayoutUsage {
    fn uses_auto_layout(node: &SimplifiedNode, ctx: &AuditContext<'_>) -> bool {
        node.layout
            .as_deref()
            .and_then(|key| ctx.global_vars().layout(key))
            .is_some_and(|layout| layout.mode != LayoutMode::None)
    }
}

impl Rule for AutoLayoutUsage {
    fn id(&self) -> RuleId {
        AUTO_LAYOUT_USAGE
    }

    fn check(&self, ctx: &AuditContext<'_>) -> Result<Vec<AuditFinding>> {
        Ok(ctx
            .all_nodes()
            .into_iter()
            .filter(|node| node.is_type("FRAME") || node.is_type("GROUP"))
            .filter(|node| node.children().len() > 1)
            .filter(|node| !Self::uses_auto_layout(node, ctx))
            .map(|node| {
                AuditFinding::new(
                    self.id(),
                    node,
                    format!(
                        "{} children are positioned manually; consider auto layout",
                        node.children().len()
                    ),
                )
            })
            .collect())
    }
}
