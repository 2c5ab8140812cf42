use regex::Regex;
use std::sync::LazyLock;

use crate::audit::{AuditContext, Rule};
use crate::error::{FigmaAuditError, Result};
use crate::types::{AuditFinding, RuleId};

use super::DEFAULT_LAYER_NAMES;

static DEFAULT_NAME: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"^(Frame|Rectangle|Ellipse|Group|Vector|Line|Polygon|Star|Text|Component|Instance|Union|Subtract|Intersect|Exclude|Image|Section|Slice) \d+$",
    )
    .ok()
});

/// Flags layers that kept the name the editor generated for them.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultLayerNames;

impl DefaultLayerNames {
    pub fn is_default_name(name: &str) -> bool {
        DEFAULT_NAME.as_ref().is_some_and(|re| re.is_match(name))
    }
}

impl Rule for DefaultLayerNames {
    fn id(&self) -> RuleId {
        DEFAULT_LAYER_NAMES
    }

    fn check(&self, ctx: &AuditContext<'_>) -> Result<Vec<AuditFinding>> {
        let re = DEFAULT_NAME
            .as_ref()
            .ok_or_else(|| FigmaAuditError::rule(self.id(), "default-name pattern failed to compile"))?;

        Ok(ctx
            .all_nodes()
            .into_iter()
            .filter(|node| re.is_match(&node.name))
            .map(|node| {
                AuditFinding::new(
                    self.id(),
                    node,
                    format!("Layer \"{}\" still has its default name", node.name),
                )
            })
            .collect())
    }
}
