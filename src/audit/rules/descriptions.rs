use crate::audit::{AuditContext, Rule};
use crate::error::Result;
use crate::types::{AuditFinding, RuleId};

use super::COMPONENT_DESCRIPTIONS;

/// Flags undocumented components and component sets. Variants owned by a
/// set are covered by the set's description.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComponentDescriptions;

pub(crate) fn is_blank(description: Option<&str>) -> bool {
    description.map_or(true, |d| d.trim().is_empty())
}

impl Rule for ComponentDescriptions {
    fn id(&self) -> RuleId {
        COMPONENT_DESCRIPTIONS
    }

    fn check(&self, ctx: &AuditContext<'_>) -> Result<Vec<AuditFinding>> {
        let design = ctx.design;

        let components = design
            .components
            .values()
            .filter(|c| c.component_set_id.is_none())
            .filter(|c| is_blank(c.description.as_deref()))
            .map(|c| AuditFinding::for_id(self.id(), &c.id, &c.name, "Component has no description"));

        let sets = design
            .component_sets
            .values()
            .filter(|s| is_blank(s.description.as_deref()))
            .map(|s| {
                AuditFinding::for_id(self.id(), &s.id, &s.name, "Component set has no description")
            });

        Ok(components.chain(sets).collect())
    }
}
