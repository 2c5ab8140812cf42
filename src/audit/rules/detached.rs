use crate::audit::{AuditContext, Rule};
use crate::error::Result;
use crate::types::{AuditFinding, RuleId, SimplifiedNode, StyleConcern, StyleOrigin};

use super::DETACHED_STYLES;

/// Concerns that can be bound to a design-system style. Layout never is.
const STYLED_CONCERNS: [StyleConcern; 4] = [
    StyleConcern::Text,
    StyleConcern::Fills,
    StyleConcern::Strokes,
    StyleConcern::Effects,
];

/// Flags style references that resolve in `localStyles`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedStyles;

fn reference(node: &SimplifiedNode, concern: StyleConcern) -> Option<&str> {
    match concern {
        StyleConcern::Text => node.text_style.as_deref(),
        StyleConcern::Fills => node.fills.as_deref(),
        StyleConcern::Strokes => node.strokes.as_deref(),
        StyleConcern::Effects => node.effects.as_deref(),
        StyleConcern::Layout => node.layout.as_deref(),
    }
}

impl Rule for DetachedStyles {
    fn id(&self) -> RuleId {
        DETACHED_STYLES
    }

    fn check(&self, ctx: &AuditContext<'_>) -> Result<Vec<AuditFinding>> {
        let vars = ctx.global_vars();
        let mut findings = Vec::new();

        for node in ctx.all_nodes() {
            let detached: Vec<&str> = STYLED_CONCERNS
                .iter()
                .filter(|concern| {
                    reference(node, **concern)
                        .is_some_and(|key| vars.origin(**concern, key) == Some(StyleOrigin::Local))
                })
                .map(|concern| concern.property())
                .collect();

            if detached.is_empty() {
                continue;
            }
            findings.push(
                AuditFinding::new(
                    self.id(),
                    node,
                    format!("Detached style on: {}", detached.join(", ")),
                )
                .with_more_infos(serde_json::json!({ "properties": detached })),
            );
        }

        Ok(findings)
    }
}
