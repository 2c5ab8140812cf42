//! Rule registry: definitions and their runtime state.
//!
//! One registry is owned by the hosting process and shared (`Arc`) between
//! audits. State changes are administrative and take the write lock; audits
//! only read.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{info, warn};

use crate::error::{FigmaAuditError, Result};
use crate::types::{RuleCategory, RuleDefinition, RuleId, RuleState};

use super::rules;

#[derive(Debug)]
pub struct RuleRegistry {
    definitions: RwLock<BTreeMap<RuleId, RuleDefinition>>,
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::with_definitions(rules::builtin_definitions())
    }
}

impl RuleRegistry {
    pub fn with_definitions(definitions: impl IntoIterator<Item = RuleDefinition>) -> Self {
        let definitions = definitions.into_iter().map(|d| (d.id, d)).collect();
        Self {
            definitions: RwLock::new(definitions),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<RuleId, RuleDefinition>> {
        self.definitions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<RuleId, RuleDefinition>> {
        self.definitions.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// All definitions in id order, whatever their state.
    pub fn definitions(&self) -> Vec<RuleDefinition> {
        self.read().values().cloned().collect()
    }

    pub fn enabled_definitions(&self) -> Vec<RuleDefinition> {
        self.read().values().filter(|d| d.is_enabled()).cloned().collect()
    }

    pub fn by_category(&self, category: RuleCategory) -> Vec<RuleDefinition> {
        self.read()
            .values()
            .filter(|d| d.category == category)
            .cloned()
            .collect()
    }

    pub fn get(&self, id: RuleId) -> Option<RuleDefinition> {
        self.read().get(&id).cloned()
    }

    /// Re-enable a disabled rule. A rule in error state stays there until
    /// the process restarts.
    pub fn enable(&self, id: RuleId) -> Result<()> {
        let mut definitions = self.write();
        let definition = definitions.get_mut(&id).ok_or_else(|| unknown_rule(id))?;
        match definition.state {
            RuleState::Error => Err(FigmaAuditError::rule(
                id,
                format!(
                    "rule is in error state ({}); restart to reset it",
                    definition.error_message.as_deref().unwrap_or("unknown error")
                ),
            )),
            _ => {
                definition.state = RuleState::Enabled;
                info!(rule_id = id, "rule enabled");
                Ok(())
            }
        }
    }

    pub fn disable(&self, id: RuleId) -> Result<()> {
        let mut definitions = self.write();
        let definition = definitions.get_mut(&id).ok_or_else(|| unknown_rule(id))?;
        if definition.state != RuleState::Error {
            definition.state = RuleState::Disabled;
            info!(rule_id = id, "rule disabled");
        }
        Ok(())
    }

    /// Record a failure; the rule is skipped by later audits.
    pub fn mark_error(&self, id: RuleId, message: impl Into<String>) {
        let message = message.into();
        if let Some(definition) = self.write().get_mut(&id) {
            warn!(rule_id = id, error = %message, "rule moved to error state");
            definition.state = RuleState::Error;
            definition.error_message = Some(message);
        }
    }

    /// Disable every id in `ids`, ignoring unknown ones.
    pub fn apply_disabled(&self, ids: &[RuleId]) {
        for id in ids {
            if let Err(e) = self.disable(*id) {
                warn!(rule_id = *id, error = %e, "ignoring unknown rule in configuration");
            }
        }
    }
}

fn unknown_rule(id: RuleId) -> FigmaAuditError {
    FigmaAuditError::rule(id, "unknown rule id")
}
