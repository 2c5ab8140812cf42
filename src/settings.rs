use std::path::Path;

use figma_audit::{Config, FigmaAuditError, OutputFormat, RuleId};
use tracing::debug;

pub fn load_config(path: Option<&Path>) -> Result<Config, FigmaAuditError> {
    let config = Config::load(path)?;
    debug!(
        config = %path.map(|p| p.display().to_string()).unwrap_or_else(|| "default".into()),
        format = ?config.output.format,
        max_depth = ?config.simplify.max_depth,
        disabled_rules = ?config.audit.disabled_rules,
        "effective config"
    );
    Ok(config)
}

/// CLI flag first, then config.
pub fn resolve_format(flag: Option<OutputFormat>, config: &Config) -> OutputFormat {
    flag.unwrap_or(config.output.format)
}

/// The tighter of the CLI depth and the configured maximum.
pub fn resolve_max_depth(flag: Option<u32>, config: &Config) -> Option<u32> {
    match (flag, config.simplify.max_depth) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// Rules disabled by config plus those disabled on the command line.
pub fn disabled_rules(flag: &[RuleId], config: &Config) -> Vec<RuleId> {
    let mut ids: Vec<RuleId> = config
        .audit
        .disabled_rules
        .iter()
        .chain(flag)
        .copied()
        .collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}
