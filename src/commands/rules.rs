use std::fmt::Write as FmtWrite;
use std::path::PathBuf;
use std::process::ExitCode;

use figma_audit::{write_output, FigmaAuditError, OutputFormat, RuleCategory, RuleDefinition, RuleRegistry};

use crate::formatting::render_error;
use crate::settings::{disabled_rules, load_config, resolve_format};

/// List rule definitions with the state the config gives them.
pub async fn run_rules(config_path: Option<PathBuf>, format: Option<OutputFormat>) -> ExitCode {
    let config = match load_config(config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => return render_error(err, None),
    };
    let registry = RuleRegistry::default();
    registry.apply_disabled(&disabled_rules(&[], &config));
    let definitions = registry.definitions();

    let rendered = match resolve_format(format, &config) {
        OutputFormat::Json => serde_json::to_string_pretty(&definitions).map_err(FigmaAuditError::from),
        OutputFormat::Yaml => serde_yaml::to_string(&definitions).map_err(FigmaAuditError::from),
        OutputFormat::Markdown => Ok(rules_table(&definitions)),
    };
    match rendered.and_then(|r| write_output(&r, None)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => render_error(err, None),
    }
}

fn rules_table(definitions: &[RuleDefinition]) -> String {
    let mut buf = String::new();
    writeln!(buf, "| id | name | category | state |").ok();
    writeln!(buf, "|---|---|---|---|").ok();
    for def in definitions {
        let category = match def.category {
            RuleCategory::Standard => "standard",
            RuleCategory::AiBased => "ai-based",
        };
        writeln!(
            buf,
            "| {} | {} | {} | {:?} |",
            def.id, def.name, category, def.state
        )
        .ok();
    }
    buf
}
