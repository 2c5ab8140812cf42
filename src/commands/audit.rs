use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use figma_audit::{
    render_report, write_output, AuditContext, Auditor, GeminiClient, OutputFormat, RuleId,
    RuleRegistry,
};
use tracing::{info, warn};

use super::load_design;
use crate::cli::SourceArgs;
use crate::formatting::{exit_code_for_report, render_error, report_summary};
use crate::settings::{disabled_rules, load_config, resolve_format, resolve_max_depth};

/// Run the audit command.
#[allow(clippy::too_many_arguments)]
pub async fn run_audit(
    config_path: Option<PathBuf>,
    verbose: bool,
    source: SourceArgs,
    format: Option<OutputFormat>,
    output: Option<PathBuf>,
    disable: Vec<RuleId>,
    no_ai: bool,
    fail_on_issues: bool,
) -> ExitCode {
    let config = match load_config(config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => return render_error(err, output.as_deref()),
    };
    let format = resolve_format(format, &config);

    let design = match load_design(&source, &config, resolve_max_depth(source.depth, &config)).await {
        Ok(design) => design,
        Err(err) => return render_error(err, output.as_deref()),
    };

    let registry = Arc::new(RuleRegistry::default());
    registry.apply_disabled(&disabled_rules(&disable, &config));

    let mut auditor = Auditor::new(registry.clone());
    if no_ai {
        info!("AI-assisted rules skipped (--no-ai)");
    } else {
        match GeminiClient::new(&config.llm) {
            Ok(client) => auditor = auditor.with_llm(Arc::new(client), config.llm.max_attempts),
            Err(e) => warn!(error = %e, "AI-assisted rules will report nothing"),
        }
    }

    let report = auditor.run_audit(&AuditContext::new(&design)).await;
    if verbose {
        eprintln!("{}", report_summary(&report));
    }

    let rendered = match render_report(&report, &registry.definitions(), format) {
        Ok(rendered) => rendered,
        Err(err) => return render_error(err, output.as_deref()),
    };
    if let Err(err) = write_output(&rendered, output.as_deref()) {
        return render_error(err, output.as_deref());
    }
    exit_code_for_report(&report, fail_on_issues)
}
