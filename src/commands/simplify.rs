use std::path::PathBuf;
use std::process::ExitCode;

use figma_audit::{preset, render_design, write_output, FigmaAuditError, TraversalOptions};
use tracing::info;

use super::load_raw_design;
use crate::cli::SourceArgs;
use crate::formatting::render_error;
use crate::settings::{load_config, resolve_format, resolve_max_depth};

/// Run the simplify command.
pub async fn run_simplify(
    config_path: Option<PathBuf>,
    source: SourceArgs,
    extractors: String,
    format: Option<figma_audit::OutputFormat>,
    output: Option<PathBuf>,
) -> ExitCode {
    let config = match load_config(config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => return render_error(err, output.as_deref()),
    };
    let Some(extractors) = preset(&extractors) else {
        return render_error(
            FigmaAuditError::Config(format!(
                "unknown extractor preset '{}'; expected all, layout-and-text, content, visuals or layout",
                extractors
            )),
            output.as_deref(),
        );
    };
    let format = resolve_format(format, &config);

    let raw = match load_raw_design(&source, &config).await {
        Ok(raw) => raw,
        Err(err) => return render_error(err, output.as_deref()),
    };
    let options = TraversalOptions {
        max_depth: resolve_max_depth(source.depth, &config),
        node_filter: None,
    };
    let design = match figma_audit::simplify(&raw, extractors, &options) {
        Ok(design) => design,
        Err(err) => return render_error(err, output.as_deref()),
    };
    info!(
        nodes = design.all_nodes().len(),
        local_styles = design.global_vars.local_styles.len(),
        design_system = design.global_vars.design_system.len(),
        "simplified"
    );

    let rendered = match render_design(&design, format) {
        Ok(rendered) => rendered,
        Err(err) => return render_error(err, output.as_deref()),
    };
    if let Err(err) = write_output(&rendered, output.as_deref()) {
        return render_error(err, output.as_deref());
    }
    ExitCode::SUCCESS
}
