mod audit;
mod images;
mod rules;
mod simplify;

pub use audit::run_audit;
pub use images::{run_images, ImagesArgs};
pub use rules::run_rules;
pub use simplify::run_simplify;

use figma_audit::{
    Config, FigmaAuditError, FigmaClient, SimplifiedDesign, TraversalOptions, ALL_EXTRACTORS,
};
use serde_json::Value;
use tracing::info;

use crate::cli::SourceArgs;

/// Read the raw envelope from `--input`, or fetch it from the Figma API.
pub(crate) async fn load_raw_design(
    source: &SourceArgs,
    config: &Config,
) -> Result<Value, FigmaAuditError> {
    if let Some(path) = &source.input {
        info!(path = %path.display(), "reading raw design");
        let content = std::fs::read_to_string(path).map_err(|e| {
            FigmaAuditError::Config(format!("failed to read '{}': {}", path.display(), e))
        })?;
        return Ok(serde_json::from_str(&content)?);
    }

    let Some(file_key) = source.file_key.as_deref() else {
        return Err(FigmaAuditError::Config(
            "either --input or --file-key is required".to_string(),
        ));
    };
    let client = FigmaClient::with_settings(config.figma_auth()?, &config.figma)
        .map_err(|e| figma_audit::map_figma_error("client setup", e))?;
    match source.node_id.as_deref() {
        Some(node_id) => client.get_subtree(file_key, node_id, source.depth).await,
        None => client.get_whole_file(file_key, source.depth).await,
    }
}

/// Load and simplify with every extractor; the audit works on the full view.
pub(crate) async fn load_design(
    source: &SourceArgs,
    config: &Config,
    max_depth: Option<u32>,
) -> Result<SimplifiedDesign, FigmaAuditError> {
    let raw = load_raw_design(source, config).await?;
    let options = TraversalOptions {
        max_depth,
        node_filter: None,
    };
    figma_audit::simplify(&raw, ALL_EXTRACTORS, &options)
}
