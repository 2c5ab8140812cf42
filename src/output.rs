use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{FigmaAuditError, Result};
use crate::types::{AuditReport, RuleDefinition, SimplifiedDesign};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    /// Audit reports only.
    Markdown,
}

pub fn render_design(design: &SimplifiedDesign, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(design)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(design)?),
        OutputFormat::Markdown => Err(FigmaAuditError::Config(
            "markdown output is only available for audit reports".to_string(),
        )),
    }
}

pub fn render_report(
    report: &AuditReport,
    definitions: &[RuleDefinition],
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(report)?),
        OutputFormat::Markdown => Ok(report.to_markdown(definitions)),
    }
}

/// Write to `path`, or to stdout when no path is given.
pub fn write_output(rendered: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, rendered)?;
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AuditFinding, SimplifiedNode};

    fn design() -> SimplifiedDesign {
        SimplifiedDesign {
            name: "Shop".into(),
            nodes: vec![SimplifiedNode::new("1:1", "Card", "FRAME")],
            ..SimplifiedDesign::default()
        }
    }

    #[test]
    fn design_renders_as_json_and_yaml() {
        let json = render_design(&design(), OutputFormat::Json).expect("json");
        assert!(json.contains("\"thumbnailUrl\": \"\""));

        let yaml = render_design(&design(), OutputFormat::Yaml).expect("yaml");
        let back: SimplifiedDesign = serde_yaml::from_str(&yaml).expect("parse yaml");
        assert_eq!(back, design());
    }

    #[test]
    fn markdown_is_rejected_for_designs() {
        assert!(render_design(&design(), OutputFormat::Markdown).is_err());
    }

    #[test]
    fn report_renders_markdown() {
        let report = AuditReport::from_findings(
            vec![AuditFinding::for_id(1, "1:1", "Frame 1", "Default name")],
            vec![],
        );
        let md = render_report(&report, &[], OutputFormat::Markdown).expect("markdown");
        assert!(md.contains("Rule 1"));
    }

    #[test]
    fn write_output_creates_parent_dirs() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested/out.json");
        write_output("{}", Some(&path)).expect("write");
        assert_eq!(std::fs::read_to_string(path).expect("read"), "{}");
    }
}
