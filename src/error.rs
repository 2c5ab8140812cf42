use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::ParseError;

#[derive(Debug, Error)]
pub enum FigmaAuditError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] ParseError),

    #[error("Figma API error at '{endpoint}' (status: {status:?}): {message}")]
    FigmaApi {
        endpoint: String,
        status: Option<StatusCode>,
        message: String,
    },

    #[error("Invalid design data: {0}")]
    InvalidDesign(String),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Rule {rule_id} failed: {message}")]
    Rule { rule_id: u32, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl FigmaAuditError {
    pub fn figma_api(
        endpoint: impl Into<String>,
        status: Option<StatusCode>,
        message: impl Into<String>,
    ) -> Self {
        FigmaAuditError::FigmaApi {
            endpoint: endpoint.into(),
            status,
            message: message.into(),
        }
    }

    pub fn invalid_design(message: impl Into<String>) -> Self {
        FigmaAuditError::InvalidDesign(message.into())
    }

    pub fn rule(rule_id: u32, message: impl Into<String>) -> Self {
        FigmaAuditError::Rule {
            rule_id,
            message: message.into(),
        }
    }

    pub fn to_payload(&self) -> ErrorPayload {
        match self {
            FigmaAuditError::Io(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Check file paths/permissions.",
            ),
            FigmaAuditError::Network(e) => ErrorPayload::new(
                ErrorCategory::Network,
                e.to_string(),
                "Check connectivity/proxy/VPN and retry.",
            ),
            FigmaAuditError::InvalidUrl(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Verify the configured base URL (e.g., https://api.figma.com).",
            ),
            FigmaAuditError::FigmaApi { .. } => ErrorPayload::new(
                ErrorCategory::Figma,
                self.to_string(),
                "Check FIGMA_API_KEY, the file key/node id and rate limits; retry after waiting.",
            ),
            FigmaAuditError::InvalidDesign(msg) => ErrorPayload::new(
                ErrorCategory::Design,
                msg.to_string(),
                "Pass the raw response of the Figma files or file-nodes endpoint.",
            ),
            FigmaAuditError::Image(e) => ErrorPayload::new(
                ErrorCategory::Image,
                e.to_string(),
                "Verify the downloaded image is a supported format (png, jpg, gif, webp).",
            ),
            FigmaAuditError::Serialization(e) => ErrorPayload::new(
                ErrorCategory::Design,
                e.to_string(),
                "Check JSON inputs; run with --verbose for details.",
            ),
            FigmaAuditError::Yaml(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Retry with --format json.",
            ),
            FigmaAuditError::Rule { message, .. } => ErrorPayload::new(
                ErrorCategory::Audit,
                message.to_string(),
                "The rule is now in error state; restart the process to reset it.",
            ),
            FigmaAuditError::Config(msg) => {
                let lower = msg.to_ascii_lowercase();
                if lower.contains("figma_api_key") || lower.contains("figma token") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Set FIGMA_API_KEY (or FIGMA_OAUTH_TOKEN) before fetching from Figma.",
                    )
                } else if lower.contains("file key") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Pass --file-key (the <FILE_KEY> in https://www.figma.com/file/<FILE_KEY>/...) or --input with a saved response.",
                    )
                } else {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Check flags/paths and the config file.",
                    )
                }
            }
        }
    }
}

impl From<toml::de::Error> for FigmaAuditError {
    fn from(err: toml::de::Error) -> Self {
        FigmaAuditError::Config(format!("Invalid TOML: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, FigmaAuditError>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Config,
    Network,
    Figma,
    Design,
    Image,
    Audit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub category: ErrorCategory,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl ErrorPayload {
    pub fn new(category: ErrorCategory, message: String, remediation: impl Into<String>) -> Self {
        Self {
            category,
            message,
            remediation: Some(remediation.into()),
        }
    }
}
