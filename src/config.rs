use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::error::{FigmaAuditError, Result};
use crate::output::OutputFormat;
use crate::types::RuleId;

pub const FIGMA_API_KEY_ENV: &str = "FIGMA_API_KEY";
pub const FIGMA_OAUTH_TOKEN_ENV: &str = "FIGMA_OAUTH_TOKEN";
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Runtime configuration.
///
/// Resolution order: explicit `--config` path, then
/// `~/.config/figma-audit/config.toml`, then compiled defaults. Secrets that
/// are missing from the file fall back to environment variables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub figma: FigmaSettings,
    pub llm: LlmSettings,
    pub simplify: SimplifySettings,
    pub audit: AuditSettings,
    pub output: OutputSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FigmaSettings {
    pub base_url: String,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    /// Personal access token or OAuth token (`Bearer`).
    pub token: Option<String>,
    pub oauth: bool,
}

impl Default for FigmaSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.figma.com".to_string(),
            timeout: Duration::from_secs(30),
            token: None,
            oauth: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub max_attempts: u32,
    /// Wait before retry `n` is `2^n * backoff_base`.
    #[serde(with = "humantime_serde")]
    pub backoff_base: Duration,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.0-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta/models".to_string(),
            max_attempts: 3,
            backoff_base: Duration::from_secs(1),
            timeout: Duration::from_secs(60),
        }
    }
}

impl LlmSettings {
    /// AI-assisted rules only run when this resolves.
    pub fn resolved_api_key(&self) -> Option<String> {
        non_blank(self.api_key.clone()).or_else(|| env_non_blank(GEMINI_API_KEY_ENV))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplifySettings {
    pub max_depth: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditSettings {
    pub disabled_rules: Vec<RuleId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub format: OutputFormat,
}

/// Resolved Figma credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FigmaAuth {
    PersonalAccessToken(String),
    OAuthToken(String),
}

impl Config {
    /// Load from `path`, or from the central config file when `path` is
    /// `None` and that file exists, or fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match central_config_path().filter(|p| p.exists()) {
                Some(central) => Self::from_file(&central)?,
                None => {
                    debug!("no config file found, using defaults");
                    Self::default()
                }
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading config");
        let content = std::fs::read_to_string(path).map_err(|e| {
            FigmaAuditError::Config(format!("failed to read config '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.figma.base_url.trim().is_empty() {
            return Err(FigmaAuditError::Config("figma.base_url must not be empty".into()));
        }
        url::Url::parse(&self.figma.base_url)?;
        if self.figma.timeout.is_zero() {
            return Err(FigmaAuditError::Config("figma.timeout must be greater than 0".into()));
        }
        if self.llm.max_attempts == 0 {
            return Err(FigmaAuditError::Config("llm.max_attempts must be at least 1".into()));
        }
        if self.llm.timeout.is_zero() {
            return Err(FigmaAuditError::Config("llm.timeout must be greater than 0".into()));
        }
        if self.llm.model.trim().is_empty() {
            return Err(FigmaAuditError::Config("llm.model must not be empty".into()));
        }
        Ok(())
    }

    /// Figma token from config, then `FIGMA_OAUTH_TOKEN`, then `FIGMA_API_KEY`.
    pub fn figma_auth(&self) -> Result<FigmaAuth> {
        if let Some(token) = non_blank(self.figma.token.clone()) {
            return Ok(if self.figma.oauth {
                FigmaAuth::OAuthToken(token)
            } else {
                FigmaAuth::PersonalAccessToken(token)
            });
        }
        if let Some(token) = env_non_blank(FIGMA_OAUTH_TOKEN_ENV) {
            return Ok(FigmaAuth::OAuthToken(token));
        }
        if let Some(token) = env_non_blank(FIGMA_API_KEY_ENV) {
            return Ok(FigmaAuth::PersonalAccessToken(token));
        }
        Err(FigmaAuditError::Config(format!(
            "no Figma token configured; set {} or {}",
            FIGMA_API_KEY_ENV, FIGMA_OAUTH_TOKEN_ENV
        )))
    }
}

/// `~/.config/figma-audit/config.toml`, when a home directory is known.
pub fn central_config_path() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map(|home| PathBuf::from(home).join(".config/figma-audit/config.toml"))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn env_non_blank(key: &str) -> Option<String> {
    non_blank(std::env::var(key).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_values_match_expected() {
        let cfg = Config::default();
        assert_eq!(cfg.figma.base_url, "https://api.figma.com");
        assert_eq!(cfg.figma.timeout, Duration::from_secs(30));
        assert_eq!(cfg.llm.max_attempts, 3);
        assert_eq!(cfg.llm.backoff_base, Duration::from_secs(1));
        assert_eq!(cfg.output.format, OutputFormat::Json);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = Config::from_toml(
            r#"
            [llm]
            max_attempts = 5
            backoff_base = "250ms"

            [audit]
            disabled_rules = [1, 4]

            [output]
            format = "yaml"
            "#,
        )
        .expect("parse");
        assert_eq!(cfg.llm.max_attempts, 5);
        assert_eq!(cfg.llm.backoff_base, Duration::from_millis(250));
        assert_eq!(cfg.llm.model, LlmSettings::default().model);
        assert_eq!(cfg.audit.disabled_rules, vec![1, 4]);
        assert_eq!(cfg.output.format, OutputFormat::Yaml);
        assert_eq!(cfg.figma, FigmaSettings::default());
    }

    #[test]
    fn validate_rejects_zero_attempts() {
        let mut cfg = Config::default();
        cfg.llm.max_attempts = 0;
        let err = cfg.validate().expect_err("invalid");
        assert!(err.to_string().contains("max_attempts"));
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let err = Config::from_toml("[llm\nmodel = 1").expect_err("invalid");
        assert!(matches!(err, FigmaAuditError::Config(_)));
    }

    #[test]
    fn load_reads_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "[simplify]\nmax_depth = 2").expect("write");
        let cfg = Config::load(Some(file.path())).expect("load");
        assert_eq!(cfg.simplify.max_depth, Some(2));
    }

    #[test]
    fn explicit_token_wins_over_environment() {
        let mut cfg = Config::default();
        cfg.figma.token = Some("figd_abc".into());
        assert_eq!(
            cfg.figma_auth().expect("auth"),
            FigmaAuth::PersonalAccessToken("figd_abc".into())
        );
        cfg.figma.oauth = true;
        assert_eq!(
            cfg.figma_auth().expect("auth"),
            FigmaAuth::OAuthToken("figd_abc".into())
        );
    }
}
