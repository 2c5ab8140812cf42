//! Figma REST client for fetching design files and image URLs.
//!
//! Requests go through `reqwest`; when the transport itself fails (proxy,
//! TLS or DNS trouble on the host) the same request is retried once through
//! the system `curl`.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::{FigmaAuth, FigmaSettings};
use crate::error::{FigmaAuditError, Result};

use super::api_types::{FigmaImageExport, FigmaImageFills, ImageFormat};

const FIGMA_TOKEN_HEADER: &str = "x-figma-token";

#[derive(Debug, Error)]
pub enum FigmaError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Figma API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Missing access token")]
    MissingToken,
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
    #[error("curl fallback failed: {0}")]
    Curl(String),
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Attach the logical endpoint to a client error.
pub fn map_figma_error(endpoint: &str, e: FigmaError) -> FigmaAuditError {
    match e {
        FigmaError::Api { status, message } => FigmaAuditError::figma_api(
            endpoint,
            Some(
                reqwest::StatusCode::from_u16(status)
                    .unwrap_or(reqwest::StatusCode::INTERNAL_SERVER_ERROR),
            ),
            message,
        ),
        FigmaError::MissingToken => FigmaAuditError::Config(
            "Missing Figma token; set FIGMA_API_KEY or FIGMA_OAUTH_TOKEN".to_string(),
        ),
        FigmaError::RateLimited(secs) => FigmaAuditError::figma_api(
            endpoint,
            Some(reqwest::StatusCode::TOO_MANY_REQUESTS),
            format!("Rate limited, retry after {} seconds", secs),
        ),
        other => FigmaAuditError::figma_api(endpoint, None, other.to_string()),
    }
}

#[derive(Debug)]
pub struct FigmaClient {
    client: reqwest::Client,
    auth_header: (String, String),
    base_url: String,
}

impl FigmaClient {
    pub fn new(access_token: impl Into<String>) -> std::result::Result<Self, FigmaError> {
        Self::from_auth(FigmaAuth::PersonalAccessToken(access_token.into()))
    }

    pub fn from_auth(auth: FigmaAuth) -> std::result::Result<Self, FigmaError> {
        Self::with_settings(auth, &FigmaSettings::default())
    }

    pub fn with_settings(
        auth: FigmaAuth,
        settings: &FigmaSettings,
    ) -> std::result::Result<Self, FigmaError> {
        let (name, value) = match auth {
            FigmaAuth::PersonalAccessToken(token) => (FIGMA_TOKEN_HEADER.to_string(), token),
            FigmaAuth::OAuthToken(token) => {
                if token.trim().is_empty() {
                    return Err(FigmaError::MissingToken);
                }
                (AUTHORIZATION.as_str().to_string(), format!("Bearer {}", token))
            }
        };
        if value.trim().is_empty() {
            return Err(FigmaError::MissingToken);
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_bytes(name.as_bytes()).map_err(|_| FigmaError::MissingToken)?,
            HeaderValue::from_str(&value).map_err(|_| FigmaError::MissingToken)?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(settings.timeout)
            .build()?;

        Ok(Self {
            client,
            auth_header: (name, value),
            base_url: format!("{}/v1", settings.base_url.trim_end_matches('/')),
        })
    }

    /// Whole file as returned by `GET /files/:key`.
    pub async fn get_whole_file(&self, file_key: &str, depth: Option<u32>) -> Result<Value> {
        let mut url = format!("{}/files/{}", self.base_url, file_key);
        if let Some(depth) = depth {
            url.push_str(&format!("?depth={}", depth));
        }
        info!(file_key, ?depth, "fetching whole file");
        self.get_json(&url)
            .await
            .map_err(|e| map_figma_error(&format!("GET /files/{}", file_key), e))
    }

    /// One node subtree as returned by `GET /files/:key/nodes`.
    pub async fn get_subtree(
        &self,
        file_key: &str,
        node_id: &str,
        depth: Option<u32>,
    ) -> Result<Value> {
        let mut url = format!("{}/files/{}/nodes?ids={}", self.base_url, file_key, node_id);
        if let Some(depth) = depth {
            url.push_str(&format!("&depth={}", depth));
        }
        info!(file_key, node_id, ?depth, "fetching node subtree");
        self.get_json(&url)
            .await
            .map_err(|e| map_figma_error(&format!("GET /files/{}/nodes", file_key), e))
    }

    /// Download URLs for every image fill in the file, keyed by `imageRef`.
    pub async fn get_image_fill_urls(&self, file_key: &str) -> Result<BTreeMap<String, String>> {
        let url = format!("{}/files/{}/images", self.base_url, file_key);
        let fills: FigmaImageFills = self
            .get_json(&url)
            .await
            .map_err(|e| map_figma_error(&format!("GET /files/{}/images", file_key), e))?;
        Ok(fills.meta.images)
    }

    /// Render nodes and return their temporary URLs, keyed by node id.
    /// Nodes Figma could not render are left out.
    pub async fn render_node_images(
        &self,
        file_key: &str,
        node_ids: &[&str],
        format: ImageFormat,
        scale: f32,
    ) -> Result<BTreeMap<String, String>> {
        if node_ids.is_empty() {
            return Ok(BTreeMap::new());
        }
        let endpoint = format!("GET /images/{}", file_key);
        let url = format!(
            "{}/images/{}?ids={}&format={}&scale={}",
            self.base_url,
            file_key,
            node_ids.join(","),
            format.as_str(),
            scale
        );
        let export: FigmaImageExport = self
            .get_json(&url)
            .await
            .map_err(|e| map_figma_error(&endpoint, e))?;
        if let Some(err) = export.err {
            return Err(FigmaAuditError::figma_api(endpoint, None, err));
        }
        Ok(export
            .images
            .into_iter()
            .filter_map(|(id, url)| url.map(|url| (id, url)))
            .collect())
    }

    /// Raw bytes of a rendered or uploaded image. The URL is pre-signed, so
    /// no credentials are sent.
    pub async fn download_image(&self, url: &str) -> Result<Vec<u8>> {
        let response = reqwest::get(url).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FigmaAuditError::figma_api(
                "GET image",
                Some(status),
                response.text().await.unwrap_or_default(),
            ));
        }
        Ok(response.bytes().await?.to_vec())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> std::result::Result<T, FigmaError> {
        debug!(url, "figma request");
        match self.client.get(url).send().await {
            Ok(response) => self.handle_response(response).await,
            Err(e) if e.is_connect() || e.is_timeout() || e.is_request() => {
                warn!(error = %e, "figma request failed, retrying with curl");
                let body = self.curl_get(url).await?;
                Ok(serde_json::from_slice(&body)?)
            }
            Err(e) => Err(FigmaError::Request(e)),
        }
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> std::result::Result<T, FigmaError> {
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return Err(FigmaError::RateLimited(retry_after));
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FigmaError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    async fn curl_get(&self, url: &str) -> std::result::Result<Vec<u8>, FigmaError> {
        let (name, value) = &self.auth_header;
        let mut cmd = Command::new("curl");
        cmd.args(["--silent", "--show-error", "--fail", "--location"])
            .arg("--header")
            .arg(format!("{}: {}", name, value))
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let output = cmd
            .output()
            .await
            .map_err(|e| FigmaError::Curl(format!("failed to spawn curl: {}", e)))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FigmaError::Curl(format!(
                "curl exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(output.stdout)
    }
}
