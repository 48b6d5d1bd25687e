//! Bitrise REST client
//!
//! Talks to the v0.1 API: `GET /apps/{app}/builds/{slug}` and
//! `POST /apps/{app}/builds`, authenticated with a personal access token.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{ClientError, Result};
use crate::model::{Build, DataEnvelope, Environment, StartRequest, StartedBuild};
use crate::orchestrator::Orchestrator;

/// Public Bitrise API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.bitrise.io/v0.1";

/// Web UI prefix for build links.
pub const BUILD_URL_PREFIX: &str = "https://app.bitrise.io/build";

/// A value that never shows up in logs.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Secret(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

impl FromStr for Secret {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Secret::new(s))
    }
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct BitriseConfig {
    /// API base URL, without trailing slash
    pub api_url: String,
    /// App the builds belong to
    pub app_slug: String,
    pub access_token: Secret,
}

impl BitriseConfig {
    /// Config for the public API
    pub fn new(app_slug: &str, access_token: Secret) -> Self {
        BitriseConfig {
            api_url: DEFAULT_API_URL.to_string(),
            app_slug: app_slug.to_string(),
            access_token,
        }
    }

    /// Point at another API endpoint
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    fn builds_url(&self) -> String {
        format!("{}/apps/{}/builds", self.api_url, self.app_slug)
    }

    fn build_url(&self, build_slug: &str) -> String {
        format!("{}/{}", self.builds_url(), build_slug)
    }
}

/// Link to a build in the web UI.
pub fn build_web_url(build_slug: &str) -> String {
    format!("{BUILD_URL_PREFIX}/{build_slug}")
}

/// HTTP client for the Bitrise API
pub struct BitriseClient {
    config: BitriseConfig,
    http_client: reqwest::Client,
}

impl BitriseClient {
    /// Create a new client
    pub fn new(config: BitriseConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("build-router/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(BitriseClient {
            config,
            http_client,
        })
    }

    pub fn config(&self) -> &BitriseConfig {
        &self.config
    }

    fn authorization(&self) -> String {
        format!("token {}", self.config.access_token.expose())
    }

    async fn read_body(response: reqwest::Response) -> Result<String> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl Orchestrator for BitriseClient {
    async fn get_build(&self, build_slug: &str) -> Result<Build> {
        let url = self.config.build_url(build_slug);
        debug!(url = %url, "fetching build");

        let response = self
            .http_client
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(build_slug.to_string()));
        }

        let body = Self::read_body(response).await?;
        let envelope: DataEnvelope<Build> = serde_json::from_str(&body)?;
        Ok(envelope.data)
    }

    async fn start_build(
        &self,
        workflow: &str,
        params: Value,
        build_number: &str,
        envs: Vec<Environment>,
    ) -> Result<StartedBuild> {
        let request = StartRequest::new(workflow, params, build_number, envs)?;
        let url = self.config.builds_url();
        info!(workflow, url = %url, "starting build");

        let response = self
            .http_client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .json(&request)
            .send()
            .await?;

        let body = Self::read_body(response).await?;
        Ok(serde_json::from_str(&body)?)
    }
}
