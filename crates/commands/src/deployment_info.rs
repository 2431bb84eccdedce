//! Synchronous deployment status lookups.
//!
//! `/deployment-info` is the one command with no async leg: the handler
//! queries the two status endpoints configured for the named environment
//! and returns their parsed bodies in a single JSON reply.

use std::time::Duration;

use {serde::Serialize, tracing::debug};

use gantry_config::{EnvironmentUrls, GantryConfig};

use crate::error::{Error, Result};

/// First whitespace token of the request text, lowercased.
///
/// Chat clients like to autocapitalize; environment names in the config
/// table are lowercase by convention.
#[must_use]
pub fn parse_environment(text: &str) -> Option<String> {
    text.split_whitespace().next().map(str::to_lowercase)
}

/// Combined status of one environment's services.
#[derive(Debug, Serialize)]
pub struct DeploymentInfo {
    pub connect: serde_json::Value,
    pub tpx: serde_json::Value,
}

/// Client for the per-environment deployment-status endpoints.
pub struct DeploymentInfoClient {
    http: reqwest::Client,
}

impl DeploymentInfoClient {
    /// Build a client with a per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    /// Resolve the environment named in `text` against `config`, then fetch.
    ///
    /// Empty text and names absent from the table are validation errors;
    /// only a resolved environment costs any HTTP traffic.
    pub async fn fetch_for(&self, config: &GantryConfig, text: &str) -> Result<DeploymentInfo> {
        let Some(environment) = parse_environment(text) else {
            return Err(Error::MissingEnvironment);
        };
        let Some(urls) = config.environments.get(&environment) else {
            return Err(Error::unknown_environment(environment));
        };
        self.fetch(&environment, urls).await
    }

    /// Fetch both service statuses, one GET per configured URL.
    pub async fn fetch(&self, environment: &str, urls: &EnvironmentUrls) -> Result<DeploymentInfo> {
        let connect = self
            .fetch_service(environment, "connect", &urls.connect)
            .await?;
        let tpx = self.fetch_service(environment, "tpx", &urls.tpx).await?;
        Ok(DeploymentInfo { connect, tpx })
    }

    async fn fetch_service(
        &self,
        environment: &str,
        service: &'static str,
        url: &str,
    ) -> Result<serde_json::Value> {
        debug!(environment, service, url, "fetching deployment status");
        let resp = self
            .http
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|source| Error::status_fetch(environment, service, source))?
            .error_for_status()
            .map_err(|source| Error::status_fetch(environment, service, source))?;

        resp.json()
            .await
            .map_err(|source| Error::status_fetch(environment, service, source))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn client() -> DeploymentInfoClient {
        DeploymentInfoClient::new(Duration::from_secs(2)).unwrap()
    }

    fn urls(server: &mockito::ServerGuard) -> EnvironmentUrls {
        EnvironmentUrls {
            connect: format!("{}/connect/deployment_info.json", server.url()),
            tpx: format!("{}/tpx/deployment_info.json", server.url()),
        }
    }

    // ── Environment parsing ────────────────────────────────────────────

    #[test]
    fn parse_environment_takes_first_token_lowercased() {
        assert_eq!(
            parse_environment("Blackops extra-ignored-tokens").as_deref(),
            Some("blackops")
        );
        assert_eq!(parse_environment("  staging  ").as_deref(), Some("staging"));
        assert_eq!(parse_environment("   "), None);
        assert_eq!(parse_environment(""), None);
    }

    // ── Status fetching ────────────────────────────────────────────────

    #[tokio::test]
    async fn fetch_hits_both_urls_once_and_merges_bodies() {
        let mut server = mockito::Server::new_async().await;
        let connect = server
            .mock("GET", "/connect/deployment_info.json")
            .with_header("content-type", "application/json")
            .with_body(r#"{"version": "1.2.3"}"#)
            .expect(1)
            .create_async()
            .await;
        let tpx = server
            .mock("GET", "/tpx/deployment_info.json")
            .with_header("content-type", "application/json")
            .with_body(r#"{"version": "4.5.6", "healthy": true}"#)
            .expect(1)
            .create_async()
            .await;

        let info = client().fetch("blackops", &urls(&server)).await.unwrap();

        connect.assert_async().await;
        tpx.assert_async().await;
        assert_eq!(info.connect["version"], "1.2.3");
        assert_eq!(info.tpx["healthy"], true);
    }

    #[tokio::test]
    async fn upstream_error_status_is_a_status_fetch_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/connect/deployment_info.json")
            .with_status(503)
            .create_async()
            .await;

        let err = client().fetch("blackops", &urls(&server)).await.unwrap_err();
        match err {
            Error::StatusFetch {
                environment,
                service,
                ..
            } => {
                assert_eq!(environment, "blackops");
                assert_eq!(service, "connect");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn non_json_body_is_a_status_fetch_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/connect/deployment_info.json")
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let err = client().fetch("blackops", &urls(&server)).await.unwrap_err();
        assert!(matches!(err, Error::StatusFetch { service: "connect", .. }));
    }

    // ── Resolution against the config table ────────────────────────────

    #[tokio::test]
    async fn fetch_for_rejects_unknown_environment_without_traffic() {
        let config = GantryConfig::default();
        let err = client().fetch_for(&config, "nonexistent").await.unwrap_err();
        assert!(matches!(err, Error::UnknownEnvironment { .. }));
    }

    #[tokio::test]
    async fn fetch_for_rejects_empty_text() {
        let config = GantryConfig::default();
        let err = client().fetch_for(&config, "   ").await.unwrap_err();
        assert!(matches!(err, Error::MissingEnvironment));
    }
}
