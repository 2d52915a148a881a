//! Cloud Resource Manager client implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};
use url::Url;

use super::auth::TokenSource;
use super::models::{ApiErrorResponse, Project};
use crate::error::CloudError;
use crate::providers::traits::ProjectResolver;

/// Default Cloud Resource Manager endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://cloudresourcemanager.googleapis.com";

/// Overrides the Cloud Resource Manager endpoint.
pub const ENDPOINT_ENV: &str = "CLOUDRESOURCEMANAGER_ENDPOINT";

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Resource Manager client settings.
#[derive(Debug, Clone)]
pub struct ResourceManagerConfig {
    /// API base URL.
    pub endpoint: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Credentials; discovered from the environment when `None`.
    pub token_source: Option<TokenSource>,
}

impl Default for ResourceManagerConfig {
    fn default() -> Self {
        let endpoint = std::env::var(ENDPOINT_ENV)
            .ok()
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        Self {
            endpoint,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            token_source: None,
        }
    }
}

/// Cloud Resource Manager v1 client.
///
/// Construction is free; the HTTP client and credentials are set up on each
/// lookup, so every failure surfaces from [`ResourceManager::get_project`].
/// Lookups use reqwest and `tokio::fs`, and must run on a Tokio runtime.
#[derive(Debug, Clone, Default)]
pub struct ResourceManager {
    config: ResourceManagerConfig,
}

/// An HTTP client paired with a bearer token.
struct Session {
    /// HTTP client.
    client: Client,
    /// Access token.
    access_token: String,
}

impl ResourceManager {
    /// Create a client with the given settings.
    #[must_use]
    pub fn new(config: ResourceManagerConfig) -> Self {
        Self { config }
    }

    /// Settings in use.
    #[must_use]
    pub fn config(&self) -> &ResourceManagerConfig {
        &self.config
    }

    /// Get a project by ID.
    ///
    /// # Errors
    /// Returns error if credentials cannot be obtained or the API call fails.
    pub async fn get_project(&self, project_id: &str) -> Result<Project, CloudError> {
        if project_id.is_empty() {
            return Err(CloudError::Config(
                "project ID is empty; the current cluster does not follow the GKE naming convention"
                    .to_string(),
            ));
        }

        let url = self.project_url(project_id)?;
        let session = self.connect().await?;
        session.get(url.as_str()).await
    }

    /// Build the HTTP client and obtain a token.
    async fn connect(&self) -> Result<Session, CloudError> {
        let client = Client::builder()
            .timeout(self.config.timeout)
            .build()
            .map_err(CloudError::Http)?;

        let token_source = match &self.config.token_source {
            Some(source) => source.clone(),
            None => TokenSource::from_env().await?,
        };
        let access_token = token_source.access_token(&client).await?;

        Ok(Session {
            client,
            access_token,
        })
    }

    fn project_url(&self, project_id: &str) -> Result<Url, CloudError> {
        let mut url = Url::parse(&self.config.endpoint).map_err(|e| {
            CloudError::Config(format!("invalid endpoint {}: {e}", self.config.endpoint))
        })?;
        url.path_segments_mut()
            .map_err(|()| {
                CloudError::Config(format!("endpoint cannot be a base: {}", self.config.endpoint))
            })?
            .pop_if_empty()
            .extend(["v1", "projects", project_id]);
        Ok(url)
    }
}

impl Session {
    /// Make an authenticated GET request.
    async fn get<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, CloudError> {
        debug!(url = %url, "GET request");

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Handle API response.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, CloudError> {
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            return serde_json::from_str(&text).map_err(|e| {
                warn!(error = %e, body = %text, "Failed to parse response");
                CloudError::Serialization(e)
            });
        }

        let message = serde_json::from_str::<ApiErrorResponse>(&text)
            .map(|r| r.error.message)
            .ok()
            .filter(|m| !m.is_empty())
            .unwrap_or(text);

        if status == StatusCode::NOT_FOUND {
            Err(CloudError::NotFound(message))
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Err(CloudError::Auth(message))
        } else {
            Err(CloudError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl ProjectResolver for ResourceManager {
    async fn project_number(&self, project_id: &str) -> Result<String, CloudError> {
        let project = self.get_project(project_id).await?;
        debug!(
            project = %project.project_id,
            number = %project.project_number,
            "Resolved project number"
        );
        Ok(project.project_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn manager(endpoint: &str) -> ResourceManager {
        ResourceManager::new(ResourceManagerConfig {
            endpoint: endpoint.to_string(),
            timeout: Duration::from_secs(5),
            token_source: Some(TokenSource::Static("ya29.test".to_string())),
        })
    }

    #[test]
    fn test_project_url() {
        let rm = manager(DEFAULT_ENDPOINT);
        assert_eq!(
            rm.project_url("my-project").unwrap().as_str(),
            "https://cloudresourcemanager.googleapis.com/v1/projects/my-project"
        );

        let rm = manager("http://localhost:8080/");
        assert_eq!(
            rm.project_url("p").unwrap().as_str(),
            "http://localhost:8080/v1/projects/p"
        );
    }

    #[test]
    fn test_project_url_escapes_id() {
        let rm = manager(DEFAULT_ENDPOINT);
        let url = rm.project_url("a/b").unwrap();
        assert!(url.as_str().ends_with("/v1/projects/a%2Fb"));
    }

    #[tokio::test]
    async fn test_project_number_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/projects/my-project"))
            .and(header("authorization", "Bearer ya29.test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "projectNumber": "123456789",
                "projectId": "my-project",
                "lifecycleState": "ACTIVE"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let number = manager(&server.uri())
            .project_number("my-project")
            .await
            .unwrap();
        assert_eq!(number, "123456789");
    }

    #[tokio::test]
    async fn test_not_found_maps_api_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/projects/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": {
                    "code": 404,
                    "message": "Project missing not found",
                    "status": "NOT_FOUND"
                }
            })))
            .mount(&server)
            .await;

        let err = manager(&server.uri())
            .project_number("missing")
            .await
            .unwrap_err();
        assert!(matches!(err, CloudError::NotFound(ref m) if m == "Project missing not found"));
    }

    #[tokio::test]
    async fn test_permission_denied_is_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string("denied"))
            .mount(&server)
            .await;

        let err = manager(&server.uri())
            .project_number("locked")
            .await
            .unwrap_err();
        assert!(matches!(err, CloudError::Auth(ref m) if m == "denied"));
    }

    #[tokio::test]
    async fn test_server_error_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let err = manager(&server.uri())
            .project_number("p")
            .await
            .unwrap_err();
        assert!(matches!(err, CloudError::Api { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_empty_project_id_rejected_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = manager(&server.uri()).project_number("").await.unwrap_err();
        assert!(matches!(err, CloudError::Config(_)));
    }
}
