//! Ambient Google credentials.
//!
//! Discovery order:
//! 1. `GOOGLE_OAUTH_ACCESS_TOKEN`
//! 2. `GOOGLE_APPLICATION_CREDENTIALS`, else the gcloud well-known file
//! 3. The GCE metadata server

use std::env;
use std::path::{Path, PathBuf};

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use tracing::debug;

use super::models::{
    AuthorizedUserCredentials, CredentialsFile, JwtBearerRequest, RefreshTokenRequest,
    ServiceAccountClaims, ServiceAccountCredentials, TokenResponse,
};
use crate::error::CloudError;

/// Ready-made bearer token.
pub const ACCESS_TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";
/// Path to an application default credentials file.
pub const CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";
/// Overrides the gcloud configuration directory.
pub const CLOUDSDK_CONFIG_ENV: &str = "CLOUDSDK_CONFIG";
/// Overrides the metadata server host.
pub const METADATA_HOST_ENV: &str = "GCE_METADATA_HOST";

/// OAuth2 token endpoint.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
/// Scope requested for service account and metadata tokens.
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

const WELL_KNOWN_FILE: &str = "application_default_credentials.json";
const METADATA_DEFAULT_HOST: &str = "metadata.google.internal";
const METADATA_TOKEN_PATH: &str = "/computeMetadata/v1/instance/service-accounts/default/token";
const METADATA_FLAVOR: &str = "Metadata-Flavor";
const METADATA_FLAVOR_VALUE: &str = "Google";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Where access tokens come from.
#[derive(Debug, Clone)]
pub enum TokenSource {
    /// A bearer token used as-is.
    Static(String),
    /// Refresh token exchange.
    AuthorizedUser(AuthorizedUserCredentials),
    /// Signed JWT exchange.
    ServiceAccount(ServiceAccountCredentials),
    /// GCE metadata server at the given base URL.
    MetadataServer(String),
}

impl TokenSource {
    /// Discover ambient credentials.
    ///
    /// # Errors
    /// Returns error if a configured credentials file is missing or invalid.
    pub async fn from_env() -> Result<Self, CloudError> {
        if let Some(token) = env::var(ACCESS_TOKEN_ENV).ok().filter(|t| !t.is_empty()) {
            debug!("Using access token from {ACCESS_TOKEN_ENV}");
            return Ok(Self::Static(token));
        }

        if let Some(path) = env::var_os(CREDENTIALS_ENV).filter(|p| !p.is_empty()) {
            return Self::from_file(Path::new(&path)).await;
        }

        if let Some(path) = well_known_file() {
            if tokio::fs::try_exists(&path).await.unwrap_or(false) {
                return Self::from_file(&path).await;
            }
        }

        let host = env::var(METADATA_HOST_ENV)
            .ok()
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| METADATA_DEFAULT_HOST.to_string());
        debug!(host = %host, "Falling back to metadata server credentials");
        Ok(Self::MetadataServer(format!("http://{host}")))
    }

    /// Load an application default credentials file.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or has an unsupported type.
    pub async fn from_file(path: &Path) -> Result<Self, CloudError> {
        debug!(path = %path.display(), "Loading credentials file");

        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            CloudError::Credentials(format!("failed to read {}: {e}", path.display()))
        })?;
        let creds: CredentialsFile = serde_json::from_str(&text).map_err(|e| {
            CloudError::Credentials(format!("unsupported credentials in {}: {e}", path.display()))
        })?;

        Ok(match creds {
            CredentialsFile::AuthorizedUser(user) => Self::AuthorizedUser(user),
            CredentialsFile::ServiceAccount(account) => Self::ServiceAccount(account),
        })
    }

    /// Obtain an access token.
    ///
    /// # Errors
    /// Returns error if the token exchange fails.
    pub async fn access_token(&self, client: &Client) -> Result<String, CloudError> {
        match self {
            Self::Static(token) => Ok(token.clone()),
            Self::AuthorizedUser(user) => {
                debug!(token_uri = %user.token_uri, "Exchanging refresh token");
                let form = RefreshTokenRequest {
                    grant_type: "refresh_token",
                    client_id: &user.client_id,
                    client_secret: &user.client_secret,
                    refresh_token: &user.refresh_token,
                };
                let response = client.post(&user.token_uri).form(&form).send().await?;
                token_from_response(response).await
            }
            Self::ServiceAccount(account) => {
                debug!(
                    email = %account.client_email,
                    token_uri = %account.token_uri,
                    "Exchanging service account assertion"
                );
                let assertion = sign_assertion(account)?;
                let form = JwtBearerRequest {
                    grant_type: JWT_BEARER_GRANT,
                    assertion: &assertion,
                };
                let response = client.post(&account.token_uri).form(&form).send().await?;
                token_from_response(response).await
            }
            Self::MetadataServer(base) => {
                let url = format!("{}{METADATA_TOKEN_PATH}", base.trim_end_matches('/'));
                debug!(url = %url, "Requesting metadata server token");
                let response = client
                    .get(&url)
                    .header(METADATA_FLAVOR, METADATA_FLAVOR_VALUE)
                    .send()
                    .await?;
                token_from_response(response).await
            }
        }
    }
}

/// gcloud's application default credentials location.
fn well_known_file() -> Option<PathBuf> {
    let config_dir = match env::var_os(CLOUDSDK_CONFIG_ENV).filter(|p| !p.is_empty()) {
        Some(dir) => PathBuf::from(dir),
        None if cfg!(windows) => PathBuf::from(env::var_os("APPDATA")?).join("gcloud"),
        None => dirs::home_dir()?.join(".config").join("gcloud"),
    };
    Some(config_dir.join(WELL_KNOWN_FILE))
}

fn sign_assertion(account: &ServiceAccountCredentials) -> Result<String, CloudError> {
    let now = Utc::now().timestamp();
    let claims = ServiceAccountClaims {
        iss: &account.client_email,
        scope: CLOUD_PLATFORM_SCOPE,
        aud: &account.token_uri,
        iat: now,
        exp: now + ASSERTION_LIFETIME_SECS,
    };

    let mut header = Header::new(Algorithm::RS256);
    header.kid.clone_from(&account.private_key_id);

    let key = EncodingKey::from_rsa_pem(account.private_key.as_bytes())?;
    Ok(jsonwebtoken::encode(&header, &claims, &key)?)
}

async fn token_from_response(response: reqwest::Response) -> Result<String, CloudError> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        return Err(CloudError::Auth(format!(
            "token request failed with {}: {text}",
            status.as_u16()
        )));
    }

    let token: TokenResponse = serde_json::from_str(&text)?;
    Ok(token.access_token)
}
