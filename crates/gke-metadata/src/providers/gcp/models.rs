//! GCP API request and response models.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Cloud Resource Manager types
// ============================================================================

/// A Cloud Resource Manager v1 project.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Numeric project number, rendered in decimal.
    #[serde(deserialize_with = "int64_as_string")]
    pub project_number: String,
    /// Project ID.
    pub project_id: String,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Lifecycle state (e.g. `ACTIVE`).
    #[serde(default)]
    pub lifecycle_state: Option<String>,
    /// Create time.
    #[serde(default)]
    pub create_time: Option<DateTime<Utc>>,
    /// Labels.
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

/// Google APIs encode int64 as a JSON string, but accept a bare number too.
fn int64_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Int64 {
        Text(String),
        Number(i64),
    }

    match Int64::deserialize(deserializer)? {
        Int64::Number(n) => Ok(n.to_string()),
        Int64::Text(s) => s
            .parse::<i64>()
            .map(|n| n.to_string())
            .map_err(|_| serde::de::Error::custom(format!("invalid int64 value: {s}"))),
    }
}

/// Standard Google API error envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    /// Error body.
    pub error: ApiErrorBody,
}

/// Body of a Google API error.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    /// HTTP status code.
    #[serde(default)]
    pub code: u16,
    /// Human readable message.
    #[serde(default)]
    pub message: String,
    /// Canonical status (e.g. `PERMISSION_DENIED`).
    #[serde(default)]
    pub status: Option<String>,
}

// ============================================================================
// OAuth2 types
// ============================================================================

/// OAuth2 token endpoint / metadata server response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// Bearer token.
    pub access_token: String,
    /// Lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// Token type, normally `Bearer`.
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Refresh token grant.
#[derive(Debug, Serialize)]
pub struct RefreshTokenRequest<'a> {
    /// Always `refresh_token`.
    pub grant_type: &'static str,
    /// OAuth client ID.
    pub client_id: &'a str,
    /// OAuth client secret.
    pub client_secret: &'a str,
    /// Long lived refresh token.
    pub refresh_token: &'a str,
}

/// JWT bearer grant.
#[derive(Debug, Serialize)]
pub struct JwtBearerRequest<'a> {
    /// Always `urn:ietf:params:oauth:grant-type:jwt-bearer`.
    pub grant_type: &'static str,
    /// Signed assertion.
    pub assertion: &'a str,
}

/// Claims of a service account assertion.
#[derive(Debug, Serialize)]
pub struct ServiceAccountClaims<'a> {
    /// Service account email.
    pub iss: &'a str,
    /// Requested scopes, space separated.
    pub scope: &'a str,
    /// Token endpoint.
    pub aud: &'a str,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
}

// ============================================================================
// Application default credentials
// ============================================================================

/// Contents of an application default credentials file.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CredentialsFile {
    /// Credentials created by `gcloud auth application-default login`.
    AuthorizedUser(AuthorizedUserCredentials),
    /// Service account key.
    ServiceAccount(ServiceAccountCredentials),
}

/// User credentials with a refresh token.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizedUserCredentials {
    /// OAuth client ID.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Refresh token.
    pub refresh_token: String,
    /// Token endpoint.
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

/// Service account key.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountCredentials {
    /// Service account email.
    pub client_email: String,
    /// PEM encoded RSA private key.
    pub private_key: String,
    /// Key ID.
    #[serde(default)]
    pub private_key_id: Option<String>,
    /// Token endpoint.
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    super::auth::DEFAULT_TOKEN_URI.to_string()
}
