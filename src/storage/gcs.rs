use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::Context as _;

use crate::foundation::error::{FadeError, FadeResult};
use crate::storage::{ObjectStore, public_url};

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const UPLOAD_ENDPOINT: &str = "https://storage.googleapis.com/upload/storage/v1/b";
const SCOPE: &str = "https://www.googleapis.com/auth/devstorage.read_write";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: u64 = 3600;
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Fields of a service-account key file the client needs.
#[derive(Clone, serde::Deserialize)]
pub struct ServiceAccountKey {
    /// Account email, used as the JWT issuer.
    pub client_email: String,
    /// PEM-encoded RSA private key.
    pub private_key: String,
    /// OAuth2 token endpoint.
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    /// Parse a service-account JSON payload.
    pub fn from_json(payload: &str) -> FadeResult<Self> {
        let key: Self = serde_json::from_str(payload)
            .map_err(|e| FadeError::config(format!("malformed service account JSON: {e}")))?;
        if key.client_email.trim().is_empty() {
            return Err(FadeError::config("service account client_email is empty"));
        }
        Ok(key)
    }
}

#[derive(Debug, serde::Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Debug, serde::Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    value: String,
    refresh_at: Instant,
}

/// Google Cloud Storage client authenticated as a service account.
///
/// Access tokens are obtained with a signed JWT bearer grant and reused until one minute before
/// they expire.
pub struct GcsStore {
    bucket: String,
    key: ServiceAccountKey,
    signing_key: jsonwebtoken::EncodingKey,
    http: reqwest::blocking::Client,
    token: Mutex<Option<CachedToken>>,
}

impl GcsStore {
    /// Build a client for `bucket` from a service-account JSON payload.
    pub fn from_credentials_json(payload: &str, bucket: impl Into<String>) -> FadeResult<Self> {
        let bucket = bucket.into();
        if bucket.trim().is_empty() {
            return Err(FadeError::config("bucket name is empty"));
        }
        let key = ServiceAccountKey::from_json(payload)?;
        let signing_key = jsonwebtoken::EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| FadeError::config(format!("invalid service account private key: {e}")))?;
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| FadeError::config(format!("failed to create HTTP client: {e}")))?;

        tracing::info!(bucket = %bucket, account = %key.client_email, "storage client ready");
        Ok(Self {
            bucket,
            key,
            signing_key,
            http,
            token: Mutex::new(None),
        })
    }

    fn access_token(&self) -> FadeResult<String> {
        let mut cached = self
            .token
            .lock()
            .map_err(|_| FadeError::upload("token cache lock poisoned"))?;
        if let Some(token) = cached.as_ref()
            && Instant::now() < token.refresh_at
        {
            return Ok(token.value.clone());
        }

        let fresh = self.fetch_token()?;
        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }

    fn fetch_token(&self) -> FadeResult<CachedToken> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| FadeError::upload(format!("system clock before epoch: {e}")))?
            .as_secs();
        let claims = Claims {
            iss: &self.key.client_email,
            scope: SCOPE,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        let assertion = jsonwebtoken::encode(
            &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::RS256),
            &claims,
            &self.signing_key,
        )
        .map_err(|e| FadeError::upload(format!("failed to sign token request: {e}")))?;

        let requested_at = Instant::now();
        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .map_err(|e| FadeError::upload(format!("token request failed: {e}")))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(FadeError::upload(format!(
                "token endpoint returned HTTP {status}: {}",
                body.trim()
            )));
        }
        let token: TokenResponse = response
            .json()
            .map_err(|e| FadeError::upload(format!("malformed token response: {e}")))?;

        tracing::debug!(expires_in = token.expires_in, "access token refreshed");
        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_REFRESH_MARGIN);
        Ok(CachedToken {
            value: token.access_token,
            refresh_at: requested_at + lifetime,
        })
    }
}

impl ObjectStore for GcsStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    #[tracing::instrument(level = "info", skip(self, local), fields(bucket = %self.bucket))]
    fn upload(&self, local: &Path, object_name: &str, content_type: &str) -> FadeResult<String> {
        let bytes = std::fs::read(local)
            .with_context(|| format!("failed to read upload source '{}'", local.display()))?;
        let size = bytes.len();
        let token = self.access_token()?;

        let response = self
            .http
            .post(format!("{UPLOAD_ENDPOINT}/{}/o", self.bucket))
            .query(&[("uploadType", "media"), ("name", object_name)])
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .map_err(|e| FadeError::upload(format!("upload request failed: {e}")))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(FadeError::upload(format!(
                "storage returned HTTP {status} for '{object_name}': {}",
                body.trim()
            )));
        }

        tracing::info!(size, "uploaded");
        Ok(public_url(&self.bucket, object_name))
    }
}
