//! Request authorization for the Google APIs
//!
//! Service-account keys are exchanged for short-lived access tokens with a
//! signed JWT assertion. Tokens are cached and replaced a minute before they
//! expire, so a paced transfer keeps reading past the first hour.

use crate::config::{secret_string, SecretString, ServiceAccountKey, SourceAuth};
use crate::domain::{Result, SheetPipeError, SourceError};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::{Client, RequestBuilder};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Read-only access to sheet values and to the Drive file list
pub const SHEETS_SCOPES: &str = "https://www.googleapis.com/auth/spreadsheets.readonly \
https://www.googleapis.com/auth/drive.readonly";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Attaches credentials to outgoing requests
pub enum Authorizer {
    Bearer(SecretString),
    ApiKey(SecretString),
    ServiceAccount(TokenMinter),
}

impl Authorizer {
    /// # Errors
    ///
    /// Returns a credentials error if a service-account private key cannot be
    /// parsed.
    pub fn new(auth: SourceAuth) -> Result<Self> {
        Ok(match auth {
            SourceAuth::Bearer(token) => Authorizer::Bearer(token),
            SourceAuth::ApiKey(key) => Authorizer::ApiKey(key),
            SourceAuth::ServiceAccount(key) => Authorizer::ServiceAccount(TokenMinter::new(key)?),
        })
    }

    /// Add credentials to a request, minting a token first if needed
    pub async fn authorize(&self, client: &Client, request: RequestBuilder) -> Result<RequestBuilder> {
        Ok(match self {
            Authorizer::Bearer(token) => request.bearer_auth(token.expose_secret().as_str()),
            Authorizer::ApiKey(key) => request.query(&[("key", key.expose_secret().as_str())]),
            Authorizer::ServiceAccount(minter) => {
                let token = minter.access_token(client).await?;
                request.bearer_auth(token.expose_secret().as_str())
            }
        })
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct TokenErrorBody {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

fn default_expires_in() -> u64 {
    3600
}

struct CachedToken {
    token: SecretString,
    refresh_at: Instant,
}

/// Mints and caches access tokens for one service account
pub struct TokenMinter {
    client_email: String,
    token_uri: String,
    key: EncodingKey,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenMinter {
    pub fn new(key: ServiceAccountKey) -> Result<Self> {
        let encoding_key =
            EncodingKey::from_rsa_pem(key.private_key.expose_secret().as_str().as_bytes())
                .map_err(|e| {
                    SheetPipeError::Credentials(format!(
                        "service-account private key for {} is not a valid RSA PEM key: {e}",
                        key.client_email
                    ))
                })?;

        Ok(Self {
            client_email: key.client_email,
            token_uri: key.token_uri,
            key: encoding_key,
            cached: Mutex::new(None),
        })
    }

    /// A valid access token, minting a new one when the cached one is near expiry
    pub async fn access_token(&self, client: &Client) -> Result<SecretString> {
        let mut cached = self.cached.lock().await;
        if let Some(current) = cached.as_ref() {
            if Instant::now() < current.refresh_at {
                return Ok(current.token.clone());
            }
        }

        let fresh = self.mint(client).await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }

    async fn mint(&self, client: &Client) -> Result<CachedToken> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            iss: &self.client_email,
            scope: SHEETS_SCOPES,
            aud: &self.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.key)
            .map_err(|e| {
                SheetPipeError::Credentials(format!("failed to sign token request: {e}"))
            })?;

        let response = client
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| SourceError::RequestFailed(format!("token request: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<TokenErrorBody>(&body)
                .map(|e| match e.error_description {
                    Some(description) => format!("{}: {description}", e.error),
                    None => e.error,
                })
                .unwrap_or(body);
            return Err(SourceError::Unauthorized(format!(
                "token request for {}: HTTP {}: {message}",
                self.client_email,
                status.as_u16()
            ))
            .into());
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| SourceError::InvalidResponse(format!("token response: {e}")))?;

        tracing::debug!(
            principal = %self.client_email,
            expires_in_secs = token.expires_in,
            "Minted source access token"
        );

        let lifetime = Duration::from_secs(token.expires_in);
        Ok(CachedToken {
            token: secret_string(token.access_token),
            refresh_at: Instant::now() + lifetime.saturating_sub(REFRESH_MARGIN),
        })
    }
}
