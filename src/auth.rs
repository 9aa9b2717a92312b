use crate::client::api_error_from_response;
use crate::config::ClientConfig;
use crate::error::{AvaandmedError, AvaandmedResult};
use crate::models::{AccessToken, Envelope};
use base64::{engine::general_purpose, Engine};
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use url::Url;

/// Header carrying the encoded key pair on the key-login call
pub const X_API_KEY: &str = "X-API-KEY";

pub const KEY_ID_ENV: &str = "AVAANDMED_KEY_ID";
pub const API_KEY_ENV: &str = "AVAANDMED_KEY";

/// Authentication trait for the Avaandmed API
#[async_trait::async_trait]
pub trait Authentication: Send + Sync {
    /// Apply authentication to the headers of a single request
    async fn apply_auth(&self, headers: &mut HeaderMap) -> AvaandmedResult<()>;

    /// Called when the server rejected the credentials applied to a request
    fn invalidate(&self) {}
}

/// Key identifier and API key issued by the portal
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    key_id: String,
    api_key: String,
}

impl Credentials {
    pub fn new(key_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            api_key: api_key.into(),
        }
    }

    /// Read `AVAANDMED_KEY_ID` and `AVAANDMED_KEY`
    pub fn from_env() -> AvaandmedResult<Self> {
        let read = |name: &str| {
            std::env::var(name)
                .ok()
                .filter(|v| !v.is_empty())
                .ok_or_else(|| AvaandmedError::invalid_param(format!("{} is not set", name)))
        };
        Ok(Self::new(read(KEY_ID_ENV)?, read(API_KEY_ENV)?))
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Base64 of `"{key_id}:{api_key}"`, the value of the `X-API-KEY` header
    pub fn encode(&self) -> String {
        let pair = format!("{}:{}", self.key_id, self.api_key);
        general_purpose::STANDARD.encode(pair.as_bytes())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key_id", &self.key_id)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

struct CachedToken {
    token: String,
    fetched_at: Instant,
}

/// Exchanges [`Credentials`] for a bearer token at `/auth/key-login`.
///
/// Every call to [`apply_auth`](Authentication::apply_auth) performs a fresh
/// exchange unless a token TTL was configured, in which case a token younger
/// than the TTL is reused. The server never reports expiry, so the TTL is the
/// caller's estimate.
pub struct KeyLoginAuth {
    http: Client,
    auth_url: Url,
    credentials: Credentials,
    token_ttl: Option<Duration>,
    cached: Mutex<Option<CachedToken>>,
}

impl KeyLoginAuth {
    pub fn new(http: Client, config: &ClientConfig, credentials: Credentials) -> AvaandmedResult<Self> {
        Ok(Self {
            http,
            auth_url: config.auth_url()?,
            credentials,
            token_ttl: config.bearer_token_ttl(),
            cached: Mutex::new(None),
        })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Perform the key-login exchange and return the access token
    pub async fn acquire_token(&self) -> AvaandmedResult<String> {
        debug!("HTTP POST {}", self.auth_url);
        let response = self
            .http
            .post(self.auth_url.clone())
            .header(X_API_KEY, self.credentials.encode())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error_from_response(response, self.auth_url.as_str()).await);
        }

        let body = response.bytes().await?;
        let envelope: Envelope<AccessToken> = serde_json::from_slice(&body)?;
        Ok(envelope.data.access_token)
    }

    async fn bearer_token(&self) -> AvaandmedResult<String> {
        if let Some(token) = self.cached_token() {
            debug!("Reusing cached bearer token");
            return Ok(token);
        }

        let token = self.acquire_token().await?;

        if self.token_ttl.is_some() {
            let mut slot = self.cached.lock().unwrap_or_else(PoisonError::into_inner);
            *slot = Some(CachedToken {
                token: token.clone(),
                fetched_at: Instant::now(),
            });
        }

        Ok(token)
    }

    fn cached_token(&self) -> Option<String> {
        let ttl = self.token_ttl?;
        let slot = self.cached.lock().unwrap_or_else(PoisonError::into_inner);
        slot.as_ref()
            .filter(|cached| cached.fetched_at.elapsed() < ttl)
            .map(|cached| cached.token.clone())
    }
}

impl fmt::Debug for KeyLoginAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyLoginAuth")
            .field("auth_url", &self.auth_url.as_str())
            .field("credentials", &self.credentials)
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

#[async_trait::async_trait]
impl Authentication for KeyLoginAuth {
    async fn apply_auth(&self, headers: &mut HeaderMap) -> AvaandmedResult<()> {
        let token = self.bearer_token().await?;
        headers.insert(AUTHORIZATION, bearer_header(&token)?);
        Ok(())
    }

    fn invalidate(&self) {
        let mut slot = self.cached.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.take().is_some() {
            debug!("Dropped cached bearer token");
        }
    }
}

/// Bearer token obtained elsewhere
#[derive(Clone)]
pub struct BearerAuth {
    token: String,
}

impl BearerAuth {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl fmt::Debug for BearerAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerAuth([REDACTED])")
    }
}

#[async_trait::async_trait]
impl Authentication for BearerAuth {
    async fn apply_auth(&self, headers: &mut HeaderMap) -> AvaandmedResult<()> {
        headers.insert(AUTHORIZATION, bearer_header(&self.token)?);
        Ok(())
    }
}

/// No authentication, for public endpoints
#[derive(Debug, Clone)]
pub struct NoAuth;

#[async_trait::async_trait]
impl Authentication for NoAuth {
    async fn apply_auth(&self, _headers: &mut HeaderMap) -> AvaandmedResult<()> {
        Ok(())
    }
}

fn bearer_header(token: &str) -> AvaandmedResult<HeaderValue> {
    format!("Bearer {}", token)
        .parse()
        .map_err(|e| AvaandmedError::auth_error(format!("Invalid auth header: {}", e)))
}
