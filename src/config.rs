use crate::error::{AvaandmedError, AvaandmedResult};
use std::time::Duration;
use url::Url;

/// Production host of the Avaandmed portal
pub const DEFAULT_HOST: &str = "avaandmed.eesti.ee";

const DEFAULT_BASE_URL: &str = "https://avaandmed.eesti.ee";

/// Test environment host
pub const TEST_HOST: &str = "avaandmedtest.eesti.ee";

/// Path prefix shared by every API endpoint
pub const API_PREFIX: &str = "/api";

/// Key-login endpoint, relative to the API prefix
pub const AUTH_ENDPOINT: &str = "/auth/key-login";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Environment variable holding an alternative hostname
pub const HOST_ENV: &str = "AVAANDMED_HOST";

/// Connection settings shared by every call made through one client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: Url,
    timeout: Option<Duration>,
    token_ttl: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            timeout: Some(DEFAULT_TIMEOUT),
            token_ttl: None,
        }
    }
}

impl ClientConfig {
    /// Point the client at `https://{hostname}`
    pub fn for_host(hostname: &str) -> AvaandmedResult<Self> {
        let hostname = hostname.trim().trim_end_matches('/');
        if hostname.is_empty() {
            return Err(AvaandmedError::invalid_param("Hostname cannot be empty"));
        }
        Self::with_base_url(format!("https://{}", hostname))
    }

    /// Point the client at an arbitrary absolute URL (scheme, host and optional port)
    pub fn with_base_url(base_url: impl AsRef<str>) -> AvaandmedResult<Self> {
        let base_url = Url::parse(base_url.as_ref())?;
        if base_url.cannot_be_a_base() {
            return Err(AvaandmedError::invalid_param(format!(
                "Not a usable base URL: {}",
                base_url
            )));
        }

        Ok(Self {
            base_url,
            ..Self::default()
        })
    }

    /// Build configuration from `AVAANDMED_HOST`, falling back to the production host
    pub fn from_env() -> AvaandmedResult<Self> {
        match std::env::var(HOST_ENV) {
            Ok(host) if !host.trim().is_empty() => Self::for_host(&host),
            _ => Ok(Self::default()),
        }
    }

    /// Set or clear the per-request timeout
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reuse a bearer token for up to `ttl` instead of fetching one per call
    ///
    /// A cached token is dropped as soon as a request using it is answered
    /// with 401, so the next call logs in again.
    pub fn token_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.token_ttl = ttl;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn bearer_token_ttl(&self) -> Option<Duration> {
        self.token_ttl
    }

    /// Resolve `{base_url}/api{relative}`. `relative` may carry a query string.
    ///
    /// Dot segments (`.`, `..`, or their percent-encoded forms) are rejected
    /// instead of being collapsed onto another endpoint.
    pub fn api_url(&self, relative: &str) -> AvaandmedResult<Url> {
        reject_dot_segments(relative)?;
        let base = self.base_url.as_str().trim_end_matches('/');
        let url = Url::parse(&format!("{}{}{}", base, API_PREFIX, relative))?;
        Ok(url)
    }

    /// Resolve the key-login endpoint
    pub fn auth_url(&self) -> AvaandmedResult<Url> {
        self.api_url(AUTH_ENDPOINT)
    }
}

fn reject_dot_segments(relative: &str) -> AvaandmedResult<()> {
    let path = relative.split(['?', '#']).next().unwrap_or_default();
    for segment in path.split('/') {
        let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
        if decoded == "." || decoded == ".." {
            return Err(AvaandmedError::invalid_param(format!(
                "Path segment '{}' is not allowed",
                segment
            )));
        }
    }
    Ok(())
}
