use crate::{
    apis::{DatasetApi, OrganizationApi, UserApi},
    auth::{Authentication, Credentials, KeyLoginAuth},
    config::ClientConfig,
    error::{AvaandmedError, AvaandmedResult},
    models::{Envelope, ErrorResponse},
};
use bytes::Bytes;
use futures_util::StreamExt;
use log::{debug, info, warn};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use url::Url;

/// Value returned by [`AvaandmedClient::download`] once the file is written
pub const DOWNLOAD_SUCCESS: i32 = 0;

/// HTTP methods accepted by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    /// Whether a JSON body is sent even when the caller supplied none
    pub fn carries_body(self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main Avaandmed client
///
/// Cheap to clone; clones share the connection pool and authentication.
/// Every call builds its own header set, so one client can serve concurrent
/// tasks.
#[derive(Clone)]
pub struct AvaandmedClient {
    client: Client,
    config: ClientConfig,
    auth: Arc<dyn Authentication>,
}

impl AvaandmedClient {
    /// Create a client for the production portal
    pub fn new(key_id: impl Into<String>, api_key: impl Into<String>) -> AvaandmedResult<Self> {
        Self::with_config(ClientConfig::default(), Credentials::new(key_id, api_key))
    }

    /// Create a client from `AVAANDMED_HOST`, `AVAANDMED_KEY_ID` and `AVAANDMED_KEY`
    pub fn from_env() -> AvaandmedResult<Self> {
        Self::with_config(ClientConfig::from_env()?, Credentials::from_env()?)
    }

    /// Create a client that performs the key-login exchange with `credentials`
    pub fn with_config(config: ClientConfig, credentials: Credentials) -> AvaandmedResult<Self> {
        let client = build_http_client(&config)?;
        let auth = KeyLoginAuth::new(client.clone(), &config, credentials)?;
        Ok(Self::with_client(client, config, auth))
    }

    /// Create a client with a custom authentication scheme
    pub fn with_auth(
        config: ClientConfig,
        auth: impl Authentication + 'static,
    ) -> AvaandmedResult<Self> {
        let client = build_http_client(&config)?;
        Ok(Self::with_client(client, config, auth))
    }

    /// Create a client with a custom reqwest client
    pub fn with_client(
        client: Client,
        config: ClientConfig,
        auth: impl Authentication + 'static,
    ) -> Self {
        Self {
            client,
            config,
            auth: Arc::new(auth),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        self.config.base_url()
    }

    /// Get Dataset API
    pub fn datasets(&self) -> DatasetApi<'_> {
        DatasetApi::new(self)
    }

    /// Get Organization API
    pub fn organizations(&self) -> OrganizationApi<'_> {
        OrganizationApi::new(self)
    }

    /// Get User API
    pub fn users(&self) -> UserApi<'_> {
        UserApi::new(self)
    }

    /// Perform an authenticated request and return the `data` payload
    ///
    /// `path` is relative to the API prefix and may include a query string.
    pub async fn request<T>(&self, method: HttpMethod, path: &str) -> AvaandmedResult<T>
    where
        T: DeserializeOwned,
    {
        let response = self.send(method, path, None).await?;
        decode_envelope(response).await
    }

    /// Perform an authenticated request with a JSON body and return the `data` payload
    pub async fn request_with_body<T, B>(
        &self,
        method: HttpMethod,
        path: &str,
        body: &B,
    ) -> AvaandmedResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        let response = self.send(method, path, Some(body)).await?;
        decode_envelope(response).await
    }

    /// Perform an authenticated request whose response body is not needed
    pub async fn request_ack(&self, method: HttpMethod, path: &str) -> AvaandmedResult<()> {
        self.send(method, path, None).await?;
        Ok(())
    }

    /// Like [`request_ack`](Self::request_ack), with a JSON body
    pub async fn request_ack_with_body<B>(
        &self,
        method: HttpMethod,
        path: &str,
        body: &B,
    ) -> AvaandmedResult<()>
    where
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        self.send(method, path, Some(body)).await?;
        Ok(())
    }

    /// Stream the body of an authenticated GET into `out_file`
    ///
    /// Returns [`DOWNLOAD_SUCCESS`] once every chunk has been written. An
    /// empty destination is rejected before any request is made.
    pub async fn download(&self, path: &str, out_file: impl AsRef<Path>) -> AvaandmedResult<i32> {
        let out_file = out_file.as_ref();
        if out_file.as_os_str().is_empty() {
            return Err(AvaandmedError::invalid_param("File name cannot be empty"));
        }

        info!("Downloading {} to {}", path, out_file.display());
        let response = self.send(HttpMethod::Get, path, None).await?;

        let file = tokio::fs::File::create(out_file).await?;
        match write_body(response, file).await {
            Ok(written) => {
                debug!("Wrote {} bytes to {}", written, out_file.display());
                Ok(DOWNLOAD_SUCCESS)
            }
            Err(err) => {
                warn!("Download to {} failed: {}", out_file.display(), err);
                // A truncated file must not pass for a finished download
                if let Err(remove_err) = tokio::fs::remove_file(out_file).await {
                    warn!("Could not remove {}: {}", out_file.display(), remove_err);
                }
                Err(err)
            }
        }
    }

    /// Headers for one call: content type plus whatever the auth scheme adds
    async fn request_headers(&self) -> AvaandmedResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.auth.apply_auth(&mut headers).await?;
        Ok(headers)
    }

    /// Resolve, authorize and send; non-success statuses become [`AvaandmedError::Api`]
    async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> AvaandmedResult<Response> {
        let url = self.config.api_url(path)?;
        let headers = self.request_headers().await?;

        debug!("HTTP {} {}", method, url);
        let mut request = self
            .client
            .request(method.into(), url.clone())
            .headers(headers);

        match body {
            Some(body) => request = request.json(&body),
            None if method.carries_body() => {
                request = request.json(&serde_json::Value::Object(Default::default()))
            }
            None => {}
        }

        let response = request.send().await?;
        if response.status().is_success() {
            Ok(response)
        } else {
            if response.status() == StatusCode::UNAUTHORIZED {
                self.auth.invalidate();
            }
            Err(api_error_from_response(response, url.as_str()).await)
        }
    }
}

impl fmt::Debug for AvaandmedClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AvaandmedClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn build_http_client(config: &ClientConfig) -> AvaandmedResult<Client> {
    let mut builder = Client::builder().user_agent(concat!(
        env!("CARGO_PKG_NAME"),
        "/",
        env!("CARGO_PKG_VERSION")
    ));

    if let Some(timeout) = config.request_timeout() {
        builder = builder.timeout(timeout);
    }

    Ok(builder.build()?)
}

async fn write_body(response: Response, mut file: tokio::fs::File) -> AvaandmedResult<u64> {
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk: Bytes = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;

    Ok(written)
}

async fn decode_envelope<T>(response: Response) -> AvaandmedResult<T>
where
    T: DeserializeOwned,
{
    let body = response.bytes().await?;
    let envelope: Envelope<T> = serde_json::from_slice(&body)?;
    Ok(envelope.data)
}

/// Turn a non-success response into an API error.
///
/// The message comes from the error envelope; a body that is not JSON or has
/// no message yields `HTTP <status>`.
pub(crate) async fn api_error_from_response(response: Response, uri: &str) -> AvaandmedError {
    let status = response.status();

    let message = match response.bytes().await {
        Ok(body) => serde_json::from_slice::<ErrorResponse>(&body)
            .ok()
            .and_then(|err| err.message_text().or(err.error)),
        Err(_) => None,
    }
    .unwrap_or_else(|| format!("HTTP {}", status));

    warn!("{} returned {}: {}", uri, status.as_u16(), message);
    AvaandmedError::api_error(status.as_u16(), uri, message)
}
