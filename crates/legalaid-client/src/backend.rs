//! Backend abstraction and its HTTP implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use legalaid_core::config::BackendConfig;
use legalaid_core::Category;

use crate::error::ClientError;
use crate::wire::{
    CategoriesResponse, HealthStatus, QueryRequest, QueryResponse, ScenarioRequest,
    ScenarioResponse,
};

/// The legal guidance service, consumed as a black-box request/response API.
///
/// Implementations report every transport or protocol failure as a
/// [`ClientError`]; recovering from those is the caller's job.
#[async_trait]
pub trait LegalBackend: Send + Sync {
    /// `POST /query`
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, ClientError>;

    /// `POST /scenarios`
    async fn scenarios(&self, category: Category) -> Result<ScenarioResponse, ClientError>;

    /// `GET /health`
    async fn health(&self) -> Result<HealthStatus, ClientError>;

    /// `GET /categories`
    async fn categories(&self) -> Result<Vec<String>, ClientError>;
}

/// [`LegalBackend`] over HTTP/JSON.
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    /// Create a backend rooted at `base_url`.
    ///
    /// `timeout` of `None` leaves requests unbounded on the client side.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ClientError> {
        let base_url = parse_base_url(base_url)?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    /// Create a backend from the `[backend]` config section.
    pub fn from_config(config: &BackendConfig) -> Result<Self, ClientError> {
        let timeout = match config.request_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        Self::new(&config.base_url, timeout)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidUrl(format!("{}{}: {}", self.base_url, path, e)))
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, ClientError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        tracing::debug!(url = %url, "POST");
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        decode(response).await
    }

    async fn get_json<R>(&self, path: &str) -> Result<R, ClientError>
    where
        R: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        tracing::debug!(url = %url, "GET");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        decode(response).await
    }
}

#[async_trait]
impl LegalBackend for HttpBackend {
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, ClientError> {
        self.post_json("query", request).await
    }

    async fn scenarios(&self, category: Category) -> Result<ScenarioResponse, ClientError> {
        self.post_json("scenarios", &ScenarioRequest { category }).await
    }

    async fn health(&self) -> Result<HealthStatus, ClientError> {
        self.get_json("health").await
    }

    async fn categories(&self) -> Result<Vec<String>, ClientError> {
        let body: CategoriesResponse = self.get_json("categories").await?;
        Ok(body.categories)
    }
}

async fn decode<R: DeserializeOwned>(response: reqwest::Response) -> Result<R, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::Status {
            status: status.as_u16(),
            body,
        });
    }
    response
        .json::<R>()
        .await
        .map_err(|e| ClientError::Decode(e.to_string()))
}

/// Parse the base URL, ensuring relative joins land beneath it.
fn parse_base_url(raw: &str) -> Result<Url, ClientError> {
    let mut normalized = raw.trim().to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    let url = Url::parse(&normalized).map_err(|e| ClientError::InvalidUrl(format!("{raw}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ClientError::InvalidUrl(format!(
            "{raw}: unsupported scheme '{other}'"
        ))),
    }
}
