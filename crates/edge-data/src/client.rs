//! Query clients.

use std::time::Instant;

use async_trait::async_trait;
use edge_core::StorefrontConfig;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::query::{GraphQlResponse, Query, QueryContext};
use crate::timeout::TimeoutConfig;

/// Header carrying the public storefront token.
pub const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Storefront-Access-Token";

/// Error type for query operations.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP error: {status} for {query}")]
    Http { status: u16, query: String },

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("GraphQL error in {query}: {message}")]
    GraphQl { query: String, message: String },

    #[error("Deserialization error in {query}: {message}")]
    Deserialization { query: String, message: String },

    #[error("Request error: {0}")]
    Request(String),
}

impl FetchError {
    /// Whether the backend could not be reached at all.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Connection(_))
    }

    fn from_reqwest(query: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(format!("{}: {}", query, err))
        } else if err.is_connect() {
            Self::Connection(format!("{}: {}", query, err))
        } else if err.is_decode() {
            Self::Deserialization {
                query: query.to_string(),
                message: err.to_string(),
            }
        } else {
            Self::Request(format!("{}: {}", query, err))
        }
    }
}

/// Executes queries against the commerce backend.
///
/// Calls are independent: implementations must not order or share state
/// between concurrent `execute` calls.
#[async_trait]
pub trait QueryClient: Send + Sync {
    /// Execute a query and return its `data` payload.
    async fn execute(&self, query: &Query, ctx: &QueryContext) -> Result<Value, FetchError>;
}

impl dyn QueryClient {
    /// Execute a query and decode its payload into `T`.
    pub async fn query<T: DeserializeOwned>(
        &self,
        query: &Query,
        ctx: &QueryContext,
    ) -> Result<T, FetchError> {
        let data = self.execute(query, ctx).await?;
        serde_json::from_value(data).map_err(|e| FetchError::Deserialization {
            query: query.name().to_string(),
            message: e.to_string(),
        })
    }
}

/// GraphQL-over-HTTP client for the storefront API.
#[derive(Debug, Clone)]
pub struct StorefrontClient {
    http: reqwest::Client,
    endpoint: String,
    access_token: String,
    timeout: TimeoutConfig,
}

impl StorefrontClient {
    /// Create a client for an endpoint with the given timeouts.
    pub fn new(
        endpoint: impl Into<String>,
        access_token: impl Into<String>,
        timeout: TimeoutConfig,
    ) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder();
        if let Some(connect) = timeout.connect {
            builder = builder.connect_timeout(connect);
        }
        if let Some(total) = timeout.total {
            builder = builder.timeout(total);
        }
        let http = builder
            .build()
            .map_err(|e| FetchError::Request(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
            access_token: access_token.into(),
            timeout,
        })
    }

    /// Create a client from storefront configuration.
    pub fn from_config(config: &StorefrontConfig) -> Result<Self, FetchError> {
        Self::new(
            config.graphql_endpoint(),
            config.public_access_token.clone(),
            TimeoutConfig::from_optional(config.request_timeout()),
        )
    }

    /// The GraphQL endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The configured timeouts.
    pub fn timeout(&self) -> TimeoutConfig {
        self.timeout
    }
}

#[async_trait]
impl QueryClient for StorefrontClient {
    async fn execute(&self, query: &Query, ctx: &QueryContext) -> Result<Value, FetchError> {
        let started = Instant::now();
        let body = query.to_request_body(ctx);

        let response = self
            .http
            .post(&self.endpoint)
            .header(ACCESS_TOKEN_HEADER, &self.access_token)
            .header("x-request-id", ctx.request_id.as_str())
            .json(&body)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(query.name(), e))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            return Err(FetchError::Http {
                status,
                query: query.name().to_string(),
            });
        }

        let envelope: GraphQlResponse = response
            .json()
            .await
            .map_err(|e| FetchError::from_reqwest(query.name(), e))?;

        tracing::debug!(
            request_id = %ctx.request_id,
            query = query.name(),
            status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "storefront query completed"
        );

        envelope.into_data(query.name())
    }
}
