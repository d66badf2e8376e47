//! Client for the Logz.io log shipping tokens API.
//!
//! [`TokenSource`] is the seam the resolver talks to; [`LogShippingTokensClient`]
//! is the HTTP implementation used in production.

use std::sync::Arc;

use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::error::ProviderError;
use crate::types::{
    LogShippingToken, RetrieveLogShippingTokensRequest, RetrieveLogShippingTokensResponse,
};

/// Header carrying the API token on every request.
pub const API_TOKEN_HEADER: &str = "X-API-TOKEN";

const TOKENS_PATH: &str = "v1/log-shipping/tokens";

/// Longest slice of an error body we log or keep in an error.
const MAX_ERROR_BODY_LENGTH: usize = 200;

/// The two remote operations token lookups are built from.
#[async_trait::async_trait]
pub trait TokenSource: Send + Sync {
    /// Fetch a single token by id.
    async fn get_log_shipping_token(&self, id: i32) -> Result<LogShippingToken, ProviderError>;

    /// Fetch one page of tokens matching the request's filter.
    async fn retrieve_log_shipping_tokens(
        &self,
        request: &RetrieveLogShippingTokensRequest,
    ) -> Result<RetrieveLogShippingTokensResponse, ProviderError>;
}

#[async_trait::async_trait]
impl<T: TokenSource + ?Sized> TokenSource for Arc<T> {
    async fn get_log_shipping_token(&self, id: i32) -> Result<LogShippingToken, ProviderError> {
        (**self).get_log_shipping_token(id).await
    }

    async fn retrieve_log_shipping_tokens(
        &self,
        request: &RetrieveLogShippingTokensRequest,
    ) -> Result<RetrieveLogShippingTokensResponse, ProviderError> {
        (**self).retrieve_log_shipping_tokens(request).await
    }
}

/// HTTP client for `/v1/log-shipping/tokens`.
#[derive(Clone)]
pub struct LogShippingTokensClient {
    http: Client,
    base_url: Url,
    api_token: String,
}

impl LogShippingTokensClient {
    /// Create a client for the given API token and endpoint.
    pub fn new(api_token: impl Into<String>, base_url: &str) -> Result<Self, ProviderError> {
        let api_token = api_token.into();
        if api_token.is_empty() {
            return Err(ProviderError::Configuration(
                "API token must not be empty".to_string(),
            ));
        }

        // A trailing slash keeps `join` from dropping the last path segment.
        let base_url = Url::parse(&format!("{}/", base_url.trim_end_matches('/'))).map_err(
            |e| ProviderError::Configuration(format!("invalid base URL '{}': {}", base_url, e)),
        )?;

        let http = Client::builder()
            .user_agent(concat!("logzio-provider/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            api_token,
        })
    }

    /// The endpoint this client talks to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url, ProviderError> {
        self.base_url
            .join(path)
            .map_err(|e| ProviderError::Configuration(format!("invalid request path: {}", e)))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ProviderError> {
        let response = request
            .header(API_TOKEN_HEADER, &self.api_token)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = truncate_body(&body);
            error!(status = status.as_u16(), body = %message, "Logz.io API request failed");
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait::async_trait]
impl TokenSource for LogShippingTokensClient {
    async fn get_log_shipping_token(&self, id: i32) -> Result<LogShippingToken, ProviderError> {
        let url = self.url(&format!("{}/{}", TOKENS_PATH, id))?;
        debug!(%url, "GET log shipping token");
        self.send(self.http.get(url)).await
    }

    async fn retrieve_log_shipping_tokens(
        &self,
        request: &RetrieveLogShippingTokensRequest,
    ) -> Result<RetrieveLogShippingTokensResponse, ProviderError> {
        let url = self.url(&format!("{}/search", TOKENS_PATH))?;
        debug!(
            %url,
            page = request.pagination.page_number,
            enabled = request.filter.enabled,
            "POST log shipping token search"
        );
        self.send(self.http.post(url).json(request)).await
    }
}

fn truncate_body(body: &str) -> String {
    let cleaned: String = body
        .chars()
        .filter(|c| !c.is_control() || *c == ' ')
        .collect();
    if cleaned.chars().count() > MAX_ERROR_BODY_LENGTH {
        let head: String = cleaned.chars().take(MAX_ERROR_BODY_LENGTH).collect();
        format!("{}... [truncated]", head)
    } else {
        cleaned
    }
}
