//! Backend API client
//!
//! Every call gets a fresh bearer token from the session and is sent on its
//! own: no retries, no timeouts, no caching.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;

use crate::auth::SessionManager;
use crate::core::{ChatError, Result};

/// Method, extra headers and JSON body for one API call
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    headers: HeaderMap,
    body: Option<serde_json::Value>,
}

impl ApiRequest {
    /// A `GET` with no body
    pub fn get() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// A `POST` carrying `body` as JSON
    pub fn post(body: serde_json::Value) -> Self {
        Self {
            method: Method::POST,
            headers: HeaderMap::new(),
            body: Some(body),
        }
    }

    /// Add a caller header; `Authorization` and `Content-Type` are always
    /// overwritten by the client
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

impl Default for ApiRequest {
    fn default() -> Self {
        Self::get()
    }
}

/// HTTP client for the agents backend
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for `base_url`
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("foundry-chat/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Base URL every path is appended to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Call `path` with a bearer token from `session` and decode the JSON reply
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        session: &SessionManager,
        path: &str,
        request: ApiRequest,
    ) -> Result<T> {
        let token = session.acquire_access_token().await?;

        let mut headers = request.headers;
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ChatError::auth("Access token is not a valid header value"))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(method = %request.method, %url, "API request");

        let mut builder = self.client.request(request.method, &url).headers(headers);
        if let Some(body) = request.body {
            builder = builder.body(serde_json::to_vec(&body)?);
        }

        let resp = builder.send().await?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(path, status = status.as_u16(), "API request failed");
            return Err(ChatError::api(path, status.as_u16()));
        }

        Ok(resp.json().await?)
    }
}
