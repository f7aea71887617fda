//! HTTP client for the MiniCRUD API.
//!
//! Every call resolves to a [`Response`] envelope: failures of any kind end up
//! in `message`, never as a panic or an `Err`.

use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// Primary and fallback environment keys for the API base address.
pub const BASE_URL_KEYS: [&str; 2] = [
    "services__minicrud-api__http__0",
    "services__minicrud_api__http__0",
];

/// Result envelope of one API call. Success iff `message` is `None`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response<T> {
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> Response<T> {
    pub fn success(data: T) -> Self {
        Response {
            data: Some(data),
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Response {
            data: None,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.message.is_none()
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("API base address is not set (services__minicrud-api__http__0 or fallback)")]
    MissingBaseUrl,
    #[error("invalid API base address {value:?}: {source}")]
    InvalidBaseUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("http client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Why a single call failed; always folded into [`Response::message`].
#[derive(Debug, Error)]
enum CallError {
    /// Non-success status; the body is passed through verbatim.
    #[error("{0}")]
    Status(String),
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid route {route:?}: {source}")]
    Route { route: String, source: url::ParseError },
    #[error("could not encode request body: {0}")]
    Encode(serde_json::Error),
    #[error("could not decode response body: {0}")]
    Decode(serde_json::Error),
}

struct Inner {
    http: reqwest::Client,
    base: Url,
}

/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base", &self.inner.base.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(base: &str) -> Result<Self, ClientError> {
        let mut base_url = Url::parse(base).map_err(|source| ClientError::InvalidBaseUrl {
            value: base.to_string(),
            source,
        })?;
        // Relative routes join under the base path only with a trailing slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let http = reqwest::Client::builder().build()?;
        Ok(ApiClient {
            inner: Arc::new(Inner { http, base: base_url }),
        })
    }

    /// Resolve the base address from the environment once, at construction.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ClientError> {
        let base = BASE_URL_KEYS
            .iter()
            .find_map(|key| lookup(key).filter(|v| !v.trim().is_empty()))
            .ok_or(ClientError::MissingBaseUrl)?;
        Self::new(base.trim())
    }

    pub fn base_url(&self) -> &Url {
        &self.inner.base
    }

    pub async fn get<T: DeserializeOwned>(&self, route: &str) -> Response<T> {
        self.run(Method::GET, route, None).await
    }

    pub async fn post<T, A>(&self, route: &str, arg: &A) -> Response<T>
    where
        T: DeserializeOwned,
        A: Serialize + ?Sized,
    {
        let body = serde_json::to_vec(arg).map_err(CallError::Encode);
        self.run(Method::POST, route, Some(body)).await
    }

    /// PUT without a body.
    pub async fn put_empty<T: DeserializeOwned>(&self, route: &str) -> Response<T> {
        self.run(Method::PUT, route, None).await
    }

    pub async fn put<T, A>(&self, route: &str, arg: &A) -> Response<T>
    where
        T: DeserializeOwned,
        A: Serialize + ?Sized,
    {
        let body = serde_json::to_vec(arg).map_err(CallError::Encode);
        self.run(Method::PUT, route, Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, route: &str) -> Response<T> {
        self.run(Method::DELETE, route, None).await
    }

    async fn run<T: DeserializeOwned>(
        &self,
        method: Method,
        route: &str,
        body: Option<Result<Vec<u8>, CallError>>,
    ) -> Response<T> {
        match self.call(method.clone(), route, body).await {
            Ok(data) => Response::success(data),
            Err(err) => {
                tracing::warn!(%method, route, error = %err, "api call failed");
                Response::failure(err.to_string())
            }
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        route: &str,
        body: Option<Result<Vec<u8>, CallError>>,
    ) -> Result<T, CallError> {
        let url = self
            .inner
            .base
            .join(route.trim_start_matches('/'))
            .map_err(|source| CallError::Route {
                route: route.to_string(),
                source,
            })?;
        let mut request = self.inner.http.request(method, url);
        if let Some(bytes) = body.transpose()? {
            request = request.header(CONTENT_TYPE, "application/json").body(bytes);
        }
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(CallError::Status(text));
        }
        let value = if text.trim().is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(&text).map_err(CallError::Decode)?
        };
        minicrud::json::from_value(value).map_err(CallError::Decode)
    }
}
