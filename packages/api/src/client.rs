//! Thin wrapper over `reqwest` that knows the backend base URL and the
//! caller's access token.
//!
//! Every service module (`auth`, `boards`, `cards`, ...) adds methods to
//! [`ApiClient`] through its own `impl` block, so a single cloned client is
//! all a view needs.

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use store::ClientConfig;

use crate::ApiError;

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            token: None,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.base_url())
    }

    /// Same client, authenticated with `token` (or anonymous with `None`).
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Request without credentials (login, register).
    pub(crate) fn anonymous(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    /// Request carrying `Authorization: Bearer <token>`. Fails before any I/O
    /// when the client has no token.
    pub(crate) fn authorized(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let token = self.token.as_deref().ok_or(ApiError::MissingToken)?;
        Ok(self.http.request(method, self.url(path)).bearer_auth(token))
    }

    /// Send and decode a JSON body, mapping non-2xx statuses to [`ApiError`].
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let text = self.send_text(request).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Send and discard the body of a successful response.
    pub(crate) async fn send_unit(&self, request: RequestBuilder) -> Result<(), ApiError> {
        self.send_text(request).await.map(|_| ())
    }

    async fn send_text(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().path().to_string();
        let text = response.text().await?;
        if status.is_success() {
            tracing::debug!(%url, status = status.as_u16(), "request ok");
            Ok(text)
        } else {
            tracing::warn!(%url, status = status.as_u16(), "request failed");
            Err(ApiError::from_status(status, &text))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalized() {
        let client = ApiClient::new("http://localhost:5000/");
        assert_eq!(client.url("/auth/me"), "http://localhost:5000/auth/me");
    }

    #[test]
    fn test_empty_token_is_anonymous() {
        let client = ApiClient::new("http://x").with_token(Some(String::new()));
        assert!(client.token().is_none());
        assert!(matches!(
            client.authorized(Method::GET, "/board/getMyBoards"),
            Err(ApiError::MissingToken)
        ));
    }
}
