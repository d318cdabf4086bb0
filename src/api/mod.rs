pub mod accounts;
pub mod envelope;
pub mod posts;
pub mod search;
pub mod settings;

use std::time::Duration;

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::{Config, PaginationConfig};
use crate::error::{ClientError, ClientResult};
use crate::session::SessionStore;

pub use envelope::{ApiErrorBody, Page};

/// Typed client for the REST API. Attaches `Authorization: Token <t>` from
/// the session on endpoints that need it.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session: SessionStore,
    pagination: PaginationConfig,
}

impl ApiClient {
    pub fn new(config: &Config, session: SessionStore) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api.timeout_secs))
            .build()?;
        Self::with_http(http, &config.api.base_url, session, config.pagination)
    }

    pub fn with_http(
        http: reqwest::Client,
        base_url: &str,
        session: SessionStore,
        pagination: PaginationConfig,
    ) -> ClientResult<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self {
            http,
            base_url,
            session,
            pagination,
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn pagination(&self) -> PaginationConfig {
        self.pagination
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `<origin>/<segments...>/` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments)
            .push("");
        Ok(url)
    }

    /// Request without credentials (signup, login).
    fn public(&self, method: Method, url: Url) -> RequestBuilder {
        self.http.request(method, url)
    }

    /// Request that carries the token when there is one.
    fn with_session(&self, method: Method, url: Url) -> ClientResult<RequestBuilder> {
        let builder = self.http.request(method, url);
        Ok(match self.session.token()? {
            Some(token) => builder.header(AUTHORIZATION, token_header(&token)?),
            None => builder,
        })
    }

    /// Request that must carry the token; fails before sending when there is none.
    fn authed(&self, method: Method, url: Url) -> ClientResult<RequestBuilder> {
        let token = self.session.token()?.ok_or(ClientError::NotAuthenticated)?;
        Ok(self
            .http
            .request(method, url)
            .header(AUTHORIZATION, token_header(&token)?))
    }

    /// Send and map any non-2xx status to [`ClientError::Api`].
    async fn send(&self, builder: RequestBuilder) -> ClientResult<Response> {
        let request = builder.build()?;
        let method = request.method().clone();
        let path = request.url().path().to_string();

        let response = self.http.execute(request).await?;
        let status = response.status();
        tracing::debug!(%method, %path, status = status.as_u16(), "API response");

        if status.is_success() {
            return Ok(response);
        }

        let bytes = response.bytes().await.unwrap_or_default();
        let body = ApiErrorBody::from_bytes(&bytes);
        tracing::warn!(%method, %path, status = status.as_u16(), error = %body, "API request failed");
        Err(ClientError::Api { status, body })
    }

    async fn json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ClientResult<T> {
        let response = self.send(builder).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// For mutations whose response body is not trusted; the body is read and dropped.
    async fn discard(&self, builder: RequestBuilder) -> ClientResult<()> {
        let response = self.send(builder).await?;
        response.bytes().await?;
        Ok(())
    }
}

fn token_header(token: &str) -> ClientResult<HeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Token {}", token))
        .map_err(|_| ClientError::NotAuthenticated)?;
    value.set_sensitive(true);
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::with_http(
            reqwest::Client::new(),
            base,
            SessionStore::in_memory(),
            PaginationConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn endpoint_appends_trailing_slash() {
        let c = client("http://localhost:8000/");
        let url = c.endpoint(&["api", "posts", "abc", "like"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/posts/abc/like/");
    }

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let c = client("https://example.com/social/");
        let url = c.endpoint(&["api", "search"]).unwrap();
        assert_eq!(url.as_str(), "https://example.com/social/api/search/");
    }

    #[test]
    fn endpoint_encodes_segments() {
        let c = client("http://localhost:8000");
        let url = c.endpoint(&["api", "user", "a b/c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/user/a%20b%2Fc/");
    }

    #[test]
    fn rejects_non_base_url() {
        let result = ApiClient::with_http(
            reqwest::Client::new(),
            "mailto:someone@example.com",
            SessionStore::in_memory(),
            PaginationConfig::default(),
        );
        assert!(matches!(result, Err(ClientError::InvalidBaseUrl(_))));
    }

    #[test]
    fn authed_request_needs_token() {
        let c = client("http://localhost:8000/");
        let url = c.endpoint(&["api", "posts"]).unwrap();
        assert!(matches!(
            c.authed(Method::POST, url),
            Err(ClientError::NotAuthenticated)
        ));
    }

    #[test]
    fn token_is_sent_with_token_scheme() {
        let c = client("http://localhost:8000/");
        c.session().login("abc123", None).unwrap();
        let url = c.endpoint(&["api", "posts"]).unwrap();
        let request = c.authed(Method::GET, url).unwrap().build().unwrap();
        assert_eq!(
            request.headers().get(AUTHORIZATION).unwrap(),
            "Token abc123"
        );
    }

    #[test]
    fn public_request_has_no_credentials() {
        let c = client("http://localhost:8000/");
        c.session().login("abc123", None).unwrap();
        let url = c.endpoint(&["api", "accounts", "login"]).unwrap();
        let request = c.public(Method::POST, url).build().unwrap();
        assert!(request.headers().get(AUTHORIZATION).is_none());
    }
}
