// Hand-crafted async HTTP client for the AgriFleet dashboard backend.
//
// Base path: /api/
// Auth: `Authorization: Bearer <token>` header, resolved per request
// from a TokenStore so credential changes apply without a rebuild.

use std::sync::Arc;

use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tracing::{debug, warn};
use url::Url;

use crate::error::Error;
use crate::token::TokenStore;
use crate::transport::TransportConfig;

// ── Wire envelopes ───────────────────────────────────────────────────

/// Error response shape from the backend.
#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

// ── Session observability ────────────────────────────────────────────

/// Whether the stored credential is still believed valid.
///
/// Flips to `Expired` when any request comes back 401; the embedding
/// application watches this to route the user back to its login boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Expired,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the AgriFleet backend REST API.
///
/// Thin facade shared by every domain service: URL resolution, bearer
/// attachment, uniform error normalization, and the global 401 side
/// effect (credential clear + session-expiry broadcast). Individual
/// services never see raw transport failures.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    tokens: Arc<dyn TokenStore>,
    session: watch::Sender<SessionState>,
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a base URL, transport config, and token store.
    pub fn new(
        base_url: &str,
        transport: &TransportConfig,
        tokens: Arc<dyn TokenStore>,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, Url::parse(base_url)?, tokens))
    }

    /// Wrap an existing `reqwest::Client` (caller manages transport).
    pub fn with_client(http: reqwest::Client, base_url: Url, tokens: Arc<dyn TokenStore>) -> Self {
        let (session, _) = watch::channel(SessionState::Active);
        Self {
            http,
            base_url: normalize_base_url(base_url),
            tokens,
            session,
        }
    }

    /// Subscribe to session-state changes (401 detection).
    pub fn session_state(&self) -> watch::Receiver<SessionState> {
        self.session.subscribe()
    }

    /// Mark the session active again, e.g. after a fresh token was stored.
    pub fn reset_session(&self) {
        let _ = self.session.send(SessionState::Active);
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"api/robots"`) onto the base URL.
    fn url(&self, path: &str) -> Url {
        // base_url always ends with `/`, so joining `api/…` works.
        self.base_url
            .join(path)
            .expect("path should be a valid relative URL")
    }

    /// Start a request with the bearer token attached when present.
    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        let builder = self.http.request(method, url);
        match self.tokens.get() {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path);
        debug!("GET {url}");

        let resp = self.request(reqwest::Method::GET, url).send().await?;
        self.handle_response(resp).await
    }

    pub async fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(path);
        debug!("GET {url} params={params:?}");

        let resp = self
            .request(reqwest::Method::GET, url)
            .query(params)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    /// GET a paginated listing. The backend returns the full page envelope
    /// (`data`, `total`, `page`, `limit`, `hasNext`, `hasPrev`).
    pub async fn get_paginated<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Page<T>, Error> {
        self.get_with_params(path, params).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path);
        debug!("POST {url}");

        let resp = self
            .request(reqwest::Method::POST, url)
            .json(body)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    pub async fn post_no_body<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path);
        debug!("POST {url}");

        let resp = self.request(reqwest::Method::POST, url).send().await?;
        self.handle_response(resp).await
    }

    /// POST where the response body is ignored (command acknowledgements).
    pub async fn post_empty<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<(), Error> {
        let url = self.url(path);
        debug!("POST {url}");

        let resp = self
            .request(reqwest::Method::POST, url)
            .json(body)
            .send()
            .await?;
        self.handle_empty(resp).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path);
        debug!("PUT {url}");

        let resp = self
            .request(reqwest::Method::PUT, url)
            .json(body)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    pub async fn put_no_body<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path);
        debug!("PUT {url}");

        let resp = self.request(reqwest::Method::PUT, url).send().await?;
        self.handle_response(resp).await
    }

    /// PUT where the response body is ignored.
    pub async fn put_empty<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<(), Error> {
        let url = self.url(path);
        debug!("PUT {url}");

        let resp = self
            .request(reqwest::Method::PUT, url)
            .json(body)
            .send()
            .await?;
        self.handle_empty(resp).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), Error> {
        let url = self.url(path);
        debug!("DELETE {url}");

        let resp = self.request(reqwest::Method::DELETE, url).send().await?;
        self.handle_empty(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview = &body[..body.len().min(200)];
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn handle_empty(&self, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            // Session is gone: drop the credential and tell the app.
            self.tokens.clear();
            if self.session.send(SessionState::Expired).is_err() {
                warn!("session watch closed before 401 could be broadcast");
            }
            return Error::Unauthorized;
        }

        let raw = resp.text().await.unwrap_or_default();

        let message = serde_json::from_str::<ErrorResponse>(&raw)
            .ok()
            .and_then(|err| err.message)
            .unwrap_or_else(|| {
                if raw.is_empty() {
                    status.to_string()
                } else {
                    raw.clone()
                }
            });

        Error::Api {
            status: status.as_u16(),
            message,
        }
    }
}

/// Ensure the base URL ends with a trailing slash so `Url::join` keeps
/// the full path instead of replacing its last segment.
fn normalize_base_url(mut url: Url) -> Url {
    let path = url.path().trim_end_matches('/').to_owned();
    url.set_path(&format!("{path}/"));
    url
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::token::InMemoryTokenStore;

    fn client(base: &str) -> ApiClient {
        ApiClient::with_client(
            reqwest::Client::new(),
            Url::parse(base).unwrap(),
            Arc::new(InMemoryTokenStore::new()),
        )
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        let c = client("http://localhost:5000");
        assert_eq!(c.url("api/robots").as_str(), "http://localhost:5000/api/robots");
    }

    #[test]
    fn base_url_with_prefix_keeps_prefix() {
        let c = client("http://gateway.local/fleet");
        assert_eq!(
            c.url("api/robots").as_str(),
            "http://gateway.local/fleet/api/robots"
        );
    }
}
