use std::sync::Arc;

use anyhow::{Context, Result};
use futures::future::BoxFuture;
use reqwest::{Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

use globy_core::config::validate_base_url;
use globy_core::error::Error;
use globy_core::session::SessionStore;
use globy_core::traits::SearchTransport;
use globy_core::types::{ErrorBody, GalleryImage, ImageItem, SearchResponse, UploadOutcome};

/// HTTP client for the GLOBY backend. Cheap to clone; attaches the session
/// bearer token to every request when one is present.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    access_token: String,
}

#[derive(Serialize)]
struct UploadRequest<'a> {
    image_url: &'a str,
}

/// The backend replies with caption/tags only; the hosted URL is already
/// known client-side and is folded into the outcome.
#[derive(Deserialize)]
struct UploadResponse {
    #[serde(default)]
    caption: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, session: Arc<SessionStore>) -> Result<Self> {
        validate_base_url(base_url)?;
        let http = reqwest::Client::builder()
            .build()
            .context("build http client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut rb = self.http.request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = self.session.token() {
            rb = rb.bearer_auth(token);
        }
        rb
    }

    /// `GET /search?query=...`
    pub async fn search(&self, query: &str) -> Result<Vec<ImageItem>> {
        debug!(%query, "searching");
        let resp = self
            .request(Method::GET, "/search")
            .query(&[("query", query)])
            .send()
            .await
            .context("search request")?;
        let resp = Self::check(resp).await?;
        let body: SearchResponse = resp.json().await.context("decode search response")?;
        Ok(body.results)
    }

    /// `GET /gallery`
    pub async fn gallery(&self) -> Result<Vec<GalleryImage>> {
        let resp = self
            .request(Method::GET, "/gallery")
            .send()
            .await
            .context("gallery request")?;
        let resp = Self::check(resp).await?;
        resp.json().await.context("decode gallery response")
    }

    /// `POST /users/login`. On success the access token is stored in the
    /// session store and returned.
    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let resp = self
            .request(Method::POST, "/users/login")
            .json(&LoginRequest { email, password })
            .send()
            .await
            .context("login request")?;
        let resp = Self::check(resp).await?;
        let body: LoginResponse = resp.json().await.context("decode login response")?;
        self.session.set_token(body.access_token.clone());
        Ok(body.access_token)
    }

    /// `POST /photos/upload` — tell the backend a hosted upload finished so
    /// it can caption and tag the image.
    pub async fn complete_upload(&self, image_url: &str) -> Result<UploadOutcome> {
        let resp = self
            .request(Method::POST, "/photos/upload")
            .json(&UploadRequest { image_url })
            .send()
            .await
            .context("upload completion request")?;
        let resp = Self::check(resp).await?;
        let body: UploadResponse = resp.json().await.context("decode upload response")?;
        Ok(UploadOutcome {
            image_url: image_url.to_string(),
            caption: body.caption,
            tags: body.tags,
        })
    }

    /// Map non-2xx to `Error::RequestFailed`, preferring the backend's
    /// `detail` message over the bare HTTP status.
    async fn check(resp: Response) -> Result<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let detail = resp
            .json::<ErrorBody>()
            .await
            .map(|b| b.detail)
            .unwrap_or_else(|_| format!("HTTP {}", status));
        debug!(%status, %detail, "request failed");
        Err(Error::RequestFailed(detail).into())
    }
}

impl SearchTransport for ApiClient {
    fn search(&self, query: &str) -> BoxFuture<'static, Result<Vec<ImageItem>>> {
        let client = self.clone();
        let query = query.to_string();
        Box::pin(async move { client.search(&query).await })
    }
}
