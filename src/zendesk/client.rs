use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use zeroize::Zeroizing;

use crate::config::Credentials;
use crate::error::AppError;
use crate::zendesk::types::ViewPayload;

// ============================================================================
// Helper
// ============================================================================

fn zendesk_err(e: impl std::fmt::Display) -> AppError {
    AppError::Http(e.to_string())
}

/// Status and raw body of a creation request. Rejections are judged by the
/// caller, which needs the text either way.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// ============================================================================
// Trait
// ============================================================================

/// The two view endpoints the copier talks to.
#[async_trait]
pub trait ViewsApi: Send + Sync {
    /// Absolute URL of the first listing page.
    fn views_url(&self) -> String;

    /// `GET` one listing page (first page or a `next_page` cursor).
    async fn fetch_views_page(&self, url: &str) -> Result<serde_json::Value, AppError>;

    /// `POST /views.json`.
    async fn create_view(&self, payload: &ViewPayload) -> Result<ApiResponse, AppError>;
}

// ============================================================================
// ZendeskClient
// ============================================================================

/// HTTP session against the Zendesk REST API v2.
pub struct ZendeskClient {
    http: reqwest::Client,
    base_url: url::Url,
    username: String,
    api_token: Zeroizing<String>,
}

impl ZendeskClient {
    /// Build an authenticated session. Failure here is fatal for the run.
    ///
    /// Uses API token auth: username `{email}/token`, password the token.
    pub fn new(base_url: url::Url, credentials: &Credentials) -> Result<Self, AppError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .default_headers(headers)
            .build()
            .map_err(|e| AppError::Session(format!("Failed to build HTTP client: {e}")))?;

        tracing::info!(base_url = %base_url, "Session established");

        Ok(Self {
            http,
            base_url,
            username: format!("{}/token", credentials.email),
            api_token: credentials.api_token.clone(),
        })
    }

    fn authed(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .basic_auth(&self.username, Some(self.api_token.as_str()))
    }
}

#[async_trait]
impl ViewsApi for ZendeskClient {
    fn views_url(&self) -> String {
        // `base_url` always ends in '/', so join appends rather than replaces.
        self.base_url
            .join("views.json")
            .map(|u| u.to_string())
            .unwrap_or_else(|_| format!("{}views.json", self.base_url))
    }

    async fn fetch_views_page(&self, url: &str) -> Result<serde_json::Value, AppError> {
        let resp = self
            .authed(reqwest::Method::GET, url)
            .send()
            .await
            .map_err(zendesk_err)?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::Http(format!(
                "Zendesk API error ({}): {}",
                status, body
            )));
        }
        resp.json().await.map_err(zendesk_err)
    }

    async fn create_view(&self, payload: &ViewPayload) -> Result<ApiResponse, AppError> {
        let url = self.views_url();
        let resp = self
            .authed(reqwest::Method::POST, &url)
            .json(payload)
            .send()
            .await
            .map_err(zendesk_err)?;
        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(zendesk_err)?;
        Ok(ApiResponse { status, body })
    }
}
