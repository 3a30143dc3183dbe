//! In-memory `ViewsApi` used by the copier tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::AppError;
use crate::zendesk::client::{ApiResponse, ViewsApi};
use crate::zendesk::types::ViewPayload;

pub const VIEWS_URL: &str = "https://acme.test/api/v2/views.json";

#[derive(Default)]
pub struct FakeApi {
    pages: Mutex<VecDeque<serde_json::Value>>,
    responses: Mutex<VecDeque<ApiResponse>>,
    urls: Mutex<Vec<String>>,
    submitted: Mutex<Vec<ViewPayload>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pages(self, pages: Vec<serde_json::Value>) -> Self {
        *self.pages.lock().unwrap() = pages.into();
        self
    }

    /// Queue creation responses; each `create_view` pops one.
    pub fn with_responses(self, responses: Vec<(u16, serde_json::Value)>) -> Self {
        *self.responses.lock().unwrap() = responses
            .into_iter()
            .map(|(status, body)| ApiResponse {
                status,
                body: body.to_string(),
            })
            .collect();
        self
    }

    pub fn page_requests(&self) -> usize {
        self.urls.lock().unwrap().len()
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }

    pub fn submitted(&self) -> Vec<ViewPayload> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl ViewsApi for FakeApi {
    fn views_url(&self) -> String {
        VIEWS_URL.to_string()
    }

    async fn fetch_views_page(&self, url: &str) -> Result<serde_json::Value, AppError> {
        self.urls.lock().unwrap().push(url.to_string());
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AppError::Http("no more pages queued".into()))
    }

    async fn create_view(&self, payload: &ViewPayload) -> Result<ApiResponse, AppError> {
        self.submitted.lock().unwrap().push(payload.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AppError::Http("no more responses queued".into()))
    }
}

/// Rejection body the way Zendesk shapes it.
pub fn rejection(descriptions: &[&str]) -> serde_json::Value {
    let base: Vec<serde_json::Value> = descriptions
        .iter()
        .map(|d| serde_json::json!({ "description": d, "error": "InvalidValue" }))
        .collect();
    serde_json::json!({
        "error": "RecordInvalid",
        "description": "Record validation errors",
        "details": { "base": base }
    })
}
