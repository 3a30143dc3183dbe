use crate::error::AppError;
use crate::zendesk::client::{ApiResponse, ViewsApi};
use crate::zendesk::types::{RejectionEnvelope, RejectionError, ViewPayload};

/// A rejected creation, kept raw plus whatever `details.base` could be read.
#[derive(Debug, Clone)]
pub struct Rejection {
    pub status: u16,
    pub raw: String,
    pub errors: Vec<RejectionError>,
}

impl Rejection {
    pub fn from_response(resp: &ApiResponse) -> Self {
        let errors = serde_json::from_str::<RejectionEnvelope>(&resp.body)
            .ok()
            .and_then(|envelope| envelope.details)
            .map(|details| details.base)
            .unwrap_or_default();
        Self {
            status: resp.status,
            raw: resp.body.clone(),
            errors,
        }
    }
}

#[derive(Debug, Clone)]
pub enum CreateOutcome {
    Created,
    Rejected(Rejection),
}

/// A creation is rejected on a non-2xx status, or on a 2xx whose top-level
/// object carries `error` or `details`. Condition values echoed back in a
/// created view never count. Only a body that is not JSON falls back to a
/// text search for the `"error"` token.
pub fn is_rejection(resp: &ApiResponse) -> bool {
    if !resp.is_success() {
        return true;
    }
    match serde_json::from_str::<serde_json::Value>(&resp.body) {
        Ok(serde_json::Value::Object(body)) => {
            body.contains_key("error") || body.contains_key("details")
        }
        Ok(_) => false,
        Err(_) => resp.body.contains("\"error\""),
    }
}

/// Submit `payload` once and judge the answer.
pub async fn submit(api: &dyn ViewsApi, payload: &ViewPayload) -> Result<CreateOutcome, AppError> {
    tracing::info!(title = %payload.view.title, "Attempting to create view");
    let resp = api.create_view(payload).await?;
    tracing::debug!(status = resp.status, body = %resp.body, "Create response");

    if is_rejection(&resp) {
        let rejection = Rejection::from_response(&resp);
        tracing::warn!(
            status = rejection.status,
            errors = rejection.errors.len(),
            "Creating the view returned an error; attempting to handle it"
        );
        Ok(CreateOutcome::Rejected(rejection))
    } else {
        tracing::info!(title = %payload.view.title, "View successfully recreated");
        Ok(CreateOutcome::Created)
    }
}
