use crate::error::FetchError;
use crate::zendesk::client::ViewsApi;
use crate::zendesk::types::{ViewRecord, ViewsPage};

/// Result of walking the listing endpoint to its last page.
#[derive(Debug, Clone)]
pub struct FetchedViews {
    /// Last view of the final page: the one this run copies.
    pub selected: ViewRecord,
    /// Every page in request order, undecoded.
    pub pages: Vec<Vec<serde_json::Value>>,
}

/// Decode one listing page, naming the missing piece when the shape is off.
pub fn decode_page(page: u32, raw: serde_json::Value) -> Result<ViewsPage, FetchError> {
    for key in ["count", "views"] {
        if raw.get(key).is_none() {
            return Err(FetchError::Malformed {
                page,
                reason: format!("missing \"{key}\""),
            });
        }
    }
    serde_json::from_value(raw).map_err(|e| FetchError::Malformed {
        page,
        reason: e.to_string(),
    })
}

/// Follow `next_page` until it runs out, accumulating every page.
pub async fn fetch_views(api: &dyn ViewsApi) -> Result<FetchedViews, FetchError> {
    let mut pages: Vec<Vec<serde_json::Value>> = Vec::new();
    let mut url = Some(api.views_url());
    let mut cycle: u32 = 1;

    while let Some(current) = url.take() {
        let raw = api
            .fetch_views_page(&current)
            .await
            .map_err(|e| FetchError::Http(e.to_string()))?;
        let page = decode_page(cycle, raw)?;

        tracing::info!(
            cycle,
            received = page.views.len(),
            total = page.count,
            "Fetched views page"
        );

        match page.next_page.filter(|next| !next.is_empty()) {
            Some(next) => {
                tracing::info!(next = %next, "Following next page");
                url = Some(next);
            }
            None => tracing::info!(cycle, "No next page; this is the last one"),
        }

        pages.push(page.views);
        cycle += 1;
    }

    let raw = pages
        .last()
        .and_then(|views| views.last())
        .cloned()
        .ok_or(FetchError::NoViews)?;
    let selected: ViewRecord =
        serde_json::from_value(raw).map_err(|e| FetchError::Malformed {
            page: cycle - 1,
            reason: format!("selected view: {e}"),
        })?;
    tracing::debug!(view = ?selected, "Selected view to copy");

    Ok(FetchedViews { selected, pages })
}
