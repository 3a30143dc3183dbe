//! Fetch one view, transform it to the creation schema, recreate it.

pub mod creator;
pub mod fetcher;
pub mod remediate;
pub mod retry;
pub mod transform;
pub mod unrecreatable;

#[cfg(test)]
pub(crate) mod testing;

use crate::context::RunContext;
use crate::error::AppError;
use crate::zendesk::client::ViewsApi;

use remediate::Remediator;
use retry::{CopyOutcome, RetryPolicy};

/// One full copy cycle against `api`.
pub async fn copy_last_view(
    api: &dyn ViewsApi,
    remediator: &Remediator,
    policy: &RetryPolicy,
    ctx: &RunContext,
) -> Result<CopyOutcome, AppError> {
    let fetched = fetcher::fetch_views(api).await?;
    tracing::info!(
        pages = fetched.pages.len(),
        views = fetched.pages.iter().map(Vec::len).sum::<usize>(),
        title = %fetched.selected.title,
        "Fetched views"
    );

    let payload = transform::to_payload(&fetched.selected, ctx);
    let outcome = retry::create_with_retry(api, remediator, policy, ctx, payload).await?;

    match &outcome {
        CopyOutcome::Created { attempts, payload } => {
            tracing::info!(attempts, title = %payload.view.title, "Copy complete")
        }
        CopyOutcome::Unrecreatable { attempts } => tracing::warn!(
            attempts,
            path = %ctx.unrecreatable_path().display(),
            "View could not be recreated"
        ),
        CopyOutcome::Exhausted { attempts } => {
            tracing::warn!(attempts, "View was not recreated")
        }
    }
    Ok(outcome)
}
