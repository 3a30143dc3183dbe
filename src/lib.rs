pub mod config;
pub mod context;
pub mod copier;
pub mod error;
pub mod logging;
pub mod zendesk;

use tracing::Instrument;

use config::Config;
use context::RunContext;
use copier::remediate::Remediator;
use copier::retry::CopyOutcome;
use copier::unrecreatable::UnrecreatableLog;
use error::AppError;
use zendesk::client::ZendeskClient;

/// Copy the last listed view once. Session, configuration and fetch failures
/// are the only errors; a view that could not be recreated is a normal outcome.
pub async fn run(config: &Config, ctx: &RunContext) -> Result<CopyOutcome, AppError> {
    async {
        tracing::info!(started_at = %ctx.timestamp(), "New copy cycle starting");

        let client = ZendeskClient::new(config.base_url.clone(), &config.credentials)?;
        let remediator = Remediator::standard(config.group_filter, UnrecreatableLog::for_run(ctx));

        copier::copy_last_view(&client, &remediator, &config.retry, ctx).await
    }
    .instrument(ctx.span().clone())
    .await
}
