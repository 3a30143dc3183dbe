use crate::context::RunContext;
use crate::copier::creator::{self, CreateOutcome};
use crate::copier::remediate::Remediator;
use crate::error::AppError;
use crate::zendesk::client::ViewsApi;
use crate::zendesk::types::ViewPayload;

/// Bounds on the create → remediate → create cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total creation calls allowed, first attempt included.
    pub max_attempts: u32,
    /// Give up as soon as a remediation marks the view unrecreatable.
    pub stop_when_unrecreatable: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            stop_when_unrecreatable: true,
        }
    }
}

/// How a copy run ended. None of these are errors.
#[derive(Debug, Clone, PartialEq)]
pub enum CopyOutcome {
    Created { attempts: u32, payload: ViewPayload },
    Unrecreatable { attempts: u32 },
    Exhausted { attempts: u32 },
}

impl CopyOutcome {
    pub fn attempts(&self) -> u32 {
        match self {
            CopyOutcome::Created { attempts, .. }
            | CopyOutcome::Unrecreatable { attempts }
            | CopyOutcome::Exhausted { attempts } => *attempts,
        }
    }
}

/// Create the view, remediating after every rejection and resubmitting while
/// the policy allows. Only transport failures surface as `Err`.
pub async fn create_with_retry(
    api: &dyn ViewsApi,
    remediator: &Remediator,
    policy: &RetryPolicy,
    ctx: &RunContext,
    mut payload: ViewPayload,
) -> Result<CopyOutcome, AppError> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        tracing::info!(attempt = attempts, max_attempts, "Creation attempt");

        let rejection = match creator::submit(api, &payload).await? {
            CreateOutcome::Created => return Ok(CopyOutcome::Created { attempts, payload }),
            CreateOutcome::Rejected(rejection) => rejection,
        };

        let report = remediator.remediate(ctx, &rejection, &mut payload);
        tracing::debug!(?report, "Remediation finished");

        if report.unrecreatable && policy.stop_when_unrecreatable {
            tracing::warn!(attempts, "View cannot be recreated; not retrying");
            return Ok(CopyOutcome::Unrecreatable { attempts });
        }
        if attempts >= max_attempts {
            tracing::warn!(attempts, "Retry limit reached; giving up on this view");
            return Ok(if report.unrecreatable {
                CopyOutcome::Unrecreatable { attempts }
            } else {
                CopyOutcome::Exhausted { attempts }
            });
        }
    }
}
