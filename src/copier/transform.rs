//! Read-form → write-form mapping for views.
//!
//! The listing endpoint exports `conditions` and `execution`; the creation
//! endpoint wants `all` / `any` at the top level and an `output` block whose
//! columns are bare ids. Pure apart from log lines.

use crate::context::RunContext;
use crate::zendesk::types::{ColumnId, NewView, ViewOutput, ViewPayload, ViewRecord};

/// Marker that identifies a copy. Matched as a case-sensitive substring.
pub const COPY_MARKER: &str = "COPY";

/// Append `" COPY"` unless the marker already appears anywhere in the title.
///
/// Substring match, so `"COPYCAT"` is left alone as well.
pub fn copy_title(title: &str) -> String {
    if title.contains(COPY_MARKER) {
        title.to_string()
    } else {
        format!("{} {}", title, COPY_MARKER)
    }
}

pub fn default_description(ctx: &RunContext) -> String {
    format!("Copied on {}", ctx.timestamp())
}

/// Build the creation payload for `view`.
pub fn to_payload(view: &ViewRecord, ctx: &RunContext) -> ViewPayload {
    tracing::info!(title = %view.title, "Transforming view");

    let all = match &view.conditions.all {
        Some(all) => all.clone(),
        None => {
            tracing::warn!(title = %view.title, "View has no \"all\" conditions; creation will likely be rejected");
            Vec::new()
        }
    };
    let any = match &view.conditions.any {
        Some(any) => any.clone(),
        None => {
            tracing::info!(title = %view.title, "View has no \"any\" conditions");
            Vec::new()
        }
    };

    let columns: Vec<ColumnId> = view
        .execution
        .columns
        .iter()
        .map(|c| c.id.clone())
        .collect();

    let payload = ViewPayload {
        view: NewView {
            title: copy_title(&view.title),
            raw_title: view.raw_title.clone(),
            description: view
                .description
                .clone()
                .unwrap_or_else(|| default_description(ctx)),
            active: view.active,
            position: view.position,
            restriction: view.restriction.clone(),
            all,
            any,
            output: ViewOutput {
                columns,
                group_by: view.execution.group_by.clone(),
                group_order: view.execution.group_order.clone(),
                sort_by: view.execution.sort_by.clone(),
                sort_order: view.execution.sort_order.clone(),
            },
        },
    };

    tracing::info!(title = %payload.view.title, "View transformed");
    payload
}
