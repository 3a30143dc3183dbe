//! Rejection classification and payload repair.
//!
//! Each `details.base` entry of a rejected creation is classified, then handed
//! to the handler registered for its kind. Handlers mutate the payload in place
//! or record the view as unrecreatable.

use std::collections::HashMap;
use std::str::FromStr;

use crate::context::RunContext;
use crate::copier::creator::Rejection;
use crate::copier::unrecreatable::UnrecreatableLog;
use crate::error::{AppError, ParseError};
use crate::zendesk::types::{Condition, RejectionError, ViewPayload};

const DELETED_PHRASE: &str = "was deleted";
const NO_VALID_CONDITION_PHRASE: &str = "View must test for at least";
const GROUP_FIELD: &str = "group_id";

// =============================================================================
// Classification
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionKind {
    /// A condition references an entity (usually a group) that no longer exists.
    DeletedReference,
    /// Nothing valid is left to filter on; the view cannot be recreated.
    NoValidCondition,
    Unrecognized,
}

pub fn classify_rejection(description: &str) -> RejectionKind {
    if description.contains(DELETED_PHRASE) {
        RejectionKind::DeletedReference
    } else if description.contains(NO_VALID_CONDITION_PHRASE) {
        RejectionKind::NoValidCondition
    } else {
        RejectionKind::Unrecognized
    }
}

/// Recover the entity id embedded in a description such as
/// `"Group 20051282 was deleted and cannot be used"`.
///
/// Exactly one run of ASCII digits must be present; the id is that run, which
/// is also the concatenation of every digit in the description.
pub fn extract_entity_id(description: &str) -> Result<u64, ParseError> {
    let runs: Vec<&str> = description
        .split(|c: char| !c.is_ascii_digit())
        .filter(|run| !run.is_empty())
        .collect();

    match runs.as_slice() {
        [] => Err(ParseError::NoId(description.to_string())),
        [run] => run
            .parse::<u64>()
            .map_err(|_| ParseError::Invalid(run.to_string())),
        many => Err(ParseError::AmbiguousId {
            description: description.to_string(),
            found: many.iter().map(|s| s.to_string()).collect(),
        }),
    }
}

// =============================================================================
// Group filter
// =============================================================================

/// How a deleted group's id is applied to the `all` conditions.
///
/// `KeepMatching` retains only the conditions that reference the deleted group,
/// which is the long-standing behaviour of this tool but the opposite of what
/// removing a stale reference needs. It stays the default until the intended
/// behaviour is confirmed; `DropMatching` removes those conditions instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GroupFilterMode {
    #[default]
    KeepMatching,
    DropMatching,
}

impl FromStr for GroupFilterMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keep" | "keep_matching" => Ok(Self::KeepMatching),
            "drop" | "drop_matching" => Ok(Self::DropMatching),
            other => Err(format!(
                "VIEW_COPY_GROUP_FILTER must be \"keep\" or \"drop\", got \"{other}\""
            )),
        }
    }
}

fn references_group(condition: &Condition, group_id: u64) -> bool {
    condition.field == GROUP_FIELD
        && condition.value == serde_json::Value::String(group_id.to_string())
}

/// Filter `all` for `group_id`. Returns how many conditions were removed.
pub fn filter_group_conditions(
    all: &mut Vec<Condition>,
    group_id: u64,
    mode: GroupFilterMode,
) -> usize {
    let before = all.len();
    match mode {
        GroupFilterMode::KeepMatching => all.retain(|c| references_group(c, group_id)),
        GroupFilterMode::DropMatching => all.retain(|c| !references_group(c, group_id)),
    }
    before - all.len()
}

// =============================================================================
// Handlers
// =============================================================================

/// What one remediation pass did to the payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemediationReport {
    pub changed: bool,
    pub unrecreatable: bool,
    pub removed_group_ids: Vec<u64>,
    pub unrecognized: usize,
}

/// Repair strategy for one kind of rejection.
pub trait RemediationHandler: Send + Sync {
    fn apply(
        &self,
        ctx: &RunContext,
        error: &RejectionError,
        payload: &mut ViewPayload,
        report: &mut RemediationReport,
    ) -> Result<(), AppError>;
}

/// Strips conditions that reference a deleted group.
pub struct DeletedGroupHandler {
    pub mode: GroupFilterMode,
}

impl RemediationHandler for DeletedGroupHandler {
    fn apply(
        &self,
        _ctx: &RunContext,
        error: &RejectionError,
        payload: &mut ViewPayload,
        report: &mut RemediationReport,
    ) -> Result<(), AppError> {
        let group_id = match extract_entity_id(&error.description) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(error = %e, "Could not identify the deleted entity; skipping");
                return Ok(());
            }
        };
        tracing::info!(group_id, "A group used in this view has been deleted; removing it from conditions");

        if self.mode == GroupFilterMode::KeepMatching {
            tracing::warn!(
                group_id,
                "Group filter is in keep-matching mode: only conditions referencing the deleted group are kept"
            );
        }

        let removed = filter_group_conditions(&mut payload.view.all, group_id, self.mode);
        tracing::info!(group_id, removed, remaining = payload.view.all.len(), "Filtered \"all\" conditions");

        report.removed_group_ids.push(group_id);
        report.changed |= removed > 0;
        Ok(())
    }
}

/// Records views left with no valid condition; nothing can be repaired.
pub struct NoValidConditionHandler {
    pub log: UnrecreatableLog,
}

impl RemediationHandler for NoValidConditionHandler {
    fn apply(
        &self,
        ctx: &RunContext,
        _error: &RejectionError,
        payload: &mut ViewPayload,
        report: &mut RemediationReport,
    ) -> Result<(), AppError> {
        report.unrecreatable = true;
        self.log.record(
            ctx,
            &payload.view.title,
            "no valid condition remains; the view was likely nonfunctional",
        )?;
        tracing::error!(
            title = %payload.view.title,
            path = %self.log.path().display(),
            "View has no valid conditions and cannot be recreated; recorded for follow-up"
        );
        Ok(())
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Handlers keyed by rejection kind. Kinds without a handler are only logged.
pub struct Remediator {
    handlers: HashMap<RejectionKind, Box<dyn RemediationHandler>>,
}

impl Remediator {
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Deleted-group filtering plus unrecreatable recording.
    pub fn standard(mode: GroupFilterMode, log: UnrecreatableLog) -> Self {
        Self::empty()
            .with_handler(RejectionKind::DeletedReference, DeletedGroupHandler { mode })
            .with_handler(RejectionKind::NoValidCondition, NoValidConditionHandler { log })
    }

    pub fn with_handler(
        mut self,
        kind: RejectionKind,
        handler: impl RemediationHandler + 'static,
    ) -> Self {
        self.handlers.insert(kind, Box::new(handler));
        self
    }

    /// Run every base error of `rejection` through its handler.
    pub fn remediate(
        &self,
        ctx: &RunContext,
        rejection: &Rejection,
        payload: &mut ViewPayload,
    ) -> RemediationReport {
        let mut report = RemediationReport::default();
        tracing::info!(count = rejection.errors.len(), "Handling creation errors");
        if rejection.errors.is_empty() {
            tracing::warn!(body = %rejection.raw, "Rejection carried no readable errors");
        }
        for error in &rejection.errors {
            tracing::info!(description = %error.description, "Error");
        }

        for error in &rejection.errors {
            let kind = classify_rejection(&error.description);
            match self.handlers.get(&kind) {
                Some(handler) => {
                    if let Err(e) = handler.apply(ctx, error, payload, &mut report) {
                        tracing::error!(?kind, error = %e, "Remediation handler failed");
                    }
                }
                None => {
                    report.unrecognized += 1;
                    tracing::warn!(
                        ?kind,
                        description = %error.description,
                        "No remediation for this error; payload left unchanged"
                    );
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zendesk::client::ApiResponse;
    use crate::copier::testing::rejection;
    use crate::zendesk::types::{NewView, ViewOutput};
    use serde_json::json;

    fn cond(field: &str, value: serde_json::Value) -> Condition {
        Condition {
            field: field.into(),
            operator: "is".into(),
            value,
        }
    }

    fn payload(all: Vec<Condition>) -> ViewPayload {
        ViewPayload {
            view: NewView {
                title: "Escalations COPY".into(),
                raw_title: None,
                description: "d".into(),
                active: true,
                position: Some(1),
                restriction: None,
                all,
                any: vec![],
                output: ViewOutput {
                    columns: vec![],
                    group_by: None,
                    group_order: None,
                    sort_by: None,
                    sort_order: None,
                },
            },
        }
    }

    fn conditions() -> Vec<Condition> {
        vec![
            cond("status", json!("open")),
            cond("group_id", json!("20051282")),
            cond("group_id", json!("777")),
        ]
    }

    fn rejected(descriptions: &[&str]) -> Rejection {
        Rejection::from_response(&ApiResponse {
            status: 422,
            body: rejection(descriptions).to_string(),
        })
    }

    #[test]
    fn test_extract_entity_id() {
        assert_eq!(
            extract_entity_id("Group 20051282 was deleted and cannot be used"),
            Ok(20051282)
        );
    }

    #[test]
    fn test_extract_entity_id_without_digits() {
        assert!(matches!(
            extract_entity_id("Group was deleted and cannot be used"),
            Err(ParseError::NoId(_))
        ));
    }

    #[test]
    fn test_extract_entity_id_ambiguous() {
        match extract_entity_id("Group 12 was deleted 3 days ago") {
            Err(ParseError::AmbiguousId { found, .. }) => assert_eq!(found, vec!["12", "3"]),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_extract_entity_id_overflow() {
        assert!(matches!(
            extract_entity_id("Group 99999999999999999999999 was deleted"),
            Err(ParseError::Invalid(_))
        ));
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            classify_rejection("Group 1 was deleted and cannot be used"),
            RejectionKind::DeletedReference
        );
        assert_eq!(
            classify_rejection("View must test for at least one of the following conditions"),
            RejectionKind::NoValidCondition
        );
        assert_eq!(classify_rejection("Title is too long"), RejectionKind::Unrecognized);
    }

    #[test]
    fn test_keep_matching_retains_only_the_deleted_group() {
        let mut all = conditions();
        let removed = filter_group_conditions(&mut all, 20051282, GroupFilterMode::KeepMatching);
        assert_eq!(removed, 2);
        assert_eq!(all, vec![cond("group_id", json!("20051282"))]);
    }

    #[test]
    fn test_drop_matching_removes_the_deleted_group() {
        let mut all = conditions();
        let removed = filter_group_conditions(&mut all, 20051282, GroupFilterMode::DropMatching);
        assert_eq!(removed, 1);
        assert_eq!(
            all,
            vec![cond("status", json!("open")), cond("group_id", json!("777"))]
        );
    }

    #[test]
    fn test_numeric_condition_value_does_not_match() {
        let mut all = vec![cond("group_id", json!(20051282))];
        filter_group_conditions(&mut all, 20051282, GroupFilterMode::DropMatching);
        assert_eq!(all.len(), 1);
    }

    #[test]
    fn test_group_filter_mode_parse() {
        assert_eq!("keep".parse::<GroupFilterMode>(), Ok(GroupFilterMode::KeepMatching));
        assert_eq!(" DROP ".parse::<GroupFilterMode>(), Ok(GroupFilterMode::DropMatching));
        assert!("remove".parse::<GroupFilterMode>().is_err());
    }

    #[test]
    fn test_remediate_deleted_group() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = RunContext::new(dir.path());
        let remediator =
            Remediator::standard(GroupFilterMode::DropMatching, UnrecreatableLog::for_run(&ctx));
        let mut p = payload(conditions());

        let report = remediator.remediate(
            &ctx,
            &rejected(&["Group 20051282 was deleted and cannot be used"]),
            &mut p,
        );

        assert!(report.changed);
        assert!(!report.unrecreatable);
        assert_eq!(report.removed_group_ids, vec![20051282]);
        assert_eq!(p.view.all.len(), 2);
        assert!(!ctx.unrecreatable_path().exists());
    }

    #[test]
    fn test_remediate_deleted_group_default_keeps_only_matching() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = RunContext::new(dir.path());
        let remediator =
            Remediator::standard(GroupFilterMode::default(), UnrecreatableLog::for_run(&ctx));
        let mut p = payload(conditions());

        let report = remediator.remediate(
            &ctx,
            &rejected(&["Group 20051282 was deleted and cannot be used"]),
            &mut p,
        );

        assert!(report.changed);
        assert!(!report.unrecreatable);
        assert_eq!(report.removed_group_ids, vec![20051282]);
        assert_eq!(p.view.all, vec![cond("group_id", json!("20051282"))]);
    }

    #[test]
    fn test_remediate_multiple_deleted_groups() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = RunContext::new(dir.path());
        let remediator =
            Remediator::standard(GroupFilterMode::DropMatching, UnrecreatableLog::for_run(&ctx));
        let mut p = payload(conditions());

        let report = remediator.remediate(
            &ctx,
            &rejected(&[
                "Group 20051282 was deleted and cannot be used",
                "Group 777 was deleted and cannot be used",
            ]),
            &mut p,
        );

        assert_eq!(report.removed_group_ids, vec![20051282, 777]);
        assert_eq!(p.view.all, vec![cond("status", json!("open"))]);
    }

    #[test]
    fn test_remediate_no_valid_condition_records_once() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = RunContext::new(dir.path());
        let remediator =
            Remediator::standard(GroupFilterMode::default(), UnrecreatableLog::for_run(&ctx));
        let mut p = payload(vec![]);
        let before = p.clone();

        let report = remediator.remediate(
            &ctx,
            &rejected(&["View must test for at least one of the following conditions"]),
            &mut p,
        );

        assert!(report.unrecreatable);
        assert!(!report.changed);
        assert_eq!(p, before);
        let content = std::fs::read_to_string(ctx.unrecreatable_path()).unwrap();
        assert_eq!(content.matches("Unable to recreate this view").count(), 1);
        assert!(content.contains("Escalations COPY"));
    }

    #[test]
    fn test_remediate_unrecognized_leaves_payload() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = RunContext::new(dir.path());
        let remediator =
            Remediator::standard(GroupFilterMode::default(), UnrecreatableLog::for_run(&ctx));
        let mut p = payload(conditions());
        let before = p.clone();

        let report = remediator.remediate(&ctx, &rejected(&["Title is too long"]), &mut p);

        assert_eq!(report.unrecognized, 1);
        assert!(!report.changed);
        assert_eq!(p, before);
    }

    #[test]
    fn test_unparseable_id_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = RunContext::new(dir.path());
        let remediator =
            Remediator::standard(GroupFilterMode::DropMatching, UnrecreatableLog::for_run(&ctx));
        let mut p = payload(conditions());

        let report = remediator.remediate(
            &ctx,
            &rejected(&["Group 12 was deleted on 2024-01-02"]),
            &mut p,
        );

        assert!(report.removed_group_ids.is_empty());
        assert_eq!(p.view.all.len(), 3);
    }

    #[test]
    fn test_empty_registry_treats_everything_as_unrecognized() {
        let ctx = RunContext::new("logs");
        let mut p = payload(conditions());
        let report = Remediator::empty().remediate(
            &ctx,
            &rejected(&["Group 20051282 was deleted and cannot be used"]),
            &mut p,
        );
        assert_eq!(report.unrecognized, 1);
        assert_eq!(p.view.all.len(), 3);
    }
}
