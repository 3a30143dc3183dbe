use serde::{Deserialize, Serialize};

// ============================================================================
// Shared
// ============================================================================

/// A single filter rule inside a view's `all` / `any` groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub operator: String,
    /// Strings, numbers, arrays or null depending on the field.
    #[serde(default)]
    pub value: serde_json::Value,
}

/// Column identifier: a system column name or a numeric custom field id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnId {
    Name(String),
    Field(u64),
}

impl From<&str> for ColumnId {
    fn from(name: &str) -> Self {
        ColumnId::Name(name.to_string())
    }
}

// ============================================================================
// Read form (listing endpoint)
// ============================================================================

/// One page of `GET /views.json`. Views stay raw until one is picked, so an
/// odd record elsewhere in the account cannot fail the listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ViewsPage {
    pub count: u64,
    pub views: Vec<serde_json::Value>,
    #[serde(default)]
    pub next_page: Option<String>,
}

/// A view as exported by the listing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewRecord {
    #[serde(default)]
    pub id: Option<u64>,
    pub title: String,
    #[serde(default)]
    pub raw_title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub position: Option<i64>,
    #[serde(default)]
    pub restriction: Option<serde_json::Value>,
    #[serde(default)]
    pub conditions: ViewConditions,
    #[serde(default)]
    pub execution: ViewExecution,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewConditions {
    #[serde(default)]
    pub all: Option<Vec<Condition>>,
    #[serde(default)]
    pub any: Option<Vec<Condition>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewExecution {
    #[serde(default)]
    pub columns: Vec<ColumnDescriptor>,
    #[serde(default)]
    pub group_by: Option<String>,
    #[serde(default)]
    pub group_order: Option<String>,
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_order: Option<String>,
}

/// Export-side column: the id plus display metadata the write side does not accept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub id: ColumnId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ============================================================================
// Write form (creation endpoint)
// ============================================================================

/// Body of `POST /views.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewPayload {
    pub view: NewView,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewView {
    pub title: String,
    pub raw_title: Option<String>,
    pub description: String,
    pub active: bool,
    pub position: Option<i64>,
    pub restriction: Option<serde_json::Value>,
    pub all: Vec<Condition>,
    pub any: Vec<Condition>,
    pub output: ViewOutput,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewOutput {
    pub columns: Vec<ColumnId>,
    pub group_by: Option<String>,
    pub group_order: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

// ============================================================================
// Rejection body
// ============================================================================

/// `{"error": ..., "description": ..., "details": {"base": [...]}}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RejectionEnvelope {
    #[serde(default)]
    pub error: Option<serde_json::Value>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub details: Option<RejectionDetails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RejectionDetails {
    #[serde(default)]
    pub base: Vec<RejectionError>,
}

/// One entry of `details.base`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectionError {
    pub description: String,
    #[serde(default)]
    pub error: Option<String>,
}
