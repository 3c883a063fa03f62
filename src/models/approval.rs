use serde::{Deserialize, Serialize};

/// Reserved document id that keeps the change-only approvals collection
/// alive; never shown to operators.
pub const PLACEHOLDER_APPROVAL_ID: &str = "placeholder";

/// A pending submission approval request raised by the race backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Approval {
    pub id: String,
    #[serde(default)]
    pub content: String,
}
