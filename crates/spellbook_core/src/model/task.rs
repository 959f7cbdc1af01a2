use serde::{Deserialize, Serialize};

/// A single entry in the spell list.
///
/// `created_at` is an RFC3339 timestamp assigned at creation and never
/// changed afterwards; it is only used for ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    pub created_at: String,
}
