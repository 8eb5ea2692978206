use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityCategory {
    Application,
    Interview,
}

impl ActivityCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityCategory::Application => "application",
            ActivityCategory::Interview => "interview",
        }
    }
}

/// One field's old/new pair, attached to mutation events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChange {
    pub field: String,
    pub old: Option<String>,
    pub new: String,
}

/// Structured activity record handed to the audit sink. Emission is
/// fire-and-forget relative to the mutation it describes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub action: String,
    pub category: ActivityCategory,
    pub resource_type: String,
    pub resource_id: Uuid,
    pub state_change: Option<StateChange>,
    pub actor: Option<String>,
    pub outcome: String,
}

impl StateChange {
    pub fn new(field: &str, old: Option<String>, new: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            old,
            new: new.into(),
        }
    }
}
