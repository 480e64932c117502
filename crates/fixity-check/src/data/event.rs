use serde::{Deserialize, Serialize};

use crate::data::request::{CheckFailure, CheckReport};

/// Message broadcast to the subscribers of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum FixityCheckEvent {
    /// Liveness heartbeat, no payload.
    #[serde(rename = "fixity_check_in_progress")]
    InProgress,

    #[serde(rename = "fixity_check_complete")]
    Complete(CheckReport),

    #[serde(rename = "fixity_check_error")]
    Error(CheckFailure),
}

impl FixityCheckEvent {
    pub fn is_terminal(&self) -> bool { !matches!(self, Self::InProgress) }

    pub fn to_json(&self) -> serde_json::Result<String> { serde_json::to_string(self) }
}
