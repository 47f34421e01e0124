use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Speaker {
    Candidate,
    Agent,
}

/// One spoken turn, appended to the session's transcript log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptTurn {
    pub speaker: Speaker,
    pub text: String,
}

/// Point-in-time copy of the editor contents, appended to the code log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CodeSnapshot {
    pub code: String,
    pub submitted: bool,
}
