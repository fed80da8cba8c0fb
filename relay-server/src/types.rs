//! Request and response types for the relay.
//!
//! All of these live for a single request only.

use serde::{Deserialize, Serialize};

// =============================================================================
// Inbound Payload
// =============================================================================

/// Meeting data posted to `/webhook`.
///
/// Every field is optional at the parse level; the relay decides what is
/// required. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingPayload {
    /// Meeting title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_title: Option<String>,
    /// Short-form title some senders use instead of `meetingTitle`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Meeting date, as sent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Participant names in the order given
    #[serde(default)]
    pub participants: Vec<String>,
    /// Free-text summary from the meeting tool
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Action items in the order given
    #[serde(default)]
    pub action_items: Vec<String>,
}

impl MeetingPayload {
    /// The first non-blank of `meetingTitle` and `title`.
    pub fn title(&self) -> Option<&str> {
        non_blank(self.meeting_title.as_deref()).or_else(|| non_blank(self.title.as_deref()))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// =============================================================================
// Response
// =============================================================================

/// JSON body returned for every `/webhook` POST.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RelayResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }
}
