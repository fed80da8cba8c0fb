//! Chat message rendering.
//!
//! Output uses Slack mrkdwn (`*bold*`, `•` bullets). Missing fields render
//! as a placeholder instead of being dropped.

use crate::types::MeetingPayload;

/// Shown for absent scalar fields and empty participant lists.
pub const PLACEHOLDER: &str = "N/A";

const NO_ACTION_ITEMS: &str = "None";

/// Prefix of the analysis text substituted when summarization fails.
pub const ANALYSIS_FAILED_PREFIX: &str = "Analysis failed";

/// Analysis text used in place of a failed summarization.
pub fn analysis_failed(reason: &str) -> String {
    format!("{}: {}", ANALYSIS_FAILED_PREFIX, reason)
}

/// Build the notification text for one meeting.
pub fn format_message(payload: &MeetingPayload, analysis: &str) -> String {
    let title = payload.title().unwrap_or(PLACEHOLDER);
    let date = non_blank(payload.date.as_deref()).unwrap_or(PLACEHOLDER);
    let summary = non_blank(payload.summary.as_deref()).unwrap_or(PLACEHOLDER);

    let participants = if payload.participants.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        payload.participants.join(", ")
    };

    let action_items = if payload.action_items.is_empty() {
        NO_ACTION_ITEMS.to_string()
    } else {
        payload
            .action_items
            .iter()
            .map(|item| format!("• {}", item))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "*📋 Meeting Summary: {title}*\n\
         *Date:* {date}\n\
         *Participants:* {participants}\n\
         \n\
         *Summary:*\n{summary}\n\
         \n\
         *Action Items:*\n{action_items}\n\
         \n\
         *🤖 AI Analysis:*\n{analysis}"
    )
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
