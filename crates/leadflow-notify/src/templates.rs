// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message templates for agent notifications.

use leadflow_core::types::{Agent, NotificationKind, NotificationMessage};

/// Render the subject line for a notification.
pub fn subject(message: &NotificationMessage) -> String {
    match message.kind {
        NotificationKind::LeadAssigned => {
            format!("New lead for property {}", message.property_id)
        }
        NotificationKind::SlaMissed => {
            format!("Response window missed for property {}", message.property_id)
        }
    }
}

/// Render the plain-text body for a notification.
pub fn body(agent: &Agent, message: &NotificationMessage) -> String {
    match message.kind {
        NotificationKind::LeadAssigned => {
            let mut body = format!(
                "Hi {},\n\n\
                 A buyer is interested in property {} and the lead has been assigned to you.\n",
                agent.name, message.property_id
            );
            if let Some(note) = &message.note {
                body.push_str(&format!("\nBuyer's message:\n{note}\n"));
            }
            if let Some(deadline) = &message.expires_at {
                body.push_str(&format!(
                    "\nPlease respond before {deadline} or the lead will be passed on.\n"
                ));
            }
            body.push_str(&format!("\nReference: {}\n", message.assignment_id));
            body
        }
        NotificationKind::SlaMissed => format!(
            "Hi {},\n\n\
             The response window for your lead on property {} has elapsed and the lead\n\
             has been passed to another agent.\n\n\
             Reference: {}\n",
            agent.name, message.property_id, message.assignment_id
        ),
    }
}
