//! Notifications emitted during an autofill pass.

use serde::{Deserialize, Serialize};

use crate::message::HostNotification;

/// Progress and outcome notifications of a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AutofillEvent {
    /// The page has no fillable field; the pass ends immediately.
    NoFields,
    Started {
        total: usize,
    },
    Progress {
        filled: usize,
        total: usize,
    },
    /// One field could not be filled; the pass continues.
    FieldFailed {
        index: usize,
        field: String,
        reason: String,
    },
    Cancelled {
        filled: usize,
        errors: usize,
        total: usize,
    },
    Completed {
        filled: usize,
        errors: usize,
        total: usize,
    },
}

impl AutofillEvent {
    /// Human-readable status line.
    pub fn message(&self) -> String {
        match self {
            AutofillEvent::NoFields => "No text inputs found on this page.".to_string(),
            AutofillEvent::Started { total } => format!("Starting to fill {} fields...", total),
            AutofillEvent::Progress { filled, total } => {
                format!("Progress: {}/{} fields filled...", filled, total)
            }
            AutofillEvent::FieldFailed {
                index,
                field,
                reason,
            } => format!("Failed to fill field {} ({}): {}", index + 1, field, reason),
            AutofillEvent::Cancelled {
                filled,
                errors,
                total,
            } => format!(
                "Cancelled: {} filled, {} errors out of {} fields",
                filled, errors, total
            ),
            AutofillEvent::Completed {
                filled,
                errors,
                total,
            } => format!(
                "Completed: {} filled, {} errors out of {} fields",
                filled, errors, total
            ),
        }
    }

    /// Whether this event ends the pass.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AutofillEvent::NoFields | AutofillEvent::Cancelled { .. } | AutofillEvent::Completed { .. }
        )
    }

    /// The `showAlert` notification carrying [`Self::message`].
    pub fn to_alert(&self) -> HostNotification {
        HostNotification::ShowAlert {
            message: self.message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            AutofillEvent::NoFields.message(),
            "No text inputs found on this page."
        );
        assert_eq!(
            AutofillEvent::Started { total: 7 }.message(),
            "Starting to fill 7 fields..."
        );
        assert_eq!(
            AutofillEvent::Progress { filled: 3, total: 7 }.message(),
            "Progress: 3/7 fields filled..."
        );
        assert_eq!(
            AutofillEvent::Completed {
                filled: 5,
                errors: 2,
                total: 7
            }
            .message(),
            "Completed: 5 filled, 2 errors out of 7 fields"
        );
    }

    #[test]
    fn test_field_failed_message_is_one_based() {
        let event = AutofillEvent::FieldFailed {
            index: 0,
            field: "email".to_string(),
            reason: "timeout".to_string(),
        };
        assert_eq!(event.message(), "Failed to fill field 1 (email): timeout");
    }

    #[test]
    fn test_terminal_events() {
        assert!(AutofillEvent::NoFields.is_terminal());
        assert!(!AutofillEvent::Started { total: 1 }.is_terminal());
        assert!(AutofillEvent::Cancelled {
            filled: 0,
            errors: 0,
            total: 1
        }
        .is_terminal());
    }

    #[test]
    fn test_to_alert() {
        let alert = AutofillEvent::Started { total: 2 }.to_alert();
        let json = serde_json::to_value(&alert).unwrap();
        assert_eq!(json["action"], "showAlert");
        assert_eq!(json["message"], "Starting to fill 2 fields...");
    }
}
