//! Toast and dialog types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastLevel {
    Success,
    Error,
}

/// A transient notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toast {
    pub level: ToastLevel,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Toast {
    pub fn new(level: ToastLevel, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            message: message.into(),
            created_at: Utc::now(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(ToastLevel::Success, "OK", message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ToastLevel::Error, title, message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogButton {
    Ok,
    Close,
}

impl DialogButton {
    pub fn label(&self) -> &'static str {
        match self {
            DialogButton::Ok => "Ok",
            DialogButton::Close => "Close",
        }
    }
}

/// A centered two-button dialog. `Ok` is focused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmDialog {
    pub title: String,
    pub message: String,
    pub buttons: [DialogButton; 2],
}

impl ConfirmDialog {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            title: "Confirm".to_string(),
            message: message.into(),
            buttons: [DialogButton::Ok, DialogButton::Close],
        }
    }

    pub fn focused(&self) -> DialogButton {
        self.buttons[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirm_dialog_buttons() {
        let dialog = ConfirmDialog::new("Agent a1 is being deleted!");
        assert_eq!(dialog.title, "Confirm");
        assert_eq!(dialog.buttons, [DialogButton::Ok, DialogButton::Close]);
        assert_eq!(dialog.focused(), DialogButton::Ok);
    }

    #[test]
    fn test_success_toast_title() {
        let toast = Toast::success("Job stop request sent!");
        assert_eq!(toast.level, ToastLevel::Success);
        assert_eq!(toast.title, "OK");
    }
}
