//! Notifier and confirmer ports with their stock implementations.

use crate::toast::*;
use async_trait::async_trait;
use std::collections::VecDeque;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Dialog could not be shown: {0}")]
    Dialog(String),
}

/// Sink for transient notifications.
///
/// Writers may call `notify` concurrently; implementations serialize display.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, toast: Toast) -> Result<(), NotifyError>;
}

/// Blocking two-button confirmation.
#[async_trait]
pub trait Confirmer: Send + Sync {
    /// Show the dialog and wait for the button the operator pressed.
    async fn confirm(&self, dialog: &ConfirmDialog) -> Result<DialogButton, NotifyError>;
}

/// Append-only toast queue.
#[derive(Default)]
pub struct ToastQueue {
    toasts: Mutex<VecDeque<Toast>>,
}

impl ToastQueue {
    /// Copy of every toast queued so far, oldest first.
    pub async fn snapshot(&self) -> Vec<Toast> {
        self.toasts.lock().await.iter().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.toasts.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.toasts.lock().await.is_empty()
    }
}

#[async_trait]
impl Notifier for ToastQueue {
    async fn notify(&self, toast: Toast) -> Result<(), NotifyError> {
        debug!(level = ?toast.level, title = %toast.title, "Queueing toast");
        self.toasts.lock().await.push_back(toast);
        Ok(())
    }
}

/// Writes toasts to the log instead of a screen.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, toast: Toast) -> Result<(), NotifyError> {
        match toast.level {
            ToastLevel::Error => error!(title = %toast.title, "{}", toast.message),
            ToastLevel::Success => {
                info!(title = %toast.title, "{}", toast.message)
            }
        }
        Ok(())
    }
}

/// Confirmer that answers every dialog with a preset button and remembers
/// what it was asked. Used for non-interactive runs and tests.
pub struct ScriptedConfirmer {
    answer: DialogButton,
    shown: Mutex<Vec<ConfirmDialog>>,
}

impl ScriptedConfirmer {
    pub fn new(answer: DialogButton) -> Self {
        Self {
            answer,
            shown: Mutex::new(Vec::new()),
        }
    }

    pub fn accepting() -> Self {
        Self::new(DialogButton::Ok)
    }

    pub fn declining() -> Self {
        Self::new(DialogButton::Close)
    }

    pub async fn shown(&self) -> Vec<ConfirmDialog> {
        self.shown.lock().await.clone()
    }
}

#[async_trait]
impl Confirmer for ScriptedConfirmer {
    async fn confirm(&self, dialog: &ConfirmDialog) -> Result<DialogButton, NotifyError> {
        self.shown.lock().await.push(dialog.clone());
        Ok(self.answer)
    }
}
