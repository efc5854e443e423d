//! Notification channel for Fuzzdeck.
//!
//! Provides the transient toast queue every view writes its outcomes to and
//! the blocking confirmation dialog destructive mutations go through.

pub mod sender;
pub mod toast;

pub use sender::{
    Confirmer, NotifyError, Notifier, ScriptedConfirmer, ToastQueue, TracingNotifier,
};
pub use toast::{ConfirmDialog, DialogButton, Toast, ToastLevel};
