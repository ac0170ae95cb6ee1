//! Injected host capabilities
//!
//! The controller never shows anything or changes pages itself; it asks a
//! [`Notifier`] to surface toasts and a [`Navigator`] to open record pages.
//! The tracing implementations stand in for a host when none is wired.

use grid_store::RecordId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Toast severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastVariant {
    Success,
    Error,
    Warning,
    Info,
}

impl fmt::Display for ToastVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        };
        f.write_str(s)
    }
}

/// Transient user notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub title: String,
    pub message: String,
    pub variant: ToastVariant,
}

impl Toast {
    #[must_use]
    pub fn new(title: impl Into<String>, message: impl Into<String>, variant: ToastVariant) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            variant,
        }
    }

    #[must_use]
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(title, message, ToastVariant::Success)
    }

    #[must_use]
    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(title, message, ToastVariant::Error)
    }
}

/// Surfaces toasts to the user
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);
}

/// Record page mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageAction {
    View,
    Edit,
    New,
}

/// Navigation target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRef {
    /// Absent for [`PageAction::New`]
    pub record_id: Option<RecordId>,
    pub action: PageAction,
}

impl PageRef {
    /// View page of a record
    #[must_use]
    pub fn view(record_id: RecordId) -> Self {
        Self {
            record_id: Some(record_id),
            action: PageAction::View,
        }
    }

    /// Edit page of a record
    #[must_use]
    pub fn edit(record_id: RecordId) -> Self {
        Self {
            record_id: Some(record_id),
            action: PageAction::Edit,
        }
    }

    /// New-record page
    #[must_use]
    pub fn new_record() -> Self {
        Self {
            record_id: None,
            action: PageAction::New,
        }
    }
}

/// Opens record pages
#[cfg_attr(test, mockall::automock)]
pub trait Navigator: Send + Sync {
    fn navigate(&self, target: PageRef);
}

/// Logs toasts as tracing events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, toast: Toast) {
        match toast.variant {
            ToastVariant::Error => tracing::error!("{}: {}", toast.title, toast.message),
            ToastVariant::Warning => tracing::warn!("{}: {}", toast.title, toast.message),
            ToastVariant::Success | ToastVariant::Info => {
                tracing::info!("{}: {}", toast.title, toast.message);
            }
        }
    }
}

/// Logs navigations as tracing events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn navigate(&self, target: PageRef) {
        match &target.record_id {
            Some(id) => tracing::info!("navigate: {:?} record {}", target.action, id),
            None => tracing::info!("navigate: {:?}", target.action),
        }
    }
}
