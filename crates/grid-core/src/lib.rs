//! recordgrid core - master-detail table controller
//!
//! Ties the record store, the filtered paginated view and the inline edit
//! reconciler together behind one [`TableController`], with injected host
//! capabilities for toasts, navigation and refresh events.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use grid_core::prelude::*;
//! use std::sync::Arc;
//!
//! let store = Arc::new(InMemoryStore::from_records(records));
//! let mut table = TableController::new(
//!     GridConfig::default(),
//!     store,
//!     Arc::new(TracingNotifier),
//!     Arc::new(TracingNavigator),
//! )?;
//!
//! table.search("Ac").await?;
//! table.stage_cell_edit("001", "Name", "Acme2")?;
//! table.save_drafts().await?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod capabilities;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod logging;

pub use capabilities::{Navigator, Notifier, PageAction, PageRef, Toast, ToastVariant};
pub use capabilities::{TracingNavigator, TracingNotifier};
pub use config::{ConfigError, GridConfig, LogConfig, LogFormat};
pub use controller::{RowAction, TableController};
pub use error::GridError;
pub use events::{RefreshBus, RefreshEvent, RefreshSubscription};

/// Common types for building a table
pub mod prelude {
    pub use crate::capabilities::{
        Navigator, Notifier, PageRef, Toast, TracingNavigator, TracingNotifier,
    };
    pub use crate::config::GridConfig;
    pub use crate::controller::{RowAction, TableController};
    pub use crate::error::GridError;
    pub use crate::events::{RefreshBus, RefreshEvent};
    pub use grid_reconcile::{Reconciler, ReconcilerState, SubmitReport};
    pub use grid_store::{
        DraftEdit, FieldValue, InMemoryStore, Record, RecordId, RecordStore, SortDirection,
        SortSpec,
    };
    pub use grid_view::{FetchOutcome, FilteredView};
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
