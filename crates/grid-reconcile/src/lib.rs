//! recordgrid reconcile - batches inline draft edits into store updates
//!
//! # Example
//!
//! ```rust,ignore
//! use grid_reconcile::Reconciler;
//! use grid_store::InMemoryStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), grid_reconcile::ReconcileError> {
//! let reconciler = Reconciler::new(Arc::new(InMemoryStore::new()));
//! reconciler.stage_edit("001", "Name", "Acme2")?;
//! let report = reconciler.submit().await?;
//! if report.refresh_needed {
//!     // re-fetch and refresh the view
//! }
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod error;
pub mod reconciler;
pub mod state;

pub use error::ReconcileError;
pub use reconciler::{Reconciler, SubmitReport};
pub use state::{allowed_transitions, validate_transition, ReconcilerState, TransitionError};
