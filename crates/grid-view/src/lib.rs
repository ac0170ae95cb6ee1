//! recordgrid view - filtered, sorted, paginated working copy of records
//!
//! The view owns the full result set of the latest fetch and derives:
//! - the filtered set (substring match on the display field)
//! - its ordering (stable comparator on the sort field)
//! - the visible page window
//!
//! Fetches are sequenced with [`FetchTicket`]s so that a late response for a
//! superseded query never overwrites newer state.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod error;
pub mod page;
pub mod sequence;
pub mod view;

pub use error::ViewError;
pub use page::PageWindow;
pub use sequence::{FetchOutcome, FetchTicket};
pub use view::{FilteredView, ViewConfig};
