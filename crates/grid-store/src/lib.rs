//! recordgrid store - records and the pluggable record store capability
//!
//! Provides:
//! - The record data model (ids, field values, drafts, updates)
//! - Sort and filter query types with the shared comparator
//! - The [`RecordStore`] trait with all-or-nothing concurrent batch updates
//! - A per-call [`TimeoutStore`] wrapper
//! - An [`InMemoryStore`] implementation
//!
//! # Example
//!
//! ```rust,ignore
//! use grid_store::{FetchQuery, InMemoryStore, Record, RecordStore, SortSpec};
//!
//! # async fn example() -> Result<(), grid_store::StoreError> {
//! let store = InMemoryStore::from_records(vec![Record::new("1").with_field("Name", "Acme")]);
//! let rows = store.fetch(&FetchQuery::new("Ac", SortSpec::default())).await?;
//! assert_eq!(rows.len(), 1);
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod error;
pub mod memory;
pub mod query;
pub mod record;
pub mod store;
pub mod timeout;

pub use error::StoreError;
pub use memory::InMemoryStore;
pub use query::{
    FetchQuery, MatchMode, ParseDirectionError, SortDirection, SortSpec, DEFAULT_DISPLAY_FIELD,
};
pub use record::{DraftEdit, FieldMap, FieldValue, Record, RecordId, RecordUpdate, ID_FIELD};
pub use store::{update_concurrently, RecordStore};
pub use timeout::TimeoutStore;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
