//! Record store capability
//!
//! Provides the [`RecordStore`] trait that every backing transport implements,
//! plus the concurrent batch update shared by all implementations.

use crate::error::StoreError;
use crate::query::FetchQuery;
use crate::record::{FieldMap, Record, RecordId, RecordUpdate};
use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;

/// Backing store for records, decoupled from any transport
///
/// Implementations only persist; they never refresh a caller's view.
#[async_trait]
pub trait RecordStore: Send + Sync + std::fmt::Debug {
    /// Fetch records whose display field contains `query.filter`, ordered by
    /// `query.sort`.
    ///
    /// # Errors
    /// - `StoreError::Transport` if the backing call rejects
    ///
    /// Zero matches is an empty vector, never an error.
    async fn fetch(&self, query: &FetchQuery) -> Result<Vec<Record>, StoreError>;

    /// Persist one partial update
    async fn update_one(&self, update: &RecordUpdate) -> Result<(), StoreError>;

    /// Persist a batch of partial updates.
    ///
    /// All updates are issued concurrently and awaited together. Succeeds only
    /// if every update succeeds.
    ///
    /// # Errors
    /// - `StoreError::BatchUpdate` carrying the first failure in submission order
    async fn update(&self, updates: &[RecordUpdate]) -> Result<(), StoreError> {
        update_concurrently(self, updates).await
    }

    /// Insert a new record, returning its id
    async fn create(&self, fields: FieldMap) -> Result<RecordId, StoreError>;

    /// Remove records, returning how many existed
    async fn delete(&self, ids: &[RecordId]) -> Result<usize, StoreError>;
}

/// Issue every update concurrently and fold the outcomes all-or-nothing.
///
/// # Errors
/// - `StoreError::BatchUpdate` if any single update failed
pub async fn update_concurrently<S>(store: &S, updates: &[RecordUpdate]) -> Result<(), StoreError>
where
    S: RecordStore + ?Sized,
{
    if updates.is_empty() {
        return Ok(());
    }

    let results = join_all(updates.iter().map(|update| store.update_one(update))).await;

    let mut first_failure = None;
    let mut failed = 0;
    for (update, result) in updates.iter().zip(results) {
        if let Err(e) = result {
            tracing::debug!("update of {} failed: {}", update.record_id, e);
            failed += 1;
            if first_failure.is_none() {
                first_failure = Some((update.record_id.clone(), e.message()));
            }
        }
    }

    match first_failure {
        None => Ok(()),
        Some((record_id, message)) => Err(StoreError::BatchUpdate {
            record_id,
            message,
            failed,
        }),
    }
}

#[async_trait]
impl<S> RecordStore for Arc<S>
where
    S: RecordStore + ?Sized,
{
    async fn fetch(&self, query: &FetchQuery) -> Result<Vec<Record>, StoreError> {
        (**self).fetch(query).await
    }

    async fn update_one(&self, update: &RecordUpdate) -> Result<(), StoreError> {
        (**self).update_one(update).await
    }

    async fn update(&self, updates: &[RecordUpdate]) -> Result<(), StoreError> {
        (**self).update(updates).await
    }

    async fn create(&self, fields: FieldMap) -> Result<RecordId, StoreError> {
        (**self).create(fields).await
    }

    async fn delete(&self, ids: &[RecordId]) -> Result<usize, StoreError> {
        (**self).delete(ids).await
    }
}
