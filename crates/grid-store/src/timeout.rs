//! Per-call time budget for record stores

use crate::error::StoreError;
use crate::query::FetchQuery;
use crate::record::{FieldMap, Record, RecordId, RecordUpdate};
use crate::store::RecordStore;
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

/// Wraps a store and bounds every individual call with a timeout
///
/// Batch updates are bounded per update, since the provided
/// [`RecordStore::update`] fans out to [`RecordStore::update_one`].
#[derive(Debug, Clone)]
pub struct TimeoutStore<S> {
    inner: S,
    budget: Duration,
}

impl<S: RecordStore> TimeoutStore<S> {
    /// Wrap store with time budget
    #[inline]
    #[must_use]
    pub fn new(inner: S, budget: Duration) -> Self {
        Self { inner, budget }
    }

    /// Configured budget
    #[inline]
    #[must_use]
    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Wrapped store
    #[inline]
    #[must_use]
    pub fn inner(&self) -> &S {
        &self.inner
    }

    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.budget, call).await {
            Ok(result) => result,
            Err(_) => {
                let millis = u64::try_from(self.budget.as_millis()).unwrap_or(u64::MAX);
                tracing::warn!("store {} exceeded {}ms budget", operation, millis);
                Err(StoreError::Timeout { operation, millis })
            }
        }
    }
}

#[async_trait]
impl<S: RecordStore> RecordStore for TimeoutStore<S> {
    async fn fetch(&self, query: &FetchQuery) -> Result<Vec<Record>, StoreError> {
        self.bounded("fetch", self.inner.fetch(query)).await
    }

    async fn update_one(&self, update: &RecordUpdate) -> Result<(), StoreError> {
        self.bounded("update", self.inner.update_one(update)).await
    }

    async fn create(&self, fields: FieldMap) -> Result<RecordId, StoreError> {
        self.bounded("create", self.inner.create(fields)).await
    }

    async fn delete(&self, ids: &[RecordId]) -> Result<usize, StoreError> {
        self.bounded("delete", self.inner.delete(ids)).await
    }
}
