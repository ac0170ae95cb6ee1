//! Testing utilities for recordgrid workspace
//!
//! Shared fakes, fixtures, and assertions.

#![allow(missing_docs)]

use async_trait::async_trait;
use grid_store::{
    FetchQuery, FieldMap, InMemoryStore, Record, RecordId, RecordStore, RecordUpdate, StoreError,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Semaphore;

pub fn account(id: &str, name: &str) -> Record {
    Record::new(id).with_field("Name", name)
}

/// `[{Id:1,Name:"Acme"},{Id:2,Name:"Box Co"}]`
pub fn acme_and_box_co() -> Vec<Record> {
    vec![account("1", "Acme"), account("2", "Box Co")]
}

/// `n` accounts named `Account 000`, `Account 001`, ...
pub fn numbered_accounts(n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| account(&format!("{i:03}"), &format!("Account {i:03}")))
        .collect()
}

pub fn names<'a>(records: impl IntoIterator<Item = &'a Record>) -> Vec<String> {
    records
        .into_iter()
        .map(|r| r.get("Name").map(ToString::to_string).unwrap_or_default())
        .collect()
}

/// In-memory store with failure injection, call counting and an update gate
#[derive(Debug)]
pub struct FakeStore {
    inner: InMemoryStore,
    rejected: Mutex<HashMap<RecordId, String>>,
    fetch_failure: Mutex<Option<String>>,
    hold_updates: AtomicBool,
    gate: Semaphore,
    fetch_calls: AtomicUsize,
    update_calls: AtomicUsize,
}

impl FakeStore {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            inner: InMemoryStore::from_records(records),
            rejected: Mutex::new(HashMap::new()),
            fetch_failure: Mutex::new(None),
            hold_updates: AtomicBool::new(false),
            gate: Semaphore::new(0),
            fetch_calls: AtomicUsize::new(0),
            update_calls: AtomicUsize::new(0),
        }
    }

    /// Make every update of `id` fail with `message`
    pub fn reject_updates_for(&self, id: &str, message: &str) {
        self.rejected
            .lock()
            .insert(RecordId::from(id), message.to_string());
    }

    /// Make every fetch fail with a transport error
    pub fn fail_fetches(&self, message: &str) {
        *self.fetch_failure.lock() = Some(message.to_string());
    }

    /// Clear injected failures
    pub fn heal(&self) {
        self.rejected.lock().clear();
        *self.fetch_failure.lock() = None;
    }

    /// Park updates until [`FakeStore::release_updates`] admits them
    pub fn hold_updates(&self) {
        self.hold_updates.store(true, Ordering::SeqCst);
    }

    /// Admit `n` parked updates and stop parking new ones
    pub fn release_updates(&self, n: usize) {
        self.hold_updates.store(false, Ordering::SeqCst);
        self.gate.add_permits(n);
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub fn get(&self, id: &str) -> Option<Record> {
        self.inner.get(&RecordId::from(id))
    }

    pub fn records(&self) -> Vec<Record> {
        self.inner.snapshot()
    }
}

#[async_trait]
impl RecordStore for FakeStore {
    async fn fetch(&self, query: &FetchQuery) -> Result<Vec<Record>, StoreError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let failure = self.fetch_failure.lock().clone();
        if let Some(message) = failure {
            return Err(StoreError::Transport(message));
        }
        self.inner.fetch(query).await
    }

    async fn update_one(&self, update: &RecordUpdate) -> Result<(), StoreError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if self.hold_updates.load(Ordering::SeqCst) {
            let permit = self
                .gate
                .acquire()
                .await
                .map_err(|_| StoreError::Transport("gate closed".to_string()))?;
            permit.forget();
        }
        let rejection = self.rejected.lock().get(&update.record_id).cloned();
        if let Some(message) = rejection {
            return Err(StoreError::Rejected(message));
        }
        self.inner.update_one(update).await
    }

    async fn create(&self, fields: FieldMap) -> Result<RecordId, StoreError> {
        self.inner.create(fields).await
    }

    async fn delete(&self, ids: &[RecordId]) -> Result<usize, StoreError> {
        self.inner.delete(ids).await
    }
}
