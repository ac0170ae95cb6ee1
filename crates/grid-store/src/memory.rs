//! In-memory record store
//!
//! Concurrent map-backed [`RecordStore`] used by the demo binary and tests.
//! Fetch filtering is case-insensitive, like a server-side `LIKE`.

use crate::error::StoreError;
use crate::query::{FetchQuery, MatchMode, DEFAULT_DISPLAY_FIELD};
use crate::record::{FieldMap, Record, RecordId, RecordUpdate, ID_FIELD};
use crate::store::RecordStore;
use async_trait::async_trait;
use dashmap::DashMap;

/// Map-backed record store
#[derive(Debug)]
pub struct InMemoryStore {
    records: DashMap<RecordId, Record>,
    display_field: String,
}

impl InMemoryStore {
    /// Create empty store filtering on `Name`
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            display_field: DEFAULT_DISPLAY_FIELD.to_string(),
        }
    }

    /// Create store holding `records`
    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Self {
        let store = Self::new();
        for record in records {
            store.records.insert(record.id.clone(), record);
        }
        store
    }

    /// With display field used for filtering and required on create
    #[inline]
    #[must_use]
    pub fn with_display_field(mut self, field: impl Into<String>) -> Self {
        self.display_field = field.into();
        self
    }

    /// Number of stored records
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Copy of one record
    #[must_use]
    pub fn get(&self, id: &RecordId) -> Option<Record> {
        self.records.get(id).map(|entry| entry.value().clone())
    }

    /// All records ordered by id
    #[must_use]
    pub fn snapshot(&self) -> Vec<Record> {
        let mut all: Vec<Record> = self.records.iter().map(|e| e.value().clone()).collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn fetch(&self, query: &FetchQuery) -> Result<Vec<Record>, StoreError> {
        let mut matched: Vec<Record> = self
            .records
            .iter()
            .filter(|e| MatchMode::CaseInsensitive.matches(e.value(), &self.display_field, &query.filter))
            .map(|e| e.value().clone())
            .collect();

        // Map iteration order is arbitrary; ties fall back to id order
        matched.sort_by(|a, b| a.id.cmp(&b.id));
        matched.sort_by(|a, b| query.sort.compare(a, b));

        tracing::debug!(
            "fetch filter={:?} sort={} {} -> {} records",
            query.filter,
            query.sort.field,
            query.sort.direction,
            matched.len()
        );
        Ok(matched)
    }

    async fn update_one(&self, update: &RecordUpdate) -> Result<(), StoreError> {
        if update.fields.contains_key(ID_FIELD) {
            return Err(StoreError::Rejected(format!("{ID_FIELD} is read-only")));
        }
        let mut entry = self
            .records
            .get_mut(&update.record_id)
            .ok_or_else(|| StoreError::NotFound(update.record_id.clone()))?;

        for (name, value) in &update.fields {
            entry.fields.insert(name.clone(), value.clone());
        }
        Ok(())
    }

    async fn create(&self, fields: FieldMap) -> Result<RecordId, StoreError> {
        if fields.contains_key(ID_FIELD) {
            return Err(StoreError::Rejected(format!("{ID_FIELD} is assigned by the store")));
        }
        if fields.get(&self.display_field).map_or(true, |v| v.is_blank()) {
            return Err(StoreError::Rejected(format!(
                "required field {} is missing",
                self.display_field
            )));
        }

        let id = RecordId::generate();
        self.records.insert(
            id.clone(),
            Record {
                id: id.clone(),
                fields,
            },
        );
        tracing::debug!("created record {}", id);
        Ok(id)
    }

    async fn delete(&self, ids: &[RecordId]) -> Result<usize, StoreError> {
        let removed = ids.iter().filter(|id| self.records.remove(*id).is_some()).count();
        tracing::debug!("deleted {} of {} records", removed, ids.len());
        Ok(removed)
    }
}
