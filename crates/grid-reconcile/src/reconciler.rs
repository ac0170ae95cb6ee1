//! Inline edit reconciler
//!
//! Collects cell-level draft edits per record and submits them to the record
//! store as one concurrent batch:
//! - Later edits to the same field overwrite earlier ones
//! - Only one submission may be in flight; a second one is rejected
//! - Drafts are cleared on submit whatever the outcome (no automatic retry)
//! - The store does not refresh anything; the report tells the caller to
//!   re-fetch
//! - The `Id` field is read-only

use crate::error::ReconcileError;
use crate::state::{validate_transition, ReconcilerState};
use grid_store::{DraftEdit, FieldValue, RecordId, RecordStore, RecordUpdate, ID_FIELD};
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::sync::Arc;

/// Outcome of a successful submission
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubmitReport {
    /// Records whose drafts were persisted, in staging order
    pub records: Vec<RecordId>,
    /// Whether the caller should re-fetch and refresh its view
    pub refresh_needed: bool,
}

impl SubmitReport {
    /// Number of persisted record updates
    #[inline]
    #[must_use]
    pub fn submitted(&self) -> usize {
        self.records.len()
    }
}

#[derive(Debug, Default)]
struct Inner {
    state: ReconcilerState,
    drafts: IndexMap<RecordId, DraftEdit>,
    last_failure: Option<String>,
}

impl Inner {
    fn require(&self, expected: ReconcilerState, operation: &'static str) -> Result<(), ReconcileError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(ReconcileError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    fn transition(&mut self, to: ReconcilerState, operation: &'static str) -> Result<(), ReconcileError> {
        validate_transition(self.state, to).map_err(|_| ReconcileError::InvalidState {
            operation,
            state: self.state,
        })?;
        tracing::debug!("reconciler {} -> {}", self.state, to);
        self.state = to;
        Ok(())
    }
}

/// Batches draft edits and submits them through a [`RecordStore`]
///
/// All methods take `&self`; the reconciler can be shared behind an `Arc`
/// and still enforces the single-submission rule.
#[derive(Debug)]
pub struct Reconciler {
    store: Arc<dyn RecordStore>,
    inner: Mutex<Inner>,
}

impl Reconciler {
    /// Create idle reconciler over `store`
    #[inline]
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Current state
    #[inline]
    #[must_use]
    pub fn state(&self) -> ReconcilerState {
        self.inner.lock().state
    }

    /// Stage one field edit for a record
    ///
    /// # Errors
    /// - `ReconcileError::InvalidState` unless idle
    /// - `ReconcileError::ReadOnlyField` for the `Id` field
    pub fn stage_edit(
        &self,
        record_id: impl Into<RecordId>,
        field: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Result<(), ReconcileError> {
        let field = field.into();
        if field == ID_FIELD {
            return Err(ReconcileError::ReadOnlyField(field));
        }
        let mut inner = self.inner.lock();
        inner.require(ReconcilerState::Idle, "stage edit")?;
        inner
            .drafts
            .entry(record_id.into())
            .or_default()
            .set(field, value);
        Ok(())
    }

    /// Stage a whole draft row (the shape a datatable reports on cell change)
    ///
    /// # Errors
    /// - `ReconcileError::InvalidState` unless idle
    /// - `ReconcileError::ReadOnlyField` if the draft sets `Id`
    pub fn stage_row(
        &self,
        record_id: impl Into<RecordId>,
        draft: DraftEdit,
    ) -> Result<(), ReconcileError> {
        if draft.get(ID_FIELD).is_some() {
            return Err(ReconcileError::ReadOnlyField(ID_FIELD.to_string()));
        }
        let mut inner = self.inner.lock();
        inner.require(ReconcilerState::Idle, "stage edit")?;
        inner.drafts.entry(record_id.into()).or_default().merge(draft);
        Ok(())
    }

    /// Drop every staged draft, returning how many records had drafts
    ///
    /// # Errors
    /// - `ReconcileError::InvalidState` while a submission is in flight
    pub fn discard_drafts(&self) -> Result<usize, ReconcileError> {
        let mut inner = self.inner.lock();
        if inner.state == ReconcilerState::Submitting {
            return Err(ReconcileError::InvalidState {
                operation: "discard drafts",
                state: inner.state,
            });
        }
        let count = inner.drafts.len();
        inner.drafts.clear();
        Ok(count)
    }

    /// Snapshot of staged drafts in staging order
    #[must_use]
    pub fn drafts(&self) -> Vec<(RecordId, DraftEdit)> {
        self.inner
            .lock()
            .drafts
            .iter()
            .map(|(id, draft)| (id.clone(), draft.clone()))
            .collect()
    }

    /// Number of records with staged drafts
    #[inline]
    #[must_use]
    pub fn staged_count(&self) -> usize {
        self.inner.lock().drafts.len()
    }

    /// Message of the last failed submission, if not yet acknowledged
    #[must_use]
    pub fn last_failure(&self) -> Option<String> {
        self.inner.lock().last_failure.clone()
    }

    /// Submit every staged draft as one concurrent batch.
    ///
    /// An empty draft set is a no-op that does not request a refresh.
    ///
    /// # Errors
    /// - `ReconcileError::InvalidState` unless idle (including while another
    ///   submission is in flight)
    /// - `ReconcileError::Store` if any update in the batch failed; the
    ///   reconciler is then `Failed` until [`Reconciler::acknowledge`]
    pub async fn submit(&self) -> Result<SubmitReport, ReconcileError> {
        let updates: Vec<RecordUpdate> = {
            let mut inner = self.inner.lock();
            inner.require(ReconcilerState::Idle, "submit")?;
            if inner.drafts.is_empty() {
                return Ok(SubmitReport::default());
            }
            inner.transition(ReconcilerState::Submitting, "submit")?;
            std::mem::take(&mut inner.drafts)
                .into_iter()
                .map(|(id, draft)| RecordUpdate::new(id, draft))
                .collect()
        };
        let records: Vec<RecordId> = updates.iter().map(|u| u.record_id.clone()).collect();
        tracing::info!("submitting {} record updates", updates.len());

        let mut in_flight = InFlight {
            reconciler: self,
            settled: false,
        };
        let result = self.store.update(&updates).await;
        in_flight.settled = true;

        let mut inner = self.inner.lock();
        match result {
            Ok(()) => {
                inner.transition(ReconcilerState::Idle, "submit")?;
                inner.last_failure = None;
                tracing::info!("submitted {} record updates", records.len());
                Ok(SubmitReport {
                    records,
                    refresh_needed: true,
                })
            }
            Err(e) => {
                inner.transition(ReconcilerState::Failed, "submit")?;
                inner.last_failure = Some(e.message());
                tracing::warn!("submission of {} updates failed: {}", records.len(), e);
                Err(e.into())
            }
        }
    }

    /// Return from `Failed` to `Idle`, yielding the failure message
    ///
    /// # Errors
    /// - `ReconcileError::InvalidState` unless failed
    pub fn acknowledge(&self) -> Result<Option<String>, ReconcileError> {
        let mut inner = self.inner.lock();
        inner.require(ReconcilerState::Failed, "acknowledge")?;
        inner.transition(ReconcilerState::Idle, "acknowledge")?;
        Ok(inner.last_failure.take())
    }
}

/// Marks the reconciler failed if a submission future is dropped unsettled
struct InFlight<'a> {
    reconciler: &'a Reconciler,
    settled: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut inner = self.reconciler.inner.lock();
        if inner.state == ReconcilerState::Submitting {
            inner.state = ReconcilerState::Failed;
            inner.last_failure = Some("submission cancelled".to_string());
            tracing::warn!("submission dropped before settling");
        }
    }
}
