//! Table controller
//!
//! Wires a [`FilteredView`] and a [`Reconciler`] to a record store and the
//! host capabilities. The controller owns the load-after-write rule: the
//! store and reconciler never refresh anything, so every successful write
//! here is followed by a sequenced reload.

use crate::capabilities::{Navigator, Notifier, PageRef, Toast};
use crate::config::GridConfig;
use crate::error::GridError;
use crate::events::{RefreshEvent, RefreshSubscription};
use grid_reconcile::{Reconciler, ReconcilerState, SubmitReport};
use grid_store::{
    DraftEdit, FieldMap, FieldValue, Record, RecordId, RecordStore, SortDirection, StoreError,
    TimeoutStore,
};
use grid_view::{FetchOutcome, FetchTicket, FilteredView};
use std::fmt;
use std::sync::Arc;

/// Per-row menu action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    View,
    Edit,
    Delete,
}

/// Master-detail table over a record store
pub struct TableController {
    config: GridConfig,
    store: Arc<dyn RecordStore>,
    view: FilteredView,
    reconciler: Reconciler,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    active_record: Option<RecordId>,
    last_error: Option<String>,
}

impl TableController {
    /// Create controller; nothing is fetched until [`TableController::load`].
    ///
    /// The store is bounded by the configured per-call timeout when enabled.
    ///
    /// # Errors
    /// - `GridError::Config` for invalid configuration
    /// - `GridError::View` if the view rejects the derived settings
    pub fn new(
        config: GridConfig,
        store: Arc<dyn RecordStore>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, GridError> {
        config.validate()?;
        let view = FilteredView::new(config.view_config())?;

        let store: Arc<dyn RecordStore> = match config.store_timeout() {
            Some(budget) => Arc::new(TimeoutStore::new(store, budget)),
            None => store,
        };

        Ok(Self {
            reconciler: Reconciler::new(store.clone()),
            config,
            store,
            view,
            notifier,
            navigator,
            active_record: None,
            last_error: None,
        })
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn view(&self) -> &FilteredView {
        &self.view
    }

    #[inline]
    #[must_use]
    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Record the last row action targeted
    #[inline]
    #[must_use]
    pub fn active_record(&self) -> Option<&RecordId> {
        self.active_record.as_ref()
    }

    /// Message of the last failed operation, cleared by a successful load
    #[inline]
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Rows of the current page
    pub fn visible_rows(&self) -> impl ExactSizeIterator<Item = &Record> + Clone + '_ {
        self.view.visible_page()
    }

    /// Fetch with the current search key and sort and refresh the view.
    ///
    /// On failure the previously loaded rows stay in place.
    ///
    /// # Errors
    /// - `GridError::Store` if the fetch fails
    /// - `GridError::View` if the response holds duplicate ids
    pub async fn load(&mut self) -> Result<FetchOutcome, GridError> {
        let ticket = self.view.begin_fetch();
        let fetched = self.store.fetch(ticket.query()).await;
        self.finish_load(&ticket, fetched)
    }

    fn finish_load(
        &mut self,
        ticket: &FetchTicket,
        fetched: Result<Vec<Record>, StoreError>,
    ) -> Result<FetchOutcome, GridError> {
        let result = match fetched {
            Ok(records) => self.view.apply_fetch(ticket, records).map_err(GridError::from),
            Err(e) => Err(e.into()),
        };

        match result {
            Ok(FetchOutcome::Discarded) => {
                tracing::debug!("fetch #{} superseded, rows unchanged", ticket.seq());
                Ok(FetchOutcome::Discarded)
            }
            Ok(outcome) => {
                self.last_error = None;
                tracing::info!(
                    "loaded {} records ({} pages)",
                    self.view.total_count(),
                    self.view.total_pages()
                );
                Ok(outcome)
            }
            Err(e) => Err(self.fail("Error loading records", e)),
        }
    }

    /// Server-side search: use `key` as the store filter and reload
    ///
    /// # Errors
    /// - as [`TableController::load`]
    pub async fn search(&mut self, key: impl Into<String>) -> Result<FetchOutcome, GridError> {
        self.view.set_filter(key);
        self.load().await
    }

    /// Filter the loaded rows locally without a fetch
    pub fn set_filter(&mut self, text: impl Into<String>) {
        self.view.set_filter(text);
    }

    /// Re-sort locally, then reload with the new sort
    ///
    /// # Errors
    /// - `GridError::View` for a blank field
    /// - as [`TableController::load`]
    pub async fn sort_by(
        &mut self,
        field: impl Into<String>,
        direction: SortDirection,
    ) -> Result<FetchOutcome, GridError> {
        self.view.set_sort(field, direction)?;
        self.load().await
    }

    pub fn next_page(&mut self) -> bool {
        self.view.next_page()
    }

    pub fn previous_page(&mut self) -> bool {
        self.view.previous_page()
    }

    pub fn first_page(&mut self) {
        self.view.first_page();
    }

    pub fn last_page(&mut self) {
        self.view.last_page();
    }

    /// # Errors
    /// - `GridError::View` if `page` is out of range
    pub fn go_to_page(&mut self, page: usize) -> Result<(), GridError> {
        self.view.go_to_page(page).map_err(Into::into)
    }

    /// Stage one inline cell edit
    ///
    /// # Errors
    /// - `GridError::Reconcile` unless the reconciler is idle
    pub fn stage_cell_edit(
        &self,
        record_id: impl Into<RecordId>,
        field: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Result<(), GridError> {
        self.reconciler
            .stage_edit(record_id, field, value)
            .map_err(Into::into)
    }

    /// Stage a whole draft row
    ///
    /// # Errors
    /// - `GridError::Reconcile` unless the reconciler is idle
    pub fn stage_draft_row(
        &self,
        record_id: impl Into<RecordId>,
        draft: DraftEdit,
    ) -> Result<(), GridError> {
        self.reconciler
            .stage_row(record_id, draft)
            .map_err(Into::into)
    }

    /// Submit staged drafts and reload on success.
    ///
    /// A failed submission is reported with an error toast and acknowledged,
    /// so the table accepts new edits right away. Drafts are gone either way.
    ///
    /// # Errors
    /// - `GridError::Reconcile` if the submission is rejected or fails
    /// - as [`TableController::load`] for the reload
    pub async fn save_drafts(&mut self) -> Result<SubmitReport, GridError> {
        match self.reconciler.submit().await {
            Ok(report) => {
                if report.refresh_needed {
                    self.notifier.notify(Toast::success(
                        "Success",
                        format!("{} records updated", report.submitted()),
                    ));
                    self.load().await?;
                }
                Ok(report)
            }
            Err(e) => {
                if self.reconciler.state() == ReconcilerState::Failed {
                    self.reconciler.acknowledge()?;
                }
                Err(self.fail("Error updating or reloading records", e.into()))
            }
        }
    }

    /// Handle a row menu action
    ///
    /// # Errors
    /// - `GridError::Store` if a delete fails
    /// - as [`TableController::load`] for the reload after a delete
    pub async fn handle_row_action(
        &mut self,
        record_id: impl Into<RecordId>,
        action: RowAction,
    ) -> Result<(), GridError> {
        let record_id = record_id.into();
        tracing::debug!("row action {:?} on {}", action, record_id);
        self.active_record = Some(record_id.clone());

        match action {
            RowAction::View => self.navigator.navigate(PageRef::view(record_id)),
            RowAction::Edit => self.navigator.navigate(PageRef::edit(record_id)),
            RowAction::Delete => {
                self.delete_selected(&[record_id]).await?;
                self.active_record = None;
            }
        }
        Ok(())
    }

    /// Open the new-record page
    pub fn add_new_record(&self) {
        self.navigator.navigate(PageRef::new_record());
    }

    /// Create a record and reload
    ///
    /// # Errors
    /// - `GridError::Store` if the store rejects the record
    /// - as [`TableController::load`] for the reload
    pub async fn create_record(&mut self, fields: FieldMap) -> Result<RecordId, GridError> {
        let id = match self.store.create(fields).await {
            Ok(id) => id,
            Err(e) => return Err(self.fail("Error creating record", e.into())),
        };
        self.notifier
            .notify(Toast::success("Success", format!("Record {id} created")));
        self.load().await?;
        Ok(id)
    }

    /// Delete records and reload, returning how many were removed
    ///
    /// # Errors
    /// - `GridError::Store` if the delete fails
    /// - as [`TableController::load`] for the reload
    pub async fn delete_selected(&mut self, ids: &[RecordId]) -> Result<usize, GridError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let removed = match self.store.delete(ids).await {
            Ok(removed) => removed,
            Err(e) => return Err(self.fail("Error deleting records", e.into())),
        };
        self.notifier
            .notify(Toast::success("Success", format!("{removed} records deleted")));
        self.load().await?;
        Ok(removed)
    }

    /// Reload if `event` concerns the active record; returns whether it did
    ///
    /// # Errors
    /// - as [`TableController::load`]
    pub async fn handle_refresh_event(&mut self, event: &RefreshEvent) -> Result<bool, GridError> {
        if self.active_record.as_ref() != Some(&event.record_id) {
            tracing::debug!("ignoring refresh for inactive record {}", event.record_id);
            return Ok(false);
        }
        self.active_record = None;
        self.load().await?;
        Ok(true)
    }

    /// Handle every event already queued on `subscription`, returning how
    /// many triggered a reload
    ///
    /// # Errors
    /// - as [`TableController::load`]; remaining events stay queued
    pub async fn drain_refresh_events(
        &mut self,
        subscription: &mut RefreshSubscription,
    ) -> Result<usize, GridError> {
        let mut reloads = 0;
        while let Some(event) = subscription.try_recv() {
            if self.handle_refresh_event(&event).await? {
                reloads += 1;
            }
        }
        Ok(reloads)
    }

    fn fail(&mut self, title: &str, err: GridError) -> GridError {
        let message = err.message();
        tracing::warn!("{}: {}", title, message);
        self.notifier.notify(Toast::error(title, message.clone()));
        self.last_error = Some(message);
        err
    }
}

impl fmt::Debug for TableController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableController")
            .field("store", &self.store)
            .field("view", &self.view)
            .field("reconciler", &self.reconciler)
            .field("active_record", &self.active_record)
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}
