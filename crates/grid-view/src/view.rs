//! Filtered paginated view
//!
//! Owns the full fetched result set and derives the visible page from the
//! current filter, sort and page window. Derived rows are an index mapping
//! into the record set and are recomputed on every mutation.

use crate::error::ViewError;
use crate::page::PageWindow;
use crate::sequence::{FetchOutcome, FetchSequencer, FetchTicket};
use grid_store::{FetchQuery, MatchMode, Record, RecordId, SortDirection, SortSpec, DEFAULT_DISPLAY_FIELD};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// View configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Rows per page
    pub page_size: usize,
    /// Field the filter text is matched against
    pub display_field: String,
    /// Case handling of the filter
    pub match_mode: MatchMode,
    /// Initial sort
    pub sort: SortSpec,
}

impl ViewConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With page size
    #[inline]
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// With match mode
    #[inline]
    #[must_use]
    pub fn with_match_mode(mut self, match_mode: MatchMode) -> Self {
        self.match_mode = match_mode;
        self
    }

    /// With display field
    #[inline]
    #[must_use]
    pub fn with_display_field(mut self, field: impl Into<String>) -> Self {
        self.display_field = field.into();
        self
    }

    /// With initial sort
    #[inline]
    #[must_use]
    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = sort;
        self
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            display_field: DEFAULT_DISPLAY_FIELD.to_string(),
            match_mode: MatchMode::default(),
            sort: SortSpec::default(),
        }
    }
}

/// Working copy of fetched records with filter, sort and paging
#[derive(Debug)]
pub struct FilteredView {
    display_field: String,
    match_mode: MatchMode,
    all_records: Vec<Record>,
    filter_text: String,
    sort: SortSpec,
    /// Filtered, sorted indices into `all_records`
    rows: Vec<usize>,
    page: PageWindow,
    sequencer: FetchSequencer,
}

impl FilteredView {
    /// Create empty view
    ///
    /// # Errors
    /// - `ViewError::Validation` for a zero page size, blank display field
    ///   or blank sort field
    pub fn new(config: ViewConfig) -> Result<Self, ViewError> {
        if config.display_field.trim().is_empty() {
            return Err(ViewError::validation("display field must not be blank"));
        }
        if config.sort.field.trim().is_empty() {
            return Err(ViewError::validation("sort field must not be blank"));
        }
        Ok(Self {
            page: PageWindow::new(config.page_size)?,
            display_field: config.display_field,
            match_mode: config.match_mode,
            all_records: Vec::new(),
            filter_text: String::new(),
            sort: config.sort,
            rows: Vec::new(),
            sequencer: FetchSequencer::default(),
        })
    }

    /// Replace the filter text and go back to the first page.
    ///
    /// The empty string matches every record.
    pub fn set_filter(&mut self, text: impl Into<String>) {
        self.filter_text = text.into();
        self.sequencer.invalidate();
        self.recompute();
        self.page.first();
        tracing::debug!(
            "filter {:?} -> {} of {} records",
            self.filter_text,
            self.rows.len(),
            self.all_records.len()
        );
    }

    /// Replace the sort and re-order the filtered rows; the page offset is kept.
    ///
    /// # Errors
    /// - `ViewError::Validation` if `field` is blank
    pub fn set_sort(
        &mut self,
        field: impl Into<String>,
        direction: SortDirection,
    ) -> Result<(), ViewError> {
        let field = field.into();
        if field.trim().is_empty() {
            return Err(ViewError::validation("sort field must not be blank"));
        }
        self.sort = SortSpec::new(field, direction);
        self.sequencer.invalidate();
        self.sort_rows();
        tracing::debug!("sort {} {}", self.sort.field, self.sort.direction);
        Ok(())
    }

    /// Replace every record, re-apply filter and sort and clamp the page.
    ///
    /// # Errors
    /// - `ViewError::Validation` if two records share an id; the view is left
    ///   untouched
    pub fn refresh(&mut self, records: Vec<Record>) -> Result<(), ViewError> {
        if let Some(dup) = first_duplicate(&records) {
            return Err(ViewError::validation(format!("duplicate record id {dup}")));
        }

        self.all_records = records;
        self.recompute();
        self.page.clamp(self.rows.len());
        tracing::debug!(
            "refresh: {} records, {} visible after filter, {} pages",
            self.all_records.len(),
            self.rows.len(),
            self.total_pages()
        );
        Ok(())
    }

    /// Issue a fetch for the current filter and sort
    pub fn begin_fetch(&mut self) -> FetchTicket {
        let query = FetchQuery::new(self.filter_text.clone(), self.sort.clone());
        self.sequencer.issue(query)
    }

    /// Apply a fetch response if it belongs to the newest ticket.
    ///
    /// # Errors
    /// - `ViewError::Validation` as for [`FilteredView::refresh`]
    pub fn apply_fetch(
        &mut self,
        ticket: &FetchTicket,
        records: Vec<Record>,
    ) -> Result<FetchOutcome, ViewError> {
        if !self.sequencer.is_current(ticket) {
            tracing::warn!("discarding stale fetch response #{}", ticket.seq());
            return Ok(FetchOutcome::Discarded);
        }
        self.refresh(records)?;
        Ok(FetchOutcome::Applied)
    }

    /// Records of the current page.
    ///
    /// The iterator is lazy and cloneable, so it can be restarted; it is
    /// recomputed from the current state on every call.
    pub fn visible_page(&self) -> impl ExactSizeIterator<Item = &Record> + Clone + '_ {
        let range = self.page.range(self.rows.len());
        self.rows[range].iter().map(move |&idx| &self.all_records[idx])
    }

    /// Every record passing the filter, in sort order
    pub fn filtered(&self) -> impl ExactSizeIterator<Item = &Record> + Clone + '_ {
        self.rows.iter().map(move |&idx| &self.all_records[idx])
    }

    /// Advance one page
    pub fn next_page(&mut self) -> bool {
        self.page.next(self.rows.len())
    }

    /// Go back one page
    pub fn previous_page(&mut self) -> bool {
        self.page.previous()
    }

    /// Jump to the first page
    pub fn first_page(&mut self) {
        self.page.first();
    }

    /// Jump to the last page
    pub fn last_page(&mut self) {
        self.page.last(self.rows.len());
    }

    /// Jump to zero-based page
    ///
    /// # Errors
    /// - `ViewError::Validation` if the page does not exist
    pub fn go_to_page(&mut self, page: usize) -> Result<(), ViewError> {
        self.page.go_to(page, self.rows.len())
    }

    /// Look up a loaded record
    #[must_use]
    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.all_records.iter().find(|r| &r.id == id)
    }

    /// Current filter text
    #[inline]
    #[must_use]
    pub fn filter_text(&self) -> &str {
        &self.filter_text
    }

    /// Current sort
    #[inline]
    #[must_use]
    pub fn sort(&self) -> &SortSpec {
        &self.sort
    }

    /// Page window
    #[inline]
    #[must_use]
    pub fn page(&self) -> PageWindow {
        self.page
    }

    /// Zero-based current page
    #[inline]
    #[must_use]
    pub fn page_number(&self) -> usize {
        self.page.page_number()
    }

    /// One past the last visible row
    #[inline]
    #[must_use]
    pub fn ending_record(&self) -> usize {
        self.page.ending_record(self.rows.len())
    }

    /// Number of records passing the filter
    #[inline]
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.rows.len()
    }

    /// `ceil(total_count / page_size)`
    #[inline]
    #[must_use]
    pub fn total_pages(&self) -> usize {
        self.page.total_pages(self.rows.len())
    }

    /// Every loaded record, unfiltered
    #[inline]
    #[must_use]
    pub fn all_records(&self) -> &[Record] {
        &self.all_records
    }

    fn recompute(&mut self) {
        let field = &self.display_field;
        let filter = &self.filter_text;
        let mode = self.match_mode;
        self.rows = self
            .all_records
            .iter()
            .enumerate()
            .filter(|(_, record)| mode.matches(record, field, filter))
            .map(|(idx, _)| idx)
            .collect();
        self.sort_rows();
    }

    fn sort_rows(&mut self) {
        let records = &self.all_records;
        let sort = &self.sort;
        // stable: equal keys keep fetch order
        self.rows
            .sort_by(|&a, &b| sort.compare(&records[a], &records[b]));
    }
}

fn first_duplicate(records: &[Record]) -> Option<&RecordId> {
    let mut seen = HashSet::with_capacity(records.len());
    records.iter().map(|r| &r.id).find(|id| !seen.insert(*id))
}
