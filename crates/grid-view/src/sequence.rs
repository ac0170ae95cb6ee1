//! Fetch sequencing
//!
//! Every fetch is tagged with a monotonic sequence number. Only the response
//! to the most recently issued fetch may land; filter or sort changes also
//! advance the sequence so in-flight fetches for the old query are dropped.

use grid_store::FetchQuery;

/// Handle for one issued fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    seq: u64,
    query: FetchQuery,
}

impl FetchTicket {
    /// Sequence number
    #[inline]
    #[must_use]
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Query to run against the store
    #[inline]
    #[must_use]
    pub fn query(&self) -> &FetchQuery {
        &self.query
    }
}

/// What happened to a fetch response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Response replaced the view's records
    Applied,
    /// Response was superseded and ignored
    Discarded,
}

/// Monotonic fetch counter
#[derive(Debug, Default)]
pub(crate) struct FetchSequencer {
    issued: u64,
}

impl FetchSequencer {
    pub(crate) fn issue(&mut self, query: FetchQuery) -> FetchTicket {
        self.issued += 1;
        FetchTicket {
            seq: self.issued,
            query,
        }
    }

    /// Supersede every outstanding ticket
    pub(crate) fn invalidate(&mut self) {
        self.issued += 1;
    }

    pub(crate) fn is_current(&self, ticket: &FetchTicket) -> bool {
        ticket.seq == self.issued
    }
}
