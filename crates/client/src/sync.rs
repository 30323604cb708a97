// crates/client/src/sync.rs
//! Ordering for status fetches.
//!
//! Fetches resolve in any order. Each one carries a [`FetchTicket`]; only the
//! most recently issued ticket may write its result, and a realtime push
//! invalidates every ticket issued before it.

use std::time::Duration;

/// How often the client re-fetches status while a mentor decision is pending.
pub const POLL_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    seq: u64,
    spinner: bool,
}

impl FetchTicket {
    pub fn shows_spinner(&self) -> bool {
        self.spinner
    }
}

/// What to do with a resolved fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// The result is still the latest word and may be applied.
    pub apply: bool,
    /// This fetch owned the loading indicator, which is now released.
    pub clear_spinner: bool,
}

#[derive(Debug, Default)]
pub struct StatusSync {
    issued: u64,
    /// Tickets at or below this sequence are stale.
    superseded_through: u64,
    spinner_owner: Option<u64>,
}

impl StatusSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket for a new fetch. A spinner fetch takes over the
    /// loading indicator.
    pub fn begin(&mut self, spinner: bool) -> FetchTicket {
        self.issued += 1;
        self.superseded_through = self.issued - 1;
        if spinner {
            self.spinner_owner = Some(self.issued);
        }
        FetchTicket {
            seq: self.issued,
            spinner,
        }
    }

    /// Settle a fetch, successful or not.
    pub fn finish(&mut self, ticket: FetchTicket) -> Resolution {
        let clear_spinner = self.spinner_owner == Some(ticket.seq);
        if clear_spinner {
            self.spinner_owner = None;
        }
        Resolution {
            apply: ticket.seq > self.superseded_through,
            clear_spinner,
        }
    }

    /// A fresher status arrived from elsewhere; outstanding fetches are stale.
    pub fn supersede(&mut self) {
        self.superseded_through = self.issued;
    }

    pub fn loading(&self) -> bool {
        self.spinner_owner.is_some()
    }
}
