use super::selection::SelectionKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightTrigger {
    Start,
    /// An upload is already running; the caller re-checks once it settles.
    Coalesced,
    /// The head of the selection has already been sent.
    UpToDate,
}

/// At most one upload at a time. Triggers that arrive while one is in
/// flight are folded into a single follow-up check.
#[derive(Debug, Default)]
pub struct UploadFlight {
    running: Option<SelectionKey>,
    settled: Option<SelectionKey>,
    coalesced: bool,
}

impl UploadFlight {
    pub fn trigger(&mut self, key: SelectionKey) -> FlightTrigger {
        if self.running.is_some() {
            self.coalesced = true;
            FlightTrigger::Coalesced
        } else if self.settled == Some(key) {
            FlightTrigger::UpToDate
        } else {
            self.running = Some(key);
            FlightTrigger::Start
        }
    }

    /// Ends the flight for `key` and reports whether a coalesced trigger is
    /// waiting. A failed head stays eligible for the next trigger.
    pub fn settle(&mut self, key: SelectionKey) -> bool {
        if self.running == Some(key) {
            self.running = None;
        }
        std::mem::take(&mut self.coalesced)
    }

    /// Records that `key` reached the server, so later triggers skip it.
    pub fn mark_uploaded(&mut self, key: SelectionKey) {
        self.settled = Some(key);
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Forgets what was uploaded so the next selection starts fresh.
    /// A running upload still owns the flight until it settles.
    pub fn reset(&mut self) {
        self.settled = None;
        self.coalesced = false;
    }
}

/// Sequence-numbered debounce: only the newest armed token stays current.
#[derive(Debug, Default)]
pub struct Debounce {
    seq: u64,
}

impl Debounce {
    pub fn arm(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    pub fn is_current(&self, token: u64) -> bool {
        self.seq == token
    }

    pub fn cancel(&mut self) {
        self.seq += 1;
    }
}
