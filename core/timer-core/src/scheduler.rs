//! Refresh bookkeeping: which reads to start, and which results still count.
//!
//! Pure state, no I/O. The coordinator feeds it triggers and read completions and
//! does whatever it answers. Two rules:
//!
//! - At most one read in flight per target. Triggers that arrive meanwhile
//!   collapse into a single pending flag, which becomes exactly one trailing
//!   read when the in-flight one completes.
//! - Every read is stamped with the target epoch. Retargeting bumps the epoch, so
//!   a read that was started against the old path is recognized as stale when it
//!   completes and is dropped instead of published.

/// Permission to run one read against the target of `epoch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
    pub epoch: u64,
}

/// What to do with a finished read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The read belongs to a superseded target (or was never issued). Drop it.
    Stale,
    /// Apply the result, then start `next` if present.
    Current { next: Option<RefreshTicket> },
}

#[derive(Debug, Default)]
pub struct RefreshScheduler {
    epoch: u64,
    in_flight: bool,
    pending: bool,
}

impl RefreshScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_current(&self, epoch: u64) -> bool {
        epoch == self.epoch
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn pending(&self) -> bool {
        self.pending
    }

    /// A trigger fired. Returns a ticket if a read should start now; otherwise the
    /// trigger was absorbed by the read already in flight.
    pub fn request(&mut self) -> Option<RefreshTicket> {
        if self.in_flight {
            self.pending = true;
            return None;
        }
        self.in_flight = true;
        Some(self.ticket())
    }

    /// A read finished.
    pub fn complete(&mut self, ticket: RefreshTicket) -> Completion {
        if !self.is_current(ticket.epoch) || !self.in_flight {
            return Completion::Stale;
        }

        if self.pending {
            self.pending = false;
            return Completion::Current {
                next: Some(self.ticket()),
            };
        }

        self.in_flight = false;
        Completion::Current { next: None }
    }

    /// The target was replaced. Forgets the old target's in-flight and pending
    /// reads and issues the first read for the new one.
    pub fn retarget(&mut self) -> RefreshTicket {
        self.epoch += 1;
        self.pending = false;
        self.in_flight = true;
        self.ticket()
    }

    fn ticket(&self) -> RefreshTicket {
        RefreshTicket { epoch: self.epoch }
    }
}
