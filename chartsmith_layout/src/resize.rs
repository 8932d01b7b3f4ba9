// Copyright 2025 the Chartsmith Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resize debouncing.
//!
//! Continuous container resizes are coalesced: each request replaces the pending one and pushes
//! its deadline back by the debounce window. Requests carry a [`ResizeTicket`] with a
//! monotonically increasing generation, and a finished layout pass is only applied if its ticket
//! is still the latest, so a slow pass can never overwrite a newer size.
//!
//! The debouncer holds no clock; callers pass `now` as the time elapsed since any fixed origin.

use core::time::Duration;

use crate::layout::Size;

/// Identifies one resize request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResizeTicket {
    generation: u64,
}

impl ResizeTicket {
    /// The request's generation; later requests have larger generations.
    pub fn generation(self) -> u64 {
        self.generation
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Pending {
    ticket: ResizeTicket,
    size: Size,
    due: Duration,
}

/// Coalesces resize requests.
#[derive(Clone, Debug)]
pub struct ResizeDebouncer {
    window: Duration,
    generation: u64,
    applied: u64,
    pending: Option<Pending>,
}

impl ResizeDebouncer {
    /// Creates a debouncer with the given window.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            generation: 0,
            applied: 0,
            pending: None,
        }
    }

    /// Returns the debounce window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Records a resize to `size` at time `now`, cancelling any pending request.
    pub fn request(&mut self, size: Size, now: Duration) -> ResizeTicket {
        self.generation += 1;
        let ticket = ResizeTicket {
            generation: self.generation,
        };
        if let Some(previous) = self.pending.replace(Pending {
            ticket,
            size,
            due: now + self.window,
        }) {
            log::trace!(
                "resize {} replaced pending resize {}",
                ticket.generation,
                previous.ticket.generation
            );
        }
        ticket
    }

    /// Returns the pending request once its deadline has passed.
    pub fn poll(&mut self, now: Duration) -> Option<(ResizeTicket, Size)> {
        let pending = self.pending?;
        if now < pending.due {
            return None;
        }
        self.pending = None;
        log::trace!(
            "resize {} fires at {:?} ({}x{})",
            pending.ticket.generation,
            now,
            pending.size.width,
            pending.size.height
        );
        Some((pending.ticket, pending.size))
    }

    /// Returns the deadline of the pending request, if any.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.map(|p| p.due)
    }

    /// Whether `ticket` belongs to the most recent request.
    pub fn is_current(&self, ticket: ResizeTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Marks the layout pass for `ticket` as finished.
    ///
    /// Returns `true` if its result should be applied; stale tickets are rejected.
    pub fn complete(&mut self, ticket: ResizeTicket) -> bool {
        if !self.is_current(ticket) || ticket.generation <= self.applied {
            log::trace!("dropping stale resize {}", ticket.generation);
            return false;
        }
        self.applied = ticket.generation;
        true
    }

    /// Drops the pending request, if any.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

impl Default for ResizeDebouncer {
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}
