//! Scheduled (buffered) primary-click events.
//!
//! A fixed-capacity FIFO of press/release actions, each stamped with the
//! time it becomes due.  All entries are scheduled at `now + delay` with a
//! constant delay, so insertion order is also due order.
//!
//! Overflow policy: scheduling into a full queue evicts the oldest entry.
//! Memory stays bounded and the newest intent always survives; a lost
//! click under an input storm is accepted, a fault is not.

use crate::config::EVENT_QUEUE_CAPACITY;
use crate::sink::{OutputButton, OutputSink};
use crate::time::{is_due, Micros};
use heapless::Deque;

/// What a scheduled event does to the primary output button.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventKind {
    Press,
    Release,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScheduledEvent {
    pub kind: EventKind,
    pub due: Micros,
}

impl ScheduledEvent {
    /// Apply this event to the sink.
    pub fn execute<S: OutputSink + ?Sized>(&self, sink: &mut S) {
        match self.kind {
            EventKind::Press => sink.press_button(OutputButton::Primary),
            EventKind::Release => sink.release_button(OutputButton::Primary),
        }
    }
}

/// Bounded drop-oldest queue of [`ScheduledEvent`]s.
pub struct EventQueue<const N: usize = EVENT_QUEUE_CAPACITY> {
    entries: Deque<ScheduledEvent, N>,
    evicted: u32,
}

impl<const N: usize> Default for EventQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> EventQueue<N> {
    pub const fn new() -> Self {
        Self {
            entries: Deque::new(),
            evicted: 0,
        }
    }

    /// Queue `kind` to fire at `due`. Never fails.
    ///
    /// Returns the entry evicted to make room, if any.
    pub fn schedule(&mut self, kind: EventKind, due: Micros) -> Option<ScheduledEvent> {
        let event = ScheduledEvent { kind, due };
        let evicted = if self.entries.is_full() {
            self.evicted = self.evicted.wrapping_add(1);
            self.entries.pop_front()
        } else {
            None
        };

        #[cfg(feature = "defmt")]
        if let Some(old) = evicted {
            defmt::warn!("Queue: full, dropped {:?}", old);
        }

        // Cannot fail: a slot was freed above when full.
        let _ = self.entries.push_back(event);
        evicted
    }

    /// Oldest entry, if it is due at `now`.
    pub fn peek_due(&self, now: Micros) -> Option<&ScheduledEvent> {
        self.entries.front().filter(|e| is_due(e.due, now))
    }

    /// Remove and return the oldest entry if it is due at `now`.
    pub fn pop_due(&mut self, now: Micros) -> Option<ScheduledEvent> {
        if self.peek_due(now).is_some() {
            self.entries.pop_front()
        } else {
            None
        }
    }

    /// Execute every due entry in FIFO order, stopping at the first one
    /// that is not due yet. Returns the number executed.
    pub fn drain_due<S: OutputSink + ?Sized>(&mut self, now: Micros, sink: &mut S) -> usize {
        let mut fired = 0;
        while let Some(event) = self.pop_due(now) {
            event.execute(sink);
            fired += 1;
        }
        fired
    }

    /// Most recently scheduled entry.
    pub fn peek_last(&self) -> Option<&ScheduledEvent> {
        self.entries.back()
    }

    /// Retract the most recently scheduled entry, only if it is of `kind`.
    ///
    /// Older entries are never touched.
    pub fn pop_last_if(&mut self, kind: EventKind) -> Option<ScheduledEvent> {
        match self.entries.back() {
            Some(last) if last.kind == kind => self.entries.pop_back(),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Entries lost to overflow since creation.
    pub fn evicted(&self) -> u32 {
        self.evicted
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScheduledEvent> {
        self.entries.iter()
    }
}
