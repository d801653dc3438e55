// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The dispatch ring keeps rows in order.
//!
//! Workers compute rows whenever they like, but only one of them may
//! write at a time, and only the one holding the next row.  The ring
//! is a circle of binary slots, one per worker.  Exactly one slot is
//! armed at any moment, and the armed slot holds the output sink
//! itself: taking your turn means taking the sink out of your slot,
//! and releasing it means dropping the sink into the next slot round
//! the circle.  Mutual exclusion on the output falls out of there
//! being only one sink.
//!
//! Row `r` belongs to worker `r % n`, and worker `w` only ever waits
//! on slot `w`, so the hand-off chain runs 0, 1, 2, ... in strict row
//! order no matter which worker finishes computing first.
//!
//! A `Turn` that is dropped without being released cancels the whole
//! ring.  Errors, early returns and panics all end up there, so a
//! failed worker can never leave its successors waiting on a slot
//! nobody will arm.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use errors::{Error, Result};

struct Slot<W> {
    baton: Mutex<Option<W>>,
    armed: Condvar,
}

impl<W> Slot<W> {
    fn new(baton: Option<W>) -> Self {
        Slot {
            baton: Mutex::new(baton),
            armed: Condvar::new(),
        }
    }

    // Nothing panics while holding a slot lock, but a poisoned slot
    // still holds a perfectly good sink.
    fn lock(&self) -> MutexGuard<Option<W>> {
        self.baton.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A fixed circle of hand-off slots with the output sink parked in
/// whichever one is armed.
pub struct DispatchRing<W> {
    slots: Vec<Slot<W>>,
    cancelled: AtomicBool,
}

impl<W> DispatchRing<W> {
    /// Build a ring of `size` slots with slot 0 armed and holding the
    /// sink.  All other slots start out blocked.
    pub fn new(size: usize, sink: W) -> Result<Self> {
        if size == 0 {
            return Err(Error::NoWorkers);
        }

        let mut slots = Vec::new();
        slots
            .try_reserve_exact(size)
            .map_err(|_| Error::OutOfMemory(size, "dispatch slots"))?;
        slots.push(Slot::new(Some(sink)));
        slots.extend((1..size).map(|_| Slot::new(None)));

        Ok(DispatchRing {
            slots,
            cancelled: AtomicBool::new(false),
        })
    }

    /// The number of slots, which is also the number of workers.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// A ring always has at least one slot.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The slot responsible for `row`.
    pub fn slot_for(&self, row: usize) -> usize {
        row % self.slots.len()
    }

    /// Block until it is `row`'s turn to be written.  `worker` must be
    /// the worker that owns `row`; the slot it waits on is its own.
    /// Returns `Error::Cancelled` if the ring is torn down while
    /// waiting, or was torn down already.
    pub fn await_turn(&self, worker: usize, row: usize) -> Result<Turn<W>> {
        let index = self.slot_for(row);
        debug_assert_eq!(index, worker, "row {} does not belong to worker {}", row, worker);

        let slot = &self.slots[index];
        let mut baton = slot.lock();
        loop {
            if self.is_cancelled() {
                return Err(Error::Cancelled);
            }
            if let Some(sink) = baton.take() {
                trace!("worker {} has the turn for row {}", worker, row);
                return Ok(Turn {
                    ring: self,
                    row,
                    sink: Some(sink),
                });
            }
            baton = slot.armed.wait(baton).unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Tear the ring down: every current and future `await_turn`
    /// returns `Error::Cancelled`.  Idempotent.
    pub fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        debug!("dispatch ring cancelled");
        // Taking each lock before notifying means no waiter can be
        // between its cancellation check and its wait.
        for slot in &self.slots {
            let _baton = slot.lock();
            slot.armed.notify_all();
        }
    }

    /// Whether the ring has been torn down.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Which slot currently holds the sink, if any.  `None` only while
    /// some worker is in the middle of its turn.
    pub fn armed_slot(&self) -> Option<usize> {
        self.slots.iter().position(|slot| slot.lock().is_some())
    }

    /// Tear down a ring nobody is using any more and recover the sink
    /// from whichever slot it ended up in.
    pub fn into_sink(self) -> Option<W> {
        self.slots
            .into_iter()
            .filter_map(|slot| slot.baton.into_inner().unwrap_or_else(PoisonError::into_inner))
            .next()
    }

    fn arm(&self, index: usize, sink: W) {
        let slot = &self.slots[index];
        let mut baton = slot.lock();
        debug_assert!(baton.is_none(), "slot {} armed twice", index);
        *baton = Some(sink);
        slot.armed.notify_one();
    }
}

/// Permission to write one row.  While a `Turn` is alive its holder is
/// the only thread that can reach the sink.
pub struct Turn<'a, W: 'a> {
    ring: &'a DispatchRing<W>,
    row: usize,
    sink: Option<W>,
}

impl<'a, W> Turn<'a, W> {
    /// The row this turn was granted for.
    pub fn row(&self) -> usize {
        self.row
    }

    /// The output sink.
    pub fn sink(&mut self) -> &mut W {
        self.sink
            .as_mut()
            .unwrap_or_else(|| unreachable!("a live turn always holds the sink"))
    }

    /// The row is out: hand the sink to the slot of the next row.
    pub fn release(mut self) {
        if let Some(sink) = self.sink.take() {
            let next = self.ring.slot_for(self.row + 1);
            trace!("row {} done, arming slot {}", self.row, next);
            self.ring.arm(next, sink);
        }
    }
}

impl<'a, W> Drop for Turn<'a, W> {
    fn drop(&mut self) {
        if let Some(sink) = self.sink.take() {
            warn!("turn for row {} abandoned, cancelling the ring", self.row);
            self.ring.cancel();
            // Parked back where it came from so teardown can still
            // restore the terminal.
            let index = self.ring.slot_for(self.row);
            *self.ring.slots[index].lock() = Some(sink);
        }
    }
}
