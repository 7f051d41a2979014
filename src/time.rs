//! Tick-Wait Gate
//!
//! The global tick counter and the lock that guards it. The timer
//! interrupt calls [`TickGate::advance`]; sleepers hold a [`TickGuard`] and
//! hand it to the scheduler, which releases and re-acquires it around the
//! actual suspension.
//!
//! # Invariants
//! - The counter only changes under the lock, and only upward
//! - There is no unlocked read; [`TickGate::now`] takes the lock briefly

use spin::{Mutex, MutexGuard};

use crate::proc::{Scheduler, WaitChannel};

/// Monitor over the global tick counter.
pub struct TickGate {
    ticks: Mutex<u64>,
}

/// Global tick gate, live from boot for the lifetime of the kernel.
pub static TICKS: TickGate = TickGate::new();

impl TickGate {
    pub const fn new() -> Self {
        Self {
            ticks: Mutex::new(0),
        }
    }

    /// Acquire the gate lock.
    pub fn lock(&self) -> TickGuard<'_> {
        TickGuard {
            gate: self,
            ticks: self.ticks.lock(),
        }
    }

    /// Consistent snapshot of the counter.
    pub fn now(&self) -> u64 {
        *self.ticks.lock()
    }

    /// Snapshot of the counter, or `None` if the lock is held.
    pub fn try_now(&self) -> Option<u64> {
        self.ticks.try_lock().map(|ticks| *ticks)
    }

    /// The channel sleepers on this gate wait on.
    pub fn channel(&self) -> WaitChannel {
        WaitChannel::of(self)
    }

    /// Record one timer tick and wake every sleeper.
    ///
    /// The wakeup is issued while the lock is still held.
    pub fn advance<S: Scheduler + ?Sized>(&self, sched: &S) {
        let mut ticks = self.ticks.lock();
        *ticks += 1;
        sched.wakeup(self.channel());
    }
}

impl Default for TickGate {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for TickGate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.try_now() {
            Some(ticks) => write!(f, "TickGate({})", ticks),
            None => write!(f, "TickGate(<locked>)"),
        }
    }
}

/// Proof that the gate lock is held.
pub struct TickGuard<'a> {
    gate: &'a TickGate,
    ticks: MutexGuard<'a, u64>,
}

impl<'a> TickGuard<'a> {
    /// Counter value under the lock.
    #[inline]
    pub fn ticks(&self) -> u64 {
        *self.ticks
    }

    /// The gate this guard locks.
    #[inline]
    pub fn gate(&self) -> &'a TickGate {
        self.gate
    }

    /// Release the lock, run `f`, then take the lock again.
    ///
    /// Used by [`Scheduler::sleep`] implementations once the sleeper is
    /// registered, so nothing can slip between release and suspension.
    pub fn release_while<F: FnOnce()>(self, f: F) -> TickGuard<'a> {
        let gate = self.gate;
        drop(self.ticks);
        f();
        gate.lock()
    }
}
