//! Calling Process and Kernel Services
//!
//! The syscall layer owns no process state. It sees the caller through
//! [`Proc`] and reaches the rest of the kernel through the traits below,
//! each of which states the contract the handlers rely on.
//!
//! # Design
//! - [`ProcessTable`]: caller lookup, fork/exit/wait/kill, occupancy
//! - [`MemoryManager`]: address-space growth and free-memory accounting
//! - [`UserCopy`]: the cross-address-space copy primitive
//! - [`Scheduler`]: sleep/wakeup on a [`WaitChannel`]
//! - [`Kernel`]: all of the above plus the Tick-Wait Gate

use core::fmt;
use core::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};

use bitflags::bitflags;

use crate::mm::address::VirtAddr;
use crate::mm::uspace::MappingError;
use crate::time::{TickGate, TickGuard, TICKS};

/// Process identifier.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Pid(i32);

impl Pid {
    #[inline]
    pub const fn new(pid: i32) -> Self {
        Self(pid)
    }

    #[inline]
    pub const fn as_i32(self) -> i32 {
        self.0
    }
}

impl fmt::Debug for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pid({})", self.0)
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

bitflags! {
    /// Per-process syscall trace mask: bit `n` traces syscall number `n`.
    ///
    /// Bits with no syscall behind them are kept as the caller set them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TraceMask: u32 {
        const FORK = 1 << 1;
        const EXIT = 1 << 2;
        const WAIT = 1 << 3;
        const KILL = 1 << 6;
        const GETPID = 1 << 11;
        const SBRK = 1 << 12;
        const SLEEP = 1 << 13;
        const UPTIME = 1 << 14;
        const TRACE = 1 << 22;
        const SYSINFO = 1 << 23;
    }
}

impl TraceMask {
    /// Whether syscall number `num` is traced.
    #[inline]
    pub fn traces(self, num: usize) -> bool {
        num < 32 && self.bits() & (1 << num) != 0
    }
}

/// The process on whose behalf a syscall runs.
///
/// Owned by the process table. Fields the syscall layer touches are
/// atomics so a handler only ever needs `&Proc`.
#[derive(Debug)]
pub struct Proc {
    pid: Pid,
    /// Size of the user address space in bytes.
    size: AtomicUsize,
    trace_mask: AtomicU32,
    killed: AtomicBool,
}

impl Proc {
    pub const fn new(pid: Pid, size: usize) -> Self {
        Self {
            pid,
            size: AtomicUsize::new(size),
            trace_mask: AtomicU32::new(0),
            killed: AtomicBool::new(false),
        }
    }

    #[inline]
    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Current address-space size in bytes.
    #[inline]
    pub fn size(&self) -> usize {
        self.size.load(Ordering::Acquire)
    }

    /// Record a new address-space size. Only the growth service calls this.
    #[inline]
    pub fn set_size(&self, size: usize) {
        self.size.store(size, Ordering::Release);
    }

    #[inline]
    pub fn trace_mask(&self) -> TraceMask {
        TraceMask::from_bits_retain(self.trace_mask.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn set_trace_mask(&self, mask: TraceMask) {
        self.trace_mask.store(mask.bits(), Ordering::Relaxed);
    }

    /// Whether the process has been marked for termination.
    #[inline]
    pub fn killed(&self) -> bool {
        self.killed.load(Ordering::Acquire)
    }

    /// Mark the process for termination. There is no way to clear it.
    #[inline]
    pub fn set_killed(&self) {
        self.killed.store(true, Ordering::Release);
    }
}

/// Something a process can sleep on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WaitChannel(usize);

impl WaitChannel {
    /// Channel identified by the address of a kernel object.
    pub fn of<T>(object: &T) -> Self {
        Self(object as *const T as usize)
    }
}

/// Process table services.
pub trait ProcessTable {
    /// The process making the current syscall.
    fn current(&self) -> Option<&Proc>;

    /// Terminate the current process with `status`. Does not return.
    fn exit(&self, status: i32) -> !;

    /// Duplicate the current process. Child pid, or negative on failure.
    fn fork(&self) -> i64;

    /// Reap a child, writing its exit status to `status_addr` if non-zero.
    /// Child pid, or negative on failure.
    fn wait(&self, status_addr: VirtAddr) -> i64;

    /// Mark process `pid` killed. 0, or negative if there is no such process.
    fn kill(&self, pid: i32) -> i64;

    /// Number of process slots in use.
    fn count_active(&self) -> u64;
}

/// Memory services.
pub trait MemoryManager {
    /// Grow (or shrink, for negative `delta`) the address space of `proc`.
    ///
    /// On success `proc.size()` has moved by `delta`. On failure it is
    /// unchanged.
    fn grow(&self, proc: &Proc, delta: i32) -> Result<(), MappingError>;

    /// Free physical memory in bytes.
    fn free_memory(&self) -> u64;
}

/// Kernel-to-user copy.
pub trait UserCopy {
    /// Copy `src` to `dst` in the address space of `proc`.
    ///
    /// Fails if any destination byte is unmapped or not user-writable.
    fn copy_out(&self, proc: &Proc, dst: VirtAddr, src: &[u8]) -> Result<(), MappingError>;
}

/// Sleep/wakeup.
pub trait Scheduler {
    /// Suspend the current process on `chan`, releasing `guard` meanwhile.
    ///
    /// The process must be recorded as sleeping on `chan` before the gate
    /// lock is released, so a `wakeup` issued after the release cannot be
    /// missed. The lock is held again on return. Spurious returns are
    /// allowed; callers recheck their condition.
    fn sleep<'a>(&self, chan: WaitChannel, guard: TickGuard<'a>) -> TickGuard<'a>;

    /// Wake every process sleeping on `chan`.
    fn wakeup(&self, chan: WaitChannel);
}

/// Everything the syscall handlers need from the kernel.
pub trait Kernel: ProcessTable + MemoryManager + UserCopy + Scheduler {
    /// The global tick monitor.
    fn tick_gate(&self) -> &TickGate {
        &TICKS
    }
}
