//! Host-side test kernel
//!
//! `MockKernel` implements every kernel service over in-memory state. Its
//! scheduler never blocks: each `sleep` consumes the next scripted
//! [`SleepEvent`] while the gate lock is released, which makes tick and
//! kill interleavings deterministic.

use alloc::collections::VecDeque;
use alloc::string::String;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicI64, AtomicU64, AtomicUsize, Ordering};

use log::LevelFilter;
use spin::{Mutex, Once};

use crate::logger::{self, KernelLogger};
use crate::mm::address::VirtAddr;
use crate::mm::uspace::{MappingError, PteFlags, UserSpace};
use crate::proc::{
    Kernel, MemoryManager, Pid, Proc, ProcessTable, Scheduler, UserCopy, WaitChannel,
};
use crate::time::{TickGate, TickGuard};

/// What happens while a scripted sleeper is suspended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SleepEvent {
    /// The timer fires `n` times.
    Ticks(u64),
    /// The sleeper is killed.
    Kill,
    /// The sleeper is killed and the timer fires once.
    KillAndTick,
    /// Woken with nothing changed.
    Spurious,
}

pub(crate) struct MockKernel {
    proc: Option<Proc>,
    space: Mutex<UserSpace>,
    gate: TickGate,
    fork_result: AtomicI64,
    wait_result: AtomicI64,
    last_wait_addr: Mutex<Option<usize>>,
    killed_pids: Mutex<Vec<i32>>,
    free_memory: AtomicU64,
    active: AtomicU64,
    events: Mutex<VecDeque<SleepEvent>>,
    sleeps: AtomicUsize,
}

impl MockKernel {
    /// Caller `pid` with an empty address space.
    pub(crate) fn new(pid: i32) -> Self {
        Self::with_memory(pid, 0, 0)
    }

    /// Caller `pid` with `size` bytes mapped and room to grow to `limit`.
    pub(crate) fn with_memory(pid: i32, size: usize, limit: usize) -> Self {
        let space = UserSpace::with_size(size, limit).expect("initial size within limit");
        Self::build(Some(Proc::new(Pid::new(pid), size)), space)
    }

    /// No resolvable caller.
    pub(crate) fn without_process() -> Self {
        Self::build(None, UserSpace::new(0))
    }

    fn build(proc: Option<Proc>, space: UserSpace) -> Self {
        Self {
            proc,
            space: Mutex::new(space),
            gate: TickGate::new(),
            fork_result: AtomicI64::new(2),
            wait_result: AtomicI64::new(-1),
            last_wait_addr: Mutex::new(None),
            killed_pids: Mutex::new(Vec::new()),
            free_memory: AtomicU64::new(0),
            active: AtomicU64::new(1),
            events: Mutex::new(VecDeque::new()),
            sleeps: AtomicUsize::new(0),
        }
    }

    pub(crate) fn proc(&self) -> &Proc {
        self.proc.as_ref().expect("mock kernel has no process")
    }

    pub(crate) fn set_fork_result(&self, value: i64) {
        self.fork_result.store(value, Ordering::SeqCst);
    }

    pub(crate) fn set_wait_result(&self, value: i64) {
        self.wait_result.store(value, Ordering::SeqCst);
    }

    pub(crate) fn last_wait_addr(&self) -> Option<usize> {
        *self.last_wait_addr.lock()
    }

    pub(crate) fn killed_pids(&self) -> Vec<i32> {
        self.killed_pids.lock().clone()
    }

    pub(crate) fn set_free_memory(&self, bytes: u64) {
        self.free_memory.store(bytes, Ordering::SeqCst);
    }

    pub(crate) fn set_active_processes(&self, count: u64) {
        self.active.store(count, Ordering::SeqCst);
    }

    pub(crate) fn set_page_flags(&self, va: VirtAddr, flags: PteFlags) {
        self.space
            .lock()
            .set_page_flags(va, flags)
            .expect("page is mapped");
    }

    pub(crate) fn read_user(&self, va: VirtAddr, len: usize) -> Vec<u8> {
        self.space
            .lock()
            .read(va, len)
            .expect("readable user range")
            .to_vec()
    }

    /// Queue events for upcoming sleeps.
    pub(crate) fn script(&self, events: impl IntoIterator<Item = SleepEvent>) {
        self.events.lock().extend(events);
    }

    /// Number of times a process was suspended.
    pub(crate) fn sleep_count(&self) -> usize {
        self.sleeps.load(Ordering::SeqCst)
    }

    /// Fire the timer `n` times.
    pub(crate) fn advance_ticks(&self, n: u64) {
        for _ in 0..n {
            self.gate.advance(self);
        }
    }
}

impl ProcessTable for MockKernel {
    fn current(&self) -> Option<&Proc> {
        self.proc.as_ref()
    }

    fn exit(&self, status: i32) -> ! {
        panic!("exit({})", status);
    }

    fn fork(&self) -> i64 {
        self.fork_result.load(Ordering::SeqCst)
    }

    fn wait(&self, status_addr: VirtAddr) -> i64 {
        *self.last_wait_addr.lock() = Some(status_addr.as_usize());
        self.wait_result.load(Ordering::SeqCst)
    }

    fn kill(&self, pid: i32) -> i64 {
        if pid < 0 {
            return -1;
        }
        if let Some(proc) = self.proc.as_ref().filter(|p| p.pid().as_i32() == pid) {
            proc.set_killed();
        }
        self.killed_pids.lock().push(pid);
        0
    }

    fn count_active(&self) -> u64 {
        self.active.load(Ordering::SeqCst)
    }
}

impl MemoryManager for MockKernel {
    fn grow(&self, proc: &Proc, delta: i32) -> Result<(), MappingError> {
        let mut space = self.space.lock();
        space.grow(delta as isize)?;
        proc.set_size(space.size());
        Ok(())
    }

    fn free_memory(&self) -> u64 {
        self.free_memory.load(Ordering::SeqCst)
    }
}

impl UserCopy for MockKernel {
    fn copy_out(&self, _proc: &Proc, dst: VirtAddr, src: &[u8]) -> Result<(), MappingError> {
        self.space.lock().copy_out(dst, src)
    }
}

impl Scheduler for MockKernel {
    fn sleep<'a>(&self, chan: WaitChannel, guard: TickGuard<'a>) -> TickGuard<'a> {
        assert_eq!(chan, guard.gate().channel());
        self.sleeps.fetch_add(1, Ordering::SeqCst);
        let event = self
            .events
            .lock()
            .pop_front()
            .expect("sleep with no scripted event would block forever");

        guard.release_while(|| match event {
            SleepEvent::Ticks(n) => self.advance_ticks(n),
            SleepEvent::Kill => self.proc().set_killed(),
            SleepEvent::KillAndTick => {
                self.proc().set_killed();
                self.advance_ticks(1);
            }
            SleepEvent::Spurious => {}
        })
    }

    fn wakeup(&self, _chan: WaitChannel) {}
}

impl Kernel for MockKernel {
    fn tick_gate(&self) -> &TickGate {
        &self.gate
    }
}

static LOGS: KernelLogger<String> = KernelLogger::new(String::new(), LevelFilter::Info);
static LOGS_INSTALLED: Once = Once::new();

/// Install the capturing logger (once per test binary) and return it.
pub(crate) fn capture_logs() -> &'static KernelLogger<String> {
    LOGS_INSTALLED.call_once(|| {
        logger::init(&LOGS).expect("no other logger in the test binary");
    });
    &LOGS
}
