//! Timer syscalls: sleep and uptime
//!
//! Both go through the Tick-Wait Gate. `sleep` is the only handler in this
//! layer that suspends the caller.

use crate::proc::Kernel;

use super::args::SyscallArgs;
use super::handler::{SyscallError, SyscallResult};

/// Sleep for the number of ticks in slot 0.
///
/// A negative count is treated as zero, and a zero count returns 0 without
/// touching the caller or the gate. Otherwise the caller's `killed` flag is
/// checked before every suspension, so a kill ends the sleep at the next
/// wakeup with -1.
pub fn sys_sleep<K: Kernel + ?Sized>(args: &SyscallArgs<'_>, kernel: &K) -> SyscallResult {
    let n = args.int(0).max(0) as u64;
    if n == 0 {
        return Ok(0);
    }
    let proc = kernel.current().ok_or(SyscallError::NoProcess)?;
    let gate = kernel.tick_gate();

    let mut guard = gate.lock();
    let start = guard.ticks();
    while guard.ticks() - start < n {
        if proc.killed() {
            drop(guard);
            log::debug!("[SYSCALL] sleep({}): pid {} killed", n, proc.pid());
            return Err(SyscallError::Killed);
        }
        guard = kernel.sleep(gate.channel(), guard);
    }
    drop(guard);

    Ok(0)
}

/// Ticks since boot.
pub fn sys_uptime<K: Kernel + ?Sized>(_args: &SyscallArgs<'_>, kernel: &K) -> SyscallResult {
    Ok(kernel.tick_gate().now() as i64)
}
