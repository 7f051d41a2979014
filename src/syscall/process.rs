//! Process-control syscalls
//!
//! Identity, lifecycle, address-space growth, kill and trace. Each handler
//! fetches its own arguments and calls exactly one kernel service; results
//! from fork, wait and kill are passed through unchanged.

use crate::proc::{Kernel, Proc, TraceMask};

use super::args::SyscallArgs;
use super::handler::{SyscallError, SyscallResult};

fn caller<K: Kernel + ?Sized>(kernel: &K) -> Result<&Proc, SyscallError> {
    kernel.current().ok_or(SyscallError::NoProcess)
}

/// Exit system call
///
/// Terminates the current process with the given status code. Never
/// returns to the caller.
pub fn sys_exit<K: Kernel + ?Sized>(args: &SyscallArgs<'_>, kernel: &K) -> SyscallResult {
    let status = args.int(0);
    log::trace!("[SYSCALL] exit({})", status);
    kernel.exit(status)
}

/// Process id of the caller.
///
/// Returns -1 only if no calling process can be resolved, which a kernel
/// dispatching from a trap never does.
pub fn sys_getpid<K: Kernel + ?Sized>(_args: &SyscallArgs<'_>, kernel: &K) -> SyscallResult {
    Ok(caller(kernel)?.pid().as_i32() as i64)
}

/// Duplicate the caller. Child pid in the parent, or the service's
/// failure value.
pub fn sys_fork<K: Kernel + ?Sized>(_args: &SyscallArgs<'_>, kernel: &K) -> SyscallResult {
    let pid = kernel.fork();
    log::trace!("[SYSCALL] fork() = {}", pid);
    Ok(pid)
}

/// Wait for a child to exit; its status goes to the address in slot 0.
pub fn sys_wait<K: Kernel + ?Sized>(args: &SyscallArgs<'_>, kernel: &K) -> SyscallResult {
    let status_addr = args.addr(0);
    log::trace!("[SYSCALL] wait({})", status_addr);
    Ok(kernel.wait(status_addr))
}

/// Grow the address space by the signed delta in slot 0.
///
/// # Returns
/// The size *before* growing, so the caller knows where the new region
/// starts. On failure the size is unchanged.
pub fn sys_sbrk<K: Kernel + ?Sized>(args: &SyscallArgs<'_>, kernel: &K) -> SyscallResult {
    let delta = args.int(0);
    let proc = caller(kernel)?;
    let old_size = proc.size();

    kernel.grow(proc, delta).map_err(|e| {
        log::debug!("[SYSCALL] sbrk({}) from {:#x}: {}", delta, old_size, e);
        SyscallError::from(e)
    })?;

    log::trace!("[SYSCALL] sbrk({}) = {:#x}", delta, old_size);
    Ok(old_size as i64)
}

/// Mark the process in slot 0 killed.
pub fn sys_kill<K: Kernel + ?Sized>(args: &SyscallArgs<'_>, kernel: &K) -> SyscallResult {
    let pid = args.int(0);
    log::trace!("[SYSCALL] kill({})", pid);
    Ok(kernel.kill(pid))
}

/// Store the trace mask in slot 0 on the caller.
pub fn sys_trace<K: Kernel + ?Sized>(args: &SyscallArgs<'_>, kernel: &K) -> SyscallResult {
    let mask = TraceMask::from_bits_retain(args.int(0) as u32);
    caller(kernel)?.set_trace_mask(mask);
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exception::ExceptionContext;
    use crate::mm::address::PAGE_SIZE;
    use crate::syscall::{dispatch, numbers};
    use crate::testing::MockKernel;

    fn call(kernel: &MockKernel, num: usize, args: &[u64]) -> i64 {
        let ctx = ExceptionContext::for_syscall(num, args);
        dispatch(num, &ctx, kernel)
    }

    #[test]
    fn test_getpid() {
        let kernel = MockKernel::new(9);
        assert_eq!(call(&kernel, numbers::SYS_GETPID, &[]), 9);
    }

    #[test]
    fn test_fork_result_is_verbatim() {
        let kernel = MockKernel::new(1);
        kernel.set_fork_result(12);
        assert_eq!(call(&kernel, numbers::SYS_FORK, &[]), 12);
        kernel.set_fork_result(-1);
        assert_eq!(call(&kernel, numbers::SYS_FORK, &[]), -1);
    }

    #[test]
    fn test_wait_passes_address_and_result() {
        let kernel = MockKernel::new(1);
        kernel.set_wait_result(5);
        assert_eq!(call(&kernel, numbers::SYS_WAIT, &[0x2000]), 5);
        assert_eq!(kernel.last_wait_addr(), Some(0x2000));
    }

    #[test]
    fn test_kill_passes_pid_and_result() {
        let kernel = MockKernel::new(1);
        assert_eq!(call(&kernel, numbers::SYS_KILL, &[4]), 0);
        assert_eq!(kernel.killed_pids(), [4]);
        assert_eq!(call(&kernel, numbers::SYS_KILL, &[(-3i64) as u64]), -1);
    }

    #[test]
    #[should_panic(expected = "exit(3)")]
    fn test_exit_does_not_return() {
        let kernel = MockKernel::new(1);
        call(&kernel, numbers::SYS_EXIT, &[3]);
    }

    #[test]
    fn test_sbrk_returns_previous_size() {
        let kernel = MockKernel::with_memory(1, PAGE_SIZE, 8 * PAGE_SIZE);
        assert_eq!(call(&kernel, numbers::SYS_SBRK, &[100]), PAGE_SIZE as i64);
        assert_eq!(kernel.proc().size(), PAGE_SIZE + 100);
        assert_eq!(
            call(&kernel, numbers::SYS_SBRK, &[PAGE_SIZE as u64]),
            (PAGE_SIZE + 100) as i64
        );
        assert_eq!(kernel.proc().size(), 2 * PAGE_SIZE + 100);
    }

    #[test]
    fn test_sbrk_negative_shrinks() {
        let kernel = MockKernel::with_memory(1, 2 * PAGE_SIZE, 8 * PAGE_SIZE);
        let delta = -(PAGE_SIZE as i64);
        assert_eq!(
            call(&kernel, numbers::SYS_SBRK, &[delta as u64]),
            2 * PAGE_SIZE as i64
        );
        assert_eq!(kernel.proc().size(), PAGE_SIZE);
    }

    #[test]
    fn test_sbrk_zero_reports_current_size() {
        let kernel = MockKernel::with_memory(1, 3 * PAGE_SIZE, 8 * PAGE_SIZE);
        assert_eq!(call(&kernel, numbers::SYS_SBRK, &[0]), 3 * PAGE_SIZE as i64);
        assert_eq!(kernel.proc().size(), 3 * PAGE_SIZE);
    }

    #[test]
    fn test_sbrk_failure_leaves_size() {
        let kernel = MockKernel::with_memory(1, PAGE_SIZE, 2 * PAGE_SIZE);
        assert_eq!(call(&kernel, numbers::SYS_SBRK, &[(2 * PAGE_SIZE) as u64]), -1);
        assert_eq!(kernel.proc().size(), PAGE_SIZE);

        let below_zero = -(2 * PAGE_SIZE as i64);
        assert_eq!(call(&kernel, numbers::SYS_SBRK, &[below_zero as u64]), -1);
        assert_eq!(kernel.proc().size(), PAGE_SIZE);
    }

    #[test]
    fn test_trace_stores_mask() {
        let kernel = MockKernel::new(1);
        assert_eq!(call(&kernel, numbers::SYS_TRACE, &[0b1010]), 0);
        assert_eq!(kernel.proc().trace_mask().bits(), 0b1010);

        assert_eq!(call(&kernel, numbers::SYS_TRACE, &[(-1i64) as u64]), 0);
        assert_eq!(kernel.proc().trace_mask().bits(), u32::MAX);
    }

    #[test]
    fn test_no_caller_fails() {
        let kernel = MockKernel::without_process();
        assert_eq!(call(&kernel, numbers::SYS_TRACE, &[1]), -1);
        assert_eq!(call(&kernel, numbers::SYS_SBRK, &[1]), -1);
        assert_eq!(call(&kernel, numbers::SYS_GETPID, &[]), -1);
    }
}
