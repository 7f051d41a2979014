//! System Call Handler
//!
//! Dispatches system calls to their handlers and collapses results to the
//! single scalar the caller sees.
//!
//! # Security Considerations
//! - All syscall numbers are validated against the whitelist
//! - Unknown syscalls return -1
//! - Error detail stays in the kernel log; the caller only sees -1

use core::fmt;

use crate::exception::ExceptionContext;
use crate::mm::uspace::MappingError;
use crate::proc::Kernel;

use super::args::SyscallArgs;
use super::{process, sysinfo, time};

/// System call numbers
pub mod numbers {
    pub const SYS_FORK: usize = 1;
    pub const SYS_EXIT: usize = 2;
    pub const SYS_WAIT: usize = 3;
    pub const SYS_KILL: usize = 6;
    pub const SYS_GETPID: usize = 11;
    pub const SYS_SBRK: usize = 12;
    pub const SYS_SLEEP: usize = 13;
    pub const SYS_UPTIME: usize = 14;
    pub const SYS_TRACE: usize = 22;
    pub const SYS_SYSINFO: usize = 23;
}

/// Why a syscall did not take effect.
///
/// Never returned to user mode; the caller sees [`SyscallError::RETURN_VALUE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyscallError {
    /// No calling process could be resolved
    NoProcess,
    /// A user address could not be written
    Fault,
    /// Address-space growth was refused
    OutOfMemory,
    /// The caller was killed while suspended
    Killed,
    /// Invalid system call number
    NoSys,
}

impl SyscallError {
    /// Value every failure is reported as.
    pub const RETURN_VALUE: i64 = -1;
}

impl fmt::Display for SyscallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoProcess => write!(f, "no calling process"),
            Self::Fault => write!(f, "bad user address"),
            Self::OutOfMemory => write!(f, "out of memory"),
            Self::Killed => write!(f, "killed while sleeping"),
            Self::NoSys => write!(f, "unknown system call"),
        }
    }
}

impl From<MappingError> for SyscallError {
    fn from(err: MappingError) -> Self {
        match err {
            MappingError::OutOfMemory => Self::OutOfMemory,
            MappingError::NotMapped | MappingError::ReadOnly | MappingError::Overflow => {
                Self::Fault
            }
        }
    }
}

/// Handler outcome before it crosses the boundary.
pub type SyscallResult = Result<i64, SyscallError>;

type Handler<K> = fn(&SyscallArgs<'_>, &K) -> SyscallResult;

/// Name of syscall `num`, for logs and traces.
pub fn syscall_name(num: usize) -> Option<&'static str> {
    let name = match num {
        numbers::SYS_FORK => "fork",
        numbers::SYS_EXIT => "exit",
        numbers::SYS_WAIT => "wait",
        numbers::SYS_KILL => "kill",
        numbers::SYS_GETPID => "getpid",
        numbers::SYS_SBRK => "sbrk",
        numbers::SYS_SLEEP => "sleep",
        numbers::SYS_UPTIME => "uptime",
        numbers::SYS_TRACE => "trace",
        numbers::SYS_SYSINFO => "sysinfo",
        _ => return None,
    };
    Some(name)
}

fn handler_for<K: Kernel + ?Sized>(num: usize) -> Option<Handler<K>> {
    let handler: Handler<K> = match num {
        numbers::SYS_FORK => process::sys_fork,
        numbers::SYS_EXIT => process::sys_exit,
        numbers::SYS_WAIT => process::sys_wait,
        numbers::SYS_KILL => process::sys_kill,
        numbers::SYS_GETPID => process::sys_getpid,
        numbers::SYS_SBRK => process::sys_sbrk,
        numbers::SYS_SLEEP => time::sys_sleep,
        numbers::SYS_UPTIME => time::sys_uptime,
        numbers::SYS_TRACE => process::sys_trace,
        numbers::SYS_SYSINFO => sysinfo::sys_sysinfo,
        _ => return None,
    };
    Some(handler)
}

/// Dispatch a system call
///
/// # Arguments
/// * `syscall_num` - System call number (from x8)
/// * `ctx` - Exception context with arguments (x0-x5)
/// * `kernel` - Services the handlers call into
///
/// # Returns
/// Result value to be placed in x0; -1 on any failure
///
/// If the caller's trace mask selects `syscall_num`, the call and its
/// result are logged at `info`.
pub fn dispatch<K: Kernel + ?Sized>(syscall_num: usize, ctx: &ExceptionContext, kernel: &K) -> i64 {
    let (Some(name), Some(handler)) = (syscall_name(syscall_num), handler_for::<K>(syscall_num))
    else {
        log::warn!("[SYSCALL] {}: {}", SyscallError::NoSys, syscall_num);
        return SyscallError::RETURN_VALUE;
    };

    let args = SyscallArgs::new(ctx);
    let ret = match handler(&args, kernel) {
        Ok(value) => value,
        Err(e) => {
            log::debug!("[SYSCALL] {} failed: {}", name, e);
            SyscallError::RETURN_VALUE
        }
    };

    if let Some(proc) = kernel.current() {
        if proc.trace_mask().traces(syscall_num) {
            log::info!("{}: syscall {} -> {}", proc.pid(), name, ret);
        }
    }

    ret
}
