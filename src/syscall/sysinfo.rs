//! sysinfo syscall
//!
//! Two phases: read the counters, then copy each field to the caller's
//! buffer in order. The fields are copied one at a time; if the second
//! copy fails the first one stays written.
//!
//! # User Buffer Layout
//! ```text
//! addr + 0: freemem  (u64, bytes of free physical memory)
//! addr + 8: nproc    (u64, process slots in use)
//! ```

use core::mem::{offset_of, size_of};

use crate::proc::Kernel;

use super::args::SyscallArgs;
use super::handler::{SyscallError, SyscallResult};

/// The record `sysinfo` writes into user memory.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SysInfo {
    /// Free physical memory in bytes.
    pub freemem: u64,
    /// Number of processes in use.
    pub nproc: u64,
}

impl SysInfo {
    /// Size of the record in user memory.
    pub const SIZE: usize = size_of::<Self>();

    /// Query the kernel counters.
    pub fn collect<K: Kernel + ?Sized>(kernel: &K) -> Self {
        Self {
            freemem: kernel.free_memory(),
            nproc: kernel.count_active(),
        }
    }

    /// Field offsets paired with their native-endian bytes, in field order.
    pub fn fields(&self) -> [(usize, [u8; 8]); 2] {
        [
            (offset_of!(SysInfo, freemem), self.freemem.to_ne_bytes()),
            (offset_of!(SysInfo, nproc), self.nproc.to_ne_bytes()),
        ]
    }
}

/// Copy a [`SysInfo`] to the user address in slot 0.
pub fn sys_sysinfo<K: Kernel + ?Sized>(args: &SyscallArgs<'_>, kernel: &K) -> SyscallResult {
    let proc = kernel.current().ok_or(SyscallError::NoProcess)?;
    let addr = args.addr(0);

    let info = SysInfo::collect(kernel);
    log::trace!("[SYSCALL] sysinfo({}) = {:?}", addr, info);

    for (offset, bytes) in info.fields() {
        let dst = addr.checked_add(offset).ok_or(SyscallError::Fault)?;
        kernel.copy_out(proc, dst, &bytes).map_err(|e| {
            log::debug!("[SYSCALL] sysinfo: copy to {} failed: {}", dst, e);
            SyscallError::from(e)
        })?;
    }

    Ok(0)
}
