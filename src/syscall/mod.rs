//! System Call Interface
//!
//! Process-control system calls for user-mode applications.
//!
//! # Security Model
//! - Whitelist approach: only explicitly implemented syscalls are allowed
//! - Arguments are fetched per handler, by slot and expected type
//! - User addresses are only written through the checked copy primitive
//! - Every failure is reported as `-1`
//!
//! # Current Syscalls
//! - 1: fork() - duplicate the calling process
//! - 2: exit(status) - terminate the calling process
//! - 3: wait(status_addr) - reap a child
//! - 6: kill(pid) - mark a process killed
//! - 11: getpid() - caller's pid
//! - 12: sbrk(delta) - grow the address space, returns the old size
//! - 13: sleep(ticks) - wait for timer ticks
//! - 14: uptime() - ticks since boot
//! - 22: trace(mask) - set the caller's syscall trace mask
//! - 23: sysinfo(addr) - copy out free memory and process count

pub mod args;
mod handler;
pub mod process;
pub mod sysinfo;
pub mod time;
pub mod validate;

pub use args::{SyscallArgs, MAX_ARGS};
pub use handler::{dispatch, numbers, syscall_name, SyscallError, SyscallResult};
pub use sysinfo::SysInfo;
