//! PantherOS - Process-Control System Call Layer
//!
//! The trust boundary between EL0 callers and the kernel's process
//! services. Every value that crosses it is fetched from the caller's saved
//! register context, checked, handed to exactly one kernel service, and a
//! single scalar goes back in `x0`.
//!
//! # Security Model
//! - User values are never dereferenced by this layer
//! - User addresses are only written through [`proc::UserCopy`], which
//!   rejects unmapped or read-only destinations
//! - Failures collapse to `-1`; no kernel state leaks through error values
//!
//! # Layout
//! - [`exception`]: saved register context and SVC decode
//! - [`syscall`]: argument fetching, dispatch and the handlers
//! - [`time`]: the Tick-Wait Gate (tick counter monitor)
//! - [`proc`]: calling-process model and the kernel services it relies on
//! - [`mm`]: address types and the bounded user address-space image
//! - [`logger`]: `log` backend for the kernel console

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]

extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod exception;
pub mod logger;
pub mod mm;
pub mod proc;
pub mod syscall;
pub mod time;

#[cfg(test)]
mod testing;

pub use proc::{Kernel, Pid, Proc, TraceMask};
pub use syscall::{dispatch, SyscallError, SyscallResult};
pub use time::{TickGate, TICKS};
