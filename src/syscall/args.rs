//! System Call Argument Fetching
//!
//! Arguments arrive in `x0`-`x5` of the caller's saved context. A handler
//! asks for slot `n` as the type it expects; no other interpretation
//! happens here.
//!
//! # Security
//! - Values are returned exactly as the caller left them
//! - An address is only wrapped in [`VirtAddr`], never dereferenced;
//!   whoever uses it later must check it
//! - Slot numbers come from handler code, not from the caller, so an
//!   out-of-range slot is a kernel bug and panics

use crate::exception::ExceptionContext;
use crate::mm::address::VirtAddr;

/// Maximum number of argument registers a syscall may use (`x0`-`x5`).
pub const MAX_ARGS: usize = 6;

/// Typed view of a caller's syscall arguments.
#[derive(Debug, Clone, Copy)]
pub struct SyscallArgs<'a> {
    ctx: &'a ExceptionContext,
}

impl<'a> SyscallArgs<'a> {
    /// Borrow the argument registers of a saved context.
    pub fn new(ctx: &'a ExceptionContext) -> Self {
        Self { ctx }
    }

    /// Raw 64-bit register value of slot `n`.
    ///
    /// # Panics
    /// Panics if `n >= MAX_ARGS`.
    #[inline]
    pub fn raw(&self, n: usize) -> u64 {
        assert!(n < MAX_ARGS, "syscall argument slot {} out of range", n);
        self.ctx.gpr[n]
    }

    /// Slot `n` as a C `int` (the low 32 bits, sign preserved).
    #[inline]
    pub fn int(&self, n: usize) -> i32 {
        self.raw(n) as i32
    }

    /// Slot `n` as a user address.
    #[inline]
    pub fn addr(&self, n: usize) -> VirtAddr {
        VirtAddr::from(self.raw(n))
    }
}
