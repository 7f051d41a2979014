//! ARM64 Exception Context
//!
//! The register frame the vector stubs save on kernel entry, and the
//! synchronous-exception path that turns an `SVC` into a syscall.
//!
//! # Exception Levels
//! - EL0: User applications
//! - EL1: Kernel (where we run)
//!
//! # Calling Convention
//! - `x8`: syscall number
//! - `x0`-`x5`: arguments
//! - `x0`: result on return
//!
//! # Security Considerations
//! - The frame is caller-controlled data; only the syscall layer reads it
//! - Non-SVC exceptions are reported back, never dispatched

use crate::proc::Kernel;
use crate::syscall;

/// Register holding the syscall number.
pub const SYSCALL_NUMBER_REG: usize = 8;

/// Exception context saved on the stack
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct ExceptionContext {
    /// General purpose registers x0-x30
    pub gpr: [u64; 31],
    /// Exception Link Register (return address)
    pub elr: u64,
    /// Saved Program Status Register
    pub spsr: u64,
    /// Exception Syndrome Register
    pub esr: u64,
    /// Fault Address Register
    pub far: u64,
}

impl ExceptionContext {
    /// Build a frame for an `SVC` with the given number and arguments.
    pub fn for_syscall(num: usize, args: &[u64]) -> Self {
        let mut ctx = Self {
            esr: (ExceptionClass::SvcAarch64 as u64) << 26,
            ..Self::default()
        };
        ctx.gpr[SYSCALL_NUMBER_REG] = num as u64;
        ctx.gpr[..args.len()].copy_from_slice(args);
        ctx
    }

    /// Syscall number requested by the caller.
    #[inline]
    pub fn syscall_number(&self) -> usize {
        self.gpr[SYSCALL_NUMBER_REG] as usize
    }

    /// Value the caller will see in `x0`.
    #[inline]
    pub fn return_value(&self) -> i64 {
        self.gpr[0] as i64
    }
}

/// Exception class extracted from ESR_EL1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExceptionClass {
    Unknown = 0x00,
    SvcAarch64 = 0x15,
    InstructionAbortLowerEl = 0x20,
    DataAbortLowerEl = 0x24,
    Other = 0xFF,
}

impl From<u64> for ExceptionClass {
    fn from(esr: u64) -> Self {
        let ec = ((esr >> 26) & 0x3F) as u8;
        match ec {
            0x00 => ExceptionClass::Unknown,
            0x15 => ExceptionClass::SvcAarch64,
            0x20 => ExceptionClass::InstructionAbortLowerEl,
            0x24 => ExceptionClass::DataAbortLowerEl,
            _ => ExceptionClass::Other,
        }
    }
}

/// Handle a synchronous exception from EL0.
///
/// For `SVC` the syscall is dispatched and its result stored in `x0`;
/// the return value is `Ok(())`. Any other class is handed back to the
/// caller of this function, which decides the fate of the process.
pub fn handle_sync_lower_el<K: Kernel + ?Sized>(
    ctx: &mut ExceptionContext,
    kernel: &K,
) -> Result<(), ExceptionClass> {
    match ExceptionClass::from(ctx.esr) {
        ExceptionClass::SvcAarch64 => {
            let result = syscall::dispatch(ctx.syscall_number(), ctx, kernel);
            ctx.gpr[0] = result as u64;
            Ok(())
        }
        ec => {
            log::warn!(
                "[EXCEPTION] {:?} from user mode, ESR {:#018x}, FAR {:#018x}",
                ec,
                ctx.esr,
                ctx.far
            );
            Err(ec)
        }
    }
}
