//! Memory management types for the syscall layer
//!
//! Provides:
//! - Virtual address type and page constants
//! - A bounded user address-space image with per-page permissions
//!
//! # Security Principles
//! - User addresses are plain values until a range check admits them
//! - Writes into user space are all-or-nothing per range

pub mod address;
pub mod uspace;

pub use address::{VirtAddr, PAGE_SIZE};
pub use uspace::{MappingError, PteFlags, UserSpace};
