//! System Call Input Validation
//!
//! Range checks for user-supplied addresses.
//!
//! # Security Principles
//! - Validate ALL user ranges before any copy touches them
//! - Fail-secure: an overflowing or non-user range is rejected
//! - This layer never dereferences a user address; it only produces a
//!   checked range for the copy primitive to walk

use core::ops::Range;

use crate::mm::address::{VirtAddr, PAGE_SHIFT};
use crate::mm::uspace::MappingError;

/// A validated user-space byte range.
///
/// This type guarantees that:
/// - `start + len` does not overflow
/// - The whole range lies in the user half of the address space
///
/// It says nothing about whether the pages are mapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserRange {
    start: usize,
    len: usize,
}

impl UserRange {
    /// First byte of the range.
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    /// One past the last byte.
    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Page numbers the range touches.
    pub fn pages(&self) -> Range<usize> {
        if self.len == 0 {
            return 0..0;
        }
        (self.start >> PAGE_SHIFT)..((self.end() - 1) >> PAGE_SHIFT) + 1
    }
}

/// Validate a user-space range
///
/// # Arguments
/// * `addr` - User-space address
/// * `len` - Length in bytes
///
/// # Returns
/// * `Ok(UserRange)` - Checked range
/// * `Err(MappingError)` - Validation failed
///
/// # Security Checks
/// 1. Start + length doesn't overflow
/// 2. Last byte is within user space
///
/// Zero-length ranges are always valid.
pub fn validate_user_range(addr: VirtAddr, len: usize) -> Result<UserRange, MappingError> {
    if len == 0 {
        return Ok(UserRange {
            start: addr.as_usize(),
            len: 0,
        });
    }

    let end = addr.checked_add(len).ok_or(MappingError::Overflow)?;

    let last = VirtAddr::new(end.as_usize() - 1);
    if !last.is_user() {
        return Err(MappingError::NotMapped);
    }

    Ok(UserRange {
        start: addr.as_usize(),
        len,
    })
}
