//! User Virtual Address Type
//!
//! A user-supplied address is just a number until something checks it.
//! `VirtAddr` keeps it from being mixed up with sizes or counts and makes the
//! point where it becomes a pointer explicit.
//!
//! # Security Properties
//! - No conversion to a raw pointer is offered
//! - Arithmetic is checked; an overflowing range is rejected, not wrapped

use core::fmt;

/// Page size (4 KiB)
pub const PAGE_SIZE: usize = 4096;
/// Page size mask
pub const PAGE_MASK: usize = PAGE_SIZE - 1;
/// Bits to shift for page number
pub const PAGE_SHIFT: usize = 12;

/// End of user virtual addresses (exclusive). Lower half of the 48-bit space.
pub const USER_VA_END: usize = 0x0001_0000_0000_0000;

/// Round a byte count up to a whole number of pages.
#[inline]
pub const fn page_round_up(len: usize) -> usize {
    (len + PAGE_MASK) & !PAGE_MASK
}

/// A virtual address in a user address space.
///
/// Constructed verbatim from a syscall argument. Nothing about it is
/// trusted: it may be unmapped, misaligned or outside user space entirely.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct VirtAddr(usize);

impl VirtAddr {
    /// Wrap a raw address value.
    #[inline]
    pub const fn new(addr: usize) -> Self {
        Self(addr)
    }

    /// Get the raw address value.
    #[inline]
    pub const fn as_usize(self) -> usize {
        self.0
    }

    /// Add a byte offset, failing on overflow.
    #[inline]
    pub const fn checked_add(self, offset: usize) -> Option<Self> {
        match self.0.checked_add(offset) {
            Some(addr) => Some(Self(addr)),
            None => None,
        }
    }

    /// Index of the page containing this address.
    #[inline]
    pub const fn page_number(self) -> usize {
        self.0 >> PAGE_SHIFT
    }

    /// Check if the address lies in the user half of the address space.
    #[inline]
    pub const fn is_user(self) -> bool {
        self.0 < USER_VA_END
    }
}

impl From<u64> for VirtAddr {
    fn from(raw: u64) -> Self {
        Self(raw as usize)
    }
}

impl fmt::Debug for VirtAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VirtAddr({:#018x})", self.0)
    }
}

impl fmt::Display for VirtAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}
