//! Bounded User Address Space
//!
//! A page-granular image of one process's user memory: `[0, size)` rounded
//! up to whole pages, each page carrying its own permission flags. It is the
//! safe stand-in for the hardware page table when the kernel copies data
//! into a caller's address space.
//!
//! # Security Properties
//! - A copy is validated across its whole range before any byte is written
//! - Pages without `USER | WRITE` reject copy-out (guard pages, text)
//! - Growth past `limit` fails and leaves the size untouched

use alloc::vec::Vec;

use bitflags::bitflags;

use super::address::{page_round_up, VirtAddr, PAGE_SIZE};
use crate::syscall::validate::{validate_user_range, UserRange};

bitflags! {
    /// Permission flags of a single user page.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PteFlags: u8 {
        /// Entry is present.
        const VALID = 1 << 0;
        const READ = 1 << 1;
        const WRITE = 1 << 2;
        const EXEC = 1 << 3;
        /// Accessible from EL0.
        const USER = 1 << 4;

        /// Ordinary heap/data page.
        const USER_DATA = Self::VALID.bits() | Self::READ.bits()
            | Self::WRITE.bits() | Self::USER.bits();
        /// Program text.
        const USER_CODE = Self::VALID.bits() | Self::READ.bits()
            | Self::EXEC.bits() | Self::USER.bits();
        /// Stack guard: present but kernel-only.
        const GUARD = Self::VALID.bits() | Self::READ.bits() | Self::WRITE.bits();
    }
}

/// Error type for user mapping operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingError {
    /// Some page in the range is not mapped.
    NotMapped,
    /// Some page in the range is not writable from user mode.
    ReadOnly,
    /// Growing would exceed the address-space limit.
    OutOfMemory,
    /// The range or the new size does not fit in the address width.
    Overflow,
}

impl core::fmt::Display for MappingError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotMapped => write!(f, "virtual address not mapped"),
            Self::ReadOnly => write!(f, "page not writable from user mode"),
            Self::OutOfMemory => write!(f, "address space limit reached"),
            Self::Overflow => write!(f, "address arithmetic overflow"),
        }
    }
}

/// One process's user memory.
#[derive(Debug)]
pub struct UserSpace {
    /// Current size in bytes (the program break).
    size: usize,
    /// Maximum size in bytes.
    limit: usize,
    /// Flags for each mapped page; `pages.len()` pages are mapped.
    pages: Vec<PteFlags>,
    /// Backing bytes, `pages.len() * PAGE_SIZE` long.
    memory: Vec<u8>,
}

impl UserSpace {
    /// Create an empty address space that may grow up to `limit` bytes.
    pub const fn new(limit: usize) -> Self {
        Self {
            size: 0,
            limit,
            pages: Vec::new(),
            memory: Vec::new(),
        }
    }

    /// Create an address space with `size` bytes of user data already mapped.
    pub fn with_size(size: usize, limit: usize) -> Result<Self, MappingError> {
        let mut space = Self::new(limit);
        let delta = isize::try_from(size).map_err(|_| MappingError::Overflow)?;
        space.grow(delta)?;
        Ok(space)
    }

    /// Current size in bytes.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of mapped pages.
    #[inline]
    pub fn mapped_pages(&self) -> usize {
        self.pages.len()
    }

    /// Grow or shrink by `delta` bytes.
    ///
    /// Returns the size before the change. On error nothing is modified.
    pub fn grow(&mut self, delta: isize) -> Result<usize, MappingError> {
        let old = self.size;
        let new = old
            .checked_add_signed(delta)
            .ok_or(MappingError::Overflow)?;
        if new > self.limit {
            return Err(MappingError::OutOfMemory);
        }

        let pages = page_round_up(new) / PAGE_SIZE;
        self.pages.resize(pages, PteFlags::USER_DATA);
        self.memory.resize(pages * PAGE_SIZE, 0);
        self.size = new;

        log::trace!("[USPACE] grow {} -> {} ({} pages)", old, new, pages);
        Ok(old)
    }

    /// Replace the flags of the page containing `va`.
    pub fn set_page_flags(&mut self, va: VirtAddr, flags: PteFlags) -> Result<(), MappingError> {
        let pte = self
            .pages
            .get_mut(va.page_number())
            .ok_or(MappingError::NotMapped)?;
        *pte = flags;
        Ok(())
    }

    /// Check every page covered by `range` for `required` flags.
    fn check_pages(&self, range: &UserRange, required: PteFlags) -> Result<(), MappingError> {
        for page in range.pages() {
            let flags = *self.pages.get(page).ok_or(MappingError::NotMapped)?;
            if !flags.contains(PteFlags::VALID) {
                return Err(MappingError::NotMapped);
            }
            if !flags.contains(required) {
                return Err(MappingError::ReadOnly);
            }
        }
        Ok(())
    }

    /// Copy `src` to user address `dst`.
    ///
    /// The whole destination range is checked first, so a failed copy
    /// writes nothing.
    pub fn copy_out(&mut self, dst: VirtAddr, src: &[u8]) -> Result<(), MappingError> {
        let range = validate_user_range(dst, src.len())?;
        if range.is_empty() {
            return Ok(());
        }
        self.check_pages(&range, PteFlags::USER | PteFlags::WRITE)?;
        self.memory[range.start()..range.end()].copy_from_slice(src);
        Ok(())
    }

    /// Borrow `len` bytes of user memory at `src`.
    pub fn read(&self, src: VirtAddr, len: usize) -> Result<&[u8], MappingError> {
        let range = validate_user_range(src, len)?;
        if range.is_empty() {
            return Ok(&[]);
        }
        self.check_pages(&range, PteFlags::USER | PteFlags::READ)?;
        Ok(&self.memory[range.start()..range.end()])
    }
}
