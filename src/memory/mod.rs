//! Allocation capabilities
//!
//! Every structure in this crate is built with an [`Allocator`] and keeps it
//! for its whole lifetime. The allocator admits (or refuses) each block of
//! memory the structure is about to own and is told when the block is given
//! back, so one budget can be shared by many structures.
//!
//! - [`SystemAllocator`] admits everything; real exhaustion still surfaces
//!   through `Vec::try_reserve` as [`PolyseqError::OutOfMemory`].
//! - [`BoundedAllocator`] enforces a byte limit and records statistics.

mod bounded;

pub use bounded::{AllocatorStats, BoundedAllocator};

use crate::error::{PolyseqError, Result};
use std::alloc::Layout;
use std::mem;

/// Admission and accounting for the memory owned by a structure.
///
/// Implementations are cheap handles: cloning one must yield a handle to the
/// same underlying budget.
pub trait Allocator: Clone {
    /// Admit `size` more bytes, or explain why they cannot be provided.
    fn allocate(&self, size: usize) -> Result<()>;

    /// Return `size` bytes previously admitted by [`Allocator::allocate`].
    fn deallocate(&self, size: usize);

    /// Bytes currently admitted and not yet returned, if tracked.
    fn in_use(&self) -> Option<usize> {
        None
    }
}

/// Allocator that admits every request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemAllocator;

impl Allocator for SystemAllocator {
    #[inline]
    fn allocate(&self, _size: usize) -> Result<()> {
        Ok(())
    }

    #[inline]
    fn deallocate(&self, _size: usize) {}
}

/// Size in bytes of `count` values of `T`, or [`PolyseqError::TooBig`] when
/// the array could not exist in the address space.
#[inline]
pub(crate) fn array_bytes<T>(count: usize) -> Result<usize> {
    Layout::array::<T>(count)
        .map(|layout| layout.size())
        .map_err(|_| PolyseqError::too_big(count, max_elements::<T>()))
}

/// Largest number of `T` values a single allocation can describe.
#[inline]
pub(crate) fn max_elements<T>() -> usize {
    match mem::size_of::<T>() {
        0 => usize::MAX,
        size => isize::MAX as usize / size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_allocator_admits_everything() {
        let alloc = SystemAllocator;
        assert!(alloc.allocate(0).is_ok());
        assert!(alloc.allocate(usize::MAX).is_ok());
        alloc.deallocate(usize::MAX);
        assert_eq!(alloc.in_use(), None);
    }

    #[test]
    fn test_array_bytes() {
        assert_eq!(array_bytes::<u64>(4), Ok(32));
        assert_eq!(array_bytes::<()>(1000), Ok(0));
        assert!(matches!(
            array_bytes::<u64>(usize::MAX / 2),
            Err(PolyseqError::TooBig { .. })
        ));
    }

    #[test]
    fn test_max_elements() {
        assert_eq!(max_elements::<u8>(), isize::MAX as usize);
        assert_eq!(max_elements::<u64>(), isize::MAX as usize / 8);
        assert_eq!(max_elements::<()>(), usize::MAX);
    }
}
