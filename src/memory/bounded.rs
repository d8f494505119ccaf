//! Byte-budgeted allocator with shared statistics.

use super::Allocator;
use crate::error::{PolyseqError, Result};
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Snapshot of a [`BoundedAllocator`]'s bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AllocatorStats {
    /// Bytes currently admitted
    pub in_use: usize,
    /// Highest value `in_use` has reached
    pub peak: usize,
    /// Configured byte limit
    pub limit: usize,
    /// Number of admitted requests
    pub allocations: u64,
    /// Number of returned blocks
    pub deallocations: u64,
    /// Number of refused requests
    pub failures: u64,
}

#[derive(Default)]
struct Budget {
    limit: usize,
    in_use: Cell<usize>,
    peak: Cell<usize>,
    allocations: Cell<u64>,
    deallocations: Cell<u64>,
    failures: Cell<u64>,
}

/// Allocator that refuses requests once `limit` bytes are outstanding.
///
/// Clones share one budget, so a dictionary and every chain it creates draw
/// from the same pool. The handle is single-threaded (`Rc`), matching the
/// structures it serves.
///
/// # Examples
///
/// ```rust
/// use polyseq::memory::{Allocator, BoundedAllocator};
///
/// let alloc = BoundedAllocator::new(64);
/// assert!(alloc.allocate(48).is_ok());
/// assert!(alloc.allocate(32).is_err());
/// alloc.deallocate(48);
/// assert_eq!(alloc.stats().in_use, 0);
/// assert_eq!(alloc.stats().failures, 1);
/// ```
#[derive(Clone)]
pub struct BoundedAllocator {
    budget: Rc<Budget>,
}

impl BoundedAllocator {
    /// Create an allocator admitting at most `limit` outstanding bytes.
    pub fn new(limit: usize) -> Self {
        Self {
            budget: Rc::new(Budget {
                limit,
                ..Budget::default()
            }),
        }
    }

    /// Bytes still available under the limit.
    pub fn remaining(&self) -> usize {
        self.budget.limit.saturating_sub(self.budget.in_use.get())
    }

    /// Current statistics.
    pub fn stats(&self) -> AllocatorStats {
        let b = &self.budget;
        AllocatorStats {
            in_use: b.in_use.get(),
            peak: b.peak.get(),
            limit: b.limit,
            allocations: b.allocations.get(),
            deallocations: b.deallocations.get(),
            failures: b.failures.get(),
        }
    }
}

impl Allocator for BoundedAllocator {
    fn allocate(&self, size: usize) -> Result<()> {
        let b = &self.budget;
        let in_use = b.in_use.get();
        match in_use.checked_add(size) {
            Some(total) if total <= b.limit => {
                b.in_use.set(total);
                b.peak.set(b.peak.get().max(total));
                b.allocations.set(b.allocations.get() + 1);
                Ok(())
            }
            _ => {
                b.failures.set(b.failures.get() + 1);
                log::debug!(
                    "bounded allocator refused {} bytes ({} of {} in use)",
                    size,
                    in_use,
                    b.limit
                );
                Err(PolyseqError::out_of_memory(size))
            }
        }
    }

    fn deallocate(&self, size: usize) {
        let b = &self.budget;
        let in_use = b.in_use.get();
        if size > in_use {
            log::warn!(
                "bounded allocator released {} bytes but only {} were in use",
                size,
                in_use
            );
        }
        b.in_use.set(in_use.saturating_sub(size));
        b.deallocations.set(b.deallocations.get() + 1);
    }

    fn in_use(&self) -> Option<usize> {
        Some(self.budget.in_use.get())
    }
}

impl fmt::Debug for BoundedAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedAllocator")
            .field("limit", &self.budget.limit)
            .field("in_use", &self.budget.in_use.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_enforced() {
        let alloc = BoundedAllocator::new(100);
        assert!(alloc.allocate(60).is_ok());
        assert!(alloc.allocate(40).is_ok());
        assert_eq!(alloc.remaining(), 0);
        assert_eq!(alloc.allocate(1), Err(PolyseqError::out_of_memory(1)));

        let stats = alloc.stats();
        assert_eq!(stats.in_use, 100);
        assert_eq!(stats.peak, 100);
        assert_eq!(stats.allocations, 2);
        assert_eq!(stats.failures, 1);
    }

    #[test]
    fn test_clones_share_budget() {
        let a = BoundedAllocator::new(10);
        let b = a.clone();
        a.allocate(7).unwrap();
        assert!(b.allocate(4).is_err());
        b.allocate(3).unwrap();
        a.deallocate(10);
        assert_eq!(b.in_use(), Some(0));
        assert_eq!(b.stats().peak, 10);
    }

    #[test]
    fn test_overflowing_request_is_refused() {
        let alloc = BoundedAllocator::new(usize::MAX);
        alloc.allocate(10).unwrap();
        assert!(alloc.allocate(usize::MAX).is_err());
    }

    #[test]
    fn test_release_more_than_held_saturates() {
        let alloc = BoundedAllocator::new(8);
        alloc.allocate(4).unwrap();
        alloc.deallocate(16);
        assert_eq!(alloc.stats().in_use, 0);
    }
}
