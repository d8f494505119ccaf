//! The contract every sequence backing satisfies.
//!
//! Backings never see raw caller indices: [`Sequence`](super::Sequence)
//! resolves negative indices, checks bounds and emptiness, and enforces the
//! length limit before delegating. Backings do own their growth and their
//! share of the allocator bookkeeping.

use crate::error::{PolyseqError, Result};
use crate::memory::{array_bytes, Allocator};
use crate::random::Pcg32;
use std::cmp::Ordering;

/// Smallest capacity a contiguous backing grows to.
pub(crate) const MIN_CAPACITY: usize = 8;

/// Allocator plus length limit, handed to operations that may grow.
pub(crate) struct Growth<'a, A> {
    pub(crate) alloc: &'a A,
    pub(crate) max_capacity: usize,
}

impl<'a, A: Allocator> Growth<'a, A> {
    /// Capacity to grow to from `current` when `required` slots are needed.
    ///
    /// Grows by half (at least to `required`, never below
    /// [`MIN_CAPACITY`]) and clamps to the limit.
    pub(crate) fn next_capacity(&self, current: usize, required: usize) -> Result<usize> {
        if required > self.max_capacity {
            return Err(PolyseqError::too_big(required, self.max_capacity));
        }
        let grown = current
            .saturating_add(current / 2)
            .max(required)
            .max(MIN_CAPACITY);
        Ok(grown.min(self.max_capacity))
    }
}

/// Admit and reserve room for `vec` to hold `to` slots, up from `from`
/// already admitted. On failure nothing is charged and `vec` is untouched.
pub(crate) fn admit_slots<X, A: Allocator>(
    vec: &mut Vec<X>,
    from: usize,
    to: usize,
    alloc: &A,
) -> Result<()> {
    array_bytes::<X>(to)?;
    let bytes = array_bytes::<X>(to - from)?;
    alloc.allocate(bytes)?;
    if vec.try_reserve_exact(to - vec.len()).is_err() {
        alloc.deallocate(bytes);
        return Err(PolyseqError::out_of_memory(bytes));
    }
    Ok(())
}

/// Operations shared by the four backings.
///
/// Indices are physical-order positions already checked to be in range.
pub(crate) trait Backing<T> {
    fn len(&self) -> usize;

    /// Elements storable without asking the allocator again.
    fn capacity(&self) -> usize;

    /// Bytes currently charged to the allocator.
    fn footprint(&self) -> usize;

    fn get(&self, index: usize) -> Option<&T>;

    fn get_mut(&mut self, index: usize) -> Option<&mut T>;

    fn push<A: Allocator>(&mut self, value: T, growth: &Growth<'_, A>) -> Result<()>;

    fn unshift<A: Allocator>(&mut self, value: T, growth: &Growth<'_, A>) -> Result<()>;

    fn pop<A: Allocator>(&mut self, alloc: &A) -> Option<T>;

    fn shift<A: Allocator>(&mut self, alloc: &A) -> Option<T>;

    /// Make room for `additional` more elements, all or nothing.
    fn reserve<A: Allocator>(&mut self, additional: usize, growth: &Growth<'_, A>) -> Result<()>;

    fn position(&self, pred: &mut dyn FnMut(&T) -> bool) -> Option<usize>;

    fn remove_at<A: Allocator>(&mut self, index: usize, alloc: &A) -> Option<T>;

    /// Remove every element matching `pred`, keeping survivors in order.
    /// Removed elements go to `sink`; returns how many were removed.
    fn discard_all<A: Allocator>(
        &mut self,
        pred: &mut dyn FnMut(&T) -> bool,
        alloc: &A,
        sink: &mut dyn FnMut(T),
    ) -> usize;

    fn swap(&mut self, a: usize, b: usize);

    fn for_each_mut(&mut self, f: &mut dyn FnMut(&mut T));

    fn shuffle(&mut self, rng: &mut Pcg32);

    /// Stable sort.
    fn sort_by(&mut self, cmp: &mut dyn FnMut(&T, &T) -> Ordering);

    /// Remove every element front to back.
    fn drain<A: Allocator>(&mut self, alloc: &A, sink: &mut dyn FnMut(T)) {
        while let Some(value) = self.shift(alloc) {
            sink(value);
        }
    }
}
