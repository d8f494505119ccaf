//! Circular-buffer backing with O(1) operations at both ends.
//!
//! The active window is `len` consecutive slots (modulo capacity) starting
//! at `start`. The window's end is derived, so a full buffer has
//! `start == end` with a nonzero length.

use super::backing::{admit_slots, Backing, Growth};
use crate::error::Result;
use crate::memory::Allocator;
use crate::random::{sampling, Pcg32};
use std::cmp::Ordering;
use std::mem;
use std::slice;

pub(crate) struct Deque<T> {
    slots: Vec<Option<T>>,
    start: usize,
    len: usize,
}

impl<T> Deque<T> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            start: 0,
            len: 0,
        }
    }

    /// Buffer with exactly `capacity` admitted slots.
    pub(crate) fn with_capacity<A: Allocator>(capacity: usize, alloc: &A) -> Result<Self> {
        let mut deque = Self::new();
        if capacity > 0 {
            admit_slots(&mut deque.slots, 0, capacity, alloc)?;
            deque.slots.resize_with(capacity, || None);
        }
        Ok(deque)
    }

    #[inline]
    fn cap(&self) -> usize {
        self.slots.len()
    }

    /// Physical slot of logical position `index`.
    #[inline]
    fn physical(&self, index: usize) -> usize {
        let cap = self.cap();
        let offset = self.start + index;
        if offset >= cap {
            offset - cap
        } else {
            offset
        }
    }

    /// One past the last occupied slot.
    #[inline]
    pub(crate) fn end(&self) -> usize {
        if self.cap() == 0 {
            0
        } else {
            (self.start + self.len) % self.cap()
        }
    }

    fn grow_to<A: Allocator>(&mut self, required: usize, growth: &Growth<'_, A>) -> Result<()> {
        let old_cap = self.cap();
        let new_cap = growth.next_capacity(old_cap, required)?;
        admit_slots(&mut self.slots, old_cap, new_cap, growth.alloc)?;
        self.slots.resize_with(new_cap, || None);
        log::trace!("deque grew {} -> {}", old_cap, new_cap);
        self.reorient(old_cap);
        Ok(())
    }

    /// Restore a consecutive window after the buffer grew from `old_cap`.
    ///
    /// A window that wrapped past the old end has its low segment
    /// `[0, wrapped)` moved into the new tail space; whatever does not fit
    /// slides down to index 0 and stays wrapped.
    fn reorient(&mut self, old_cap: usize) {
        let wrapped = (self.start + self.len).saturating_sub(old_cap);
        if wrapped == 0 {
            return;
        }
        let added = self.cap() - old_cap;
        let moved = wrapped.min(added);
        for i in 0..moved {
            self.slots[old_cap + i] = self.slots[i].take();
        }
        self.slots[..wrapped].rotate_left(moved);
        log::debug!(
            "deque reoriented: moved {} of {} wrapped slots past old capacity {}",
            moved,
            wrapped,
            old_cap
        );
    }

    /// Rotate the window so it occupies `[0, len)`.
    pub(crate) fn make_contiguous(&mut self) -> &mut [Option<T>] {
        if self.start != 0 {
            self.slots.rotate_left(self.start);
            self.start = 0;
        }
        &mut self.slots[..self.len]
    }

    pub(crate) fn iter(&self) -> RingIter<'_, T> {
        let (head, tail) = if self.start + self.len <= self.cap() {
            (&self.slots[self.start..self.start + self.len], &self.slots[..0])
        } else {
            let wrapped = self.start + self.len - self.cap();
            (&self.slots[self.start..], &self.slots[..wrapped])
        };
        RingIter {
            head: head.iter(),
            tail: tail.iter(),
            remaining: self.len,
        }
    }

    fn segments_mut(&mut self) -> (&mut [Option<T>], &mut [Option<T>]) {
        let cap = self.cap();
        let empty: &mut [Option<T>] = &mut [];
        if self.start + self.len <= cap {
            (&mut self.slots[self.start..self.start + self.len], empty)
        } else {
            let wrapped = self.start + self.len - cap;
            let (low, high) = self.slots.split_at_mut(self.start);
            (high, &mut low[..wrapped])
        }
    }
}

impl<T> Backing<T> for Deque<T> {
    #[inline]
    fn len(&self) -> usize {
        self.len
    }

    fn capacity(&self) -> usize {
        self.cap()
    }

    fn footprint(&self) -> usize {
        mem::size_of::<Option<T>>() * self.cap()
    }

    #[inline]
    fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }
        self.slots[self.physical(index)].as_ref()
    }

    #[inline]
    fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index >= self.len {
            return None;
        }
        let slot = self.physical(index);
        self.slots[slot].as_mut()
    }

    fn push<A: Allocator>(&mut self, value: T, growth: &Growth<'_, A>) -> Result<()> {
        if self.len == self.cap() {
            self.grow_to(self.len + 1, growth)?;
        }
        let slot = self.physical(self.len);
        self.slots[slot] = Some(value);
        self.len += 1;
        Ok(())
    }

    fn unshift<A: Allocator>(&mut self, value: T, growth: &Growth<'_, A>) -> Result<()> {
        if self.len == self.cap() {
            self.grow_to(self.len + 1, growth)?;
        }
        self.start = if self.start == 0 {
            self.cap() - 1
        } else {
            self.start - 1
        };
        self.slots[self.start] = Some(value);
        self.len += 1;
        Ok(())
    }

    fn pop<A: Allocator>(&mut self, _alloc: &A) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        let slot = self.physical(self.len);
        self.slots[slot].take()
    }

    fn shift<A: Allocator>(&mut self, _alloc: &A) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let value = self.slots[self.start].take();
        self.start = self.physical(1);
        self.len -= 1;
        if self.len == 0 {
            self.start = 0;
        }
        value
    }

    fn reserve<A: Allocator>(&mut self, additional: usize, growth: &Growth<'_, A>) -> Result<()> {
        let required = self.len.saturating_add(additional);
        if required > self.cap() {
            self.grow_to(required, growth)?;
        }
        Ok(())
    }

    fn position(&self, pred: &mut dyn FnMut(&T) -> bool) -> Option<usize> {
        self.iter().position(|item| pred(item))
    }

    fn remove_at<A: Allocator>(&mut self, index: usize, _alloc: &A) -> Option<T> {
        if index >= self.len {
            return None;
        }
        let slot = self.physical(index);
        let value = self.slots[slot].take();
        if index < self.len / 2 {
            // close the gap from the front
            for k in (0..index).rev() {
                let (from, to) = (self.physical(k), self.physical(k + 1));
                self.slots[to] = self.slots[from].take();
            }
            self.start = self.physical(1);
        } else {
            for k in index..self.len - 1 {
                let (from, to) = (self.physical(k + 1), self.physical(k));
                self.slots[to] = self.slots[from].take();
            }
        }
        self.len -= 1;
        value
    }

    fn discard_all<A: Allocator>(
        &mut self,
        pred: &mut dyn FnMut(&T) -> bool,
        _alloc: &A,
        sink: &mut dyn FnMut(T),
    ) -> usize {
        let cap = self.cap();
        let mut read = self.start;
        let mut write = self.start;
        let mut removed = 0;
        for _ in 0..self.len {
            if let Some(value) = self.slots[read].take() {
                if pred(&value) {
                    sink(value);
                    removed += 1;
                } else {
                    self.slots[write] = Some(value);
                    write += 1;
                    if write == cap {
                        write = 0;
                    }
                }
            }
            read += 1;
            if read == cap {
                read = 0;
            }
        }
        self.len -= removed;
        if self.len == 0 {
            self.start = 0;
        }
        removed
    }

    fn swap(&mut self, a: usize, b: usize) {
        let (a, b) = (self.physical(a), self.physical(b));
        self.slots.swap(a, b);
    }

    fn for_each_mut(&mut self, f: &mut dyn FnMut(&mut T)) {
        let (head, tail) = self.segments_mut();
        head.iter_mut()
            .chain(tail.iter_mut())
            .filter_map(Option::as_mut)
            .for_each(f);
    }

    fn shuffle(&mut self, rng: &mut Pcg32) {
        sampling::shuffle(self.make_contiguous(), rng);
    }

    fn sort_by(&mut self, cmp: &mut dyn FnMut(&T, &T) -> Ordering) {
        self.make_contiguous().sort_by(|a, b| match (a, b) {
            (Some(a), Some(b)) => cmp(a, b),
            _ => Ordering::Equal,
        });
    }
}

/// Iterator over a deque's window, head segment then wrapped segment.
pub struct RingIter<'a, T> {
    head: slice::Iter<'a, Option<T>>,
    tail: slice::Iter<'a, Option<T>>,
    remaining: usize,
}

impl<'a, T> Iterator for RingIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let slot = match self.head.next() {
            Some(slot) => slot,
            None => self.tail.next()?,
        };
        self.remaining = self.remaining.saturating_sub(1);
        slot.as_ref()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> ExactSizeIterator for RingIter<'a, T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{BoundedAllocator, SystemAllocator};

    fn growth(alloc: &SystemAllocator) -> Growth<'_, SystemAllocator> {
        Growth {
            alloc,
            max_capacity: u32::MAX as usize,
        }
    }

    fn contents(deque: &Deque<char>) -> String {
        deque.iter().collect()
    }

    /// `[a, b, c, d]` in a capacity-4 buffer with `start == end == 2`.
    fn wrapped_abcd(alloc: &SystemAllocator) -> Result<Deque<char>> {
        let g = growth(alloc);
        let mut deque = Deque::with_capacity(4, alloc)?;
        for c in ['p', 'q', 'a', 'b'] {
            deque.push(c, &g)?;
        }
        assert_eq!(deque.shift(alloc), Some('p'));
        assert_eq!(deque.shift(alloc), Some('q'));
        deque.push('c', &g)?;
        deque.push('d', &g)?;
        assert_eq!((deque.start, deque.end(), deque.len), (2, 2, 4));
        Ok(deque)
    }

    #[test]
    fn test_growth_reorients_wrapped_window() -> Result<()> {
        let alloc = SystemAllocator;
        let mut deque = wrapped_abcd(&alloc)?;
        deque.push('e', &growth(&alloc))?;
        assert_eq!(deque.capacity(), 8);
        let mut shifted = String::new();
        while let Some(c) = deque.shift(&alloc) {
            shifted.push(c);
        }
        assert_eq!(shifted, "abcde");
        Ok(())
    }

    #[test]
    fn test_reorient_partial_move() -> Result<()> {
        let alloc = SystemAllocator;
        let g = growth(&alloc);
        let mut deque: Deque<u32> = Deque::with_capacity(10, &alloc)?;
        for i in 0..10 {
            deque.push(i, &g)?;
        }
        for _ in 0..9 {
            deque.shift(&alloc);
        }
        for i in 10..19 {
            deque.push(i, &g)?;
        }
        // start 9, nine elements wrapped into [0, 9)
        assert_eq!(deque.start, 9);
        deque.push(19, &g)?;
        assert_eq!(deque.capacity(), 15);
        assert_eq!(deque.iter().copied().collect::<Vec<_>>(), (9..20).collect::<Vec<_>>());
        Ok(())
    }

    #[test]
    fn test_unshift_wraps_to_back() -> Result<()> {
        let alloc = SystemAllocator;
        let g = growth(&alloc);
        let mut deque = Deque::new();
        deque.push('b', &g)?;
        deque.unshift('a', &g)?;
        assert_eq!(deque.start, deque.capacity() - 1);
        assert_eq!(contents(&deque), "ab");
        assert_eq!(deque.pop(&alloc), Some('b'));
        assert_eq!(deque.pop(&alloc), Some('a'));
        assert_eq!(deque.pop(&alloc), None);
        Ok(())
    }

    #[test]
    fn test_discard_all_across_wrap() -> Result<()> {
        let alloc = SystemAllocator;
        let mut deque = wrapped_abcd(&alloc)?;
        let mut removed = String::new();
        let count = deque.discard_all(
            &mut |c| *c == 'b' || *c == 'c',
            &alloc,
            &mut |c| removed.push(c),
        );
        assert_eq!(count, 2);
        assert_eq!(removed, "bc");
        assert_eq!(contents(&deque), "ad");
        assert_eq!(deque.get(1), Some(&'d'));
        Ok(())
    }

    #[test]
    fn test_remove_at_both_halves() -> Result<()> {
        let alloc = SystemAllocator;
        let mut deque = wrapped_abcd(&alloc)?;
        assert_eq!(deque.remove_at(1, &alloc), Some('b'));
        assert_eq!(contents(&deque), "acd");
        assert_eq!(deque.remove_at(2, &alloc), Some('d'));
        assert_eq!(contents(&deque), "ac");
        Ok(())
    }

    #[test]
    fn test_sort_and_shuffle_unwrap_first() -> Result<()> {
        let alloc = SystemAllocator;
        let mut deque = wrapped_abcd(&alloc)?;
        deque.swap(0, 3);
        assert_eq!(contents(&deque), "dbca");
        deque.sort_by(&mut |a, b| a.cmp(b));
        assert_eq!(deque.start, 0);
        assert_eq!(contents(&deque), "abcd");

        let mut rng = Pcg32::new(1, 1);
        deque.shuffle(&mut rng);
        let mut chars: Vec<char> = deque.iter().copied().collect();
        chars.sort_unstable();
        assert_eq!(chars, vec!['a', 'b', 'c', 'd']);
        Ok(())
    }

    #[test]
    fn test_for_each_mut_visits_both_segments() -> Result<()> {
        let alloc = SystemAllocator;
        let mut deque = wrapped_abcd(&alloc)?;
        deque.for_each_mut(&mut |c| *c = c.to_ascii_uppercase());
        assert_eq!(contents(&deque), "ABCD");
        Ok(())
    }

    #[test]
    fn test_refused_growth_keeps_window() -> Result<()> {
        let alloc = BoundedAllocator::new(mem::size_of::<Option<u8>>() * 2);
        let g = Growth {
            alloc: &alloc,
            max_capacity: 100,
        };
        let mut deque: Deque<u8> = Deque::with_capacity(2, &alloc)?;
        deque.push(1, &g)?;
        deque.push(2, &g)?;
        assert!(deque.push(3, &g).is_err());
        assert_eq!(deque.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(deque.capacity(), 2);
        Ok(())
    }
}
