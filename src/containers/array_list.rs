//! Growable contiguous array backing.

use super::backing::{admit_slots, Backing, Growth};
use crate::error::Result;
use crate::memory::Allocator;
use crate::random::{sampling, Pcg32};
use std::cmp::Ordering;
use std::mem;

/// Contiguous buffer with O(1) amortized `push`/`pop` and O(n)
/// `unshift`/`shift`.
///
/// `capacity` is the admitted slot count; the buffer never shrinks.
pub(crate) struct ArrayList<T> {
    items: Vec<T>,
    capacity: usize,
}

impl<T> ArrayList<T> {
    pub(crate) fn new() -> Self {
        Self {
            items: Vec::new(),
            capacity: 0,
        }
    }

    /// Buffer with exactly `capacity` admitted slots.
    pub(crate) fn with_capacity<A: Allocator>(capacity: usize, alloc: &A) -> Result<Self> {
        let mut list = Self::new();
        if capacity > 0 {
            admit_slots(&mut list.items, 0, capacity, alloc)?;
            list.capacity = capacity;
        }
        Ok(list)
    }

    pub(crate) fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Move every element of `other` to the back, leaving it empty.
    pub(crate) fn append<A: Allocator>(&mut self, other: &mut Self, growth: &Growth<'_, A>) -> Result<()> {
        self.reserve(other.items.len(), growth)?;
        self.items.append(&mut other.items);
        Ok(())
    }

    fn grow_to<A: Allocator>(&mut self, required: usize, growth: &Growth<'_, A>) -> Result<()> {
        let new_capacity = growth.next_capacity(self.capacity, required)?;
        admit_slots(&mut self.items, self.capacity, new_capacity, growth.alloc)?;
        log::trace!("array list grew {} -> {}", self.capacity, new_capacity);
        self.capacity = new_capacity;
        Ok(())
    }
}

impl<T> Backing<T> for ArrayList<T> {
    #[inline]
    fn len(&self) -> usize {
        self.items.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn footprint(&self) -> usize {
        mem::size_of::<T>() * self.capacity
    }

    #[inline]
    fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    #[inline]
    fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    fn push<A: Allocator>(&mut self, value: T, growth: &Growth<'_, A>) -> Result<()> {
        if self.items.len() == self.capacity {
            self.grow_to(self.items.len() + 1, growth)?;
        }
        self.items.push(value);
        Ok(())
    }

    fn unshift<A: Allocator>(&mut self, value: T, growth: &Growth<'_, A>) -> Result<()> {
        if self.items.len() == self.capacity {
            self.grow_to(self.items.len() + 1, growth)?;
        }
        self.items.insert(0, value);
        Ok(())
    }

    fn pop<A: Allocator>(&mut self, _alloc: &A) -> Option<T> {
        self.items.pop()
    }

    fn shift<A: Allocator>(&mut self, _alloc: &A) -> Option<T> {
        if self.items.is_empty() {
            None
        } else {
            Some(self.items.remove(0))
        }
    }

    fn reserve<A: Allocator>(&mut self, additional: usize, growth: &Growth<'_, A>) -> Result<()> {
        let required = self.items.len().saturating_add(additional);
        if required > self.capacity {
            self.grow_to(required, growth)?;
        }
        Ok(())
    }

    fn position(&self, pred: &mut dyn FnMut(&T) -> bool) -> Option<usize> {
        self.items.iter().position(|item| pred(item))
    }

    fn remove_at<A: Allocator>(&mut self, index: usize, _alloc: &A) -> Option<T> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    fn discard_all<A: Allocator>(
        &mut self,
        pred: &mut dyn FnMut(&T) -> bool,
        _alloc: &A,
        sink: &mut dyn FnMut(T),
    ) -> usize {
        let len = self.items.len();
        let mut write = 0;
        for read in 0..len {
            if !pred(&self.items[read]) {
                self.items.swap(write, read);
                write += 1;
            }
        }
        for value in self.items.drain(write..) {
            sink(value);
        }
        len - write
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.items.swap(a, b);
    }

    fn for_each_mut(&mut self, f: &mut dyn FnMut(&mut T)) {
        self.items.iter_mut().for_each(f);
    }

    fn shuffle(&mut self, rng: &mut Pcg32) {
        sampling::shuffle(&mut self.items, rng);
    }

    fn sort_by(&mut self, cmp: &mut dyn FnMut(&T, &T) -> Ordering) {
        self.items.sort_by(|a, b| cmp(a, b));
    }

    fn drain<A: Allocator>(&mut self, _alloc: &A, sink: &mut dyn FnMut(T)) {
        for value in self.items.drain(..) {
            sink(value);
        }
    }
}
