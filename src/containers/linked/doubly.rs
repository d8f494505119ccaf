//! Doubly-linked sentinel ring.

use super::{
    for_each_mut, shuffled_order, sorted_order, swap_values, Arena, LinkNode, LinkedIter,
    SENTINEL,
};
use crate::containers::backing::{Backing, Growth};
use crate::error::Result;
use crate::memory::Allocator;
use crate::random::Pcg32;
use std::alloc::Layout;
use std::cmp::Ordering;

pub(crate) struct Node<T> {
    value: Option<T>,
    prev: usize,
    next: usize,
}

impl<T> LinkNode<T> for Node<T> {
    #[inline]
    fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    #[inline]
    fn value_mut(&mut self) -> Option<&mut T> {
        self.value.as_mut()
    }

    fn take_value(&mut self) -> Option<T> {
        self.value.take()
    }

    fn put_value(&mut self, value: Option<T>) {
        self.value = value;
    }

    #[inline]
    fn next(&self) -> usize {
        self.next
    }
}

/// Every endpoint operation is O(1); indexed access walks from whichever
/// end is closer.
pub(crate) struct DoublyLinkedList<T> {
    arena: Arena<Node<T>>,
    len: usize,
}

impl<T> DoublyLinkedList<T> {
    pub(crate) fn new<A: Allocator>(alloc: &A) -> Result<Self> {
        let sentinel = Node {
            value: None,
            prev: SENTINEL,
            next: SENTINEL,
        };
        Ok(Self {
            arena: Arena::with_sentinel(sentinel, alloc)?,
            len: 0,
        })
    }

    pub(crate) fn node_layout() -> Layout {
        Arena::<Node<T>>::node_layout()
    }

    pub(crate) fn iter(&self) -> LinkedIter<'_, T, Node<T>> {
        LinkedIter::new(&self.arena, self.len)
    }

    /// Slot of the element at `index`, walking the shorter direction.
    fn node_at(&self, index: usize) -> usize {
        let mut cursor = SENTINEL;
        if index <= self.len / 2 {
            for _ in 0..=index {
                cursor = self.arena[cursor].next;
            }
        } else {
            for _ in index..self.len {
                cursor = self.arena[cursor].prev;
            }
        }
        cursor
    }

    /// Insert a node between two adjacent slots.
    fn link_between<A: Allocator>(&mut self, value: T, prev: usize, next: usize, alloc: &A) -> Result<()> {
        let node = Node {
            value: Some(value),
            prev,
            next,
        };
        let index = self.arena.insert(node, alloc)?;
        self.arena[prev].next = index;
        self.arena[next].prev = index;
        self.len += 1;
        Ok(())
    }

    fn unlink<A: Allocator>(&mut self, index: usize, alloc: &A) -> Option<T> {
        if index == SENTINEL {
            return None;
        }
        let (prev, next) = (self.arena[index].prev, self.arena[index].next);
        self.arena[prev].next = next;
        self.arena[next].prev = prev;
        self.len -= 1;
        self.arena.remove(index, alloc).and_then(|node| node.value)
    }

    fn relink(&mut self, order: &[usize]) {
        let mut prev = SENTINEL;
        for &index in order {
            self.arena[prev].next = index;
            self.arena[index].prev = prev;
            prev = index;
        }
        self.arena[prev].next = SENTINEL;
        self.arena[SENTINEL].prev = prev;
    }
}

impl<T> Backing<T> for DoublyLinkedList<T> {
    #[inline]
    fn len(&self) -> usize {
        self.len
    }

    fn capacity(&self) -> usize {
        self.len + self.arena.prepaid()
    }

    fn footprint(&self) -> usize {
        self.arena.footprint()
    }

    fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }
        self.arena[self.node_at(index)].value.as_ref()
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index >= self.len {
            return None;
        }
        let node = self.node_at(index);
        self.arena[node].value.as_mut()
    }

    fn push<A: Allocator>(&mut self, value: T, growth: &Growth<'_, A>) -> Result<()> {
        let tail = self.arena[SENTINEL].prev;
        self.link_between(value, tail, SENTINEL, growth.alloc)
    }

    fn unshift<A: Allocator>(&mut self, value: T, growth: &Growth<'_, A>) -> Result<()> {
        let head = self.arena[SENTINEL].next;
        self.link_between(value, SENTINEL, head, growth.alloc)
    }

    fn pop<A: Allocator>(&mut self, alloc: &A) -> Option<T> {
        let tail = self.arena[SENTINEL].prev;
        self.unlink(tail, alloc)
    }

    fn shift<A: Allocator>(&mut self, alloc: &A) -> Option<T> {
        let head = self.arena[SENTINEL].next;
        self.unlink(head, alloc)
    }

    fn reserve<A: Allocator>(&mut self, additional: usize, growth: &Growth<'_, A>) -> Result<()> {
        self.arena.reserve(additional, growth.alloc)
    }

    fn position(&self, pred: &mut dyn FnMut(&T) -> bool) -> Option<usize> {
        self.iter().position(|item| pred(item))
    }

    fn remove_at<A: Allocator>(&mut self, index: usize, alloc: &A) -> Option<T> {
        if index >= self.len {
            return None;
        }
        let node = self.node_at(index);
        self.unlink(node, alloc)
    }

    fn discard_all<A: Allocator>(
        &mut self,
        pred: &mut dyn FnMut(&T) -> bool,
        alloc: &A,
        sink: &mut dyn FnMut(T),
    ) -> usize {
        let mut removed = 0;
        let mut cursor = self.arena[SENTINEL].next;
        while cursor != SENTINEL {
            let next = self.arena[cursor].next;
            let matched = self.arena[cursor].value.as_ref().map_or(false, |v| pred(v));
            if matched {
                if let Some(value) = self.unlink(cursor, alloc) {
                    sink(value);
                }
                removed += 1;
            }
            cursor = next;
        }
        removed
    }

    fn swap(&mut self, a: usize, b: usize) {
        let (a, b) = (self.node_at(a), self.node_at(b));
        swap_values(&mut self.arena, a, b);
    }

    fn for_each_mut(&mut self, f: &mut dyn FnMut(&mut T)) {
        for_each_mut(&mut self.arena, f);
    }

    fn shuffle(&mut self, rng: &mut Pcg32) {
        let order = shuffled_order(&self.arena, self.len, rng);
        self.relink(&order);
    }

    fn sort_by(&mut self, cmp: &mut dyn FnMut(&T, &T) -> Ordering) {
        let order = sorted_order(&self.arena, self.len, cmp);
        self.relink(&order);
    }
}

impl<T> DoublyLinkedList<T> {
    /// Element order walking backward from the tail, for ring checks.
    #[cfg(test)]
    fn backward_order(&self) -> Vec<usize> {
        let mut order = Vec::new();
        let mut cursor = self.arena[SENTINEL].prev;
        while cursor != SENTINEL {
            order.push(cursor);
            cursor = self.arena[cursor].prev;
        }
        order
    }

    #[cfg(test)]
    fn ring_is_consistent(&self) -> bool {
        let mut forward = super::collect_order(&self.arena, self.len);
        let backward = self.backward_order();
        forward.reverse();
        forward.len() == self.len && forward == backward
    }
}
