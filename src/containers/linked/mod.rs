//! Arena-backed sentinel rings shared by the two linked-list backings.
//!
//! Nodes live in an [`Arena`] and link to each other by slot index. Slot
//! [`SENTINEL`] holds a node that never carries an element; its links close
//! the ring, so an empty list is a sentinel pointing at itself.

mod doubly;
mod singly;

pub(crate) use doubly::{DoublyLinkedList, Node as DoublyNode};
pub(crate) use singly::{Node as SinglyNode, SinglyLinkedList};

use crate::error::{PolyseqError, Result};
use crate::memory::{array_bytes, Allocator};
use crate::random::{sampling, Pcg32};
use std::alloc::Layout;
use std::cmp::Ordering;
use std::marker::PhantomData;
use std::mem;
use std::ops::{Index, IndexMut};

/// Slot index of the sentinel node.
pub(crate) const SENTINEL: usize = 0;

enum Slot<N> {
    Occupied(N),
    Vacant { next_free: Option<usize> },
}

/// Slab of nodes with a free list, charging one node's size per live node.
pub(crate) struct Arena<N> {
    slots: Vec<Slot<N>>,
    free: Option<usize>,
    live: usize,
    prepaid: usize,
}

impl<N> Arena<N> {
    const NODE_BYTES: usize = mem::size_of::<Slot<N>>();

    pub(crate) fn node_layout() -> Layout {
        Layout::new::<Slot<N>>()
    }

    /// Arena holding only the sentinel.
    pub(crate) fn with_sentinel<A: Allocator>(sentinel: N, alloc: &A) -> Result<Self> {
        alloc.allocate(Self::NODE_BYTES)?;
        let mut slots = Vec::new();
        if slots.try_reserve(1).is_err() {
            alloc.deallocate(Self::NODE_BYTES);
            return Err(PolyseqError::out_of_memory(Self::NODE_BYTES));
        }
        slots.push(Slot::Occupied(sentinel));
        Ok(Self {
            slots,
            free: None,
            live: 1,
            prepaid: 0,
        })
    }

    /// Bytes charged: live nodes (sentinel included) plus reserved ones.
    pub(crate) fn footprint(&self) -> usize {
        (self.live + self.prepaid) * Self::NODE_BYTES
    }

    /// Nodes insertable without asking the allocator.
    pub(crate) fn prepaid(&self) -> usize {
        self.prepaid
    }

    pub(crate) fn insert<A: Allocator>(&mut self, node: N, alloc: &A) -> Result<usize> {
        let charged = self.prepaid == 0;
        if charged {
            alloc.allocate(Self::NODE_BYTES)?;
        }
        let index = match self.free {
            Some(index) => {
                if let Slot::Vacant { next_free } = self.slots[index] {
                    self.free = next_free;
                }
                self.slots[index] = Slot::Occupied(node);
                index
            }
            None => {
                if self.slots.try_reserve(1).is_err() {
                    if charged {
                        alloc.deallocate(Self::NODE_BYTES);
                    }
                    return Err(PolyseqError::out_of_memory(Self::NODE_BYTES));
                }
                self.slots.push(Slot::Occupied(node));
                self.slots.len() - 1
            }
        };
        if !charged {
            self.prepaid -= 1;
        }
        self.live += 1;
        Ok(index)
    }

    pub(crate) fn remove<A: Allocator>(&mut self, index: usize, alloc: &A) -> Option<N> {
        if index == SENTINEL {
            return None;
        }
        let vacant = Slot::Vacant {
            next_free: self.free,
        };
        match mem::replace(&mut self.slots[index], vacant) {
            Slot::Occupied(node) => {
                self.free = Some(index);
                self.live -= 1;
                alloc.deallocate(Self::NODE_BYTES);
                Some(node)
            }
            already_vacant => {
                self.slots[index] = already_vacant;
                None
            }
        }
    }

    /// Pre-admit `additional` nodes so the next inserts cannot fail.
    pub(crate) fn reserve<A: Allocator>(&mut self, additional: usize, alloc: &A) -> Result<()> {
        let missing = additional.saturating_sub(self.prepaid);
        if missing == 0 {
            return Ok(());
        }
        let bytes = array_bytes::<Slot<N>>(missing)?;
        alloc.allocate(bytes)?;
        if self.slots.try_reserve(additional).is_err() {
            alloc.deallocate(bytes);
            return Err(PolyseqError::out_of_memory(bytes));
        }
        self.prepaid += missing;
        Ok(())
    }

    fn get(&self, index: usize) -> Option<&N> {
        match self.slots.get(index) {
            Some(Slot::Occupied(node)) => Some(node),
            _ => None,
        }
    }
}

impl<N> Index<usize> for Arena<N> {
    type Output = N;

    fn index(&self, index: usize) -> &N {
        match &self.slots[index] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => panic!("vacant arena slot {}", index),
        }
    }
}

impl<N> IndexMut<usize> for Arena<N> {
    fn index_mut(&mut self, index: usize) -> &mut N {
        match &mut self.slots[index] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => panic!("vacant arena slot {}", index),
        }
    }
}

/// Access a node needs to give the shared ring algorithms.
pub(crate) trait LinkNode<T> {
    fn value(&self) -> Option<&T>;
    fn value_mut(&mut self) -> Option<&mut T>;
    fn take_value(&mut self) -> Option<T>;
    fn put_value(&mut self, value: Option<T>);
    fn next(&self) -> usize;
}

/// Node indices in list order.
pub(crate) fn collect_order<T, N: LinkNode<T>>(arena: &Arena<N>, len: usize) -> Vec<usize> {
    let mut order = Vec::with_capacity(len);
    let mut cursor = arena[SENTINEL].next();
    while cursor != SENTINEL {
        order.push(cursor);
        cursor = arena[cursor].next();
    }
    order
}

/// List order after a Fisher–Yates shuffle of the node indices.
pub(crate) fn shuffled_order<T, N: LinkNode<T>>(
    arena: &Arena<N>,
    len: usize,
    rng: &mut Pcg32,
) -> Vec<usize> {
    let mut order = collect_order(arena, len);
    sampling::shuffle(&mut order, rng);
    order
}

/// List order after a stable sort by element.
pub(crate) fn sorted_order<T, N: LinkNode<T>>(
    arena: &Arena<N>,
    len: usize,
    cmp: &mut dyn FnMut(&T, &T) -> Ordering,
) -> Vec<usize> {
    let mut order = collect_order(arena, len);
    order.sort_by(|&a, &b| match (arena[a].value(), arena[b].value()) {
        (Some(a), Some(b)) => cmp(a, b),
        _ => Ordering::Equal,
    });
    order
}

/// Exchange the elements held by two nodes, leaving links alone.
pub(crate) fn swap_values<T, N: LinkNode<T>>(arena: &mut Arena<N>, a: usize, b: usize) {
    if a == b {
        return;
    }
    let first = arena[a].take_value();
    let second = arena[b].take_value();
    arena[a].put_value(second);
    arena[b].put_value(first);
}

pub(crate) fn for_each_mut<T, N: LinkNode<T>>(arena: &mut Arena<N>, f: &mut dyn FnMut(&mut T)) {
    let mut cursor = arena[SENTINEL].next();
    while cursor != SENTINEL {
        let node = &mut arena[cursor];
        if let Some(value) = node.value_mut() {
            f(value);
        }
        cursor = node.next();
    }
}

/// Forward iterator over a sentinel ring.
pub struct LinkedIter<'a, T, N> {
    arena: &'a Arena<N>,
    cursor: usize,
    remaining: usize,
    _marker: PhantomData<&'a T>,
}

impl<'a, T, N: LinkNode<T>> LinkedIter<'a, T, N> {
    pub(crate) fn new(arena: &'a Arena<N>, len: usize) -> Self {
        Self {
            arena,
            cursor: arena[SENTINEL].next(),
            remaining: len,
            _marker: PhantomData,
        }
    }
}

impl<'a, T: 'a, N: LinkNode<T>> Iterator for LinkedIter<'a, T, N> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 || self.cursor == SENTINEL {
            return None;
        }
        let node = self.arena.get(self.cursor)?;
        self.cursor = node.next();
        self.remaining -= 1;
        node.value()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T: 'a, N: LinkNode<T>> ExactSizeIterator for LinkedIter<'a, T, N> {}
