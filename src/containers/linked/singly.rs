//! Singly-linked sentinel ring with a tail pointer.
//!
//! `push`, `unshift` and `shift` are O(1). Without back links, `pop` and
//! removal by index have to find the predecessor by walking from the head.

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

pub(crate) struct SinglyLinkedList<T> {
    arena: Arena<Node<T>>,
    /// Tail slot, or the sentinel when empty.
    last: usize,
    len: usize,
}

impl<T> SinglyLinkedList<T> {
    pub(crate) fn new<A: Allocator>(alloc: &A) -> Result<Self> {
        let sentinel = Node {
            value: None,
            next: SENTINEL,
        };
        Ok(Self {
            arena: Arena::with_sentinel(sentinel, alloc)?,
            last: SENTINEL,
            len: 0,
        })
    }

    pub(crate) fn node_layout() -> Layout {
        Arena::<Node<T>>::node_layout()
    }

    pub(crate) fn iter(&self) -> LinkedIter<'_, T, Node<T>> {
        LinkedIter::new(&self.arena, self.len)
    }

    /// Slot whose `next` is the element at `index` (the sentinel for 0).
    fn node_before(&self, index: usize) -> usize {
        let mut cursor = SENTINEL;
        for _ in 0..index {
            cursor = self.arena[cursor].next;
        }
        cursor
    }

    fn node_at(&self, index: usize) -> usize {
        if index + 1 == self.len {
            self.last
        } else {
            self.arena[self.node_before(index)].next
        }
    }

    /// Unlink the successor of `prev`.
    fn unlink_after<A: Allocator>(&mut self, prev: usize, alloc: &A) -> Option<T> {
        let target = self.arena[prev].next;
        if target == SENTINEL {
            return None;
        }
        self.arena[prev].next = self.arena[target].next;
        if self.last == target {
            self.last = prev;
        }
        self.len -= 1;
        self.arena.remove(target, alloc).and_then(|node| node.value)
    }

    fn relink(&mut self, order: &[usize]) {
        let mut prev = SENTINEL;
        for &index in order {
            self.arena[prev].next = index;
            prev = index;
        }
        self.arena[prev].next = SENTINEL;
        self.last = prev;
    }
}

impl<T> Backing<T> for SinglyLinkedList<T> {
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
        let node = Node {
            value: Some(value),
            next: SENTINEL,
        };
        let index = self.arena.insert(node, growth.alloc)?;
        let last = self.last;
        self.arena[last].next = index;
        self.last = index;
        self.len += 1;
        Ok(())
    }

    fn unshift<A: Allocator>(&mut self, value: T, growth: &Growth<'_, A>) -> Result<()> {
        let node = Node {
            value: Some(value),
            next: self.arena[SENTINEL].next,
        };
        let index = self.arena.insert(node, growth.alloc)?;
        self.arena[SENTINEL].next = index;
        if self.len == 0 {
            self.last = index;
        }
        self.len += 1;
        Ok(())
    }

    fn pop<A: Allocator>(&mut self, alloc: &A) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let prev = self.node_before(self.len - 1);
        self.unlink_after(prev, alloc)
    }

    fn shift<A: Allocator>(&mut self, alloc: &A) -> Option<T> {
        self.unlink_after(SENTINEL, alloc)
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
        let prev = self.node_before(index);
        self.unlink_after(prev, alloc)
    }

    fn discard_all<A: Allocator>(
        &mut self,
        pred: &mut dyn FnMut(&T) -> bool,
        alloc: &A,
        sink: &mut dyn FnMut(T),
    ) -> usize {
        let mut removed = 0;
        let mut prev = SENTINEL;
        let mut cursor = self.arena[SENTINEL].next;
        while cursor != SENTINEL {
            // read the successor before the matched node is released
            let next = self.arena[cursor].next;
            let matched = self.arena[cursor].value.as_ref().map_or(false, |v| pred(v));
            if matched {
                if let Some(value) = self.unlink_after(prev, alloc) {
                    sink(value);
                }
                removed += 1;
            } else {
                prev = cursor;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::SystemAllocator;

    fn list_of(values: &[i32]) -> Result<SinglyLinkedList<i32>> {
        let alloc = SystemAllocator;
        let growth = Growth {
            alloc: &alloc,
            max_capacity: usize::MAX,
        };
        let mut list = SinglyLinkedList::new(&alloc)?;
        for &v in values {
            list.push(v, &growth)?;
        }
        Ok(list)
    }

    fn values(list: &SinglyLinkedList<i32>) -> Vec<i32> {
        list.iter().copied().collect()
    }

    #[test]
    fn test_pop_walks_to_predecessor() -> Result<()> {
        let alloc = SystemAllocator;
        let mut list = list_of(&[1, 2, 3])?;
        assert_eq!(list.pop(&alloc), Some(3));
        assert_eq!(list.last, list.arena[list.node_before(1)].next);
        assert_eq!(list.pop(&alloc), Some(2));
        assert_eq!(list.pop(&alloc), Some(1));
        assert_eq!(list.last, SENTINEL);
        assert_eq!(list.pop(&alloc), None);
        Ok(())
    }

    #[test]
    fn test_unshift_on_empty_sets_tail() -> Result<()> {
        let alloc = SystemAllocator;
        let growth = Growth {
            alloc: &alloc,
            max_capacity: usize::MAX,
        };
        let mut list = SinglyLinkedList::new(&alloc)?;
        list.unshift(2, &growth)?;
        list.push(3, &growth)?;
        list.unshift(1, &growth)?;
        assert_eq!(values(&list), vec![1, 2, 3]);
        assert_eq!(list.get(2), Some(&3));
        Ok(())
    }

    #[test]
    fn test_discard_all_updates_tail() -> Result<()> {
        let alloc = SystemAllocator;
        let mut list = list_of(&[4, 1, 4, 4, 2, 4])?;
        let mut removed = 0;
        assert_eq!(list.discard_all(&mut |v| *v == 4, &alloc, &mut |_| removed += 1), 4);
        assert_eq!(removed, 4);
        assert_eq!(values(&list), vec![1, 2]);
        assert_eq!(list.get(1), Some(&2));

        let growth = Growth {
            alloc: &alloc,
            max_capacity: usize::MAX,
        };
        list.push(9, &growth)?;
        assert_eq!(values(&list), vec![1, 2, 9]);
        Ok(())
    }

    #[test]
    fn test_discard_everything() -> Result<()> {
        let alloc = SystemAllocator;
        let mut list = list_of(&[1, 1, 1])?;
        assert_eq!(list.discard_all(&mut |_| true, &alloc, &mut |_| {}), 3);
        assert_eq!(list.len(), 0);
        assert_eq!(list.last, SENTINEL);
        Ok(())
    }

    #[test]
    fn test_sort_and_shuffle_update_tail() -> Result<()> {
        let alloc = SystemAllocator;
        let mut list = list_of(&[5, 3, 9, 1])?;
        list.sort_by(&mut |a, b| a.cmp(b));
        assert_eq!(values(&list), vec![1, 3, 5, 9]);
        assert_eq!(list.get(3), Some(&9));

        list.shuffle(&mut Pcg32::new(3, 7));
        let tail = list.iter().last().copied();
        assert_eq!(list.pop(&alloc), tail);
        Ok(())
    }

    #[test]
    fn test_remove_at_and_swap() -> Result<()> {
        let alloc = SystemAllocator;
        let mut list = list_of(&[1, 2, 3, 4])?;
        assert_eq!(list.remove_at(3, &alloc), Some(4));
        assert_eq!(list.get(2), Some(&3));
        list.swap(0, 2);
        assert_eq!(values(&list), vec![3, 2, 1]);
        Ok(())
    }
}
