use super::deque::RingIter;
use super::linked::{DoublyNode, LinkedIter, SinglyNode};
use std::iter::FusedIterator;
use std::slice;

/// Front-to-back iterator over a [`Sequence`](super::Sequence).
pub struct Iter<'a, T> {
    inner: Inner<'a, T>,
}

enum Inner<'a, T> {
    Slice(slice::Iter<'a, T>),
    Ring(RingIter<'a, T>),
    Doubly(LinkedIter<'a, T, DoublyNode<T>>),
    Singly(LinkedIter<'a, T, SinglyNode<T>>),
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn slice(iter: slice::Iter<'a, T>) -> Self {
        Self {
            inner: Inner::Slice(iter),
        }
    }

    pub(crate) fn ring(iter: RingIter<'a, T>) -> Self {
        Self {
            inner: Inner::Ring(iter),
        }
    }

    pub(crate) fn doubly(iter: LinkedIter<'a, T, DoublyNode<T>>) -> Self {
        Self {
            inner: Inner::Doubly(iter),
        }
    }

    pub(crate) fn singly(iter: LinkedIter<'a, T, SinglyNode<T>>) -> Self {
        Self {
            inner: Inner::Singly(iter),
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<&'a T> {
        match &mut self.inner {
            Inner::Slice(it) => it.next(),
            Inner::Ring(it) => it.next(),
            Inner::Doubly(it) => it.next(),
            Inner::Singly(it) => it.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.inner {
            Inner::Slice(it) => it.size_hint(),
            Inner::Ring(it) => it.size_hint(),
            Inner::Doubly(it) => it.size_hint(),
            Inner::Singly(it) => it.size_hint(),
        }
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}

impl<'a, T> FusedIterator for Iter<'a, T> {}
