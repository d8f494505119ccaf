//! One sequence API over four interchangeable backings.

use super::array_list::ArrayList;
use super::backing::{Backing, Growth};
use super::deque::Deque;
use super::iter::Iter;
use super::kind::SequenceKind;
use super::linked::{DoublyLinkedList, SinglyLinkedList};
use crate::config::sequence::DEFAULT_MAX_CAPACITY;
use crate::config::{Config, SequenceConfig};
use crate::error::{resolve_index, PolyseqError, Result};
use crate::memory::{Allocator, SystemAllocator};
use crate::random::{self, Pcg32};
use std::alloc::Layout;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

/// Callback receiving elements the sequence discards on its own
/// (`discard_all`, `clear`, drop).
pub type Disposer<T> = Rc<dyn Fn(T)>;

enum Repr<T> {
    Array(ArrayList<T>),
    Deque(Deque<T>),
    Doubly(DoublyLinkedList<T>),
    Singly(SinglyLinkedList<T>),
}

macro_rules! dispatch {
    ($repr:expr, $b:ident => $body:expr) => {
        match $repr {
            Repr::Array($b) => $body,
            Repr::Deque($b) => $body,
            Repr::Doubly($b) => $body,
            Repr::Singly($b) => $body,
        }
    };
}

impl<T> Repr<T> {
    fn new<A: Allocator>(kind: SequenceKind, alloc: &A) -> Result<Self> {
        Ok(match kind {
            SequenceKind::ArrayList => Repr::Array(ArrayList::new()),
            SequenceKind::Deque => Repr::Deque(Deque::new()),
            SequenceKind::DoublyLinkedList => Repr::Doubly(DoublyLinkedList::new(alloc)?),
            SequenceKind::SinglyLinkedList => Repr::Singly(SinglyLinkedList::new(alloc)?),
        })
    }

    fn kind(&self) -> SequenceKind {
        match self {
            Repr::Array(_) => SequenceKind::ArrayList,
            Repr::Deque(_) => SequenceKind::Deque,
            Repr::Doubly(_) => SequenceKind::DoublyLinkedList,
            Repr::Singly(_) => SequenceKind::SinglyLinkedList,
        }
    }
}

fn sentinel_layout<T>(kind: SequenceKind) -> Layout {
    match kind {
        SequenceKind::DoublyLinkedList => DoublyLinkedList::<T>::node_layout(),
        SequenceKind::SinglyLinkedList => SinglyLinkedList::<T>::node_layout(),
        SequenceKind::ArrayList | SequenceKind::Deque => Layout::new::<T>(),
    }
}

/// Ordered collection whose backing is chosen at construction.
///
/// Every backing honours the same contract; they differ only in cost:
///
/// | operation | array | deque | doubly | singly |
/// |---|---|---|---|---|
/// | `push` | O(1)* | O(1)* | O(1) | O(1) |
/// | `pop` | O(1) | O(1) | O(1) | O(n) |
/// | `unshift`/`shift` | O(n) | O(1)* | O(1) | O(1) |
/// | `get(i)` | O(1) | O(1) | O(min(i, n-i)) | O(i) |
/// | `draw` | O(1) | O(1) | O(n) | O(n) |
///
/// Indices may be negative, counting from the end. Failed operations
/// leave the sequence unchanged.
///
/// # Examples
///
/// ```rust
/// use polyseq::{Sequence, SequenceKind};
/// # fn main() -> polyseq::Result<()> {
/// let mut seq = Sequence::with_kind(SequenceKind::Deque);
/// seq.push("b")?;
/// seq.unshift("a")?;
/// seq.push("c")?;
/// assert_eq!(seq.get(-1)?, &"c");
/// assert_eq!(seq.shift()?, "a");
/// assert_eq!(seq.to_vec(), vec!["b", "c"]);
/// # Ok(())
/// # }
/// ```
pub struct Sequence<T, A: Allocator = SystemAllocator> {
    repr: Repr<T>,
    alloc: A,
    rng: Pcg32,
    max_capacity: usize,
    disposer: Option<Disposer<T>>,
    drawn: usize,
}

impl<T> Sequence<T, SystemAllocator> {
    /// Empty array-backed sequence.
    pub fn new() -> Self {
        Self::with_kind(SequenceKind::ArrayList)
    }

    /// Empty sequence of the given kind.
    pub fn with_kind(kind: SequenceKind) -> Self {
        Self::new_in(kind, SystemAllocator)
    }

    /// Sequence built from a validated configuration.
    pub fn with_config(config: &SequenceConfig) -> Result<Self> {
        Self::with_config_in(config, SystemAllocator)
    }

    /// Sequence of `kind` holding `elements` in order.
    pub fn from_elements<I>(kind: SequenceKind, elements: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
    {
        let mut seq = Self::with_kind(kind);
        seq.extend(elements)?;
        Ok(seq)
    }
}

impl<T> Default for Sequence<T, SystemAllocator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, A: Allocator> Sequence<T, A> {
    /// Empty sequence of `kind` drawing memory through `alloc`.
    ///
    /// Linked kinds allocate their sentinel node here; if `alloc` refuses
    /// it there is no valid empty state to return, so this aborts through
    /// [`std::alloc::handle_alloc_error`]. Use [`Sequence::with_config_in`]
    /// to get the refusal as an error instead.
    pub fn new_in(kind: SequenceKind, alloc: A) -> Self {
        match Self::try_new_in(kind, alloc, DEFAULT_MAX_CAPACITY, None) {
            Ok(seq) => seq,
            Err(e) => {
                log::error!("cannot allocate {} sentinel: {}", kind, e);
                std::alloc::handle_alloc_error(sentinel_layout::<T>(kind))
            }
        }
    }

    /// Sequence built from `config`, drawing memory through `alloc`.
    pub fn with_config_in(config: &SequenceConfig, alloc: A) -> Result<Self> {
        config.validate()?;
        let mut seq = Self::try_new_in(config.kind, alloc, config.max_capacity, config.seed)?;
        if config.initial_capacity > 0 {
            let growth = Growth {
                alloc: &seq.alloc,
                max_capacity: seq.max_capacity,
            };
            let capacity = config.initial_capacity;
            match &mut seq.repr {
                Repr::Array(list) => *list = ArrayList::with_capacity(capacity, growth.alloc)?,
                Repr::Deque(deque) => *deque = Deque::with_capacity(capacity, growth.alloc)?,
                Repr::Doubly(list) => list.reserve(capacity, &growth)?,
                Repr::Singly(list) => list.reserve(capacity, &growth)?,
            }
        }
        Ok(seq)
    }

    pub(crate) fn try_new_in(
        kind: SequenceKind,
        alloc: A,
        max_capacity: usize,
        seed: Option<u64>,
    ) -> Result<Self> {
        let repr = Repr::new(kind, &alloc)?;
        Ok(Self {
            repr,
            alloc,
            rng: random::seeded_or_os(seed),
            max_capacity,
            disposer: None,
            drawn: 0,
        })
    }

    /// Backing kind, fixed at construction.
    pub fn kind(&self) -> SequenceKind {
        self.repr.kind()
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        dispatch!(&self.repr, b => b.len())
    }

    /// Whether the sequence holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Elements storable without asking the allocator for more memory.
    pub fn capacity(&self) -> usize {
        dispatch!(&self.repr, b => b.capacity())
    }

    /// Length limit; growing past it fails with [`PolyseqError::TooBig`].
    pub fn max_capacity(&self) -> usize {
        self.max_capacity
    }

    /// The allocator this sequence draws from.
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    fn growth(&self) -> Growth<'_, A> {
        Growth {
            alloc: &self.alloc,
            max_capacity: self.max_capacity,
        }
    }

    fn check_room(&self, additional: usize) -> Result<()> {
        let required = self.len().saturating_add(additional);
        if required > self.max_capacity {
            return Err(PolyseqError::too_big(required, self.max_capacity));
        }
        Ok(())
    }

    /// Length changes and reorders invalidate the draw boundary.
    #[inline]
    fn reset_draw_state(&mut self) {
        self.drawn = 0;
    }

    /// Element at `index` (negative counts from the end).
    pub fn get(&self, index: isize) -> Result<&T> {
        let i = resolve_index(index, self.len())?;
        dispatch!(&self.repr, b => b.get(i)).ok_or_else(|| PolyseqError::out_of_range(index, self.len()))
    }

    /// Mutable element at `index` (negative counts from the end).
    pub fn get_mut(&mut self, index: isize) -> Result<&mut T> {
        let len = self.len();
        let i = resolve_index(index, len)?;
        dispatch!(&mut self.repr, b => b.get_mut(i)).ok_or_else(|| PolyseqError::out_of_range(index, len))
    }

    /// Replace the element at `index`, returning the old one.
    pub fn set(&mut self, index: isize, value: T) -> Result<T> {
        let slot = self.get_mut(index)?;
        Ok(std::mem::replace(slot, value))
    }

    /// First element, if any.
    pub fn front(&self) -> Option<&T> {
        dispatch!(&self.repr, b => b.get(0))
    }

    /// Last element, if any.
    pub fn back(&self) -> Option<&T> {
        let len = self.len();
        if len == 0 {
            return None;
        }
        dispatch!(&self.repr, b => b.get(len - 1))
    }

    /// Append `value` at the back.
    pub fn push(&mut self, value: T) -> Result<()> {
        self.check_room(1)?;
        let growth = Growth {
            alloc: &self.alloc,
            max_capacity: self.max_capacity,
        };
        dispatch!(&mut self.repr, b => b.push(value, &growth))?;
        self.reset_draw_state();
        Ok(())
    }

    /// Insert `value` at the front.
    pub fn unshift(&mut self, value: T) -> Result<()> {
        self.check_room(1)?;
        let growth = Growth {
            alloc: &self.alloc,
            max_capacity: self.max_capacity,
        };
        dispatch!(&mut self.repr, b => b.unshift(value, &growth))?;
        self.reset_draw_state();
        Ok(())
    }

    /// Remove and return the last element.
    pub fn pop(&mut self) -> Result<T> {
        let value = dispatch!(&mut self.repr, b => b.pop(&self.alloc)).ok_or(PolyseqError::empty("pop"))?;
        self.reset_draw_state();
        Ok(value)
    }

    /// Remove and return the first element.
    pub fn shift(&mut self) -> Result<T> {
        let value = dispatch!(&mut self.repr, b => b.shift(&self.alloc)).ok_or(PolyseqError::empty("shift"))?;
        self.reset_draw_state();
        Ok(value)
    }

    /// Make room for `additional` more elements, all or nothing.
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        self.check_room(additional)?;
        let growth = Growth {
            alloc: &self.alloc,
            max_capacity: self.max_capacity,
        };
        dispatch!(&mut self.repr, b => b.reserve(additional, &growth))
    }

    /// Append every element of `elements`; on failure none are appended.
    ///
    /// The elements are collected first, so the whole batch is admitted
    /// before the sequence changes.
    pub fn extend<I>(&mut self, elements: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        let batch: Vec<T> = elements.into_iter().collect();
        if batch.is_empty() {
            return Ok(());
        }
        self.reserve(batch.len())?;
        let growth = Growth {
            alloc: &self.alloc,
            max_capacity: self.max_capacity,
        };
        for value in batch {
            dispatch!(&mut self.repr, b => b.push(value, &growth))?;
        }
        self.reset_draw_state();
        Ok(())
    }

    /// Move every element of `other` to the back of this sequence,
    /// leaving `other` empty.
    ///
    /// Array lists move their buffer contents in bulk. Any other pairing
    /// transfers elements one at a time, which is linear in `other.len()`
    /// even where a splice would be possible. On failure both sequences are
    /// unchanged.
    pub fn concat<B: Allocator>(&mut self, other: &mut Sequence<T, B>) -> Result<()> {
        let incoming = other.len();
        if incoming == 0 {
            return Ok(());
        }
        self.check_room(incoming)?;
        let growth = Growth {
            alloc: &self.alloc,
            max_capacity: self.max_capacity,
        };
        match (&mut self.repr, &mut other.repr) {
            (Repr::Array(dst), Repr::Array(src)) => dst.append(src, &growth)?,
            (dst, src) => {
                if dst.kind() != src.kind() {
                    log::debug!(
                        "concat {} <- {}: element-by-element transfer of {} elements",
                        dst.kind(),
                        src.kind(),
                        incoming
                    );
                }
                dispatch!(&mut *dst, b => b.reserve(incoming, &growth))?;
                while let Some(value) = dispatch!(&mut *src, s => s.shift(&other.alloc)) {
                    dispatch!(&mut *dst, b => b.push(value, &growth))?;
                }
            }
        }
        self.reset_draw_state();
        other.reset_draw_state();
        Ok(())
    }

    /// Iterate front to back.
    pub fn iter(&self) -> Iter<'_, T> {
        match &self.repr {
            Repr::Array(list) => Iter::slice(list.as_slice().iter()),
            Repr::Deque(deque) => Iter::ring(deque.iter()),
            Repr::Doubly(list) => Iter::doubly(list.iter()),
            Repr::Singly(list) => Iter::singly(list.iter()),
        }
    }

    /// Apply `f` to every element front to back.
    pub fn for_each_mut<F: FnMut(&mut T)>(&mut self, mut f: F) {
        dispatch!(&mut self.repr, b => b.for_each_mut(&mut f));
    }

    /// First element satisfying `pred`.
    pub fn find_first<P: FnMut(&T) -> bool>(&self, mut pred: P) -> Option<&T> {
        self.iter().find(|item| pred(item))
    }

    /// Mutable first element satisfying `pred`.
    pub fn find_first_mut<P: FnMut(&T) -> bool>(&mut self, mut pred: P) -> Option<&mut T> {
        let index = self.position(&mut pred)?;
        dispatch!(&mut self.repr, b => b.get_mut(index))
    }

    /// Index of the first element satisfying `pred`.
    pub fn position<P: FnMut(&T) -> bool>(&self, mut pred: P) -> Option<usize> {
        dispatch!(&self.repr, b => b.position(&mut pred))
    }

    /// Whether any element equals `value`.
    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.position(|item| item == value).is_some()
    }

    /// Remove and return the first element satisfying `pred`.
    pub fn discard<P: FnMut(&T) -> bool>(&mut self, pred: P) -> Result<T> {
        let index = self
            .position(pred)
            .ok_or_else(|| PolyseqError::not_found("element matching predicate"))?;
        let value = dispatch!(&mut self.repr, b => b.remove_at(index, &self.alloc))
            .ok_or_else(|| PolyseqError::not_found("element matching predicate"))?;
        self.reset_draw_state();
        Ok(value)
    }

    /// Remove every element satisfying `pred`, keeping the rest in order.
    ///
    /// Removed elements go to the disposer if one is set. Returns how many
    /// were removed.
    pub fn discard_all<P: FnMut(&T) -> bool>(&mut self, mut pred: P) -> usize {
        let disposer = self.disposer.clone();
        let mut sink = |value: T| {
            if let Some(dispose) = &disposer {
                dispose(value);
            }
        };
        let removed = dispatch!(&mut self.repr, b => b.discard_all(&mut pred, &self.alloc, &mut sink));
        if removed > 0 {
            self.reset_draw_state();
        }
        removed
    }

    /// Exchange the elements at two indices. Exchanging distinct
    /// positions starts a fresh draw round.
    pub fn swap(&mut self, a: isize, b: isize) -> Result<()> {
        let len = self.len();
        let i = resolve_index(a, len)?;
        let j = resolve_index(b, len)?;
        if i != j {
            dispatch!(&mut self.repr, r => r.swap(i, j));
            self.reset_draw_state();
        }
        Ok(())
    }

    /// Uniformly permute the elements in place.
    pub fn shuffle(&mut self) {
        dispatch!(&mut self.repr, b => b.shuffle(&mut self.rng));
        self.reset_draw_state();
    }

    /// Stable sort by natural order.
    pub fn sort(&mut self)
    where
        T: Ord,
    {
        self.sort_by(|a, b| a.cmp(b));
    }

    /// Stable sort by `cmp`.
    pub fn sort_by<F: FnMut(&T, &T) -> Ordering>(&mut self, mut cmp: F) {
        dispatch!(&mut self.repr, b => b.sort_by(&mut cmp));
        self.reset_draw_state();
    }

    /// Random element not drawn since the last reset, without removing it.
    ///
    /// Drawn elements are swapped behind a boundary that shrinks by one per
    /// draw, so each draw is one bounded sample and one swap: O(1) on the
    /// contiguous backings, an index walk on the linked ones. Any change
    /// to length or order starts a fresh round, as does
    /// [`Sequence::reset_draws`].
    ///
    /// # Errors
    ///
    /// [`PolyseqError::Empty`] for an empty sequence and
    /// [`PolyseqError::NotFound`] once every element has been drawn.
    pub fn draw(&mut self) -> Result<&T> {
        let len = self.len();
        if len == 0 {
            return Err(PolyseqError::empty("draw"));
        }
        let boundary = len - self.drawn;
        if boundary == 0 {
            return Err(PolyseqError::not_found("undrawn element"));
        }
        let pick = self.rng.next_below(boundary);
        let last = boundary - 1;
        if pick != last {
            dispatch!(&mut self.repr, b => b.swap(pick, last));
        }
        self.drawn += 1;
        dispatch!(&self.repr, b => b.get(last)).ok_or_else(|| PolyseqError::out_of_range(last as isize, len))
    }

    /// Make every element drawable again.
    pub fn reset_draws(&mut self) {
        self.reset_draw_state();
    }

    /// Elements not yet drawn in the current round.
    pub fn undrawn(&self) -> usize {
        self.len() - self.drawn
    }

    /// Uniformly random element, with replacement.
    pub fn choose(&mut self) -> Result<&T> {
        let len = self.len();
        if len == 0 {
            return Err(PolyseqError::empty("choose"));
        }
        let pick = self.rng.next_below(len);
        dispatch!(&self.repr, b => b.get(pick)).ok_or_else(|| PolyseqError::out_of_range(pick as isize, len))
    }

    /// Remove every element, handing each to the disposer if one is set.
    pub fn clear(&mut self) {
        let disposer = self.disposer.clone();
        let mut sink = |value: T| {
            if let Some(dispose) = &disposer {
                dispose(value);
            }
        };
        dispatch!(&mut self.repr, b => b.drain(&self.alloc, &mut sink));
        self.reset_draw_state();
    }

    /// Register a callback for elements the sequence discards itself.
    pub fn set_disposer<F>(&mut self, disposer: F)
    where
        F: Fn(T) + 'static,
    {
        self.disposer = Some(Rc::new(disposer));
    }

    /// Remove the disposer; discarded elements are simply dropped.
    pub fn clear_disposer(&mut self) {
        self.disposer = None;
    }

    pub(crate) fn set_shared_disposer(&mut self, disposer: Option<Disposer<T>>) {
        self.disposer = disposer;
    }

    /// Re-seed the embedded generator.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = Pcg32::from_seed(seed);
    }

    /// Copy the elements into a `Vec`, front to back.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }
}

impl<T, A: Allocator> Drop for Sequence<T, A> {
    fn drop(&mut self) {
        if let Some(dispose) = self.disposer.take() {
            let mut sink = |value: T| dispose(value);
            dispatch!(&mut self.repr, b => b.drain(&self.alloc, &mut sink));
        }
        let footprint = dispatch!(&self.repr, b => b.footprint());
        if footprint > 0 {
            self.alloc.deallocate(footprint);
        }
    }
}

impl<T: fmt::Debug, A: Allocator> fmt::Debug for Sequence<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sequence<{}>", self.kind())?;
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq, A: Allocator, B: Allocator> PartialEq<Sequence<T, B>> for Sequence<T, A> {
    fn eq(&self, other: &Sequence<T, B>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<'a, T, A: Allocator> IntoIterator for &'a Sequence<T, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::BoundedAllocator;
    use std::cell::RefCell;

    fn each_kind() -> impl Iterator<Item = SequenceKind> {
        SequenceKind::ALL.into_iter()
    }

    fn seeded(kind: SequenceKind) -> Sequence<i32> {
        let config = SequenceConfig::builder().kind(kind).seed(42).build().unwrap();
        Sequence::with_config(&config).unwrap()
    }

    #[test]
    fn test_lifo_and_fifo_on_every_kind() -> Result<()> {
        for kind in each_kind() {
            let mut seq = seeded(kind);
            for i in 0..20 {
                seq.push(i)?;
            }
            for i in (10..20).rev() {
                assert_eq!(seq.pop()?, i, "{}", kind);
            }
            for i in 0..10 {
                assert_eq!(seq.shift()?, i, "{}", kind);
            }
            assert_eq!(seq.pop(), Err(PolyseqError::empty("pop")));
            assert_eq!(seq.shift(), Err(PolyseqError::empty("shift")));
        }
        Ok(())
    }

    #[test]
    fn test_negative_indices() -> Result<()> {
        for kind in each_kind() {
            let seq = Sequence::from_elements(kind, [10, 20, 30])?;
            assert_eq!(seq.get(-1)?, &30);
            assert_eq!(seq.get(-3)?, &10);
            assert_eq!(seq.get(3), Err(PolyseqError::out_of_range(3, 3)));
            assert_eq!(seq.get(-4), Err(PolyseqError::out_of_range(-4, 3)));
        }
        Ok(())
    }

    #[test]
    fn test_set_front_back() -> Result<()> {
        for kind in each_kind() {
            let mut seq = Sequence::from_elements(kind, ['a', 'b', 'c'])?;
            assert_eq!(seq.set(-2, 'x')?, 'b');
            assert_eq!(seq.front(), Some(&'a'));
            assert_eq!(seq.back(), Some(&'c'));
            assert_eq!(seq.to_vec(), vec!['a', 'x', 'c']);
        }
        let empty: Sequence<u8> = Sequence::new();
        assert_eq!(empty.front(), None);
        assert_eq!(empty.back(), None);
        Ok(())
    }

    #[test]
    fn test_discard_and_find() -> Result<()> {
        for kind in each_kind() {
            let mut seq = Sequence::from_elements(kind, 1..=6)?;
            assert_eq!(seq.find_first(|v| v % 2 == 0), Some(&2));
            assert_eq!(seq.position(|v| *v == 5), Some(4));
            assert!(seq.contains(&6));
            assert_eq!(seq.discard(|v| v % 2 == 0)?, 2);
            assert!(matches!(
                seq.discard(|v| *v > 100),
                Err(PolyseqError::NotFound { .. })
            ));
            if let Some(v) = seq.find_first_mut(|v| *v == 4) {
                *v = 40;
            }
            assert_eq!(seq.to_vec(), vec![1, 3, 40, 5, 6]);
        }
        Ok(())
    }

    #[test]
    fn test_discard_all_uses_disposer() -> Result<()> {
        for kind in each_kind() {
            let disposed = Rc::new(RefCell::new(Vec::new()));
            let mut seq = Sequence::from_elements(kind, 0..10)?;
            let sink = Rc::clone(&disposed);
            seq.set_disposer(move |v| sink.borrow_mut().push(v));
            assert_eq!(seq.discard_all(|v| v % 3 == 0), 4);
            assert_eq!(seq.to_vec(), vec![1, 2, 4, 5, 7, 8]);
            let mut got = disposed.borrow().clone();
            got.sort_unstable();
            assert_eq!(got, vec![0, 3, 6, 9]);

            drop(seq);
            assert_eq!(disposed.borrow().len(), 10);
        }
        Ok(())
    }

    #[test]
    fn test_concat_same_and_cross_kind() -> Result<()> {
        for dst_kind in each_kind() {
            for src_kind in each_kind() {
                let mut dst = Sequence::from_elements(dst_kind, [1, 2])?;
                let mut src = Sequence::from_elements(src_kind, [3, 4, 5])?;
                dst.concat(&mut src)?;
                assert_eq!(dst.to_vec(), vec![1, 2, 3, 4, 5]);
                assert!(src.is_empty());
            }
        }
        Ok(())
    }

    #[test]
    fn test_concat_refused_leaves_both_unchanged() -> Result<()> {
        let config = SequenceConfig::builder().max_capacity(4).build()?;
        let mut dst: Sequence<i32> = Sequence::with_config(&config)?;
        dst.extend([1, 2, 3])?;
        let mut src = Sequence::from_elements(SequenceKind::Deque, [4, 5])?;
        assert_eq!(dst.concat(&mut src), Err(PolyseqError::too_big(5, 4)));
        assert_eq!(dst.to_vec(), vec![1, 2, 3]);
        assert_eq!(src.to_vec(), vec![4, 5]);
        Ok(())
    }

    #[test]
    fn test_swap_sort_shuffle() -> Result<()> {
        for kind in each_kind() {
            let mut seq = seeded(kind);
            seq.extend([5, 1, 4, 2, 3])?;
            seq.swap(0, -1)?;
            assert_eq!(seq.to_vec(), vec![3, 1, 4, 2, 5]);
            seq.sort();
            assert_eq!(seq.to_vec(), vec![1, 2, 3, 4, 5]);
            seq.sort_by(|a, b| b.cmp(a));
            assert_eq!(seq.to_vec(), vec![5, 4, 3, 2, 1]);
            seq.shuffle();
            let mut after = seq.to_vec();
            after.sort_unstable();
            assert_eq!(after, vec![1, 2, 3, 4, 5]);
            assert!(seq.swap(0, 5).is_err());
        }
        Ok(())
    }

    #[test]
    fn test_draw_without_replacement() -> Result<()> {
        for kind in each_kind() {
            let mut seq = seeded(kind);
            seq.extend(0..8)?;
            let mut seen = Vec::new();
            for _ in 0..8 {
                seen.push(*seq.draw()?);
            }
            assert!(matches!(seq.draw(), Err(PolyseqError::NotFound { .. })));
            seen.sort_unstable();
            assert_eq!(seen, (0..8).collect::<Vec<_>>());
            assert_eq!(seq.len(), 8);

            seq.reset_draws();
            assert_eq!(seq.undrawn(), 8);
            seq.draw()?;
            seq.push(8)?;
            assert_eq!(seq.undrawn(), 9);
        }
        let mut empty: Sequence<u8> = Sequence::new();
        assert_eq!(empty.draw(), Err(PolyseqError::empty("draw")));
        assert_eq!(empty.choose(), Err(PolyseqError::empty("choose")));
        Ok(())
    }

    #[test]
    fn test_swap_starts_new_draw_round() -> Result<()> {
        for kind in each_kind() {
            for seed in 0..16 {
                let mut seq = seeded(kind);
                seq.reseed(seed);
                seq.extend(0..4)?;
                seq.draw()?;
                seq.swap(0, 3)?;
                assert_eq!(seq.undrawn(), 4);

                let mut round = Vec::new();
                while let Ok(v) = seq.draw() {
                    round.push(*v);
                }
                round.sort_unstable();
                assert_eq!(round, vec![0, 1, 2, 3], "{} seed {}", kind, seed);
            }

            let mut seq = seeded(kind);
            seq.extend(0..3)?;
            seq.draw()?;
            seq.swap(1, -2)?;
            assert_eq!(seq.undrawn(), 2);
        }
        Ok(())
    }

    #[test]
    fn test_choose_and_reseed_are_reproducible() -> Result<()> {
        let mut a = Sequence::from_elements(SequenceKind::Deque, 0..100)?;
        let mut b = Sequence::from_elements(SequenceKind::DoublyLinkedList, 0..100)?;
        a.reseed(9);
        b.reseed(9);
        for _ in 0..20 {
            assert_eq!(a.choose()?, b.choose()?);
        }
        Ok(())
    }

    #[test]
    fn test_max_capacity_is_too_big() -> Result<()> {
        for kind in each_kind() {
            let config = SequenceConfig::builder().kind(kind).max_capacity(2).build()?;
            let mut seq = Sequence::with_config(&config)?;
            seq.push(1)?;
            seq.unshift(0)?;
            assert_eq!(seq.push(2), Err(PolyseqError::too_big(3, 2)));
            assert_eq!(seq.reserve(1), Err(PolyseqError::too_big(3, 2)));
            assert_eq!(seq.to_vec(), vec![0, 1]);
        }
        Ok(())
    }

    #[test]
    fn test_extend_is_atomic_under_budget() -> Result<()> {
        for kind in each_kind() {
            let alloc = BoundedAllocator::new(256);
            let mut seq: Sequence<u64, _> = Sequence::new_in(kind, alloc.clone());
            seq.push(1)?;
            let before = alloc.stats().in_use;
            assert!(seq.extend(0..1000).is_err(), "{}", kind);
            assert_eq!(seq.to_vec(), vec![1]);
            assert_eq!(alloc.stats().in_use, before);
        }
        Ok(())
    }

    #[test]
    fn test_drop_returns_every_byte() -> Result<()> {
        for kind in each_kind() {
            let alloc = BoundedAllocator::new(1 << 20);
            {
                let config = SequenceConfig::builder().kind(kind).initial_capacity(5).build()?;
                let mut seq = Sequence::with_config_in(&config, alloc.clone())?;
                seq.extend(0..100u32)?;
                for _ in 0..30 {
                    seq.shift()?;
                }
                seq.clear();
                seq.push(7)?;
                assert!(alloc.stats().in_use > 0);
            }
            assert_eq!(alloc.stats().in_use, 0, "{}", kind);
        }
        Ok(())
    }

    #[test]
    fn test_linked_construction_refused_by_config() {
        let alloc = BoundedAllocator::new(0);
        let config = SequenceConfig::builder()
            .kind(SequenceKind::SinglyLinkedList)
            .build()
            .unwrap();
        let result: Result<Sequence<u8, _>> = Sequence::with_config_in(&config, alloc);
        assert!(matches!(result, Err(PolyseqError::OutOfMemory { .. })));
    }

    #[test]
    fn test_equality_across_kinds_and_debug() -> Result<()> {
        let a = Sequence::from_elements(SequenceKind::ArrayList, [1, 2, 3])?;
        let b = Sequence::from_elements(SequenceKind::SinglyLinkedList, [1, 2, 3])?;
        let c = Sequence::from_elements(SequenceKind::Deque, [1, 2])?;
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(format!("{:?}", b), "Sequence<singly>[1, 2, 3]");
        let total: i32 = (&a).into_iter().sum();
        assert_eq!(total, 6);
        Ok(())
    }

    #[test]
    fn test_for_each_mut() -> Result<()> {
        for kind in each_kind() {
            let mut seq = Sequence::from_elements(kind, [1, 2, 3])?;
            seq.for_each_mut(|v| *v *= 2);
            assert_eq!(seq.to_vec(), vec![2, 4, 6]);
        }
        Ok(())
    }
}
