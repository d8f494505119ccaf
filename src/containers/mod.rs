//! Sequence containers
//!
//! One [`Sequence`] type with four interchangeable backings, chosen at
//! construction through [`SequenceKind`]:
//!
//! - **array list** - contiguous growable buffer
//! - **deque** - circular buffer, O(1) at both ends
//! - **doubly linked list** - sentinel ring with back links
//! - **singly linked list** - sentinel ring with a tail pointer
//!
//! Every backing draws memory through a caller-supplied
//! [`Allocator`](crate::memory::Allocator), so a bounded allocator makes
//! growth refusals observable and testable.

mod array_list;
mod backing;
mod deque;
mod iter;
mod kind;
mod linked;
mod sequence;

pub use iter::Iter;
pub use kind::SequenceKind;
pub use sequence::{Disposer, Sequence};
