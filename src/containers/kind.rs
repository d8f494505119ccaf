use crate::error::PolyseqError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which backing a [`Sequence`](super::Sequence) uses. Fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SequenceKind {
    /// Contiguous growable array: O(1) indexing and `push`/`pop`
    #[default]
    ArrayList,
    /// Circular buffer: O(1) at both ends
    Deque,
    /// Sentinel ring with back links: O(1) at both ends without moving elements
    DoublyLinkedList,
    /// Sentinel ring with a tail pointer: O(1) `push`/`unshift`/`shift`, O(n) `pop`
    SinglyLinkedList,
}

impl SequenceKind {
    /// Every kind, in declaration order.
    pub const ALL: [SequenceKind; 4] = [
        SequenceKind::ArrayList,
        SequenceKind::Deque,
        SequenceKind::DoublyLinkedList,
        SequenceKind::SinglyLinkedList,
    ];

    /// Short lowercase name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            SequenceKind::ArrayList => "array",
            SequenceKind::Deque => "deque",
            SequenceKind::DoublyLinkedList => "doubly",
            SequenceKind::SinglyLinkedList => "singly",
        }
    }

    /// Whether elements live in one contiguous buffer.
    pub fn is_contiguous(self) -> bool {
        matches!(self, SequenceKind::ArrayList | SequenceKind::Deque)
    }
}

impl fmt::Display for SequenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SequenceKind {
    type Err = PolyseqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "array" | "arraylist" | "array_list" => Ok(SequenceKind::ArrayList),
            "deque" => Ok(SequenceKind::Deque),
            "doubly" | "doublylinkedlist" | "doubly_linked_list" => {
                Ok(SequenceKind::DoublyLinkedList)
            }
            "singly" | "singlylinkedlist" | "singly_linked_list" => {
                Ok(SequenceKind::SinglyLinkedList)
            }
            other => Err(PolyseqError::bad_argument(format!(
                "unknown sequence kind '{}'",
                other
            ))),
        }
    }
}
