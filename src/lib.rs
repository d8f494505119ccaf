//! # Polyseq: One Sequence API, Four Backings
//!
//! This crate provides an allocator-aware collection layer: a single
//! [`Sequence`] interface over four interchangeable backings, and a
//! [`Dictionary`] built on top of it.
//!
//! ## Key Features
//!
//! - **Interchangeable backings**: array list, circular deque, doubly and
//!   singly linked sentinel rings, chosen with [`SequenceKind`]
//! - **Negative indexing**: `-1` is the last element on every backing
//! - **Injected allocators**: every structure charges its memory to an
//!   [`Allocator`]; [`BoundedAllocator`] makes exhaustion testable
//! - **Failure atomicity**: a refused growth leaves the structure unchanged
//! - **Hybrid dictionary**: buckets hold one entry inline or a chain, with
//!   identity and text keys side by side
//! - **Unbiased randomness**: PCG32 with rejection-sampled bounded draws for
//!   shuffles, draws without replacement and random choice
//!
//! ## Quick Start
//!
//! ```rust
//! use polyseq::{Dictionary, Sequence, SequenceKind};
//! # fn main() -> polyseq::Result<()> {
//! let mut queue = Sequence::with_kind(SequenceKind::Deque);
//! queue.extend([1, 2, 3])?;
//! queue.unshift(0)?;
//! assert_eq!(queue.shift()?, 0);
//! assert_eq!(queue.get(-1)?, &3);
//!
//! let removed = queue.discard_all(|v| v % 2 == 1);
//! assert_eq!(removed, 2);
//! assert_eq!(queue.to_vec(), vec![2]);
//!
//! let mut sounds = Dictionary::new(16)?;
//! sounds.set("cats", "meow")?;
//! assert_eq!(sounds.get("cats"), Some(&"meow"));
//! # Ok(())
//! # }
//! ```
//!
//! Structures are single-threaded: they hold `Rc` handles and are neither
//! `Send` nor `Sync`.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod containers;
pub mod error;
pub mod hash_map;
pub mod memory;
pub mod random;

// Re-export core types
pub use containers::{Disposer, Sequence, SequenceKind};
pub use error::{PolyseqError, Result};
pub use hash_map::{BucketStats, DictKey, Dictionary, Identity, KeyMatcher, KeyRef};
pub use memory::{Allocator, AllocatorStats, BoundedAllocator, SystemAllocator};
pub use random::{EntropySource, FixedEntropy, OsEntropy, Pcg32};

pub use config::{Config, DictionaryConfig, SequenceConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library (currently only logs the version)
pub fn init() {
    log::debug!("Initializing polyseq v{}", VERSION);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_functionality() {
        init();
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_version_info() {
        assert!(VERSION.contains('.'));
        let parts: Vec<&str> = VERSION.split('.').collect();
        assert!(parts.len() >= 2);
    }

    #[test]
    fn test_re_exports() {
        let _seq = Sequence::<i32>::new();
        let _alloc = BoundedAllocator::new(64);
        let err = PolyseqError::empty("pop");
        assert_eq!(err.category(), "empty");
        assert!(std::any::type_name::<Result<()>>().contains("PolyseqError"));
    }

    #[test]
    fn test_multiple_init_calls() {
        init();
        init();
    }
}
