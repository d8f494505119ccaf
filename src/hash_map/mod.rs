//! Associative storage built on the sequence containers
//!
//! - `Dictionary`: power-of-two bucket table whose buckets hold one entry
//!   inline or a singly linked chain
//! - `DictKey` / `KeyRef`: owned and borrowed keys, by identity or by text
//! - `KeyMatcher`: the equality strategy a stored key uses

mod dictionary;
mod key;

pub use dictionary::{BucketStats, Dictionary, Iter};
pub use key::{DictKey, Identity, KeyMatcher, KeyRef};
