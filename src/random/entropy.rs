//! Entropy sources used to seed generators.

use crate::error::{PolyseqError, Result};
use std::cell::Cell;

/// Supplier of raw random bytes.
pub trait EntropySource {
    /// Fill `dest` completely with random bytes.
    fn fill_random_bytes(&self, dest: &mut [u8]) -> Result<()>;
}

/// Operating-system entropy.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill_random_bytes(&self, dest: &mut [u8]) -> Result<()> {
        getrandom::getrandom(dest).map_err(|e| PolyseqError::entropy(e.to_string()))
    }
}

/// Deterministic entropy for reproducible tests (splitmix64 stream).
#[derive(Debug, Clone)]
pub struct FixedEntropy {
    state: Cell<u64>,
}

impl FixedEntropy {
    /// Create a source whose output is fully determined by `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            state: Cell::new(seed),
        }
    }

    fn next_u64(&self) -> u64 {
        let state = self.state.get().wrapping_add(0x9e37_79b9_7f4a_7c15);
        self.state.set(state);
        let mut z = state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }
}

impl EntropySource for FixedEntropy {
    fn fill_random_bytes(&self, dest: &mut [u8]) -> Result<()> {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
        Ok(())
    }
}
