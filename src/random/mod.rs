//! Random number generation for shuffles and random draws
//!
//! [`Pcg32`] is the generator embedded in every sequence and dictionary.
//! Bounded draws use multiply-shift reduction with rejection, so
//! `next_in(bound)` is uniform for every bound, not just powers of two.
//! Seeds come from an [`EntropySource`]; [`OsEntropy`] asks the operating
//! system and [`FixedEntropy`] replays a deterministic stream for tests.

mod entropy;
mod pcg;
pub mod sampling;

pub use entropy::{EntropySource, FixedEntropy, OsEntropy};
pub use pcg::Pcg32;

/// Seed a generator from the operating system, falling back to the fixed
/// default state when no entropy is available.
pub(crate) fn os_seeded() -> Pcg32 {
    match Pcg32::from_entropy(&OsEntropy) {
        Ok(rng) => rng,
        Err(e) => {
            log::warn!("falling back to default generator state: {}", e);
            Pcg32::default()
        }
    }
}

/// Generator for an optional configured seed.
pub(crate) fn seeded_or_os(seed: Option<u64>) -> Pcg32 {
    match seed {
        Some(seed) => Pcg32::from_seed(seed),
        None => os_seeded(),
    }
}
