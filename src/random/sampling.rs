//! Sampling helpers built on [`Pcg32`].

use super::Pcg32;

/// In-place Fisher–Yates shuffle.
///
/// Every permutation of `items` is equally likely given a uniform generator.
pub fn shuffle<T>(items: &mut [T], rng: &mut Pcg32) {
    for i in (1..items.len()).rev() {
        let j = rng.next_below(i + 1);
        items.swap(i, j);
    }
}

/// Uniformly pick one element, or `None` for an empty slice.
pub fn choose<'a, T>(items: &'a [T], rng: &mut Pcg32) -> Option<&'a T> {
    if items.is_empty() {
        None
    } else {
        items.get(rng.next_below(items.len()))
    }
}
