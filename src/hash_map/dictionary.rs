//! Dictionary - hybrid single-entry / chained hash table
//!
//! Buckets hold nothing, one entry inline, or a chain of entries kept in a
//! singly linked [`Sequence`]. A bucket is promoted to a chain when a second
//! key lands in it and demoted back when removals leave a single entry, so
//! sparse tables pay no chain overhead.
//!
//! Keys are either [`Identity`](super::Identity) references compared by
//! address or text copied into the dictionary. Both strategies coexist in
//! one table.
//!
//! # Examples
//!
//! ```rust
//! use polyseq::Dictionary;
//! # fn main() -> polyseq::Result<()> {
//! let mut sounds = Dictionary::new(16)?;
//! sounds.set("cats", "meow")?;
//! sounds.set("dogs", "bark")?;
//! sounds.set("birds", "chirp")?;
//! assert_eq!(sounds.len(), 3);
//!
//! assert_eq!(sounds.remove("dogs"), Some("bark"));
//! assert_eq!(sounds.get("dogs"), None);
//! assert_eq!(sounds.get("cats"), Some(&"meow"));
//! # Ok(())
//! # }
//! ```

use super::key::{DictKey, KeyRef};
use crate::config::sequence::DEFAULT_MAX_CAPACITY;
use crate::config::{Config, DictionaryConfig};
use crate::containers::{Disposer, Iter as SequenceIter, Sequence, SequenceKind};
use crate::error::{PolyseqError, Result};
use crate::memory::{array_bytes, Allocator, SystemAllocator};
use crate::random::{self, Pcg32};
use ahash::RandomState;
use std::fmt;
use std::hash::BuildHasher;
use std::mem;
use std::rc::Rc;
use std::slice;

/// Load factor used when none is configured.
const DEFAULT_MAX_LOAD_FACTOR: f64 = 0.75;

struct Entry<V> {
    key: DictKey,
    value: V,
    hash: u64,
    slot: usize,
}

impl<V> Entry<V> {
    #[inline]
    fn matches(&self, hash: u64, probe: KeyRef<'_>) -> bool {
        self.hash == hash && self.key.matcher().matches(&self.key, probe)
    }
}

enum Bucket<V, A: Allocator> {
    Empty,
    Single(Entry<V>),
    Chained(Sequence<Entry<V>, A>),
}

fn chain_disposer<V: 'static>(dispose: Disposer<V>) -> Disposer<Entry<V>> {
    Rc::new(move |entry: Entry<V>| dispose(entry.value))
}

/// Occupancy summary returned by [`Dictionary::bucket_stats`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BucketStats {
    /// Bucket count
    pub capacity: usize,
    /// Entries stored
    pub len: usize,
    /// Buckets holding nothing
    pub empty: usize,
    /// Buckets holding one inline entry
    pub single: usize,
    /// Buckets holding a chain
    pub chained: usize,
    /// Entries in the longest bucket
    pub longest_chain: usize,
    /// `len / capacity`
    pub load_factor: f64,
}

/// Hash table from [`DictKey`]s to values of type `V`.
///
/// The bucket count is always a power of two. It only changes through
/// [`Dictionary::resize`] or, when enabled in [`DictionaryConfig`],
/// automatic growth past the configured load factor.
pub struct Dictionary<V, A: Allocator = SystemAllocator, S = RandomState> {
    buckets: Vec<Bucket<V, A>>,
    len: usize,
    alloc: A,
    hasher: S,
    auto_grow: bool,
    max_load_factor: f64,
    rng: Pcg32,
    disposer: Option<Disposer<V>>,
    chain_disposer: Option<Disposer<Entry<V>>>,
}

impl<V> Dictionary<V> {
    /// Empty dictionary with `capacity` buckets.
    ///
    /// # Errors
    ///
    /// [`PolyseqError::BadArgument`] unless `capacity` is a power of two.
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_hasher_in(capacity, RandomState::new(), SystemAllocator)
    }

    /// Dictionary built from a validated configuration.
    pub fn with_config(config: &DictionaryConfig) -> Result<Self> {
        Self::with_config_in(config, SystemAllocator)
    }
}

impl<V, A: Allocator> Dictionary<V, A> {
    /// Dictionary built from `config`, drawing memory through `alloc`.
    ///
    /// A configured seed fixes both the hash function and the generator
    /// behind [`Dictionary::choose`].
    ///
    /// # Errors
    ///
    /// [`PolyseqError::BadArgument`] unless the capacity is a power of two,
    /// [`PolyseqError::Configuration`] for any other invalid field.
    pub fn with_config_in(config: &DictionaryConfig, alloc: A) -> Result<Self> {
        Self::check_capacity(config.capacity)?;
        config.validate()?;
        let hasher = match config.seed {
            Some(seed) => RandomState::with_seeds(
                seed,
                seed.rotate_left(16),
                seed.rotate_left(32),
                seed.rotate_left(48),
            ),
            None => RandomState::new(),
        };
        let mut dict = Self::build(config.capacity, hasher, alloc, config.seed)?;
        dict.auto_grow = config.auto_grow;
        dict.max_load_factor = config.max_load_factor;
        Ok(dict)
    }
}

impl<V, A: Allocator, S> Dictionary<V, A, S> {
    fn check_capacity(capacity: usize) -> Result<()> {
        if capacity.is_power_of_two() {
            Ok(())
        } else {
            Err(PolyseqError::bad_argument(format!(
                "dictionary capacity {} is not a power of two",
                capacity
            )))
        }
    }

    fn build(capacity: usize, hasher: S, alloc: A, seed: Option<u64>) -> Result<Self> {
        Self::check_capacity(capacity)?;
        let buckets = Self::bucket_array(capacity, &alloc)?;
        Ok(Self {
            buckets,
            len: 0,
            alloc,
            hasher,
            auto_grow: false,
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
            rng: random::seeded_or_os(seed),
            disposer: None,
            chain_disposer: None,
        })
    }

    fn bucket_array(capacity: usize, alloc: &A) -> Result<Vec<Bucket<V, A>>> {
        let bytes = array_bytes::<Bucket<V, A>>(capacity)?;
        alloc.allocate(bytes)?;
        let mut buckets = Vec::new();
        if buckets.try_reserve_exact(capacity).is_err() {
            alloc.deallocate(bytes);
            return Err(PolyseqError::out_of_memory(bytes));
        }
        buckets.resize_with(capacity, || Bucket::Empty);
        Ok(buckets)
    }

    #[inline]
    fn table_bytes(capacity: usize) -> usize {
        mem::size_of::<Bucket<V, A>>() * capacity
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the dictionary holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bucket count.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// The allocator this dictionary draws from.
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Whether the table doubles once the load factor is exceeded.
    pub fn auto_grow(&self) -> bool {
        self.auto_grow
    }

    /// Turn automatic growth on or off.
    pub fn set_auto_grow(&mut self, enabled: bool) {
        self.auto_grow = enabled;
    }

    /// Entries in bucket order, chains front to back.
    pub fn iter(&self) -> Iter<'_, V, A> {
        Iter {
            buckets: self.buckets.iter(),
            chain: None,
            remaining: self.len,
        }
    }

    /// Keys in iteration order.
    pub fn keys(&self) -> impl Iterator<Item = &DictKey> + '_ {
        self.iter().map(|(key, _)| key)
    }

    /// Values in iteration order.
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, value)| value)
    }

    /// Uniformly random entry.
    pub fn choose(&mut self) -> Result<(&DictKey, &V)> {
        if self.len == 0 {
            return Err(PolyseqError::empty("choose"));
        }
        let pick = self.rng.next_below(self.len);
        let len = self.len;
        self.iter()
            .nth(pick)
            .ok_or_else(|| PolyseqError::corrupted(format!("size {} exceeds occupancy", len)))
    }

    /// Remove every entry, handing values to the disposer if one is set.
    pub fn clear(&mut self) {
        for slot in 0..self.buckets.len() {
            match mem::replace(&mut self.buckets[slot], Bucket::Empty) {
                Bucket::Empty => {}
                Bucket::Single(entry) => self.dispose_entry(entry),
                Bucket::Chained(chain) => {
                    for entry in &chain {
                        self.release_key(&entry.key);
                    }
                    // the chain's own disposer receives the values
                    drop(chain);
                }
            }
        }
        self.len = 0;
    }

    /// Register a callback for values the dictionary discards itself
    /// (`clear` and drop).
    ///
    /// Applies to every bucket, including chains created before the call.
    pub fn set_disposer<F>(&mut self, disposer: F)
    where
        F: Fn(V) + 'static,
        V: 'static,
    {
        let dispose: Disposer<V> = Rc::new(disposer);
        let chained = chain_disposer(Rc::clone(&dispose));
        for bucket in &mut self.buckets {
            if let Bucket::Chained(chain) = bucket {
                chain.set_shared_disposer(Some(Rc::clone(&chained)));
            }
        }
        self.disposer = Some(dispose);
        self.chain_disposer = Some(chained);
    }

    /// Rehash into `new_capacity` buckets.
    ///
    /// Every bucket and chain node the new table needs is admitted before
    /// any entry moves, so a refusal leaves the dictionary as it was.
    ///
    /// # Errors
    ///
    /// [`PolyseqError::BadArgument`] unless `new_capacity` is a power of
    /// two; allocation errors from the allocator.
    pub fn resize(&mut self, new_capacity: usize) -> Result<()> {
        Self::check_capacity(new_capacity)?;
        let old_capacity = self.buckets.len();
        if new_capacity == old_capacity {
            return Ok(());
        }
        let mask = new_capacity - 1;

        let mut counts: Vec<usize> = Vec::new();
        if counts.try_reserve_exact(new_capacity).is_err() {
            return Err(PolyseqError::out_of_memory(
                new_capacity * mem::size_of::<usize>(),
            ));
        }
        counts.resize(new_capacity, 0);
        for bucket in &self.buckets {
            match bucket {
                Bucket::Empty => {}
                Bucket::Single(entry) => counts[entry.hash as usize & mask] += 1,
                Bucket::Chained(chain) => {
                    for entry in chain {
                        counts[entry.hash as usize & mask] += 1;
                    }
                }
            }
        }

        let mut table = Self::bucket_array(new_capacity, &self.alloc)?;
        for (slot, &count) in counts.iter().enumerate() {
            if count < 2 {
                continue;
            }
            match self.new_chain(count) {
                Ok(chain) => table[slot] = Bucket::Chained(chain),
                Err(e) => {
                    drop(table);
                    self.alloc.deallocate(Self::table_bytes(new_capacity));
                    return Err(e);
                }
            }
        }

        let old = mem::replace(&mut self.buckets, table);
        self.alloc.deallocate(Self::table_bytes(old_capacity));
        for bucket in old {
            match bucket {
                Bucket::Empty => {}
                Bucket::Single(entry) => Self::place(&mut self.buckets, mask, entry)?,
                Bucket::Chained(mut chain) => {
                    while let Ok(entry) = chain.shift() {
                        Self::place(&mut self.buckets, mask, entry)?;
                    }
                }
            }
        }
        log::debug!(
            "dictionary resized {} -> {} buckets ({} entries)",
            old_capacity,
            new_capacity,
            self.len
        );
        Ok(())
    }

    /// Occupancy summary.
    pub fn bucket_stats(&self) -> BucketStats {
        let mut stats = BucketStats {
            capacity: self.buckets.len(),
            len: self.len,
            ..BucketStats::default()
        };
        for bucket in &self.buckets {
            let occupancy = match bucket {
                Bucket::Empty => {
                    stats.empty += 1;
                    0
                }
                Bucket::Single(_) => {
                    stats.single += 1;
                    1
                }
                Bucket::Chained(chain) => {
                    stats.chained += 1;
                    chain.len()
                }
            };
            stats.longest_chain = stats.longest_chain.max(occupancy);
        }
        if stats.capacity > 0 {
            stats.load_factor = self.len as f64 / stats.capacity as f64;
        }
        stats
    }

    /// Chain with room for `reserve` entries, carrying the current disposer.
    fn new_chain(&mut self, reserve: usize) -> Result<Sequence<Entry<V>, A>> {
        let mut chain = Sequence::try_new_in(
            SequenceKind::SinglyLinkedList,
            self.alloc.clone(),
            DEFAULT_MAX_CAPACITY,
            Some(self.rng.next_u64()),
        )?;
        chain.reserve(reserve)?;
        chain.set_shared_disposer(self.chain_disposer.clone());
        Ok(chain)
    }

    /// Put `entry` into its bucket of a table whose chains are prepaid.
    fn place(buckets: &mut [Bucket<V, A>], mask: usize, mut entry: Entry<V>) -> Result<()> {
        let slot = entry.hash as usize & mask;
        entry.slot = slot;
        match &mut buckets[slot] {
            Bucket::Chained(chain) => chain.push(entry),
            bucket => {
                *bucket = Bucket::Single(entry);
                Ok(())
            }
        }
    }

    /// Bucket for what is left of `chain` after a removal.
    fn settle(chain: Sequence<Entry<V>, A>, slot: usize) -> Bucket<V, A> {
        let mut chain = chain;
        match chain.len() {
            0 => Bucket::Empty,
            1 => match chain.shift() {
                Ok(entry) => {
                    log::debug!("bucket {} demoted to a single entry", slot);
                    Bucket::Single(entry)
                }
                Err(_) => Bucket::Empty,
            },
            _ => Bucket::Chained(chain),
        }
    }

    fn admit_key(&self, probe: KeyRef<'_>) -> Result<DictKey> {
        let key = probe.to_owned_key();
        let bytes = key.owned_bytes();
        if bytes > 0 {
            self.alloc.allocate(bytes)?;
        }
        Ok(key)
    }

    fn release_key(&self, key: &DictKey) {
        let bytes = key.owned_bytes();
        if bytes > 0 {
            self.alloc.deallocate(bytes);
        }
    }

    fn dispose_entry(&self, entry: Entry<V>) {
        self.release_key(&entry.key);
        if let Some(dispose) = &self.disposer {
            dispose(entry.value);
        }
    }

    fn should_grow(&self) -> bool {
        self.auto_grow && self.len as f64 > self.max_load_factor * self.buckets.len() as f64
    }
}

impl<V, A: Allocator, S: BuildHasher> Dictionary<V, A, S> {
    /// Empty dictionary with `capacity` buckets, hashing with `hasher`.
    pub fn with_hasher_in(capacity: usize, hasher: S, alloc: A) -> Result<Self> {
        Self::build(capacity, hasher, alloc, None)
    }

    #[inline]
    fn hash_key(&self, key: KeyRef<'_>) -> u64 {
        key.hash_with(&self.hasher)
    }

    #[inline]
    fn slot_for(&self, hash: u64) -> usize {
        hash as usize & (self.buckets.len() - 1)
    }

    fn lookup(&self, slot: usize, hash: u64, key: KeyRef<'_>) -> Option<&Entry<V>> {
        match &self.buckets[slot] {
            Bucket::Empty => None,
            Bucket::Single(entry) => entry.matches(hash, key).then_some(entry),
            Bucket::Chained(chain) => chain.find_first(|entry| entry.matches(hash, key)),
        }
    }

    fn lookup_mut(&mut self, slot: usize, hash: u64, key: KeyRef<'_>) -> Option<&mut Entry<V>> {
        match &mut self.buckets[slot] {
            Bucket::Empty => None,
            Bucket::Single(entry) => entry.matches(hash, key).then_some(entry),
            Bucket::Chained(chain) => chain.find_first_mut(|entry| entry.matches(hash, key)),
        }
    }

    /// Map `key` to `value`, returning the previous value if the key was
    /// already present. Text keys are copied on first insert.
    ///
    /// On error the dictionary is unchanged and `value` is dropped.
    pub fn set<'k, K: Into<KeyRef<'k>>>(&mut self, key: K, value: V) -> Result<Option<V>> {
        let key = key.into();
        let hash = self.hash_key(key);
        let slot = self.slot_for(hash);
        if let Some(entry) = self.lookup_mut(slot, hash, key) {
            return Ok(Some(mem::replace(&mut entry.value, value)));
        }

        let owned = self.admit_key(key)?;
        let promoted = match self.make_room(slot) {
            Ok(promoted) => promoted,
            Err(e) => {
                self.release_key(&owned);
                return Err(e);
            }
        };
        let key_bytes = owned.owned_bytes();
        let entry = Entry {
            key: owned,
            value,
            hash,
            slot,
        };

        if let Err(e) = self.store(slot, entry, promoted) {
            if key_bytes > 0 {
                self.alloc.deallocate(key_bytes);
            }
            return Err(e);
        }
        self.len += 1;

        if self.should_grow() {
            if let Some(doubled) = self.buckets.len().checked_mul(2) {
                if let Err(e) = self.resize(doubled) {
                    log::debug!("auto-grow to {} buckets skipped: {}", doubled, e);
                }
            }
        }
        Ok(None)
    }

    /// Store `entry` in the bucket at `slot`, whose room `make_room` has
    /// already admitted.
    fn store(
        &mut self,
        slot: usize,
        entry: Entry<V>,
        promoted: Option<Sequence<Entry<V>, A>>,
    ) -> Result<()> {
        let bucket = &mut self.buckets[slot];
        match bucket {
            Bucket::Empty => *bucket = Bucket::Single(entry),
            Bucket::Chained(chain) => chain.push(entry)?,
            Bucket::Single(_) => {
                let Some(mut chain) = promoted else {
                    return Err(PolyseqError::corrupted(format!(
                        "bucket {} was not prepared for promotion",
                        slot
                    )));
                };
                if let Bucket::Single(first) = mem::replace(bucket, Bucket::Empty) {
                    chain.push(first)?;
                }
                chain.push(entry)?;
                *bucket = Bucket::Chained(chain);
                log::debug!("bucket {} promoted to a chain", slot);
            }
        }
        Ok(())
    }

    /// Admit whatever the bucket at `slot` needs for one more entry.
    /// Returns the chain to promote into when the bucket holds one entry.
    fn make_room(&mut self, slot: usize) -> Result<Option<Sequence<Entry<V>, A>>> {
        if matches!(self.buckets[slot], Bucket::Single(_)) {
            return self.new_chain(2).map(Some);
        }
        if let Bucket::Chained(chain) = &mut self.buckets[slot] {
            chain.reserve(1)?;
        }
        Ok(None)
    }

    /// Value stored under `key`.
    pub fn get<'k, K: Into<KeyRef<'k>>>(&self, key: K) -> Option<&V> {
        let key = key.into();
        let hash = self.hash_key(key);
        self.lookup(self.slot_for(hash), hash, key)
            .map(|entry| &entry.value)
    }

    /// Mutable value stored under `key`.
    pub fn get_mut<'k, K: Into<KeyRef<'k>>>(&mut self, key: K) -> Option<&mut V> {
        let key = key.into();
        let hash = self.hash_key(key);
        let slot = self.slot_for(hash);
        self.lookup_mut(slot, hash, key).map(|entry| &mut entry.value)
    }

    /// Whether `key` is present.
    pub fn contains_key<'k, K: Into<KeyRef<'k>>>(&self, key: K) -> bool {
        self.get(key).is_some()
    }

    /// Remove `key`, returning its value. Absent keys return `None` and
    /// leave the dictionary unchanged.
    pub fn remove<'k, K: Into<KeyRef<'k>>>(&mut self, key: K) -> Option<V> {
        let key = key.into();
        let hash = self.hash_key(key);
        let slot = self.slot_for(hash);
        let candidate = match &self.buckets[slot] {
            Bucket::Empty => false,
            Bucket::Single(entry) => entry.matches(hash, key),
            Bucket::Chained(_) => true,
        };
        if !candidate {
            return None;
        }

        let removed = match mem::replace(&mut self.buckets[slot], Bucket::Empty) {
            Bucket::Empty => None,
            Bucket::Single(entry) => Some(entry),
            Bucket::Chained(mut chain) => {
                let removed = chain.discard(|entry| entry.matches(hash, key)).ok();
                self.buckets[slot] = Self::settle(chain, slot);
                removed
            }
        }?;
        self.len -= 1;
        self.release_key(&removed.key);
        Some(removed.value)
    }

    /// Check the structural invariants.
    ///
    /// The size equals the summed bucket occupancy, every entry sits in the
    /// slot its hash selects, chains hold at least two entries, and no key
    /// appears twice in a bucket.
    ///
    /// # Errors
    ///
    /// [`PolyseqError::Corrupted`] naming the first violated invariant.
    pub fn verify(&self) -> Result<()> {
        let capacity = self.buckets.len();
        if !capacity.is_power_of_two() {
            return Err(PolyseqError::corrupted(format!(
                "bucket count {} is not a power of two",
                capacity
            )));
        }
        let mask = capacity - 1;
        let mut occupancy = 0;
        for (slot, bucket) in self.buckets.iter().enumerate() {
            let entries: Vec<&Entry<V>> = match bucket {
                Bucket::Empty => Vec::new(),
                Bucket::Single(entry) => vec![entry],
                Bucket::Chained(chain) => {
                    if chain.len() < 2 {
                        return Err(PolyseqError::corrupted(format!(
                            "bucket {} chains {} entries",
                            slot,
                            chain.len()
                        )));
                    }
                    chain.iter().collect()
                }
            };
            for (i, entry) in entries.iter().enumerate() {
                if entry.slot != slot || entry.hash as usize & mask != slot {
                    return Err(PolyseqError::corrupted(format!(
                        "key {} filed under bucket {}, belongs in {}",
                        entry.key,
                        slot,
                        entry.hash as usize & mask
                    )));
                }
                if self.hash_key(entry.key.as_key_ref()) != entry.hash {
                    return Err(PolyseqError::corrupted(format!(
                        "stale hash for key {}",
                        entry.key
                    )));
                }
                if entries[..i].iter().any(|other| other.key == entry.key) {
                    return Err(PolyseqError::corrupted(format!(
                        "key {} stored twice in bucket {}",
                        entry.key, slot
                    )));
                }
            }
            occupancy += entries.len();
        }
        if occupancy != self.len {
            return Err(PolyseqError::corrupted(format!(
                "size {} != occupancy {}",
                self.len, occupancy
            )));
        }
        Ok(())
    }
}

impl<V, A: Allocator, S> Drop for Dictionary<V, A, S> {
    fn drop(&mut self) {
        self.clear();
        self.alloc.deallocate(Self::table_bytes(self.buckets.len()));
    }
}

impl<V: fmt::Debug, A: Allocator, S> fmt::Debug for Dictionary<V, A, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, V, A: Allocator, S> IntoIterator for &'a Dictionary<V, A, S> {
    type Item = (&'a DictKey, &'a V);
    type IntoIter = Iter<'a, V, A>;

    fn into_iter(self) -> Iter<'a, V, A> {
        self.iter()
    }
}

/// Iterator over a [`Dictionary`]'s entries.
pub struct Iter<'a, V, A: Allocator> {
    buckets: slice::Iter<'a, Bucket<V, A>>,
    chain: Option<SequenceIter<'a, Entry<V>>>,
    remaining: usize,
}

impl<'a, V, A: Allocator> Iterator for Iter<'a, V, A> {
    type Item = (&'a DictKey, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(chain) = &mut self.chain {
                if let Some(entry) = chain.next() {
                    self.remaining = self.remaining.saturating_sub(1);
                    return Some((&entry.key, &entry.value));
                }
                self.chain = None;
            }
            match self.buckets.next()? {
                Bucket::Empty => {}
                Bucket::Single(entry) => {
                    self.remaining = self.remaining.saturating_sub(1);
                    return Some((&entry.key, &entry.value));
                }
                Bucket::Chained(chain) => self.chain = Some(chain.iter()),
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, V, A: Allocator> ExactSizeIterator for Iter<'a, V, A> {}
