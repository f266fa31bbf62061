use core::marker::PhantomData;
use core::sync::atomic::{AtomicU32, Ordering};

use bytemuck::Zeroable;
use log::{debug, warn};

use crate::{debug::CacheStats, error::*, eval::Eval, info::ExtraInfo, node::EntryType, shared_table::*};

/// Remaining search horizon a value was computed at.
pub type Depth = u16;

/// Largest slot count a table may be built with.
pub const MAX_CAPACITY: usize = i32::MAX as usize;

/// Zeroed slots carry generation 0, which is never live.
const FIRST_GENERATION: u32 = 1;

/// One memoized search result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Zeroable)]
pub struct TransEntry {
    generation: u32,
    value: Eval,
    info: u64,
    depth: Depth,
    entry_type: EntryType,
}

impl TransEntry {
    pub fn generation(&self) -> u32 { self.generation }
    pub fn value(&self) -> Eval { self.value }
    pub fn info_bits(&self) -> u64 { self.info }
    pub fn depth(&self) -> Depth { self.depth }
    pub fn entry_type(&self) -> EntryType { self.entry_type }
}

/// Fixed-capacity transposition table shared by search workers.
///
/// Entries are keyed by a position fingerprint combined with caller-defined [`ExtraInfo`]. A
/// [`record`](Self::record) always overwrites its slot. [`reset`](Self::reset) forgets every
/// entry in O(1) by moving to a new generation; entries stamped with an older generation stay in
/// memory until their slot is next written, but are never returned.
pub struct TransTable<I: ExtraInfo = u32> {
    table: SharedHashTable<TransEntry>,
    generation: AtomicU32,
    stats: CacheStats,
    _info: PhantomData<fn(I)>,
}

impl<I: ExtraInfo> TransTable<I> {
    /// Bytes taken by a single slot.
    pub const fn entry_size() -> usize { SharedHashTable::<TransEntry>::entry_size() }

    /// Allocate a table of exactly `capacity` slots.
    ///
    /// Fails with [`Error::InvalidConfiguration`] if `capacity` is zero or above
    /// [`MAX_CAPACITY`].
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidConfiguration { capacity, reason: "must be at least 1" });
        }
        if capacity > MAX_CAPACITY {
            return Err(Error::InvalidConfiguration { capacity, reason: "exceeds the largest non-negative 32-bit count" });
        }

        let table = SharedHashTable::new(capacity).map_err(|_| Error::InvalidConfiguration {
            capacity,
            reason: "could not be allocated",
        })?;

        debug!(
            "allocated transposition table: {capacity} entries x {} bytes = {} bytes",
            Self::entry_size(),
            capacity.saturating_mul(Self::entry_size()),
        );

        Ok(Self {
            table,
            generation: AtomicU32::new(FIRST_GENERATION),
            stats: CacheStats::default(),
            _info: PhantomData,
        })
    }

    /// Allocate as many slots as fit in `hash_size_bytes`.
    pub fn with_hash_size(hash_size_bytes: usize) -> Result<Self> {
        Self::new(hash_size_bytes / Self::entry_size())
    }

    #[inline]
    fn key(fingerprint: u64, info: I) -> u64 {
        fingerprint ^ info.key_bits()
    }

    /// Store the result of searching a node, replacing whatever held its slot.
    pub fn record(&self, fingerprint: u64, info: I, depth: Depth, value: Eval, entry_type: EntryType) {
        let entry = TransEntry {
            generation: self.generation(),
            value,
            info: info.bits(),
            depth,
            entry_type,
        };

        self.table.insert(Self::key(fingerprint, info), entry);
    }

    /// The live entry for this position, whatever its depth or bound.
    ///
    /// Doesn't count as a probe or a hit.
    pub fn lookup(&self, fingerprint: u64, info: I) -> Option<TransEntry> {
        let entry = self.table.get(Self::key(fingerprint, info))?;

        // `info` is already folded into the key, the second comparison only matters when the
        // fingerprints themselves collide
        (entry.generation == self.generation() && entry.info == info.bits()).then_some(entry)
    }

    /// Value usable at a node searched to at least `depth` with window `(alpha, beta)`.
    ///
    /// Exact entries return their value. Upper bounds at or below `alpha` return `alpha` and
    /// lower bounds at or above `beta` return `beta`. Anything else, including entries recorded
    /// at a shallower depth, is a miss.
    pub fn probe(&self, fingerprint: u64, info: I, depth: Depth, alpha: Eval, beta: Eval) -> Option<Eval> {
        #[cfg(feature = "cache-stats")]
        self.stats.probes.inc();

        let entry = self.lookup(fingerprint, info).filter(|e| e.depth >= depth)?;
        let value = match entry.entry_type {
            EntryType::Exact => entry.value,
            EntryType::UpperBound if entry.value <= alpha => alpha,
            EntryType::LowerBound if entry.value >= beta => beta,
            _ => return None,
        };

        self.stats.hits.inc();
        Some(value)
    }

    /// Invalidate every entry and clear the counters.
    pub fn reset(&self) {
        self.stats.reset();

        // 0 is the generation of zeroed slots, step over it
        if self.generation.fetch_add(1, Ordering::Relaxed) == u32::MAX {
            self.generation.fetch_add(1, Ordering::Relaxed);
            warn!("transposition table generation wrapped around");
        }
        debug!("transposition table reset to generation {}", self.generation());
    }

    #[inline]
    pub fn generation(&self) -> u32 { self.generation.load(Ordering::Relaxed) }

    /// Number of slots, fixed at construction.
    #[doc(alias = "size")]
    pub fn entry_count(&self) -> usize { self.table.size() }

    /// Accepted probes since the last reset.
    #[doc(alias = "cache_hit")]
    pub fn hits(&self) -> usize { self.stats.hits.get() }

    /// Probes since the last reset. Only counted with the `cache-stats` feature, `0` otherwise.
    pub fn probes(&self) -> usize { self.stats.probes.get() }

    pub fn stats(&self) -> CacheStats { self.stats.clone() }

    /// Slots holding an entry from the current generation. Walks the whole table.
    pub fn used(&self) -> usize {
        let generation = self.generation();
        self.table.filter_count(|e| e.generation == generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    const K: u64 = 0x9e37_79b9_7f4a_7c15;

    fn table(capacity: usize) -> TransTable<u32> {
        TransTable::new(capacity).unwrap()
    }

    #[test]
    fn entry_count_matches_capacity() {
        for capacity in [1, 2, 7, 64, 1000] {
            assert_eq!(table(capacity).entry_count(), capacity);
        }
    }

    #[test]
    fn rejects_out_of_range_capacity() {
        let err = TransTable::<u32>::new(MAX_CAPACITY + 1).err();
        assert!(matches!(err, Some(Error::InvalidConfiguration { capacity, .. }) if capacity == MAX_CAPACITY + 1));

        assert!(matches!(TransTable::<u32>::new(0), Err(Error::InvalidConfiguration { capacity: 0, .. })));
    }

    #[test]
    fn with_hash_size_fits_budget() {
        let tt = TransTable::<u32>::with_hash_size(1 << 16).unwrap();
        assert_eq!(tt.entry_count(), (1 << 16) / TransTable::<u32>::entry_size());

        assert!(TransTable::<u32>::with_hash_size(TransTable::<u32>::entry_size() - 1).is_err());
    }

    #[test]
    fn exact_round_trip() {
        let tt = table(1024);
        tt.record(K, 1, 5, 42, EntryType::Exact);

        assert_eq!(tt.probe(K, 1, 5, -100, 100), Some(42));
        assert_eq!(tt.probe(K, 1, 0, 500, 600), Some(42));
        assert_eq!(tt.hits(), 2);
        #[cfg(feature = "cache-stats")]
        assert_eq!(tt.probes(), 2);
    }

    #[test]
    fn shallower_entry_is_a_miss() {
        let tt = table(1024);
        tt.record(K, 1, 5, 42, EntryType::Exact);

        assert_eq!(tt.probe(K, 1, 6, -100, 100), None);
        assert_eq!(tt.hits(), 0);
        #[cfg(feature = "cache-stats")]
        assert_eq!(tt.probes(), 1);
    }

    #[test]
    fn upper_bound_needs_value_at_or_below_alpha() {
        let tt = table(1024);
        tt.record(K, 0, 3, -20, EntryType::UpperBound);

        assert_eq!(tt.probe(K, 0, 3, -10, 50), Some(-10));
        assert_eq!(tt.probe(K, 0, 3, -20, 50), Some(-20));
        assert_eq!(tt.probe(K, 0, 3, -30, 50), None);
        assert_eq!(tt.hits(), 2);
    }

    #[test]
    fn lower_bound_needs_value_at_or_above_beta() {
        let tt = table(1024);
        tt.record(K, 0, 3, 80, EntryType::LowerBound);

        assert_eq!(tt.probe(K, 0, 3, -50, 70), Some(70));
        assert_eq!(tt.probe(K, 0, 3, -50, 80), Some(80));
        assert_eq!(tt.probe(K, 0, 3, -50, 90), None);
        assert_eq!(tt.hits(), 2);
    }

    #[test]
    fn extra_info_separates_positions() {
        let tt = table(1024);
        tt.record(K, 0b01, 4, 7, EntryType::Exact);

        assert_eq!(tt.probe(K, 0b10, 4, -100, 100), None);
        assert_eq!(tt.probe(K, 0b01, 4, -100, 100), Some(7));
    }

    #[test]
    fn extra_info_compared_beyond_key_bits() {
        // both values fold to the same key, only the stored bits tell them apart
        let tt = TransTable::<u64>::new(1024).unwrap();
        tt.record(K, 1 << 32, 4, 7, EntryType::Exact);

        assert_eq!(tt.probe(K, 0, 4, -100, 100), None);
        assert_eq!(tt.probe(K, 1 << 32, 4, -100, 100), Some(7));
    }

    #[test]
    fn reset_invalidates_and_clears_hits() {
        let tt = table(1024);
        tt.record(K, 1, 5, 42, EntryType::Exact);
        assert_eq!(tt.probe(K, 1, 5, -100, 100), Some(42));
        assert_eq!(tt.used(), 1);

        let generation = tt.generation();
        tt.reset();

        assert_eq!(tt.generation(), generation + 1);
        assert_eq!(tt.hits(), 0);
        assert_eq!(tt.probes(), 0);
        assert_eq!(tt.used(), 0);
        assert_eq!(tt.lookup(K, 1), None);
        assert_eq!(tt.probe(K, 1, 5, -100, 100), None);
        assert_eq!(tt.hits(), 0);

        tt.record(K, 1, 5, 43, EntryType::Exact);
        assert_eq!(tt.probe(K, 1, 5, -100, 100), Some(43));
    }

    #[test]
    fn generation_skips_zero_on_wrap() {
        let tt = table(16);
        tt.generation.store(u32::MAX, Ordering::Relaxed);
        tt.record(K, 0, 1, 1, EntryType::Exact);

        tt.reset();

        assert_eq!(tt.generation(), FIRST_GENERATION);
        assert_eq!(tt.used(), 0);
    }

    #[test]
    fn concurrent_resets_each_advance_once() {
        let tt = table(16);

        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| (0..1000).for_each(|_| tt.reset()));
            }
        });

        assert_eq!(tt.generation(), FIRST_GENERATION + 4000);
    }

    #[test]
    fn zeroed_slots_never_match() {
        let tt = table(16);

        assert_eq!(tt.lookup(0, 0), None);
        assert_eq!(tt.probe(0, 0, 0, Eval::MIN, Eval::MAX), None);
        assert_eq!(tt.used(), 0);
    }

    #[test]
    fn collision_keeps_latest() {
        let tt = table(10);
        tt.record(3, 0, 2, 11, EntryType::Exact);
        tt.record(13, 0, 2, 22, EntryType::Exact);

        assert_eq!(tt.probe(3, 0, 2, -100, 100), None);
        assert_eq!(tt.probe(13, 0, 2, -100, 100), Some(22));
        assert_eq!(tt.used(), 1);
    }

    #[test]
    fn record_does_not_count() {
        let tt = table(64);
        tt.record(K, 0, 1, 1, EntryType::Exact);
        tt.record(K, 0, 2, 2, EntryType::LowerBound);

        assert_eq!(tt.hits(), 0);
        assert_eq!(tt.probes(), 0);
    }

    #[test]
    fn lookup_ignores_depth_and_window() {
        let tt = table(64);
        tt.record(K, 3, 9, -5, EntryType::UpperBound);

        let entry = tt.lookup(K, 3).unwrap();
        assert_eq!(entry.depth(), 9);
        assert_eq!(entry.value(), -5);
        assert_eq!(entry.entry_type(), EntryType::UpperBound);
        assert_eq!(entry.info_bits(), 3);
        assert_eq!(entry.generation(), tt.generation());
        assert_eq!(tt.probes(), 0);
    }
}
