use core::{fmt, sync::atomic::*};

/// Counter with no ordering guarantees, good enough for diagnostics shared between workers.
pub struct RelaxedCounter(AtomicUsize);

impl Default for RelaxedCounter {
    fn default() -> Self {
        Self(AtomicUsize::new(0))
    }
}

impl Clone for RelaxedCounter {
    fn clone(&self) -> Self {
        Self(self.get().into())
    }
}

impl fmt::Debug for RelaxedCounter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.get().fmt(f)
    }
}

impl fmt::Display for RelaxedCounter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.get().fmt(f)
    }
}

impl RelaxedCounter {
    pub fn inc(&self) { self.0.fetch_add(1, Ordering::Relaxed); }

    pub fn get(&self) -> usize { self.0.load(Ordering::Relaxed) }

    pub fn reset(&self) { self.0.store(0, Ordering::Relaxed); }
}

macro_rules! debugs {
    ($($name:ident),*) => {
        /// Probe counters since the last reset. Cloning takes a snapshot.
        #[derive(Debug, Clone, Default)]
        pub struct CacheStats {
            $(pub $name: RelaxedCounter,)*
        }

        impl CacheStats {
            pub fn reset(&self) {
                $(self.$name.reset();)*
            }
        }
    };
}

debugs!(hits, probes);

impl CacheStats {
    /// Fraction of probes that produced a usable value, `0.0` before the first probe.
    pub fn hit_rate(&self) -> f64 {
        match self.probes.get() {
            0 => 0.0,
            probes => self.hits.get() as f64 / probes as f64,
        }
    }
}

#[test]
fn test_stats_reset() {
    let stats = CacheStats::default();
    stats.probes.inc();
    stats.probes.inc();
    stats.hits.inc();

    let snapshot = stats.clone();
    assert_eq!(snapshot.hit_rate(), 0.5);

    stats.reset();
    assert_eq!(stats.hits.get(), 0);
    assert_eq!(stats.probes.get(), 0);
    assert_eq!(stats.hit_rate(), 0.0);
    assert_eq!(snapshot.probes.get(), 2);
}
