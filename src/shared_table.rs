use std::collections::TryReserveError;

use bytemuck::Zeroable;
use parking_lot::Mutex;

/// Fixed-size table of slots addressed by `key % size`, shared between threads.
///
/// Each slot sits behind its own lock, so a read or write never observes half of another write
/// and never waits on anything but a copy of one slot.
pub struct SharedHashTable<T: Copy + Zeroable + Send> {
    inner: Box<[Mutex<TableEntry<T>>]>,
}

#[derive(Clone, Copy)]
struct TableEntry<T: Copy + Zeroable> {
    key: u64,
    value: T,
}

impl<T: Copy + Zeroable> TableEntry<T> {
    fn zeroed() -> Self {
        Self { key: 0, value: T::zeroed() }
    }
}

impl<T: Copy + Zeroable + Send> SharedHashTable<T> {
    pub const fn entry_size() -> usize { core::mem::size_of::<Mutex<TableEntry<T>>>() }

    /// `size` must be non-zero. Fails instead of aborting if the slots can't be allocated.
    pub fn new(size: usize) -> Result<Self, TryReserveError> {
        debug_assert!(size != 0);
        let mut inner = Vec::new();
        inner.try_reserve_exact(size)?;
        inner.resize_with(size, || Mutex::new(TableEntry::zeroed()));

        Ok(Self { inner: inner.into() })
    }

    #[inline]
    pub fn index(&self, key: u64) -> usize {
        (key % self.inner.len() as u64) as usize
    }

    /// Unconditionally replace whatever occupies the slot of `key`.
    #[inline]
    pub fn insert(&self, key: u64, value: T) {
        *self.inner[self.index(key)].lock() = TableEntry { key, value };
    }

    /// Value stored under exactly `key`, if the slot has not been taken by another key since.
    #[inline]
    pub fn get(&self, key: u64) -> Option<T> {
        let entry = *self.inner[self.index(key)].lock();

        (entry.key == key).then_some(entry.value)
    }

    pub fn filter_count<F: Fn(T) -> bool>(&self, filter: F) -> usize {
        self.inner.iter().filter(|slot| filter(slot.lock().value)).count()
    }

    pub fn size(&self) -> usize { self.inner.len() }
}

#[test]
fn test_shared_table() {
    let st = std::sync::Arc::new(SharedHashTable::<u32>::new(10).unwrap());

    st.insert(0, 123);
    assert_eq!(st.get(0), Some(123));
    st.insert(10, 456);
    assert_eq!(st.get(10), Some(456));
    assert_eq!(st.get(0), None);

    {
        let st = std::sync::Arc::clone(&st);
        std::thread::spawn(move || st.insert(1, 789)).join().unwrap();
    }

    assert_eq!(st.get(1), Some(789));
    assert_eq!(st.filter_count(|v| v != 0), 2);
}

#[test]
fn test_index_is_unsigned_modulo() {
    let st = SharedHashTable::<u32>::new(7).unwrap();

    assert_eq!(st.index(u64::MAX), (u64::MAX % 7) as usize);
    assert_eq!(st.index(6), 6);
    assert_eq!(st.index(7), 0);
}

#[test]
fn test_oversized_table_is_an_error() {
    assert!(SharedHashTable::<u64>::new(usize::MAX).is_err());
    assert!(SharedHashTable::<u64>::new(usize::MAX / SharedHashTable::<u64>::entry_size() + 1).is_err());
}
