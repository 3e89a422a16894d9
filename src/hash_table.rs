//! Open-addressing hash table: double hashing, tombstone deletes, additive
//! growth, allocator-parameterized storage.

use crate::alloc::{AllocError, RawAllocator};
use crate::digest::KeyDigest;
use crate::raw_buf::RawBuf;
use crate::Heap;
use core::marker::PhantomData;
use core::mem::{self, MaybeUninit};

/// Slot count of a table built with `new`/`new_in`.
pub const INITIAL_CAPACITY: u32 = 256;
/// Additive capacity step applied on every growth.
pub const GROWTH_STEP: u32 = 128;
/// Load-factor percentage at which an insert triggers growth.
pub const MAX_LOAD_FACTOR: u32 = 70;

/// One array position. Digest 0 means "never occupied"; `tombstone` with a
/// zeroed digest means "previously occupied, now deleted". The value is
/// initialized exactly when the digest is non-zero.
struct Slot<V> {
    digest: u32,
    tombstone: bool,
    value: MaybeUninit<V>,
}

/// Errors surfaced by table operations.
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum TableError {
    /// An entry with the same key (digest) is already present.
    #[error("an item with the same key has already been added")]
    DuplicateKey,
    /// No entry with the given key (digest) is present.
    #[error("the key is not present in the hash table")]
    KeyNotFound,
    /// The probe stride divides by `capacity / 2`, so a table needs at least
    /// two slots.
    #[error("hash table capacity must be at least 2 slots, got {0}")]
    InvalidCapacity(u32),
    /// The allocator could not satisfy the slot array.
    #[error(transparent)]
    Alloc(#[from] AllocError),
}

/// The `iteration`-th probe index for `digest` in a table of `capacity`
/// slots:
///
/// `(1 + digest + iteration * (digest % (capacity / 2))) % capacity`
///
/// computed in wrapping 32-bit arithmetic. The stride is derived from the
/// digest itself (double hashing), which spreads colliding keys instead of
/// clustering them the way a fixed stride would. A derived stride of 0 is
/// replaced by 1; it would otherwise pin the whole sequence to one slot.
///
/// `capacity` must be at least 2.
pub fn probe_index(digest: u32, capacity: u32, iteration: u32) -> u32 {
    debug_assert!(capacity >= 2);
    let mut stride = digest % (capacity / 2);
    if stride == 0 {
        stride = 1;
    }
    1u32.wrapping_add(digest)
        .wrapping_add(iteration.wrapping_mul(stride))
        % capacity
}

enum Probe {
    /// A live slot with the wanted digest.
    Matched(u32),
    /// The first empty (never-occupied) slot on the sequence.
    Empty(u32),
    /// No match and no empty slot anywhere: delete churn has tombstoned the
    /// whole array without ever tripping the load factor, which only counts
    /// live entries. A rehash is the only compaction there is.
    Saturated,
}

/// Associative container keyed by 32-bit digests.
///
/// Keys are not stored: [`KeyDigest`] maps each key to a non-zero digest and
/// digest uniqueness stands in for key uniqueness. The slot array lives in
/// memory obtained from the injected [`RawAllocator`]; under the arena
/// discipline, abandoned arrays (resize, drop) stay resident until the
/// arena's epoch reset.
pub struct HashTable<K: ?Sized, V, A: RawAllocator = Heap> {
    slots: RawBuf<Slot<V>, A>,
    count: u32,
    _key: PhantomData<fn(&K)>,
}

impl<K: KeyDigest + ?Sized, V> HashTable<K, V, Heap> {
    /// Heap-backed table with the default capacity.
    pub fn new() -> Result<Self, TableError> {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    /// Heap-backed table with an explicit capacity (at least 2).
    pub fn with_capacity(capacity: u32) -> Result<Self, TableError> {
        Self::with_capacity_in(capacity, Heap)
    }
}

impl<K: KeyDigest + ?Sized, V, A: RawAllocator + Clone> HashTable<K, V, A> {
    /// Table with the default capacity in the given allocator.
    pub fn new_in(alloc: A) -> Result<Self, TableError> {
        Self::with_capacity_in(INITIAL_CAPACITY, alloc)
    }

    /// Table with an explicit capacity (at least 2) in the given allocator.
    pub fn with_capacity_in(capacity: u32, alloc: A) -> Result<Self, TableError> {
        if capacity < 2 {
            return Err(TableError::InvalidCapacity(capacity));
        }
        let slots = RawBuf::with_capacity(capacity, alloc)?;
        // SAFETY: the buffer spans `capacity` slots.
        unsafe { zero_slots(slots.ptr(), capacity) };
        Ok(Self {
            slots,
            count: 0,
            _key: PhantomData,
        })
    }

    /// Number of live entries.
    pub fn len(&self) -> u32 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Current slot-array length. Never decreases.
    pub fn capacity(&self) -> u32 {
        self.slots.cap()
    }

    /// Insert a new entry. A digest match rejects the insert with
    /// [`TableError::DuplicateKey`] and leaves the table unchanged.
    pub fn add(&mut self, key: &K, value: V) -> Result<(), TableError> {
        let digest = digest_of(key);
        match self.probe_for_insert(digest)? {
            Probe::Matched(_) => Err(TableError::DuplicateKey),
            Probe::Empty(index) => {
                self.occupy(index, digest, value);
                self.grow_if_loaded()?;
                Ok(())
            }
            Probe::Saturated => unreachable!("a freshly grown table has empty slots"),
        }
    }

    /// Overwrite the value of an existing entry, keeping its digest and slot.
    pub fn set(&mut self, key: &K, value: V) -> Result<(), TableError> {
        let digest = digest_of(key);
        match self.find_slot(digest) {
            Probe::Matched(index) => {
                self.replace(index, value);
                Ok(())
            }
            _ => Err(TableError::KeyNotFound),
        }
    }

    /// Insert or overwrite. Returns `true` when the key already existed.
    pub fn add_or_set(&mut self, key: &K, value: V) -> Result<bool, TableError> {
        let digest = digest_of(key);
        match self.probe_for_insert(digest)? {
            Probe::Matched(index) => {
                self.replace(index, value);
                Ok(true)
            }
            Probe::Empty(index) => {
                self.occupy(index, digest, value);
                self.grow_if_loaded()?;
                Ok(false)
            }
            Probe::Saturated => unreachable!("a freshly grown table has empty slots"),
        }
    }

    /// Remove an entry, returning its value. Absence is
    /// [`TableError::KeyNotFound`].
    pub fn remove(&mut self, key: &K) -> Result<V, TableError> {
        let digest = digest_of(key);
        match self.find_slot(digest) {
            Probe::Matched(index) => Ok(self.evict(index)),
            _ => Err(TableError::KeyNotFound),
        }
    }

    /// Remove an entry if present. Returns whether a removal happened;
    /// absence is a normal outcome, not an error.
    pub fn remove_if_contains(&mut self, key: &K) -> bool {
        let digest = digest_of(key);
        match self.find_slot(digest) {
            Probe::Matched(index) => {
                self.evict(index);
                true
            }
            _ => false,
        }
    }

    pub fn contains(&self, key: &K) -> bool {
        matches!(self.find_slot(digest_of(key)), Probe::Matched(_))
    }

    /// Borrow the value for `key`.
    pub fn get(&self, key: &K) -> Result<&V, TableError> {
        match self.find_slot(digest_of(key)) {
            // SAFETY: matched slots hold an initialized value.
            Probe::Matched(index) => Ok(unsafe { self.slot(index).value.assume_init_ref() }),
            _ => Err(TableError::KeyNotFound),
        }
    }

    /// Mutably borrow the value for `key`.
    pub fn get_mut(&mut self, key: &K) -> Result<&mut V, TableError> {
        match self.find_slot(digest_of(key)) {
            // SAFETY: matched slots hold an initialized value.
            Probe::Matched(index) => {
                Ok(unsafe { self.slot_mut(index).value.assume_init_mut() })
            }
            _ => Err(TableError::KeyNotFound),
        }
    }

    /// Iterate over live values. No ordering guarantee.
    pub fn values(&self) -> Values<'_, K, V, A> {
        Values {
            table: self,
            index: 0,
        }
    }

    fn slot(&self, index: u32) -> &Slot<V> {
        debug_assert!(index < self.slots.cap());
        // SAFETY: every probe index is reduced modulo the capacity.
        unsafe { &*self.slots.ptr().add(index as usize) }
    }

    fn slot_mut(&mut self, index: u32) -> &mut Slot<V> {
        debug_assert!(index < self.slots.cap());
        // SAFETY: as above.
        unsafe { &mut *self.slots.ptr().add(index as usize) }
    }

    /// Walk the probe sequence for `digest` to a matching slot or the first
    /// empty one. Tombstones keep their place in the sequence and are
    /// skipped, never matched or reused.
    fn find_slot(&self, digest: u32) -> Probe {
        let capacity = self.slots.cap();
        for iteration in 0..capacity {
            let index = probe_index(digest, capacity, iteration);
            let slot = self.slot(index);
            if slot.tombstone {
                continue;
            }
            if slot.digest == digest {
                return Probe::Matched(index);
            }
            if slot.digest == 0 {
                return Probe::Empty(index);
            }
        }
        // The stride orbit (period capacity / gcd(stride, capacity)) was
        // fully occupied or tombstoned. Sweep linearly from the home slot:
        // slots never return from occupied/tombstoned to empty, so the sweep
        // is stable across the lifetime of one slot array, and it visits
        // every slot — coming up dry means the digest is truly absent.
        let home = probe_index(digest, capacity, 0);
        for offset in 0..capacity {
            let index = home.wrapping_add(offset) % capacity;
            let slot = self.slot(index);
            if slot.tombstone {
                continue;
            }
            if slot.digest == digest {
                return Probe::Matched(index);
            }
            if slot.digest == 0 {
                return Probe::Empty(index);
            }
        }
        Probe::Saturated
    }

    /// Probe for an insert position, growing once when every slot is
    /// occupied or tombstoned. Tombstones are invisible to the load factor,
    /// so heavy delete churn can fill the array without ever crossing the
    /// growth threshold; the rehash drops the tombstones and restores empty
    /// slots.
    fn probe_for_insert(&mut self, digest: u32) -> Result<Probe, TableError> {
        match self.find_slot(digest) {
            Probe::Saturated => {
                let target = self
                    .slots
                    .cap()
                    .checked_add(GROWTH_STEP)
                    .ok_or(AllocError::CapacityOverflow)?;
                self.grow(target)?;
                Ok(self.find_slot(digest))
            }
            probe => Ok(probe),
        }
    }

    fn occupy(&mut self, index: u32, digest: u32, value: V) {
        let slot = self.slot_mut(index);
        debug_assert!(slot.digest == 0 && !slot.tombstone);
        slot.digest = digest;
        slot.value = MaybeUninit::new(value);
        self.count += 1;
    }

    fn replace(&mut self, index: u32, value: V) {
        let slot = self.slot_mut(index);
        // SAFETY: matched slots hold an initialized value. The old value is
        // read out before the new one lands so a panicking destructor cannot
        // leave the slot claiming an initialized value it no longer has.
        let old = unsafe { slot.value.assume_init_read() };
        slot.value = MaybeUninit::new(value);
        drop(old);
    }

    fn evict(&mut self, index: u32) -> V {
        let value;
        {
            let slot = self.slot_mut(index);
            // SAFETY: matched slots hold an initialized value; zeroing the
            // digest below retires it so no other path reads it again.
            value = unsafe { slot.value.assume_init_read() };
            slot.digest = 0;
            slot.tombstone = true;
        }
        self.count -= 1;
        value
    }

    fn grow_if_loaded(&mut self) -> Result<(), TableError> {
        let capacity = self.slots.cap();
        if u64::from(self.count) * 100 / u64::from(capacity) >= u64::from(MAX_LOAD_FACTOR) {
            // Additive step, as tuned upstream: resizes get more frequent as
            // the table grows, trading copy volume for memory headroom.
            let target = capacity
                .checked_add(GROWTH_STEP)
                .ok_or(AllocError::CapacityOverflow)?;
            self.grow(target)?;
        }
        Ok(())
    }

    /// Rehash every live entry into a fresh, larger slot array. Tombstones
    /// are dropped on the floor: deletion already zeroed their digest, so the
    /// live scan does not see them, and a full rehash is the only compaction
    /// this table has. The old array goes back through `release`, which the
    /// arena discipline turns into a no-op (the block is simply abandoned
    /// until the epoch reset).
    fn grow(&mut self, new_capacity: u32) -> Result<(), AllocError> {
        let old_capacity = self.slots.cap();
        debug_assert!(new_capacity > old_capacity, "the table never shrinks");
        let new_slots = RawBuf::with_capacity(new_capacity, self.slots.allocator().clone())?;
        // SAFETY: the new buffer spans `new_capacity` slots.
        unsafe { zero_slots(new_slots.ptr(), new_capacity) };

        for i in 0..old_capacity {
            // SAFETY: i < old_capacity.
            let src = unsafe { &*self.slots.ptr().add(i as usize) };
            if src.digest == 0 {
                continue;
            }
            // The new array has no tombstones, so the first empty slot wins.
            let mut index = None;
            for iteration in 0..new_capacity {
                let candidate = probe_index(src.digest, new_capacity, iteration);
                // SAFETY: candidate < new_capacity.
                if unsafe { &*new_slots.ptr().add(candidate as usize) }.digest == 0 {
                    index = Some(candidate);
                    break;
                }
            }
            let index = index.unwrap_or_else(|| {
                // Same fallback as `find_slot`: a fully occupied stride
                // orbit falls back to a linear sweep from the home slot.
                let home = probe_index(src.digest, new_capacity, 0);
                (0..new_capacity)
                    .map(|offset| home.wrapping_add(offset) % new_capacity)
                    .find(|&candidate| {
                        // SAFETY: candidate < new_capacity.
                        unsafe { &*new_slots.ptr().add(candidate as usize) }.digest == 0
                    })
                    .expect("rehash target array cannot be full")
            });
            // SAFETY: index < new_capacity; src holds an initialized value
            // that is moved, not copied — the old array is released without
            // running destructors.
            unsafe {
                let dst = new_slots.ptr().add(index as usize);
                (*dst).digest = src.digest;
                (*dst).tombstone = false;
                (*dst).value = MaybeUninit::new(src.value.assume_init_read());
            }
        }

        self.slots = new_slots;
        Ok(())
    }
}

fn digest_of<K: KeyDigest + ?Sized>(key: &K) -> u32 {
    let digest = key.digest();
    // Caller contract violation, not a recoverable condition: 0 is the
    // empty-slot sentinel and a hash function that produces it is broken.
    assert!(
        digest != 0,
        "KeyDigest produced 0, which is reserved for empty slots"
    );
    digest
}

/// Put every slot in the never-occupied state. A freshly allocated array is
/// uninitialized and must pass through here before any probe touches it.
///
/// # Safety
/// `ptr` must be valid for writes of `capacity` slots.
unsafe fn zero_slots<V>(ptr: *mut Slot<V>, capacity: u32) {
    for i in 0..capacity as usize {
        ptr.add(i).write(Slot {
            digest: 0,
            tombstone: false,
            value: MaybeUninit::uninit(),
        });
    }
}

impl<K: ?Sized, V, A: RawAllocator> Drop for HashTable<K, V, A> {
    fn drop(&mut self) {
        if mem::needs_drop::<V>() {
            for i in 0..self.slots.cap() {
                // SAFETY: i < capacity; live slots (digest != 0) hold an
                // initialized value that is dropped exactly once here.
                unsafe {
                    let slot = &mut *self.slots.ptr().add(i as usize);
                    if slot.digest != 0 {
                        slot.value.assume_init_drop();
                    }
                }
            }
        }
        // RawBuf releases the slot array (a no-op under the arena).
    }
}

/// Iterator over live values. No ordering guarantee.
pub struct Values<'a, K: ?Sized, V, A: RawAllocator> {
    table: &'a HashTable<K, V, A>,
    index: u32,
}

impl<'a, K: ?Sized, V, A: RawAllocator> Iterator for Values<'a, K, V, A> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        while self.index < self.table.slots.cap() {
            // SAFETY: index < capacity.
            let slot = unsafe { &*self.table.slots.ptr().add(self.index as usize) };
            self.index += 1;
            if slot.digest != 0 {
                // SAFETY: live slots hold an initialized value.
                return Some(unsafe { slot.value.assume_init_ref() });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::Arena;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Test key whose digest is the wrapped value itself, so probe behavior
    /// is fully determined by the test.
    struct Raw(u32);

    impl KeyDigest for Raw {
        fn digest(&self) -> u32 {
            self.0
        }
    }

    /// Invariant: the documented probe walk. Capacity 8, digests 5, 13 and
    /// 21 are all congruent to 5 mod 8: the first lands at (1+5) % 8 = 6,
    /// the second steps by 13 % 4 = 1 to (1+13+1) % 8 = 7, the third keeps
    /// stepping past both to (1+21+2) % 8 = 0.
    #[test]
    fn probe_walk_places_colliding_digests_exactly() {
        let mut t: HashTable<Raw, &'static str> = HashTable::with_capacity(8).unwrap();
        t.add(&Raw(5), "first").unwrap();
        t.add(&Raw(13), "second").unwrap();
        t.add(&Raw(21), "third").unwrap();

        assert_eq!(t.slot(6).digest, 5);
        assert_eq!(t.slot(7).digest, 13);
        assert_eq!(t.slot(0).digest, 21);

        assert_eq!(*t.get(&Raw(5)).unwrap(), "first");
        assert_eq!(*t.get(&Raw(13)).unwrap(), "second");
        assert_eq!(*t.get(&Raw(21)).unwrap(), "third");
    }

    /// Invariant: probe_index matches its documented formula.
    #[test]
    fn probe_index_formula() {
        assert_eq!(probe_index(5, 8, 0), 6);
        assert_eq!(probe_index(13, 8, 1), 7);
        assert_eq!(probe_index(21, 8, 1), 7);
        assert_eq!(probe_index(21, 8, 2), 0);
        // Stride 0 (digest ≡ 0 mod capacity/2) degrades to 1, not to a
        // pinned sequence.
        assert_eq!(probe_index(8, 8, 0), 1);
        assert_eq!(probe_index(8, 8, 1), 2);
    }

    /// Invariant: a duplicate insert is rejected, leaves the first value in
    /// place, and does not change the count.
    #[test]
    fn duplicate_add_rejected_without_mutation() {
        let mut t: HashTable<Raw, i32> = HashTable::with_capacity(8).unwrap();
        t.add(&Raw(5), 1).unwrap();
        assert_eq!(t.add(&Raw(5), 2), Err(TableError::DuplicateKey));
        assert_eq!(*t.get(&Raw(5)).unwrap(), 1);
        assert_eq!(t.len(), 1);
    }

    /// Invariant: set requires presence and overwrites in place, keeping the
    /// digest and the slot.
    #[test]
    fn set_overwrites_in_place() {
        let mut t: HashTable<Raw, i32> = HashTable::with_capacity(8).unwrap();
        assert_eq!(t.set(&Raw(5), 9), Err(TableError::KeyNotFound));
        t.add(&Raw(5), 1).unwrap();
        t.set(&Raw(5), 2).unwrap();
        assert_eq!(t.slot(6).digest, 5);
        assert_eq!(*t.get(&Raw(5)).unwrap(), 2);
        assert_eq!(t.len(), 1);
    }

    /// Invariant: add_or_set reports whether the key already existed and
    /// only counts new entries.
    #[test]
    fn add_or_set_reports_prior_existence() {
        let mut t: HashTable<Raw, i32> = HashTable::with_capacity(8).unwrap();
        assert_eq!(t.add_or_set(&Raw(5), 1).unwrap(), false);
        assert_eq!(t.add_or_set(&Raw(5), 2).unwrap(), true);
        assert_eq!(t.len(), 1);
        assert_eq!(*t.get(&Raw(5)).unwrap(), 2);
    }

    /// Invariant: removal leaves a tombstone (flag set, digest zeroed) that
    /// keeps later probe sequences intact but is never matched or reused.
    #[test]
    fn remove_leaves_a_working_tombstone() {
        let mut t: HashTable<Raw, i32> = HashTable::with_capacity(8).unwrap();
        t.add(&Raw(5), 1).unwrap();
        t.add(&Raw(13), 2).unwrap(); // probes through slot 6 to slot 7

        assert_eq!(t.remove(&Raw(5)).unwrap(), 1);
        assert!(t.slot(6).tombstone);
        assert_eq!(t.slot(6).digest, 0);
        assert!(!t.contains(&Raw(5)));
        assert_eq!(t.get(&Raw(5)), Err(TableError::KeyNotFound));

        // 13's probe sequence still crosses the tombstone at slot 6.
        assert_eq!(*t.get(&Raw(13)).unwrap(), 2);

        // A later colliding insert skips the tombstone instead of reusing it.
        t.add(&Raw(21), 3).unwrap();
        assert!(t.slot(6).tombstone);
        assert_eq!(t.slot(0).digest, 21);
    }

    /// Invariant: remove_if_contains treats absence as a normal outcome and
    /// leaves the count untouched.
    #[test]
    fn remove_if_contains_is_idempotent_on_absence() {
        let mut t: HashTable<Raw, i32> = HashTable::with_capacity(8).unwrap();
        t.add(&Raw(5), 1).unwrap();
        assert!(t.remove_if_contains(&Raw(5)));
        assert!(!t.remove_if_contains(&Raw(5)));
        assert_eq!(t.len(), 0);
        assert_eq!(t.remove(&Raw(5)), Err(TableError::KeyNotFound));
    }

    /// Invariant: crossing the 70% load factor grows the capacity by exactly
    /// one additive step before the triggering insert returns, and every
    /// entry survives the rehash.
    #[test]
    fn load_factor_triggers_one_additive_growth() {
        let mut t: HashTable<Raw, u32> = HashTable::with_capacity(8).unwrap();
        for d in 1..=5u32 {
            t.add(&Raw(d), d * 10).unwrap();
        }
        // 5 * 100 / 8 = 62 < 70: still the original array.
        assert_eq!(t.capacity(), 8);

        // 6 * 100 / 8 = 75 >= 70: exactly one +128 step.
        t.add(&Raw(6), 60).unwrap();
        assert_eq!(t.capacity(), 8 + GROWTH_STEP);
        assert_eq!(t.len(), 6);
        for d in 1..=6u32 {
            assert_eq!(*t.get(&Raw(d)).unwrap(), d * 10);
        }
    }

    /// Invariant: tombstones do not survive a rehash — a removed key stays
    /// absent after the growth that drops its tombstone.
    #[test]
    fn rehash_drops_tombstones_for_good() {
        let mut t: HashTable<Raw, u32> = HashTable::with_capacity(8).unwrap();
        t.add(&Raw(5), 1).unwrap();
        t.remove(&Raw(5)).unwrap();
        for d in 10..=15u32 {
            t.add(&Raw(d), d).unwrap();
        }
        assert!(t.capacity() > 8, "inserts were meant to force a growth");
        assert!(!t.contains(&Raw(5)));
        for d in 10..=15u32 {
            assert_eq!(*t.get(&Raw(d)).unwrap(), d);
        }
        // No tombstone crossed over into the new array.
        for i in 0..t.capacity() {
            assert!(!t.slot(i).tombstone);
        }
    }

    /// Invariant: a digest of 0 is a caller contract violation and aborts.
    #[test]
    #[should_panic(expected = "reserved for empty slots")]
    fn zero_digest_is_fatal() {
        struct Broken;
        impl KeyDigest for Broken {
            fn digest(&self) -> u32 {
                0
            }
        }
        let mut t: HashTable<Broken, i32> = HashTable::with_capacity(8).unwrap();
        let _ = t.add(&Broken, 1);
    }

    /// Invariant: capacities below 2 are malformed construction arguments.
    #[test]
    fn tiny_capacities_are_rejected() {
        for capacity in [0, 1] {
            assert_eq!(
                HashTable::<Raw, i32>::with_capacity(capacity).err(),
                Some(TableError::InvalidCapacity(capacity))
            );
        }
        assert!(HashTable::<Raw, i32>::with_capacity(2).is_ok());
    }

    /// Invariant: a digest whose stride orbit is saturated still terminates
    /// and stays retrievable (the linear-sweep fallback).
    #[test]
    fn saturated_stride_orbit_still_terminates() {
        let mut t: HashTable<Raw, u32> = HashTable::with_capacity(8).unwrap();
        // Digest 2 steps by 2 % 4 = 2, so its probe orbit is slots
        // 3, 5, 7, 1. Fill exactly those four slots with other digests
        // (10 -> 3, 14 -> 7, 12 -> 5, 16 -> 1), then insert 2: the orbit is
        // saturated and the linear sweep from the home slot takes over.
        for d in [10u32, 14, 12, 16] {
            t.add(&Raw(d), d).unwrap();
        }
        assert_eq!(t.slot(3).digest, 10);
        assert_eq!(t.slot(7).digest, 14);
        assert_eq!(t.slot(5).digest, 12);
        assert_eq!(t.slot(1).digest, 16);

        t.add(&Raw(2), 2).unwrap();
        assert_eq!(t.slot(4).digest, 2, "sweep from home slot 3 lands at 4");
        for d in [10u32, 14, 12, 16, 2] {
            assert_eq!(*t.get(&Raw(d)).unwrap(), d);
        }
    }

    /// Invariant: delete churn that tombstones every slot (the load factor
    /// never fires because it only counts live entries) still terminates:
    /// lookups report absence and the next insert grows once to shed the
    /// tombstones.
    #[test]
    fn full_tombstone_churn_forces_one_growth() {
        let mut t: HashTable<Raw, u32> = HashTable::with_capacity(8).unwrap();
        // Digests 1..=8 have pairwise distinct home slots at capacity 8, so
        // each add/remove cycle retires exactly one fresh slot.
        for d in 1..=8u32 {
            t.add(&Raw(d), d).unwrap();
            assert_eq!(t.remove(&Raw(d)).unwrap(), d);
        }
        assert_eq!(t.len(), 0);
        assert_eq!(t.capacity(), 8);
        for i in 0..8 {
            assert!(t.slot(i).tombstone, "slot {i} should be tombstoned");
        }

        // Lookups on the saturated array terminate with a clean miss.
        assert!(!t.contains(&Raw(1)));
        assert_eq!(t.get(&Raw(9)), Err(TableError::KeyNotFound));

        // The insert has nowhere to land, so it rehashes once and succeeds.
        t.add(&Raw(9), 90).unwrap();
        assert_eq!(t.capacity(), 8 + GROWTH_STEP);
        assert_eq!(t.len(), 1);
        assert_eq!(*t.get(&Raw(9)).unwrap(), 90);
        for d in 1..=8u32 {
            assert!(!t.contains(&Raw(d)));
        }
    }

    /// Invariant: values() visits every live value exactly once and skips
    /// tombstones.
    #[test]
    fn values_iterates_live_entries() {
        let mut t: HashTable<Raw, u32> = HashTable::with_capacity(32).unwrap();
        for d in 1..=10u32 {
            t.add(&Raw(d), d).unwrap();
        }
        t.remove(&Raw(3)).unwrap();
        t.remove(&Raw(7)).unwrap();

        let mut seen: Vec<u32> = t.values().copied().collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![1, 2, 4, 5, 6, 8, 9, 10]);
    }

    /// Invariant: dropping the table drops each live value exactly once;
    /// removed and overwritten values were already dropped exactly once.
    #[test]
    fn drop_accounting() {
        struct Counted(Rc<Cell<u32>>);
        impl Drop for Counted {
            fn drop(&mut self) {
                self.0.set(self.0.get() + 1);
            }
        }

        let drops = Rc::new(Cell::new(0));
        {
            let mut t: HashTable<Raw, Counted> = HashTable::with_capacity(16).unwrap();
            t.add(&Raw(1), Counted(drops.clone())).unwrap();
            t.add(&Raw(2), Counted(drops.clone())).unwrap();
            t.add(&Raw(3), Counted(drops.clone())).unwrap();
            t.set(&Raw(2), Counted(drops.clone())).unwrap(); // drops the old 2
            assert_eq!(drops.get(), 1);
            t.remove(&Raw(1)).unwrap(); // drops 1
            assert_eq!(drops.get(), 2);
        }
        // Table drop releases the remaining two live values.
        assert_eq!(drops.get(), 4);
    }

    /// Invariant: the same operations behave identically under the arena
    /// discipline, including across a growth that abandons the old array.
    #[test]
    fn arena_backed_table_matches_heap_semantics() {
        let arena = Arena::new();
        let mut t: HashTable<Raw, u32, &Arena> =
            HashTable::with_capacity_in(8, &arena).unwrap();
        for d in 1..=6u32 {
            t.add(&Raw(d), d).unwrap();
        }
        assert_eq!(t.capacity(), 8 + GROWTH_STEP);
        for d in 1..=6u32 {
            assert_eq!(*t.get(&Raw(d)).unwrap(), d);
        }
        drop(t);
        assert!(arena.allocated_bytes() > 0);
    }
}
