//! arena-table: allocator-parameterized containers around an open-addressing
//! hash table with double hashing and tombstone deletes.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: make one family of containers work unchanged under two allocator
//!   disciplines with opposite release semantics, and keep each piece small
//!   enough to reason about independently.
//! - Layers:
//!   - alloc::RawAllocator: the injected memory capability. `Heap` releases
//!     immediately and may reallocate in place; `Arena` (bumpalo-backed)
//!     always hands out fresh blocks, never releases individually, and
//!     reclaims only at its epoch reset.
//!   - raw_buf::RawBuf<T, A>: owned, capacity-tracked block of uninitialized
//!     elements. Manages memory, never element lifetimes.
//!   - digest::KeyDigest: 32-bit key digests with 0 reserved as the
//!     empty-slot sentinel.
//!   - hash_table::HashTable<K, V, A>: the core. Double-hashed probing,
//!     tombstone deletes, additive growth at the 70% load factor. Keys are
//!     not stored; digest uniqueness stands in for key uniqueness.
//!   - array/list/queue/stack: straightforward contiguous and ring buffers
//!     over RawBuf, sharing the +128 growth discipline.
//!
//! Constraints
//! - Single-threaded; containers exclusively own their buffers.
//! - The allocator is a shared capability, not owned: arena-backed
//!   containers hold `&Arena`, so `Arena::reset(&mut self)` cannot run while
//!   any of them is alive.
//! - Lookups borrow; the borrow checker keeps references from outliving the
//!   table.
//! - Domain errors (duplicate key, missing key) are typed results and leave
//!   state untouched; allocation failures are a separate error kind; a zero
//!   digest is a caller contract violation and aborts.
//!
//! Why this split?
//! - Localize invariants: slot-state transitions live entirely in
//!   hash_table; block ownership lives entirely in raw_buf; the release
//!   discipline lives entirely in the two RawAllocator impls, so container
//!   code has no allocator branches at all.
//! - Minimize unsafe: every `MaybeUninit` access is tied to the one
//!   occupancy rule "value initialized iff digest != 0"; the collaborating
//!   containers only ever touch their initialized prefix.

pub mod alloc;
pub mod array;
pub mod digest;
pub mod hash_table;
mod hash_table_proptest;
pub mod list;
pub mod queue;
mod raw_buf;
pub mod stack;

// Public surface
pub use alloc::{AllocError, Arena, Heap, RawAllocator};
pub use array::{Array, ResizeError};
pub use digest::KeyDigest;
pub use hash_table::{probe_index, HashTable, TableError};
pub use list::List;
pub use queue::Queue;
pub use stack::Stack;
