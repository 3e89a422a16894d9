//! Allocator capability: one contract, two release disciplines.
//!
//! Containers in this crate never talk to the global allocator directly; they
//! go through a [`RawAllocator`] handle injected at construction. Two handles
//! are provided: [`Heap`], which releases blocks immediately, and [`Arena`],
//! a bump allocator whose `release` is a no-op and whose memory comes back
//! only through an epoch reset of the arena itself.

use core::alloc::Layout;
use core::ptr::NonNull;

/// Allocation failure.
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum AllocError {
    /// The allocator could not satisfy a request for this many bytes.
    #[error("allocator exhausted while requesting {0} bytes")]
    OutOfMemory(usize),
    /// The requested element count does not fit in an allocation layout.
    #[error("requested capacity overflows the allocatable range")]
    CapacityOverflow,
}

/// Memory capability shared by every container in this crate.
///
/// `allocate` and `reallocate` hand out uninitialized memory. Zero-sized
/// requests are a caller contract violation; containers route zero-capacity
/// and zero-sized-element cases around the allocator entirely.
pub trait RawAllocator {
    /// Allocate `layout.size()` bytes at `layout.align()` alignment.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Grow a block, preserving the first `min(old.size(), new_size)` bytes.
    ///
    /// # Safety
    /// `ptr` must have been returned by this allocator with layout `old`,
    /// `new_size` must be non-zero, and `ptr` must not be used again if the
    /// call returns a different block.
    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new_size: usize,
    ) -> Result<NonNull<u8>, AllocError>;

    /// Return a block to the allocator. Under the arena discipline this is a
    /// no-op and the block stays resident until the epoch reset.
    ///
    /// # Safety
    /// `ptr` must have been returned by this allocator with layout `layout`
    /// and must not be used afterwards.
    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout);
}

impl<A: RawAllocator + ?Sized> RawAllocator for &A {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        (**self).allocate(layout)
    }

    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new_size: usize,
    ) -> Result<NonNull<u8>, AllocError> {
        (**self).reallocate(ptr, old, new_size)
    }

    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        (**self).release(ptr, layout)
    }
}

/// General-purpose discipline over `std::alloc`: `release` frees immediately
/// and `reallocate` may extend the block in place.
#[derive(Copy, Clone, Debug, Default)]
pub struct Heap;

impl RawAllocator for Heap {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        debug_assert!(layout.size() > 0, "zero-sized request routed to Heap");
        // SAFETY: layout is non-zero-sized per the trait contract.
        let raw = unsafe { std::alloc::alloc(layout) };
        NonNull::new(raw).ok_or(AllocError::OutOfMemory(layout.size()))
    }

    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new_size: usize,
    ) -> Result<NonNull<u8>, AllocError> {
        let raw = std::alloc::realloc(ptr.as_ptr(), old, new_size);
        NonNull::new(raw).ok_or(AllocError::OutOfMemory(new_size))
    }

    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        std::alloc::dealloc(ptr.as_ptr(), layout);
    }
}

/// Bump discipline backed by [`bumpalo::Bump`]: fresh blocks only, no
/// individual release.
///
/// `release` is intentionally a no-op. Memory handed out over an epoch is
/// reclaimed in bulk by [`Arena::reset`], never piecemeal; a container that
/// drops or resizes simply abandons its old block inside the arena. Because
/// containers hold the arena by `&Arena` and `reset` takes `&mut self`, the
/// borrow checker proves no arena-backed container survives the reset.
pub struct Arena {
    bump: bumpalo::Bump,
}

impl Arena {
    pub fn new() -> Self {
        Self {
            bump: bumpalo::Bump::new(),
        }
    }

    /// Pre-size the first chunk.
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            bump: bumpalo::Bump::with_capacity(bytes),
        }
    }

    /// Epoch reset: reclaim every block handed out since construction or the
    /// previous reset.
    pub fn reset(&mut self) {
        self.bump.reset();
    }

    /// Bytes currently committed to the arena's chunks.
    pub fn allocated_bytes(&self) -> usize {
        self.bump.allocated_bytes()
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl RawAllocator for Arena {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        debug_assert!(layout.size() > 0, "zero-sized request routed to Arena");
        self.bump
            .try_alloc_layout(layout)
            .map_err(|_| AllocError::OutOfMemory(layout.size()))
    }

    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new_size: usize,
    ) -> Result<NonNull<u8>, AllocError> {
        // A bump pointer cannot extend in place: take a fresh block and copy
        // the prefix. The old block stays resident until the epoch reset.
        let new_layout = Layout::from_size_align(new_size, old.align())
            .map_err(|_| AllocError::CapacityOverflow)?;
        let new_ptr = self.allocate(new_layout)?;
        core::ptr::copy_nonoverlapping(
            ptr.as_ptr(),
            new_ptr.as_ptr(),
            old.size().min(new_size),
        );
        Ok(new_ptr)
    }

    unsafe fn release(&self, _ptr: NonNull<u8>, _layout: Layout) {}
}
