//! Raw element storage obtained through the allocator capability.

use crate::alloc::{AllocError, RawAllocator};
use core::alloc::Layout;
use core::marker::PhantomData;
use core::mem;
use core::ptr::NonNull;

/// Owned, capacity-tracked buffer of uninitialized `T`.
///
/// `RawBuf` manages the block, not the elements: dropping it releases the
/// memory through the allocator without running any `T` destructors. Element
/// lifetimes are the owning container's job.
pub(crate) struct RawBuf<T, A: RawAllocator> {
    ptr: NonNull<T>,
    cap: u32,
    alloc: A,
    _marker: PhantomData<T>,
}

impl<T, A: RawAllocator> RawBuf<T, A> {
    /// Allocate room for `cap` elements. Zero capacity and zero-sized `T`
    /// skip the allocator and use a dangling pointer.
    pub(crate) fn with_capacity(cap: u32, alloc: A) -> Result<Self, AllocError> {
        let ptr = if Self::unallocated(cap) {
            NonNull::dangling()
        } else {
            alloc.allocate(Self::layout(cap)?)?.cast::<T>()
        };
        Ok(Self {
            ptr,
            cap,
            alloc,
            _marker: PhantomData,
        })
    }

    fn unallocated(cap: u32) -> bool {
        cap == 0 || mem::size_of::<T>() == 0
    }

    fn layout(cap: u32) -> Result<Layout, AllocError> {
        Layout::array::<T>(cap as usize).map_err(|_| AllocError::CapacityOverflow)
    }

    pub(crate) fn ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    pub(crate) fn cap(&self) -> u32 {
        self.cap
    }

    pub(crate) fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Grow to `new_cap` elements through `reallocate`, preserving the
    /// current contents bytewise.
    pub(crate) fn grow(&mut self, new_cap: u32) -> Result<(), AllocError> {
        debug_assert!(new_cap > self.cap, "RawBuf only grows");
        if mem::size_of::<T>() == 0 {
            self.cap = new_cap;
            return Ok(());
        }
        let new_layout = Self::layout(new_cap)?;
        self.ptr = if self.cap == 0 {
            self.alloc.allocate(new_layout)?.cast::<T>()
        } else {
            let old_layout = Self::layout(self.cap)?;
            // SAFETY: ptr came from this allocator with old_layout.
            unsafe {
                self.alloc
                    .reallocate(self.ptr.cast(), old_layout, new_layout.size())?
                    .cast::<T>()
            }
        };
        self.cap = new_cap;
        Ok(())
    }
}

impl<T, A: RawAllocator> Drop for RawBuf<T, A> {
    fn drop(&mut self) {
        if Self::unallocated(self.cap) {
            return;
        }
        // The layout was computable at allocation time, so it is here too.
        if let Ok(layout) = Self::layout(self.cap) {
            // SAFETY: ptr was allocated by `self.alloc` with this layout.
            unsafe { self.alloc.release(self.ptr.cast(), layout) };
        }
    }
}
