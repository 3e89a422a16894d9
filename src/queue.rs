//! Growable ring-buffer FIFO queue.

use crate::alloc::{AllocError, RawAllocator};
use crate::raw_buf::RawBuf;
use crate::Heap;

const INITIAL_CAPACITY: u32 = 256;
const GROWTH_STEP: u32 = 128;

/// FIFO queue over a ring buffer. `head` is the next element out, `tail` the
/// next free position; both wrap modulo the capacity.
pub struct Queue<T, A: RawAllocator = Heap> {
    buf: RawBuf<T, A>,
    count: u32,
    head: u32,
    tail: u32,
}

impl<T> Queue<T, Heap> {
    pub fn new() -> Result<Self, AllocError> {
        Self::new_in(Heap)
    }

    pub fn with_capacity(capacity: u32) -> Result<Self, AllocError> {
        Self::with_capacity_in(capacity, Heap)
    }
}

impl<T, A: RawAllocator> Queue<T, A> {
    pub fn new_in(alloc: A) -> Result<Self, AllocError> {
        Self::with_capacity_in(INITIAL_CAPACITY, alloc)
    }

    pub fn with_capacity_in(capacity: u32, alloc: A) -> Result<Self, AllocError> {
        Ok(Self {
            buf: RawBuf::with_capacity(capacity, alloc)?,
            count: 0,
            head: 0,
            tail: 0,
        })
    }

    pub fn len(&self) -> u32 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn capacity(&self) -> u32 {
        self.buf.cap()
    }

    pub fn enqueue(&mut self, element: T) -> Result<(), AllocError> {
        if self.count >= self.buf.cap() {
            self.grow()?;
        }
        let index = self.tail;
        self.tail = (self.tail + 1) % self.buf.cap();
        self.count += 1;
        // SAFETY: index was a free position (count < capacity after growth).
        unsafe { self.buf.ptr().add(index as usize).write(element) };
        Ok(())
    }

    pub fn dequeue(&mut self) -> Option<T> {
        if self.count == 0 {
            return None;
        }
        // SAFETY: head points at the oldest live element.
        let element = unsafe { self.buf.ptr().add(self.head as usize).read() };
        self.count -= 1;
        self.head = (self.head + 1) % self.buf.cap();
        if self.count == 0 {
            self.head = 0;
            self.tail = 0;
        }
        Some(element)
    }

    /// Borrow the oldest element without removing it.
    pub fn peek(&self) -> Option<&T> {
        if self.count == 0 {
            return None;
        }
        // SAFETY: as in dequeue.
        Some(unsafe { &*self.buf.ptr().add(self.head as usize) })
    }

    /// Drop every element and reset the ring.
    pub fn clear(&mut self) {
        while self.dequeue().is_some() {}
    }

    /// Called with the ring full (`count == capacity`, so `head == tail`).
    /// After the block grows, the wrapped head segment is relocated to the
    /// new end so the live span is contiguous again.
    fn grow(&mut self) -> Result<(), AllocError> {
        let old_capacity = self.buf.cap();
        let target = self
            .count
            .checked_add(1 + GROWTH_STEP)
            .ok_or(AllocError::CapacityOverflow)?;
        self.buf.grow(target)?;
        if self.count > 0 && self.head >= self.tail {
            if self.head == 0 {
                // Live span already sits contiguously at the front; the next
                // free position is right behind it.
                self.tail = old_capacity;
            } else {
                let head_len = old_capacity - self.head;
                let new_head = target - head_len;
                // SAFETY: source and destination ranges lie inside the grown
                // block; copy handles the overlap.
                unsafe {
                    core::ptr::copy(
                        self.buf.ptr().add(self.head as usize),
                        self.buf.ptr().add(new_head as usize),
                        head_len as usize,
                    );
                }
                self.head = new_head;
            }
        }
        Ok(())
    }
}

impl<T, A: RawAllocator> Drop for Queue<T, A> {
    fn drop(&mut self) {
        self.clear();
        // RawBuf releases the block (a no-op under the arena).
    }
}
