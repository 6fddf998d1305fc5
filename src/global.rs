//! The process-wide heap.
//!
//! All internal lists are mutated without synchronization, so every entry
//! point here takes one lock for the whole operation. The free functions
//! flatten failures into null pointers, the way C callers expect.

use std::{
  alloc::{GlobalAlloc, Layout},
  ptr::{self, NonNull},
};

use crate::{
  block::HEADER_ALIGN,
  extender::{HeapExtender, Sbrk},
  heap::Heap,
  stats::HeapStats,
};

static HEAP: Locked<Heap<Sbrk>> = Locked::new(Heap::new(Sbrk));

// Wraps spin::Mutex to allow for trait implementations
pub struct Locked<A> {
  inner: spin::Mutex<A>,
}

impl<A> Locked<A> {
  pub const fn new(
    inner: A,
  ) -> Self {
    Locked {
      inner: spin::Mutex::new(inner),
    }
  }

  pub fn lock(
    &self,
  ) -> spin::MutexGuard<'_, A> {
    self.inner.lock()
  }
}

/// Allocation that only the process-wide heap serves, behind one lock.
///
/// ```rust,ignore
/// #[global_allocator]
/// static ALLOCATOR: Locked<Heap<Sbrk>> = Locked::new(Heap::new(Sbrk));
/// ```
///
/// Layouts asking for more than header alignment are refused with null.
unsafe impl<E: HeapExtender + Send> GlobalAlloc for Locked<Heap<E>> {
  unsafe fn alloc(
    &self,
    layout: Layout,
  ) -> *mut u8 {
    if layout.align() > HEADER_ALIGN {
      return ptr::null_mut();
    }
    self.lock().allocate(layout.size()).map_or(ptr::null_mut(), NonNull::as_ptr)
  }

  unsafe fn dealloc(
    &self,
    address: *mut u8,
    _layout: Layout,
  ) {
    unsafe { self.lock().free(address) }
  }

  unsafe fn alloc_zeroed(
    &self,
    layout: Layout,
  ) -> *mut u8 {
    if layout.align() > HEADER_ALIGN {
      return ptr::null_mut();
    }
    self.lock().zero_allocate(1, layout.size()).map_or(ptr::null_mut(), NonNull::as_ptr)
  }

  unsafe fn realloc(
    &self,
    address: *mut u8,
    layout: Layout,
    new_size: usize,
  ) -> *mut u8 {
    if layout.align() > HEADER_ALIGN {
      return ptr::null_mut();
    }
    unsafe { self.lock().resize(address, new_size) }.map_or(ptr::null_mut(), NonNull::as_ptr)
  }
}

pub fn allocate(
  size: usize,
) -> *mut u8 {
  HEAP.lock().allocate(size).map_or(ptr::null_mut(), NonNull::as_ptr)
}

pub fn zero_allocate(
  count: usize,
  size: usize,
) -> *mut u8 {
  HEAP.lock().zero_allocate(count, size).map_or(ptr::null_mut(), NonNull::as_ptr)
}

/// # Safety
///
/// `address` must be null or come from this module's allocation functions.
pub unsafe fn free(
  address: *mut u8,
) {
  unsafe { HEAP.lock().free(address) }
}

/// Null on failure, in which case `address` is still valid.
///
/// # Safety
///
/// `address` must be null or come from this module's allocation functions.
pub unsafe fn resize(
  address: *mut u8,
  new_size: usize,
) -> *mut u8 {
  unsafe { HEAP.lock().resize(address, new_size) }.map_or(ptr::null_mut(), NonNull::as_ptr)
}

pub fn num_free_blocks() -> usize {
  HEAP.lock().free_blocks()
}

pub fn num_free_bytes() -> usize {
  HEAP.lock().free_bytes()
}

pub fn num_allocated_blocks() -> usize {
  HEAP.lock().total_blocks()
}

pub fn num_allocated_bytes() -> usize {
  HEAP.lock().total_bytes()
}

pub fn num_meta_data_bytes() -> usize {
  HEAP.lock().metadata_bytes()
}

pub fn size_meta_data() -> usize {
  HEAP.lock().header_size()
}

pub fn stats() -> HeapStats {
  HEAP.lock().stats()
}
