use std::{
  alloc::{Layout, alloc, dealloc},
  ptr::NonNull,
};

use libc::{c_void, intptr_t, sbrk};

use crate::block::HEADER_ALIGN;

/// Source of fresh memory at the upper end of the managed region.
pub trait HeapExtender {
  /// Grows the region by `bytes` and returns the base of the new part, or
  /// `None` when the request is refused. A refusal leaves the region as is.
  ///
  /// # Safety
  ///
  /// The returned memory belongs to the caller forever; implementations may
  /// hand it out without any bookkeeping.
  unsafe fn extend(
    &mut self,
    bytes: usize,
  ) -> Option<NonNull<u8>>;
}

/// Grows the data segment through `sbrk(2)`.
///
/// The first growth is padded so the returned base is header-aligned. Other
/// code moving the break in between two calls leaves a gap, which is why the
/// heap never assumes two blocks touch without checking.
pub struct Sbrk;

impl Sbrk {
  /// Current program break, `sbrk(0)`.
  pub fn program_break() -> *mut c_void {
    unsafe { sbrk(0) }
  }
}

impl HeapExtender for Sbrk {
  unsafe fn extend(
    &mut self,
    bytes: usize,
  ) -> Option<NonNull<u8>> {
    unsafe {
      let current = sbrk(0) as *mut u8;
      if current as usize == usize::MAX {
        return None;
      }

      let padding = current.align_offset(HEADER_ALIGN);
      let total = bytes.checked_add(padding)?;
      let total = intptr_t::try_from(total).ok()?;

      let address = sbrk(total);
      if address == usize::MAX as *mut c_void {
        return None;
      }

      // Someone moved the break between the two calls; hand the bytes back.
      let base = (address as *mut u8).add(padding);
      if base.align_offset(HEADER_ALIGN) != 0 {
        sbrk(-total);
        return None;
      }

      NonNull::new(base)
    }
  }
}

/// A fixed reservation handed out front to back, refusing anything past its
/// capacity. Growth is always contiguous.
pub struct FixedRegion {
  base: NonNull<u8>,
  offset: usize,
  capacity: usize,
  layout: Layout,
  fail_next: bool,
}

// The reservation is owned exclusively, like the blocks a `Heap` hands out.
unsafe impl Send for FixedRegion {}

impl Drop for FixedRegion {
  fn drop(
    &mut self,
  ) {
    unsafe { dealloc(self.base.as_ptr(), self.layout) };
  }
}

impl FixedRegion {
  pub fn with_capacity(
    capacity: usize,
  ) -> Option<Self> {
    let layout = Layout::from_size_align(capacity.max(1), HEADER_ALIGN).ok()?;
    let base = NonNull::new(unsafe { alloc(layout) })?;

    Some(Self {
      base,
      offset: 0,
      capacity,
      layout,
      fail_next: false,
    })
  }

  /// Refuses the next extension regardless of remaining capacity.
  pub fn fail_next(
    &mut self,
  ) {
    self.fail_next = true;
  }

  /// Bytes handed out so far.
  pub fn used(
    &self,
  ) -> usize {
    self.offset
  }

  pub fn capacity(
    &self,
  ) -> usize {
    self.capacity
  }

  pub fn base(
    &self,
  ) -> NonNull<u8> {
    self.base
  }
}

impl HeapExtender for FixedRegion {
  unsafe fn extend(
    &mut self,
    bytes: usize,
  ) -> Option<NonNull<u8>> {
    if std::mem::take(&mut self.fail_next) {
      return None;
    }

    let end = self.offset.checked_add(bytes)?;
    (end <= self.capacity).then(|| {
      let result = unsafe { self.base.add(self.offset) };
      self.offset = end;

      result
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_fixed_region_is_contiguous() {
    let mut region = FixedRegion::with_capacity(256).unwrap();

    unsafe {
      let first = region.extend(64).unwrap();
      let second = region.extend(128).unwrap();

      assert_eq!(region.base(), first);
      assert_eq!(first.as_ptr().add(64), second.as_ptr());
      assert_eq!(192, region.used());
    }
  }

  #[test]
  fn test_fixed_region_refuses_past_capacity() {
    let mut region = FixedRegion::with_capacity(100).unwrap();

    unsafe {
      assert!(region.extend(101).is_none());
      assert_eq!(0, region.used());
      assert!(region.extend(100).is_some());
      assert!(region.extend(1).is_none());
      assert!(region.extend(usize::MAX).is_none());
    }
  }

  #[test]
  fn test_fixed_region_is_send() {
    fn assert_send<T: Send>() {}

    assert_send::<FixedRegion>();
    assert_send::<crate::heap::Heap<FixedRegion>>();
  }

  #[test]
  fn test_fixed_region_fail_next_is_one_shot() {
    let mut region = FixedRegion::with_capacity(100).unwrap();
    region.fail_next();

    unsafe {
      assert!(region.extend(8).is_none());
      assert_eq!(0, region.used());
      assert!(region.extend(8).is_some());
    }
  }
}
