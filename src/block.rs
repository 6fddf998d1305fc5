use std::{mem, ptr};

/// Size in bytes of the metadata placed in front of every payload.
pub const HEADER_SIZE: usize = mem::size_of::<BlockHeader>();

/// Alignment of a header, and therefore of every payload handed out.
pub const HEADER_ALIGN: usize = mem::align_of::<BlockHeader>();

/// Links in ascending address order. Owned by `AddressList`.
#[repr(C)]
pub struct AddrLinks {
  pub prev: *mut BlockHeader,
  pub next: *mut BlockHeader,
}

/// Links inside one size-class bucket. Owned by `FreeIndex`; both are null
/// whenever the block is not indexed.
#[repr(C)]
pub struct FreeLinks {
  pub prev: *mut BlockHeader,
  pub next: *mut BlockHeader,
}

impl AddrLinks {
  pub const fn empty() -> Self {
    Self {
      prev: ptr::null_mut(),
      next: ptr::null_mut(),
    }
  }
}

impl FreeLinks {
  pub const fn empty() -> Self {
    Self {
      prev: ptr::null_mut(),
      next: ptr::null_mut(),
    }
  }

  pub fn is_empty(
    &self,
  ) -> bool {
    self.prev.is_null() && self.next.is_null()
  }
}

#[repr(C)]
pub struct BlockHeader {
  pub size: usize,
  pub is_free: bool,
  pub addr: AddrLinks,
  pub free: FreeLinks,
}

impl BlockHeader {
  /// Writes a fresh, unlinked header at `at` and returns it typed.
  ///
  /// # Safety
  ///
  /// `at` must be aligned to [`HEADER_ALIGN`] and valid for writes of
  /// `HEADER_SIZE + size` bytes.
  pub unsafe fn init(
    at: *mut u8,
    size: usize,
    is_free: bool,
  ) -> *mut BlockHeader {
    let block = at as *mut BlockHeader;
    unsafe {
      block.write(BlockHeader {
        size,
        is_free,
        addr: AddrLinks::empty(),
        free: FreeLinks::empty(),
      });
    }
    block
  }

  /// Recovers the header from a payload pointer by fixed offset.
  ///
  /// # Safety
  ///
  /// `payload` must have been returned by [`BlockHeader::payload`].
  pub unsafe fn from_payload(
    payload: *mut u8,
  ) -> *mut BlockHeader {
    unsafe { payload.sub(HEADER_SIZE) as *mut BlockHeader }
  }

  /// First byte available to the caller.
  ///
  /// # Safety
  ///
  /// `block` must point to a live header.
  pub unsafe fn payload(
    block: *mut BlockHeader,
  ) -> *mut u8 {
    unsafe { (block as *mut u8).add(HEADER_SIZE) }
  }

  /// The byte right after the payload, where a physically adjacent block
  /// would start.
  ///
  /// # Safety
  ///
  /// `block` must point to a live header.
  pub unsafe fn end(
    block: *mut BlockHeader,
  ) -> *mut u8 {
    unsafe { Self::payload(block).add((*block).size) }
  }

  /// Whether `next` starts exactly where `block` ends.
  ///
  /// # Safety
  ///
  /// `block` must point to a live header.
  pub unsafe fn touches(
    block: *mut BlockHeader,
    next: *mut BlockHeader,
  ) -> bool {
    !next.is_null() && unsafe { Self::end(block) } == next as *mut u8
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[repr(C, align(16))]
  struct Buffer([u8; 512]);

  #[test]
  fn test_header_is_word_multiple() {
    assert_eq!(0, HEADER_SIZE % mem::size_of::<usize>());
    assert_eq!(0, HEADER_SIZE % HEADER_ALIGN);
  }

  #[test]
  fn test_payload_round_trip() {
    let mut buffer = Buffer([0; 512]);

    unsafe {
      let block = BlockHeader::init(buffer.0.as_mut_ptr(), 64, false);
      let payload = BlockHeader::payload(block);

      assert_eq!(buffer.0.as_mut_ptr().add(HEADER_SIZE), payload);
      assert_eq!(block, BlockHeader::from_payload(payload));
      assert_eq!(payload.add(64), BlockHeader::end(block));
      assert!((*block).free.is_empty());
      assert!(!(*block).is_free);
    }
  }

  #[test]
  fn test_touches() {
    let mut buffer = Buffer([0; 512]);

    unsafe {
      let base = buffer.0.as_mut_ptr();
      let first = BlockHeader::init(base, 64, true);
      let second = BlockHeader::init(base.add(HEADER_SIZE + 64), 32, true);
      let distant = BlockHeader::init(base.add(2 * HEADER_SIZE + 128), 8, true);

      assert!(BlockHeader::touches(first, second));
      assert!(!BlockHeader::touches(second, distant));
      assert!(!BlockHeader::touches(first, ptr::null_mut()));
    }
  }
}
