use std::ptr::{self, NonNull};

use log::{debug, trace, warn};

use crate::{
  address_list::AddressList,
  align::checked_align,
  block::{BlockHeader, HEADER_SIZE},
  config::HeapConfig,
  error::AllocError,
  extender::HeapExtender,
  free_index::FreeIndex,
};

/// Segregated-fit heap over memory obtained from `E`.
///
/// Every block sits in the address list; free blocks additionally sit in
/// the size-class index. Freed blocks are merged with free physical
/// neighbours before they are indexed, so two touching blocks are never
/// both free.
pub struct Heap<E: HeapExtender> {
  pub(crate) extender: E,
  pub(crate) blocks: AddressList,
  pub(crate) free: FreeIndex,
  pub(crate) config: HeapConfig,
}

// The raw pointers only ever point into memory owned by the extender.
unsafe impl<E: HeapExtender + Send> Send for Heap<E> {}

impl<E: HeapExtender> Heap<E> {
  pub const fn new(
    extender: E,
  ) -> Self {
    Self::with_config(extender, HeapConfig::DEFAULT)
  }

  pub const fn with_config(
    extender: E,
    config: HeapConfig,
  ) -> Self {
    Self {
      extender,
      blocks: AddressList::new(),
      free: FreeIndex::new(),
      config,
    }
  }

  pub fn config(
    &self,
  ) -> HeapConfig {
    self.config
  }

  pub fn extender(
    &self,
  ) -> &E {
    &self.extender
  }

  pub fn extender_mut(
    &mut self,
  ) -> &mut E {
    &mut self.extender
  }

  /// Rejects invalid sizes and returns the word-rounded payload size.
  fn validate(
    &self,
    size: usize,
  ) -> Result<usize, AllocError> {
    if size == 0 {
      return Err(AllocError::ZeroSize);
    }
    if size > self.config.max_size {
      return Err(AllocError::TooLarge {
        requested: size,
        max: self.config.max_size,
      });
    }
    checked_align(size).ok_or(AllocError::Overflow)
  }

  pub fn allocate(
    &mut self,
    size: usize,
  ) -> Result<NonNull<u8>, AllocError> {
    let rounded = self.validate(size)?;

    let block = match self.free.find_fit(rounded) {
      Some(block) => unsafe {
        self.free.remove(block);
        (*block).is_free = false;
        self.split(block, rounded);
        block
      },
      None => unsafe { self.grow(rounded)? },
    };

    let payload = unsafe { BlockHeader::payload(block) };
    trace!("[segfit] allocate({}) -> {:p}", size, payload);

    Ok(unsafe { NonNull::new_unchecked(payload) })
  }

  /// Allocates `count * size` bytes and zeroes them.
  pub fn zero_allocate(
    &mut self,
    count: usize,
    size: usize,
  ) -> Result<NonNull<u8>, AllocError> {
    let total = count.checked_mul(size).ok_or(AllocError::Overflow)?;
    let payload = self.allocate(total)?;

    unsafe { payload.as_ptr().write_bytes(0, total) };

    Ok(payload)
  }

  /// Returns a block to the heap. Null is ignored, and so is a pointer whose
  /// block is already free.
  ///
  /// # Safety
  ///
  /// `address` must be null or a payload pointer handed out by this heap.
  pub unsafe fn free(
    &mut self,
    address: *mut u8,
  ) {
    if address.is_null() {
      return;
    }

    unsafe {
      let block = BlockHeader::from_payload(address);
      if (*block).is_free {
        warn!("[segfit] free({:p}) ignored, block is already free", address);
        return;
      }

      (*block).is_free = true;
      let merged = self.coalesce(block);
      self.free.insert(merged);

      trace!("[segfit] free({:p}) -> {} bytes indexed at {:p}", address, (*merged).size, merged);
    }
  }

  /// Resizes the block behind `address`, moving it only when it can neither
  /// be kept nor grown into a free successor. On failure the old block is
  /// left untouched and still owned by the caller.
  ///
  /// # Safety
  ///
  /// `address` must be null or a live payload pointer handed out by this
  /// heap. After a successful move the old pointer is dangling.
  pub unsafe fn resize(
    &mut self,
    address: *mut u8,
    new_size: usize,
  ) -> Result<NonNull<u8>, AllocError> {
    let rounded = self.validate(new_size)?;

    if address.is_null() {
      return self.allocate(new_size);
    }

    unsafe {
      let block = BlockHeader::from_payload(address);
      let old_size = (*block).size;

      if old_size >= rounded {
        self.split(block, rounded);
        trace!("[segfit] resize({:p}, {}) kept in place", address, new_size);
        return Ok(NonNull::new_unchecked(address));
      }

      if self.grow_in_place(block, rounded) {
        trace!("[segfit] resize({:p}, {}) grew in place", address, new_size);
        return Ok(NonNull::new_unchecked(address));
      }

      let moved = self.allocate(new_size)?;
      ptr::copy_nonoverlapping(address, moved.as_ptr(), old_size);
      self.free(address);

      trace!("[segfit] resize({:p}, {}) moved to {:p}", address, new_size, moved);
      Ok(moved)
    }
  }

  /// Payload bytes available behind `address`.
  ///
  /// # Safety
  ///
  /// `address` must be a live payload pointer handed out by this heap.
  pub unsafe fn usable_size(
    &self,
    address: NonNull<u8>,
  ) -> usize {
    unsafe { (*BlockHeader::from_payload(address.as_ptr())).size }
  }

  /// Walks both structures and reports whether every block is where it
  /// should be. Linear in the number of blocks times bucket length.
  pub fn check(
    &self,
  ) -> bool {
    if self.blocks.head().is_null() != self.blocks.tail().is_null() {
      return false;
    }

    let mut free_blocks = 0;
    let mut prev: *mut BlockHeader = ptr::null_mut();

    for block in self.blocks.iter() {
      unsafe {
        if (*block).addr.prev != prev {
          return false;
        }

        if !prev.is_null() {
          if (block as *mut u8) < BlockHeader::end(prev) {
            return false;
          }
          if (*prev).is_free && (*block).is_free && BlockHeader::touches(prev, block) {
            return false;
          }
        }

        if (*block).is_free {
          free_blocks += 1;
          if !self.free.contains(block) {
            return false;
          }
        } else if !(*block).free.is_empty() {
          return false;
        }
      }
      prev = block;
    }

    prev == self.blocks.tail() && self.free.bucket_lengths().map(|(_, length)| length).sum::<usize>() == free_blocks
  }

  /// Carves everything past `size` into a new free block when the surplus is
  /// worth a header and a minimal payload.
  unsafe fn split(
    &mut self,
    block: *mut BlockHeader,
    size: usize,
  ) {
    unsafe {
      let surplus = (*block).size - size;
      if surplus < HEADER_SIZE + self.config.min_split_payload {
        return;
      }

      let remainder = BlockHeader::init(BlockHeader::payload(block).add(size), surplus - HEADER_SIZE, true);
      (*block).size = size;
      self.blocks.insert_after(block, remainder);

      trace!("[segfit] split {:p}: kept {} bytes, {} bytes free at {:p}", block, size, (*remainder).size, remainder);

      let remainder = self.merge_forward(remainder);
      self.free.insert(remainder);
    }
  }

  /// Appends a used block of `size` bytes at the top of the region.
  unsafe fn grow(
    &mut self,
    size: usize,
  ) -> Result<*mut BlockHeader, AllocError> {
    let bytes = size.checked_add(HEADER_SIZE).ok_or(AllocError::Overflow)?;

    let Some(base) = (unsafe { self.extender.extend(bytes) }) else {
      warn!("[segfit] heap growth of {} bytes refused", bytes);
      return Err(AllocError::OutOfMemory { requested: bytes });
    };
    debug!("[segfit] heap grew by {} bytes at {:p}", bytes, base);

    unsafe {
      let block = BlockHeader::init(base.as_ptr(), size, false);
      self.blocks.append(block);
      Ok(block)
    }
  }

  /// Absorbs a free successor if that yields at least `size` bytes.
  unsafe fn grow_in_place(
    &mut self,
    block: *mut BlockHeader,
    size: usize,
  ) -> bool {
    unsafe {
      let next = (*block).addr.next;
      if !Self::mergeable(block, next) || (*block).size + HEADER_SIZE + (*next).size < size {
        return false;
      }

      self.free.remove(next);
      self.absorb_next(block);
      self.split(block, size);
      true
    }
  }

  /// Merges an unindexed free block with free neighbours on both sides and
  /// returns the surviving, lowest header.
  unsafe fn coalesce(
    &mut self,
    block: *mut BlockHeader,
  ) -> *mut BlockHeader {
    unsafe {
      let mut block = block;

      loop {
        let prev = (*block).addr.prev;
        if prev.is_null() || !(*prev).is_free || !BlockHeader::touches(prev, block) {
          break;
        }
        self.free.remove(prev);
        self.absorb_next(prev);
        block = prev;
      }

      self.merge_forward(block)
    }
  }

  unsafe fn merge_forward(
    &mut self,
    block: *mut BlockHeader,
  ) -> *mut BlockHeader {
    unsafe {
      loop {
        let next = (*block).addr.next;
        if !Self::mergeable(block, next) {
          break;
        }
        self.free.remove(next);
        self.absorb_next(block);
      }
      block
    }
  }

  /// `next` is free and starts exactly where `block` ends.
  unsafe fn mergeable(
    block: *mut BlockHeader,
    next: *mut BlockHeader,
  ) -> bool {
    unsafe { !next.is_null() && (*next).is_free && BlockHeader::touches(block, next) }
  }

  /// `block` takes over its address successor, header included. The
  /// successor must already be out of the free index.
  unsafe fn absorb_next(
    &mut self,
    block: *mut BlockHeader,
  ) {
    unsafe {
      let next = (*block).addr.next;
      trace!("[segfit] merge {:p} into {:p}", next, block);

      (*block).size += HEADER_SIZE + (*next).size;
      self.blocks.unlink(next);
    }
  }
}
