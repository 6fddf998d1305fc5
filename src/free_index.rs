use std::ptr;

use crate::{
  block::BlockHeader,
  config::{BUCKET_COUNT, BUCKET_WIDTH},
};

/// Free blocks bucketed by payload size.
///
/// ```text
///   bucket:   0          1            2                127
///           ┌─────┐   ┌─────┐     ┌─────┐           ┌─────┐
///           │  ●  │   │ nil │     │  ●  │    ...    │  ●  │
///           └──┼──┘   └─────┘     └──┼──┘           └──┼──┘
///              ▼                     ▼                 ▼
///           [ 312 ]               [2048]           [500000]
///              │                     │
///              ▼                     ▼
///           [ 640 ]               [2900]
///
///   sizes:   0..1000   1000..2000   2000..3000       126000..
/// ```
///
/// Only touches `BlockHeader::free`.
pub struct FreeIndex {
  buckets: [*mut BlockHeader; BUCKET_COUNT],
}

impl FreeIndex {
  pub const fn new() -> Self {
    Self {
      buckets: [ptr::null_mut(); BUCKET_COUNT],
    }
  }

  pub fn bucket_of(
    size: usize,
  ) -> usize {
    (size / BUCKET_WIDTH).min(BUCKET_COUNT - 1)
  }

  /// Pushes `block` onto the head of its bucket.
  ///
  /// # Safety
  ///
  /// `block` must be a live free header that is not indexed yet.
  pub unsafe fn insert(
    &mut self,
    block: *mut BlockHeader,
  ) {
    unsafe {
      let bucket = &mut self.buckets[Self::bucket_of((*block).size)];
      let head = *bucket;

      (*block).free.prev = ptr::null_mut();
      (*block).free.next = head;
      if !head.is_null() {
        (*head).free.prev = block;
      }
      *bucket = block;
    }
  }

  /// Unlinks `block` from its bucket and clears its free links.
  ///
  /// # Safety
  ///
  /// `block` must be indexed, and its size must not have changed since
  /// [`FreeIndex::insert`].
  pub unsafe fn remove(
    &mut self,
    block: *mut BlockHeader,
  ) {
    unsafe {
      let prev = (*block).free.prev;
      let next = (*block).free.next;

      if prev.is_null() {
        self.buckets[Self::bucket_of((*block).size)] = next;
      } else {
        (*prev).free.next = next;
      }

      if !next.is_null() {
        (*next).free.prev = prev;
      }

      (*block).free.prev = ptr::null_mut();
      (*block).free.next = ptr::null_mut();
    }
  }

  /// Best fit within the first bucket holding any block of at least
  /// `min_size`, scanning buckets upwards.
  pub fn find_fit(
    &self,
    min_size: usize,
  ) -> Option<*mut BlockHeader> {
    for &head in &self.buckets[Self::bucket_of(min_size)..] {
      let mut best: *mut BlockHeader = ptr::null_mut();
      let mut current = head;

      unsafe {
        while !current.is_null() {
          let size = (*current).size;
          if size >= min_size && (best.is_null() || size < (*best).size) {
            best = current;
            if size == min_size {
              break;
            }
          }
          current = (*current).free.next;
        }
      }

      if !best.is_null() {
        return Some(best);
      }
    }

    None
  }

  /// Number of blocks in each bucket, for consistency checks.
  pub fn bucket_lengths(
    &self,
  ) -> impl Iterator<Item = (usize, usize)> + '_ {
    self.buckets.iter().enumerate().map(|(bucket, &head)| {
      let mut length = 0;
      let mut current = head;
      while !current.is_null() {
        length += 1;
        current = unsafe { (*current).free.next };
      }
      (bucket, length)
    })
  }

  /// Whether `block` is reachable from the bucket its size maps to.
  pub fn contains(
    &self,
    block: *mut BlockHeader,
  ) -> bool {
    unsafe {
      let mut current = self.buckets[Self::bucket_of((*block).size)];
      while !current.is_null() {
        if current == block {
          return true;
        }
        current = (*current).free.next;
      }
    }
    false
  }
}

impl Default for FreeIndex {
  fn default() -> Self {
    Self::new()
  }
}
