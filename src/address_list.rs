use std::ptr;

use crate::block::BlockHeader;

/// Every block ever created, free or used, in ascending address order.
///
/// Only touches `BlockHeader::addr`; free-list links are none of its business.
pub struct AddressList {
  head: *mut BlockHeader,
  tail: *mut BlockHeader,
}

impl AddressList {
  pub const fn new() -> Self {
    Self {
      head: ptr::null_mut(),
      tail: ptr::null_mut(),
    }
  }

  pub fn head(
    &self,
  ) -> *mut BlockHeader {
    self.head
  }

  pub fn tail(
    &self,
  ) -> *mut BlockHeader {
    self.tail
  }

  /// Links a block born from heap growth as the new tail.
  ///
  /// # Safety
  ///
  /// `block` must be a live header above every block already in the list.
  pub unsafe fn append(
    &mut self,
    block: *mut BlockHeader,
  ) {
    unsafe {
      (*block).addr.prev = self.tail;
      (*block).addr.next = ptr::null_mut();

      if self.tail.is_null() {
        self.head = block;
      } else {
        (*self.tail).addr.next = block;
      }
      self.tail = block;
    }
  }

  /// Links `block` right after `anchor`, used when a block is split.
  ///
  /// # Safety
  ///
  /// `anchor` must be in the list and `block` must lie between `anchor` and
  /// its current successor.
  pub unsafe fn insert_after(
    &mut self,
    anchor: *mut BlockHeader,
    block: *mut BlockHeader,
  ) {
    unsafe {
      let next = (*anchor).addr.next;

      (*block).addr.prev = anchor;
      (*block).addr.next = next;
      (*anchor).addr.next = block;

      if next.is_null() {
        self.tail = block;
      } else {
        (*next).addr.prev = block;
      }
    }
  }

  /// Drops `block` from the list after its bytes were absorbed by a
  /// neighbour.
  ///
  /// # Safety
  ///
  /// `block` must be in the list.
  pub unsafe fn unlink(
    &mut self,
    block: *mut BlockHeader,
  ) {
    unsafe {
      let prev = (*block).addr.prev;
      let next = (*block).addr.next;

      if prev.is_null() {
        self.head = next;
      } else {
        (*prev).addr.next = next;
      }

      if next.is_null() {
        self.tail = prev;
      } else {
        (*next).addr.prev = prev;
      }

      (*block).addr.prev = ptr::null_mut();
      (*block).addr.next = ptr::null_mut();
    }
  }

  pub fn iter(
    &self,
  ) -> Iter<'_> {
    Iter {
      current: self.head,
      _list: self,
    }
  }
}

impl Default for AddressList {
  fn default() -> Self {
    Self::new()
  }
}

/// Read-only walk from the lowest block upwards.
pub struct Iter<'a> {
  current: *mut BlockHeader,
  _list: &'a AddressList,
}

impl Iterator for Iter<'_> {
  type Item = *mut BlockHeader;

  fn next(
    &mut self,
  ) -> Option<Self::Item> {
    if self.current.is_null() {
      return None;
    }

    let block = self.current;
    self.current = unsafe { (*block).addr.next };
    Some(block)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::block::HEADER_SIZE;

  #[repr(C, align(16))]
  struct Buffer([u8; 1024]);

  unsafe fn block_at(
    buffer: &mut Buffer,
    slot: usize,
  ) -> *mut BlockHeader {
    unsafe { BlockHeader::init(buffer.0.as_mut_ptr().add(slot * (HEADER_SIZE + 64)), 64, false) }
  }

  #[test]
  fn test_append_keeps_order() {
    let mut buffer = Buffer([0; 1024]);
    let mut list = AddressList::new();

    unsafe {
      let blocks: Vec<_> = (0..3).map(|slot| block_at(&mut buffer, slot)).collect();
      for &block in &blocks {
        list.append(block);
      }

      assert_eq!(blocks, list.iter().collect::<Vec<_>>());
      assert_eq!(blocks[0], list.head());
      assert_eq!(blocks[2], list.tail());
      assert!((*blocks[0]).addr.prev.is_null());
    }
  }

  #[test]
  fn test_insert_after_tail_moves_tail() {
    let mut buffer = Buffer([0; 1024]);
    let mut list = AddressList::new();

    unsafe {
      let first = block_at(&mut buffer, 0);
      let second = block_at(&mut buffer, 1);
      let third = block_at(&mut buffer, 2);

      list.append(first);
      list.append(third);
      list.insert_after(first, second);

      assert_eq!(vec![first, second, third], list.iter().collect::<Vec<_>>());
      assert_eq!(second, (*third).addr.prev);

      let fourth = block_at(&mut buffer, 3);
      list.insert_after(third, fourth);
      assert_eq!(fourth, list.tail());
    }
  }

  #[test]
  fn test_unlink_head_middle_tail() {
    let mut buffer = Buffer([0; 1024]);
    let mut list = AddressList::new();

    unsafe {
      let blocks: Vec<_> = (0..4).map(|slot| block_at(&mut buffer, slot)).collect();
      for &block in &blocks {
        list.append(block);
      }

      list.unlink(blocks[1]);
      assert_eq!(vec![blocks[0], blocks[2], blocks[3]], list.iter().collect::<Vec<_>>());
      assert!((*blocks[1]).addr.next.is_null());

      list.unlink(blocks[0]);
      assert_eq!(blocks[2], list.head());
      assert!((*blocks[2]).addr.prev.is_null());

      list.unlink(blocks[3]);
      assert_eq!(blocks[2], list.tail());

      list.unlink(blocks[2]);
      assert!(list.head().is_null());
      assert!(list.tail().is_null());
      assert_eq!(0, list.iter().count());
    }
  }
}
