use std::fmt;

use crate::{
  block::HEADER_SIZE,
  extender::HeapExtender,
  heap::Heap,
};

/// Everything the statistic queries report, taken in one walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapStats {
  pub free_blocks: usize,
  pub free_bytes: usize,
  pub total_blocks: usize,
  pub total_bytes: usize,
  pub metadata_bytes: usize,
  pub header_size: usize,
}

impl fmt::Display for HeapStats {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(
      f,
      "{} of {} blocks free, {} of {} payload bytes free, {} bytes of headers ({} each)",
      self.free_blocks, self.total_blocks, self.free_bytes, self.total_bytes, self.metadata_bytes, self.header_size
    )
  }
}

// Each query walks the address list; none of them writes.
impl<E: HeapExtender> Heap<E> {
  pub fn free_blocks(
    &self,
  ) -> usize {
    self.blocks.iter().filter(|&block| unsafe { (*block).is_free }).count()
  }

  pub fn free_bytes(
    &self,
  ) -> usize {
    self
      .blocks
      .iter()
      .filter(|&block| unsafe { (*block).is_free })
      .map(|block| unsafe { (*block).size })
      .sum()
  }

  pub fn total_blocks(
    &self,
  ) -> usize {
    self.blocks.iter().count()
  }

  pub fn total_bytes(
    &self,
  ) -> usize {
    self.blocks.iter().map(|block| unsafe { (*block).size }).sum()
  }

  pub fn metadata_bytes(
    &self,
  ) -> usize {
    self.total_blocks() * HEADER_SIZE
  }

  pub const fn header_size(
    &self,
  ) -> usize {
    HEADER_SIZE
  }

  pub fn stats(
    &self,
  ) -> HeapStats {
    let mut stats = HeapStats {
      free_blocks: 0,
      free_bytes: 0,
      total_blocks: 0,
      total_bytes: 0,
      metadata_bytes: 0,
      header_size: HEADER_SIZE,
    };

    for block in self.blocks.iter() {
      let (size, is_free) = unsafe { ((*block).size, (*block).is_free) };

      stats.total_blocks += 1;
      stats.total_bytes += size;
      if is_free {
        stats.free_blocks += 1;
        stats.free_bytes += size;
      }
    }
    stats.metadata_bytes = stats.total_blocks * HEADER_SIZE;

    stats
  }
}
