/// Largest request the heap accepts, in bytes.
pub const MAX_SIZE: usize = 100_000_000;

/// Payload range covered by one free-index bucket.
pub const BUCKET_WIDTH: usize = 1000;

/// Number of buckets. The last one also takes every size beyond
/// `BUCKET_WIDTH * (BUCKET_COUNT - 1)`.
pub const BUCKET_COUNT: usize = 128;

/// Smallest payload a split remainder may carry.
pub const MIN_SPLIT_PAYLOAD: usize = 128;

/// Tunables of a [`Heap`](crate::Heap).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapConfig {
  /// Requests above this are rejected before any state is touched.
  pub max_size: usize,
  /// A free block is split only if the surplus can hold a header plus this
  /// many payload bytes.
  pub min_split_payload: usize,
}

impl HeapConfig {
  pub const DEFAULT: Self = Self {
    max_size: MAX_SIZE,
    min_split_payload: MIN_SPLIT_PAYLOAD,
  };

  pub const fn with_max_size(
    self,
    max_size: usize,
  ) -> Self {
    Self { max_size, ..self }
  }

  pub const fn with_min_split_payload(
    self,
    min_split_payload: usize,
  ) -> Self {
    Self {
      min_split_payload,
      ..self
    }
  }
}

impl Default for HeapConfig {
  fn default() -> Self {
    Self::DEFAULT
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_matches_constants() {
    let config = HeapConfig::default();

    assert_eq!(MAX_SIZE, config.max_size);
    assert_eq!(MIN_SPLIT_PAYLOAD, config.min_split_payload);
  }

  #[test]
  fn test_builders_override_single_field() {
    let config = HeapConfig::DEFAULT.with_max_size(4096).with_min_split_payload(16);

    assert_eq!(4096, config.max_size);
    assert_eq!(16, config.min_split_payload);
    assert_eq!(MAX_SIZE, HeapConfig::DEFAULT.with_min_split_payload(16).max_size);
  }
}
