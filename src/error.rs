use std::{error::Error, fmt};

/// Why a request produced no memory. Nothing in the heap changes when one of
/// these is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
  /// Zero-byte requests are rejected.
  ZeroSize,
  /// Request larger than the configured maximum.
  TooLarge { requested: usize, max: usize },
  /// `count * size` does not fit in a `usize`.
  Overflow,
  /// The extender refused to grow the region.
  OutOfMemory { requested: usize },
}

impl fmt::Display for AllocError {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    match *self {
      AllocError::ZeroSize => write!(f, "zero-sized allocation"),
      AllocError::TooLarge { requested, max } => {
        write!(f, "requested {requested} bytes, maximum is {max}")
      }
      AllocError::Overflow => write!(f, "allocation size overflows usize"),
      AllocError::OutOfMemory { requested } => {
        write!(f, "heap could not grow by {requested} bytes")
      }
    }
  }
}

impl Error for AllocError {}
