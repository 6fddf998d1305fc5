/// Rounds a byte count up to the next multiple of the machine word.
///
/// Every payload size goes through this before the heap looks at it, so a
/// header carved at `payload + size` always lands on a word boundary.
///
/// # Examples
///
/// ```rust
/// use segfit::align;
///
/// match core::mem::size_of::<usize>() {
///     8 => assert_eq!(align!(100), 104), // 64 bit machine.
///     4 => assert_eq!(align!(101), 104), // 32 bit machine.
///     _ => {},
/// };
/// ```
#[macro_export]
macro_rules! align {
  ($value:expr) => {
    ($value + ::core::mem::size_of::<usize>() - 1) & !(::core::mem::size_of::<usize>() - 1)
  };
}

/// Same as [`align!`] but reports overflow instead of wrapping.
pub fn checked_align(
  size: usize,
) -> Option<usize> {
  size
    .checked_add(core::mem::size_of::<usize>() - 1)
    .map(|padded| padded & !(core::mem::size_of::<usize>() - 1))
}

#[cfg(test)]
mod tests {
  use std::mem;

  use super::checked_align;

  #[test]
  fn test_align_rounds_to_word() {
    let word = mem::size_of::<usize>();

    for words in 0..16 {
      let expected = word * (words + 1);

      for size in (word * words + 1)..=expected {
        assert_eq!(expected, align!(size));
      }
    }
  }

  #[test]
  fn test_align_keeps_multiples() {
    let word = mem::size_of::<usize>();

    assert_eq!(0, align!(0usize));
    assert_eq!(word * 125, align!(word * 125));
  }

  #[test]
  fn test_checked_align() {
    assert_eq!(Some(align!(1000usize + 3)), checked_align(1003));
    assert_eq!(None, checked_align(usize::MAX));
  }
}
