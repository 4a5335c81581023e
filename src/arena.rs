use crate::error::{Error, Result};

/// Fixed-size, zero-initialized byte buffer backing every allocation.
///
/// The arena knows nothing about allocations; it only checks bounds.
pub struct Arena {
  bytes: Box<[u8]>,
}

impl Arena {
  pub fn new(size: usize) -> Self {
    Self {
      bytes: vec![0u8; size].into_boxed_slice(),
    }
  }

  #[inline(always)]
  pub fn size(&self) -> usize {
    self.bytes.len()
  }

  pub fn read(
    &self,
    offset: usize,
    len: usize,
  ) -> Result<&[u8]> {
    let end = self.checked_end(offset, len)?;
    Ok(&self.bytes[offset..end])
  }

  pub fn write(
    &mut self,
    offset: usize,
    data: &[u8],
  ) -> Result<()> {
    let end = self.checked_end(offset, data.len())?;
    self.bytes[offset..end].copy_from_slice(data);
    Ok(())
  }

  /// Resets `len` bytes starting at `offset` to the zero sentinel.
  pub fn zero(
    &mut self,
    offset: usize,
    len: usize,
  ) -> Result<()> {
    let end = self.checked_end(offset, len)?;
    self.bytes[offset..end].fill(0);
    Ok(())
  }

  pub fn as_bytes(&self) -> &[u8] {
    &self.bytes
  }

  fn checked_end(
    &self,
    offset: usize,
    len: usize,
  ) -> Result<usize> {
    offset
      .checked_add(len)
      .filter(|&end| end <= self.size())
      .ok_or(Error::OutOfBounds {
        offset,
        len,
        capacity: self.size(),
      })
  }
}
