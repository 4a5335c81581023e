use std::{collections::BTreeMap, fmt};

use crate::error::{Error, Result};

/// A byte position inside the arena.
///
/// Offset 0 is reserved: it is never handed out and doubles as [`Offset::NIL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Offset(usize);

impl Offset {
  pub const NIL: Offset = Offset(0);

  pub const fn new(offset: usize) -> Self {
    Self(offset)
  }

  pub const fn get(self) -> usize {
    self.0
  }

  pub const fn is_nil(self) -> bool {
    self.0 == 0
  }
}

impl fmt::Display for Offset {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Index of a slot in the [`SlotTable`], returned by every successful allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle(usize);

impl Handle {
  pub const fn new(index: usize) -> Self {
    Self(index)
  }

  pub const fn index(self) -> usize {
    self.0
  }
}

impl fmt::Display for Handle {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(f, "#{}", self.0)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Slot {
  #[default]
  Vacant,
  Occupied { offset: Offset, size: usize },
}

impl Slot {
  pub fn is_vacant(&self) -> bool {
    matches!(self, Slot::Vacant)
  }

  /// Bytes claimed by this slot, 0 when vacant.
  pub fn size(&self) -> usize {
    match self {
      Slot::Vacant => 0,
      Slot::Occupied { size, .. } => *size,
    }
  }
}

/// Fixed-capacity table of live allocations.
///
/// Besides the slots themselves the table keeps an address-ordered index of
/// the occupied ranges, which is what the scanner consults to decide whether
/// a byte is claimed.
pub struct SlotTable {
  slots: Vec<Slot>,
  ranges: BTreeMap<usize, usize>,
}

impl SlotTable {
  pub fn new(capacity: usize) -> Self {
    Self {
      slots: vec![Slot::Vacant; capacity],
      ranges: BTreeMap::new(),
    }
  }

  pub fn capacity(&self) -> usize {
    self.slots.len()
  }

  /// Number of occupied slots.
  pub fn len(&self) -> usize {
    self.ranges.len()
  }

  pub fn is_empty(&self) -> bool {
    self.ranges.is_empty()
  }

  pub fn is_full(&self) -> bool {
    self.len() == self.capacity()
  }

  pub fn get(
    &self,
    handle: Handle,
  ) -> Option<Slot> {
    self.slots.get(handle.index()).copied()
  }

  /// Lowest-index vacant slot.
  pub fn vacant(&self) -> Option<Handle> {
    self
      .slots
      .iter()
      .position(Slot::is_vacant)
      .map(Handle::new)
  }

  /// Sum of the sizes of the occupied slots that precede the first vacant one.
  pub fn packed_extent(&self) -> usize {
    self
      .slots
      .iter()
      .take_while(|slot| !slot.is_vacant())
      .map(Slot::size)
      .sum()
  }

  pub fn occupy(
    &mut self,
    handle: Handle,
    offset: Offset,
    size: usize,
  ) -> Result<()> {
    let slot = self
      .slots
      .get_mut(handle.index())
      .ok_or(Error::HandleOutOfRange(handle))?;

    debug_assert!(slot.is_vacant(), "slot {handle} is already occupied");
    debug_assert!(
      !overlaps(&self.ranges, offset.get(), size),
      "range at {offset} of {size} bytes overlaps a live allocation"
    );

    *slot = Slot::Occupied { offset, size };
    self.ranges.insert(offset.get(), size);

    Ok(())
  }

  /// Marks `handle` vacant and returns the range it covered.
  pub fn release(
    &mut self,
    handle: Handle,
  ) -> Result<(Offset, usize)> {
    let slot = self
      .slots
      .get_mut(handle.index())
      .ok_or(Error::HandleOutOfRange(handle))?;

    match std::mem::take(slot) {
      Slot::Vacant => Err(Error::VacantHandle(handle)),
      Slot::Occupied { offset, size } => {
        self.ranges.remove(&offset.get());
        Ok((offset, size))
      }
    }
  }

  /// The live range with the greatest start offset not past `position`.
  pub fn last_range_at_or_before(
    &self,
    position: usize,
  ) -> Option<(usize, usize)> {
    self
      .ranges
      .range(..=position)
      .next_back()
      .map(|(&offset, &size)| (offset, size))
  }

  /// Occupied slots in table order.
  pub fn occupied(&self) -> impl Iterator<Item = (Handle, Offset, usize)> + '_ {
    self
      .slots
      .iter()
      .enumerate()
      .filter_map(|(index, slot)| match *slot {
        Slot::Vacant => None,
        Slot::Occupied { offset, size } => Some((Handle::new(index), offset, size)),
      })
  }
}

fn overlaps(
  ranges: &BTreeMap<usize, usize>,
  offset: usize,
  size: usize,
) -> bool {
  let end = offset + size;

  ranges
    .range(..end)
    .next_back()
    .is_some_and(|(&start, &len)| start + len > offset)
}
