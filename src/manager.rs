use tracing::{debug, warn};

use crate::{
  arena::Arena,
  config::ManagerConfig,
  error::{Error, Result},
  scan::{self, SearchMode},
  slot::{Handle, Offset, Slot, SlotTable},
};

/// A live allocation handed out by [`MemoryManager::allocate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
  pub handle: Handle,
  pub offset: Offset,
  pub size: usize,
}

impl Allocation {
  /// One past the last payload byte.
  pub fn end(&self) -> usize {
    self.offset.get() + self.size
  }
}

/// Sole owner of the arena and the slot table.
pub struct MemoryManager {
  arena: Arena,
  slots: SlotTable,
  search_mode: SearchMode,
}

impl Default for MemoryManager {
  fn default() -> Self {
    Self::from_config(ManagerConfig::default())
  }
}

impl MemoryManager {
  pub fn new(config: ManagerConfig) -> Result<Self> {
    config.validate()?;
    Ok(Self::from_config(config))
  }

  fn from_config(config: ManagerConfig) -> Self {
    Self {
      arena: Arena::new(config.arena_size),
      slots: SlotTable::new(config.max_vars),
      search_mode: config.search_mode,
    }
  }

  /// Claims `size` bytes and records them in the lowest vacant slot.
  pub fn allocate(
    &mut self,
    size: usize,
  ) -> Result<Allocation> {
    if size == 0 {
      warn!("rejected zero-byte allocation");
      return Err(Error::ZeroSize);
    }

    let Some(offset) = scan::search(&self.slots, self.arena.size(), size, self.search_mode) else {
      warn!(size, "out of space");
      return Err(Error::OutOfSpace { requested: size });
    };

    let Some(handle) = self.slots.vacant() else {
      warn!(size, capacity = self.slots.capacity(), "no vacant slot");
      return Err(Error::NoVacantSlot {
        capacity: self.slots.capacity(),
      });
    };

    self.slots.occupy(handle, offset, size)?;

    debug!(%handle, %offset, size, "allocated");

    Ok(Allocation {
      handle,
      offset,
      size,
    })
  }

  /// Like [`allocate`](Self::allocate), but reports failure as [`Offset::NIL`].
  pub fn malloc(
    &mut self,
    size: usize,
  ) -> Offset {
    self
      .allocate(size)
      .map(|allocation| allocation.offset)
      .unwrap_or(Offset::NIL)
  }

  /// Releases `handle` and zeroes the bytes it covered. Returns the number of
  /// bytes reclaimed.
  ///
  /// Freeing a vacant or unknown handle changes nothing and is reported as
  /// [`Error::VacantHandle`] or [`Error::HandleOutOfRange`].
  pub fn free(
    &mut self,
    handle: Handle,
  ) -> Result<usize> {
    let (offset, size) = match self.slots.release(handle) {
      Ok(range) => range,
      Err(err) => {
        warn!(%handle, "ignored free: {err}");
        return Err(err);
      }
    };

    self.arena.zero(offset.get(), size)?;

    debug!(%handle, %offset, size, "freed");

    Ok(size)
  }

  /// Copies `data` to the start of the allocation behind `handle`.
  pub fn write(
    &mut self,
    handle: Handle,
    data: &[u8],
  ) -> Result<()> {
    let (offset, size) = self.live_range(handle)?;

    if data.len() > size {
      return Err(Error::PayloadOverflow {
        len: data.len(),
        size,
      });
    }

    self.arena.write(offset.get(), data)
  }

  /// The bytes of the allocation behind `handle`.
  pub fn payload(
    &self,
    handle: Handle,
  ) -> Result<&[u8]> {
    let (offset, size) = self.live_range(handle)?;
    self.arena.read(offset.get(), size)
  }

  pub fn slots(&self) -> &SlotTable {
    &self.slots
  }

  pub fn arena_size(&self) -> usize {
    self.arena.size()
  }

  /// Read-only view of every arena byte, in offset order.
  pub fn snapshot(&self) -> &[u8] {
    self.arena.as_bytes()
  }

  fn live_range(
    &self,
    handle: Handle,
  ) -> Result<(Offset, usize)> {
    match self.slots.get(handle) {
      None => Err(Error::HandleOutOfRange(handle)),
      Some(Slot::Vacant) => Err(Error::VacantHandle(handle)),
      Some(Slot::Occupied { offset, size }) => Ok((offset, size)),
    }
  }
}
