//! First-fit search for an unclaimed run of bytes.
//!
//! A byte is claimed when it lies inside a live range of the slot table.
//! A candidate offset `o` for `size` bytes is accepted when the guard byte
//! `o - 1` and every byte of `[o, o + size]` are unclaimed:
//!
//! ```text
//!        guard           payload            tail
//!          │  ┌────────────────────────────┐  │
//!   ... ───┼──┤ o            ...   o+size-1 ├──┼─── ...
//!          ▼  └────────────────────────────┘  ▼
//!        o - 1                              o + size
//! ```
//!
//! Offset 0 is the `NIL` sentinel and is never a candidate, so an arena of
//! `N` bytes can hold at most `N - 2` bytes in a single allocation.

use crate::slot::{Offset, SlotTable};

/// Where the scan for free space begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
  /// Start just past the packed prefix of the slot table: the sizes of the
  /// occupied slots before the first vacant one, plus one. When nothing fits
  /// from there to the end, the scan wraps once to offset 1.
  #[default]
  HighWater,
  /// Always start at offset 1.
  FirstFit,
}

pub fn start_position(
  table: &SlotTable,
  mode: SearchMode,
) -> usize {
  match mode {
    SearchMode::HighWater => table.packed_extent() + 1,
    SearchMode::FirstFit => 1,
  }
}

/// Finds room for `size` bytes according to `mode`.
pub fn search(
  table: &SlotTable,
  arena_size: usize,
  size: usize,
  mode: SearchMode,
) -> Option<Offset> {
  let start = start_position(table, mode);

  find_free_run(table, arena_size, size, start).or_else(|| {
    // Slots reused out of address order can leave free ranges behind the mark.
    (start > 1)
      .then(|| find_free_run(table, arena_size, size, 1))
      .flatten()
  })
}

/// Returns the first acceptable offset at or after `start`, or `None` once the
/// scan runs off the end of an arena of `arena_size` bytes.
pub fn find_free_run(
  table: &SlotTable,
  arena_size: usize,
  size: usize,
  start: usize,
) -> Option<Offset> {
  let mut candidate = start.max(1);

  loop {
    let tail = candidate.checked_add(size)?;
    if tail >= arena_size {
      return None;
    }

    // Live ranges are disjoint, so only the last one starting at or before
    // the tail byte can reach back over the guard byte.
    match table.last_range_at_or_before(tail) {
      Some((offset, len)) if offset + len >= candidate => candidate = offset + len + 1,
      _ => return Some(Offset::new(candidate)),
    }
  }
}
