//! Error types for the memory manager.
//!
//! Capacity failures (`OutOfSpace`, `NoVacantSlot`) and bad references are
//! recoverable: callers see them as the `NIL` sentinel and keep going.
//! Bounds violations, malformed input and I/O failures are fatal.

use std::{io, path::PathBuf};

use thiserror::Error;

use crate::slot::Handle;

/// Errors raised by the arena, the allocator and the command layer.
#[derive(Error, Debug)]
pub enum Error {
  /// No run of unclaimed bytes is long enough for the request.
  #[error("no free run of {requested} bytes left in the arena")]
  OutOfSpace { requested: usize },

  /// Every slot of the slot table holds a live allocation.
  #[error("slot table is full ({capacity} live allocations)")]
  NoVacantSlot { capacity: usize },

  #[error("cannot allocate zero bytes")]
  ZeroSize,

  /// Arena access outside `[0, capacity)`.
  #[error("arena access out of bounds: offset {offset} + {len} bytes exceeds arena size {capacity}")]
  OutOfBounds {
    offset: usize,
    len: usize,
    capacity: usize,
  },

  #[error("handle {0} is outside the slot table")]
  HandleOutOfRange(Handle),

  #[error("handle {0} does not refer to a live allocation")]
  VacantHandle(Handle),

  /// A payload write larger than the allocation it targets.
  #[error("payload of {len} bytes does not fit allocation of {size} bytes")]
  PayloadOverflow { len: usize, size: usize },

  /// A free command naming a command that holds no live allocation.
  #[error("command {0} did not produce a live allocation")]
  InvalidReference(usize),

  #[error("line {line}: {cause}")]
  Parse { line: usize, cause: String },

  #[error("invalid configuration: {0}")]
  InvalidConfig(String),

  #[error("failed to write dump to {path}: {source}")]
  Dump {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error(transparent)]
  Io(#[from] io::Error),
}

impl Error {
  /// Whether the run must stop on this error.
  pub fn is_fatal(&self) -> bool {
    matches!(
      self,
      Error::OutOfBounds { .. }
        | Error::Parse { .. }
        | Error::InvalidConfig(_)
        | Error::Dump { .. }
        | Error::Io(_)
    )
  }

  pub(crate) fn parse(
    line: usize,
    cause: impl Into<String>,
  ) -> Self {
    Error::Parse {
      line,
      cause: cause.into(),
    }
  }
}

pub type Result<T> = std::result::Result<T, Error>;
