//! # rmanager - A Simulated Memory Manager
//!
//! This crate models `malloc`/`free` inside a single fixed-size **arena**,
//! and can dump the arena plus a table of what was stored where to disk.
//! It is a teaching model, not a production allocator: no alignment, no
//! threads, one arena for the lifetime of one run.
//!
//! ## Overview
//!
//! ```text
//!   Arena (N bytes, zero-initialized):
//!
//!   ┌───┬───────────┬───┬──────────────────┬───┬──────────────────────────┐
//!   │ 0 │    A1     │ g │        A2        │ g │        Free Space        │
//!   └───┴───────────┴───┴──────────────────┴───┴──────────────────────────┘
//!     ▲                ▲
//!     │                └── guard byte: never claimed, separates allocations
//!     └── offset 0: the NIL sentinel, never handed out
//!
//!   Slot Table (MAX_VARS entries):
//!
//!   ┌────────┬────────────────────┐
//!   │ handle │ slot               │
//!   ├────────┼────────────────────┤
//!   │   #0   │ Occupied(1, |A1|)  │
//!   │   #1   │ Occupied(.., |A2|) │
//!   │   #2   │ Vacant             │
//!   │   ...  │ ...                │
//!   └────────┴────────────────────┘
//! ```
//!
//! Free space is derived from the live ranges in the slot table, not from
//! the byte values in the arena, so stored data may contain zeros.
//!
//! ## Crate Structure
//!
//! ```text
//!   rmanager
//!   ├── arena    - Bounds-checked byte buffer
//!   ├── slot     - Offset, Handle and the slot table
//!   ├── scan     - Search for an unclaimed run of bytes
//!   ├── manager  - MemoryManager: allocate / free
//!   ├── command  - Input commands (c / d / f lines)
//!   ├── session  - Command dispatch, records and the report
//!   ├── dump     - Memory and variable dumps
//!   ├── config   - ManagerConfig
//!   └── error    - Error and Result
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use rmanager::{ManagerConfig, MemoryManager, Offset};
//!
//! let config = ManagerConfig::default().with_arena_size(1024);
//! let mut manager = MemoryManager::new(config).unwrap();
//!
//! let allocation = manager.allocate(6).unwrap();
//! manager.write(allocation.handle, b"hello\0").unwrap();
//! assert_eq!(manager.payload(allocation.handle).unwrap(), b"hello\0");
//!
//! manager.free(allocation.handle).unwrap();
//!
//! // The whole arena can never be claimed: offset 0 and the guard bytes stay free.
//! assert_eq!(manager.malloc(1024), Offset::NIL);
//! ```
//!
//! ## Failure Model
//!
//! - Running out of arena space or slots is recoverable and shows up as
//!   [`Offset::NIL`] from [`MemoryManager::malloc`].
//! - Freeing a vacant handle is a reported no-op.
//! - Arena access out of bounds is a broken invariant and is fatal.

mod arena;
mod command;
mod config;
mod dump;
mod error;
mod manager;
mod scan;
mod session;
mod slot;

pub use arena::Arena;
pub use command::{Command, CommandKind, LINE_LEN, MAX_LINES};
pub use config::ManagerConfig;
pub use dump::{MEM_DUMP, VARS_DUMP, dump, write as write_dump};
pub use error::{Error, Result};
pub use manager::{Allocation, MemoryManager};
pub use scan::{SearchMode, find_free_run, search};
pub use session::{CommandRecord, Report, ReportLine, Session, Value};
pub use slot::{Handle, Offset, Slot, SlotTable};

/// Size of the arena in bytes.
pub const ARENA_SIZE: usize = 1024 * 1024;

/// Number of slots in the slot table.
pub const MAX_VARS: usize = 1024;
