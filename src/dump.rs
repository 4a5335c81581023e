//! End-of-run snapshot of the arena and the command records.
//!
//! Two artifacts are produced:
//!
//! - the memory dump: every arena byte in offset order, no header;
//! - the variable dump: one `<offset> <length>` line per command record.

use std::{fs, path::Path};

use tracing::info;

use crate::{
  error::{Error, Result},
  manager::MemoryManager,
  session::CommandRecord,
};

/// Default file name of the memory dump.
pub const MEM_DUMP: &str = "core_mem";

/// Default file name of the variable dump.
pub const VARS_DUMP: &str = "core_vars";

/// Builds both artifacts in memory.
pub fn dump(
  manager: &MemoryManager,
  records: &[CommandRecord],
) -> (Vec<u8>, String) {
  (manager.snapshot().to_vec(), render_table(records))
}

/// Writes the memory dump to `mem_path` and the variable dump to `vars_path`.
pub fn write(
  mem_path: &Path,
  vars_path: &Path,
  manager: &MemoryManager,
  records: &[CommandRecord],
) -> Result<()> {
  write_file(mem_path, manager.snapshot())?;
  write_file(vars_path, render_table(records).as_bytes())?;

  info!(
    mem = %mem_path.display(),
    vars = %vars_path.display(),
    bytes = manager.arena_size(),
    records = records.len(),
    "wrote core dump"
  );

  Ok(())
}

fn render_table(records: &[CommandRecord]) -> String {
  records
    .iter()
    .map(|record| format!("{} {}\n", record.offset, record.len))
    .collect()
}

fn write_file(
  path: &Path,
  contents: &[u8],
) -> Result<()> {
  fs::write(path, contents).map_err(|source| Error::Dump {
    path: path.to_path_buf(),
    source,
  })
}
