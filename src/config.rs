use crate::{
  ARENA_SIZE, MAX_VARS,
  error::{Error, Result},
  scan::SearchMode,
};

/// Sizing and search policy for a [`MemoryManager`](crate::MemoryManager).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagerConfig {
  pub arena_size: usize,
  pub max_vars: usize,
  pub search_mode: SearchMode,
}

impl Default for ManagerConfig {
  fn default() -> Self {
    Self {
      arena_size: ARENA_SIZE,
      max_vars: MAX_VARS,
      search_mode: SearchMode::default(),
    }
  }
}

impl ManagerConfig {
  pub fn with_arena_size(
    mut self,
    arena_size: usize,
  ) -> Self {
    self.arena_size = arena_size;
    self
  }

  pub fn with_max_vars(
    mut self,
    max_vars: usize,
  ) -> Self {
    self.max_vars = max_vars;
    self
  }

  pub fn with_search_mode(
    mut self,
    search_mode: SearchMode,
  ) -> Self {
    self.search_mode = search_mode;
    self
  }

  /// The arena needs the sentinel byte plus room for at least one byte of data.
  pub fn validate(&self) -> Result<()> {
    if self.arena_size < 2 {
      return Err(Error::InvalidConfig(format!(
        "arena size must be at least 2 bytes, got {}",
        self.arena_size
      )));
    }

    if self.max_vars == 0 {
      return Err(Error::InvalidConfig(
        "slot table needs at least one slot".to_string(),
      ));
    }

    Ok(())
  }
}
