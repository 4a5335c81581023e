use std::{fmt, io::BufRead};

use tracing::{debug, info, warn};

use crate::{
  command::{self, Command, CommandKind, MAX_LINES},
  error::{Error, Result},
  manager::MemoryManager,
  slot::{Handle, Offset},
};

/// What one input command stored, and where.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandRecord {
  pub kind: CommandKind,
  /// Address the command's data was stored at, kept after a free.
  pub offset: Offset,
  /// 0 once freed, or when nothing was stored.
  pub len: usize,
  handle: Option<Handle>,
}

impl CommandRecord {
  fn empty(kind: CommandKind) -> Self {
    Self {
      kind,
      offset: Offset::NIL,
      len: 0,
      handle: None,
    }
  }

  pub fn is_live(&self) -> bool {
    self.handle.is_some()
  }
}

/// Drives a [`MemoryManager`] from a stream of commands and keeps one
/// [`CommandRecord`] per command, in input order.
pub struct Session {
  manager: MemoryManager,
  records: Vec<CommandRecord>,
}

impl Session {
  pub fn new(manager: MemoryManager) -> Self {
    Self {
      manager,
      records: Vec::new(),
    }
  }

  /// Processes every line of `input`. Stops at the first fatal error; other
  /// failures are logged and recorded as empty commands.
  pub fn run<R: BufRead>(
    &mut self,
    input: R,
  ) -> Result<usize> {
    for (index, raw) in input.split(b'\n').enumerate() {
      let line_number = index + 1;

      if self.records.len() >= MAX_LINES {
        warn!(limit = MAX_LINES, "command limit reached, ignoring remaining input");
        break;
      }

      let mut line = raw?;
      if line.last() == Some(&b'\r') {
        line.pop();
      }

      let dropped = command::truncate_line(&mut line);
      if dropped > 0 {
        warn!(line = line_number, dropped, "line over limit, truncated");
      }

      self.execute(Command::parse(&line, line_number)?)?;
    }

    Ok(self.records.len())
  }

  /// Runs a single command and appends its record.
  pub fn execute(
    &mut self,
    command: Command,
  ) -> Result<&CommandRecord> {
    let record = match &command {
      Command::Free(number) => {
        match self.free_command(*number) {
          Ok(size) => debug!(command = number, size, "released"),
          Err(err) if !err.is_fatal() => warn!("{err}"),
          Err(err) => return Err(err),
        }
        CommandRecord::empty(CommandKind::Free)
      }
      Command::CharData(_) | Command::IntList(_) => self.store(&command)?,
    };

    self.records.push(record);
    Ok(&self.records[self.records.len() - 1])
  }

  /// Frees the allocation made by command `number` (1-based) and zeroes its
  /// recorded length. Returns the number of bytes released.
  pub fn free_command(
    &mut self,
    number: usize,
  ) -> Result<usize> {
    let index = number
      .checked_sub(1)
      .ok_or(Error::InvalidReference(number))?;
    let record = self
      .records
      .get_mut(index)
      .ok_or(Error::InvalidReference(number))?;

    let handle = record.handle.ok_or(Error::InvalidReference(number))?;
    let size = self.manager.free(handle)?;

    record.handle = None;
    record.len = 0;

    Ok(size)
  }

  pub fn records(&self) -> &[CommandRecord] {
    &self.records
  }

  pub fn manager(&self) -> &MemoryManager {
    &self.manager
  }

  /// Live data per command, read back from the arena.
  pub fn report(&self) -> Result<Report> {
    let mut lines = Vec::new();

    for (index, record) in self.records.iter().enumerate() {
      let Some(handle) = record.handle.filter(|_| record.len > 0) else {
        continue;
      };

      let payload = self.manager.payload(handle)?;
      let value = match record.kind {
        CommandKind::CharData => Value::Chars(command::decode_chars(payload)),
        CommandKind::IntList => Value::Ints(command::decode_ints(payload, record.len)),
        CommandKind::Free => continue,
      };

      lines.push(ReportLine {
        index,
        offset: record.offset,
        value,
      });
    }

    Ok(Report { lines })
  }

  fn store(
    &mut self,
    command: &Command,
  ) -> Result<CommandRecord> {
    let kind = command.kind();
    let (Some(size), Some(payload)) = (command.allocation_size(), command.encode()) else {
      return Ok(CommandRecord::empty(kind));
    };

    let allocation = match self.manager.allocate(size) {
      Ok(allocation) => allocation,
      Err(err) if !err.is_fatal() => {
        info!(command = self.records.len() + 1, "stored nothing: {err}");
        return Ok(CommandRecord::empty(kind));
      }
      Err(err) => return Err(err),
    };

    self.manager.write(allocation.handle, &payload)?;

    Ok(CommandRecord {
      kind,
      offset: allocation.offset,
      len: command.recorded_len(),
      handle: Some(allocation.handle),
    })
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
  Chars(String),
  Ints(Vec<i32>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
  /// 0-based command index.
  pub index: usize,
  pub offset: Offset,
  pub value: Value,
}

/// Human-readable listing of what is still stored at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
  pub lines: Vec<ReportLine>,
}

impl fmt::Display for Report {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    writeln!(f, "Cmd#\tOffset\tValue")?;
    writeln!(f, "====\t======\t=====")?;

    for line in &self.lines {
      write!(f, "{}\t{}\t", line.index, line.offset)?;
      match &line.value {
        Value::Chars(text) => writeln!(f, "chars: {text}")?,
        Value::Ints(ints) => {
          let joined = ints
            .iter()
            .map(i32::to_string)
            .collect::<Vec<_>>()
            .join(", ");
          writeln!(f, "ints: {joined}")?;
        }
      }
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::ManagerConfig;

  fn session() -> Session {
    let config = ManagerConfig::default()
      .with_arena_size(1024)
      .with_max_vars(16);
    Session::new(MemoryManager::new(config).unwrap())
  }

  #[test]
  fn test_store_and_free() {
    let mut session = session();

    session.run("chello\nd1,2,3\nf1\n".as_bytes()).unwrap();

    let records = session.records();
    assert_eq!(records.len(), 3);

    assert_eq!(records[0].kind, CommandKind::CharData);
    assert_eq!(records[0].offset, Offset::new(1));
    assert_eq!(records[0].len, 0);
    assert!(!records[0].is_live());

    assert_eq!(records[1].kind, CommandKind::IntList);
    assert_eq!(records[1].len, 3);
    assert!(records[1].is_live());

    assert_eq!(records[2].kind, CommandKind::Free);
    assert_eq!(records[2].offset, Offset::NIL);
    assert_eq!(records[2].len, 0);

    // The freed string is gone from the arena.
    assert!(session.manager().snapshot()[1..7].iter().all(|&b| b == 0));
  }

  #[test]
  fn test_free_only_touches_referenced_command() {
    let mut session = session();

    session.run("ca\ncb\ncc\nf1\n".as_bytes()).unwrap();

    let lens: Vec<_> = session.records().iter().map(|r| r.len).collect();
    assert_eq!(lens, vec![0, 2, 2, 0]);
    assert_eq!(session.manager().slots().len(), 2);
  }

  #[test]
  fn test_invalid_reference_is_not_fatal() {
    let mut session = session();

    session.run("cabc\nf9\nf0\nf2\nf1\nf1\n".as_bytes()).unwrap();

    assert_eq!(session.records().len(), 6);
    assert!(matches!(
      session.free_command(2),
      Err(Error::InvalidReference(2))
    ));
    assert!(matches!(
      session.free_command(1),
      Err(Error::InvalidReference(1))
    ));
  }

  #[test]
  fn test_parse_error_is_fatal() {
    let mut session = session();

    let err = session.run("cok\nq1\ncnever\n".as_bytes()).unwrap_err();

    assert!(matches!(err, Error::Parse { line: 2, .. }));
    assert_eq!(session.records().len(), 1);
  }

  #[test]
  fn test_failed_allocation_records_nil() {
    let config = ManagerConfig::default()
      .with_arena_size(8)
      .with_max_vars(4);
    let mut session = Session::new(MemoryManager::new(config).unwrap());

    session.run("cabcdefghij\ncab\n".as_bytes()).unwrap();

    let records = session.records();
    assert_eq!(records[0].offset, Offset::NIL);
    assert_eq!(records[0].len, 0);
    assert_eq!(records[1].offset, Offset::new(1));
    assert_eq!(records[1].len, 3);
  }

  #[test]
  fn test_crlf_and_missing_final_newline() {
    let mut session = session();

    session.run("cone\r\nctwo".as_bytes()).unwrap();

    let report = session.report().unwrap();
    assert_eq!(report.lines.len(), 2);
    assert_eq!(report.lines[0].value, Value::Chars("one".to_string()));
    assert_eq!(report.lines[1].value, Value::Chars("two".to_string()));
  }

  #[test]
  fn test_report_rendering() {
    let mut session = session();

    session.run("chi\nd7,8\ncbye\nf3\n".as_bytes()).unwrap();

    let report = session.report().unwrap();
    let ints_offset = session.records()[1].offset;

    assert_eq!(
      report.to_string(),
      format!(
        "Cmd#\tOffset\tValue\n\
         ====\t======\t=====\n\
         0\t1\tchars: hi\n\
         1\t{ints_offset}\tints: 7, 8\n"
      )
    );
  }
}
