//! Input commands and their textual form.
//!
//! Every input line starts with a one-character tag:
//!
//! ```text
//!   c<text>        store <text> as a NUL-terminated string
//!   d<n>,<n>,...   store a list of positive 32-bit integers
//!   f<k>           free whatever command number <k> (1-based) stored
//! ```

use crate::error::{Error, Result};

/// Longest line accepted; the rest is dropped with a warning.
pub const LINE_LEN: usize = 5000;

/// Most commands processed in one run.
pub const MAX_LINES: usize = 100_000;

const INT_SIZE: usize = std::mem::size_of::<i32>();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
  CharData,
  IntList,
  Free,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
  /// Raw text bytes, stored as given.
  CharData(Vec<u8>),
  IntList(Vec<i32>),
  /// 1-based number of an earlier command.
  Free(usize),
}

impl Command {
  /// Parses one input line. `line_number` is only used for error messages.
  pub fn parse(
    line: &[u8],
    line_number: usize,
  ) -> Result<Self> {
    let [tag, rest @ ..] = line else {
      return Err(Error::parse(line_number, "Invalid line \"\""));
    };

    if rest.is_empty() {
      return Err(Error::parse(
        line_number,
        format!("Invalid line {:?}", String::from_utf8_lossy(line)),
      ));
    }

    match *tag {
      b'c' => Ok(Command::CharData(rest.to_vec())),
      b'd' => parse_ints(text(rest, line_number)?, line_number).map(Command::IntList),
      b'f' => {
        let rest = text(rest, line_number)?;
        rest
          .trim()
          .parse::<usize>()
          .map(Command::Free)
          .map_err(|_| Error::parse(line_number, format!("Invalid free reference {rest:?}")))
      }
      other => Err(Error::parse(
        line_number,
        format!("Invalid input {}.", other as char),
      )),
    }
  }

  pub fn kind(&self) -> CommandKind {
    match self {
      Command::CharData(_) => CommandKind::CharData,
      Command::IntList(_) => CommandKind::IntList,
      Command::Free(_) => CommandKind::Free,
    }
  }

  /// Bytes to allocate, `None` for commands that store nothing.
  pub fn allocation_size(&self) -> Option<usize> {
    match self {
      Command::CharData(text) => Some(text.len() + 1),
      Command::IntList(ints) => Some(INT_SIZE * (ints.len() + 1)),
      Command::Free(_) => None,
    }
  }

  /// The length recorded for this command once its data is stored: bytes
  /// (tag included) for text, element count for integer lists.
  pub fn recorded_len(&self) -> usize {
    match self {
      Command::CharData(text) => text.len() + 1,
      Command::IntList(ints) => ints.len(),
      Command::Free(_) => 0,
    }
  }

  /// Payload bytes, exactly [`allocation_size`](Self::allocation_size) long.
  pub fn encode(&self) -> Option<Vec<u8>> {
    match self {
      Command::CharData(text) => {
        let mut bytes = Vec::with_capacity(text.len() + 1);
        bytes.extend_from_slice(text);
        bytes.push(0);
        Some(bytes)
      }
      Command::IntList(ints) => {
        let mut bytes: Vec<u8> = ints.iter().flat_map(|n| n.to_le_bytes()).collect();
        bytes.resize(INT_SIZE * (ints.len() + 1), 0);
        Some(bytes)
      }
      Command::Free(_) => None,
    }
  }
}

/// Text stored by a char-data command, up to its NUL terminator.
pub fn decode_chars(payload: &[u8]) -> String {
  let end = payload
    .iter()
    .position(|&b| b == 0)
    .unwrap_or(payload.len());

  String::from_utf8_lossy(&payload[..end]).into_owned()
}

/// The first `count` integers stored by an int-list command.
pub fn decode_ints(
  payload: &[u8],
  count: usize,
) -> Vec<i32> {
  payload
    .chunks_exact(INT_SIZE)
    .take(count)
    .map(|chunk| i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
    .collect()
}

/// Cuts `line` down to at most [`LINE_LEN`] bytes and returns how many bytes
/// were dropped.
pub fn truncate_line(line: &mut Vec<u8>) -> usize {
  let dropped = line.len().saturating_sub(LINE_LEN);
  line.truncate(LINE_LEN);
  dropped
}

fn text(
  bytes: &[u8],
  line_number: usize,
) -> Result<&str> {
  std::str::from_utf8(bytes).map_err(|_| Error::parse(line_number, "Non-UTF-8 argument."))
}

fn parse_ints(
  list: &str,
  line_number: usize,
) -> Result<Vec<i32>> {
  let ints = list
    .split(',')
    .map(str::trim)
    .filter(|token| !token.is_empty())
    .map(|token| match token.parse::<i32>() {
      Ok(n) if n > 0 => Ok(n),
      _ => Err(Error::parse(line_number, format!("Non-int {token}."))),
    })
    .collect::<Result<Vec<_>>>()?;

  if ints.is_empty() {
    return Err(Error::parse(line_number, "Empty int list."));
  }

  Ok(ints)
}
