use rmanager::{
  CommandKind, Error, ManagerConfig, MemoryManager, Offset, SearchMode, Session, Value,
};

fn session(
  arena_size: usize,
  max_vars: usize,
) -> Session {
  let config = ManagerConfig::default()
    .with_arena_size(arena_size)
    .with_max_vars(max_vars);
  Session::new(MemoryManager::new(config).unwrap())
}

fn live_ranges(session: &Session) -> Vec<(usize, usize)> {
  let mut ranges: Vec<_> = session
    .manager()
    .slots()
    .occupied()
    .map(|(_, offset, size)| (offset.get(), size))
    .collect();
  ranges.sort();
  ranges
}

#[test]
fn test_full_run_with_default_arena() {
  let mut session = Session::new(MemoryManager::default());
  let input = "\
chello
d10,20,30
cworld
f1
d5
f3
cagain
";

  assert_eq!(session.run(input.as_bytes()).unwrap(), 7);

  let kinds: Vec<_> = session.records().iter().map(|r| r.kind).collect();
  assert_eq!(
    kinds,
    vec![
      CommandKind::CharData,
      CommandKind::IntList,
      CommandKind::CharData,
      CommandKind::Free,
      CommandKind::IntList,
      CommandKind::Free,
      CommandKind::CharData,
    ]
  );

  let report = session.report().unwrap();
  let values: Vec<_> = report.lines.iter().map(|l| (l.index, l.value.clone())).collect();
  assert_eq!(
    values,
    vec![
      (1, Value::Ints(vec![10, 20, 30])),
      (4, Value::Ints(vec![5])),
      (6, Value::Chars("again".to_string())),
    ]
  );

  let (memory, table) = rmanager::dump(session.manager(), session.records());
  assert_eq!(memory.len(), rmanager::ARENA_SIZE);
  assert_eq!(table.lines().count(), 7);
  assert!(table.lines().next().unwrap().starts_with("1 0"));
}

#[test]
fn test_live_ranges_never_overlap() {
  let mut session = session(4096, 64);
  let mut input = String::new();

  for i in 1..=40 {
    input.push_str(&format!("c{}\n", "x".repeat(i % 7 + 1)));
    if i % 3 == 0 {
      input.push_str(&format!("f{}\n", i));
    }
  }

  session.run(input.as_bytes()).unwrap();

  let ranges = live_ranges(&session);
  assert!(!ranges.is_empty());
  assert!(ranges[0].0 >= 1);
  for pair in ranges.windows(2) {
    let (a, a_len) = pair[0];
    let (b, _) = pair[1];
    assert!(a + a_len < b, "{pair:?}");
  }
}

#[test]
fn test_slot_exhaustion_keeps_running() {
  let mut session = session(1024, 2);

  session.run("ca\ncb\ncc\nf1\ncd\n".as_bytes()).unwrap();

  let records = session.records();
  assert_eq!(records[2].offset, Offset::NIL);
  assert_eq!(records[2].len, 0);
  assert!(!records[4].offset.is_nil());
  assert_eq!(records[4].len, 2);
}

#[test]
fn test_freed_space_is_reclaimed_when_arena_is_full() {
  for mode in [SearchMode::HighWater, SearchMode::FirstFit] {
    let config = ManagerConfig::default()
      .with_arena_size(38)
      .with_max_vars(8)
      .with_search_mode(mode);
    let mut manager = MemoryManager::new(config).unwrap();

    let first = manager.allocate(12).unwrap();
    let _second = manager.allocate(12).unwrap();
    assert!(manager.allocate(12).is_err(), "{mode:?}");

    manager.free(first.handle).unwrap();

    let reused = manager.allocate(12).unwrap();
    assert_eq!(reused.offset, first.offset, "{mode:?}");
  }
}

#[test]
fn test_fatal_input_stops_the_run() {
  let mut session = session(1024, 8);

  let err = session.run("cfine\nd1,-2\n".as_bytes()).unwrap_err();

  assert!(err.is_fatal());
  assert!(matches!(err, Error::Parse { line: 2, .. }));
}

#[test]
fn test_stops_at_command_limit() {
  let mut session = session(1024, 8);
  let mut input = String::from("ca\n");
  input.push_str(&"f1\n".repeat(rmanager::MAX_LINES));

  let processed = session.run(input.as_bytes()).unwrap();

  assert_eq!(processed, rmanager::MAX_LINES);
  assert_eq!(session.records().len(), rmanager::MAX_LINES);
  assert_eq!(session.records()[0].len, 0);
}

#[test]
fn test_long_line_is_stored_truncated() {
  let mut session = session(16 * 1024, 8);
  let input = format!("c{}\ncok\n", "x".repeat(rmanager::LINE_LEN + 1000));

  session.run(input.as_bytes()).unwrap();

  let records = session.records();
  assert_eq!(records.len(), 2);
  assert_eq!(records[0].len, rmanager::LINE_LEN);

  let report = session.report().unwrap();
  assert_eq!(
    report.lines[0].value,
    Value::Chars("x".repeat(rmanager::LINE_LEN - 1))
  );
  assert_eq!(report.lines[1].value, Value::Chars("ok".to_string()));
}

#[test]
fn test_char_data_keeps_invalid_utf8_bytes() {
  let mut session = session(1024, 8);

  session.run(&b"c\xffab\n"[..]).unwrap();

  let record = session.records()[0];
  assert_eq!(record.len, 4);
  let start = record.offset.get();
  assert_eq!(&session.manager().snapshot()[start..start + 4], b"\xffab\0");
}
