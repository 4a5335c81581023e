//! rmanager - run a command file against the simulated memory manager.
//!
//! Reads `c`/`d`/`f` commands from a file or stdin, prints what is still
//! stored at the end of the run and writes the memory and variable dumps.

use std::{
  fs::File,
  io::{self, BufReader},
  path::PathBuf,
};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use rmanager::{
  ARENA_SIZE, MAX_VARS, MEM_DUMP, ManagerConfig, MemoryManager, SearchMode, Session, VARS_DUMP,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Simulated malloc/free over a fixed-size arena.
#[derive(Parser)]
#[command(name = "rmanager")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Command file to read (stdin when omitted)
  input: Option<PathBuf>,

  /// Where to write the raw arena bytes
  #[arg(long, default_value = MEM_DUMP)]
  mem_dump: PathBuf,

  /// Where to write the per-command offset/length table
  #[arg(long, default_value = VARS_DUMP)]
  vars_dump: PathBuf,

  /// Arena size in bytes
  #[arg(long, default_value_t = ARENA_SIZE)]
  arena_size: usize,

  /// Slot table capacity
  #[arg(long, default_value_t = MAX_VARS)]
  max_vars: usize,

  /// Where the free-space scan starts
  #[arg(long, value_enum, default_value_t = Search::HighWater)]
  search: Search,

  /// Skip the stdout report
  #[arg(long)]
  no_report: bool,

  /// Increase verbosity (-v, -vv, -vvv)
  #[arg(short, long, action = clap::ArgAction::Count)]
  verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum Search {
  HighWater,
  FirstFit,
}

impl From<Search> for SearchMode {
  fn from(search: Search) -> Self {
    match search {
      Search::HighWater => SearchMode::HighWater,
      Search::FirstFit => SearchMode::FirstFit,
    }
  }
}

fn init_tracing(verbose: u8) -> Result<()> {
  let fallback = match verbose {
    0 => "warn",
    1 => "info",
    2 => "debug",
    _ => "trace",
  };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(io::stderr)
    .with_target(false)
    .try_init()
    .map_err(|err| anyhow!("Failed to initialize tracing subscriber: {err}"))
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  init_tracing(cli.verbose)?;

  let config = ManagerConfig::default()
    .with_arena_size(cli.arena_size)
    .with_max_vars(cli.max_vars)
    .with_search_mode(cli.search.into());

  let mut session = Session::new(MemoryManager::new(config)?);

  let processed = match &cli.input {
    Some(path) => {
      let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
      session.run(BufReader::new(file))?
    }
    None => session.run(io::stdin().lock())?,
  };

  info!(commands = processed, live = session.manager().slots().len(), "input processed");

  if !cli.no_report {
    print!("{}", session.report()?);
  }

  rmanager::write_dump(&cli.mem_dump, &cli.vars_dump, session.manager(), session.records())?;

  Ok(())
}
