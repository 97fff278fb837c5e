mod app;
mod domain;
mod error;
mod logging;
mod repo;
mod store;
mod ui;
mod usecase;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use time::{Date, Duration as DateOffset};
use tracing::info;

use app::App;
use domain::todo::Priority;
use repo::KeyValueStore;
use repo::memory::InMemoryKvStore;
use repo::sqlite::{SqliteKvStore, default_data_dir};
use store::TaskStore;

#[derive(Parser, Debug)]
#[command(author, version, about = "yaru - local task tracker TUI", long_about = None)]
struct Args {
    /// Tick interval of render loop in milliseconds
    #[arg(long, default_value_t = 120)]
    tick_ms: u64,

    /// Start with demo tasks (in-memory, nothing is written to disk)
    #[arg(long, default_value_t = false)]
    demo: bool,

    /// Use in-memory store instead of SQLite
    #[arg(long, default_value_t = false)]
    memory: bool,

    /// Path to SQLite DB file (default: OS data dir)
    #[arg(long, env = "YARU_DB_PATH")]
    db_path: Option<PathBuf>,

    /// Where to write logs when RUST_LOG is set (default: OS data dir)
    #[arg(long, env = "YARU_LOG_FILE")]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.log_file.as_deref(), default_data_dir)?;

    let storage: Box<dyn KeyValueStore> = if args.demo || args.memory {
        Box::new(InMemoryKvStore::default())
    } else if let Some(path) = args.db_path.as_ref() {
        Box::new(SqliteKvStore::open(path)?)
    } else {
        Box::new(SqliteKvStore::open_default()?)
    };

    let mut store = TaskStore::open(storage);
    if args.demo {
        seed_todos(&mut store);
    }
    info!(count = store.todos().len(), "starting");

    let app = App::new(store);
    ui::run(app, Duration::from_millis(args.tick_ms))
}

fn seed_todos<S: KeyValueStore>(store: &mut TaskStore<S>) {
    let today = App::<S>::today();
    let in_days = |days: i64| -> Option<Date> { today.checked_add(DateOffset::days(days)) };
    store.create("Write documentation", Priority::Medium, in_days(3));
    store.create("Renew passport", Priority::High, in_days(-1));
    store.create("Draft release notes", Priority::Low, None);
    if let Some(done) = store.create("Book dentist appointment", Priority::Medium, in_days(1)) {
        store.toggle_completion(done.id);
    }
}
