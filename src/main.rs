//! fs-harvest - filesystem metadata indexer
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use fs_harvest::config::{self, CliArgs, Command, STORE_FILE_NAME};
use fs_harvest::db::Store;
use fs_harvest::harvest::{self, Harvester};
use fs_harvest::path::canonicalize_dir;
use fs_harvest::progress::{print_files, print_folders, print_harvest_summary, ProgressReporter};
use fs_harvest::report::Reporter;
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = CliArgs::parse();

    setup_logging(args.verbose)?;

    let db = args.db.as_deref();
    match &args.command {
        Command::Init { path } => run_init(path, db),
        Command::Harvest { path, chunk_size } => run_harvest(path, *chunk_size, db, args.quiet),
        Command::Forget { path } => run_forget(path, db),
        Command::Folders { path, limit, order } => {
            let limit = config::validate_limit(*limit)?;
            let store = open_store(path, db)?;
            let rows = Reporter::new(&store)
                .top_folders(limit, order.order())
                .context("Folder query failed")?;
            print_folders(&rows);
            Ok(())
        }
        Command::LargeFiles { path, limit, filter } => {
            let limit = config::validate_limit(*limit)?;
            let store = open_store(path, db)?;
            let rows = Reporter::new(&store)
                .large_files(limit, filter.as_deref())
                .context("Large file query failed")?;
            print_files(&rows);
            Ok(())
        }
        Command::Head { path, limit } => {
            let limit = config::validate_limit(*limit)?;
            let store = open_store(path, db)?;
            let rows = Reporter::new(&store).head(limit).context("Head query failed")?;
            print_files(&rows);
            Ok(())
        }
    }
}

fn run_init(path: &Path, db: Option<&Path>) -> Result<()> {
    let target = match db {
        Some(file) => file.to_path_buf(),
        None => canonicalize_dir(path)?.as_path().join(STORE_FILE_NAME),
    };
    Store::create(&target)
        .with_context(|| format!("Failed to initialize store at {}", target.display()))?;
    info!("Initialized store {}", target.display());
    println!("Initialized empty store at {}", target.display());
    Ok(())
}

fn run_harvest(path: &Path, chunk_size: usize, db: Option<&Path>, quiet: bool) -> Result<()> {
    let chunk_size = config::validate_chunk_size(chunk_size)?;
    let root = canonicalize_dir(path)?;
    let mut store = open_store(root.as_path(), db)?;
    let db_path = store.path().display().to_string();

    let progress = if quiet { None } else { Some(ProgressReporter::new()) };
    if let Some(ref p) = progress {
        p.set_status(&format!("Forgetting {}...", root));
    }

    let stats = Harvester::new(&mut store, chunk_size)
        .run_with_progress(&root, |update| {
            if let Some(ref p) = progress {
                p.update(update);
            }
        })
        .with_context(|| format!("Harvest of {} failed", root))?;

    match progress {
        Some(p) => {
            p.finish("Harvest completed");
            print_harvest_summary(root.as_str(), &stats, &db_path);
        }
        None => info!(records = stats.records, "Harvest completed"),
    }
    Ok(())
}

fn run_forget(path: &Path, db: Option<&Path>) -> Result<()> {
    let root = canonicalize_dir(path)?;
    let mut store = open_store(root.as_path(), db)?;
    let removed = harvest::forget(&mut store, &root)
        .with_context(|| format!("Failed to forget {}", root))?;
    println!("Forgot {} records under {}", removed, root);
    Ok(())
}

fn open_store(start: &Path, db: Option<&Path>) -> Result<Store> {
    let path = config::locate_store(start, db)?;
    let store = Store::open(&path)
        .with_context(|| format!("Failed to open store {}", path.display()))?;
    Ok(store)
}

fn setup_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("fs_harvest=debug,warn")
    } else {
        EnvFilter::new("fs_harvest=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}
