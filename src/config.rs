//! Configuration types for fs-harvest
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Validation of batch sizes and result limits
//! - Store file discovery (explicit flag, environment, parent directories)

use crate::error::ConfigError;
use crate::types::FolderOrder;
use clap::{Args, Parser, Subcommand};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of the store created by `init` and searched for by discovery
pub const STORE_FILE_NAME: &str = ".fs-harvest.db";

/// Environment variable forcing an explicit store file
pub const STORE_ENV_VAR: &str = "FS_HARVEST_DB";

/// Default records per insert transaction
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Chunk size limits
const MIN_CHUNK_SIZE: usize = 1;
const MAX_CHUNK_SIZE: usize = 1_000_000;

/// Index filesystem metadata into SQLite and report on it
#[derive(Parser, Debug, Clone)]
#[command(
    name = "fs-harvest",
    version,
    about = "Index filesystem metadata into SQLite and report on it",
    long_about = "Walks a directory tree, records every regular file's size, owner and times \
                  in a SQLite store, and answers largest-folder and largest-file questions \
                  from the store instead of re-walking the disk.",
    after_help = "EXAMPLES:\n    \
        fs-harvest init ~/projects\n    \
        fs-harvest harvest ~/projects --chunksize 5000\n    \
        fs-harvest folders ~/projects -n 10 --count\n    \
        fs-harvest large-files ~/projects -f .iso\n    \
        fs-harvest forget ~/projects/old"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Use this store file instead of searching for one
    #[arg(long, global = true, env = STORE_ENV_VAR, value_name = "FILE")]
    pub db: Option<PathBuf>,

    /// Quiet mode - suppress progress output
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Verbose output (debug logging)
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create an empty store in a directory
    Init {
        /// Directory to create the store in
        #[arg(value_name = "PATH", default_value = ".")]
        path: PathBuf,
    },

    /// Forget and re-index a subtree
    Harvest {
        /// Root of the subtree to index
        #[arg(value_name = "PATH", default_value = ".")]
        path: PathBuf,

        /// Records per insert transaction
        #[arg(long = "chunksize", default_value_t = DEFAULT_CHUNK_SIZE, value_name = "NUM")]
        chunk_size: usize,
    },

    /// Remove every record under a subtree
    Forget {
        /// Root of the subtree to forget
        #[arg(value_name = "PATH", default_value = ".")]
        path: PathBuf,
    },

    /// Show the largest folders
    Folders {
        /// Where to start looking for the store
        #[arg(value_name = "PATH", default_value = ".")]
        path: PathBuf,

        /// Number of folders to show
        #[arg(short = 'n', long = "number", default_value_t = 20, value_name = "NUM")]
        limit: usize,

        #[command(flatten)]
        order: OrderArgs,
    },

    /// Show the largest files
    LargeFiles {
        /// Where to start looking for the store
        #[arg(value_name = "PATH", default_value = ".")]
        path: PathBuf,

        /// Number of files to show
        #[arg(short = 'n', long = "number", default_value_t = 20, value_name = "NUM")]
        limit: usize,

        /// Only files whose name contains this text (case-sensitive)
        #[arg(short = 'f', long = "filter", value_name = "TEXT")]
        filter: Option<String>,
    },

    /// Show the first raw records in the store
    Head {
        /// Where to start looking for the store
        #[arg(value_name = "PATH", default_value = ".")]
        path: PathBuf,

        /// Number of records to show
        #[arg(short = 'n', long = "number", default_value_t = 10, value_name = "NUM")]
        limit: usize,
    },
}

/// `--size` / `--count`
#[derive(Args, Debug, Clone, Copy)]
#[group(multiple = false)]
pub struct OrderArgs {
    /// Rank by total size (default)
    #[arg(long)]
    pub size: bool,

    /// Rank by number of files
    #[arg(long)]
    pub count: bool,
}

impl OrderArgs {
    pub fn order(self) -> FolderOrder {
        if self.count {
            FolderOrder::Count
        } else {
            FolderOrder::Size
        }
    }
}

/// Check a user-supplied chunk size
pub fn validate_chunk_size(size: usize) -> Result<NonZeroUsize, ConfigError> {
    if !(MIN_CHUNK_SIZE..=MAX_CHUNK_SIZE).contains(&size) {
        return Err(ConfigError::InvalidChunkSize {
            size,
            min: MIN_CHUNK_SIZE,
            max: MAX_CHUNK_SIZE,
        });
    }
    NonZeroUsize::new(size).ok_or(ConfigError::InvalidChunkSize {
        size,
        min: MIN_CHUNK_SIZE,
        max: MAX_CHUNK_SIZE,
    })
}

/// Check a user-supplied row limit
pub fn validate_limit(limit: usize) -> Result<usize, ConfigError> {
    if limit == 0 {
        return Err(ConfigError::InvalidLimit { limit });
    }
    Ok(limit)
}

/// Find the store file to use.
///
/// `explicit` comes from `--db` (or `FS_HARVEST_DB`, which clap folds into
/// the same flag) and wins outright. Otherwise `start` and each of its
/// ancestors up to `/` are searched for a store file.
pub fn locate_store(start: &Path, explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit {
        debug!("Using explicit store {}", path.display());
        return Ok(path.to_path_buf());
    }

    let start = std::fs::canonicalize(start).unwrap_or_else(|_| start.to_path_buf());
    for dir in start.ancestors() {
        let candidate = dir.join(STORE_FILE_NAME);
        if candidate.is_file() {
            debug!("Found store {}", candidate.display());
            return Ok(candidate);
        }
    }

    Err(ConfigError::StoreNotFound { start })
}
