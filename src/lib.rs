//! fs-harvest - Filesystem Metadata Indexer
//!
//! Walks a directory tree once, stores every regular file's metadata in
//! SQLite, and answers "largest folders" / "largest files" questions from
//! the store instead of re-walking the filesystem.
//!
//! # Features
//!
//! - **Streaming Walk**: The walker yields bounded batches, so memory use
//!   does not grow with the size of the tree.
//!
//! - **Subtree Re-harvest**: Harvesting a directory first forgets every
//!   record under it, so running it again is always safe.
//!
//! - **Batch Transactions**: Each batch commits on its own; an interrupted
//!   harvest loses at most the batch in flight.
//!
//! - **SQLite Output**: Rollups are plain SQL over one `files` table.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Local Filesystem                            │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │ readdir + lstat
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  Walker  ──► Vec<FileRecord> (≤ chunk size) ──► Harvester       │
//! │  (OwnerCache: uid → name, LRU)                  │               │
//! └─────────────────────────────────────────────────┼───────────────┘
//!                                                   │ delete_subtree, then
//!                                                   │ insert_batch per batch
//!                                                   ▼
//!                                        ┌──────────────────┐
//!                                        │   SQLite store   │
//!                                        │ (.fs-harvest.db) │
//!                                        └────────┬─────────┘
//!                                                 │
//!                                                 ▼
//!                                        ┌──────────────────┐
//!                                        │     Reporter     │
//!                                        └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```bash
//! fs-harvest init ~/data
//! fs-harvest harvest ~/data
//! fs-harvest folders ~/data -n 10
//! fs-harvest large-files ~/data -f .mkv
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod harvest;
pub mod path;
pub mod progress;
pub mod report;
pub mod types;
pub mod walker;

pub use db::Store;
pub use error::{HarvestError, Result};
pub use harvest::{forget, HarvestStats, Harvester};
pub use path::{canonicalize, canonicalize_dir, CanonicalPath};
pub use report::Reporter;
pub use types::{FileRecord, FolderOrder, FolderRollup};
pub use walker::Walker;
