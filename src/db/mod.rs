//! SQLite store for indexed file metadata
//!
//! This module owns the on-disk index: one `files` table with a row per
//! regular file, subtree-scoped deletion, batched inserts and the rollup
//! queries the reports are built on.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                 Harvester (one thread)                  │
//! │  delete_subtree(root) ─► insert_batch(batch) ...        │
//! └─────────────────────┬───────────────────────────────────┘
//!                       │ one transaction per call
//!                       ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │                SQLite file (WAL mode)                   │
//! │                 files(dirname, ...)                     │
//! └─────────────────────┬───────────────────────────────────┘
//!                       │ GROUP BY dirname / ORDER BY filesize
//!                       ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │                      Reporter                           │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod query;
pub mod schema;
pub mod store;

pub use schema::{configure_connection, has_files_table, init_schema};
pub use store::Store;
