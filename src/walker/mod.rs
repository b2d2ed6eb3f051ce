//! Local filesystem walker
//!
//! This module implements a single-threaded, pull-based directory walker
//! that stats entries without following symlinks and hands out bounded
//! batches of file records.
//!
//! # Architecture
//!
//! ```text
//!                     ┌─────────────────────────┐
//!                     │         Walker          │
//!                     │  - depth-first WalkDir  │
//!                     │  - lstat per entry      │
//!                     │  - OwnerCache (LRU)     │
//!                     └───────────┬─────────────┘
//!                                 │ Vec<FileRecord> (≤ chunk_size)
//!                                 ▼
//!                     ┌─────────────────────────┐
//!                     │   Harvester / caller    │
//!                     └─────────────────────────┘
//! ```

pub mod local;
pub mod owner;

pub use local::{WalkStats, Walker};
pub use owner::{OwnerCache, DEFAULT_OWNER_CACHE_CAPACITY};
