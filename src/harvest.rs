//! Harvest coordination: forget a subtree, then re-index it
//!
//! ```text
//! harvest(root)
//! │
//! ├── 1. store.delete_subtree(root)        one DELETE
//! │
//! └── 2. for batch in Walker(root, chunk):
//!            store.insert_batch(batch)     one transaction per batch
//! ```
//!
//! The store's database file and its SQLite sidecars are never indexed, so a
//! store living inside the harvested tree does not report on itself.
//!
//! The delete is never rolled back. If the walk or an insert fails, the
//! error propagates and the subtree stays partially re-indexed until the
//! next harvest of it.

use crate::db::Store;
use crate::error::Result;
use crate::path::CanonicalPath;
use crate::walker::Walker;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Summary of one harvest pass
#[derive(Debug, Clone, Default)]
pub struct HarvestStats {
    /// Rows removed by the initial forget
    pub forgotten: u64,
    /// Records inserted
    pub records: u64,
    /// Sum of logical sizes inserted
    pub bytes: u64,
    /// Batches committed
    pub batches: u64,
    /// Entries the walker could not read
    pub skipped: u64,
    pub duration: Duration,
}

impl HarvestStats {
    pub fn records_per_second(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.records as f64 / secs
        } else {
            0.0
        }
    }
}

/// Running totals reported after each committed batch
#[derive(Debug, Clone, Default)]
pub struct HarvestProgress {
    pub records: u64,
    pub bytes: u64,
    pub batches: u64,
    pub dirs: u64,
    pub skipped: u64,
    pub elapsed: Duration,
}

impl HarvestProgress {
    pub fn records_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.records as f64 / secs
        } else {
            0.0
        }
    }
}

/// Runs harvest passes against one store
pub struct Harvester<'a> {
    store: &'a mut Store,
    chunk_size: NonZeroUsize,
}

impl<'a> Harvester<'a> {
    pub fn new(store: &'a mut Store, chunk_size: NonZeroUsize) -> Self {
        Self { store, chunk_size }
    }

    pub fn run(&mut self, root: &CanonicalPath) -> Result<HarvestStats> {
        self.run_with_progress(root, |_| {})
    }

    /// Forget `root`, then stream its batches into the store, calling
    /// `on_batch` after each commit.
    pub fn run_with_progress<F>(&mut self, root: &CanonicalPath, mut on_batch: F) -> Result<HarvestStats>
    where
        F: FnMut(&HarvestProgress),
    {
        let start = Instant::now();

        let forgotten = forget(self.store, root)?;

        info!("Harvesting {} (chunk size {})", root, self.chunk_size);
        let mut walker = Walker::new(root, self.chunk_size).excluding(self.store.files());
        let mut progress = HarvestProgress::default();

        while let Some(batch) = walker.next() {
            let inserted = self.store.insert_batch(&batch)?;

            progress.records += inserted as u64;
            progress.bytes += batch.iter().map(|r| r.filesize).sum::<u64>();
            progress.batches += 1;

            let walk = walker.stats();
            progress.dirs = walk.dirs;
            progress.skipped = walk.skipped;
            progress.elapsed = start.elapsed();

            debug!(
                batch = progress.batches,
                records = progress.records,
                "Committed batch"
            );
            on_batch(&progress);
        }

        let stats = HarvestStats {
            forgotten,
            records: progress.records,
            bytes: progress.bytes,
            batches: progress.batches,
            skipped: walker.stats().skipped,
            duration: start.elapsed(),
        };

        info!(
            records = stats.records,
            skipped = stats.skipped,
            "Harvested {} records in {:.2}s ({:.0}/s)",
            stats.records,
            stats.duration.as_secs_f64(),
            stats.records_per_second()
        );

        Ok(stats)
    }
}

/// Delete every record under `root`; returns the number removed
pub fn forget(store: &mut Store, root: &CanonicalPath) -> Result<u64> {
    let removed = store.delete_subtree(root)?;
    info!("Forgot {} records under {}", removed, root);
    Ok(removed)
}
