//! Aggregate reports over the index
//!
//! Thin layer over the store queries that adds an `age` to each row,
//! computed against a single "now" taken when the reporter is built.

use crate::db::Store;
use crate::error::Result;
use crate::types::{FileRecord, FolderOrder, FolderRollup};
use chrono::{DateTime, Utc};
use std::time::Duration;

/// A folder rollup plus the time since its newest file changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderReport {
    pub rollup: FolderRollup,
    pub age: Duration,
}

/// A file record plus the time since it changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub record: FileRecord,
    pub age: Duration,
}

/// Read-only report runner
pub struct Reporter<'a> {
    store: &'a Store,
    now: DateTime<Utc>,
}

impl<'a> Reporter<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self::at(store, Utc::now())
    }

    /// Reporter with a fixed clock
    pub fn at(store: &'a Store, now: DateTime<Utc>) -> Self {
        Self { store, now }
    }

    /// Largest folders by `order`
    pub fn top_folders(&self, limit: usize, order: FolderOrder) -> Result<Vec<FolderReport>> {
        let rows = self.store.query_top_folders(limit, order)?;
        Ok(rows
            .into_iter()
            .map(|rollup| FolderReport {
                age: self.age_of(rollup.max_mtime),
                rollup,
            })
            .collect())
    }

    /// Largest files, optionally filtered by a filename substring
    pub fn large_files(&self, limit: usize, name_filter: Option<&str>) -> Result<Vec<FileReport>> {
        let rows = self.store.query_top_files(limit, name_filter)?;
        Ok(self.with_ages(rows))
    }

    /// First rows in storage order
    pub fn head(&self, limit: usize) -> Result<Vec<FileReport>> {
        let rows = self.store.query_head(limit)?;
        Ok(self.with_ages(rows))
    }

    fn with_ages(&self, records: Vec<FileRecord>) -> Vec<FileReport> {
        records
            .into_iter()
            .map(|record| FileReport {
                age: self.age_of(record.mtime),
                record,
            })
            .collect()
    }

    /// `now - mtime`, zero for timestamps in the future
    pub fn age_of(&self, mtime: u32) -> Duration {
        let secs = self.now.timestamp() - i64::from(mtime);
        Duration::from_secs(secs.max(0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(dirname: &str, filename: &str, size: u64, mtime: u32) -> FileRecord {
        FileRecord {
            dirname: dirname.into(),
            filename: filename.into(),
            filesize_bytes_on_disk: size,
            filesize: size,
            owner: "tester".into(),
            mtime,
            atime: mtime,
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_000_000, 0).unwrap()
    }

    #[test]
    fn test_folder_age_uses_newest_file() {
        let mut store = Store::open_in_memory().unwrap();
        store
            .insert_batch(&[
                record("/d", "old", 1, 400_000),
                record("/d", "new", 1, 900_000),
            ])
            .unwrap();

        let reporter = Reporter::at(&store, fixed_now());
        let folders = reporter.top_folders(10, FolderOrder::Size).unwrap();
        assert_eq!(folders.len(), 1);
        assert_eq!(folders[0].age, Duration::from_secs(100_000));
    }

    #[test]
    fn test_file_age() {
        let mut store = Store::open_in_memory().unwrap();
        store.insert_batch(&[record("/d", "f", 5, 999_000)]).unwrap();

        let reporter = Reporter::at(&store, fixed_now());
        let files = reporter.large_files(1, None).unwrap();
        assert_eq!(files[0].age, Duration::from_secs(1000));
        let head = reporter.head(1).unwrap();
        assert_eq!(head, files);
    }

    #[test]
    fn test_future_mtime_has_zero_age() {
        let store = Store::open_in_memory().unwrap();
        let reporter = Reporter::at(&store, fixed_now());
        assert_eq!(reporter.age_of(2_000_000), Duration::ZERO);
    }
}
