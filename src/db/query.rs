//! Read-only queries against the file index
//!
//! Equal metric values are ordered by first insertion (`rowid`, or the
//! smallest `rowid` in a folder), which keeps results stable across runs
//! over the same store.

use crate::db::schema::FILE_COLUMNS;
use crate::db::store::Store;
use crate::error::StoreResult;
use crate::types::{FileRecord, FolderOrder, FolderRollup};
use rusqlite::{params, Row};

const TOP_FOLDERS_BY_SIZE: &str = r#"
SELECT dirname, COUNT(*) AS file_count, SUM(filesize) AS sum_filesize,
       SUM(filesize_bytes_on_disk), MAX(mtime), MIN(rowid) AS first_seen
FROM files
GROUP BY dirname
ORDER BY sum_filesize DESC, first_seen ASC
LIMIT ?1
"#;

const TOP_FOLDERS_BY_COUNT: &str = r#"
SELECT dirname, COUNT(*) AS file_count, SUM(filesize) AS sum_filesize,
       SUM(filesize_bytes_on_disk), MAX(mtime), MIN(rowid) AS first_seen
FROM files
GROUP BY dirname
ORDER BY file_count DESC, first_seen ASC
LIMIT ?1
"#;

/// Map a row selected with `FILE_COLUMNS` onto a record
fn record_from_row(row: &Row<'_>) -> rusqlite::Result<FileRecord> {
    Ok(FileRecord {
        dirname: row.get(0)?,
        filename: row.get(1)?,
        filesize_bytes_on_disk: row.get(2)?,
        filesize: row.get(3)?,
        owner: row.get(4)?,
        mtime: row.get(5)?,
        atime: row.get(6)?,
    })
}

fn rollup_from_row(row: &Row<'_>) -> rusqlite::Result<FolderRollup> {
    Ok(FolderRollup {
        dirname: row.get(0)?,
        file_count: row.get(1)?,
        sum_filesize: row.get(2)?,
        sum_filesize_on_disk: row.get(3)?,
        max_mtime: row.get(4)?,
    })
}

impl Store {
    /// Per-folder rollups, largest first by `order`
    pub fn query_top_folders(&self, limit: usize, order: FolderOrder) -> StoreResult<Vec<FolderRollup>> {
        let sql = match order {
            FolderOrder::Size => TOP_FOLDERS_BY_SIZE,
            FolderOrder::Count => TOP_FOLDERS_BY_COUNT,
        };
        let mut stmt = self.conn().prepare_cached(sql).map_err(|e| self.classify(e))?;
        let rows = stmt
            .query_map(params![limit as i64], rollup_from_row)
            .map_err(|e| self.classify(e))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| self.classify(e))
    }

    /// Largest individual files, optionally only those whose name contains
    /// `name_filter` (case-sensitive, no wildcards)
    pub fn query_top_files(&self, limit: usize, name_filter: Option<&str>) -> StoreResult<Vec<FileRecord>> {
        let sql = format!(
            "SELECT {} FROM files
             WHERE ?2 IS NULL OR instr(filename, ?2) > 0
             ORDER BY filesize DESC, rowid ASC
             LIMIT ?1",
            FILE_COLUMNS
        );
        let mut stmt = self.conn().prepare_cached(&sql).map_err(|e| self.classify(e))?;
        let rows = stmt
            .query_map(params![limit as i64, name_filter], record_from_row)
            .map_err(|e| self.classify(e))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| self.classify(e))
    }

    /// First `limit` records in storage order (diagnostic)
    pub fn query_head(&self, limit: usize) -> StoreResult<Vec<FileRecord>> {
        let sql = format!("SELECT {} FROM files LIMIT ?1", FILE_COLUMNS);
        let mut stmt = self.conn().prepare_cached(&sql).map_err(|e| self.classify(e))?;
        let rows = stmt
            .query_map(params![limit as i64], record_from_row)
            .map_err(|e| self.classify(e))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| self.classify(e))
    }
}
