//! The persistent file index
//!
//! A `Store` wraps one SQLite connection. Every write is its own
//! transaction: one `DELETE` per forgotten subtree and one transaction per
//! inserted batch, so an interrupted harvest loses at most the batch in
//! flight.

use crate::db::schema::{self, FILE_COLUMNS};
use crate::error::{StoreError, StoreResult};
use crate::path::CanonicalPath;
use crate::types::FileRecord;
use rusqlite::{params, Connection, OpenFlags};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Rows under a subtree: the root directory itself, or anything in the
/// `[root/, root0)` range (see `CanonicalPath::subtree_range`).
const DELETE_SUBTREE: &str = r#"
DELETE FROM files
WHERE dirname = ?1 OR (dirname >= ?2 AND dirname < ?3)
"#;

const MEMORY_PATH: &str = ":memory:";

/// Files SQLite keeps next to the database: WAL, shared memory, rollback journal
const SIDECAR_SUFFIXES: [&str; 3] = ["-wal", "-shm", "-journal"];

/// Handle on an initialized store
pub struct Store {
    conn: Connection,
    path: PathBuf,
}

impl Store {
    /// Create a new store file at `path` and initialize its schema.
    ///
    /// Fails with `AlreadyInitialized` without touching anything if a file
    /// already exists there.
    pub fn create(path: &Path) -> StoreResult<Self> {
        if path.exists() {
            return Err(StoreError::AlreadyInitialized {
                path: path.to_path_buf(),
            });
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
        )
        .map_err(|e| StoreError::from_sqlite(e, path))?;

        let store = Self {
            conn,
            path: path.to_path_buf(),
        };
        store.configure()?;
        store.init_schema()?;
        debug!("Created store {}", path.display());
        Ok(store)
    }

    /// Open an existing, initialized store
    pub fn open(path: &Path) -> StoreResult<Self> {
        if !path.is_file() {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                reason: "no such store file".into(),
            });
        }

        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_WRITE)
            .map_err(|e| StoreError::from_sqlite(e, path))?;

        let store = Self {
            conn,
            path: path.to_path_buf(),
        };
        store.configure()?;

        let initialized = schema::has_files_table(&store.conn).map_err(|e| store.classify(e))?;
        if !initialized {
            return Err(StoreError::Schema(format!(
                "'{}' has no files table",
                path.display()
            )));
        }
        Ok(store)
    }

    /// In-memory store with the schema initialized
    pub fn open_in_memory() -> StoreResult<Self> {
        let path = PathBuf::from(MEMORY_PATH);
        let conn = Connection::open_in_memory().map_err(|e| StoreError::from_sqlite(e, &path))?;
        let store = Self { conn, path };
        store.init_schema()?;
        Ok(store)
    }

    /// Location of the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The database file and its sidecars, with the directory part
    /// canonicalized so they compare equal to paths under a canonical root.
    /// Empty for an in-memory store.
    pub fn files(&self) -> Vec<PathBuf> {
        if self.path == Path::new(MEMORY_PATH) {
            return Vec::new();
        }
        let Some(name) = self.path.file_name() else {
            return Vec::new();
        };
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let db = match std::fs::canonicalize(parent) {
            Ok(dir) => dir.join(name),
            Err(e) => {
                debug!("Cannot canonicalize {}: {}", parent.display(), e);
                self.path.clone()
            }
        };

        let mut files = Vec::with_capacity(SIDECAR_SUFFIXES.len() + 1);
        for suffix in SIDECAR_SUFFIXES {
            let mut sidecar = db.clone().into_os_string();
            sidecar.push(suffix);
            files.push(PathBuf::from(sidecar));
        }
        files.push(db);
        files
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    pub(crate) fn classify(&self, err: rusqlite::Error) -> StoreError {
        StoreError::from_sqlite(err, &self.path)
    }

    fn configure(&self) -> StoreResult<()> {
        schema::configure_connection(&self.conn).map_err(|e| self.classify(e))
    }

    /// Drop and recreate the `files` table
    pub fn init_schema(&self) -> StoreResult<()> {
        schema::init_schema(&self.conn).map_err(|e| self.classify(e))
    }

    /// Delete every record whose `dirname` is under `root`.
    ///
    /// A single statement, so it either removes the whole subtree or
    /// nothing. Returns the number of rows removed.
    pub fn delete_subtree(&mut self, root: &CanonicalPath) -> StoreResult<u64> {
        let (lower, upper) = root.subtree_range();
        let removed = self
            .conn
            .execute(DELETE_SUBTREE, params![root.as_str(), lower, upper])
            .map_err(|e| self.classify(e))?;
        debug!("Deleted {} rows under {}", removed, root);
        Ok(removed as u64)
    }

    /// Append `records` in one transaction. No deduplication.
    pub fn insert_batch(&mut self, records: &[FileRecord]) -> StoreResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let tx = self.conn.transaction().map_err(|e| StoreError::from_sqlite(e, &self.path))?;
        {
            let sql = format!(
                "INSERT INTO files ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                FILE_COLUMNS
            );
            let mut stmt = tx
                .prepare_cached(&sql)
                .map_err(|e| StoreError::from_sqlite(e, &self.path))?;

            for record in records {
                stmt.execute(params![
                    record.dirname,
                    record.filename,
                    record.filesize_bytes_on_disk,
                    record.filesize,
                    record.owner,
                    record.mtime,
                    record.atime,
                ])
                .map_err(|e| StoreError::from_sqlite(e, &self.path))?;
            }
        }
        tx.commit().map_err(|e| StoreError::from_sqlite(e, &self.path))?;

        Ok(records.len())
    }

    /// Total number of indexed records
    pub fn count(&self) -> StoreResult<u64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM files", [], |row| row.get::<_, i64>(0))
            .map(|n| n as u64)
            .map_err(|e| self.classify(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(dirname: &str, filename: &str, size: u64) -> FileRecord {
        FileRecord {
            dirname: dirname.into(),
            filename: filename.into(),
            filesize_bytes_on_disk: size,
            filesize: size,
            owner: "tester".into(),
            mtime: 1_700_000_000,
            atime: 1_700_000_000,
        }
    }

    #[test]
    fn test_insert_and_count() {
        let mut store = Store::open_in_memory().unwrap();
        let batch: Vec<_> = (0..10).map(|i| record("/data", &format!("f{}", i), i)).collect();
        assert_eq!(store.insert_batch(&batch).unwrap(), 10);
        assert_eq!(store.count().unwrap(), 10);
    }

    #[test]
    fn test_insert_does_not_dedup() {
        let mut store = Store::open_in_memory().unwrap();
        let batch = vec![record("/data", "same", 1)];
        store.insert_batch(&batch).unwrap();
        store.insert_batch(&batch).unwrap();
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_delete_subtree_respects_boundary() {
        let mut store = Store::open_in_memory().unwrap();
        store
            .insert_batch(&[
                record("/data/foo", "a", 1),
                record("/data/foo/deep/er", "b", 1),
                record("/data/foobar", "c", 1),
                record("/data/foo.old", "d", 1),
                record("/data", "e", 1),
            ])
            .unwrap();

        let removed = store
            .delete_subtree(&CanonicalPath::from_canonical("/data/foo"))
            .unwrap();
        assert_eq!(removed, 2);

        let mut remaining: Vec<String> = store
            .conn()
            .prepare("SELECT dirname FROM files")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        remaining.sort();
        assert_eq!(remaining, vec!["/data", "/data/foo.old", "/data/foobar"]);
    }

    #[test]
    fn test_delete_root_subtree_removes_everything() {
        let mut store = Store::open_in_memory().unwrap();
        store
            .insert_batch(&[record("/", "a", 1), record("/x/y", "b", 1)])
            .unwrap();
        let removed = store.delete_subtree(&CanonicalPath::from_canonical("/")).unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_forget_empty_subtree_is_noop() {
        let mut store = Store::open_in_memory().unwrap();
        let removed = store
            .delete_subtree(&CanonicalPath::from_canonical("/nothing/here"))
            .unwrap();
        assert_eq!(removed, 0);
    }

    #[test]
    fn test_create_refuses_existing_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("index.db");

        let mut store = Store::create(&path).unwrap();
        store.insert_batch(&[record("/d", "keep", 1)]).unwrap();
        drop(store);

        let err = Store::create(&path).err().unwrap();
        assert!(matches!(err, StoreError::AlreadyInitialized { .. }));

        let store = Store::open(&path).unwrap();
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_files_include_sidecars() {
        let dir = tempdir().unwrap();
        let store = Store::create(&dir.path().join("index.db")).unwrap();
        let canonical = std::fs::canonicalize(dir.path()).unwrap();

        let files = store.files();
        assert_eq!(files.len(), 4);
        assert!(files.contains(&canonical.join("index.db")));
        assert!(files.contains(&canonical.join("index.db-wal")));
        assert!(files.contains(&canonical.join("index.db-shm")));
        assert!(files.contains(&canonical.join("index.db-journal")));

        assert!(Store::open_in_memory().unwrap().files().is_empty());
    }

    #[test]
    fn test_open_missing_store_is_io_error() {
        let dir = tempdir().unwrap();
        let err = Store::open(&dir.path().join("missing.db")).err().unwrap();
        assert!(err.is_io());
    }

    #[test]
    fn test_open_uninitialized_store_is_schema_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blank.db");
        Connection::open(&path)
            .unwrap()
            .execute_batch("CREATE TABLE other (x INTEGER)")
            .unwrap();

        let err = Store::open(&path).err().unwrap();
        assert!(matches!(err, StoreError::Schema(_)));
    }

    #[test]
    fn test_open_non_database_is_io_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("garbage.db");
        std::fs::write(&path, vec![0x42u8; 4096]).unwrap();

        let err = Store::open(&path).err().unwrap();
        assert!(err.is_io());
    }

    #[test]
    fn test_large_values_round_trip() {
        let mut store = Store::open_in_memory().unwrap();
        let mut big = record("/d", "huge", 1 << 50);
        big.mtime = u32::MAX;
        store.insert_batch(&[big]).unwrap();

        let (size, mtime): (u64, u32) = store
            .conn()
            .query_row("SELECT filesize, mtime FROM files", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();
        assert_eq!(size, 1 << 50);
        assert_eq!(mtime, u32::MAX);
    }
}
