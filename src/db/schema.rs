//! Store schema definitions and creation
//!
//! This module defines the single `files` table the index lives in and the
//! connection settings every store handle is opened with.

use rusqlite::Connection;
use std::time::Duration;

/// Name of the table holding one row per indexed regular file
pub const FILES_TABLE: &str = "files";

/// Column list shared by inserts and record queries, in `FileRecord` order
pub const FILE_COLUMNS: &str =
    "dirname, filename, filesize_bytes_on_disk, filesize, owner, mtime, atime";

const DROP_FILES_TABLE: &str = "DROP TABLE IF EXISTS files";

/// No uniqueness constraint: overlapping harvests may store duplicates.
const CREATE_FILES_TABLE: &str = r#"
CREATE TABLE files (
    dirname TEXT NOT NULL,
    filename TEXT NOT NULL,
    filesize_bytes_on_disk INTEGER NOT NULL,  -- allocated bytes
    filesize INTEGER NOT NULL,                -- logical bytes
    owner TEXT NOT NULL,
    mtime INTEGER NOT NULL,                   -- Unix timestamp
    atime INTEGER NOT NULL
)
"#;

/// Serves both the subtree range delete and the per-folder rollup
const CREATE_DIRNAME_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_files_dirname ON files(dirname)";

/// Pragmas applied to every connection (after switching to WAL)
const CONNECTION_PRAGMAS: &str = r#"
PRAGMA synchronous = NORMAL;
PRAGMA cache_size = -64000;      -- 64MB cache
PRAGMA temp_store = MEMORY;
"#;

/// How long a statement waits on another process's lock before failing
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Apply connection settings
pub fn configure_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    // journal_mode reports the resulting mode as a row
    let _mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    conn.execute_batch(CONNECTION_PRAGMAS)?;
    Ok(())
}

/// Drop and recreate the `files` table.
///
/// Unconditional: any existing rows are discarded. Callers that must not
/// clobber an existing store check for it first.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(DROP_FILES_TABLE, [])?;
    conn.execute(CREATE_FILES_TABLE, [])?;
    conn.execute(CREATE_DIRNAME_INDEX, [])?;
    Ok(())
}

/// Whether the `files` table exists
pub fn has_files_table(conn: &Connection) -> rusqlite::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [FILES_TABLE],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}
